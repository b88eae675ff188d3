//! Owns the listening socket and produces `(bytes, peer_ip)` frames.
//!
//! [`start`] dispatches to [`udp`] or [`tcp`] depending on
//! [`ListenerConfig::protocol`]. The returned [`ListenerHandle`] is both
//! the frame source (via [`ListenerHandle::recv`]) and the stop/introspect
//! surface ([`ListenerHandle::port`], [`ListenerHandle::client_count`]).

mod tcp;
mod udp;

use std::net::SocketAddr;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{ListenerConfig, Protocol};
use crate::error::ListenerError;

/// One delivered frame: the raw bytes and the peer's address, as text.
#[derive(Debug, Clone)]
pub struct Frame {
    pub bytes: Vec<u8>,
    pub peer_ip: String,
}

/// A running listener. Dropping this without calling [`stop`] leaves the
/// background task running until the process exits; prefer `stop`.
pub struct ListenerHandle {
    local_addr: SocketAddr,
    frames: mpsc::Receiver<Frame>,
    cancel: CancellationToken,
    join: JoinHandle<Result<(), ListenerError>>,
    registry: Option<tcp::Registry>,
}

impl ListenerHandle {
    /// The actually-bound port. For `port: 0` configs this is the
    /// OS-assigned ephemeral port.
    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Receives the next frame, or `None` once the listener has stopped.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.frames.recv().await
    }

    /// Number of live TCP clients, or `None` for a UDP listener.
    pub async fn client_count(&self) -> Option<usize> {
        match &self.registry {
            Some(registry) => Some(registry.lock().await.len()),
            None => None,
        }
    }

    /// Closes the listening socket and every live client socket, then
    /// waits for the background task to exit. Idempotent to call once;
    /// calling it again isn't possible since it consumes `self`.
    pub async fn stop(self) {
        self.cancel.cancel();
        let _ = self.join.await;
    }
}

/// Binds and begins producing frames. `config.port == 0` requests an
/// OS-assigned port; read it back with [`ListenerHandle::port`].
pub async fn start(config: ListenerConfig) -> Result<ListenerHandle, ListenerError> {
    match config.protocol {
        Protocol::Udp => {
            let (local_addr, frames, cancel, join) = udp::start(config).await?;
            Ok(ListenerHandle {
                local_addr,
                frames,
                cancel,
                join,
                registry: None,
            })
        }
        Protocol::Tcp => {
            let (local_addr, frames, cancel, join, registry) = tcp::start(config).await?;
            Ok(ListenerHandle {
                local_addr,
                frames,
                cancel,
                join,
                registry: Some(registry),
            })
        }
    }
}

/// Free-function form of [`ListenerHandle::port`], matching the external
/// interface naming (`get_port(handle) -> u16`).
pub fn get_port(handle: &ListenerHandle) -> u16 {
    handle.port()
}

/// Free-function form of [`ListenerHandle::stop`].
pub async fn stop(handle: ListenerHandle) {
    handle.stop().await;
}
