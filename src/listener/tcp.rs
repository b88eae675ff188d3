//! TCP transport: an acceptor loop plus one task per client.
//!
//! Deliberately does not frame on newlines or octet counts -- each
//! delivered `read` is emitted as exactly one frame, per the wire-format
//! Non-goal. `tcp_idle_timeout_secs` is carried on [`ListenerConfig`] as a
//! reserved knob but is not enforced here: the concurrency model states
//! there are no per-frame timeouts, and an idle-disconnect policy is a
//! deployment concern layered externally.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ListenerConfig;
use crate::error::ListenerError;
use crate::listener::Frame;

/// The live-client registry: an opaque client-id per connected socket.
/// Owned exclusively by the listener task; nothing else mutates it.
pub(crate) type Registry = Arc<Mutex<HashSet<u64>>>;

#[allow(clippy::type_complexity)]
pub(crate) async fn start(
    config: ListenerConfig,
) -> Result<
    (
        SocketAddr,
        mpsc::Receiver<Frame>,
        CancellationToken,
        JoinHandle<Result<(), ListenerError>>,
        Registry,
    ),
    ListenerError,
> {
    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .map_err(|source| ListenerError::Bind {
            protocol: "tcp",
            addr: config.bind_addr(),
            source,
        })?;
    let local_addr = listener.local_addr().map_err(ListenerError::LocalAddr)?;

    let (tx, rx) = mpsc::channel(config.channel_capacity);
    let cancel = CancellationToken::new();
    let registry: Registry = Arc::new(Mutex::new(HashSet::new()));
    let semaphore = Arc::new(Semaphore::new(config.max_connections));
    let next_id = Arc::new(AtomicU64::new(0));
    let max_frame_size = config.max_frame_size;

    let task_cancel = cancel.clone();
    let task_registry = registry.clone();
    let join = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = task_cancel.cancelled() => return Ok(()),
                accepted = listener.accept() => {
                    let (socket, peer) = match accepted {
                        Ok(pair) => pair,
                        Err(err) if would_block(&err) => continue,
                        Err(err) => return Err(ListenerError::Accept(err)),
                    };
                    let Ok(permit) = semaphore.clone().try_acquire_owned() else {
                        warn!(%peer, "max connections reached, rejecting client");
                        continue;
                    };
                    let id = next_id.fetch_add(1, Ordering::Relaxed);
                    task_registry.lock().await.insert(id);
                    tokio::spawn(serve_client(
                        id,
                        socket,
                        peer,
                        tx.clone(),
                        task_registry.clone(),
                        task_cancel.clone(),
                        max_frame_size,
                        permit,
                    ));
                }
            }
        }
    });

    Ok((local_addr, rx, cancel, join, registry))
}

fn would_block(err: &std::io::Error) -> bool {
    matches!(err.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::Interrupted)
}

async fn serve_client(
    id: u64,
    mut socket: TcpStream,
    peer: SocketAddr,
    tx: mpsc::Sender<Frame>,
    registry: Registry,
    cancel: CancellationToken,
    max_frame_size: usize,
    _permit: OwnedSemaphorePermit,
) {
    let mut buf = vec![0u8; max_frame_size];
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            result = socket.read(&mut buf) => {
                match result {
                    Ok(0) => break,
                    Ok(len) => {
                        let frame = Frame {
                            bytes: buf[..len].to_vec(),
                            peer_ip: peer.ip().to_string(),
                        };
                        if tx.send(frame).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!(%peer, error = %err, "tcp read error, closing client");
                        break;
                    }
                }
            }
        }
    }
    registry.lock().await.remove(&id);
    debug!(%peer, "tcp client disconnected");
}
