//! UDP transport: one datagram, one frame.

use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::ListenerConfig;
use crate::error::ListenerError;
use crate::listener::Frame;

pub(crate) async fn start(
    config: ListenerConfig,
) -> Result<(SocketAddr, mpsc::Receiver<Frame>, CancellationToken, JoinHandle<Result<(), ListenerError>>), ListenerError> {
    let socket = UdpSocket::bind(config.bind_addr()).await.map_err(|source| ListenerError::Bind {
        protocol: "udp",
        addr: config.bind_addr(),
        source,
    })?;
    let local_addr = socket.local_addr().map_err(ListenerError::LocalAddr)?;

    let (tx, rx) = mpsc::channel(config.channel_capacity);
    let cancel = CancellationToken::new();
    let task_cancel = cancel.clone();
    let max_frame_size = config.max_frame_size;

    let join = tokio::spawn(async move {
        let mut buf = vec![0u8; max_frame_size];
        loop {
            tokio::select! {
                _ = task_cancel.cancelled() => return Ok(()),
                result = socket.recv_from(&mut buf) => {
                    match result {
                        Ok((len, peer)) => {
                            if len == buf.len() {
                                warn!(%peer, len, "udp datagram may have been truncated to max_frame_size");
                            }
                            let frame = Frame {
                                bytes: buf[..len].to_vec(),
                                peer_ip: peer.ip().to_string(),
                            };
                            if tx.send(frame).await.is_err() {
                                return Ok(());
                            }
                        }
                        Err(err) => {
                            warn!(error = %err, "udp recv error, continuing");
                        }
                    }
                }
            }
        }
    });

    Ok((local_addr, rx, cancel, join))
}
