//! Consumes frames from a [`ListenerHandle`], parses each one, and stamps
//! `raw_ip_address` before forwarding the record downstream.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::error::DecoderError;
use crate::listener::ListenerHandle;
use crate::parser::{self, TimezoneTable};
use crate::record::Record;

/// Output channel capacity when using [`start`]'s defaults. Matches
/// [`crate::config::ListenerConfig`]'s default `channel_capacity`.
const DEFAULT_CAPACITY: usize = 1024;

pub struct DecoderHandle {
    records: mpsc::Receiver<Record>,
    join: JoinHandle<Result<(), DecoderError>>,
}

impl DecoderHandle {
    /// Receives the next normalized record, or `None` once the decoder and
    /// its upstream listener have both stopped.
    pub async fn recv(&mut self) -> Option<Record> {
        self.records.recv().await
    }

    pub async fn stop(self) -> Result<(), DecoderError> {
        drop(self.records);
        self.join.await.unwrap_or(Ok(()))
    }
}

/// Starts a decoder over `producer`, using the system clock and the
/// built-in timezone abbreviation table.
pub fn start(producer: ListenerHandle) -> DecoderHandle {
    start_with(producer, Arc::new(SystemClock), Arc::new(TimezoneTable::default()), DEFAULT_CAPACITY)
}

/// Like [`start`], but with an injectable clock, timezone table, and
/// output channel capacity. Tests use this to pin the "current year"
/// default and to extend the abbreviation table.
pub fn start_with(
    mut producer: ListenerHandle,
    clock: Arc<dyn Clock>,
    tz_table: Arc<TimezoneTable>,
    capacity: usize,
) -> DecoderHandle {
    let (tx, rx) = mpsc::channel(capacity);

    let join = tokio::spawn(async move {
        while let Some(frame) = producer.recv().await {
            let mut record = parser::parse(&frame.bytes, clock.as_ref(), tz_table.as_ref());
            record.raw_ip_address = Some(frame.peer_ip);
            if tx.send(record).await.is_err() {
                debug!("downstream receiver dropped, decoder stopping");
                return Err(DecoderError::SinkClosed);
            }
        }
        Ok(())
    });

    DecoderHandle { records: rx, join }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::{ListenerConfig, ListenerConfigBuilder, Protocol};

    #[tokio::test]
    async fn decodes_udp_frame_and_stamps_peer_ip() {
        let config = ListenerConfigBuilder::new()
            .bind_host("127.0.0.1")
            .port(0)
            .build()
            .unwrap();
        let listener = crate::listener::start(config).await.unwrap();
        let port = listener.port();
        let mut decoder = start_with(listener, Arc::new(FixedClock::new(2024)), Arc::new(TimezoneTable::default()), 16);

        let socket = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        socket
            .send_to(
                b"<165>1 2003-08-24T12:14:15.000003Z 192.0.2.1 myproc 8710 - - %% hi",
                ("127.0.0.1", port),
            )
            .await
            .unwrap();

        let record = decoder.recv().await.unwrap();
        assert_eq!(record.app_name.as_deref(), Some("myproc"));
        assert_eq!(record.raw_ip_address.as_deref(), Some("127.0.0.1"));
        assert_eq!(record.message, "%% hi");
    }

    #[tokio::test]
    async fn malformed_frame_still_emits_a_record() {
        let config = ListenerConfig {
            bind_host: "127.0.0.1".to_owned(),
            port: 0,
            ..Default::default()
        };
        let listener = crate::listener::start(config).await.unwrap();
        let port = listener.port();
        let mut decoder = start_with(listener, Arc::new(FixedClock::new(2024)), Arc::new(TimezoneTable::default()), 16);

        let socket = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        socket.send_to(b"not a syslog frame", ("127.0.0.1", port)).await.unwrap();

        let record = decoder.recv().await.unwrap();
        assert_eq!(record.message, "not a syslog frame");
        assert!(record.facility.is_none());
        assert_eq!(record.raw_ip_address.as_deref(), Some("127.0.0.1"));
    }

    #[tokio::test]
    async fn default_protocol_is_udp() {
        let config = ListenerConfig::default();
        assert_eq!(config.protocol, Protocol::Udp);
    }
}
