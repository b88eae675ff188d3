//! A tolerant RFC 5424/3164 syslog parser plus a demand-driven UDP/TCP
//! ingestion pipeline.
//!
//! ```text
//!   Network  ->  Listener  ->  Decoder  ->  Sink (your code)
//!               (raw frames)   (records)
//! ```
//!
//! [`listener::start`] owns the socket and produces [`listener::Frame`]s;
//! [`decoder::start`] runs [`parser::parse`] on each one and stamps the
//! peer address. [`serve`] wires the two together for the common case.

pub mod clock;
pub mod config;
pub mod decoder;
pub mod error;
pub mod listener;
pub mod parser;
pub mod record;

use config::{ListenerConfig, Protocol};
use decoder::DecoderHandle;
use error::ListenerError;

/// Starts a listener and its decoder on `port` with the given `protocol`,
/// returning the actually-bound port (useful when `port == 0`) and a
/// handle to receive normalized records from.
pub async fn serve(protocol: Protocol, port: u16) -> Result<(u16, DecoderHandle), ListenerError> {
    let config = ListenerConfig {
        protocol,
        port,
        ..ListenerConfig::default()
    };
    let listener = listener::start(config).await?;
    let bound_port = listener.port();
    Ok((bound_port, decoder::start(listener)))
}
