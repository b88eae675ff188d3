//! Error taxonomy for the parser, listener, and decoder.
//!
//! Parse errors are never fatal -- see [`crate::parser::parse`], which
//! always returns a [`crate::record::Record`] -- so [`ParseErrorKind`] is
//! used internally to decide between graceful degradation and 5424->3164
//! fallback, not surfaced to callers. [`ListenerError`] and [`DecoderError`]
//! are the taxonomy callers actually see.

/// Internal diagnostics raised while attempting one dialect.
///
/// Only [`ParseErrorKind::PriInvalid`] and [`ParseErrorKind::VersionInvalid`]
/// trigger a 5424->3164 fallback; every other variant is recovered locally
/// by leaving the offending field unset.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("missing PRI header")]
    PriMissing,

    #[error("invalid PRI value: {0}")]
    PriInvalid(String),

    #[error("invalid RFC 5424 version: {0}")]
    VersionInvalid(String),

    #[error("no timestamp dialect matched")]
    TimestampInvalid,

    #[error("field '{0}' exceeds its maximum length")]
    FieldTooLong(&'static str),

    #[error("malformed structured data")]
    StructuredDataInvalid,
}

/// Errors that stop a [`crate::listener::Listener`] entirely.
///
/// Per the transport error taxonomy, only bind/listen/accept failures are
/// fatal; a single client's read error closes that client and nothing else.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("failed to bind {protocol} socket on {addr}: {source}")]
    Bind {
        protocol: &'static str,
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("fatal accept error: {0}")]
    Accept(#[source] std::io::Error),

    #[error("failed to read bound local address: {0}")]
    LocalAddr(#[source] std::io::Error),
}

/// Errors surfaced by the decoder stage.
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("downstream receiver dropped, decoder cannot forward records")]
    SinkClosed,
}

/// Errors raised while validating a [`crate::config::ListenerConfig`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("config error: {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display() {
        let err = ParseErrorKind::FieldTooLong("hostname");
        assert!(err.to_string().contains("hostname"));
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::Invalid {
            field: "channel_capacity",
            reason: "must be greater than 0".to_owned(),
        };
        assert!(err.to_string().contains("channel_capacity"));
    }
}
