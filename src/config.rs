//! Listener configuration.
//!
//! [`ListenerConfig`] is the external configuration surface for
//! [`crate::listener::start`]; the CLI or config file that would populate
//! it is out of scope for this crate (see the crate-level docs), but the
//! validating builder shape is carried regardless.

use crate::error::ConfigError;

/// Which transport the listener binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    #[default]
    Udp,
    Tcp,
}

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Transport protocol. Defaults to UDP.
    pub protocol: Protocol,
    /// Port to bind. `0` requests an OS-assigned (ephemeral) port.
    pub port: u16,
    /// Address to bind to. Defaults to all interfaces.
    pub bind_host: String,
    /// Capacity of the frame channel between the listener and the decoder.
    /// This bound *is* the demand budget described in the concurrency model:
    /// its free slots are outstanding downstream demand.
    pub channel_capacity: usize,
    /// Maximum concurrent TCP connections. Ignored for UDP.
    pub max_connections: usize,
    /// Maximum bytes read from a single UDP datagram or TCP read.
    pub max_frame_size: usize,
    /// TCP connection idle timeout, in seconds. `0` disables the timeout.
    pub tcp_idle_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::default(),
            port: 5544,
            bind_host: "0.0.0.0".to_owned(),
            channel_capacity: 1024,
            max_connections: 256,
            max_frame_size: 64 * 1024,
            tcp_idle_timeout_secs: 300,
        }
    }
}

impl ListenerConfig {
    /// Validates the configuration, returning the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "channel_capacity",
                reason: "must be greater than 0".to_owned(),
            });
        }
        if self.max_connections == 0 && self.protocol == Protocol::Tcp {
            return Err(ConfigError::Invalid {
                field: "max_connections",
                reason: "must be greater than 0 for tcp".to_owned(),
            });
        }
        if self.max_frame_size == 0 {
            return Err(ConfigError::Invalid {
                field: "max_frame_size",
                reason: "must be greater than 0".to_owned(),
            });
        }
        Ok(())
    }

    /// The socket address to bind, as a string suitable for `TcpListener`/`UdpSocket::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

/// Builder for [`ListenerConfig`].
#[derive(Default)]
pub struct ListenerConfigBuilder {
    config: ListenerConfig,
}

impl ListenerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.config.protocol = protocol;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn bind_host(mut self, host: impl Into<String>) -> Self {
        self.config.bind_host = host.into();
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    pub fn max_connections(mut self, max: usize) -> Self {
        self.config.max_connections = max;
        self
    }

    pub fn max_frame_size(mut self, size: usize) -> Self {
        self.config.max_frame_size = size;
        self
    }

    pub fn build(self) -> Result<ListenerConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ListenerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.protocol, Protocol::Udp);
        assert_eq!(config.port, 5544);
    }

    #[test]
    fn validate_rejects_zero_channel_capacity() {
        let mut config = ListenerConfig::default();
        config.channel_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_max_connections_for_tcp() {
        let mut config = ListenerConfig {
            protocol: Protocol::Tcp,
            ..Default::default()
        };
        config.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn builder_round_trips_fields() {
        let config = ListenerConfigBuilder::new()
            .protocol(Protocol::Tcp)
            .port(0)
            .channel_capacity(16)
            .build()
            .unwrap();
        assert_eq!(config.protocol, Protocol::Tcp);
        assert_eq!(config.port, 0);
        assert_eq!(config.channel_capacity, 16);
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let result = ListenerConfigBuilder::new().channel_capacity(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn bind_addr_formats_host_and_port() {
        let config = ListenerConfig {
            bind_host: "127.0.0.1".to_owned(),
            port: 5544,
            ..Default::default()
        };
        assert_eq!(config.bind_addr(), "127.0.0.1:5544");
    }
}
