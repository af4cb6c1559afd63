//! YAML configuration.
//!
//! ```yaml
//! listener:
//!   bind_address: 0.0.0.0
//!   port: 230
//!   receive_buffer: 200
//!   read_timeout_ms: 1000
//! decoder:
//!   discover_unknown_typicals: true
//! ```
//!
//! Every field is optional.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use souliss_protocol::{DEFAULT_GATEWAY_PORT, VNET_HEADER_LEN};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Receive loop settings.
    pub listener: ListenerConfig,
    /// Decoder behavior.
    pub decoder: DecoderOptions,
}

/// Receive loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Local address to bind.
    pub bind_address: IpAddr,
    /// Local UDP port.
    pub port: u16,
    /// Receive buffer size in bytes; longer datagrams are truncated.
    pub receive_buffer: usize,
    /// How often the loop checks its stop flag.
    pub read_timeout_ms: u64,
}

impl ListenerConfig {
    /// The address to bind.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    /// Socket read timeout.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        ListenerConfig {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_GATEWAY_PORT,
            receive_buffer: 200,
            read_timeout_ms: 1000,
        }
    }
}

/// Decoder behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderOptions {
    /// Announce typical codes this decoder has no rule for.
    pub discover_unknown_typicals: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions {
            discover_unknown_typicals: true,
        }
    }
}

impl DecoderConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: DecoderConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Check values that would make the listener unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listener.receive_buffer <= VNET_HEADER_LEN {
            return Err(ConfigError::Invalid(format!(
                "receive_buffer must exceed the {}-byte vNet header, got {}",
                VNET_HEADER_LEN, self.listener.receive_buffer
            )));
        }
        if self.listener.read_timeout_ms == 0 {
            return Err(ConfigError::Invalid("read_timeout_ms must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DecoderConfig::default();
        assert_eq!(config.listener.port, 230);
        assert_eq!(config.listener.receive_buffer, 200);
        assert_eq!(config.listener.read_timeout(), Duration::from_secs(1));
        assert_eq!(config.listener.socket_addr(), "0.0.0.0:230".parse::<SocketAddr>().unwrap());
        assert!(config.decoder.discover_unknown_typicals);
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = DecoderConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, DecoderConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let yaml = r#"
listener:
  bind_address: 127.0.0.1
  port: 23000
decoder:
  discover_unknown_typicals: false
"#;
        let config = DecoderConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.listener.socket_addr(), "127.0.0.1:23000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.listener.receive_buffer, 200);
        assert!(!config.decoder.discover_unknown_typicals);
    }

    #[test]
    fn test_rejects_small_buffer() {
        let err = DecoderConfig::from_yaml_str("listener:\n  receive_buffer: 7\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = DecoderConfig::from_yaml_str("listener:\n  read_timeout_ms: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_bad_yaml() {
        let err = DecoderConfig::from_yaml_str("listener: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = DecoderConfig::default();
        let yaml = config.to_yaml().unwrap();
        assert_eq!(DecoderConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let err = DecoderConfig::from_file("/nonexistent/souliss.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
