//! Error types for the decoder.

use std::net::SocketAddr;

use souliss_protocol::ProtocolError;
use thiserror::Error;

/// Why a frame produced no effect.
///
/// These never escape [`Decoder::on_datagram`](crate::Decoder::on_datagram);
/// they are returned by [`Decoder::dispatch`](crate::Decoder::dispatch) for
/// callers and tests that want to know what happened.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Frame is malformed for its functional code.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Slot arithmetic needed before the database structure is known.
    #[error("topology of gateway {gateway} not learned yet")]
    TopologyUnlearned {
        /// Gateway discriminator.
        gateway: u8,
    },

    /// Database structure announced zero typicals per node.
    #[error("gateway {gateway} reported zero typicals per node")]
    EmptyTopology {
        /// Gateway discriminator.
        gateway: u8,
    },

    /// Functional code not handled by the decoder.
    #[error("unknown functional code: 0x{0:02X}")]
    UnknownFunctionalCode(u8),
}

impl DecodeError {
    /// Short stable reason, used as a metric label.
    pub const fn reason(&self) -> &'static str {
        match self {
            DecodeError::Protocol(_) | DecodeError::EmptyTopology { .. } => "malformed",
            DecodeError::TopologyUnlearned { .. } => "topology_unlearned",
            DecodeError::UnknownFunctionalCode(_) => "unknown_function",
        }
    }
}

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A value failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors starting a receive loop.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested local address.
        addr: SocketAddr,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Socket option or thread spawn failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for decode operations.
pub type Result<T> = std::result::Result<T, DecodeError>;
