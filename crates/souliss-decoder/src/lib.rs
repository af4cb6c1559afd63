//! Souliss Telemetry Decoder
//!
//! Turns MaCaCo response frames from Souliss gateways into typed values for
//! registered devices, and reports everything it cannot place to a
//! discovery sink.
//!
//! # Architecture
//!
//! - [`Decoder`] dispatches each frame on its functional code
//! - [`TopologyResolver`] holds each gateway's slots-per-node, learned from
//!   its database structure response
//! - [`Router`] looks devices and topics up in the registries and falls back
//!   to the [`DiscoverySink`]
//! - [`UdpListener`] runs a blocking receive loop that feeds the decoder
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use souliss_decoder::{ChannelSink, Decoder, DiscoveryEvent, MemoryRegistry};
//! use souliss_protocol::TypicalCode;
//!
//! let registry = Arc::new(MemoryRegistry::new());
//! let (sink, events) = ChannelSink::unbounded();
//! let decoder = Decoder::new(registry.clone(), registry, Arc::new(sink));
//!
//! // Database structure: 1 node, 8 typicals per node.
//! decoder.on_datagram(77, &[0x36, 0, 0, 0, 4, 1, 10, 8, 5]);
//! // Typical definitions for node 0: T11 in slot 0.
//! decoder.on_datagram(77, &[0x32, 0, 0, 0, 1, 0x11]);
//!
//! let discovered: Vec<_> = events.try_iter().collect();
//! assert!(discovered.contains(&DiscoveryEvent::TypicalDiscovered {
//!     gateway: 77,
//!     typical: TypicalCode::T11,
//!     node: 0,
//!     slot: 0,
//! }));
//! ```

pub mod config;
mod decoder;
mod error;
pub mod listener;
mod registry;
mod router;
mod sink;
mod topology;

pub use config::{DecoderConfig, DecoderOptions, ListenerConfig};
pub use decoder::{Decoder, Dispatched};
pub use error::{ConfigError, DecodeError, ListenerError, Result};
pub use listener::{ListenerHandle, UdpListener};
pub use registry::{DeviceAddress, DeviceHandle, DeviceRegistry, MemoryRegistry, TopicHandle, TopicRegistry};
pub use router::{Routed, Router};
pub use sink::{ChannelSink, DiscoveryEvent, DiscoverySink, NullSink};
pub use topology::{TopologyInfo, TopologyResolver, TopologyState};
