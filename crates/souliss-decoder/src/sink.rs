//! Discovery sink.
//!
//! Anything the decoder cannot route to a registered device or topic ends up
//! here, together with gateway-level notifications.

use std::net::Ipv4Addr;

use crossbeam_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};
use souliss_protocol::TypicalCode;
use tracing::trace;

use crate::topology::TopologyInfo;

/// Receiver of discovery notifications.
pub trait DiscoverySink: Send + Sync {
    /// A typical definition named a slot with no registered device.
    fn on_typical_discovered(&self, gateway: u8, typical: TypicalCode, node: u8, slot: u8);

    /// An action message carried a topic with no registered handler.
    fn on_topic_discovered(&self, number: u16, variant: u8);

    /// A gateway answered a broadcast discovery.
    fn on_gateway_discovered(&self, address: Ipv4Addr, discriminator: u8);

    /// A gateway answered a ping.
    fn on_gateway_alive(&self, _gateway: u8) {}

    /// A gateway's database structure was learned.
    fn on_topology_learned(&self, _gateway: u8, _topology: TopologyInfo) {}
}

/// One sink notification as a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscoveryEvent {
    /// See [`DiscoverySink::on_typical_discovered`].
    TypicalDiscovered {
        /// Gateway discriminator.
        gateway: u8,
        /// Announced typical.
        typical: TypicalCode,
        /// Node.
        node: u8,
        /// Slot.
        slot: u8,
    },
    /// See [`DiscoverySink::on_topic_discovered`].
    TopicDiscovered {
        /// Topic number.
        number: u16,
        /// Topic variant.
        variant: u8,
    },
    /// See [`DiscoverySink::on_gateway_discovered`].
    GatewayDiscovered {
        /// Gateway address.
        address: Ipv4Addr,
        /// Gateway discriminator.
        discriminator: u8,
    },
    /// See [`DiscoverySink::on_gateway_alive`].
    GatewayAlive {
        /// Gateway discriminator.
        gateway: u8,
    },
    /// See [`DiscoverySink::on_topology_learned`].
    TopologyLearned {
        /// Gateway discriminator.
        gateway: u8,
        /// Learned topology.
        topology: TopologyInfo,
    },
}

impl DiscoveryEvent {
    /// Short name, used as a metric label.
    pub const fn kind(&self) -> &'static str {
        match self {
            DiscoveryEvent::TypicalDiscovered { .. } => "typical",
            DiscoveryEvent::TopicDiscovered { .. } => "topic",
            DiscoveryEvent::GatewayDiscovered { .. } => "gateway",
            DiscoveryEvent::GatewayAlive { .. } => "alive",
            DiscoveryEvent::TopologyLearned { .. } => "topology",
        }
    }
}

/// Sink that forwards every notification over a channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<DiscoveryEvent>,
}

impl ChannelSink {
    /// Create a sink with an unbounded channel.
    pub fn unbounded() -> (Self, Receiver<DiscoveryEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (ChannelSink { tx }, rx)
    }

    /// Create a sink over an existing sender.
    pub fn new(tx: Sender<DiscoveryEvent>) -> Self {
        ChannelSink { tx }
    }

    fn send(&self, event: DiscoveryEvent) {
        if self.tx.send(event).is_err() {
            trace!(kind = event.kind(), "discovery receiver dropped");
        }
    }
}

impl DiscoverySink for ChannelSink {
    fn on_typical_discovered(&self, gateway: u8, typical: TypicalCode, node: u8, slot: u8) {
        self.send(DiscoveryEvent::TypicalDiscovered {
            gateway,
            typical,
            node,
            slot,
        });
    }

    fn on_topic_discovered(&self, number: u16, variant: u8) {
        self.send(DiscoveryEvent::TopicDiscovered { number, variant });
    }

    fn on_gateway_discovered(&self, address: Ipv4Addr, discriminator: u8) {
        self.send(DiscoveryEvent::GatewayDiscovered { address, discriminator });
    }

    fn on_gateway_alive(&self, gateway: u8) {
        self.send(DiscoveryEvent::GatewayAlive { gateway });
    }

    fn on_topology_learned(&self, gateway: u8, topology: TopologyInfo) {
        self.send(DiscoveryEvent::TopologyLearned { gateway, topology });
    }
}

/// Sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiscoverySink for NullSink {
    fn on_typical_discovered(&self, _gateway: u8, _typical: TypicalCode, _node: u8, _slot: u8) {}
    fn on_topic_discovered(&self, _number: u16, _variant: u8) {}
    fn on_gateway_discovered(&self, _address: Ipv4Addr, _discriminator: u8) {}
}
