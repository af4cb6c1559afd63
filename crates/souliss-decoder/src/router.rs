//! Routing of decoded values to devices, topics and the discovery sink.

use std::net::Ipv4Addr;
use std::sync::Arc;

use souliss_metrics::{gateway_labels, gateway_labels_with, metric_defs};
use souliss_protocol::{decode_typical, ActionTopic, DecodedValue, ProtocolError, TypicalCode};
use tracing::{debug, trace};

use crate::registry::{DeviceAddress, DeviceRegistry, TopicRegistry};
use crate::sink::DiscoverySink;
use crate::topology::TopologyInfo;

/// What became of one routed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    /// Values handed to a device or topic.
    Delivered(usize),
    /// Escalated to the discovery sink.
    Discovered,
    /// A device already owns the address; nothing to announce.
    Known,
    /// No device at the address; dropped without escalation.
    Unregistered,
    /// Found a handler but the payload decoded to nothing (e.g. NaN).
    NoUpdate,
}

/// Routes to the registries, falling back to the discovery sink.
pub struct Router {
    devices: Arc<dyn DeviceRegistry>,
    topics: Arc<dyn TopicRegistry>,
    sink: Arc<dyn DiscoverySink>,
}

impl Router {
    /// Create a router.
    pub fn new(devices: Arc<dyn DeviceRegistry>, topics: Arc<dyn TopicRegistry>, sink: Arc<dyn DiscoverySink>) -> Self {
        Router { devices, topics, sink }
    }

    /// Decode and deliver the state of the device at `address`.
    ///
    /// `offset` is the device's position within `payload`. A missing device
    /// is expected before discovery completes and is not escalated. A payload
    /// too short for the device's rule fails without delivering anything.
    pub fn route_state(&self, address: DeviceAddress, payload: &[u8], offset: usize) -> Result<Routed, ProtocolError> {
        let Some(device) = self.devices.find_device(address.gateway, address.node, address.slot) else {
            return Ok(Routed::Unregistered);
        };

        let values = decode_typical(device.typical(), payload, offset)?;
        if values.is_empty() {
            return Ok(Routed::NoUpdate);
        }
        for value in &values {
            trace!(%address, ?value, "deliver");
            self.record_value(address.gateway, value);
            device.deliver(*value);
        }
        Ok(Routed::Delivered(values.len()))
    }

    /// Announce a typical unless a device already owns its address.
    pub fn route_typical(&self, address: DeviceAddress, typical: TypicalCode) -> Routed {
        if self.devices.find_device(address.gateway, address.node, address.slot).is_some() {
            return Routed::Known;
        }
        debug!(%address, %typical, "typical discovered");
        self.record_discovery(address.gateway, "typical");
        self.sink
            .on_typical_discovered(address.gateway, typical, address.node, address.slot);
        Routed::Discovered
    }

    /// Apply a node's health byte to every device on it.
    ///
    /// Returns the number of devices updated.
    pub fn route_health(&self, gateway: u8, node: u8, raw: u8) -> usize {
        let devices = self.devices.devices_on_node(gateway, node);
        for device in &devices {
            device.update_health(raw);
        }
        if !devices.is_empty() {
            metrics::counter!(metric_defs::HEALTH_UPDATES.name, &gateway_labels(gateway))
                .increment(devices.len() as u64);
        }
        devices.len()
    }

    /// Deliver an action message to its topic, or announce the topic.
    pub fn route_topic(&self, gateway: u8, topic: &ActionTopic) -> Routed {
        let Some(handle) = self.topics.find_topic(topic.number, topic.variant) else {
            debug!(number = topic.number, variant = topic.variant, "topic discovered");
            self.record_discovery(gateway, "topic");
            self.sink.on_topic_discovered(topic.number, topic.variant);
            return Routed::Discovered;
        };

        match topic.available_value() {
            Some(value) => {
                let value = DecodedValue::Analog(value);
                self.record_value(gateway, &value);
                handle.deliver(value);
                Routed::Delivered(1)
            }
            None => Routed::NoUpdate,
        }
    }

    /// Forward a discover-broadcast answer.
    pub fn gateway_discovered(&self, gateway: u8, address: Ipv4Addr, discriminator: u8) {
        debug!(%address, discriminator, "gateway discovered");
        self.record_discovery(gateway, "gateway");
        self.sink.on_gateway_discovered(address, discriminator);
    }

    /// Forward a ping answer.
    pub fn gateway_alive(&self, gateway: u8) {
        self.record_discovery(gateway, "alive");
        self.sink.on_gateway_alive(gateway);
    }

    /// Forward a learned topology.
    pub fn topology_learned(&self, gateway: u8, topology: TopologyInfo) {
        self.record_discovery(gateway, "topology");
        self.sink.on_topology_learned(gateway, topology);
    }

    fn record_value(&self, gateway: u8, value: &DecodedValue) {
        metrics::counter!(
            metric_defs::VALUES_DELIVERED.name,
            &gateway_labels_with(gateway, &[("kind", value.kind())])
        )
        .increment(1);
    }

    fn record_discovery(&self, gateway: u8, kind: &'static str) {
        metrics::counter!(
            metric_defs::DISCOVERY_EVENTS.name,
            &gateway_labels_with(gateway, &[("kind", kind)])
        )
        .increment(1);
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").finish_non_exhaustive()
    }
}
