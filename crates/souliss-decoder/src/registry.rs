//! Device and topic registries.
//!
//! The decoder never owns devices. It looks them up through
//! [`DeviceRegistry`] and [`TopicRegistry`] and pushes values into the
//! handles it gets back. [`MemoryRegistry`] is a ready-made implementation
//! of both.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use souliss_protocol::{DecodedValue, TypicalCode};

/// Address of one device: gateway discriminator, node and slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviceAddress {
    /// Gateway discriminator.
    pub gateway: u8,
    /// Node index behind the gateway.
    pub node: u8,
    /// Slot within the node.
    pub slot: u8,
}

impl DeviceAddress {
    /// Create an address.
    pub const fn new(gateway: u8, node: u8, slot: u8) -> Self {
        DeviceAddress { gateway, node, slot }
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.gateway, self.node, self.slot)
    }
}

/// A registered device.
pub trait DeviceHandle: Send + Sync {
    /// The typical the device was created for; selects its decode rule.
    fn typical(&self) -> TypicalCode;

    /// Receive one decoded value.
    fn deliver(&self, value: DecodedValue);

    /// Receive the raw health byte of the device's node.
    fn update_health(&self, raw: u8);
}

/// A registered action-message topic.
pub trait TopicHandle: Send + Sync {
    /// Receive the topic's value.
    fn deliver(&self, value: DecodedValue);
}

/// Lookup of devices by address.
pub trait DeviceRegistry: Send + Sync {
    /// The device at exactly `(gateway, node, slot)`.
    fn find_device(&self, gateway: u8, node: u8, slot: u8) -> Option<Arc<dyn DeviceHandle>>;

    /// Every device on a node, in slot order.
    fn devices_on_node(&self, gateway: u8, node: u8) -> Vec<Arc<dyn DeviceHandle>>;
}

/// Lookup of topics by number and variant.
pub trait TopicRegistry: Send + Sync {
    /// The topic registered for `(number, variant)`.
    fn find_topic(&self, number: u16, variant: u8) -> Option<Arc<dyn TopicHandle>>;
}

type NodeSlots = BTreeMap<(u8, u8), Arc<dyn DeviceHandle>>;

/// In-memory registry, one lock per gateway discriminator.
pub struct MemoryRegistry {
    devices: Box<[RwLock<NodeSlots>]>,
    topics: RwLock<HashMap<(u16, u8), Arc<dyn TopicHandle>>>,
}

impl MemoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        let devices = (0..=u8::MAX)
            .map(|_| RwLock::new(NodeSlots::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        MemoryRegistry {
            devices,
            topics: RwLock::new(HashMap::new()),
        }
    }

    fn shard(&self, gateway: u8) -> &RwLock<NodeSlots> {
        &self.devices[usize::from(gateway)]
    }

    /// Register a device, returning any device it replaced.
    pub fn register_device(
        &self,
        address: DeviceAddress,
        device: Arc<dyn DeviceHandle>,
    ) -> Option<Arc<dyn DeviceHandle>> {
        self.shard(address.gateway)
            .write()
            .insert((address.node, address.slot), device)
    }

    /// Remove a device.
    pub fn unregister_device(&self, address: DeviceAddress) -> Option<Arc<dyn DeviceHandle>> {
        self.shard(address.gateway)
            .write()
            .remove(&(address.node, address.slot))
    }

    /// Register a topic, returning any topic it replaced.
    pub fn register_topic(&self, number: u16, variant: u8, topic: Arc<dyn TopicHandle>) -> Option<Arc<dyn TopicHandle>> {
        self.topics.write().insert((number, variant), topic)
    }

    /// Remove a topic.
    pub fn unregister_topic(&self, number: u16, variant: u8) -> Option<Arc<dyn TopicHandle>> {
        self.topics.write().remove(&(number, variant))
    }

    /// Registered device addresses on a gateway, in node/slot order.
    pub fn addresses(&self, gateway: u8) -> Vec<DeviceAddress> {
        self.shard(gateway)
            .read()
            .keys()
            .map(|&(node, slot)| DeviceAddress::new(gateway, node, slot))
            .collect()
    }

    /// Total number of registered devices.
    pub fn device_count(&self) -> usize {
        self.devices.iter().map(|shard| shard.read().len()).sum()
    }

    /// Total number of registered topics.
    pub fn topic_count(&self) -> usize {
        self.topics.read().len()
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryRegistry")
            .field("devices", &self.device_count())
            .field("topics", &self.topic_count())
            .finish()
    }
}

impl DeviceRegistry for MemoryRegistry {
    fn find_device(&self, gateway: u8, node: u8, slot: u8) -> Option<Arc<dyn DeviceHandle>> {
        self.shard(gateway).read().get(&(node, slot)).cloned()
    }

    fn devices_on_node(&self, gateway: u8, node: u8) -> Vec<Arc<dyn DeviceHandle>> {
        self.shard(gateway)
            .read()
            .range((node, u8::MIN)..=(node, u8::MAX))
            .map(|(_, device)| Arc::clone(device))
            .collect()
    }
}

impl TopicRegistry for MemoryRegistry {
    fn find_topic(&self, number: u16, variant: u8) -> Option<Arc<dyn TopicHandle>> {
        self.topics.read().get(&(number, variant)).cloned()
    }
}
