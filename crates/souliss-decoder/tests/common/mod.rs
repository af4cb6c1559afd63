//! Recording collaborators shared by the integration tests.

#![allow(dead_code)]

use std::net::Ipv4Addr;
use std::sync::Arc;

use parking_lot::Mutex;
use souliss_decoder::{Decoder, DeviceAddress, DiscoverySink, MemoryRegistry, TopologyInfo};
use souliss_decoder::{DeviceHandle, TopicHandle};
use souliss_protocol::{DecodedValue, TypicalCode, FN_DBSTRUCT_RESP};
use tracing_subscriber::EnvFilter;

/// Device that records everything it receives.
pub struct RecordingDevice {
    typical: TypicalCode,
    pub values: Mutex<Vec<DecodedValue>>,
    pub health: Mutex<Vec<u8>>,
}

impl RecordingDevice {
    pub fn new(typical: TypicalCode) -> Arc<Self> {
        Arc::new(RecordingDevice {
            typical,
            values: Mutex::new(Vec::new()),
            health: Mutex::new(Vec::new()),
        })
    }

    pub fn values(&self) -> Vec<DecodedValue> {
        self.values.lock().clone()
    }
}

impl DeviceHandle for RecordingDevice {
    fn typical(&self) -> TypicalCode {
        self.typical
    }

    fn deliver(&self, value: DecodedValue) {
        self.values.lock().push(value);
    }

    fn update_health(&self, raw: u8) {
        self.health.lock().push(raw);
    }
}

/// Topic that records everything it receives.
#[derive(Default)]
pub struct RecordingTopic {
    pub values: Mutex<Vec<DecodedValue>>,
}

impl TopicHandle for RecordingTopic {
    fn deliver(&self, value: DecodedValue) {
        self.values.lock().push(value);
    }
}

/// Every call made on the sink, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Typical(u8, TypicalCode, u8, u8),
    Topic(u16, u8),
    Gateway(Ipv4Addr, u8),
    Alive(u8),
    Topology(u8, TopologyInfo),
}

#[derive(Default)]
pub struct RecordingSink {
    pub calls: Mutex<Vec<SinkCall>>,
}

impl RecordingSink {
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().clone()
    }

    pub fn typicals(&self) -> Vec<(u8, TypicalCode, u8, u8)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SinkCall::Typical(gateway, typical, node, slot) => Some((gateway, typical, node, slot)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl DiscoverySink for RecordingSink {
    fn on_typical_discovered(&self, gateway: u8, typical: TypicalCode, node: u8, slot: u8) {
        self.calls.lock().push(SinkCall::Typical(gateway, typical, node, slot));
    }

    fn on_topic_discovered(&self, number: u16, variant: u8) {
        self.calls.lock().push(SinkCall::Topic(number, variant));
    }

    fn on_gateway_discovered(&self, address: Ipv4Addr, discriminator: u8) {
        self.calls.lock().push(SinkCall::Gateway(address, discriminator));
    }

    fn on_gateway_alive(&self, gateway: u8) {
        self.calls.lock().push(SinkCall::Alive(gateway));
    }

    fn on_topology_learned(&self, gateway: u8, topology: TopologyInfo) {
        self.calls.lock().push(SinkCall::Topology(gateway, topology));
    }
}

/// Route decoder logs to the test output. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("souliss_decoder=trace"))
        .with_test_writer()
        .try_init();
}

/// A decoder wired to a fresh registry and recording sink.
pub struct Harness {
    pub decoder: Decoder,
    pub registry: Arc<MemoryRegistry>,
    pub sink: Arc<RecordingSink>,
}

impl Harness {
    pub fn new() -> Self {
        let registry = Arc::new(MemoryRegistry::new());
        let sink = Arc::new(RecordingSink::default());
        let decoder = Decoder::new(registry.clone(), registry.clone(), sink.clone());
        Harness {
            decoder,
            registry,
            sink,
        }
    }

    /// Teach `gateway` its topology and forget the resulting sink call.
    pub fn learn(&self, gateway: u8, nodes: u8, typicals_per_node: u8) {
        self.decoder
            .on_datagram(gateway, &[FN_DBSTRUCT_RESP, 0, 0, 0, 4, nodes, nodes, typicals_per_node, 10]);
        self.sink.clear();
    }

    pub fn device(&self, gateway: u8, node: u8, slot: u8, typical: TypicalCode) -> Arc<RecordingDevice> {
        let device = RecordingDevice::new(typical);
        self.registry
            .register_device(DeviceAddress::new(gateway, node, slot), device.clone());
        device
    }
}
