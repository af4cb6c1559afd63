//! Functional-code dispatcher.
//!
//! [`Decoder`] takes one MaCaCo frame at a time, picks the handler for its
//! functional code and runs it to completion on the calling thread. Frames
//! that cannot be handled are dropped; nothing here panics on input and
//! nothing is reported back to the gateway.

use std::net::Ipv4Addr;
use std::sync::Arc;

use souliss_metrics::{gateway_labels, gateway_labels_with, metric_defs};
use souliss_protocol::{
    ActionTopic, DbStruct, Frame, FunctionalCode, GatewayAnnouncement, NodeRange, ProtocolError, TypicalCode,
    MACACO_PUTIN_HI, VNET_SOURCE_LO,
};
use tracing::{debug, trace};

use crate::config::DecoderOptions;
use crate::error::{DecodeError, Result};
use crate::registry::{DeviceAddress, DeviceRegistry, TopicRegistry};
use crate::router::{Routed, Router};
use crate::sink::DiscoverySink;
use crate::topology::{TopologyInfo, TopologyResolver};

/// Effect of one dispatched frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dispatched {
    /// Ping answer forwarded to the sink.
    GatewayAlive,
    /// Discover-broadcast answer forwarded to the sink.
    GatewayDiscovered {
        /// Announced address.
        address: Ipv4Addr,
        /// Its last octet.
        discriminator: u8,
    },
    /// Database structure stored.
    TopologyLearned(TopologyInfo),
    /// Typical definitions enumerated.
    Typicals {
        /// Announced to the sink.
        discovered: usize,
        /// Already owned by a registered device.
        known: usize,
    },
    /// State bytes routed.
    States {
        /// Values delivered across all devices.
        delivered: usize,
        /// Devices whose rule ran past the end of the payload.
        truncated: usize,
    },
    /// Health bytes applied.
    Health {
        /// Devices updated.
        updated: usize,
    },
    /// Action message routed.
    Topic(Routed),
}

/// Dispatcher for frames from any number of gateways.
///
/// All methods take `&self`; share one decoder between receive loops with
/// an [`Arc`].
#[derive(Debug)]
pub struct Decoder {
    topology: TopologyResolver,
    router: Router,
    options: DecoderOptions,
}

impl Decoder {
    /// Create a decoder over the given collaborators.
    pub fn new(devices: Arc<dyn DeviceRegistry>, topics: Arc<dyn TopicRegistry>, sink: Arc<dyn DiscoverySink>) -> Self {
        Decoder {
            topology: TopologyResolver::new(),
            router: Router::new(devices, topics, sink),
            options: DecoderOptions::default(),
        }
    }

    /// Replace the decoder options.
    pub fn with_options(mut self, options: DecoderOptions) -> Self {
        self.options = options;
        self
    }

    /// Per-gateway topology state.
    pub fn topology(&self) -> &TopologyResolver {
        &self.topology
    }

    /// Handle a MaCaCo frame from `gateway`.
    ///
    /// Never fails: malformed, unknown and premature frames are logged and
    /// dropped.
    pub fn on_datagram(&self, gateway: u8, payload: &[u8]) {
        let frame = match Frame::new(gateway, payload.to_vec()) {
            Ok(frame) => frame,
            Err(err) => {
                self.dropped(gateway, &DecodeError::from(err));
                return;
            }
        };
        self.handle(&frame);
    }

    /// Handle a datagram still carrying its vNet header.
    ///
    /// The gateway discriminator is taken from the header's source address.
    pub fn on_vnet_datagram(&self, datagram: &[u8]) {
        match Frame::from_vnet(datagram) {
            Ok(frame) => self.handle(&frame),
            Err(err) => {
                let gateway = datagram.get(VNET_SOURCE_LO).copied().unwrap_or_default();
                self.dropped(gateway, &DecodeError::from(err));
            }
        }
    }

    fn handle(&self, frame: &Frame) {
        if let Err(err) = self.dispatch(frame) {
            self.dropped(frame.gateway(), &err);
        }
    }

    fn dropped(&self, gateway: u8, err: &DecodeError) {
        debug!(gateway, reason = err.reason(), error = %err, "frame dropped");
        metrics::counter!(
            metric_defs::FRAMES_DROPPED.name,
            &gateway_labels_with(gateway, &[("reason", err.reason())])
        )
        .increment(1);
    }

    /// Dispatch one frame and report what it did.
    pub fn dispatch(&self, frame: &Frame) -> Result<Dispatched> {
        let gateway = frame.gateway();
        let code = frame.functional_code();
        trace!(gateway, %code, frame = %hex::encode(frame.as_bytes()), "frame");
        metrics::counter!(
            metric_defs::FRAMES_RECEIVED.name,
            &gateway_labels_with(gateway, &[("function", code.as_str())])
        )
        .increment(1);
        metrics::histogram!(metric_defs::FRAME_SIZE.name, &gateway_labels(gateway)).record(frame.len() as f64);

        match code {
            FunctionalCode::Ping => {
                // Put-in bytes must be present
                frame.require(MACACO_PUTIN_HI + 1)?;
                self.router.gateway_alive(gateway);
                Ok(Dispatched::GatewayAlive)
            }
            FunctionalCode::DiscoverBroadcast => {
                let announcement = GatewayAnnouncement::parse(frame)?;
                let discriminator = announcement.discriminator();
                self.router
                    .gateway_discovered(gateway, announcement.address, discriminator);
                Ok(Dispatched::GatewayDiscovered {
                    address: announcement.address,
                    discriminator,
                })
            }
            FunctionalCode::DbStruct => self.learn_topology(frame),
            FunctionalCode::TypicalDefinition => self.enumerate_typicals(frame),
            FunctionalCode::StateResponse => self.route_states(frame),
            FunctionalCode::Healthy => self.route_health(frame),
            FunctionalCode::ActionMessage => {
                let topic = ActionTopic::parse(frame)?;
                Ok(Dispatched::Topic(self.router.route_topic(gateway, &topic)))
            }
            FunctionalCode::Unknown(code) => Err(DecodeError::UnknownFunctionalCode(code)),
        }
    }

    fn require_topology(&self, gateway: u8) -> Result<TopologyInfo> {
        self.topology
            .learned(gateway)
            .ok_or(DecodeError::TopologyUnlearned { gateway })
    }

    fn learn_topology(&self, frame: &Frame) -> Result<Dispatched> {
        let gateway = frame.gateway();
        let db = DbStruct::parse(frame)?;
        let info = TopologyInfo::from_db_struct(&db).ok_or(DecodeError::EmptyTopology { gateway })?;

        self.topology.learn(gateway, info);
        debug!(
            gateway,
            nodes = db.node_count,
            max_nodes = db.max_nodes,
            typicals_per_node = db.max_typicals_per_node,
            max_requests = db.max_requests,
            "topology learned"
        );
        let labels = gateway_labels(gateway);
        metrics::gauge!(metric_defs::TOPOLOGY_NODES.name, &labels).set(f64::from(info.node_count));
        metrics::gauge!(metric_defs::TOPOLOGY_TYPICALS_PER_NODE.name, &labels)
            .set(f64::from(info.max_typicals_per_node));

        self.router.topology_learned(gateway, info);
        Ok(Dispatched::TopologyLearned(info))
    }

    fn enumerate_typicals(&self, frame: &Frame) -> Result<Dispatched> {
        let gateway = frame.gateway();
        let range = NodeRange::parse(frame)?;
        let topology = self.require_topology(gateway)?;

        let mut discovered = 0;
        let mut known = 0;
        for (index, typical) in range.typicals() {
            if !typical.is_device() {
                continue;
            }
            if matches!(typical, TypicalCode::Unknown(_)) && !self.options.discover_unknown_typicals {
                trace!(gateway, index, %typical, "unknown typical ignored");
                continue;
            }
            let Some((node, slot)) = topology.locate(range.start_node, index) else {
                break;
            };
            match self.router.route_typical(DeviceAddress::new(gateway, node, slot), typical) {
                Routed::Discovered => discovered += 1,
                Routed::Known => known += 1,
                _ => {}
            }
        }
        Ok(Dispatched::Typicals { discovered, known })
    }

    fn route_states(&self, frame: &Frame) -> Result<Dispatched> {
        let gateway = frame.gateway();
        let range = NodeRange::parse(frame)?;
        let topology = self.require_topology(gateway)?;

        let mut delivered = 0;
        let mut truncated = 0;
        for offset in 0..range.bytes.len() {
            let Some((node, slot)) = topology.locate(range.start_node, offset) else {
                break;
            };
            let address = DeviceAddress::new(gateway, node, slot);
            match self.router.route_state(address, range.bytes, offset) {
                Ok(Routed::Delivered(count)) => delivered += count,
                Ok(_) => {}
                Err(err @ ProtocolError::FrameTooShort { .. }) => {
                    debug!(%address, error = %err, "state truncated");
                    truncated += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(Dispatched::States { delivered, truncated })
    }

    fn route_health(&self, frame: &Frame) -> Result<Dispatched> {
        let gateway = frame.gateway();
        let range = NodeRange::parse(frame)?;

        let mut updated = 0;
        for (index, &raw) in range.bytes.iter().enumerate() {
            let Ok(node) = u8::try_from(usize::from(range.start_node) + index) else {
                break;
            };
            updated += self.router.route_health(gateway, node, raw);
        }
        Ok(Dispatched::Health { updated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryRegistry;
    use crate::sink::{ChannelSink, DiscoveryEvent};
    use souliss_protocol::*;

    fn decoder() -> (Decoder, crossbeam_channel::Receiver<DiscoveryEvent>) {
        let registry = Arc::new(MemoryRegistry::new());
        let (sink, rx) = ChannelSink::unbounded();
        (Decoder::new(registry.clone(), registry, Arc::new(sink)), rx)
    }

    fn frame(gateway: u8, bytes: &[u8]) -> Frame {
        Frame::new(gateway, bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_ping() {
        let (decoder, rx) = decoder();
        assert_eq!(decoder.dispatch(&frame(9, &[FN_PING_RESP, 0, 0, 0, 0])), Ok(Dispatched::GatewayAlive));
        assert_eq!(rx.try_recv().unwrap(), DiscoveryEvent::GatewayAlive { gateway: 9 });
    }

    #[test]
    fn test_ping_without_put_in_is_dropped() {
        let (decoder, rx) = decoder();
        assert_eq!(
            decoder.dispatch(&frame(9, &[FN_PING_RESP])),
            Err(DecodeError::Protocol(ProtocolError::FrameTooShort { expected: 3, actual: 1 }))
        );
        assert_eq!(
            decoder.dispatch(&frame(9, &[FN_PING_RESP, 0])),
            Err(DecodeError::Protocol(ProtocolError::FrameTooShort { expected: 3, actual: 2 }))
        );
        assert!(rx.try_recv().is_err());

        assert_eq!(decoder.dispatch(&frame(9, &[FN_PING_RESP, 0, 0])), Ok(Dispatched::GatewayAlive));
    }

    #[test]
    fn test_discover_broadcast() {
        let (decoder, rx) = decoder();
        let result = decoder.dispatch(&frame(0, &[FN_DISCOVER_GW_NODE_BCAST_RESP, 0, 0, 0, 4, 10, 0, 0, 12]));
        assert_eq!(
            result,
            Ok(Dispatched::GatewayDiscovered {
                address: Ipv4Addr::new(10, 0, 0, 12),
                discriminator: 12,
            })
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            DiscoveryEvent::GatewayDiscovered {
                address: Ipv4Addr::new(10, 0, 0, 12),
                discriminator: 12,
            }
        );
    }

    #[test]
    fn test_db_struct_learns_topology() {
        let (decoder, rx) = decoder();
        let info = TopologyInfo {
            node_count: 3,
            max_typicals_per_node: 24,
        };
        assert_eq!(
            decoder.dispatch(&frame(77, &[FN_DBSTRUCT_RESP, 0, 0, 0, 4, 3, 10, 24, 5])),
            Ok(Dispatched::TopologyLearned(info))
        );
        assert_eq!(decoder.topology().learned(77), Some(info));
        assert_eq!(
            rx.try_recv().unwrap(),
            DiscoveryEvent::TopologyLearned {
                gateway: 77,
                topology: info,
            }
        );
    }

    #[test]
    fn test_db_struct_zero_typicals_stays_unlearned() {
        let (decoder, rx) = decoder();
        assert_eq!(
            decoder.dispatch(&frame(77, &[FN_DBSTRUCT_RESP, 0, 0, 0, 4, 3, 10, 0, 5])),
            Err(DecodeError::EmptyTopology { gateway: 77 })
        );
        assert_eq!(decoder.topology().learned(77), None);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unknown_code() {
        let (decoder, _rx) = decoder();
        assert_eq!(
            decoder.dispatch(&frame(1, &[0x99, 0, 0, 0, 0])),
            Err(DecodeError::UnknownFunctionalCode(0x99))
        );
    }

    #[test]
    fn test_typicals_need_topology() {
        let (decoder, rx) = decoder();
        assert_eq!(
            decoder.dispatch(&frame(1, &[FN_TYP_RESP, 0, 0, 0, 1, T11])),
            Err(DecodeError::TopologyUnlearned { gateway: 1 })
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unknown_typicals_can_be_ignored() {
        let registry = Arc::new(MemoryRegistry::new());
        let (sink, rx) = ChannelSink::unbounded();
        let decoder = Decoder::new(registry.clone(), registry, Arc::new(sink)).with_options(DecoderOptions {
            discover_unknown_typicals: false,
        });
        decoder.dispatch(&frame(1, &[FN_DBSTRUCT_RESP, 0, 0, 0, 4, 1, 1, 8, 1])).unwrap();
        let _ = rx.try_recv();

        assert_eq!(
            decoder.dispatch(&frame(1, &[FN_TYP_RESP, 0, 0, 0, 2, 0x7A, T11])),
            Ok(Dispatched::Typicals { discovered: 1, known: 0 })
        );
        assert!(matches!(
            rx.try_recv().unwrap(),
            DiscoveryEvent::TypicalDiscovered { slot: 1, .. }
        ));
    }

    #[test]
    fn test_on_datagram_swallows_errors() {
        let (decoder, rx) = decoder();
        decoder.on_datagram(1, &[]);
        decoder.on_datagram(1, &[0x99]);
        decoder.on_datagram(1, &[FN_POLL_RESP]);
        decoder.on_vnet_datagram(&[1, 2, 3]);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_on_vnet_datagram_uses_source_address() {
        let (decoder, rx) = decoder();
        let datagram = VnetAddress::gateway(0, 42, 0).wrap(&[FN_PING_RESP, 0, 0, 0, 0]).unwrap();
        decoder.on_vnet_datagram(&datagram);
        assert_eq!(rx.try_recv().unwrap(), DiscoveryEvent::GatewayAlive { gateway: 42 });
    }
}
