//! Requests sent to a gateway.
//!
//! Responses to these requests are what the decoder consumes; the polling
//! layer that decides when to send them lives outside this crate.

use bytes::BufMut;

use crate::constants::*;
use crate::error::{ProtocolError, Result};

/// A MaCaCo request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Check that a gateway is alive.
    Ping,
    /// Ask every gateway on the segment to announce itself.
    DiscoverBroadcast,
    /// Read the database structure.
    DbStruct,
    /// Read typical definitions for `count` slots from `start_node`.
    Typicals {
        /// First node.
        start_node: u8,
        /// Number of slots.
        count: u8,
    },
    /// Subscribe to state changes.
    Subscribe {
        /// First node.
        start_node: u8,
        /// Number of nodes.
        count: u8,
    },
    /// Read the current state once.
    Poll {
        /// First node.
        start_node: u8,
        /// Number of nodes.
        count: u8,
    },
    /// Read node health.
    Healthy {
        /// First node.
        start_node: u8,
        /// Number of nodes.
        count: u8,
    },
    /// Write command bytes starting at a slot.
    Force {
        /// Target node.
        node: u8,
        /// First slot to write.
        slot: u8,
        /// Command bytes, one per slot.
        command: Vec<u8>,
    },
}

impl Request {
    /// The request's functional code.
    pub const fn functional_code(&self) -> u8 {
        match self {
            Request::Ping => FN_PING_REQ,
            Request::DiscoverBroadcast => FN_DISCOVER_GW_NODE_BCAST_REQ,
            Request::DbStruct => FN_DBSTRUCT_REQ,
            Request::Typicals { .. } => FN_TYP_REQ,
            Request::Subscribe { .. } => FN_SUBSCRIBE_REQ,
            Request::Poll { .. } => FN_POLL_REQ,
            Request::Healthy { .. } => FN_HEALTHY_REQ,
            Request::Force { .. } => FN_FORCE,
        }
    }

    /// Encode the MaCaCo frame.
    ///
    /// A force request zero-fills the slots before `slot`, since the gateway
    /// writes from slot 0 of the node.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let (start, number_of, payload): (u8, u8, Vec<u8>) = match self {
            Request::Ping | Request::DiscoverBroadcast | Request::DbStruct => (0, 0, Vec::new()),
            Request::Typicals { start_node, count }
            | Request::Subscribe { start_node, count }
            | Request::Poll { start_node, count }
            | Request::Healthy { start_node, count } => (*start_node, *count, Vec::new()),
            Request::Force { node, slot, command } => {
                let len = usize::from(*slot) + command.len();
                if len > MAX_MACACO_PAYLOAD {
                    return Err(ProtocolError::PayloadTooLarge {
                        max: MAX_MACACO_PAYLOAD,
                        actual: len,
                    });
                }
                let mut payload = vec![0u8; usize::from(*slot)];
                payload.extend_from_slice(command);
                (*node, len as u8, payload)
            }
        };

        let mut buf = Vec::with_capacity(MACACO_HEADER_LEN + payload.len());
        buf.put_u8(self.functional_code());
        buf.put_u16_le(0); // put-in
        buf.put_u8(start);
        buf.put_u8(number_of);
        buf.extend_from_slice(&payload);
        Ok(buf)
    }

    /// Encode and wrap in a vNet header addressed to a gateway.
    pub fn encode_vnet(&self, address: VnetAddress) -> Result<Vec<u8>> {
        address.wrap(&self.encode()?)
    }
}

/// Addressing for the vNet header of an outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VnetAddress {
    /// Destination, normally the gateway's last IP octet.
    pub destination: u16,
    /// Source user index.
    pub user_index: u8,
    /// Source node index.
    pub node_index: u8,
}

impl VnetAddress {
    /// Address a gateway by its discriminator.
    pub fn gateway(discriminator: u8, user_index: u8, node_index: u8) -> Self {
        VnetAddress {
            destination: u16::from(discriminator),
            user_index,
            node_index,
        }
    }

    /// Prefix a MaCaCo frame with the vNet header.
    ///
    /// The frame must fit a header plus the maximum payload so the length
    /// bytes cannot overflow.
    pub fn wrap(&self, macaco: &[u8]) -> Result<Vec<u8>> {
        let max = MACACO_HEADER_LEN + MAX_MACACO_PAYLOAD;
        if macaco.len() > max {
            return Err(ProtocolError::PayloadTooLarge {
                max,
                actual: macaco.len(),
            });
        }

        let total = VNET_HEADER_LEN + macaco.len();
        let mut buf = Vec::with_capacity(total);
        buf.put_u8(total as u8);
        buf.put_u8((total - 1) as u8);
        buf.put_u8(VNET_PORT);
        buf.put_u16_le(self.destination);
        buf.put_u8(self.user_index);
        buf.put_u8(self.node_index);
        buf.extend_from_slice(macaco);
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_simple_requests() {
        assert_eq!(Request::Ping.encode().unwrap(), vec![FN_PING_REQ, 0, 0, 0, 0]);
        assert_eq!(Request::DbStruct.encode().unwrap(), vec![FN_DBSTRUCT_REQ, 0, 0, 0, 0]);
        assert_eq!(
            Request::Typicals { start_node: 1, count: 48 }.encode().unwrap(),
            vec![FN_TYP_REQ, 0, 0, 1, 48]
        );
        assert_eq!(
            Request::Poll { start_node: 0, count: 3 }.encode().unwrap(),
            vec![FN_POLL_REQ, 0, 0, 0, 3]
        );
    }

    #[test]
    fn test_encode_force_pads_slots() {
        let request = Request::Force {
            node: 2,
            slot: 3,
            command: vec![0x02],
        };
        assert_eq!(request.encode().unwrap(), vec![FN_FORCE, 0, 0, 2, 4, 0, 0, 0, 0x02]);
    }

    #[test]
    fn test_encode_force_too_large() {
        let request = Request::Force {
            node: 0,
            slot: 200,
            command: vec![1],
        };
        assert_eq!(
            request.encode(),
            Err(ProtocolError::PayloadTooLarge { max: MAX_MACACO_PAYLOAD, actual: 201 })
        );
    }

    #[test]
    fn test_vnet_wrap() {
        let datagram = Request::Ping
            .encode_vnet(VnetAddress::gateway(77, 0x70, 0x01))
            .unwrap();
        assert_eq!(
            datagram,
            vec![12, 11, VNET_PORT, 77, 0, 0x70, 0x01, FN_PING_REQ, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_vnet_wrap_rejects_oversized_frame() {
        let address = VnetAddress::gateway(77, 0, 0);
        let max = MACACO_HEADER_LEN + MAX_MACACO_PAYLOAD;

        let datagram = address.wrap(&vec![0u8; max]).unwrap();
        assert_eq!(datagram.len(), VNET_HEADER_LEN + max);
        assert_eq!(datagram[0] as usize, VNET_HEADER_LEN + max);
        assert_eq!(datagram[1] as usize, VNET_HEADER_LEN + max - 1);

        assert_eq!(
            address.wrap(&[0u8; 300]),
            Err(ProtocolError::PayloadTooLarge { max, actual: 300 })
        );
    }
}
