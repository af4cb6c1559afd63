//! Parsed response bodies.
//!
//! Each type here reads one functional code's fields out of a [`Frame`],
//! checking lengths before indexing.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{ProtocolError, Result};
use crate::frame::Frame;
use crate::half_float;
use crate::typical::TypicalCode;

/// Database structure of a gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbStruct {
    /// Number of nodes in the network.
    pub node_count: u8,
    /// Maximum number of nodes the gateway supports.
    pub max_nodes: u8,
    /// Slots per node; the stride of every node/slot computation.
    pub max_typicals_per_node: u8,
    /// Maximum number of concurrent requests.
    pub max_requests: u8,
}

impl DbStruct {
    /// Frame length needed to read every field.
    pub const FRAME_LEN: usize = MACACO_HEADER_LEN + 4;

    /// Parse a database structure response.
    pub fn parse(frame: &Frame) -> Result<Self> {
        frame.require(Self::FRAME_LEN)?;
        let body = frame.payload();
        Ok(DbStruct {
            node_count: body[0],
            max_nodes: body[1],
            max_typicals_per_node: body[2],
            max_requests: body[3],
        })
    }
}

/// A gateway answering a broadcast discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayAnnouncement {
    /// The gateway's IPv4 address.
    pub address: Ipv4Addr,
}

impl GatewayAnnouncement {
    /// Frame length needed to read the address.
    pub const FRAME_LEN: usize = MACACO_HEADER_LEN + 4;

    /// Parse a discover-broadcast response.
    pub fn parse(frame: &Frame) -> Result<Self> {
        frame.require(Self::FRAME_LEN)?;
        let body = frame.payload();
        Ok(GatewayAnnouncement {
            address: Ipv4Addr::new(body[0], body[1], body[2], body[3]),
        })
    }

    /// The discriminator this gateway will use in subsequent frames.
    pub fn discriminator(&self) -> u8 {
        self.address.octets()[3]
    }
}

/// A run of bytes addressed from a start node: typical definitions, states
/// or health values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRange<'a> {
    /// First node covered by `bytes`.
    pub start_node: u8,
    /// The declared payload.
    pub bytes: &'a [u8],
}

impl<'a> NodeRange<'a> {
    /// Read the start offset and the declared payload.
    ///
    /// Fails when the frame is shorter than its "number of" field announces.
    pub fn parse(frame: &'a Frame) -> Result<Self> {
        Ok(NodeRange {
            start_node: frame.start_offset()?,
            bytes: frame.declared_payload()?,
        })
    }

    /// Iterate the bytes as typical codes, with their enumeration index.
    pub fn typicals(&self) -> impl Iterator<Item = (usize, TypicalCode)> + 'a {
        self.bytes
            .iter()
            .enumerate()
            .map(|(index, &code)| (index, TypicalCode::from(code)))
    }
}

/// A topic value broadcast as an action message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionTopic {
    /// Topic number.
    pub number: u16,
    /// Topic variant.
    pub variant: u8,
    /// Decoded value; NaN when a half-float payload is unavailable.
    pub value: f32,
}

impl ActionTopic {
    /// Parse an action message.
    ///
    /// Byte 4 selects the value width: 1 for a plain byte, 2 for a
    /// half-float pair.
    pub fn parse(frame: &Frame) -> Result<Self> {
        frame.require(MACACO_HEADER_LEN)?;
        let bytes = frame.as_bytes();
        let number = u16::from_le_bytes([bytes[MACACO_PUTIN_LO], bytes[MACACO_PUTIN_HI]]);
        let variant = bytes[MACACO_START_OFFSET];

        let value = match bytes[MACACO_NUMBER_OF] {
            ACTION_WIDTH_BYTE => f32::from(frame.byte_at(MACACO_HEADER_LEN)?),
            ACTION_WIDTH_HALF_FLOAT => frame.half_float_at(MACACO_HEADER_LEN)?,
            other => return Err(ProtocolError::UnsupportedWidth(other)),
        };

        Ok(ActionTopic {
            number,
            variant,
            value,
        })
    }

    /// The value, or `None` when it decoded to NaN.
    pub fn available_value(&self) -> Option<f32> {
        if self.value.is_nan() {
            None
        } else {
            Some(self.value)
        }
    }

    /// Encode this topic as an action message frame with a half-float value.
    pub fn encode(&self) -> Vec<u8> {
        let [number_lo, number_hi] = self.number.to_le_bytes();
        let [lo, hi] = half_float::encode_le(self.value);
        vec![
            FN_ACTION_MESSAGE,
            number_lo,
            number_hi,
            self.variant,
            ACTION_WIDTH_HALF_FLOAT,
            lo,
            hi,
        ]
    }
}
