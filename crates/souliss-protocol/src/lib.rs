//! Souliss vNet/MaCaCo Protocol
//!
//! This crate provides the wire model of the Souliss device-network protocol:
//! frame parsing, functional codes, typical decode rules and the protocol's
//! 16-bit float encoding. It performs no I/O and holds no state.
//!
//! # Protocol Overview
//!
//! Gateways exchange UDP datagrams made of a vNet header and a MaCaCo frame.
//! The first MaCaCo byte is a functional code:
//!
//! - **Requests** (host → gateway): ping, discovery, database structure,
//!   typical definitions, subscribe/poll, health, force
//! - **Responses** (gateway → host): the matching answers, plus unsolicited
//!   action messages (topics)
//!
//! Devices ("typicals") are addressed by node and slot. The number of slots
//! per node is not fixed; it is learned from the database structure response.
//!
//! # Example
//!
//! ```rust
//! use souliss_protocol::{decode_typical, DecodedValue, Frame, FunctionalCode, NodeRange, TypicalCode};
//!
//! // Poll response from gateway .77: node 0, three state bytes
//! let frame = Frame::new(77, vec![0x37, 0, 0, 0, 3, 0x01, 0x40, 0x4D])?;
//! assert_eq!(frame.functional_code(), FunctionalCode::StateResponse);
//!
//! let states = NodeRange::parse(&frame)?;
//! let values = decode_typical(TypicalCode::AnalogInput(0x52), states.bytes, 1)?;
//! assert_eq!(values, vec![DecodedValue::Analog(21.0)]);
//! # Ok::<(), souliss_protocol::ProtocolError>(())
//! ```

mod constants;
mod error;
mod frame;
mod functional_code;
pub mod half_float;
mod messages;
mod request;
mod typical;
mod value;

pub use constants::*;
pub use error::*;
pub use frame::*;
pub use functional_code::*;
pub use messages::*;
pub use request::*;
pub use typical::*;
pub use value::*;
