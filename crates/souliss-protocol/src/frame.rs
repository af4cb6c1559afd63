//! Received frame model.
//!
//! A gateway datagram is a vNet header followed by a MaCaCo frame:
//!
//! ```text
//! +-----+-------+------+--------+--------+--------+--------+------------------+
//! | len | len-1 | port | dst_lo | dst_hi | src_lo | src_hi | MaCaCo frame ... |
//! +-----+-------+------+--------+--------+--------+--------+------------------+
//! ```
//!
//! The MaCaCo frame itself starts with a five byte header:
//!
//! ```text
//! +-----------+----------+----------+-------+-----------+-------------+
//! | func code | putin_lo | putin_hi | start | number_of | payload ... |
//! +-----------+----------+----------+-------+-----------+-------------+
//! ```
//!
//! [`Frame`] keeps the MaCaCo bytes together with the gateway discriminator,
//! the low byte of the vNet source address (the last octet of the gateway IP).

use bytes::Bytes;

use crate::constants::*;
use crate::error::{ProtocolError, Result};
use crate::functional_code::FunctionalCode;
use crate::half_float;

/// One MaCaCo frame received from a gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    gateway: u8,
    data: Bytes,
}

impl Frame {
    /// Wrap MaCaCo bytes that have already been stripped of their envelope.
    ///
    /// Fails with [`ProtocolError::EmptyFrame`] when there is no functional code.
    pub fn new(gateway: u8, data: impl Into<Bytes>) -> Result<Self> {
        let data = data.into();
        if data.is_empty() {
            return Err(ProtocolError::EmptyFrame);
        }
        Ok(Frame { gateway, data })
    }

    /// Parse a raw vNet datagram as received on the gateway socket.
    pub fn from_vnet(datagram: &[u8]) -> Result<Self> {
        if datagram.len() <= VNET_HEADER_LEN {
            return Err(ProtocolError::too_short(VNET_HEADER_LEN + 1, datagram.len()));
        }
        let gateway = datagram[VNET_SOURCE_LO];
        Frame::new(gateway, Bytes::copy_from_slice(&datagram[VNET_HEADER_LEN..]))
    }

    /// The gateway discriminator.
    pub fn gateway(&self) -> u8 {
        self.gateway
    }

    /// The raw MaCaCo bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of MaCaCo bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false for a constructed frame.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The functional code in byte 0.
    pub fn functional_code(&self) -> FunctionalCode {
        FunctionalCode::from(self.data[MACACO_FUNCTIONAL_CODE])
    }

    /// Check that the frame holds at least `len` bytes.
    pub fn require(&self, len: usize) -> Result<()> {
        if self.data.len() < len {
            return Err(ProtocolError::too_short(len, self.data.len()));
        }
        Ok(())
    }

    /// Read one byte at an absolute offset.
    pub fn byte_at(&self, offset: usize) -> Result<u8> {
        self.data
            .get(offset)
            .copied()
            .ok_or_else(|| ProtocolError::too_short(offset + 1, self.data.len()))
    }

    /// Read a `(lo, hi)` half-float pair at an absolute offset.
    pub fn half_float_at(&self, offset: usize) -> Result<f32> {
        self.require(offset + 2)?;
        Ok(half_float::decode_le(self.data[offset], self.data[offset + 1]))
    }

    /// The start offset (target node) header field.
    pub fn start_offset(&self) -> Result<u8> {
        self.byte_at(MACACO_START_OFFSET)
    }

    /// The "number of" header field.
    pub fn number_of(&self) -> Result<u8> {
        self.byte_at(MACACO_NUMBER_OF)
    }

    /// Payload bytes after the header, possibly empty.
    pub fn payload(&self) -> &[u8] {
        self.data.get(MACACO_HEADER_LEN..).unwrap_or(&[])
    }

    /// The payload as announced by the "number of" field.
    ///
    /// Fails when the frame is shorter than the header claims.
    pub fn declared_payload(&self) -> Result<&[u8]> {
        let count = usize::from(self.number_of()?);
        self.require(MACACO_HEADER_LEN + count)?;
        Ok(&self.data[MACACO_HEADER_LEN..MACACO_HEADER_LEN + count])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vnet(gateway: u8, macaco: &[u8]) -> Vec<u8> {
        let total = (VNET_HEADER_LEN + macaco.len()) as u8;
        let mut buf = vec![total, total - 1, VNET_PORT, 0x01, 0x00, gateway, 0x00];
        buf.extend_from_slice(macaco);
        buf
    }

    #[test]
    fn test_new_rejects_empty() {
        assert_eq!(Frame::new(7, Vec::<u8>::new()), Err(ProtocolError::EmptyFrame));
    }

    #[test]
    fn test_from_vnet_strips_header() {
        let frame = Frame::from_vnet(&vnet(77, &[FN_PING_RESP, 0, 0])).expect("valid datagram");
        assert_eq!(frame.gateway(), 77);
        assert_eq!(frame.as_bytes(), &[FN_PING_RESP, 0, 0]);
        assert_eq!(frame.functional_code(), FunctionalCode::Ping);
    }

    #[test]
    fn test_from_vnet_header_only() {
        let datagram = vnet(77, &[]);
        assert_eq!(
            Frame::from_vnet(&datagram),
            Err(ProtocolError::FrameTooShort { expected: 8, actual: 7 })
        );
    }

    #[test]
    fn test_header_fields() {
        let frame = Frame::new(1, vec![FN_POLL_RESP, 0, 0, 2, 3, 10, 20, 30]).unwrap();
        assert_eq!(frame.start_offset(), Ok(2));
        assert_eq!(frame.number_of(), Ok(3));
        assert_eq!(frame.payload(), &[10, 20, 30]);
        assert_eq!(frame.declared_payload(), Ok(&[10u8, 20, 30][..]));
    }

    #[test]
    fn test_declared_payload_truncated() {
        let frame = Frame::new(1, vec![FN_POLL_RESP, 0, 0, 0, 4, 10, 20]).unwrap();
        assert_eq!(
            frame.declared_payload(),
            Err(ProtocolError::FrameTooShort { expected: 9, actual: 7 })
        );
    }

    #[test]
    fn test_short_reads_do_not_panic() {
        let frame = Frame::new(1, vec![FN_POLL_RESP]).unwrap();
        assert!(frame.start_offset().is_err());
        assert!(frame.half_float_at(5).is_err());
        assert!(frame.payload().is_empty());
    }

    #[test]
    fn test_half_float_at() {
        let frame = Frame::new(1, vec![FN_POLL_RESP, 0, 0, 0, 2, 0x40, 0x4D]).unwrap();
        assert_eq!(frame.half_float_at(5), Ok(21.0));
    }
}
