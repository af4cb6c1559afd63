//! Protocol constants
//!
//! These constants define the functional codes, typical codes and frame
//! offsets used by the Souliss vNet/MaCaCo protocol.

// ============================================================================
// vNet Envelope
// ============================================================================

/// Length of the vNet header that precedes every MaCaCo frame.
pub const VNET_HEADER_LEN: usize = 7;
/// vNet port carrying MaCaCo traffic.
pub const VNET_PORT: u8 = 0x17;
/// Offset of the source address low byte (last octet of the gateway IP).
pub const VNET_SOURCE_LO: usize = 5;

/// Default UDP port of a Souliss gateway.
pub const DEFAULT_GATEWAY_PORT: u16 = 230;

// ============================================================================
// MaCaCo Frame Layout
// ============================================================================

/// Offset of the functional code.
pub const MACACO_FUNCTIONAL_CODE: usize = 0;
/// Offset of the low put-in byte.
pub const MACACO_PUTIN_LO: usize = 1;
/// Offset of the high put-in byte.
pub const MACACO_PUTIN_HI: usize = 2;
/// Offset of the start offset (target node).
pub const MACACO_START_OFFSET: usize = 3;
/// Offset of the "number of" field.
pub const MACACO_NUMBER_OF: usize = 4;
/// Length of the MaCaCo header; payload starts here.
pub const MACACO_HEADER_LEN: usize = 5;

/// Largest MaCaCo payload a request may carry.
pub const MAX_MACACO_PAYLOAD: usize = 160;

// ============================================================================
// Functional Codes: Requests (host → gateway)
// ============================================================================

/// Ping a gateway.
pub const FN_PING_REQ: u8 = 0x08;
/// Broadcast gateway discovery.
pub const FN_DISCOVER_GW_NODE_BCAST_REQ: u8 = 0x28;
/// Subscribe to state changes.
pub const FN_SUBSCRIBE_REQ: u8 = 0x21;
/// Poll the current state.
pub const FN_POLL_REQ: u8 = 0x27;
/// Read typical definitions.
pub const FN_TYP_REQ: u8 = 0x22;
/// Read node health.
pub const FN_HEALTHY_REQ: u8 = 0x25;
/// Read the database structure.
pub const FN_DBSTRUCT_REQ: u8 = 0x26;
/// Force a slot to a value.
pub const FN_FORCE: u8 = 0x33;

// ============================================================================
// Functional Codes: Responses (gateway → host)
// ============================================================================

/// Ping answer.
pub const FN_PING_RESP: u8 = 0x18;
/// Gateway discovery answer.
pub const FN_DISCOVER_GW_NODE_BCAST_RESP: u8 = 0x38;
/// Subscription answer (state).
pub const FN_SUBSCRIBE_RESP: u8 = 0x31;
/// Poll answer (state).
pub const FN_POLL_RESP: u8 = 0x37;
/// Typical definitions answer.
pub const FN_TYP_RESP: u8 = 0x32;
/// Node health answer.
pub const FN_HEALTHY_RESP: u8 = 0x35;
/// Database structure answer.
pub const FN_DBSTRUCT_RESP: u8 = 0x36;
/// Action message (topic) broadcast.
pub const FN_ACTION_MESSAGE: u8 = 0x72;

// ============================================================================
// Typical Codes
// ============================================================================

/// Empty slot.
pub const T_EMPTY: u8 = 0x00;
/// ON/OFF digital output.
pub const T11: u8 = 0x11;
/// ON/OFF digital output with AUTO mode.
pub const T12: u8 = 0x12;
/// Digital input value.
pub const T13: u8 = 0x13;
/// Pulse digital output.
pub const T14: u8 = 0x14;
/// RGB light.
pub const T16: u8 = 0x16;
/// ON/OFF step relay.
pub const T18: u8 = 0x18;
/// Single color LED dimmer.
pub const T19: u8 = 0x19;
/// Digital input pass-through (eight packed bits).
pub const T1A: u8 = 0x1A;
/// Motorized device with limit switches.
pub const T21: u8 = 0x21;
/// Motorized device without limit switches.
pub const T22: u8 = 0x22;
/// Temperature control.
pub const T31: u8 = 0x31;
/// Anti-theft integration (main).
pub const T41: u8 = 0x41;
/// Anti-theft integration (peer).
pub const T42: u8 = 0x42;
/// First analog input typical (T51).
pub const T51: u8 = 0x51;
/// Last analog input typical (T58).
pub const T58: u8 = 0x58;
/// First analog setpoint typical (T61).
pub const T61: u8 = 0x61;
/// Last analog setpoint typical (T68).
pub const T68: u8 = 0x68;
/// Slot consumed by the preceding typical.
pub const T_RELATED: u8 = 0xFF;

// ============================================================================
// Typical States
// ============================================================================

/// T4n: anti-theft disarmed.
pub const T4N_NO_ANTITHEFT: u8 = 0x00;
/// T4n: anti-theft armed.
pub const T4N_ANTITHEFT: u8 = 0x01;
/// T4n: alarm raised.
pub const T4N_ALARM: u8 = 0x03;

// ============================================================================
// Action Messages
// ============================================================================

/// Action message value is a single byte.
pub const ACTION_WIDTH_BYTE: u8 = 1;
/// Action message value is a half-float pair.
pub const ACTION_WIDTH_HALF_FLOAT: u8 = 2;
