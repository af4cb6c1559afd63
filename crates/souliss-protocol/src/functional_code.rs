//! Functional codes of gateway responses.

use crate::constants::*;

/// The operation a received MaCaCo frame represents, taken from byte 0.
///
/// Subscribe and poll responses carry identical payloads and both map to
/// [`FunctionalCode::StateResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionalCode {
    /// Ping answer from a gateway.
    Ping,
    /// Answer to a broadcast gateway discovery.
    DiscoverBroadcast,
    /// Typical state, from a subscription or a poll.
    StateResponse,
    /// Typical definitions of a node range.
    TypicalDefinition,
    /// Node health values.
    Healthy,
    /// Database structure of the gateway.
    DbStruct,
    /// Topic broadcast.
    ActionMessage,
    /// Any code not handled by the decoder.
    Unknown(u8),
}

impl FunctionalCode {
    /// Short stable name, used for log fields and metric labels.
    pub const fn as_str(&self) -> &'static str {
        match self {
            FunctionalCode::Ping => "ping",
            FunctionalCode::DiscoverBroadcast => "discover_broadcast",
            FunctionalCode::StateResponse => "state_response",
            FunctionalCode::TypicalDefinition => "typical_definition",
            FunctionalCode::Healthy => "healthy",
            FunctionalCode::DbStruct => "db_struct",
            FunctionalCode::ActionMessage => "action_message",
            FunctionalCode::Unknown(_) => "unknown",
        }
    }
}

impl From<u8> for FunctionalCode {
    fn from(code: u8) -> Self {
        match code {
            FN_PING_RESP => FunctionalCode::Ping,
            FN_DISCOVER_GW_NODE_BCAST_RESP => FunctionalCode::DiscoverBroadcast,
            FN_SUBSCRIBE_RESP | FN_POLL_RESP => FunctionalCode::StateResponse,
            FN_TYP_RESP => FunctionalCode::TypicalDefinition,
            FN_HEALTHY_RESP => FunctionalCode::Healthy,
            FN_DBSTRUCT_RESP => FunctionalCode::DbStruct,
            FN_ACTION_MESSAGE => FunctionalCode::ActionMessage,
            other => FunctionalCode::Unknown(other),
        }
    }
}

impl std::fmt::Display for FunctionalCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionalCode::Unknown(code) => write!(f, "unknown (0x{:02X})", code),
            other => f.write_str(other.as_str()),
        }
    }
}
