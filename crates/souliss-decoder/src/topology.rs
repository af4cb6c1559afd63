//! Per-gateway network topology.
//!
//! Typical definitions and state responses index slots as a flat run starting
//! at a node. Turning index `j` into a node and slot needs the gateway's slots
//! per node, which is only known once its database structure response has
//! been seen.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use souliss_protocol::DbStruct;

/// Topology learned from a database structure response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyInfo {
    /// Number of nodes behind the gateway.
    pub node_count: u8,
    /// Slots per node.
    pub max_typicals_per_node: u8,
}

impl TopologyInfo {
    /// Build from a database structure.
    ///
    /// Returns `None` when the gateway reports zero slots per node, since no
    /// slot could ever be located.
    pub fn from_db_struct(db: &DbStruct) -> Option<Self> {
        if db.max_typicals_per_node == 0 {
            return None;
        }
        Some(TopologyInfo {
            node_count: db.node_count,
            max_typicals_per_node: db.max_typicals_per_node,
        })
    }

    /// Locate flat index `index` of a run starting at `start_node`.
    ///
    /// `node = start_node + index / max`, `slot = index % max`. Returns
    /// `None` past node 255.
    pub fn locate(&self, start_node: u8, index: usize) -> Option<(u8, u8)> {
        let per_node = usize::from(self.max_typicals_per_node);
        if per_node == 0 {
            return None;
        }
        let node = u8::try_from(usize::from(start_node) + index / per_node).ok()?;
        // index % per_node < per_node <= 255
        let slot = (index % per_node) as u8;
        Some((node, slot))
    }

    /// Inverse of [`locate`](Self::locate).
    pub fn index_of(&self, start_node: u8, node: u8, slot: u8) -> Option<usize> {
        if node < start_node || slot >= self.max_typicals_per_node {
            return None;
        }
        Some(usize::from(node - start_node) * usize::from(self.max_typicals_per_node) + usize::from(slot))
    }
}

/// Whether a gateway's topology is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopologyState {
    /// No usable database structure seen yet.
    #[default]
    Unlearned,
    /// Database structure seen.
    Learned(TopologyInfo),
}

/// Topology for every gateway discriminator.
///
/// One lock per discriminator; frames from different gateways never contend.
pub struct TopologyResolver {
    shards: Box<[RwLock<TopologyState>]>,
}

impl TopologyResolver {
    /// Create a resolver with every gateway unlearned.
    pub fn new() -> Self {
        let shards = (0..=u8::MAX)
            .map(|_| RwLock::new(TopologyState::Unlearned))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        TopologyResolver { shards }
    }

    fn shard(&self, gateway: u8) -> &RwLock<TopologyState> {
        &self.shards[usize::from(gateway)]
    }

    /// Current state for a gateway.
    pub fn state(&self, gateway: u8) -> TopologyState {
        *self.shard(gateway).read()
    }

    /// Learned topology for a gateway, if any.
    pub fn learned(&self, gateway: u8) -> Option<TopologyInfo> {
        match self.state(gateway) {
            TopologyState::Learned(info) => Some(info),
            TopologyState::Unlearned => None,
        }
    }

    /// Record a gateway's topology. Later responses replace earlier ones.
    ///
    /// Returns the previous state.
    pub fn learn(&self, gateway: u8, info: TopologyInfo) -> TopologyState {
        std::mem::replace(&mut *self.shard(gateway).write(), TopologyState::Learned(info))
    }

    /// Drop what is known about a gateway.
    pub fn forget(&self, gateway: u8) {
        *self.shard(gateway).write() = TopologyState::Unlearned;
    }

    /// Gateways with a learned topology.
    pub fn learned_gateways(&self) -> Vec<(u8, TopologyInfo)> {
        (0..=u8::MAX)
            .filter_map(|gateway| self.learned(gateway).map(|info| (gateway, info)))
            .collect()
    }
}

impl Default for TopologyResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TopologyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopologyResolver")
            .field("learned", &self.learned_gateways())
            .finish()
    }
}
