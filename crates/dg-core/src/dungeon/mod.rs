//! In-memory model of the dungeon: a tree of locations holding monsters and,
//! somewhere at a leaf, the exit hatch.
//!
//! The tree is built once from the deserialized map and never mutated. The
//! per-attempt notion of "already visited" and "already defeated" lives in
//! [`crate::gameloop::GameState`], so a respawn costs nothing.

mod build;
mod node;
pub mod path;

pub use build::BuildError;
pub use node::{Entry, HatchNode, LocationNode, MonsterEntry, NodeId};

/// The whole dungeon, arena style: each location owns its contents and
/// references child locations by [`NodeId`]. Node 0 is the start location.
#[derive(Debug, Clone)]
pub struct Dungeon {
    nodes: Vec<LocationNode>,
}

impl Dungeon {
    /// The designated start location.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &LocationNode {
        &self.nodes[id.0]
    }

    /// Ordered contents of a location, as authored in the map.
    pub fn children(&self, id: NodeId) -> &[Entry] {
        &self.nodes[id.0].contents
    }

    /// Number of locations in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
