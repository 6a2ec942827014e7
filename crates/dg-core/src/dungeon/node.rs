//! The node types making up the dungeon tree.

use rust_decimal::Decimal;

/// Index of a location within its [`super::Dungeon`]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// One visitable location.
#[derive(Debug, Clone)]
pub struct LocationNode {
    /// Number extracted from the tag, unique within the tree.
    pub id: u32,
    /// The full tag, kept verbatim for display and the session log.
    pub label: String,
    /// Time consumed by moving into this location (0 for the start).
    pub entry_cost: Decimal,
    /// Ordered contents as authored in the map.
    pub contents: Vec<Entry>,
}

/// One slot in a location's contents.
#[derive(Debug, Clone)]
pub enum Entry {
    Monster(MonsterEntry),
    Location(NodeId),
    Hatch(HatchNode),
}

/// A monster waiting in a location.
#[derive(Debug, Clone)]
pub struct MonsterEntry {
    pub label: String,
    /// Experience granted for defeating it.
    pub exp_reward: u32,
    /// Time consumed defeating it.
    pub fight_cost: Decimal,
}

/// The exit. Reaching it and opening it ends the game in victory.
#[derive(Debug, Clone)]
pub struct HatchNode {
    pub label: String,
    /// Time consumed by one attempt at opening it.
    pub open_cost: Decimal,
}
