//! dg-core: game logic for the flooded-dungeon crawl.
//!
//! The dungeon is a strictly forward-only tree of locations. The player
//! descends, fights monsters for experience, and races a shared time budget
//! to the exit hatch; running out of time means drowning and starting over.
//!
//! This crate contains all game rules with no I/O. Reading the map file,
//! prompting the player, and writing the session log are collaborators
//! layered on top (see the `dungeon` binary crate).

pub mod consts;
pub mod dungeon;
pub mod gameloop;
pub mod grammar;
pub mod ledger;
pub mod respawn;
pub mod session;

pub use consts::{EXP_TO_OPEN_HATCH, STARTING_TIME};
pub use dungeon::{BuildError, Dungeon, Entry, NodeId};
pub use gameloop::{
    DeathCause, Game, GameEvent, GameState, InvalidAction, Menu, PlayerAction, TurnOutcome,
};
pub use grammar::{ParseError, Tag};
pub use ledger::Ledger;
pub use session::{Clock, LocalClock, MemoryRecorder, SessionRecorder, SessionSnapshot};
