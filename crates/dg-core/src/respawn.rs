//! Death is not the end: the respawn controller hands out a fresh attempt
//! over the same parsed tree.

use hashbrown::HashSet;

use crate::dungeon::Dungeon;
use crate::gameloop::GameState;
use crate::ledger::Ledger;

/// A brand-new attempt: full budget, no experience, nothing visited or
/// defeated, positioned at the entrance. Used both at game start and after
/// every death. The tree itself is shared across attempts and never rebuilt;
/// discarding the old state is the whole reset.
pub fn fresh_attempt(dungeon: &Dungeon) -> GameState {
    GameState {
        current: dungeon.root(),
        ledger: Ledger::new(),
        visited: HashSet::new(),
        defeated: HashSet::new(),
    }
}
