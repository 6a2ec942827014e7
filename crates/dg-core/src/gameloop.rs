//! The turn loop: present a location, take a validated action, settle its
//! cost on the ledger, and notice when the attempt has ended one way or
//! another.
//!
//! Movement is strictly forward. Fighting never kills, even on a negative
//! balance; only moving and opening the hatch can end an attempt. Death is
//! not an error, it is a transition: the state respawns in place and the
//! same [`Game`] keeps going.

use hashbrown::HashSet;
use rust_decimal::Decimal;
use strum::Display;
use thiserror::Error;

use crate::consts::EXP_TO_OPEN_HATCH;
use crate::dungeon::{Dungeon, Entry, NodeId};
use crate::ledger::Ledger;
use crate::respawn;
use crate::session::{Clock, SessionRecorder, SessionSnapshot};

/// Index of an entry within its parent location's contents.
pub type Slot = (NodeId, usize);

/// The mutable record of one attempt. Created at game start and replaced
/// wholesale on every respawn; the dungeon tree never changes.
#[derive(Debug, Clone)]
pub struct GameState {
    pub current: NodeId,
    pub ledger: Ledger,
    /// Location ids entered this attempt. Only grows until respawn.
    pub visited: HashSet<u32>,
    /// Monsters defeated this attempt, by content slot.
    pub defeated: HashSet<Slot>,
}

/// What the player can do from the current location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    Fight(Slot),
    Move(NodeId),
    OpenHatch(Slot),
    Quit,
}

/// One selectable line of the action menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    /// 1-based single-digit key the player types.
    pub index: u8,
    pub action: PlayerAction,
    /// Verbatim tag for display.
    pub label: String,
}

/// A numbered action menu with stable indices, rebuilt from the remaining
/// contents every time the location is presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    entries: Vec<MenuEntry>,
}

/// The player's input named no legal action. Recoverable: re-prompt, no
/// state change.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidAction {
    #[error("'{0}' is not a single-digit choice")]
    NotADigit(String),
    #[error("{0} is not on the menu")]
    NotOnMenu(u8),
}

impl Menu {
    /// Surviving monsters first (in authored order), then unvisited child
    /// locations and the hatch (in authored order), then the quit action
    /// last, numbered from 1.
    pub fn build(dungeon: &Dungeon, state: &GameState) -> Menu {
        let here = state.current;
        let mut actions: Vec<(PlayerAction, String)> = Vec::new();

        for (idx, entry) in dungeon.children(here).iter().enumerate() {
            if let Entry::Monster(monster) = entry {
                if !state.defeated.contains(&(here, idx)) {
                    actions.push((PlayerAction::Fight((here, idx)), monster.label.clone()));
                }
            }
        }
        for (idx, entry) in dungeon.children(here).iter().enumerate() {
            match entry {
                Entry::Location(child) => {
                    let node = dungeon.node(*child);
                    if !state.visited.contains(&node.id) {
                        actions.push((PlayerAction::Move(*child), node.label.clone()));
                    }
                }
                Entry::Hatch(hatch) => {
                    actions.push((PlayerAction::OpenHatch((here, idx)), hatch.label.clone()));
                }
                Entry::Monster(_) => {}
            }
        }
        actions.push((PlayerAction::Quit, "Give up and leave the dungeon".to_string()));

        let entries = actions
            .into_iter()
            .enumerate()
            .map(|(i, (action, label))| MenuEntry {
                index: (i + 1) as u8,
                action,
                label,
            })
            .collect();
        Menu { entries }
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// The validation predicate for raw player input: exactly one digit,
    /// and that digit must be a key on this menu.
    pub fn select(&self, raw: &str) -> Result<&PlayerAction, InvalidAction> {
        let trimmed = raw.trim();
        let mut chars = trimmed.chars();
        let first = chars.next();
        if first.is_none() || chars.next().is_some() {
            return Err(InvalidAction::NotADigit(trimmed.to_string()));
        }
        let Some(key) = first.and_then(|c| c.to_digit(10)) else {
            return Err(InvalidAction::NotADigit(trimmed.to_string()));
        };
        self.entries
            .iter()
            .find(|entry| u32::from(entry.index) == key)
            .map(|entry| &entry.action)
            .ok_or(InvalidAction::NotOnMenu(key as u8))
    }
}

/// Why an attempt ended in death.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DeathCause {
    /// The budget ran out mid-move or at the hatch.
    #[strum(serialize = "flood")]
    Flood,
    /// Positive time, not enough experience, and nothing left to fight.
    #[strum(serialize = "stupid death")]
    OutOfExperience,
}

/// Result of executing one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The attempt goes on.
    Continue,
    /// The attempt ended in death; the state has already respawned.
    Died(DeathCause),
    /// Out through the hatch.
    Won,
    /// The player resigned.
    Quit,
}

/// Structured display events. The core states what happened; a presentation
/// layer decides how it reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    EnteredLocation {
        label: String,
        total_exp: u32,
        remaining_time: Decimal,
    },
    MonsterSlain {
        label: String,
        total_exp: u32,
        remaining_time: Decimal,
    },
    /// The hatch would not open: not enough experience, time still positive,
    /// and something is still left to try.
    HatchResisted,
    Flooded,
    StupidDeath,
    Respawned,
    Escaped {
        total_exp: u32,
        remaining_time: Decimal,
    },
    Resigned,
}

/// The running game: one canonical tree, one attempt in flight, and the
/// collaborators that observe it.
pub struct Game<R, C> {
    dungeon: Dungeon,
    state: GameState,
    recorder: R,
    clock: C,
    events: Vec<GameEvent>,
}

impl<R: SessionRecorder, C: Clock> Game<R, C> {
    pub fn new(dungeon: Dungeon, recorder: R, clock: C) -> Self {
        let state = respawn::fresh_attempt(&dungeon);
        let mut game = Game {
            dungeon,
            state,
            recorder,
            clock,
            events: Vec::new(),
        };
        game.announce_location();
        game
    }

    pub fn dungeon(&self) -> &Dungeon {
        &self.dungeon
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn into_recorder(self) -> R {
        self.recorder
    }

    /// The action menu for the current location and attempt.
    pub fn menu(&self) -> Menu {
        Menu::build(&self.dungeon, &self.state)
    }

    /// Drains the pending display events.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Applies one validated action. The action must come from a menu built
    /// against the current state; anything else is a programming error.
    pub fn execute(&mut self, action: PlayerAction) -> TurnOutcome {
        match action {
            PlayerAction::Fight(slot) => self.fight(slot),
            PlayerAction::Move(node) => self.move_to(node),
            PlayerAction::OpenHatch(slot) => self.open_hatch(slot),
            PlayerAction::Quit => self.quit(),
        }
    }

    fn fight(&mut self, slot: Slot) -> TurnOutcome {
        let (node, idx) = slot;
        let Entry::Monster(monster) = &self.dungeon.children(node)[idx] else {
            unreachable!("fight slot does not hold a monster");
        };
        assert!(
            !self.state.defeated.contains(&slot),
            "monster at {slot:?} fought twice"
        );
        let label = monster.label.clone();
        let remaining = self.state.ledger.spend(monster.fight_cost);
        let total = self.state.ledger.credit(monster.exp_reward);
        self.state.defeated.insert(slot);
        self.events.push(GameEvent::MonsterSlain {
            label,
            total_exp: total,
            remaining_time: remaining,
        });
        // Fighting never floods; a negative balance just shows on screen.
        TurnOutcome::Continue
    }

    fn move_to(&mut self, node: NodeId) -> TurnOutcome {
        let dest = self.dungeon.node(node);
        assert!(
            !self.state.visited.contains(&dest.id),
            "moved into already-visited {}",
            dest.label
        );
        self.state.visited.insert(dest.id);
        self.state.ledger.spend(dest.entry_cost);
        self.state.current = node;
        if self.state.ledger.is_flooded() {
            return self.die(DeathCause::Flood);
        }
        self.announce_location();
        TurnOutcome::Continue
    }

    fn open_hatch(&mut self, slot: Slot) -> TurnOutcome {
        let (node, idx) = slot;
        let Entry::Hatch(hatch) = &self.dungeon.children(node)[idx] else {
            unreachable!("open slot does not hold the hatch");
        };
        let open_cost = hatch.open_cost;
        let remaining = self.state.ledger.spend(open_cost);

        // Flood first: a spend that empties the budget kills regardless of
        // experience. Only then the experience gate.
        if self.state.ledger.is_flooded() {
            return self.die(DeathCause::Flood);
        }
        if self.state.ledger.total_exp() >= EXP_TO_OPEN_HATCH {
            self.events.push(GameEvent::Escaped {
                total_exp: self.state.ledger.total_exp(),
                remaining_time: remaining,
            });
            self.end_attempt();
            return TurnOutcome::Won;
        }

        // Not enough experience. If anything besides this hatch and quitting
        // is still on offer, the attempt goes on.
        let menu = Menu::build(&self.dungeon, &self.state);
        let can_still_fight = menu
            .entries()
            .iter()
            .any(|entry| !matches!(entry.action, PlayerAction::OpenHatch(_) | PlayerAction::Quit));
        if can_still_fight {
            self.events.push(GameEvent::HatchResisted);
            TurnOutcome::Continue
        } else {
            self.die(DeathCause::OutOfExperience)
        }
    }

    fn quit(&mut self) -> TurnOutcome {
        self.events.push(GameEvent::Resigned);
        self.end_attempt();
        TurnOutcome::Quit
    }

    fn die(&mut self, cause: DeathCause) -> TurnOutcome {
        self.events.push(match cause {
            DeathCause::Flood => GameEvent::Flooded,
            DeathCause::OutOfExperience => GameEvent::StupidDeath,
        });
        self.end_attempt();
        self.state = respawn::fresh_attempt(&self.dungeon);
        self.events.push(GameEvent::Respawned);
        self.announce_location();
        TurnOutcome::Died(cause)
    }

    /// Cuts the end-of-attempt snapshot and hands it to the recorder.
    fn end_attempt(&mut self) {
        let snapshot = SessionSnapshot {
            current_location: self.dungeon.node(self.state.current).label.clone(),
            current_experience: self.state.ledger.total_exp(),
            current_date: self.clock.timestamp(),
        };
        self.recorder.record(snapshot);
    }

    fn announce_location(&mut self) {
        let here = self.dungeon.node(self.state.current);
        self.events.push(GameEvent::EnteredLocation {
            label: here.label.clone(),
            total_exp: self.state.ledger.total_exp(),
            remaining_time: self.state.ledger.remaining_time(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use crate::session::MemoryRecorder;

    struct FixedClock;

    impl Clock for FixedClock {
        fn timestamp(&self) -> String {
            "2024-01-01-00.00.00".to_string()
        }
    }

    fn game(map: serde_json::Value) -> Game<MemoryRecorder, FixedClock> {
        let dungeon = Dungeon::from_value(&map).unwrap();
        Game::new(dungeon, MemoryRecorder::default(), FixedClock)
    }

    /// Picks the first menu action matching the predicate.
    fn pick(
        game: &Game<MemoryRecorder, FixedClock>,
        want: impl Fn(&PlayerAction) -> bool,
    ) -> PlayerAction {
        game.menu()
            .entries()
            .iter()
            .map(|entry| entry.action.clone())
            .find(|action| want(action))
            .expect("no matching menu action")
    }

    #[test]
    fn test_menu_lists_monsters_then_locations_then_quit() {
        let mut g = game(json!({
            "Location_0_tm0": [
                { "Location_1_tm5": [] },
                "Mob_exp10_tm10",
                "Boss_exp20_tm20",
                { "Location_2_tm5": ["Hatch"] }
            ]
        }));
        g.take_events();
        let menu = g.menu();
        let kinds: Vec<_> = menu
            .entries()
            .iter()
            .map(|entry| match entry.action {
                PlayerAction::Fight(_) => "fight",
                PlayerAction::Move(_) => "move",
                PlayerAction::OpenHatch(_) => "open",
                PlayerAction::Quit => "quit",
            })
            .collect();
        assert_eq!(kinds, ["fight", "fight", "move", "move", "quit"]);
        let indices: Vec<_> = menu.entries().iter().map(|entry| entry.index).collect();
        assert_eq!(indices, [1, 2, 3, 4, 5]);
        assert_eq!(menu.entries()[0].label, "Mob_exp10_tm10");
    }

    #[test]
    fn test_select_validates_raw_input() {
        let g = game(json!({ "Location_0_tm0": ["Mob_exp10_tm10"] }));
        let menu = g.menu();
        assert_eq!(*menu.select("1").unwrap(), menu.entries()[0].action);
        assert_eq!(*menu.select(" 2 ").unwrap(), PlayerAction::Quit);
        assert!(matches!(menu.select(""), Err(InvalidAction::NotADigit(_))));
        assert!(matches!(menu.select("x"), Err(InvalidAction::NotADigit(_))));
        assert!(matches!(
            menu.select("12"),
            Err(InvalidAction::NotADigit(_))
        ));
        assert!(matches!(menu.select("0"), Err(InvalidAction::NotOnMenu(0))));
        assert!(matches!(menu.select("9"), Err(InvalidAction::NotOnMenu(9))));
    }

    #[test]
    fn test_fight_settles_the_ledger_and_clears_the_slot() {
        let mut g = game(json!({ "Location_0_tm0": ["Mob_exp10_tm10", "Hatch"] }));
        let action = pick(&g, |a| matches!(a, PlayerAction::Fight(_)));
        assert_eq!(g.execute(action), TurnOutcome::Continue);
        assert_eq!(g.state().ledger.total_exp(), 10);
        assert_eq!(
            g.state().ledger.remaining_time(),
            dec!(123446.0987654321)
        );
        // The menu is rebuilt without the defeated monster.
        assert!(!g
            .menu()
            .entries()
            .iter()
            .any(|entry| matches!(entry.action, PlayerAction::Fight(_))));
    }

    #[test]
    fn test_fighting_on_a_negative_balance_never_kills() {
        let mut g = game(json!({
            "Location_0_tm0": ["Mob_exp1_tm200000", "Mob_exp1_tm1"]
        }));
        let first = pick(&g, |a| matches!(a, PlayerAction::Fight(_)));
        assert_eq!(g.execute(first), TurnOutcome::Continue);
        assert!(g.state().ledger.is_flooded());
        let second = pick(&g, |a| matches!(a, PlayerAction::Fight(_)));
        assert_eq!(g.execute(second), TurnOutcome::Continue);
        assert_eq!(g.state().ledger.total_exp(), 2);
    }

    #[test]
    fn test_move_is_forward_only() {
        let mut g = game(json!({
            "Location_0_tm0": [
                { "Location_1_tm1040": [ { "Location_2_tm5": [] } ] }
            ]
        }));
        let action = pick(&g, |a| matches!(a, PlayerAction::Move(_)));
        assert_eq!(g.execute(action), TurnOutcome::Continue);
        assert_eq!(g.dungeon().node(g.state().current).id, 1);
        assert!(g.state().visited.contains(&1));
        assert_eq!(
            g.state().ledger.remaining_time(),
            dec!(122416.0987654321)
        );
        // From here only deeper; Location_1 never reappears on a menu.
        let labels: Vec<_> = g
            .menu()
            .entries()
            .iter()
            .map(|entry| entry.label.clone())
            .collect();
        assert_eq!(labels, ["Location_2_tm5", "Give up and leave the dungeon"]);
    }

    #[test]
    fn test_move_into_a_flooding_passage_kills() {
        let mut g = game(json!({
            "Location_0_tm0": [ { "Location_1_tm999999": [] } ]
        }));
        g.take_events();
        let action = pick(&g, |a| matches!(a, PlayerAction::Move(_)));
        assert_eq!(g.execute(action), TurnOutcome::Died(DeathCause::Flood));
        // Already respawned: full budget, back at the entrance.
        assert_eq!(g.state().ledger, Ledger::new());
        assert_eq!(g.dungeon().node(g.state().current).id, 0);
        assert!(g.state().visited.is_empty());
        let events = g.take_events();
        assert!(events.contains(&GameEvent::Flooded));
        assert!(events.contains(&GameEvent::Respawned));
        // The death was recorded where it happened.
        assert_eq!(g.recorder().snapshots.len(), 1);
        assert_eq!(
            g.recorder().snapshots[0].current_location,
            "Location_1_tm999999"
        );
    }

    #[test]
    fn test_winning_through_the_hatch() {
        let mut g = game(json!({
            "Location_0_tm0": [
                "Boss_exp280_tm300",
                { "Location_1_tm1000": ["Hatch_tm10"] }
            ]
        }));
        let boss = pick(&g, |a| matches!(a, PlayerAction::Fight(_)));
        g.execute(boss);
        let descend = pick(&g, |a| matches!(a, PlayerAction::Move(_)));
        g.execute(descend);
        let open = pick(&g, |a| matches!(a, PlayerAction::OpenHatch(_)));
        assert_eq!(g.execute(open), TurnOutcome::Won);
        assert_eq!(g.recorder().snapshots.len(), 1);
        let snapshot = &g.recorder().snapshots[0];
        assert_eq!(snapshot.current_location, "Location_1_tm1000");
        assert_eq!(snapshot.current_experience, 280);
        assert_eq!(snapshot.current_date, "2024-01-01-00.00.00");
    }

    #[test]
    fn test_flood_dominates_experience_at_the_hatch() {
        // Enough experience, but the open cost itself empties the budget.
        let mut g = game(json!({
            "Location_0_tm0": ["Boss_exp280_tm1", "Hatch_tm999999"]
        }));
        let boss = pick(&g, |a| matches!(a, PlayerAction::Fight(_)));
        g.execute(boss);
        let open = pick(&g, |a| matches!(a, PlayerAction::OpenHatch(_)));
        assert_eq!(g.execute(open), TurnOutcome::Died(DeathCause::Flood));
    }

    #[test]
    fn test_hatch_resists_while_monsters_remain() {
        let mut g = game(json!({
            "Location_0_tm0": ["Mob_exp10_tm10", "Boss_exp280_tm1", "Hatch_tm5"]
        }));
        g.take_events();
        let open = pick(&g, |a| matches!(a, PlayerAction::OpenHatch(_)));
        assert_eq!(g.execute(open.clone()), TurnOutcome::Continue);
        assert!(g.take_events().contains(&GameEvent::HatchResisted));
        // The failed attempt still cost its open time.
        assert_eq!(
            g.state().ledger.remaining_time(),
            dec!(123451.0987654321)
        );
        // Earn the experience, try again.
        let first_fight = pick(&g, |a| matches!(a, PlayerAction::Fight(_)));
        g.execute(first_fight);
        let second_fight = pick(&g, |a| matches!(a, PlayerAction::Fight(_)));
        g.execute(second_fight);
        assert_eq!(g.execute(open), TurnOutcome::Won);
    }

    #[test]
    fn test_stupid_death_with_nothing_left_to_fight() {
        let mut g = game(json!({
            "Location_0_tm0": ["Mob_exp10_tm10", "Hatch_tm5"]
        }));
        let mob = pick(&g, |a| matches!(a, PlayerAction::Fight(_)));
        g.execute(mob);
        g.take_events();
        let open = pick(&g, |a| matches!(a, PlayerAction::OpenHatch(_)));
        assert_eq!(
            g.execute(open),
            TurnOutcome::Died(DeathCause::OutOfExperience)
        );
        assert!(g.take_events().contains(&GameEvent::StupidDeath));
        // Respawn rewinds everything, including the defeated monster.
        assert_eq!(g.state().ledger, Ledger::new());
        assert!(g
            .menu()
            .entries()
            .iter()
            .any(|entry| matches!(entry.action, PlayerAction::Fight(_))));
    }

    #[test]
    fn test_an_unvisited_side_room_postpones_the_stupid_death() {
        // No monsters here, but an unexplored location keeps hope alive.
        let mut g = game(json!({
            "Location_0_tm0": [
                "Hatch_tm5",
                { "Location_1_tm5": ["Boss_exp280_tm1"] }
            ]
        }));
        let open = pick(&g, |a| matches!(a, PlayerAction::OpenHatch(_)));
        assert_eq!(g.execute(open), TurnOutcome::Continue);
    }

    #[test]
    fn test_quit_records_exactly_one_snapshot() {
        let mut g = game(json!({ "Location_0_tm0": ["Mob_exp10_tm10"] }));
        assert_eq!(g.execute(PlayerAction::Quit), TurnOutcome::Quit);
        let recorder = g.into_recorder();
        assert_eq!(recorder.snapshots.len(), 1);
        assert_eq!(recorder.snapshots[0].current_location, "Location_0_tm0");
        assert_eq!(recorder.snapshots[0].current_experience, 0);
    }

    #[test]
    fn test_visited_only_grows_until_respawn() {
        let mut g = game(json!({
            "Location_0_tm0": [
                { "Location_1_tm5": [ { "Location_2_tm999999": [] } ] }
            ]
        }));
        let first = pick(&g, |a| matches!(a, PlayerAction::Move(_)));
        g.execute(first);
        assert_eq!(g.state().visited.len(), 1);
        let second = pick(&g, |a| matches!(a, PlayerAction::Move(_)));
        // This move floods; visited must reset with the respawn.
        assert_eq!(g.execute(second), TurnOutcome::Died(DeathCause::Flood));
        assert!(g.state().visited.is_empty());
    }
}
