//! Offline probe for the winning path.
//!
//! The runtime loop never calls this; well-formed maps guarantee exactly one
//! winning route. The probe exists to validate map data ahead of time and to
//! back tests that need to know a map is (or is not) beatable.

use rust_decimal::Decimal;
use thiserror::Error;

use super::{Dungeon, Entry, NodeId};
use crate::consts::{EXP_TO_OPEN_HATCH, STARTING_TIME};

/// No route through the dungeon reaches the hatch with enough experience
/// inside the time budget.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no path through the dungeon wins within the time budget")]
pub struct NoPathError;

/// A proven route to the hatch: the locations to enter in order, the
/// experience collected along the way, and the time left after the hatch
/// opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinningPath {
    pub locations: Vec<NodeId>,
    pub experience: u32,
    pub time_left: Decimal,
}

/// Depth-first search over root-to-hatch routes. Along each candidate route
/// monsters are fought cheapest-first until the experience threshold is met;
/// this is a validation heuristic, not a general solver (map inputs
/// guarantee a unique winning path).
pub fn find_winning_path(dungeon: &Dungeon) -> Result<WinningPath, NoPathError> {
    let mut route = vec![dungeon.root()];
    let mut monsters = Vec::new();
    search(
        dungeon,
        dungeon.root(),
        Decimal::ZERO,
        &mut route,
        &mut monsters,
    )
    .ok_or(NoPathError)
}

fn search(
    dungeon: &Dungeon,
    at: NodeId,
    moves_cost: Decimal,
    route: &mut Vec<NodeId>,
    monsters: &mut Vec<(u32, Decimal)>,
) -> Option<WinningPath> {
    let mut pushed = 0;
    for entry in dungeon.children(at) {
        if let Entry::Monster(m) = entry {
            monsters.push((m.exp_reward, m.fight_cost));
            pushed += 1;
        }
    }

    let mut found = None;
    for entry in dungeon.children(at) {
        match entry {
            Entry::Hatch(hatch) => {
                if let Some((experience, time_left)) =
                    cheapest_fights(monsters, moves_cost, hatch.open_cost)
                {
                    found = Some(WinningPath {
                        locations: route.clone(),
                        experience,
                        time_left,
                    });
                }
            }
            Entry::Location(child) => {
                let cost = moves_cost + dungeon.node(*child).entry_cost;
                route.push(*child);
                let hit = search(dungeon, *child, cost, route, monsters);
                route.pop();
                found = hit;
            }
            Entry::Monster(_) => {}
        }
        if found.is_some() {
            break;
        }
    }

    monsters.truncate(monsters.len() - pushed);
    found
}

/// Fights monsters available on the route, cheapest first, until the
/// experience threshold is met. Returns the experience and time left if the
/// hatch would open, with the budget still positive after the open cost.
fn cheapest_fights(
    monsters: &[(u32, Decimal)],
    moves_cost: Decimal,
    open_cost: Decimal,
) -> Option<(u32, Decimal)> {
    let mut picks = monsters.to_vec();
    picks.sort_by(|a, b| a.1.cmp(&b.1));

    let mut experience = 0u32;
    let mut fight_time = Decimal::ZERO;
    for (exp, cost) in picks {
        if experience >= EXP_TO_OPEN_HATCH {
            break;
        }
        experience += exp;
        fight_time += cost;
    }

    let time_left = STARTING_TIME - moves_cost - fight_time - open_cost;
    (experience >= EXP_TO_OPEN_HATCH && time_left > Decimal::ZERO)
        .then_some((experience, time_left))
}
