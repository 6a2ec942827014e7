//! Tag grammar for the dungeon map.
//!
//! Locations, monsters and the hatch arrive as tagged strings embedded in the
//! map data: `Location_4_tm66600`, `Mob_exp10_tm10`, `Boss_exp280_tm666.6`,
//! `Hatch_tm159.0987654321`. This module classifies a raw tag and decomposes
//! it into a typed record so the rest of the crate never sniffs substrings.
//!
//! Every numeric suffix is parsed as an exact decimal. `tm30000` is the
//! integer-valued decimal 30000, never a binary float.

use rust_decimal::Decimal;
use thiserror::Error;

/// A classified map tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// A visitable location and the time it costs to enter.
    Location { id: u32, entry_cost: Decimal },
    /// The exit hatch and the time one attempt at opening it costs.
    Hatch { open_cost: Decimal },
    /// A monster: experience granted and time spent defeating it.
    Monster { exp_reward: u32, fight_cost: Decimal },
}

/// Malformed tag in the map data. Fatal at startup: the map is a
/// precondition, not something to recover from mid-game.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("tag '{0}' matches no known shape")]
    UnknownShape(String),
    #[error("bad {field} in tag '{tag}'")]
    BadNumber { tag: String, field: &'static str },
}

/// Classifies a raw tag string.
pub fn parse_tag(tag: &str) -> Result<Tag, ParseError> {
    if let Some(rest) = tag.strip_prefix("Location_") {
        return parse_location(tag, rest);
    }
    if tag == "Hatch" {
        return Ok(Tag::Hatch {
            open_cost: Decimal::ZERO,
        });
    }
    if let Some(rest) = tag.strip_prefix("Hatch_tm") {
        return Ok(Tag::Hatch {
            open_cost: parse_decimal(tag, rest, "open time")?,
        });
    }
    if let Some(idx) = tag.find("_exp") {
        let prefix = &tag[..idx];
        if is_monster_prefix(prefix) {
            return parse_monster(tag, &tag[idx + "_exp".len()..]);
        }
    }
    Err(ParseError::UnknownShape(tag.to_string()))
}

/// Monster names start with an M or B word: `Mob`, `Boss`, and friends.
fn is_monster_prefix(prefix: &str) -> bool {
    matches!(prefix.chars().next(), Some('M' | 'B' | 'b'))
        && prefix.chars().all(|c| c.is_ascii_alphabetic())
}

fn parse_location(tag: &str, rest: &str) -> Result<Tag, ParseError> {
    let (id_part, cost_part) = match rest.split_once("_tm") {
        Some((id, cost)) => (id, Some(cost)),
        None => (rest, None),
    };
    let id = id_part.parse::<u32>().map_err(|_| ParseError::BadNumber {
        tag: tag.to_string(),
        field: "location id",
    })?;
    let entry_cost = match cost_part {
        Some(cost) => parse_decimal(tag, cost, "entry time")?,
        None => Decimal::ZERO,
    };
    Ok(Tag::Location { id, entry_cost })
}

fn parse_monster(tag: &str, rest: &str) -> Result<Tag, ParseError> {
    let (exp_part, cost_part) = rest
        .split_once("_tm")
        .ok_or_else(|| ParseError::UnknownShape(tag.to_string()))?;
    let exp_reward = exp_part.parse::<u32>().map_err(|_| ParseError::BadNumber {
        tag: tag.to_string(),
        field: "experience",
    })?;
    let fight_cost = parse_decimal(tag, cost_part, "fight time")?;
    Ok(Tag::Monster {
        exp_reward,
        fight_cost,
    })
}

fn parse_decimal(tag: &str, raw: &str, field: &'static str) -> Result<Decimal, ParseError> {
    Decimal::from_str_exact(raw).map_err(|_| ParseError::BadNumber {
        tag: tag.to_string(),
        field,
    })
}
