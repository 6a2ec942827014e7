//! Builds the dungeon tree from the deserialized map.
//!
//! The map arrives as a generic JSON tree: each location is a one-key object
//! mapping its tag to an array whose items are monster tag strings, nested
//! location objects, or the hatch (as a bare string or a leaf object).

use hashbrown::HashSet;
use serde_json::Value;
use thiserror::Error;

use super::{Dungeon, Entry, HatchNode, LocationNode, MonsterEntry, NodeId};
use crate::grammar::{self, ParseError, Tag};

/// Structural problem in the map data. Fatal at startup.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("expected a single-key location object, found {0}")]
    NotALocation(String),
    #[error("tag '{0}' cannot appear in this position")]
    WrongTagKind(String),
    #[error("duplicate location id {0}")]
    DuplicateId(u32),
    #[error("location contents must be an array, found {0}")]
    BadContents(String),
}

impl Dungeon {
    /// Walks the map depth-first, attaching each nested location, monster and
    /// hatch as an owned child of its parent. Location ids come from the
    /// grammar and must be unique across the tree.
    pub fn from_value(map: &Value) -> Result<Dungeon, BuildError> {
        let mut dungeon = Dungeon { nodes: Vec::new() };
        let mut seen_ids = HashSet::new();
        build_location(map, &mut dungeon, &mut seen_ids)?;
        Ok(dungeon)
    }
}

fn build_location(
    value: &Value,
    dungeon: &mut Dungeon,
    seen_ids: &mut HashSet<u32>,
) -> Result<NodeId, BuildError> {
    let (tag, contents) = unpack_object(value)?;
    let (id, entry_cost) = match grammar::parse_tag(tag)? {
        Tag::Location { id, entry_cost } => (id, entry_cost),
        _ => return Err(BuildError::WrongTagKind(tag.to_string())),
    };
    if !seen_ids.insert(id) {
        return Err(BuildError::DuplicateId(id));
    }

    // Reserve the slot before recursing so children land after their parent.
    let slot = NodeId(dungeon.nodes.len());
    dungeon.nodes.push(LocationNode {
        id,
        label: tag.to_string(),
        entry_cost,
        contents: Vec::new(),
    });

    let items = contents
        .as_array()
        .ok_or_else(|| BuildError::BadContents(kind_of(contents).to_string()))?;
    let mut entries = Vec::with_capacity(items.len() + 1);
    for item in items {
        match item {
            Value::String(raw) => match grammar::parse_tag(raw)? {
                Tag::Monster {
                    exp_reward,
                    fight_cost,
                } => entries.push(Entry::Monster(MonsterEntry {
                    label: raw.clone(),
                    exp_reward,
                    fight_cost,
                })),
                Tag::Hatch { open_cost } => entries.push(Entry::Hatch(HatchNode {
                    label: raw.clone(),
                    open_cost,
                })),
                Tag::Location { .. } => return Err(BuildError::WrongTagKind(raw.clone())),
            },
            Value::Object(_) => {
                // A leaf object keyed by a hatch tag is the hatch itself;
                // anything else must be a nested location.
                let (key, _) = unpack_object(item)?;
                if let Ok(Tag::Hatch { open_cost }) = grammar::parse_tag(key) {
                    entries.push(Entry::Hatch(HatchNode {
                        label: key.to_string(),
                        open_cost,
                    }));
                } else {
                    let child = build_location(item, dungeon, seen_ids)?;
                    entries.push(Entry::Location(child));
                }
            }
            other => return Err(BuildError::BadContents(kind_of(other).to_string())),
        }
    }
    dungeon.nodes[slot.0].contents = entries;
    Ok(slot)
}

fn unpack_object(value: &Value) -> Result<(&str, &Value), BuildError> {
    let obj = value
        .as_object()
        .ok_or_else(|| BuildError::NotALocation(kind_of(value).to_string()))?;
    if obj.len() != 1 {
        return Err(BuildError::NotALocation(format!(
            "object with {} keys",
            obj.len()
        )));
    }
    let (tag, contents) = obj.iter().next().unwrap_or_else(|| unreachable!());
    Ok((tag.as_str(), contents))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
