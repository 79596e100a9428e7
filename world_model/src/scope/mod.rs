//! Scope levels and the author-facing side-tables keyed by entity.
//!
//! - [`ScopeLevel`]: how strongly an actor perceives an entity
//! - [`MinimumScope`]: author-declared floors on perceptibility
//! - [`ScopePriorities`]: per-action disambiguation weights

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::entities::EntityId;

/// Weight reported for an action with no stored priority.
pub const DEFAULT_SCOPE_PRIORITY: i32 = 100;

/// Perceptual strength, ordered weakest to strongest.
///
/// The ordering is load-bearing: overrides combine with the physical level
/// via `max`, and callers filter candidates with `>=`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum ScopeLevel {
    /// Out of scope.
    #[default]
    Unaware,
    /// Author-granted ambient awareness with no physical sense behind it.
    Aware,
    /// Smell-like detection.
    Detectable,
    Audible,
    Visible,
    Reachable,
    Carried,
}

impl ScopeLevel {
    pub const OUT_OF_SCOPE: ScopeLevel = ScopeLevel::Unaware;

    /// Whether the entity is in scope at all.
    pub fn is_in_scope(&self) -> bool {
        *self > ScopeLevel::Unaware
    }

    /// Whether this level satisfies a required minimum.
    pub fn satisfies(&self, required: ScopeLevel) -> bool {
        *self >= required
    }
}

impl std::fmt::Display for ScopeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScopeLevel::Unaware => "unaware",
            ScopeLevel::Aware => "aware",
            ScopeLevel::Detectable => "detectable",
            ScopeLevel::Audible => "audible",
            ScopeLevel::Visible => "visible",
            ScopeLevel::Reachable => "reachable",
            ScopeLevel::Carried => "carried",
        };
        f.write_str(name)
    }
}

/// Author-declared minimum scope for one entity.
///
/// Entries are keyed either globally or by the id of a room (or vehicle, or
/// any container) the observing actor is inside. Overrides only ever raise
/// the physically computed level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MinimumScope {
    /// Room-independent floor.
    #[serde(default)]
    pub global: Option<ScopeLevel>,

    /// Floors that apply only while the actor is inside the keyed entity.
    #[serde(default)]
    pub rooms: HashMap<EntityId, ScopeLevel>,
}

impl MinimumScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a floor globally (`None`) or for each of the given rooms.
    pub fn set(&mut self, level: ScopeLevel, rooms: Option<&[EntityId]>) {
        match rooms {
            None => self.global = Some(level),
            Some(rooms) => {
                for room in rooms {
                    self.rooms.insert(*room, level);
                }
            }
        }
    }

    /// Clear the global floor (`None`) or the floors of the given rooms.
    pub fn clear(&mut self, rooms: Option<&[EntityId]>) {
        match rooms {
            None => self.global = None,
            Some(rooms) => {
                for room in rooms {
                    self.rooms.remove(room);
                }
            }
        }
    }

    /// The floor stored under exactly this key, with no fallback.
    pub fn get(&self, room: Option<EntityId>) -> ScopeLevel {
        let stored = match room {
            None => self.global,
            Some(room) => self.rooms.get(&room).copied(),
        };
        stored.unwrap_or_default()
    }

    /// The highest floor applying to an actor whose containment path is `path`.
    pub fn resolve(&self, path: &[EntityId]) -> ScopeLevel {
        path.iter()
            .filter_map(|id| self.rooms.get(id).copied())
            .chain(self.global)
            .max()
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_none() && self.rooms.is_empty()
    }
}

/// Per-action disambiguation weights for one entity. Higher wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScopePriorities {
    weights: HashMap<String, i32>,
}

impl ScopePriorities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored weight for the action, or [`DEFAULT_SCOPE_PRIORITY`].
    pub fn get(&self, action: &str) -> i32 {
        self.weights
            .get(action)
            .copied()
            .unwrap_or(DEFAULT_SCOPE_PRIORITY)
    }

    pub fn set(&mut self, action: impl Into<String>, weight: i32) {
        self.weights.insert(action.into(), weight);
    }

    pub fn clear(&mut self, action: &str) -> Option<i32> {
        self.weights.remove(action)
    }

    pub fn clear_all(&mut self) {
        self.weights.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.weights.iter().map(|(action, weight)| (action.as_str(), *weight))
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
