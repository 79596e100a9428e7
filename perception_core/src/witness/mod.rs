//! Witness tracking - who perceived a change, and what they learned from it.
//!
//! Gameplay code mutates the world, then reports the mutation as a
//! [`StateChange`]. The [`WitnessSystem`] asks the scope resolver which
//! actors could perceive it, folds the result into each witness's
//! knowledge, and returns the notification events to narrate.

mod events;
mod knowledge;
mod system;

pub use events::*;
pub use knowledge::*;
pub use system::*;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use world_model::EntityId;

use crate::scope::SenseType;

/// What kind of change happened to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    Move,
    Create,
    Destroy,
    Modify,
    Action,
}

/// A perceptible change to the world, reported after it happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    pub kind: ChangeKind,

    /// The entity witnesses perceive.
    pub entity_id: EntityId,

    /// Who caused the change. They never witness it themselves.
    pub actor_id: Option<EntityId>,

    pub from: Option<EntityId>,
    pub to: Option<EntityId>,

    /// Changed property, for modifications.
    pub property: Option<String>,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,

    /// Action identifier, for actions.
    pub action: Option<String>,

    /// Object of the action.
    pub target: Option<EntityId>,

    /// Turn the change happened on.
    pub timestamp: u64,
}

impl StateChange {
    fn new(kind: ChangeKind, entity_id: EntityId) -> Self {
        Self {
            kind,
            entity_id,
            actor_id: None,
            from: None,
            to: None,
            property: None,
            old_value: None,
            new_value: None,
            action: None,
            target: None,
            timestamp: 0,
        }
    }

    /// An entity moved between two locations.
    pub fn moved(entity_id: EntityId, from: Option<EntityId>, to: Option<EntityId>) -> Self {
        Self {
            from,
            to,
            ..Self::new(ChangeKind::Move, entity_id)
        }
    }

    /// An entity came into existence.
    pub fn created(entity_id: EntityId) -> Self {
        Self::new(ChangeKind::Create, entity_id)
    }

    /// An entity is about to stop existing. Report before removing it.
    pub fn destroyed(entity_id: EntityId) -> Self {
        Self::new(ChangeKind::Destroy, entity_id)
    }

    /// A property of an entity changed.
    pub fn modified(entity_id: EntityId, property: impl Into<String>, new_value: Value) -> Self {
        Self {
            property: Some(property.into()),
            new_value: Some(new_value),
            ..Self::new(ChangeKind::Modify, entity_id)
        }
    }

    /// An actor performed an action. Witnesses perceive the actor.
    pub fn action(actor_id: EntityId, action: impl Into<String>) -> Self {
        Self {
            actor_id: Some(actor_id),
            action: Some(action.into()),
            ..Self::new(ChangeKind::Action, actor_id)
        }
    }

    /// Set who caused the change.
    pub fn by(mut self, actor_id: EntityId) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    /// Set the object of an action.
    pub fn with_target(mut self, target: EntityId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_old_value(mut self, old_value: Value) -> Self {
        self.old_value = Some(old_value);
        self
    }

    pub fn with_locations(mut self, from: Option<EntityId>, to: Option<EntityId>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Set the turn the change happened on.
    pub fn at(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// How much of a change a witness took in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WitnessLevel {
    /// Close enough to identify everything involved.
    Full,
    /// Perceived that something happened, not necessarily what.
    Partial,
    /// Caught at the edge of perception.
    Peripheral,
    /// Deduced rather than perceived.
    Inferred,
}

/// How sure a witness is of what they perceived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    Certain,
    Likely,
    Unsure,
}

/// How one actor witnessed a change: exactly one sense, the best available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessDetail {
    pub sense: SenseType,
    pub level: WitnessLevel,
    pub confidence: Confidence,
}

/// Everyone who witnessed one change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WitnessRecord {
    pub change: StateChange,
    pub witnesses: BTreeMap<EntityId, WitnessDetail>,
}

impl WitnessRecord {
    pub fn witnessed_by(&self, actor: EntityId) -> Option<&WitnessDetail> {
        self.witnesses.get(&actor)
    }

    pub fn is_empty(&self) -> bool {
        self.witnesses.is_empty()
    }
}
