//! Witness notification events handed to the rendering layer.

use serde::{Deserialize, Serialize};
use world_model::EntityId;

use super::WitnessLevel;
use crate::scope::SenseType;

/// Identity of a moved entity as far as the witness could tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerceivedIdentity {
    Known(EntityId),
    /// Something moved, but the witness could not make out what.
    Unknown,
}

impl std::fmt::Display for PerceivedIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PerceivedIdentity::Known(id) => write!(f, "{}", id),
            PerceivedIdentity::Unknown => f.write_str("unknown"),
        }
    }
}

/// A witness perceived someone doing something.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionWitnessed {
    pub witness_id: EntityId,
    pub sense: SenseType,
    pub level: WitnessLevel,
    pub action: String,
    pub actor_id: Option<EntityId>,
    pub target_id: Option<EntityId>,
    pub from_location: Option<EntityId>,
    pub to_location: Option<EntityId>,
    pub timestamp: u64,
}

/// A witness perceived something moving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementWitnessed {
    pub witness_id: EntityId,
    pub sense: SenseType,
    pub level: WitnessLevel,
    pub entity: PerceivedIdentity,
    pub from_location: Option<EntityId>,
    pub to_location: Option<EntityId>,
    /// Compass direction of travel, when it can be worked out.
    pub direction: Option<String>,
    pub timestamp: u64,
}

/// A sound heard without seeing its source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundHeard {
    pub witness_id: EntityId,
    pub source_id: PerceivedIdentity,
    pub timestamp: u64,
}

/// A scent picked up without seeing its source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScentDetected {
    pub witness_id: EntityId,
    pub source_id: PerceivedIdentity,
    pub timestamp: u64,
}

/// Notification that an actor witnessed something, for optional narration.
///
/// Only `Action` and `Movement` are produced today; `Sound` and `Scent` are
/// reserved for sense-specific narration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WitnessEvent {
    Action(ActionWitnessed),
    Movement(MovementWitnessed),
    Sound(SoundHeard),
    Scent(ScentDetected),
}

impl WitnessEvent {
    /// Event type name used by the event pipeline.
    pub fn event_type(&self) -> &'static str {
        match self {
            WitnessEvent::Action(_) => "if.witness.action",
            WitnessEvent::Movement(_) => "if.witness.movement",
            WitnessEvent::Sound(_) => "if.witness.sound",
            WitnessEvent::Scent(_) => "if.witness.scent",
        }
    }

    pub fn witness_id(&self) -> EntityId {
        match self {
            WitnessEvent::Action(e) => e.witness_id,
            WitnessEvent::Movement(e) => e.witness_id,
            WitnessEvent::Sound(e) => e.witness_id,
            WitnessEvent::Scent(e) => e.witness_id,
        }
    }
}
