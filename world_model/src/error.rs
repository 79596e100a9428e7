//! Errors raised by world mutation and save/restore.

use thiserror::Error;

use crate::entities::{EntityId, TraitKind};

pub type Result<T> = std::result::Result<T, WorldError>;

#[derive(Error, Debug)]
pub enum WorldError {
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("Containment cycle detected at entity {0}")]
    ContainmentCycle(EntityId),

    #[error("Containment deeper than {depth} levels starting at {entity}")]
    DepthExceeded { entity: EntityId, depth: usize },

    #[error("Entity {entity} has no {kind:?} trait")]
    MissingTrait { entity: EntityId, kind: TraitKind },

    #[error("World serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
