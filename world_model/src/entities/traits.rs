//! Trait definitions - the typed capability bundles attached to entities.

use serde::{Deserialize, Serialize};

use super::EntityId;

/// A capability attached to an entity, with its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trait {
    /// A location actors can stand in. Dark rooms need light to see in.
    Room { dark: bool },

    /// Something other entities can be put inside.
    Container { transparent: bool },

    /// Something other entities can be put on. Never blocks perception.
    Supporter,

    Openable { open: bool },

    LightSource { lit: bool },

    Switchable { on: bool },

    Actor { player: bool, provides_light: bool },

    Scenery { visible: bool },

    /// A door joining two rooms. Sound always crosses it; sight and smell
    /// only while it is open.
    Door { room1: EntityId, room2: EntityId },

    Edible,

    /// Gives off a smell. Strong scents leak out of closed containers.
    Scented { strong: bool },

    /// Heard even from inside a closed container.
    Loud,

    /// Something actors ride in. Minimum scopes keyed to it apply to
    /// everyone aboard, since overrides resolve against every ancestor.
    Vehicle,
}

/// Fieldless discriminant of [`Trait`], used for lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraitKind {
    Room,
    Container,
    Supporter,
    Openable,
    LightSource,
    Switchable,
    Actor,
    Scenery,
    Door,
    Edible,
    Scented,
    Loud,
    Vehicle,
}

impl Trait {
    /// A lit room.
    pub fn room() -> Self {
        Trait::Room { dark: false }
    }

    /// An opaque container.
    pub fn container() -> Self {
        Trait::Container { transparent: false }
    }

    /// A non-player actor.
    pub fn actor() -> Self {
        Trait::Actor {
            player: false,
            provides_light: false,
        }
    }

    /// The player character.
    pub fn player() -> Self {
        Trait::Actor {
            player: true,
            provides_light: false,
        }
    }

    pub fn door(room1: EntityId, room2: EntityId) -> Self {
        Trait::Door { room1, room2 }
    }

    pub fn kind(&self) -> TraitKind {
        match self {
            Trait::Room { .. } => TraitKind::Room,
            Trait::Container { .. } => TraitKind::Container,
            Trait::Supporter => TraitKind::Supporter,
            Trait::Openable { .. } => TraitKind::Openable,
            Trait::LightSource { .. } => TraitKind::LightSource,
            Trait::Switchable { .. } => TraitKind::Switchable,
            Trait::Actor { .. } => TraitKind::Actor,
            Trait::Scenery { .. } => TraitKind::Scenery,
            Trait::Door { .. } => TraitKind::Door,
            Trait::Edible => TraitKind::Edible,
            Trait::Scented { .. } => TraitKind::Scented,
            Trait::Loud => TraitKind::Loud,
            Trait::Vehicle => TraitKind::Vehicle,
        }
    }
}
