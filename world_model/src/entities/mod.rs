//! Entity definitions for the containment graph.

mod traits;

pub use traits::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for all entities in the world.
///
/// Ordered so it can key ordered maps; rooms, actors and items share one id space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Create a new random entity ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an entity ID from a specific UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Create a nil/empty entity ID. Sorts before every generated ID.
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A thing in the world: a room, an item, a container, an actor.
///
/// What an entity *is* comes entirely from its traits. At most one trait of
/// each [`TraitKind`] is attached at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    traits: Vec<Trait>,
}

impl Entity {
    /// Create a new trait-less entity with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            traits: Vec::new(),
        }
    }

    /// Attach a trait, replacing any existing trait of the same kind.
    pub fn with_trait(mut self, t: Trait) -> Self {
        self.add_trait(t);
        self
    }

    /// Attach a trait, replacing any existing trait of the same kind.
    pub fn add_trait(&mut self, t: Trait) {
        let kind = t.kind();
        match self.traits.iter_mut().find(|existing| existing.kind() == kind) {
            Some(existing) => *existing = t,
            None => self.traits.push(t),
        }
    }

    /// Detach the trait of the given kind, returning it.
    pub fn remove_trait(&mut self, kind: TraitKind) -> Option<Trait> {
        let index = self.traits.iter().position(|t| t.kind() == kind)?;
        Some(self.traits.remove(index))
    }

    pub fn has(&self, kind: TraitKind) -> bool {
        self.traits.iter().any(|t| t.kind() == kind)
    }

    pub fn get(&self, kind: TraitKind) -> Option<&Trait> {
        self.traits.iter().find(|t| t.kind() == kind)
    }

    pub fn get_mut(&mut self, kind: TraitKind) -> Option<&mut Trait> {
        self.traits.iter_mut().find(|t| t.kind() == kind)
    }

    /// Iterate over attached traits in attachment order.
    pub fn traits(&self) -> impl Iterator<Item = &Trait> {
        self.traits.iter()
    }

    pub fn is_room(&self) -> bool {
        self.has(TraitKind::Room)
    }

    pub fn is_actor(&self) -> bool {
        self.has(TraitKind::Actor)
    }

    /// Whether the entity is currently open.
    ///
    /// Returns `None` for entities that cannot be opened or closed at all.
    pub fn is_open(&self) -> Option<bool> {
        match self.get(TraitKind::Openable) {
            Some(Trait::Openable { open }) => Some(*open),
            _ => None,
        }
    }

    /// Closed and openable. Non-openable entities are never closed.
    pub fn is_closed(&self) -> bool {
        self.is_open() == Some(false)
    }

    /// Whether the entity is a container you can see into while it is closed.
    pub fn is_transparent(&self) -> bool {
        matches!(
            self.get(TraitKind::Container),
            Some(Trait::Container { transparent: true })
        )
    }

    /// Whether the entity is a room with no ambient light.
    pub fn is_dark(&self) -> bool {
        matches!(self.get(TraitKind::Room), Some(Trait::Room { dark: true }))
    }

    /// Whether the entity currently gives off light.
    ///
    /// A light source with a switch only shines while it is switched on.
    pub fn emits_light(&self) -> bool {
        let lit = match self.get(TraitKind::LightSource) {
            Some(Trait::LightSource { lit }) => *lit,
            _ => false,
        };
        let switched_on = match self.get(TraitKind::Switchable) {
            Some(Trait::Switchable { on }) => *on,
            _ => true,
        };
        let glowing = matches!(
            self.get(TraitKind::Actor),
            Some(Trait::Actor {
                provides_light: true,
                ..
            })
        );
        (lit && switched_on) || glowing
    }

    /// Explicitly hidden scenery can never be seen.
    pub fn is_hidden(&self) -> bool {
        matches!(
            self.get(TraitKind::Scenery),
            Some(Trait::Scenery { visible: false })
        )
    }

    /// Whether the entity gives off a smell at all.
    pub fn has_scent(&self) -> bool {
        self.has(TraitKind::Scented) || self.has(TraitKind::Edible) || self.is_actor()
    }

    /// Whether the smell is strong enough to leak out of a closed container.
    pub fn has_strong_scent(&self) -> bool {
        matches!(
            self.get(TraitKind::Scented),
            Some(Trait::Scented { strong: true })
        )
    }

    pub fn is_loud(&self) -> bool {
        self.has(TraitKind::Loud)
    }

    /// The two rooms this door joins, if the entity is a door.
    pub fn door_rooms(&self) -> Option<(EntityId, EntityId)> {
        match self.get(TraitKind::Door) {
            Some(Trait::Door { room1, room2 }) => Some((*room1, *room2)),
            _ => None,
        }
    }
}
