//! World state management - the containment graph and its side-tables.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

use crate::entities::{Entity, EntityId, Trait, TraitKind};
use crate::error::{Result, WorldError};
use crate::scope::{MinimumScope, ScopeLevel, ScopePriorities, DEFAULT_SCOPE_PRIORITY};

/// Default cap on how many parents a containment walk will follow.
pub const MAX_CONTAINMENT_DEPTH: usize = 32;

/// The complete state of the world at any point in time.
///
/// Placement is exclusive: every entity has at most one parent. Minimum
/// scopes and disambiguation priorities live in side-tables keyed by entity
/// id so that clone and save/restore have a single owner for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WorldModel {
    /// Turn counter used to timestamp witnessed changes.
    turn: u64,

    entities: HashMap<EntityId, Entity>,

    /// Child -> parent placement.
    locations: HashMap<EntityId, EntityId>,

    #[serde(default)]
    minimum_scopes: HashMap<EntityId, MinimumScope>,

    #[serde(default)]
    scope_priorities: HashMap<EntityId, ScopePriorities>,
}

impl WorldModel {
    /// Create a new empty world.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// Advance the turn counter, returning the new turn.
    pub fn advance_turn(&mut self) -> u64 {
        self.turn += 1;
        self.turn
    }

    /// Add an entity to the world, unplaced.
    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let id = entity.id;
        self.entities.insert(id, entity);
        id
    }

    /// Remove an entity together with its placement and side-table entries.
    ///
    /// Anything it contained is left without a location.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(&id)?;
        self.locations.remove(&id);
        self.locations.retain(|_, parent| *parent != id);
        self.minimum_scopes.remove(&id);
        self.scope_priorities.remove(&id);
        Some(entity)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Iterate over every entity in the world.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// All entities with the actor trait.
    pub fn actors(&self) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.is_actor())
            .map(|e| e.id)
            .collect()
    }

    pub fn has_trait(&self, id: EntityId, kind: TraitKind) -> bool {
        self.entity(id).is_some_and(|e| e.has(kind))
    }

    pub fn get_trait(&self, id: EntityId, kind: TraitKind) -> Option<&Trait> {
        self.entity(id).and_then(|e| e.get(kind))
    }

    /// Immediate parent of an entity.
    pub fn location(&self, id: EntityId) -> Option<EntityId> {
        self.locations.get(&id).copied()
    }

    /// Immediate children of a container, supporter, actor or room.
    pub fn contents(&self, container: EntityId) -> Vec<EntityId> {
        self.locations
            .iter()
            .filter(|(_, parent)| **parent == container)
            .map(|(child, _)| *child)
            .collect()
    }

    /// Move an entity, refusing unknown ids and moves that would create a cycle.
    pub fn move_entity(&mut self, entity: EntityId, destination: EntityId) -> Result<()> {
        if !self.contains(entity) {
            return Err(WorldError::EntityNotFound(entity));
        }
        if !self.contains(destination) {
            return Err(WorldError::EntityNotFound(destination));
        }
        if entity == destination || self.ancestors(destination)?.contains(&entity) {
            return Err(WorldError::ContainmentCycle(entity));
        }

        self.locations.insert(entity, destination);
        Ok(())
    }

    /// Place an entity without validation, the way story setup code does.
    ///
    /// Nothing stops this from creating a cycle; traversal guards against it.
    pub fn author_move(&mut self, entity: EntityId, destination: EntityId) {
        self.locations.insert(entity, destination);
    }

    /// Take an entity out of the containment graph, returning its old parent.
    pub fn remove_from_world(&mut self, entity: EntityId) -> Option<EntityId> {
        self.locations.remove(&entity)
    }

    /// Parents of an entity from the innermost outward.
    pub fn ancestors(&self, id: EntityId) -> Result<Vec<EntityId>> {
        self.ancestors_bounded(id, MAX_CONTAINMENT_DEPTH)
    }

    /// Parents of an entity from the innermost outward, following at most
    /// `max_depth` links.
    ///
    /// Fails on a containment cycle or when the cap is hit.
    pub fn ancestors_bounded(&self, id: EntityId, max_depth: usize) -> Result<Vec<EntityId>> {
        let mut path = Vec::new();
        let mut visited = HashSet::from([id]);
        let mut current = id;

        while let Some(parent) = self.location(current) {
            if !visited.insert(parent) {
                warn!(entity = %id, at = %parent, "containment cycle detected");
                return Err(WorldError::ContainmentCycle(parent));
            }
            if path.len() >= max_depth {
                warn!(entity = %id, depth = max_depth, "containment depth cap reached");
                return Err(WorldError::DepthExceeded {
                    entity: id,
                    depth: max_depth,
                });
            }
            path.push(parent);
            current = parent;
        }

        Ok(path)
    }

    /// Whether `container` appears anywhere above `entity`.
    pub fn is_inside(&self, entity: EntityId, container: EntityId) -> bool {
        self.ancestors(entity)
            .map(|path| path.contains(&container))
            .unwrap_or(false)
    }

    /// Nearest room-tagged entity, counting the entity itself.
    pub fn containing_room(&self, id: EntityId) -> Option<EntityId> {
        if self.entity(id)?.is_room() {
            return Some(id);
        }
        self.ancestors(id)
            .ok()?
            .into_iter()
            .find(|ancestor| self.entity(*ancestor).is_some_and(Entity::is_room))
    }

    /// Doors joining the two rooms, in either orientation.
    pub fn doors_between(&self, room_a: EntityId, room_b: EntityId) -> Vec<&Entity> {
        self.entities
            .values()
            .filter(|e| match e.door_rooms() {
                Some((r1, r2)) => (r1 == room_a && r2 == room_b) || (r1 == room_b && r2 == room_a),
                None => false,
            })
            .collect()
    }

    /// Open or close an openable entity.
    pub fn set_open(&mut self, id: EntityId, open: bool) -> Result<()> {
        self.replace_trait(id, TraitKind::Openable, Trait::Openable { open })
    }

    /// Light or extinguish a light source.
    pub fn set_lit(&mut self, id: EntityId, lit: bool) -> Result<()> {
        self.replace_trait(id, TraitKind::LightSource, Trait::LightSource { lit })
    }

    /// Toggle a room's ambient darkness.
    pub fn set_dark(&mut self, id: EntityId, dark: bool) -> Result<()> {
        self.replace_trait(id, TraitKind::Room, Trait::Room { dark })
    }

    fn replace_trait(&mut self, id: EntityId, kind: TraitKind, value: Trait) -> Result<()> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(WorldError::EntityNotFound(id))?;
        let slot = entity
            .get_mut(kind)
            .ok_or(WorldError::MissingTrait { entity: id, kind })?;
        *slot = value;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Minimum scope overrides (authoring API)
    // ------------------------------------------------------------------

    /// Declare a floor on how perceptible `entity` is, globally (`None`) or
    /// only for actors inside one of `rooms`.
    pub fn set_minimum_scope(
        &mut self,
        entity: EntityId,
        level: ScopeLevel,
        rooms: Option<&[EntityId]>,
    ) {
        self.minimum_scopes
            .entry(entity)
            .or_default()
            .set(level, rooms);
    }

    pub fn clear_minimum_scope(&mut self, entity: EntityId, rooms: Option<&[EntityId]>) {
        if let Some(table) = self.minimum_scopes.get_mut(&entity) {
            table.clear(rooms);
            if table.is_empty() {
                self.minimum_scopes.remove(&entity);
            }
        }
    }

    /// The floor stored under exactly this key (`None` = global).
    pub fn minimum_scope(&self, entity: EntityId, room: Option<EntityId>) -> ScopeLevel {
        self.minimum_scopes
            .get(&entity)
            .map(|table| table.get(room))
            .unwrap_or_default()
    }

    /// The highest floor for an actor whose containment path is `path`.
    pub fn minimum_scope_for(&self, entity: EntityId, path: &[EntityId]) -> ScopeLevel {
        self.minimum_scopes
            .get(&entity)
            .map(|table| table.resolve(path))
            .unwrap_or_default()
    }

    pub fn minimum_scopes(&self, entity: EntityId) -> Option<&MinimumScope> {
        self.minimum_scopes.get(&entity)
    }

    /// Entities carrying at least one minimum-scope entry.
    pub fn entities_with_minimum_scope(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.minimum_scopes.keys().copied()
    }

    // ------------------------------------------------------------------
    // Disambiguation priorities (authoring API)
    // ------------------------------------------------------------------

    /// Weight of `entity` for `action`, [`DEFAULT_SCOPE_PRIORITY`] when unset.
    pub fn scope_priority(&self, entity: EntityId, action: &str) -> i32 {
        self.scope_priorities
            .get(&entity)
            .map(|p| p.get(action))
            .unwrap_or(DEFAULT_SCOPE_PRIORITY)
    }

    pub fn set_scope_priority(&mut self, entity: EntityId, action: impl Into<String>, weight: i32) {
        self.scope_priorities
            .entry(entity)
            .or_default()
            .set(action, weight);
    }

    pub fn clear_scope_priority(&mut self, entity: EntityId, action: &str) {
        if let Some(priorities) = self.scope_priorities.get_mut(&entity) {
            priorities.clear(action);
            if priorities.is_empty() {
                self.scope_priorities.remove(&entity);
            }
        }
    }

    pub fn clear_all_scope_priorities(&mut self, entity: EntityId) {
        self.scope_priorities.remove(&entity);
    }

    /// Stored (non-default) priorities of an entity.
    pub fn scope_priorities(&self, entity: EntityId) -> HashMap<String, i32> {
        self.scope_priorities
            .get(&entity)
            .map(|p| p.iter().map(|(action, w)| (action.to_string(), w)).collect())
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Save / restore
    // ------------------------------------------------------------------

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
