//! The standard scope resolver for interactive-fiction worlds.

use tracing::debug;
use world_model::{Entity, EntityId, ScopeLevel, WorldModel};

use super::ScopeResolver;
use crate::config::PerceptionConfig;

/// Which kind of perception a container boundary is being crossed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Crossing {
    Sight,
    Reach,
    Sound,
    Scent,
}

/// Where an entity sits: its room, and the containers between it and the room.
#[derive(Debug)]
struct Placement {
    room: EntityId,
    /// Containers below the room, innermost first.
    chain: Vec<EntityId>,
}

/// Scope resolution following IF conventions and physical rules:
/// closed containers, darkness, and doors between rooms.
///
/// Borrows the world immutably, so every query is a pure function of the
/// current graph and override tables.
pub struct StandardScopeResolver<'w> {
    world: &'w WorldModel,
    config: PerceptionConfig,
}

impl<'w> StandardScopeResolver<'w> {
    /// Create a resolver with the given configuration.
    pub fn new(world: &'w WorldModel, config: PerceptionConfig) -> Self {
        Self { world, config }
    }

    /// Create a resolver with default configuration.
    pub fn with_defaults(world: &'w WorldModel) -> Self {
        Self::new(world, PerceptionConfig::default())
    }

    pub fn config(&self) -> &PerceptionConfig {
        &self.config
    }

    fn ancestors(&self, id: EntityId) -> Option<Vec<EntityId>> {
        self.world
            .ancestors_bounded(id, self.config.max_containment_depth)
            .ok()
    }

    /// Resolve where an entity sits. Unplaced, roomless and cyclic
    /// placements all resolve to `None`.
    fn placement(&self, id: EntityId) -> Option<Placement> {
        let ancestors = self.ancestors(id)?;
        let room_index = ancestors
            .iter()
            .position(|a| self.world.entity(*a).is_some_and(Entity::is_room))?;
        Some(Placement {
            room: ancestors[room_index],
            chain: ancestors[..room_index].to_vec(),
        })
    }

    fn blocks(&self, container: EntityId, crossing: Crossing) -> bool {
        let Some(entity) = self.world.entity(container) else {
            return true;
        };
        // What an actor carries is never shut away from view or reach.
        if entity.is_actor() {
            return false;
        }
        match crossing {
            Crossing::Sight => entity.is_closed() && !entity.is_transparent(),
            Crossing::Reach | Crossing::Sound | Crossing::Scent => entity.is_closed(),
        }
    }

    /// Whether any container boundary between actor and target blocks the crossing.
    ///
    /// Containers holding both of them are not boundaries, so two entities
    /// shut in the same box still perceive each other. Sound and scent only
    /// have to get out of the target's containers: a listener shut in a
    /// wardrobe still hears the room.
    fn crosses_barrier(
        &self,
        actor: &Placement,
        target: &Placement,
        target_id: EntityId,
        crossing: Crossing,
    ) -> bool {
        let same_room = actor.room == target.room;
        let shared = |id: &EntityId, other: &[EntityId]| same_room && other.contains(id);

        let target_side = target
            .chain
            .iter()
            .filter(|c| !shared(c, &actor.chain));
        let actor_enclosed = matches!(crossing, Crossing::Sight | Crossing::Reach);
        let actor_side = actor
            .chain
            .iter()
            .filter(|_| actor_enclosed)
            .filter(|c| **c != target_id && !shared(c, &target.chain));

        target_side
            .chain(actor_side)
            .any(|c| self.blocks(*c, crossing))
    }

    /// Openness of the connection between two rooms: `None` when no door
    /// joins them, otherwise whether any joining door is open.
    fn door_between(&self, room_a: EntityId, room_b: EntityId) -> Option<bool> {
        let doors = self.world.doors_between(room_a, room_b);
        if doors.is_empty() {
            return None;
        }
        // A door that cannot be closed is always open.
        Some(doors.iter().any(|door| door.is_open().unwrap_or(true)))
    }

    fn carries_light(&self, holder: EntityId) -> bool {
        self.world.entity(holder).is_some_and(Entity::emits_light)
            || self
                .world
                .contents(holder)
                .into_iter()
                .any(|item| self.world.entity(item).is_some_and(Entity::emits_light))
    }

    /// Whether there is light to see `target` by in `room`.
    fn is_lit(&self, room: EntityId, actor: EntityId, target: EntityId) -> bool {
        let Some(room_entity) = self.world.entity(room) else {
            return false;
        };
        if !room_entity.is_dark() {
            return true;
        }
        if self.carries_light(actor) || self.carries_light(target) {
            return true;
        }

        // Any lit source in the room that is not sealed in an opaque container.
        self.world
            .entities()
            .filter(|e| e.emits_light())
            .filter_map(|e| self.placement(e.id))
            .any(|p| {
                p.room == room && !p.chain.iter().any(|c| self.blocks(*c, Crossing::Sight))
            })
    }
}

impl ScopeResolver for StandardScopeResolver<'_> {
    fn world(&self) -> &WorldModel {
        self.world
    }

    fn can_see(&self, actor: EntityId, target: EntityId) -> bool {
        let Some(target_entity) = self.world.entity(target) else {
            return false;
        };
        if target_entity.is_hidden() {
            return false;
        }
        let (Some(actor_at), Some(target_at)) = (self.placement(actor), self.placement(target))
        else {
            return false;
        };

        if actor_at.room != target_at.room {
            // Sight carries one hop, through an open door only.
            if self.door_between(actor_at.room, target_at.room) != Some(true) {
                return false;
            }
        }
        if !self.is_lit(target_at.room, actor, target) {
            return false;
        }

        !self.crosses_barrier(&actor_at, &target_at, target, Crossing::Sight)
    }

    fn can_reach(&self, actor: EntityId, target: EntityId) -> bool {
        if self.is_carried(actor, target) {
            return true;
        }
        if !self.can_see(actor, target) {
            return false;
        }
        let (Some(actor_at), Some(target_at)) = (self.placement(actor), self.placement(target))
        else {
            return false;
        };
        if actor_at.room != target_at.room {
            return false;
        }

        !self.crosses_barrier(&actor_at, &target_at, target, Crossing::Reach)
    }

    fn can_hear(&self, actor: EntityId, target: EntityId) -> bool {
        let Some(target_entity) = self.world.entity(target) else {
            return false;
        };
        let (Some(actor_at), Some(target_at)) = (self.placement(actor), self.placement(target))
        else {
            return false;
        };

        // Closed doors muffle sound but do not stop it.
        if actor_at.room != target_at.room
            && self.door_between(actor_at.room, target_at.room).is_none()
        {
            return false;
        }

        target_entity.is_loud()
            || !self.crosses_barrier(&actor_at, &target_at, target, Crossing::Sound)
    }

    fn can_smell(&self, actor: EntityId, target: EntityId) -> bool {
        let Some(target_entity) = self.world.entity(target) else {
            return false;
        };
        if !target_entity.has_scent() {
            return false;
        }
        let (Some(actor_at), Some(target_at)) = (self.placement(actor), self.placement(target))
        else {
            return false;
        };

        if actor_at.room != target_at.room
            && self.door_between(actor_at.room, target_at.room) != Some(true)
        {
            return false;
        }

        target_entity.has_strong_scent()
            || !self.crosses_barrier(&actor_at, &target_at, target, Crossing::Scent)
    }

    fn minimum_scope(&self, actor: EntityId, target: EntityId) -> ScopeLevel {
        let path = self.ancestors(actor).unwrap_or_default();
        let floor = self.world.minimum_scope_for(target, &path);
        if floor.is_in_scope() {
            debug!(%actor, %target, %floor, "minimum scope override applies");
        }
        floor
    }
}
