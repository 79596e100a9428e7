//! Scope resolution - what an actor can perceive, and through which sense.
//!
//! Every sense is its own predicate. The aggregate [`ScopeLevel`] is the
//! strongest level any of them reaches, raised by author-declared minimum
//! scopes. Sight is never derived from the aggregate: an actor can hear
//! someone through a door without seeing them.

mod resolver;

pub use resolver::*;

use serde::{Deserialize, Serialize};
use world_model::{EntityId, ScopeLevel, WorldModel};

/// The senses through which an entity can be perceived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SenseType {
    /// Blocked by closed opaque containers; needs light.
    Sight,
    /// Crosses doors whether open or closed.
    Hearing,
    /// Needs a scented source and an open air path.
    Smell,
    /// Needs reachability.
    Touch,
    /// Extrasensory, game-specific.
    Vibe,
}

/// Perception queries over the containment graph.
///
/// Implementors supply the per-sense predicates; aggregation and
/// enumeration are derived from them, so overriding one predicate changes
/// everything built on it.
pub trait ScopeResolver {
    /// The world being queried.
    fn world(&self) -> &WorldModel;

    fn can_see(&self, actor: EntityId, target: EntityId) -> bool;

    fn can_reach(&self, actor: EntityId, target: EntityId) -> bool;

    fn can_hear(&self, actor: EntityId, target: EntityId) -> bool;

    fn can_smell(&self, actor: EntityId, target: EntityId) -> bool;

    /// Extrasensory perception. Nothing is sensed this way unless a game says so.
    fn can_vibe(&self, _actor: EntityId, _target: EntityId) -> bool {
        false
    }

    /// The author-declared floor for `target` as seen from wherever `actor` is.
    fn minimum_scope(&self, actor: EntityId, target: EntityId) -> ScopeLevel {
        let world = self.world();
        let path = world.ancestors(actor).unwrap_or_default();
        world.minimum_scope_for(target, &path)
    }

    /// Whether the actor is directly holding the target.
    fn is_carried(&self, actor: EntityId, target: EntityId) -> bool {
        self.world().location(target) == Some(actor)
    }

    fn can_sense(&self, actor: EntityId, target: EntityId, sense: SenseType) -> bool {
        match sense {
            SenseType::Sight => self.can_see(actor, target),
            SenseType::Hearing => self.can_hear(actor, target),
            SenseType::Smell => self.can_smell(actor, target),
            SenseType::Touch => self.can_reach(actor, target),
            SenseType::Vibe => self.can_vibe(actor, target),
        }
    }

    /// Strongest level reachable through the senses alone, ignoring overrides.
    fn physical_scope(&self, actor: EntityId, target: EntityId) -> ScopeLevel {
        if self.is_carried(actor, target) {
            ScopeLevel::Carried
        } else if self.can_reach(actor, target) {
            ScopeLevel::Reachable
        } else if self.can_see(actor, target) {
            ScopeLevel::Visible
        } else if self.can_hear(actor, target) {
            ScopeLevel::Audible
        } else if self.can_smell(actor, target) {
            ScopeLevel::Detectable
        } else {
            ScopeLevel::Unaware
        }
    }

    /// Highest scope level of `target` for `actor`.
    ///
    /// Overrides combine by `max`, so they never lower the physical level.
    fn get_scope(&self, actor: EntityId, target: EntityId) -> ScopeLevel {
        self.physical_scope(actor, target)
            .max(self.minimum_scope(actor, target))
    }

    /// Everything the actor can see, including entities granted sight by an override.
    fn get_visible(&self, actor: EntityId) -> Vec<EntityId> {
        other_entities(self.world(), actor)
            .filter(|id| {
                self.can_see(actor, *id) || self.minimum_scope(actor, *id) >= ScopeLevel::Visible
            })
            .collect()
    }

    /// Everything the actor can reach, including entities granted reach by an override.
    fn get_reachable(&self, actor: EntityId) -> Vec<EntityId> {
        other_entities(self.world(), actor)
            .filter(|id| {
                self.can_reach(actor, *id)
                    || self.minimum_scope(actor, *id) >= ScopeLevel::Reachable
            })
            .collect()
    }

    /// Everything the actor can hear, including entities granted hearing by an override.
    fn get_audible(&self, actor: EntityId) -> Vec<EntityId> {
        other_entities(self.world(), actor)
            .filter(|id| {
                self.can_hear(actor, *id) || self.minimum_scope(actor, *id) >= ScopeLevel::Audible
            })
            .collect()
    }

    /// Every other entity whose aggregate scope is at least `minimum`.
    fn in_scope(&self, actor: EntityId, minimum: ScopeLevel) -> Vec<EntityId> {
        other_entities(self.world(), actor)
            .filter(|id| self.get_scope(actor, *id) >= minimum)
            .collect()
    }

    /// Keep only the candidates an action requiring `minimum` may refer to.
    fn filter_by_scope(
        &self,
        actor: EntityId,
        candidates: &[EntityId],
        minimum: ScopeLevel,
    ) -> Vec<EntityId> {
        candidates
            .iter()
            .copied()
            .filter(|id| self.get_scope(actor, *id) >= minimum)
            .collect()
    }
}

/// Every entity in the world except the actor.
fn other_entities(world: &WorldModel, actor: EntityId) -> impl Iterator<Item = EntityId> + '_ {
    world
        .entities()
        .map(|e| e.id)
        .filter(move |id| *id != actor)
}
