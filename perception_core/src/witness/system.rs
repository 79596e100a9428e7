use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, trace};
use world_model::EntityId;

use super::{
    ActionWitnessed, ChangeKind, Confidence, EntityKnowledge, KnowledgeStore, MovementRecord,
    MovementWitnessed, PerceivedIdentity, StateChange, WitnessDetail, WitnessEvent, WitnessLevel,
    WitnessRecord,
};
use crate::config::PerceptionConfig;
use crate::scope::{ScopeResolver, SenseType};

/// Outcome of recording one change: who witnessed it, and what to narrate.
#[derive(Debug, Clone, PartialEq)]
pub struct WitnessReport {
    pub record: WitnessRecord,
    pub events: Vec<WitnessEvent>,
}

/// Decides who perceived each change and owns every actor's knowledge.
#[derive(Debug, Clone, Default)]
pub struct WitnessSystem {
    knowledge: KnowledgeStore,
    config: PerceptionConfig,
}

impl WitnessSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PerceptionConfig) -> Self {
        Self {
            knowledge: KnowledgeStore::new(),
            config,
        }
    }

    /// Resume from previously saved knowledge.
    pub fn restore(knowledge: KnowledgeStore, config: PerceptionConfig) -> Self {
        Self { knowledge, config }
    }

    pub fn config(&self) -> &PerceptionConfig {
        &self.config
    }

    /// Work out which actors perceived `change`, update their knowledge, and
    /// return the record along with the events to narrate.
    ///
    /// The actor who caused the change and the changed entity itself are
    /// never witnesses.
    pub fn record_witnesses<R>(&mut self, resolver: &R, change: StateChange) -> WitnessReport
    where
        R: ScopeResolver + ?Sized,
    {
        let world = resolver.world();
        let mut witnesses = BTreeMap::new();

        if world.contains(change.entity_id) {
            for actor in world.actors() {
                if Some(actor) == change.actor_id || actor == change.entity_id {
                    continue;
                }
                if let Some(detail) = best_sense(resolver, actor, change.entity_id) {
                    trace!(witness = %actor, sense = ?detail.sense, level = ?detail.level, "witnessed");
                    witnesses.insert(actor, detail);
                }
            }
        } else {
            debug!(entity = %change.entity_id, "change to unknown entity has no witnesses");
        }

        debug!(
            kind = ?change.kind,
            entity = %change.entity_id,
            witnesses = witnesses.len(),
            "recorded witnesses"
        );

        let record = WitnessRecord { change, witnesses };
        let events = self.update_knowledge(&record);
        WitnessReport { record, events }
    }

    /// Fold a witness record into each witness's knowledge.
    ///
    /// Returns one event per witness for changes that have a narration form.
    pub fn update_knowledge(&mut self, record: &WitnessRecord) -> Vec<WitnessEvent> {
        let change = &record.change;
        let turn = change.timestamp;
        let mut events = Vec::new();

        for (&witness, detail) in &record.witnesses {
            match change.kind {
                ChangeKind::Move => {
                    let limit = self.config.movement_history_limit;
                    let knowledge =
                        self.knowledge
                            .get_or_discover(witness, change.entity_id, detail, turn);
                    if let Some(to) = change.to {
                        knowledge.last_known_location = Some(to);
                    }
                    if let (Some(from), Some(to)) = (change.from, change.to) {
                        knowledge.record_movement(
                            MovementRecord {
                                from,
                                to,
                                witnessed_at: turn,
                                witnessed_by: detail.sense,
                                confidence: detail.confidence,
                            },
                            limit,
                        );
                    }
                    knowledge.stamp(detail, turn);
                }
                ChangeKind::Create => {
                    let knowledge = self.knowledge.discover(witness, change.entity_id, detail, turn);
                    knowledge.last_known_location = change.to;
                    knowledge.stamp(detail, turn);
                }
                ChangeKind::Destroy => {
                    if let Some(knowledge) = self.knowledge.get_mut(witness, change.entity_id) {
                        knowledge.exists = false;
                        knowledge.stamp(detail, turn);
                    }
                }
                ChangeKind::Modify => {
                    let knowledge =
                        self.knowledge
                            .get_or_discover(witness, change.entity_id, detail, turn);
                    if detail.sense == SenseType::Sight {
                        if let Some(property) = &change.property {
                            let value = change.new_value.clone().unwrap_or(Value::Null);
                            knowledge.visual_properties.insert(property.clone(), value);
                        }
                    }
                    knowledge.stamp(detail, turn);
                }
                ChangeKind::Action => {
                    let participants = change
                        .actor_id
                        .filter(|actor| *actor != witness)
                        .into_iter()
                        .chain(change.target);
                    for entity in participants {
                        self.knowledge
                            .get_or_discover(witness, entity, detail, turn)
                            .stamp(detail, turn);
                    }
                }
            }

            if let Some(event) = witness_event(witness, detail, change) {
                events.push(event);
            }
        }

        events
    }

    /// Everything an actor has learned about.
    pub fn known_entities(&self, actor: EntityId) -> Vec<&EntityKnowledge> {
        self.knowledge.for_actor(actor).collect()
    }

    /// Whether the actor knows of the entity and believes it still exists.
    pub fn has_discovered(&self, actor: EntityId, entity: EntityId) -> bool {
        self.knowledge
            .get(actor, entity)
            .map(|k| k.exists)
            .unwrap_or(false)
    }

    pub fn knowledge(&self, actor: EntityId, entity: EntityId) -> Option<&EntityKnowledge> {
        self.knowledge.get(actor, entity)
    }

    pub fn knowledge_store(&self) -> &KnowledgeStore {
        &self.knowledge
    }

    /// Drop an actor's knowledge, e.g. when the actor leaves the world.
    pub fn forget_actor(&mut self, actor: EntityId) -> usize {
        let dropped = self.knowledge.forget_actor(actor);
        debug!(actor = %actor, dropped, "forgot actor knowledge");
        dropped
    }
}

/// The single best sense through which `actor` perceives `target`.
fn best_sense<R>(resolver: &R, actor: EntityId, target: EntityId) -> Option<WitnessDetail>
where
    R: ScopeResolver + ?Sized,
{
    if resolver.can_see(actor, target) {
        let level = if resolver.can_reach(actor, target) {
            WitnessLevel::Full
        } else {
            WitnessLevel::Partial
        };
        Some(WitnessDetail {
            sense: SenseType::Sight,
            level,
            confidence: Confidence::Certain,
        })
    } else if resolver.can_hear(actor, target) {
        Some(WitnessDetail {
            sense: SenseType::Hearing,
            level: WitnessLevel::Partial,
            confidence: Confidence::Likely,
        })
    } else if resolver.can_smell(actor, target) {
        Some(WitnessDetail {
            sense: SenseType::Smell,
            level: WitnessLevel::Partial,
            confidence: Confidence::Unsure,
        })
    } else {
        None
    }
}

fn witness_event(
    witness: EntityId,
    detail: &WitnessDetail,
    change: &StateChange,
) -> Option<WitnessEvent> {
    match change.kind {
        ChangeKind::Action => Some(WitnessEvent::Action(ActionWitnessed {
            witness_id: witness,
            sense: detail.sense,
            level: detail.level,
            action: change.action.clone().unwrap_or_default(),
            actor_id: change.actor_id,
            target_id: change.target,
            from_location: change.from,
            to_location: change.to,
            timestamp: change.timestamp,
        })),
        ChangeKind::Move => {
            // Only a close look tells what moved.
            let entity = if detail.level == WitnessLevel::Full {
                PerceivedIdentity::Known(change.entity_id)
            } else {
                PerceivedIdentity::Unknown
            };
            Some(WitnessEvent::Movement(MovementWitnessed {
                witness_id: witness,
                sense: detail.sense,
                level: detail.level,
                entity,
                from_location: change.from,
                to_location: change.to,
                direction: None,
                timestamp: change.timestamp,
            }))
        }
        ChangeKind::Create | ChangeKind::Destroy | ChangeKind::Modify => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::StandardScopeResolver;
    use serde_json::json;
    use world_model::{Entity, Trait, WorldModel};

    struct Scene {
        world: WorldModel,
        hall: EntityId,
        study: EntityId,
        player: EntityId,
        butler: EntityId,
    }

    /// Hall and study joined by a door, player and butler in the hall.
    fn scene(door_open: bool) -> Scene {
        let mut world = WorldModel::new();
        let hall = world.add_entity(Entity::new("Hall").with_trait(Trait::room()));
        let study = world.add_entity(Entity::new("Study").with_trait(Trait::room()));
        let door = world.add_entity(
            Entity::new("oak door")
                .with_trait(Trait::door(hall, study))
                .with_trait(Trait::Openable { open: door_open }),
        );
        world.move_entity(door, hall).unwrap();

        let player = world.add_entity(Entity::new("Player").with_trait(Trait::player()));
        let butler = world.add_entity(Entity::new("Butler").with_trait(Trait::actor()));
        world.move_entity(player, hall).unwrap();
        world.move_entity(butler, hall).unwrap();

        Scene {
            world,
            hall,
            study,
            player,
            butler,
        }
    }

    #[test]
    fn test_sight_in_same_room_is_full() {
        let mut sc = scene(false);
        let vase = sc.world.add_entity(Entity::new("vase"));
        sc.world.move_entity(vase, sc.hall).unwrap();

        let mut system = WitnessSystem::new();
        let resolver = StandardScopeResolver::with_defaults(&sc.world);
        let change = StateChange::modified(vase, "color", json!("blue")).at(3);
        let report = system.record_witnesses(&resolver, change);

        let detail = report.record.witnessed_by(sc.player).unwrap();
        assert_eq!(detail.sense, SenseType::Sight);
        assert_eq!(detail.level, WitnessLevel::Full);
        assert_eq!(detail.confidence, Confidence::Certain);
        assert!(report.events.is_empty());

        let knowledge = system.knowledge(sc.player, vase).unwrap();
        assert_eq!(knowledge.visual_properties.get("color"), Some(&json!("blue")));
        assert_eq!(knowledge.last_seen, Some(3));
        assert_eq!(knowledge.discovered_at, 3);
    }

    #[test]
    fn test_causer_does_not_witness() {
        let mut sc = scene(false);
        let cup = sc.world.add_entity(Entity::new("cup"));
        sc.world.move_entity(cup, sc.player).unwrap();

        let mut system = WitnessSystem::new();
        let resolver = StandardScopeResolver::with_defaults(&sc.world);
        let change = StateChange::moved(cup, Some(sc.hall), Some(sc.player)).by(sc.player);
        let report = system.record_witnesses(&resolver, change);

        assert!(report.record.witnessed_by(sc.player).is_none());
        assert!(report.record.witnessed_by(sc.butler).is_some());
        assert!(!system.has_discovered(sc.player, cup));
    }

    #[test]
    fn test_hearing_through_closed_door() {
        let mut sc = scene(false);
        let maid = sc.world.add_entity(Entity::new("Maid").with_trait(Trait::actor()));
        sc.world.move_entity(maid, sc.study).unwrap();

        let mut system = WitnessSystem::new();
        let resolver = StandardScopeResolver::with_defaults(&sc.world);
        let report = system.record_witnesses(&resolver, StateChange::action(maid, "sing").at(1));

        let detail = report.record.witnessed_by(sc.player).unwrap();
        assert_eq!(detail.sense, SenseType::Hearing);
        assert_eq!(detail.level, WitnessLevel::Partial);
        assert_eq!(detail.confidence, Confidence::Likely);
        assert_eq!(system.knowledge(sc.player, maid).unwrap().last_heard, Some(1));

        let event = report
            .events
            .iter()
            .find(|e| e.witness_id() == sc.player)
            .unwrap();
        assert_eq!(event.event_type(), "if.witness.action");
    }

    #[test]
    fn test_hidden_actor_witnesses_by_hearing() {
        let mut sc = scene(false);
        let wardrobe = sc.world.add_entity(
            Entity::new("wardrobe")
                .with_trait(Trait::container())
                .with_trait(Trait::Openable { open: false }),
        );
        sc.world.move_entity(wardrobe, sc.hall).unwrap();
        sc.world.move_entity(sc.player, wardrobe).unwrap();

        let mut system = WitnessSystem::new();
        let resolver = StandardScopeResolver::with_defaults(&sc.world);
        let whisper = StateChange::action(sc.butler, "whisper").at(4);
        let report = system.record_witnesses(&resolver, whisper);

        let detail = report.record.witnessed_by(sc.player).unwrap();
        assert_eq!(detail.sense, SenseType::Hearing);
        assert_eq!(detail.confidence, Confidence::Likely);
        assert_eq!(system.knowledge(sc.player, sc.butler).unwrap().last_heard, Some(4));
    }

    #[test]
    fn test_smell_only_witness() {
        let mut sc = scene(false);
        let chest = sc.world.add_entity(
            Entity::new("chest")
                .with_trait(Trait::container())
                .with_trait(Trait::Openable { open: false }),
        );
        sc.world.move_entity(chest, sc.hall).unwrap();
        let cheese = sc
            .world
            .add_entity(Entity::new("cheese").with_trait(Trait::Scented { strong: true }));
        sc.world.move_entity(cheese, chest).unwrap();

        let mut system = WitnessSystem::new();
        let resolver = StandardScopeResolver::with_defaults(&sc.world);
        let ripen = StateChange::modified(cheese, "color", json!("blue")).at(6);
        let report = system.record_witnesses(&resolver, ripen);

        let detail = report.record.witnessed_by(sc.player).unwrap();
        assert_eq!(detail.sense, SenseType::Smell);
        assert_eq!(detail.level, WitnessLevel::Partial);
        assert_eq!(detail.confidence, Confidence::Unsure);

        let knowledge = system.knowledge(sc.player, cheese).unwrap();
        assert_eq!(knowledge.discovered_by, SenseType::Smell);
        assert_eq!(knowledge.last_smelled, Some(6));
        assert!(knowledge.visual_properties.is_empty());
    }

    #[test]
    fn test_heard_modification_leaves_visual_properties() {
        let mut sc = scene(false);
        let maid = sc.world.add_entity(Entity::new("Maid").with_trait(Trait::actor()));
        sc.world.move_entity(maid, sc.study).unwrap();

        let mut system = WitnessSystem::new();
        let resolver = StandardScopeResolver::with_defaults(&sc.world);
        let change = StateChange::modified(maid, "mood", json!("angry")).at(2);
        let report = system.record_witnesses(&resolver, change);

        assert_eq!(
            report.record.witnessed_by(sc.player).unwrap().sense,
            SenseType::Hearing
        );
        let knowledge = system.knowledge(sc.player, maid).unwrap();
        assert_eq!(knowledge.last_heard, Some(2));
        assert!(knowledge.visual_properties.is_empty());
    }

    #[test]
    fn test_distant_movement_is_redacted() {
        let mut sc = scene(true);
        let cat = sc.world.add_entity(Entity::new("cat"));
        sc.world.move_entity(cat, sc.study).unwrap();

        let mut system = WitnessSystem::new();
        let resolver = StandardScopeResolver::with_defaults(&sc.world);
        let change = StateChange::moved(cat, Some(sc.hall), Some(sc.study)).at(2);
        let report = system.record_witnesses(&resolver, change);

        let detail = report.record.witnessed_by(sc.player).unwrap();
        assert_eq!(detail.sense, SenseType::Sight);
        assert_eq!(detail.level, WitnessLevel::Partial);

        match report.events.iter().find(|e| e.witness_id() == sc.player) {
            Some(WitnessEvent::Movement(moved)) => {
                assert_eq!(moved.entity, PerceivedIdentity::Unknown);
                assert_eq!(moved.to_location, Some(sc.study));
            }
            other => panic!("expected movement event, got {:?}", other),
        }

        // Knowledge is still recorded, only the narration is redacted.
        let knowledge = system.knowledge(sc.player, cat).unwrap();
        assert_eq!(knowledge.last_known_location, Some(sc.study));
        assert_eq!(knowledge.movement_history.len(), 1);
    }

    #[test]
    fn test_destroy_needs_prior_knowledge() {
        let mut sc = scene(false);
        let note = sc.world.add_entity(Entity::new("note"));
        sc.world.move_entity(note, sc.hall).unwrap();

        let mut system = WitnessSystem::new();
        {
            let resolver = StandardScopeResolver::with_defaults(&sc.world);
            system.record_witnesses(&resolver, StateChange::destroyed(note).by(sc.butler));
        }
        assert!(system.knowledge(sc.player, note).is_none());

        {
            let resolver = StandardScopeResolver::with_defaults(&sc.world);
            system.record_witnesses(&resolver, StateChange::created(note).at(1));
            assert!(system.has_discovered(sc.player, note));
            system.record_witnesses(&resolver, StateChange::destroyed(note).by(sc.butler).at(2));
        }
        let knowledge = system.knowledge(sc.player, note).unwrap();
        assert!(!knowledge.exists);
        assert_eq!(knowledge.last_seen, Some(2));
        assert!(!system.has_discovered(sc.player, note));
    }

    #[test]
    fn test_unknown_entity_has_no_witnesses() {
        let sc = scene(true);
        let mut system = WitnessSystem::new();
        let resolver = StandardScopeResolver::with_defaults(&sc.world);
        let report = system.record_witnesses(&resolver, StateChange::created(EntityId::new()));

        assert!(report.record.is_empty());
        assert!(report.events.is_empty());
        assert!(system.knowledge_store().is_empty());
    }

    #[test]
    fn test_action_records_participants() {
        let mut sc = scene(false);
        let bell = sc.world.add_entity(Entity::new("bell").with_trait(Trait::Loud));
        sc.world.move_entity(bell, sc.hall).unwrap();

        let mut system = WitnessSystem::new();
        let resolver = StandardScopeResolver::with_defaults(&sc.world);
        let ring = StateChange::action(sc.butler, "ring").with_target(bell).at(5);
        let report = system.record_witnesses(&resolver, ring);

        assert_eq!(report.record.witnesses.len(), 1);
        assert!(system.has_discovered(sc.player, sc.butler));
        assert!(system.has_discovered(sc.player, bell));
        assert_eq!(system.known_entities(sc.player).len(), 2);
        assert!(system.known_entities(sc.butler).is_empty());
    }

    #[test]
    fn test_history_limit_from_config() {
        let mut sc = scene(false);
        let ball = sc.world.add_entity(Entity::new("ball"));
        sc.world.move_entity(ball, sc.hall).unwrap();
        let crate_ = sc.world.add_entity(Entity::new("crate").with_trait(Trait::Supporter));
        sc.world.move_entity(crate_, sc.hall).unwrap();

        let mut system = WitnessSystem::with_config(PerceptionConfig {
            movement_history_limit: 2,
            ..PerceptionConfig::default()
        });
        let resolver = StandardScopeResolver::with_defaults(&sc.world);
        for turn in 0..5 {
            let change = StateChange::moved(ball, Some(sc.hall), Some(crate_)).at(turn);
            system.record_witnesses(&resolver, change);
        }

        let knowledge = system.knowledge(sc.player, ball).unwrap();
        assert_eq!(knowledge.movement_history.len(), 2);
        assert_eq!(knowledge.movement_history[0].witnessed_at, 3);
    }

    #[test]
    fn test_forget_actor() {
        let mut sc = scene(false);
        let vase = sc.world.add_entity(Entity::new("vase"));
        sc.world.move_entity(vase, sc.hall).unwrap();

        let mut system = WitnessSystem::new();
        let resolver = StandardScopeResolver::with_defaults(&sc.world);
        system.record_witnesses(&resolver, StateChange::created(vase));

        assert_eq!(system.forget_actor(sc.butler), 1);
        assert!(system.knowledge(sc.butler, vase).is_none());
        assert!(system.knowledge(sc.player, vase).is_some());
    }
}
