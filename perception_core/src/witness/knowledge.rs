//! Knowledge records - what each actor believes about each entity.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap, VecDeque};
use world_model::EntityId;

use super::{Confidence, WitnessDetail};
use crate::scope::SenseType;

/// One witnessed move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementRecord {
    pub from: EntityId,
    pub to: EntityId,
    pub witnessed_at: u64,
    pub witnessed_by: SenseType,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScentStrength {
    Faint,
    Moderate,
    Strong,
}

/// An actor's belief state about one entity, built only from what they witnessed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityKnowledge {
    /// Whose belief this is.
    pub actor_id: EntityId,
    pub entity_id: EntityId,

    /// False once the actor witnessed it being destroyed.
    pub exists: bool,

    pub last_known_location: Option<EntityId>,

    pub last_seen: Option<u64>,
    pub last_heard: Option<u64>,
    pub last_smelled: Option<u64>,
    pub scent_strength: Option<ScentStrength>,

    /// Most recent moves, oldest first.
    #[serde(default)]
    pub movement_history: VecDeque<MovementRecord>,

    /// Property values last seen with the actor's own eyes.
    #[serde(default)]
    pub visual_properties: HashMap<String, Value>,

    pub discovered_at: u64,
    pub discovered_by: SenseType,
}

impl EntityKnowledge {
    /// A fresh record for an entity first perceived through `sense` at `turn`.
    pub fn discovered(actor_id: EntityId, entity_id: EntityId, sense: SenseType, turn: u64) -> Self {
        Self {
            actor_id,
            entity_id,
            exists: true,
            last_known_location: None,
            last_seen: None,
            last_heard: None,
            last_smelled: None,
            scent_strength: None,
            movement_history: VecDeque::new(),
            visual_properties: HashMap::new(),
            discovered_at: turn,
            discovered_by: sense,
        }
    }

    /// Stamp the last-perceived time for the sense that was used.
    pub fn stamp(&mut self, detail: &WitnessDetail, turn: u64) {
        match detail.sense {
            SenseType::Sight => self.last_seen = Some(turn),
            SenseType::Hearing => self.last_heard = Some(turn),
            SenseType::Smell => {
                self.last_smelled = Some(turn);
                // TODO: scale with distance once witness levels model it
                self.scent_strength = Some(ScentStrength::Moderate);
            }
            SenseType::Touch | SenseType::Vibe => {}
        }
    }

    /// Append a move, dropping the oldest beyond `limit`.
    pub fn record_movement(&mut self, record: MovementRecord, limit: usize) {
        self.movement_history.push_back(record);
        while self.movement_history.len() > limit {
            self.movement_history.pop_front();
        }
    }

    /// The most recently perceived time through any sense.
    pub fn last_perceived(&self) -> Option<u64> {
        [self.last_seen, self.last_heard, self.last_smelled]
            .into_iter()
            .flatten()
            .max()
    }
}

/// Every actor's knowledge, in one arena keyed by `(actor, entity)`.
///
/// Keys are ordered by actor first, so one actor's records are a contiguous
/// range. Serializes as a flat list of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<EntityKnowledge>", into = "Vec<EntityKnowledge>")]
pub struct KnowledgeStore {
    records: BTreeMap<(EntityId, EntityId), EntityKnowledge>,
}

impl KnowledgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, actor: EntityId, entity: EntityId) -> Option<&EntityKnowledge> {
        self.records.get(&(actor, entity))
    }

    pub fn get_mut(&mut self, actor: EntityId, entity: EntityId) -> Option<&mut EntityKnowledge> {
        self.records.get_mut(&(actor, entity))
    }

    pub fn contains(&self, actor: EntityId, entity: EntityId) -> bool {
        self.records.contains_key(&(actor, entity))
    }

    /// The actor's record for the entity, created from `detail` if absent.
    pub fn get_or_discover(
        &mut self,
        actor: EntityId,
        entity: EntityId,
        detail: &WitnessDetail,
        turn: u64,
    ) -> &mut EntityKnowledge {
        self.records
            .entry((actor, entity))
            .or_insert_with(|| EntityKnowledge::discovered(actor, entity, detail.sense, turn))
    }

    /// Replace any existing record with a fresh discovery.
    pub fn discover(
        &mut self,
        actor: EntityId,
        entity: EntityId,
        detail: &WitnessDetail,
        turn: u64,
    ) -> &mut EntityKnowledge {
        let fresh = EntityKnowledge::discovered(actor, entity, detail.sense, turn);
        match self.records.entry((actor, entity)) {
            Entry::Occupied(mut slot) => {
                slot.insert(fresh);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(fresh),
        }
    }

    /// Every record belonging to one actor.
    pub fn for_actor(&self, actor: EntityId) -> impl Iterator<Item = &EntityKnowledge> {
        self.records
            .range((actor, EntityId::nil())..)
            .take_while(move |((owner, _), _)| *owner == actor)
            .map(|(_, knowledge)| knowledge)
    }

    /// Drop everything an actor knows.
    pub fn forget_actor(&mut self, actor: EntityId) -> usize {
        let before = self.records.len();
        self.records.retain(|(owner, _), _| *owner != actor);
        before - self.records.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<EntityKnowledge>> for KnowledgeStore {
    fn from(records: Vec<EntityKnowledge>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|k| ((k.actor_id, k.entity_id), k))
                .collect(),
        }
    }
}

impl From<KnowledgeStore> for Vec<EntityKnowledge> {
    fn from(store: KnowledgeStore) -> Self {
        store.records.into_values().collect()
    }
}
