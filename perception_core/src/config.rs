//! Configuration for scope resolution and witness tracking.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Limits applied while resolving scope and recording knowledge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Maximum number of parents followed when walking containment.
    /// Deeper (or cyclic) placement resolves as out of scope.
    pub max_containment_depth: usize,

    /// Movement records kept per known entity; the oldest are dropped first.
    pub movement_history_limit: usize,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            max_containment_depth: world_model::MAX_CONTAINMENT_DEPTH,
            movement_history_limit: 10,
        }
    }
}

impl PerceptionConfig {
    /// Parse a config from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}
