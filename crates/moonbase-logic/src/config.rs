//! Economy configuration: delivery cadence, starting stocks and conversion rates.
//!
//! `SimConfig::default()` carries the canonical game balance. A JSON file may
//! override any subset of fields; absent fields keep their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::resources::ResourceKind;

/// Tunable economy parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Days between resupply deliveries.
    pub delivery_interval: i32,
    /// Stock seeded into each ledger row on colonization, in ledger order.
    pub starting_stock: [i64; ResourceKind::COUNT],
    /// Power spent per kg of electrolysed oxygen (numerator, divided by 1000).
    pub power_per_kg_oxygen: i64,
    /// Water spent per kg of electrolysed oxygen.
    pub water_per_kg_oxygen: f64,
    /// Power-link upkeep is `distance * numerator / denominator`.
    pub link_upkeep_numerator: i64,
    pub link_upkeep_denominator: i64,
    /// Normaliser for the resource sufficiency score.
    pub mass: i64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            delivery_interval: 30,
            starting_stock: [600, 0, 450, 0, 0, 0, 0, 250_000],
            power_per_kg_oxygen: 5250,
            water_per_kg_oxygen: 8.0 / 9.0,
            link_upkeep_numerator: 12,
            link_upkeep_denominator: 10_000,
            mass: 10_000_000,
        }
    }
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        let config: SimConfig = serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidInput(format!("config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| EngineError::InvalidInput(format!("config: {e}")))?;
        Self::from_json_str(&text)
    }

    pub fn starting_stock(&self, kind: ResourceKind) -> i64 {
        self.starting_stock[kind.index()]
    }

    /// Upkeep charged against power for a summed power-link distance.
    pub fn link_upkeep(&self, total_distance: i64) -> i64 {
        total_distance * self.link_upkeep_numerator / self.link_upkeep_denominator
    }

    fn validate(&self) -> EngineResult<()> {
        if self.delivery_interval < 1 {
            return Err(EngineError::InvalidInput(
                "config: delivery_interval must be at least 1".into(),
            ));
        }
        if self.link_upkeep_denominator == 0 || self.mass == 0 {
            return Err(EngineError::InvalidInput(
                "config: divisors must be non-zero".into(),
            ));
        }
        Ok(())
    }
}
