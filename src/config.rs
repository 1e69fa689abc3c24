//! Tunable game settings.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::constants::*;
use crate::state::KeyValueStore;

/// Settings shared by the engine, the persistence defaults and the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Balance for a fresh save.
    pub starting_balance: u64,
    /// Purchase price for a fresh save.
    pub starting_price: u64,
    /// Added to the purchase price after every successful purchase.
    pub price_step: u64,
    /// Price of each elemental stone.
    pub stone_price: u64,
    /// Currency credited per income tick.
    pub income_amount: u64,
    pub spawn_interval_ms: u32,
    pub income_interval_ms: u32,
    /// Period of the browser interval that feeds the scheduler.
    pub scheduler_resolution_ms: u32,
    /// Spawn power used when the catalog is unavailable or lacks the monster.
    pub fallback_power: u64,
    pub monster_size: f64,
    /// Cosmetic placement bounds (canvas size in CSS pixels).
    pub field_width: f64,
    pub field_height: f64,
    pub data_url: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_balance: STARTING_BALANCE,
            starting_price: STARTING_PRICE,
            price_step: PRICE_STEP,
            stone_price: STONE_PRICE,
            income_amount: INCOME_AMOUNT,
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            income_interval_ms: INCOME_INTERVAL_MS,
            scheduler_resolution_ms: SCHEDULER_RESOLUTION_MS,
            fallback_power: FALLBACK_POWER,
            monster_size: MONSTER_SIZE,
            field_width: DEFAULT_FIELD_WIDTH,
            field_height: DEFAULT_FIELD_HEIGHT,
            data_url: DATA_URL.to_string(),
        }
    }
}

impl GameConfig {
    /// Parse overrides from JSON; missing fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Defaults, overridden by the JSON object under the `settings` key if one is stored.
    pub fn from_store(store: &impl KeyValueStore) -> Self {
        let Some(raw) = store.get(KEY_SETTINGS) else {
            return Self::default();
        };
        match Self::from_json(&raw) {
            Ok(cfg) => {
                info!("using stored settings overrides");
                cfg
            }
            Err(e) => {
                warn!(error = %e, "ignoring unreadable settings");
                Self::default()
            }
        }
    }

    pub fn with_field(mut self, width: f64, height: f64) -> Self {
        self.field_width = width.max(0.0);
        self.field_height = height.max(0.0);
        self
    }

    /// Largest x/y a monster's top-left corner may take.
    pub fn placement_bounds(&self) -> (f64, f64) {
        (
            (self.field_width - self.monster_size).max(0.0),
            (self.field_height - self.monster_size).max(0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryStore;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let cfg = GameConfig::from_json(r#"{"price_step": 75}"#).unwrap();
        assert_eq!(cfg.price_step, 75);
        assert_eq!(cfg.starting_price, STARTING_PRICE);
        assert_eq!(cfg.spawn_interval_ms, SPAWN_INTERVAL_MS);
    }

    #[test]
    fn test_from_store_reads_overrides() {
        let store = MemoryStore::with_items([(KEY_SETTINGS, r#"{"income_amount": 25}"#)]);
        let cfg = GameConfig::from_store(&store);
        assert_eq!(cfg.income_amount, 25);
        assert_eq!(cfg.stone_price, STONE_PRICE);
    }

    #[test]
    fn test_from_store_ignores_garbage() {
        let store = MemoryStore::with_items([(KEY_SETTINGS, "[1,2")]);
        assert_eq!(GameConfig::from_store(&store), GameConfig::default());
        assert_eq!(GameConfig::from_store(&MemoryStore::new()), GameConfig::default());
    }

    #[test]
    fn test_placement_bounds_never_negative() {
        let cfg = GameConfig::default().with_field(40.0, 100.0);
        assert_eq!(cfg.placement_bounds(), (0.0, 40.0));
    }
}
