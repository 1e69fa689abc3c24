// Persistence of the save aggregate over a string key-value store (browser localStorage).
use std::cell::RefCell;
use std::collections::HashMap;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::GameConfig;
use crate::constants::*;
use crate::error::StoreError;
use crate::model::{EconomyState, GameState};
use crate::state::SlotGrid;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// `window.localStorage`.
pub struct LocalStore {
    storage: web_sys::Storage,
}

impl LocalStore {
    pub fn open() -> Result<Self, StoreError> {
        let storage = web_sys::window()
            .and_then(|win| win.local_storage().ok().flatten())
            .ok_or(StoreError::Unavailable)?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage
            .set_item(key, value)
            .map_err(|_| StoreError::Write(key.to_string()))
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.storage
            .clear()
            .map_err(|_| StoreError::Write("*".to_string()))
    }
}

/// In-process store; used when localStorage is unavailable and in tests.
#[derive(Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_items<'a>(items: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        store.items.borrow_mut().extend(
            items
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        store
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.items.borrow_mut().clear();
        Ok(())
    }
}

/// Reads and writes `GameState` as three keys: `balance`, `slots`, `nextPrice`.
///
/// Saves written by the first release used `coins`, `frames` and `winPrice`; those
/// are read when the current keys are missing.
pub struct SaveStore<S: KeyValueStore> {
    backend: S,
}

impl<S: KeyValueStore> SaveStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    #[cfg(test)]
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Never fails: every missing or unreadable key falls back to its default.
    pub fn load(&self, config: &GameConfig) -> GameState {
        let defaults = GameState::new(config);
        let balance = self
            .read::<u64>(KEY_BALANCE, LEGACY_KEY_BALANCE)
            .unwrap_or(defaults.economy.balance);
        let next_price = self
            .read::<u64>(KEY_NEXT_PRICE, LEGACY_KEY_NEXT_PRICE)
            .filter(|p| *p > 0)
            .unwrap_or(defaults.economy.next_price);
        let grid = self
            .read::<SlotGrid>(KEY_SLOTS, LEGACY_KEY_SLOTS)
            .unwrap_or(defaults.grid);
        GameState {
            economy: EconomyState {
                balance,
                next_price,
            },
            grid,
        }
    }

    pub fn save(&self, state: &GameState) -> Result<(), StoreError> {
        let slots = serde_json::to_string(&state.grid).map_err(|source| StoreError::Serialize {
            key: KEY_SLOTS,
            source,
        })?;
        self.backend
            .set(KEY_BALANCE, &state.economy.balance.to_string())?;
        self.backend
            .set(KEY_NEXT_PRICE, &state.economy.next_price.to_string())?;
        self.backend.set(KEY_SLOTS, &slots)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.backend.clear()
    }

    fn read<T: DeserializeOwned>(&self, key: &str, legacy: &str) -> Option<T> {
        let (used, raw) = match self.backend.get(key) {
            Some(raw) => (key, raw),
            None => (legacy, self.backend.get(legacy)?),
        };
        match serde_json::from_str(&raw) {
            Ok(v) => {
                if used != key {
                    debug!(key, legacy = used, "read value from legacy key");
                }
                Some(v)
            }
            Err(e) => {
                warn!(key = used, error = %e, "ignoring unreadable saved value");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attribute, MonsterInstance};

    fn sample_state() -> GameState {
        let mut state = GameState::new(&GameConfig::default());
        state.economy.balance = 340;
        state.economy.next_price = 250;
        state
            .grid
            .set(
                4,
                Some(MonsterInstance {
                    x: 12.5,
                    y: 300.25,
                    power: 40,
                    texture: "images/taaka.png".into(),
                    attribute: Some(Attribute::Heaven),
                }),
            )
            .unwrap();
        state
    }

    #[test]
    fn test_empty_store_loads_defaults() {
        let store = SaveStore::new(MemoryStore::new());
        let state = store.load(&GameConfig::default());
        assert_eq!(state.economy.balance, 0);
        assert_eq!(state.economy.next_price, 100);
        assert_eq!(state.grid.count_occupied(), 0);
        assert_eq!(state.grid.len(), 12);
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let store = SaveStore::new(MemoryStore::new());
        let state = sample_state();
        store.save(&state).unwrap();
        assert_eq!(store.backend().len(), 3);
        assert_eq!(store.load(&GameConfig::default()), state);
    }

    #[test]
    fn test_corrupt_values_fall_back_individually() {
        let store = SaveStore::new(MemoryStore::with_items([
            (KEY_BALANCE, "75"),
            (KEY_SLOTS, "{not json"),
            (KEY_NEXT_PRICE, "-3"),
        ]));
        let state = store.load(&GameConfig::default());
        assert_eq!(state.economy.balance, 75);
        assert_eq!(state.economy.next_price, 100);
        assert_eq!(state.grid.count_occupied(), 0);
    }

    #[test]
    fn test_zero_price_is_replaced_by_default() {
        let store = SaveStore::new(MemoryStore::with_items([(KEY_NEXT_PRICE, "0")]));
        assert_eq!(store.load(&GameConfig::default()).economy.next_price, 100);
    }

    #[test]
    fn test_legacy_keys_are_read_when_current_missing() {
        let frames = r#"[{"x":3,"y":4,"image":{},"power":20,"texture":"images/uma.png","attribute":"火"},
            null,null,null,null,null,null,null,null,null,null,null]"#;
        let store = SaveStore::new(MemoryStore::with_items([
            (LEGACY_KEY_BALANCE, "120"),
            (LEGACY_KEY_SLOTS, frames),
            (LEGACY_KEY_NEXT_PRICE, "200"),
        ]));
        let state = store.load(&GameConfig::default());
        assert_eq!(state.economy.balance, 120);
        assert_eq!(state.economy.next_price, 200);
        let m = state.grid.occupant(0).unwrap();
        assert_eq!(m.power, 20);
        assert_eq!(m.attribute, Some(Attribute::Fire));
    }

    #[test]
    fn test_current_keys_win_over_legacy() {
        let store = SaveStore::new(MemoryStore::with_items([
            (LEGACY_KEY_BALANCE, "999"),
            (KEY_BALANCE, "5"),
        ]));
        assert_eq!(store.load(&GameConfig::default()).economy.balance, 5);
    }

    #[test]
    fn test_clear_forgets_everything() {
        let store = SaveStore::new(MemoryStore::new());
        store.save(&sample_state()).unwrap();
        store.clear().unwrap();
        assert_eq!(store.backend().len(), 0);
        assert_eq!(
            store.load(&GameConfig::default()),
            GameState::new(&GameConfig::default())
        );
    }
}
