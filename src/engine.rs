//! Game engine: every mutation of the save aggregate goes through here.
//!
//! Operations that must load an image first (spawn, merge, evolve) are split into a
//! `plan_*` step that reads current state and computes the result, and a `commit_*`
//! step that applies it. Between the two the caller awaits the asset load. A commit
//! re-checks that the slots it touches still hold what the plan saw, so a plan can
//! never overwrite state that changed while it was waiting.

use rand::Rng;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::config::GameConfig;
use crate::constants::BASE_TIERS;
use crate::error::GameError;
use crate::model::{Attribute, DisplayState, GameState, MonsterInstance, StoneReceipt};
use crate::state::{KeyValueStore, SaveStore};
use crate::util::texture_path;

#[derive(Clone, Debug, PartialEq)]
pub struct SpawnPlan {
    pub monster: MonsterInstance,
    epoch: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MergePlan {
    pub target: usize,
    pub consumed: usize,
    seen: (MonsterInstance, MonsterInstance),
    pub result: MonsterInstance,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EvolvePlan {
    pub slot: usize,
    seen: MonsterInstance,
    pub result: MonsterInstance,
}

pub struct GameEngine<S: KeyValueStore> {
    config: GameConfig,
    catalog: Catalog,
    store: SaveStore<S>,
    state: GameState,
    /// Bumped on reset; spawns planned before a reset are dropped.
    epoch: u64,
}

impl<S: KeyValueStore> GameEngine<S> {
    /// Load the saved game (or defaults) from `backend`.
    pub fn new(config: GameConfig, catalog: Catalog, backend: S) -> Self {
        let store = SaveStore::new(backend);
        let state = store.load(&config);
        debug!(
            balance = state.economy.balance,
            price = state.economy.next_price,
            occupied = state.grid.count_occupied(),
            "save loaded"
        );
        Self {
            config,
            catalog,
            store,
            state,
            epoch: 0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[cfg(test)]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn set_catalog(&mut self, catalog: Catalog) {
        self.catalog = catalog;
    }

    pub fn set_field(&mut self, width: f64, height: f64) {
        self.config = self.config.clone().with_field(width, height);
    }

    pub fn display_state(&self) -> DisplayState {
        DisplayState {
            balance: self.state.economy.balance,
            price: self.state.economy.next_price,
            occupied: self.state.grid.count_occupied(),
            capacity: self.state.grid.len(),
            total_power: self.state.total_power(),
            slots: self.state.grid.to_vec(),
            catalog_loaded: self.catalog.is_loaded(),
        }
    }

    /// One-line description of a slot for the info popup.
    pub fn slot_info(&self, index: usize) -> Result<String, GameError> {
        Ok(match self.state.grid.get(index)? {
            Some(m) => format!(
                "Slot {}: {} (Power: {}, Attribute: {})",
                index,
                m.source_id(),
                m.power,
                m.attribute.map(|a| a.name()).unwrap_or("None")
            ),
            None => format!("Slot {} is empty", index),
        })
    }

    fn texture_for(&self, id: &str) -> String {
        let name = self
            .catalog
            .monster(id)
            .map(|m| m.texture.as_str())
            .unwrap_or(id);
        texture_path(name)
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.state) {
            warn!(error = %e, "failed to persist game state");
        }
    }

    // ---------------- Spawn -----------------

    /// Pick a random base-tier monster with a random cosmetic position.
    pub fn plan_spawn<R: Rng>(&self, rng: &mut R) -> SpawnPlan {
        let id = BASE_TIERS[rng.gen_range(0..BASE_TIERS.len())];
        let power = self
            .catalog
            .power_of(id)
            .unwrap_or(self.config.fallback_power);
        let (max_x, max_y) = self.config.placement_bounds();
        SpawnPlan {
            monster: MonsterInstance {
                x: rng.gen_range(0.0..=max_x),
                y: rng.gen_range(0.0..=max_y),
                power,
                texture: self.texture_for(id),
                attribute: None,
            },
            epoch: self.epoch,
        }
    }

    /// Place the planned monster in the lowest empty slot. A full grid drops the spawn,
    /// as does a reset since the plan was made.
    pub fn commit_spawn(&mut self, plan: SpawnPlan) -> Option<usize> {
        if plan.epoch != self.epoch {
            debug!("game reset while loading, spawn dropped");
            return None;
        }
        let Some(slot) = self.state.grid.find_empty_slot() else {
            debug!("grid full, spawn dropped");
            return None;
        };
        let texture = plan.monster.texture.clone();
        self.state.grid.set(slot, Some(plan.monster)).ok()?;
        self.persist();
        debug!(slot, texture = %texture, "monster spawned");
        Some(slot)
    }

    // ---------------- Shop -----------------

    /// Debit the current price and raise it by the price step. Returns the new price.
    pub fn buy_monster(&mut self) -> Result<u64, GameError> {
        let eco = &mut self.state.economy;
        if eco.balance < eco.next_price {
            return Err(GameError::InsufficientFunds {
                balance: eco.balance,
                price: eco.next_price,
            });
        }
        eco.balance -= eco.next_price;
        eco.next_price = eco.next_price.saturating_add(self.config.price_step);
        let price = eco.next_price;
        self.persist();
        debug!(
            balance = self.state.economy.balance,
            next_price = price,
            "monster purchased"
        );
        Ok(price)
    }

    /// Debit the stone price. The stone is not attached to any monster.
    pub fn buy_attribute_stone(
        &mut self,
        attribute: Attribute,
    ) -> Result<StoneReceipt, GameError> {
        let price = self.config.stone_price;
        let eco = &mut self.state.economy;
        if eco.balance < price {
            return Err(GameError::InsufficientFunds {
                balance: eco.balance,
                price,
            });
        }
        eco.balance -= price;
        self.persist();
        debug!(%attribute, price, "attribute stone purchased");
        Ok(StoneReceipt { attribute, price })
    }

    // ---------------- Merge -----------------

    pub fn plan_merge(&self, first: usize, second: usize) -> Result<MergePlan, GameError> {
        let a = self.state.grid.occupant(first)?;
        let b = self.state.grid.occupant(second)?;
        if first == second {
            return Err(GameError::SameSlot(first));
        }
        if a.texture != b.texture {
            return Err(GameError::DifferentMonsters);
        }
        let id = a.source_id();
        let next = self
            .catalog
            .next_tier(id)
            .ok_or_else(|| GameError::MaxTier(id.to_string()))?;
        let result = MonsterInstance {
            x: (a.x + b.x) / 2.0,
            y: (a.y + b.y) / 2.0,
            power: a.power.saturating_add(b.power),
            texture: self.texture_for(next),
            attribute: a.attribute.or(b.attribute),
        };
        Ok(MergePlan {
            target: first,
            consumed: second,
            seen: (a.clone(), b.clone()),
            result,
        })
    }

    /// Replace `target` with the merged monster and clear `consumed`. Returns the target slot.
    pub fn commit_merge(&mut self, plan: MergePlan) -> Result<usize, GameError> {
        let grid = &self.state.grid;
        if grid.get(plan.target)? != Some(&plan.seen.0)
            || grid.get(plan.consumed)? != Some(&plan.seen.1)
        {
            warn!(
                target = plan.target,
                consumed = plan.consumed,
                "merge abandoned, slots changed"
            );
            return Err(GameError::SelectionChanged);
        }
        let texture = plan.result.texture.clone();
        let power = plan.result.power;
        self.state.grid.set(plan.target, Some(plan.result))?;
        self.state.grid.set(plan.consumed, None)?;
        self.persist();
        debug!(
            slot = plan.target,
            freed = plan.consumed,
            texture = %texture,
            power,
            "monsters merged"
        );
        Ok(plan.target)
    }

    // ---------------- Evolve -----------------

    pub fn plan_evolve(&self, slot: usize, attribute: Attribute) -> Result<EvolvePlan, GameError> {
        let m = self.state.grid.occupant(slot)?;
        if m.attribute != Some(attribute) {
            return Err(GameError::AttributeMismatch {
                required: attribute,
                found: m.attribute,
            });
        }
        let id = m.source_id();
        let rule = self
            .catalog
            .evolution(id, attribute)
            .ok_or_else(|| GameError::NoEvolutionRule {
                id: id.to_string(),
                attribute,
            })?;
        let target = self
            .catalog
            .monster(&rule.to)
            .ok_or_else(|| GameError::MissingDefinition(rule.to.clone()))?;
        let result = MonsterInstance {
            x: m.x,
            y: m.y,
            power: target.power,
            texture: texture_path(&target.texture),
            attribute: target.attribute.or(m.attribute),
        };
        Ok(EvolvePlan {
            slot,
            seen: m.clone(),
            result,
        })
    }

    pub fn commit_evolve(&mut self, plan: EvolvePlan) -> Result<usize, GameError> {
        if self.state.grid.get(plan.slot)? != Some(&plan.seen) {
            warn!(slot = plan.slot, "evolution abandoned, slot changed");
            return Err(GameError::SelectionChanged);
        }
        let texture = plan.result.texture.clone();
        self.state.grid.set(plan.slot, Some(plan.result))?;
        self.persist();
        debug!(slot = plan.slot, texture = %texture, "monster evolved");
        Ok(plan.slot)
    }

    // ---------------- Delete / income / reset -----------------

    /// Clear a slot, occupied or not. Returns the removed monster.
    pub fn delete_monster(&mut self, slot: usize) -> Result<Option<MonsterInstance>, GameError> {
        let removed = self.state.grid.set(slot, None)?;
        self.persist();
        debug!(slot, removed = removed.is_some(), "slot cleared");
        Ok(removed)
    }

    /// Passive income tick. Returns the new balance.
    pub fn credit_income(&mut self) -> u64 {
        let eco = &mut self.state.economy;
        eco.balance = eco.balance.saturating_add(self.config.income_amount);
        let balance = eco.balance;
        self.persist();
        balance
    }

    /// Wipe persisted state and reload defaults.
    pub fn reset(&mut self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear saved state");
        }
        self.state = self.store.load(&self.config);
        self.epoch += 1;
        info!("game reset");
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &SaveStore<S> {
        &self.store
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}
