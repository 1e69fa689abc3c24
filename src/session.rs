// Shared handle the presentation layer drives. Serializes every mutation on the
// single UI thread; asset loads happen with no engine borrow held.
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info, warn};

use crate::assets::{AssetLoader, ImageLoader};
use crate::catalog::Catalog;
use crate::config::GameConfig;
use crate::engine::GameEngine;
use crate::error::{GameError, StoreError};
use crate::model::{Attribute, DisplayState, StoneReceipt};
use crate::state::{KeyValueStore, LocalStore, MemoryStore};

pub struct GameSession<S: KeyValueStore, L: AssetLoader> {
    engine: Rc<RefCell<GameEngine<S>>>,
    loader: Rc<L>,
    rng: Rc<RefCell<SmallRng>>,
    /// Spawns waiting on their image; each one has a free slot reserved.
    pending_spawns: Rc<Cell<usize>>,
}

/// Holds one reserved slot for the lifetime of a spawn's image load.
struct PendingSpawn(Rc<Cell<usize>>);

impl PendingSpawn {
    fn reserve(count: &Rc<Cell<usize>>) -> Self {
        count.set(count.get() + 1);
        Self(count.clone())
    }
}

impl Drop for PendingSpawn {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

impl<S: KeyValueStore, L: AssetLoader> Clone for GameSession<S, L> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            loader: self.loader.clone(),
            rng: self.rng.clone(),
            pending_spawns: self.pending_spawns.clone(),
        }
    }
}

/// Storage backend picked at startup: localStorage, or memory when the browser refuses it.
pub enum BrowserStore {
    Local(LocalStore),
    Memory(MemoryStore),
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        match self {
            BrowserStore::Local(s) => s.get(key),
            BrowserStore::Memory(s) => s.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        match self {
            BrowserStore::Local(s) => s.set(key, value),
            BrowserStore::Memory(s) => s.set(key, value),
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        match self {
            BrowserStore::Local(s) => s.clear(),
            BrowserStore::Memory(s) => s.clear(),
        }
    }
}

pub type BrowserSession = GameSession<BrowserStore, ImageLoader>;

impl BrowserSession {
    /// Session backed by localStorage, with an unloaded catalog until `fetch_catalog` lands.
    pub fn browser() -> Self {
        let backend = match LocalStore::open() {
            Ok(store) => BrowserStore::Local(store),
            Err(e) => {
                warn!(error = %e, "progress will not survive a reload");
                BrowserStore::Memory(MemoryStore::new())
            }
        };
        let config = GameConfig::from_store(&backend);
        // Math.random is only used to seed; gameplay randomness comes from the rng.
        let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
        GameSession::new(config, backend, ImageLoader, seed)
    }
}

impl<S: KeyValueStore, L: AssetLoader> GameSession<S, L> {
    pub fn new(config: GameConfig, backend: S, loader: L, seed: u64) -> Self {
        let engine = GameEngine::new(config, Catalog::unloaded(), backend);
        Self {
            engine: Rc::new(RefCell::new(engine)),
            loader: Rc::new(loader),
            rng: Rc::new(RefCell::new(SmallRng::seed_from_u64(seed))),
            pending_spawns: Rc::new(Cell::new(0)),
        }
    }

    pub fn config(&self) -> GameConfig {
        self.engine.borrow().config().clone()
    }

    pub fn display_state(&self) -> DisplayState {
        self.engine.borrow().display_state()
    }

    pub fn slot_info(&self, slot: usize) -> Result<String, GameError> {
        self.engine.borrow().slot_info(slot)
    }

    pub fn install_catalog(&self, catalog: Catalog) {
        self.engine.borrow_mut().set_catalog(catalog);
    }

    pub fn set_field(&self, width: f64, height: f64) {
        self.engine.borrow_mut().set_field(width, height);
    }

    /// Spawn tick. `None` when every free slot is taken or reserved by a spawn still
    /// loading, or when the image failed to load.
    pub async fn spawn_monster(&self) -> Option<usize> {
        let (plan, _reserved) = {
            let engine = self.engine.borrow();
            let grid = &engine.state().grid;
            let free = grid.len() - grid.count_occupied();
            if self.pending_spawns.get() >= free {
                debug!(pending = self.pending_spawns.get(), "no free slot, skipping spawn");
                return None;
            }
            let plan = engine.plan_spawn(&mut *self.rng.borrow_mut());
            (plan, PendingSpawn::reserve(&self.pending_spawns))
        };
        if let Err(e) = self.loader.load(&plan.monster.texture).await {
            warn!(error = %e, "spawn abandoned");
            return None;
        }
        self.engine.borrow_mut().commit_spawn(plan)
    }

    pub fn buy_monster(&self) -> Result<u64, GameError> {
        self.engine.borrow_mut().buy_monster()
    }

    pub fn buy_attribute_stone(&self, attribute: Attribute) -> Result<StoneReceipt, GameError> {
        self.engine.borrow_mut().buy_attribute_stone(attribute)
    }

    pub async fn merge_monsters(&self, first: usize, second: usize) -> Result<usize, GameError> {
        let plan = self.engine.borrow().plan_merge(first, second)?;
        self.loader
            .load(&plan.result.texture)
            .await
            .map_err(|e| GameError::AssetUnavailable(e.0))?;
        self.engine.borrow_mut().commit_merge(plan)
    }

    pub async fn evolve_monster(
        &self,
        slot: usize,
        attribute: Attribute,
    ) -> Result<usize, GameError> {
        let plan = self.engine.borrow().plan_evolve(slot, attribute)?;
        self.loader
            .load(&plan.result.texture)
            .await
            .map_err(|e| GameError::AssetUnavailable(e.0))?;
        self.engine.borrow_mut().commit_evolve(plan)
    }

    pub fn delete_monster(&self, slot: usize) -> Result<(), GameError> {
        self.engine.borrow_mut().delete_monster(slot).map(|_| ())
    }

    pub fn credit_income(&self) -> u64 {
        self.engine.borrow_mut().credit_income()
    }

    /// Caller must have obtained the player's confirmation.
    pub fn reset_game(&self) {
        self.engine.borrow_mut().reset();
        info!("session reset to defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SLOT_COUNT;
    use crate::error::AssetError;
    use crate::model::MonsterInstance;
    use futures::FutureExt;
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use futures::future::LocalBoxFuture;
    use std::task::Poll;

    const DATA: &str = r#"{
        "monsters": [
            {"id": "djinn", "power": 10, "texture": "djinn"},
            {"id": "uma", "power": 30, "texture": "uma"},
            {"id": "taaka", "power": 80, "texture": "taaka"},
            {"id": "ifrit", "power": 400, "texture": "ifrit"}
        ],
        "evolutions": [{"from": "taaka", "to": "ifrit", "attribute": "火"}]
    }"#;

    struct ReadyLoader;

    impl AssetLoader for ReadyLoader {
        fn load(&self, _src: &str) -> LocalBoxFuture<'static, Result<(), AssetError>> {
            futures::future::ready(Ok(())).boxed_local()
        }
    }

    /// Fails every image whose path contains `broken`.
    struct FlakyLoader {
        broken: &'static str,
    }

    impl AssetLoader for FlakyLoader {
        fn load(&self, src: &str) -> LocalBoxFuture<'static, Result<(), AssetError>> {
            let res = if src.contains(self.broken) {
                Err(AssetError(src.to_string()))
            } else {
                Ok(())
            };
            futures::future::ready(res).boxed_local()
        }
    }

    /// Holds every load until the test releases it.
    #[derive(Default)]
    struct GatedLoader {
        gates: RefCell<Vec<oneshot::Sender<()>>>,
    }

    impl GatedLoader {
        fn release_all(&self) {
            for tx in self.gates.borrow_mut().drain(..) {
                let _ = tx.send(());
            }
        }
    }

    impl AssetLoader for GatedLoader {
        fn load(&self, _src: &str) -> LocalBoxFuture<'static, Result<(), AssetError>> {
            let (tx, rx) = oneshot::channel();
            self.gates.borrow_mut().push(tx);
            async move { rx.await.map_err(|_| AssetError("gate dropped".into())) }.boxed_local()
        }
    }

    fn place<L: AssetLoader>(
        s: &GameSession<MemoryStore, L>,
        slot: usize,
        id: &str,
        attribute: Option<Attribute>,
    ) {
        let monster = MonsterInstance {
            x: 0.0,
            y: 0.0,
            power: 10,
            texture: crate::util::texture_path(id),
            attribute,
        };
        s.engine
            .borrow_mut()
            .state_mut()
            .grid
            .set(slot, Some(monster))
            .unwrap();
    }

    fn session<L: AssetLoader>(loader: L) -> GameSession<MemoryStore, L> {
        let s = GameSession::new(GameConfig::default(), MemoryStore::new(), loader, 42);
        s.install_catalog(Catalog::from_json(DATA).unwrap());
        s
    }

    #[test]
    fn test_spawn_fills_grid_then_no_ops() {
        let s = session(ReadyLoader);
        for _ in 0..SLOT_COUNT {
            assert!(block_on(s.spawn_monster()).is_some());
        }
        let full = s.display_state();
        assert_eq!(full.occupied, SLOT_COUNT);
        assert_eq!(block_on(s.spawn_monster()), None);
        assert_eq!(s.display_state(), full);
    }

    #[test]
    fn test_spawn_with_failed_image_consumes_nothing() {
        let s = session(FlakyLoader { broken: "images/" });
        let before = s.display_state();
        assert_eq!(block_on(s.spawn_monster()), None);
        assert_eq!(s.display_state(), before);
    }

    #[test]
    fn test_merge_with_failed_image_keeps_both() {
        let s = session(FlakyLoader { broken: "uma" });
        place(&s, 0, "djinn", None);
        place(&s, 1, "djinn", None);
        let before = s.display_state();
        let err = block_on(s.merge_monsters(0, 1)).unwrap_err();
        assert_eq!(err, GameError::AssetUnavailable("images/uma.png".into()));
        assert_eq!(s.display_state(), before);
    }

    #[test]
    fn test_evolve_with_failed_image_keeps_original() {
        let s = session(FlakyLoader { broken: "ifrit" });
        place(&s, 4, "taaka", Some(Attribute::Fire));
        let before = s.display_state();
        let err = block_on(s.evolve_monster(4, Attribute::Fire)).unwrap_err();
        assert_eq!(err, GameError::AssetUnavailable("images/ifrit.png".into()));
        assert_eq!(s.display_state(), before);
    }

    #[test]
    fn test_spawn_burst_loads_at_most_free_slots() {
        let s = session(GatedLoader::default());
        place(&s, 0, "djinn", None);
        block_on(async {
            let mut pending = Vec::new();
            for _ in 0..200 {
                let mut spawn = s.spawn_monster().boxed_local();
                match futures::poll!(spawn.as_mut()) {
                    Poll::Pending => pending.push(spawn),
                    Poll::Ready(slot) => assert_eq!(slot, None),
                }
            }
            assert_eq!(pending.len(), SLOT_COUNT - 1);
            assert_eq!(s.loader.gates.borrow().len(), SLOT_COUNT - 1);
            s.loader.release_all();
            let placed = futures::future::join_all(pending).await;
            assert!(placed.iter().all(Option::is_some));
        });
        assert_eq!(s.display_state().occupied, SLOT_COUNT);
        assert_eq!(s.pending_spawns.get(), 0);
    }

    #[test]
    fn test_failed_spawn_releases_its_reservation() {
        let s = session(FlakyLoader { broken: "images/" });
        for _ in 0..(SLOT_COUNT + 3) {
            assert_eq!(block_on(s.spawn_monster()), None);
        }
        assert_eq!(s.pending_spawns.get(), 0);
    }

    #[test]
    fn test_spawn_loading_across_reset_is_dropped() {
        let s = session(GatedLoader::default());
        block_on(async {
            let spawn = s.spawn_monster();
            futures::pin_mut!(spawn);
            assert!(futures::poll!(spawn.as_mut()).is_pending());
            s.reset_game();
            s.loader.release_all();
            assert_eq!(spawn.await, None);
        });
        let d = s.display_state();
        assert_eq!(d.occupied, 0);
        assert_eq!(s.engine.borrow().store().load(&GameConfig::default()).grid.count_occupied(), 0);
    }

    #[test]
    fn test_evolve_through_session() {
        let s = session(ReadyLoader);
        place(&s, 6, "taaka", Some(Attribute::Fire));
        assert_eq!(block_on(s.evolve_monster(6, Attribute::Fire)), Ok(6));
        let slot = s.display_state().slots[6].clone().unwrap();
        assert_eq!(slot.source_id(), "ifrit");
        assert_eq!(slot.power, 400);
    }

    #[test]
    fn test_pending_merge_refuses_after_delete() {
        let s = session(GatedLoader::default());
        place(&s, 2, "djinn", None);
        place(&s, 5, "djinn", None);
        block_on(async {
            let merge = s.merge_monsters(2, 5);
            futures::pin_mut!(merge);
            assert!(futures::poll!(merge.as_mut()).is_pending());
            s.delete_monster(5).unwrap();
            s.loader.release_all();
            assert_eq!(merge.await, Err(GameError::SelectionChanged));
        });
        let after = s.display_state();
        assert_eq!(after.slots[2].as_ref().unwrap().source_id(), "djinn");
        assert!(after.slots[5].is_none());
        assert_eq!(after.occupied, 1);
    }

    #[test]
    fn test_spawn_during_pending_merge_takes_free_slot() {
        let s = session(GatedLoader::default());
        place(&s, 0, "uma", None);
        place(&s, 1, "uma", None);
        block_on(async {
            let merge = s.merge_monsters(0, 1);
            futures::pin_mut!(merge);
            assert!(futures::poll!(merge.as_mut()).is_pending());
            let spawn = s.spawn_monster();
            futures::pin_mut!(spawn);
            assert!(futures::poll!(spawn.as_mut()).is_pending());
            s.loader.release_all();
            assert_eq!(spawn.await, Some(2));
            assert_eq!(merge.await, Ok(0));
        });
        let d = s.display_state();
        assert_eq!(d.slots[0].as_ref().unwrap().source_id(), "taaka");
        assert!(d.slots[1].is_none());
        assert_eq!(d.occupied, 2);
    }

    #[test]
    fn test_shop_and_income_through_session() {
        let s = session(ReadyLoader);
        assert!(matches!(s.buy_monster(), Err(GameError::InsufficientFunds { .. })));
        for _ in 0..15 {
            s.credit_income();
        }
        assert_eq!(s.display_state().balance, 150);
        assert_eq!(s.buy_monster(), Ok(150));
        assert_eq!(s.buy_attribute_stone(Attribute::Earth).map(|r| r.price), Ok(50));
        let d = s.display_state();
        assert_eq!((d.balance, d.price), (0, 150));
    }

    #[test]
    fn test_reset_game_restores_defaults() {
        let s = session(ReadyLoader);
        s.credit_income();
        block_on(s.spawn_monster());
        s.reset_game();
        let d = s.display_state();
        assert_eq!((d.balance, d.price, d.occupied), (0, 100, 0));
        assert!(d.catalog_loaded);
    }
}
