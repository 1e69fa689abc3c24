// Grid
pub const SLOT_COUNT: usize = 12;

// Base tier progression: spawns draw from these, merges climb them in order.
pub const BASE_TIERS: [&str; 3] = ["djinn", "uma", "taaka"];

// Economy
pub const STARTING_BALANCE: u64 = 0;
pub const STARTING_PRICE: u64 = 100;
pub const PRICE_STEP: u64 = 50;
pub const STONE_PRICE: u64 = 50;
pub const INCOME_AMOUNT: u64 = 10;

// Timing (milliseconds)
pub const SPAWN_INTERVAL_MS: u32 = 3_000;
pub const INCOME_INTERVAL_MS: u32 = 10_000;
pub const SCHEDULER_RESOLUTION_MS: u32 = 250;

// Spawned monsters get this power when the catalog has no entry for them.
pub const FALLBACK_POWER: u64 = 10;

// Cosmetic placement
pub const MONSTER_SIZE: f64 = 60.0;
pub const DEFAULT_FIELD_WIDTH: f64 = 800.0;
pub const DEFAULT_FIELD_HEIGHT: f64 = 600.0;

// Assets
pub const DATA_URL: &str = "data.json";
pub const IMAGE_DIR: &str = "images";
pub const IMAGE_EXT: &str = "png";

// Storage keys
pub const KEY_BALANCE: &str = "balance";
pub const KEY_SLOTS: &str = "slots";
pub const KEY_NEXT_PRICE: &str = "nextPrice";
pub const KEY_SETTINGS: &str = "settings";
pub const LEGACY_KEY_BALANCE: &str = "coins";
pub const LEGACY_KEY_SLOTS: &str = "frames";
pub const LEGACY_KEY_NEXT_PRICE: &str = "winPrice";
