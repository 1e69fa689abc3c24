pub mod grid;
pub mod store;

pub use grid::SlotGrid;
pub use store::{KeyValueStore, LocalStore, MemoryStore, SaveStore};
