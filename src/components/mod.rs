pub mod app;
pub mod controls_panel;
pub mod shop_panel;
pub mod slot_board;
pub mod stats_panel;

pub use app::App;
