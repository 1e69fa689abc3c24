mod assets;
mod catalog;
mod components;
mod config;
mod constants;
mod engine;
mod error;
mod logging;
mod model;
mod scheduler;
mod session;
mod state;
mod util;

use components::App;

fn main() {
    logging::init();
    tracing::info!("Starting Monster Merge");
    yew::Renderer::<App>::new().render();
}
