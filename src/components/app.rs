use super::{
    controls_panel::ControlsPanel, shop_panel::ShopPanel, slot_board::SlotBoard,
    stats_panel::StatsPanel,
};
use crate::catalog::fetch_catalog;
use crate::constants::SLOT_COUNT;
use crate::error::{ErrorKind, GameError};
use crate::model::Attribute;
use crate::scheduler::{Interval, Scheduler, Tick};
use crate::session::BrowserSession;
use crate::util::{parse_slot, toggle_selection};
use tracing::warn;
use yew::platform::spawn_local;
use yew::prelude::*;

fn prompt(msg: &str) -> Option<String> {
    web_sys::window()?.prompt_with_message(msg).ok().flatten()
}

fn ask_slot(msg: &str) -> Result<usize, String> {
    let raw = prompt(msg).ok_or_else(|| "No slot entered".to_string())?;
    parse_slot(&raw).ok_or_else(|| format!("Enter a slot number from 0 to {}", SLOT_COUNT - 1))
}

fn ask_attribute() -> Result<Attribute, String> {
    let raw = prompt("Attribute required to evolve (e.g. 火 or Fire)")
        .ok_or_else(|| "No attribute entered".to_string())?;
    Attribute::parse(&raw).ok_or_else(|| format!("Unknown attribute: {}", raw.trim()))
}

fn failure_text(e: &GameError) -> String {
    match e.kind() {
        ErrorKind::InsufficientResources => format!("🪙 {}", e),
        ErrorKind::AssetUnavailable => format!("🖼 {}", e),
        ErrorKind::InvalidSelection | ErrorKind::MissingCatalogData => e.to_string(),
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let session = use_state(BrowserSession::browser);
    let display = use_state(|| session.display_state());
    let selected = use_state(Vec::<usize>::new);
    let feedback = use_state(|| None::<String>);

    // Size the placement field, then load monster data once
    {
        let session = (*session).clone();
        let display = display.clone();
        use_effect_with((), move |_| {
            if let Some(win) = web_sys::window() {
                let width = win.inner_width().ok().and_then(|v| v.as_f64());
                let height = win.inner_height().ok().and_then(|v| v.as_f64());
                if let (Some(w), Some(h)) = (width, height) {
                    session.set_field(w, h);
                }
            }
            let url = session.config().data_url;
            spawn_local(async move {
                match fetch_catalog(&url).await {
                    Ok(catalog) => session.install_catalog(catalog),
                    Err(e) => warn!(error = %e, "running without monster data"),
                }
                display.set(session.display_state());
            });
            || ()
        });
    }

    // Spawn + income timers
    {
        let session = (*session).clone();
        let display = display.clone();
        use_effect_with((), move |_| {
            let config = session.config();
            let mut scheduler = Scheduler::new(&config);
            let mut last = js_sys::Date::now();
            let interval = Interval::start(config.scheduler_resolution_ms, move || {
                let now = js_sys::Date::now();
                let dt = (now - last).max(0.0) as u64;
                last = now;
                for tick in scheduler.advance(dt) {
                    match tick {
                        Tick::Spawn => {
                            let session = session.clone();
                            let display = display.clone();
                            spawn_local(async move {
                                if session.spawn_monster().await.is_some() {
                                    display.set(session.display_state());
                                }
                            });
                        }
                        Tick::Income => {
                            session.credit_income();
                            display.set(session.display_state());
                        }
                    }
                }
            });
            if interval.is_none() {
                warn!("could not start game timers");
            }
            move || drop(interval)
        });
    }

    let on_select = {
        let session = (*session).clone();
        let selected = selected.clone();
        let feedback = feedback.clone();
        Callback::from(move |slot: usize| {
            feedback.set(session.slot_info(slot).ok());
            selected.set(toggle_selection(&selected, slot));
        })
    };

    let on_buy_monster = {
        let session = (*session).clone();
        let display = display.clone();
        let feedback = feedback.clone();
        Callback::from(move |_| {
            let msg = match session.buy_monster() {
                Ok(price) => format!("Purchased! Next price: {}", price),
                Err(e) => failure_text(&e),
            };
            feedback.set(Some(msg));
            display.set(session.display_state());
        })
    };

    let on_buy_stone = {
        let session = (*session).clone();
        let display = display.clone();
        let feedback = feedback.clone();
        Callback::from(move |attr: Attribute| {
            let msg = match session.buy_attribute_stone(attr) {
                Ok(r) => format!("Purchased the {} stone for {}", r.attribute, r.price),
                Err(e) => failure_text(&e),
            };
            feedback.set(Some(msg));
            display.set(session.display_state());
        })
    };

    let on_merge = {
        let session = (*session).clone();
        let display = display.clone();
        let selected = selected.clone();
        let feedback = feedback.clone();
        Callback::from(move |_| {
            let pair = match selected.as_slice() {
                [a, b] => Ok((*a, *b)),
                _ => ask_slot("First slot number (e.g. 0)")
                    .and_then(|a| ask_slot("Second slot number (e.g. 1)").map(|b| (a, b))),
            };
            let (a, b) = match pair {
                Ok(p) => p,
                Err(msg) => {
                    feedback.set(Some(msg));
                    return;
                }
            };
            selected.set(Vec::new());
            let session = session.clone();
            let display = display.clone();
            let feedback = feedback.clone();
            spawn_local(async move {
                let msg = match session.merge_monsters(a, b).await {
                    Ok(slot) => format!("Merged into slot {}", slot),
                    Err(e) => failure_text(&e),
                };
                feedback.set(Some(msg));
                display.set(session.display_state());
            });
        })
    };

    let on_evolve = {
        let session = (*session).clone();
        let display = display.clone();
        let selected = selected.clone();
        let feedback = feedback.clone();
        Callback::from(move |_| {
            let slot = match selected.first() {
                Some(s) => Ok(*s),
                None => ask_slot("Slot number of the monster to evolve (e.g. 0)"),
            };
            let (slot, attr) = match slot.and_then(|s| ask_attribute().map(|a| (s, a))) {
                Ok(v) => v,
                Err(msg) => {
                    feedback.set(Some(msg));
                    return;
                }
            };
            selected.set(Vec::new());
            let session = session.clone();
            let display = display.clone();
            let feedback = feedback.clone();
            spawn_local(async move {
                let msg = match session.evolve_monster(slot, attr).await {
                    Ok(slot) => format!("Slot {} evolved!", slot),
                    Err(e) => failure_text(&e),
                };
                feedback.set(Some(msg));
                display.set(session.display_state());
            });
        })
    };

    let on_delete = {
        let session = (*session).clone();
        let display = display.clone();
        let selected = selected.clone();
        let feedback = feedback.clone();
        Callback::from(move |_| {
            let slot = match selected.first() {
                Some(s) => Ok(*s),
                None => ask_slot("Slot number to delete (e.g. 0)"),
            };
            let msg = match slot {
                Ok(s) => match session.delete_monster(s) {
                    Ok(()) => format!("Slot {} cleared", s),
                    Err(e) => failure_text(&e),
                },
                Err(msg) => msg,
            };
            selected.set(Vec::new());
            feedback.set(Some(msg));
            display.set(session.display_state());
        })
    };

    let on_reset = {
        let session = (*session).clone();
        let display = display.clone();
        let selected = selected.clone();
        let feedback = feedback.clone();
        Callback::from(move |_| {
            session.reset_game();
            selected.set(Vec::new());
            feedback.set(Some("Game reset".to_string()));
            display.set(session.display_state());
        })
    };

    let d = (*display).clone();
    let stone_price = session.config().stone_price;
    html! {
        <div id="root" style="display:flex; gap:16px; padding:16px; align-items:flex-start; min-height:100vh; background:#0e1116; color:#c9d1d9; font-family:sans-serif;">
            <div style="display:flex; flex-direction:column; gap:12px;">
                <StatsPanel
                    balance={d.balance}
                    price={d.price}
                    occupied={d.occupied}
                    capacity={d.capacity}
                    total_power={d.total_power}
                    catalog_loaded={d.catalog_loaded}
                />
                <ShopPanel
                    price={d.price}
                    stone_price={stone_price}
                    occupied={d.occupied}
                    on_buy_monster={on_buy_monster}
                    on_buy_stone={on_buy_stone}
                />
                <ControlsPanel
                    on_merge={on_merge}
                    on_evolve={on_evolve}
                    on_delete={on_delete}
                    on_reset={on_reset}
                    feedback={(*feedback).clone()}
                />
            </div>
            <SlotBoard slots={d.slots} selected={(*selected).clone()} on_select={on_select} />
        </div>
    }
}
