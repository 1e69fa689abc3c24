//! Core data models for Monster Merge.
//! Everything here is plain serde data; mutation lives in the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::GameConfig;
use crate::state::SlotGrid;
use crate::util::texture_id;

/// Elemental tag gating evolution. Serialized with the glyph names the data file uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    #[serde(rename = "火", alias = "Fire", alias = "fire")]
    Fire,
    #[serde(rename = "水", alias = "Water", alias = "water")]
    Water,
    #[serde(rename = "土", alias = "Earth", alias = "earth")]
    Earth,
    #[serde(rename = "風", alias = "Wind", alias = "wind")]
    Wind,
    #[serde(rename = "天", alias = "Heaven", alias = "heaven")]
    Heaven,
}

impl Attribute {
    pub const ALL: [Attribute; 5] = [
        Attribute::Fire,
        Attribute::Water,
        Attribute::Earth,
        Attribute::Wind,
        Attribute::Heaven,
    ];

    pub fn glyph(self) -> &'static str {
        match self {
            Attribute::Fire => "火",
            Attribute::Water => "水",
            Attribute::Earth => "土",
            Attribute::Wind => "風",
            Attribute::Heaven => "天",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Attribute::Fire => "Fire",
            Attribute::Water => "Water",
            Attribute::Earth => "Earth",
            Attribute::Wind => "Wind",
            Attribute::Heaven => "Heaven",
        }
    }

    /// Accepts either the glyph or the English name (case-insensitive), as typed by the player.
    pub fn parse(input: &str) -> Option<Attribute> {
        let input = input.trim();
        Attribute::ALL
            .into_iter()
            .find(|a| a.glyph() == input || a.name().eq_ignore_ascii_case(input))
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A monster occupying a slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonsterInstance {
    /// Cosmetic position in field pixels.
    pub x: f64,
    pub y: f64,
    pub power: u64,
    /// Image path, e.g. `images/djinn.png`. The catalog id is derived from it.
    pub texture: String,
    #[serde(default)]
    pub attribute: Option<Attribute>,
}

impl MonsterInstance {
    /// Catalog identifier (tier / evolution lookup key).
    pub fn source_id(&self) -> &str {
        texture_id(&self.texture)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyState {
    pub balance: u64,
    /// Price of the next monster purchase; only ever grows.
    pub next_price: u64,
}

/// The single mutable save aggregate: economy plus slot grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub economy: EconomyState,
    pub grid: SlotGrid,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            economy: EconomyState {
                balance: config.starting_balance,
                next_price: config.starting_price,
            },
            grid: SlotGrid::new(),
        }
    }

    /// Sum of the power of every occupant.
    pub fn total_power(&self) -> u64 {
        self.grid.iter().flatten().map(|m| m.power).sum()
    }
}

/// Snapshot handed to the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayState {
    pub balance: u64,
    pub price: u64,
    pub occupied: usize,
    pub capacity: usize,
    pub total_power: u64,
    pub slots: Vec<Option<MonsterInstance>>,
    pub catalog_loaded: bool,
}

/// Result of a successful stone purchase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoneReceipt {
    pub attribute: Attribute,
    pub price: u64,
}
