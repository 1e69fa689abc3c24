//! Read-only monster and evolution definitions, loaded once at startup from the data file.
//!
//! Data file shape:
//! ```json
//! {
//!   "monsters":   [{ "id": "djinn", "power": 10, "texture": "djinn", "next": "uma" }],
//!   "evolutions": [{ "from": "taaka", "to": "phoenix", "attribute": "火" }]
//! }
//! ```
//! `attribute` and `next` are optional on monsters. A monster without `next` keeps the
//! built-in base progression (`djinn -> uma -> taaka`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::BASE_TIERS;
use crate::error::CatalogError;
use crate::model::Attribute;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonsterDefinition {
    pub id: String,
    pub power: u64,
    #[serde(default)]
    pub attribute: Option<Attribute>,
    /// Texture name without directory or extension.
    pub texture: String,
    /// Tier reached by merging two of this monster.
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionRule {
    pub from: String,
    pub to: String,
    pub attribute: Attribute,
}

#[derive(Debug, Deserialize)]
struct CatalogData {
    #[serde(default)]
    monsters: Vec<MonsterDefinition>,
    #[serde(default)]
    evolutions: Vec<EvolutionRule>,
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    monsters: HashMap<String, MonsterDefinition>,
    evolutions: Vec<EvolutionRule>,
    loaded: bool,
}

impl Catalog {
    /// Catalog with no data: only the built-in tier progression is known.
    pub fn unloaded() -> Self {
        Self::default()
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let data: CatalogData = serde_json::from_str(raw)?;
        Ok(Self::from_parts(data.monsters, data.evolutions))
    }

    pub fn from_parts(monsters: Vec<MonsterDefinition>, evolutions: Vec<EvolutionRule>) -> Self {
        let mut by_id = HashMap::with_capacity(monsters.len());
        // Earlier entries win on duplicate ids, matching a front-to-back search.
        for def in monsters {
            by_id.entry(def.id.clone()).or_insert(def);
        }
        Self {
            monsters: by_id,
            evolutions,
            loaded: true,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn monster(&self, id: &str) -> Option<&MonsterDefinition> {
        self.monsters.get(id)
    }

    pub fn power_of(&self, id: &str) -> Option<u64> {
        self.monster(id).map(|m| m.power)
    }

    /// Merge target of `id`, or `None` at the top tier or for monsters outside any progression.
    pub fn next_tier(&self, id: &str) -> Option<&str> {
        if let Some(next) = self.monster(id).and_then(|m| m.next.as_deref()) {
            return Some(next);
        }
        let pos = BASE_TIERS.iter().position(|t| *t == id)?;
        BASE_TIERS.get(pos + 1).copied()
    }

    /// First rule in file order matching the source id and attribute.
    pub fn evolution(&self, from: &str, attribute: Attribute) -> Option<&EvolutionRule> {
        self.evolutions
            .iter()
            .find(|e| e.from == from && e.attribute == attribute)
    }

    pub fn monster_count(&self) -> usize {
        self.monsters.len()
    }

    pub fn evolution_count(&self) -> usize {
        self.evolutions.len()
    }
}

/// Fetch and parse the data file. Single attempt, no retry.
pub async fn fetch_catalog(url: &str) -> Result<Catalog, CatalogError> {
    let raw = crate::assets::fetch_text(url).await?;
    let catalog = Catalog::from_json(&raw)?;
    info!(
        url,
        monsters = catalog.monster_count(),
        evolutions = catalog.evolution_count(),
        "catalog loaded"
    );
    Ok(catalog)
}
