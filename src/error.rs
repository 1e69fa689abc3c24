use crate::model::Attribute;

/// Broad classes of user-facing failures. None of them are fatal to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InsufficientResources,
    InvalidSelection,
    MissingCatalogData,
    AssetUnavailable,
}

/// Why an engine operation was refused. The display text is shown to the player.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    #[error("Not enough coins (have {balance}, need {price})")]
    InsufficientFunds { balance: u64, price: u64 },
    #[error("Slot {0} does not exist")]
    SlotOutOfRange(usize),
    #[error("No monster selected in slot {0}")]
    EmptySlot(usize),
    #[error("Pick two different slots to merge (got {0} twice)")]
    SameSlot(usize),
    #[error("Different monsters cannot be merged")]
    DifferentMonsters,
    #[error("{0} cannot be merged any further")]
    MaxTier(String),
    #[error("Attribute does not match (required {required}, monster has {})", display_attr(.found))]
    AttributeMismatch {
        required: Attribute,
        found: Option<Attribute>,
    },
    #[error("{id} has no evolution for the {attribute} attribute")]
    NoEvolutionRule { id: String, attribute: Attribute },
    #[error("Evolution target {0} was not found")]
    MissingDefinition(String),
    #[error("Image {0} is unavailable")]
    AssetUnavailable(String),
    #[error("The selected monsters changed before the action finished")]
    SelectionChanged,
}

fn display_attr(attr: &Option<Attribute>) -> String {
    attr.map(|a| a.to_string()).unwrap_or_else(|| "None".to_string())
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::InsufficientFunds { .. } => ErrorKind::InsufficientResources,
            GameError::SlotOutOfRange(_)
            | GameError::EmptySlot(_)
            | GameError::SameSlot(_)
            | GameError::DifferentMonsters
            | GameError::MaxTier(_)
            | GameError::AttributeMismatch { .. }
            | GameError::SelectionChanged => ErrorKind::InvalidSelection,
            GameError::NoEvolutionRule { .. } | GameError::MissingDefinition(_) => {
                ErrorKind::MissingCatalogData
            }
            GameError::AssetUnavailable(_) => ErrorKind::AssetUnavailable,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog fetch failed: {0}")]
    Fetch(String),
    #[error("catalog request returned HTTP {0}")]
    Status(u16),
    #[error("catalog parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("local storage is unavailable")]
    Unavailable,
    #[error("storage rejected write of `{0}`")]
    Write(String),
    #[error("could not serialize `{key}`: {source}")]
    Serialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("asset {0} failed to load")]
pub struct AssetError(pub String);
