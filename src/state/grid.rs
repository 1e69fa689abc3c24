// Fixed-size slot grid; index is the slot's identity for the grid's lifetime.
use serde::{Deserialize, Serialize};

use crate::constants::SLOT_COUNT;
use crate::error::GameError;
use crate::model::MonsterInstance;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotGrid {
    slots: [Option<MonsterInstance>; SLOT_COUNT],
}

impl SlotGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        SLOT_COUNT
    }

    /// Lowest-index empty slot, or `None` when the grid is full.
    pub fn find_empty_slot(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    pub fn get(&self, index: usize) -> Result<Option<&MonsterInstance>, GameError> {
        self.slots
            .get(index)
            .map(Option::as_ref)
            .ok_or(GameError::SlotOutOfRange(index))
    }

    /// Like `get`, but an empty slot is an error too.
    pub fn occupant(&self, index: usize) -> Result<&MonsterInstance, GameError> {
        self.get(index)?.ok_or(GameError::EmptySlot(index))
    }

    /// Replace the slot's content, returning what was there.
    pub fn set(
        &mut self,
        index: usize,
        monster: Option<MonsterInstance>,
    ) -> Result<Option<MonsterInstance>, GameError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(GameError::SlotOutOfRange(index))?;
        Ok(std::mem::replace(slot, monster))
    }

    pub fn count_occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.find_empty_slot().is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Option<MonsterInstance>> {
        self.slots.iter()
    }

    pub fn to_vec(&self) -> Vec<Option<MonsterInstance>> {
        self.slots.to_vec()
    }
}
