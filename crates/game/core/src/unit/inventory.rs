use std::collections::BTreeMap;

use crate::env::InventoryKey;

/// Item, weapon and armor counts held by the party.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Inventory {
    counts: BTreeMap<InventoryKey, u32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_items(&self, key: InventoryKey) -> u32 {
        self.counts.get(&key).copied().unwrap_or(0)
    }

    pub fn has_item(&self, key: InventoryKey) -> bool {
        self.num_items(key) > 0
    }

    /// Adds up to `max` of one key; the excess is lost.
    pub fn gain_item(&mut self, key: InventoryKey, amount: u32, max: u32) {
        let count = self.counts.entry(key).or_insert(0);
        *count = count.saturating_add(amount).min(max);
        if *count == 0 {
            self.counts.remove(&key);
        }
    }

    pub fn lose_item(&mut self, key: InventoryKey, amount: u32) {
        if let Some(count) = self.counts.get_mut(&key) {
            *count = count.saturating_sub(amount);
            if *count == 0 {
                self.counts.remove(&key);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (InventoryKey, u32)> + '_ {
        self.counts.iter().map(|(key, count)| (*key, *count))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl FromIterator<(InventoryKey, u32)> for Inventory {
    fn from_iter<I: IntoIterator<Item = (InventoryKey, u32)>>(iter: I) -> Self {
        let mut inventory = Self::new();
        for (key, amount) in iter {
            inventory.gain_item(key, amount, u32::MAX);
        }
        inventory
    }
}
