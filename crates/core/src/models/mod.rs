//! Shared domain models.

use std::{collections::HashMap, path::PathBuf};

use serde::{Deserialize, Serialize};

/// A single card face on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardAsset {
    /// Card name, taken from the file stem.
    pub name: String,
    /// Image file backing this card.
    pub path: PathBuf,
}

impl CardAsset {
    /// Build a card asset from its name and source path.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Every card face belonging to one game folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameAssets {
    /// Game name, taken from the folder name.
    pub name: String,
    /// Front faces in sorted filename order.
    pub front_cards: Vec<CardAsset>,
    /// The shared back face printed behind every front.
    pub back_card: CardAsset,
}

impl GameAssets {
    /// Look up a front card by name.
    pub fn front_card(&self, name: &str) -> Option<&CardAsset> {
        self.front_cards.iter().find(|card| card.name == name)
    }

    /// Names of the front cards in catalog order.
    pub fn card_names(&self) -> impl Iterator<Item = &str> {
        self.front_cards.iter().map(|card| card.name.as_str())
    }
}

/// Requested copies per card name.
///
/// Raw values may be negative; they are clamped to zero whenever the map is read
/// through [`QuantityMap::count`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityMap {
    counts: HashMap<String, i64>,
}

impl QuantityMap {
    /// Empty map; every card defaults to zero copies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the requested count for a card, replacing any earlier value.
    pub fn set(&mut self, name: impl Into<String>, count: i64) {
        self.counts.insert(name.into(), count);
    }

    /// Builder-style variant of [`QuantityMap::set`].
    pub fn with(mut self, name: impl Into<String>, count: i64) -> Self {
        self.set(name, count);
        self
    }

    /// Clamped count for `name`; unknown names count as zero.
    pub fn count(&self, name: &str) -> u32 {
        self.counts
            .get(name)
            .map(|&value| value.clamp(0, i64::from(u32::MAX)) as u32)
            .unwrap_or(0)
    }

    /// Sum of clamped counts over `cards` only; names outside the list are ignored.
    pub fn total_for(&self, cards: &[CardAsset]) -> u64 {
        cards.iter().map(|card| u64::from(self.count(&card.name))).sum()
    }

    /// Card names mentioned in the map, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, i64)> for QuantityMap {
    fn from_iter<T: IntoIterator<Item = (K, i64)>>(iter: T) -> Self {
        Self {
            counts: iter
                .into_iter()
                .map(|(name, count)| (name.into(), count))
                .collect(),
        }
    }
}
