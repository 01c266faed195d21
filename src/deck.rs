use std::collections::HashMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// An insertion-ordered mapping from card name to copy count.
///
/// Serves both as the reference decklist a provider returns and as the
/// working deck assembled from the inventory. Iteration order is the order
/// names were first inserted; re-inserting a name updates its count in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decklist {
    entries: Vec<(String, u32)>,
    index: HashMap<String, usize>,
}

/// Reference decklist for a commander, as supplied by the provider.
pub type ReferenceDeck = Decklist;

/// Deck accumulated by one build.
pub type WorkingDeck = Decklist;

impl Decklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the count for `name`, keeping its original position if present.
    pub fn insert(&mut self, name: impl Into<String>, count: u32) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&slot) => self.entries[slot].1 = count,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, count));
            }
        }
    }

    /// Adds `copies` to the count for `name`, inserting it if absent.
    pub fn add_copies(&mut self, name: &str, copies: u32) {
        match self.index.get(name) {
            Some(&slot) => {
                let count = &mut self.entries[slot].1;
                *count = count.saturating_add(copies);
            }
            None => self.insert(name, copies),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Copy count for `name`, zero when absent.
    pub fn count(&self, name: &str) -> u32 {
        self.index
            .get(name)
            .map(|&slot| self.entries[slot].1)
            .unwrap_or(0)
    }

    /// Number of distinct card names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all copy counts, saturating at `u32::MAX`.
    pub fn total(&self) -> u32 {
        self.entries
            .iter()
            .fold(0u32, |total, (_, count)| total.saturating_add(*count))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for Decklist {
    fn from_iter<T: IntoIterator<Item = (S, u32)>>(iter: T) -> Self {
        let mut deck = Decklist::new();
        for (name, count) in iter {
            deck.insert(name, count);
        }
        deck
    }
}

/// Renders the deck as `"{count} {name}"` lines, the usual import format.
impl fmt::Display for Decklist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, count) in self.iter() {
            writeln!(f, "{} {}", count, name)?;
        }
        Ok(())
    }
}

impl Serialize for Decklist {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, count) in &self.entries {
            map.serialize_entry(name, count)?;
        }
        map.end()
    }
}
