//! Owned-card inventory.
//!
//! An inventory is a CSV export with one row per owned card and at least a
//! `Name` column. Every column is preserved verbatim; only the name is
//! interpreted, and only to derive the lookup key (see [`crate::names`]).

use std::collections::HashMap;
use std::io::Read;

use tracing::debug;

use crate::error::InventoryError;
use crate::names::lookup_key;

pub const NAME_COLUMN: &str = "Name";

/// One inventory row: the original columns in header order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InventoryRow {
    fields: Vec<(String, String)>,
}

impl InventoryRow {
    /// A row with just a `Name` column.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            fields: vec![(NAME_COLUMN.to_string(), name.into())],
        }
    }

    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Builder pattern: append a passthrough column.
    pub fn with_field(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((column.into(), value.into()));
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.get(NAME_COLUMN)
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Name-keyed lookup over owned cards. Built once, then only queried.
#[derive(Debug, Clone, Default)]
pub struct InventoryIndex {
    cards: HashMap<String, InventoryRow>,
}

impl InventoryIndex {
    /// Parses a CSV stream with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, InventoryError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();
        if !headers.iter().any(|h| h == NAME_COLUMN) {
            return Err(InventoryError::MissingNameColumn);
        }

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(InventoryRow::from_fields(
                headers.iter().cloned().zip(record.iter().map(str::to_string)),
            ));
        }
        Self::from_rows(rows)
    }

    /// Indexes already-decoded rows. Later rows replace earlier ones that
    /// normalize to the same key.
    pub fn from_rows<I>(rows: I) -> Result<Self, InventoryError>
    where
        I: IntoIterator<Item = InventoryRow>,
    {
        let mut cards = HashMap::new();
        for (row_number, row) in rows.into_iter().enumerate() {
            let Some(name) = row.name() else {
                return Err(InventoryError::MissingName { row: row_number + 1 });
            };
            let key = lookup_key(name);
            if cards.insert(key.clone(), row).is_some() {
                debug!(card = %key, "duplicate inventory row replaces earlier entry");
            }
        }
        Ok(Self { cards })
    }

    /// Convenience for name-only inventories.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cards = names
            .into_iter()
            .map(|name| {
                let row = InventoryRow::new(name);
                (lookup_key(row.name().unwrap_or_default()), row)
            })
            .collect();
        Self { cards }
    }

    /// True if a card by this name (in any spelling that normalizes to the
    /// same key) is owned.
    pub fn contains(&self, name: &str) -> bool {
        self.cards.contains_key(&lookup_key(name))
    }

    pub fn get(&self, name: &str) -> Option<&InventoryRow> {
        self.cards.get(&lookup_key(name))
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InventoryRow)> {
        self.cards.iter().map(|(k, v)| (k.as_str(), v))
    }
}
