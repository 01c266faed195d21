//! Reference data: average decklists, popularity rankings and card metadata.
//!
//! The assembler only sees the [`ReferenceDataProvider`] trait. Backends
//! decide where the data comes from; the in-tree [`PayloadProvider`] reads a
//! document that was fetched elsewhere (typically by a browser client).

pub mod payload;

pub use payload::PayloadProvider;

use serde::{Deserialize, Serialize};

use crate::color::ColorSet;
use crate::deck::ReferenceDeck;
use crate::error::ProviderError;
use crate::types::{BudgetTier, CardType};

/// Metadata needed for legality checks and type-bucketed fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardMetadata {
    #[serde(rename = "type")]
    pub card_type: CardType,
    pub color_identity: ColorSet,
}

impl CardMetadata {
    pub fn new(card_type: CardType, color_identity: ColorSet) -> Self {
        Self {
            card_type,
            color_identity,
        }
    }
}

/// An entry of a similar-cards or top-cards list. List order is rank order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSummary {
    pub name: String,
    #[serde(default)]
    pub color_identity: ColorSet,
}

impl CardSummary {
    pub fn new(name: impl Into<String>, color_identity: ColorSet) -> Self {
        Self {
            name: name.into(),
            color_identity,
        }
    }
}

/// Bulk metadata lookup result, in the order the names were requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardList {
    pub cards: Vec<(String, CardMetadata)>,
}

impl CardList {
    pub fn get(&self, name: &str) -> Option<&CardMetadata> {
        self.cards
            .iter()
            .find(|(card, _)| card == name)
            .map(|(_, metadata)| metadata)
    }
}

/// Read-only source of community reference data.
///
/// Calls may block. Implementations must not retry on their own; transport
/// failures surface as [`ProviderError::Unavailable`].
pub trait ReferenceDataProvider {
    /// Average decklist for a commander key (`"A"` or `"A-B"` for partners).
    /// An empty list is a valid answer.
    fn avg_deck(
        &self,
        commander_name: &str,
        theme: Option<&str>,
        budget: BudgetTier,
    ) -> Result<ReferenceDeck, ProviderError>;

    /// Metadata for many cards at once. Unknown names are simply absent.
    fn card_list(&self, names: &[String]) -> Result<CardList, ProviderError>;

    /// Most popular cards of a type for the commander, best first.
    fn top_cards_for_type(
        &self,
        commander_name: &str,
        card_type: CardType,
    ) -> Result<Vec<CardSummary>, ProviderError>;

    /// Cards similar to the given one, most similar first.
    fn similar(&self, card_name: &str) -> Result<Vec<CardSummary>, ProviderError>;

    /// Metadata for one card; [`ProviderError::UnknownCard`] if not found.
    fn card_details(&self, card_name: &str) -> Result<CardMetadata, ProviderError>;
}

impl<P: ReferenceDataProvider + ?Sized> ReferenceDataProvider for &P {
    fn avg_deck(
        &self,
        commander_name: &str,
        theme: Option<&str>,
        budget: BudgetTier,
    ) -> Result<ReferenceDeck, ProviderError> {
        (**self).avg_deck(commander_name, theme, budget)
    }

    fn card_list(&self, names: &[String]) -> Result<CardList, ProviderError> {
        (**self).card_list(names)
    }

    fn top_cards_for_type(
        &self,
        commander_name: &str,
        card_type: CardType,
    ) -> Result<Vec<CardSummary>, ProviderError> {
        (**self).top_cards_for_type(commander_name, card_type)
    }

    fn similar(&self, card_name: &str) -> Result<Vec<CardSummary>, ProviderError> {
        (**self).similar(card_name)
    }

    fn card_details(&self, card_name: &str) -> Result<CardMetadata, ProviderError> {
        (**self).card_details(card_name)
    }
}

impl<P: ReferenceDataProvider + ?Sized> ReferenceDataProvider for Box<P> {
    fn avg_deck(
        &self,
        commander_name: &str,
        theme: Option<&str>,
        budget: BudgetTier,
    ) -> Result<ReferenceDeck, ProviderError> {
        (**self).avg_deck(commander_name, theme, budget)
    }

    fn card_list(&self, names: &[String]) -> Result<CardList, ProviderError> {
        (**self).card_list(names)
    }

    fn top_cards_for_type(
        &self,
        commander_name: &str,
        card_type: CardType,
    ) -> Result<Vec<CardSummary>, ProviderError> {
        (**self).top_cards_for_type(commander_name, card_type)
    }

    fn similar(&self, card_name: &str) -> Result<Vec<CardSummary>, ProviderError> {
        (**self).similar(card_name)
    }

    fn card_details(&self, card_name: &str) -> Result<CardMetadata, ProviderError> {
        (**self).card_details(card_name)
    }
}
