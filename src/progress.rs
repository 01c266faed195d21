//! Build progress reporting.
//!
//! A build can report what it is doing through a channel owned by the
//! caller. Nothing here is global: each build gets its own sender, and a
//! caller that stops listening does not affect the build.

use std::sync::mpsc::Sender;

use tracing::trace;

use crate::types::CardType;

/// How an unavailable reference card was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstitutionKind {
    /// An owned card from the similar-cards list.
    Similar,
    /// A missing land replaced by a basic land.
    BasicLand,
    /// A popular owned card of the same primary type.
    TypeFallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildProgress {
    /// The reference deck was found under `commander_name`.
    ReferenceResolved { commander_name: String, cards: usize },
    /// Reference cards split into owned and unavailable.
    InventoryFiltered { kept: usize, unavailable: usize },
    /// Similarity search for card `index` of `total` (1-based).
    Checking {
        index: usize,
        total: usize,
        card: String,
    },
    Substituted {
        original: String,
        replacement: String,
        kind: SubstitutionKind,
    },
    /// Popularity fallback for one type bucket.
    TypeFallback {
        card_type: CardType,
        missing: usize,
        replaced: usize,
    },
    Finished { deck_size: u32, unavailable: usize },
}

/// Optional sending half of a progress channel.
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    sender: Option<Sender<BuildProgress>>,
}

impl ProgressReporter {
    pub fn new(sender: Sender<BuildProgress>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn report(&self, event: BuildProgress) {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send(event).is_err() {
            trace!("progress receiver dropped");
        }
    }
}
