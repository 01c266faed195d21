//! Deck assembly.
//!
//! A build turns a reference decklist into a deck made only of owned cards:
//!
//! 1. Resolve the reference deck (partner pairs are retried in reverse order).
//! 2. Keep every reference card the inventory has, plus basic lands.
//! 3. For each missing card, take the first owned, color-legal, unused card
//!    from its similar-cards list; missing lands fall back to a basic land.
//! 4. Whatever is still missing is bucketed by primary type and replaced by
//!    the most popular owned cards of that type; leftovers become suggestions.
//!
//! Every scan is first-match in provider order. Given the same reference
//! data and the same randomness source, a build is reproducible.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::mpsc::Sender;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::basic_land::{add_basic_land, is_basic_land};
use crate::color::{ColorSet, is_legal};
use crate::deck::{ReferenceDeck, WorkingDeck};
use crate::error::{BuildError, ProviderError};
use crate::inventory::InventoryIndex;
use crate::names::{fold_ascii, lookup_key, presentation_name};
use crate::progress::{BuildProgress, ProgressReporter, SubstitutionKind};
use crate::provider::{CardSummary, ReferenceDataProvider};
use crate::types::{BudgetTier, CardType};

/// What to build: a commander, an optional partner, theme and budget tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub commander: String,
    pub partner: Option<String>,
    pub theme: Option<String>,
    pub budget: BudgetTier,
}

impl BuildRequest {
    pub fn new(commander: impl Into<String>) -> Self {
        Self {
            commander: commander.into().trim().to_string(),
            partner: None,
            theme: None,
            budget: BudgetTier::Regular,
        }
    }

    /// Builder pattern: set the partner commander. Blank means none.
    pub fn with_partner(mut self, partner: impl Into<String>) -> Self {
        let partner = partner.into().trim().to_string();
        self.partner = (!partner.is_empty()).then_some(partner);
        self
    }

    /// Builder pattern: set the theme. Themes are lowercase; blank means none.
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        let theme = theme.into().trim().to_lowercase();
        self.theme = (!theme.is_empty()).then_some(theme);
        self
    }

    pub fn with_budget(mut self, budget: BudgetTier) -> Self {
        self.budget = budget;
        self
    }

    /// Builds a validated request from raw form values.
    pub fn from_form(
        commander: &str,
        partner: Option<&str>,
        theme: Option<&str>,
        budget: Option<&str>,
    ) -> Result<Self, BuildError> {
        let mut request = Self::new(commander).with_budget(BudgetTier::from_token(budget)?);
        if let Some(partner) = partner {
            request = request.with_partner(partner);
        }
        if let Some(theme) = theme {
            request = request.with_theme(theme);
        }
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), BuildError> {
        if self.commander.trim().is_empty() {
            return Err(BuildError::InvalidInput("Commander is required".to_string()));
        }
        Ok(())
    }

    /// Reference-data key for the commander (`"A"` or `"A-B"`).
    pub fn commander_name(&self) -> String {
        match &self.partner {
            Some(partner) => format!("{}-{}", self.commander, partner),
            None => self.commander.clone(),
        }
    }

    /// The partner pair in the other order, if there is a partner.
    pub fn reversed_commander_name(&self) -> Option<String> {
        self.partner
            .as_ref()
            .map(|partner| format!("{}-{}", partner, self.commander))
    }
}

/// One resolved reference card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Substitution {
    pub original: String,
    pub replacement: String,
    pub kind: SubstitutionKind,
}

/// Outcome of a build: the deck plus what could not be supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeckResult {
    pub deck: WorkingDeck,
    pub deck_size: u32,
    /// Reference-data key the deck was found under.
    pub commander_name: String,
    pub unavailable_cards: Vec<String>,
    pub unavailable_cards_by_type: BTreeMap<CardType, Vec<String>>,
    /// Owned popular cards left over after type fallback, for manual picks.
    pub extra_cards_by_type: BTreeMap<CardType, Vec<CardSummary>>,
    pub substitutions: Vec<Substitution>,
}

impl fmt::Display for DeckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Deck:")?;
        write!(f, "{}", self.deck)?;
        writeln!(f, "Deck total size: {}", self.deck_size)?;
        if !self.unavailable_cards.is_empty() {
            writeln!(f, "\nUnavailable cards:")?;
            for card in &self.unavailable_cards {
                writeln!(f, "  {}", card)?;
            }
        }
        for (card_type, extras) in &self.extra_cards_by_type {
            if extras.is_empty() {
                continue;
            }
            writeln!(f, "\nOther owned {} options:", card_type)?;
            for card in extras {
                writeln!(f, "  {}", card.name)?;
            }
        }
        Ok(())
    }
}

/// The deck being built, plus the lookup key of every card placed in it.
///
/// Membership goes by lookup key so that an accented spelling or the front
/// face of a card already in the deck counts as the same card.
#[derive(Debug, Default)]
struct DeckInProgress {
    deck: WorkingDeck,
    placed: HashSet<String>,
}

impl DeckInProgress {
    fn place(&mut self, name: impl Into<String>, count: u32) {
        let name = name.into();
        self.placed.insert(lookup_key(&name));
        self.deck.insert(name, count);
    }

    fn holds(&self, name: &str) -> bool {
        self.placed.contains(&lookup_key(name))
    }
}

/// Result of the type-popularity stage.
#[derive(Debug, Default)]
struct TypeFallback {
    replaced: HashSet<String>,
    unavailable_by_type: BTreeMap<CardType, Vec<String>>,
    extras_by_type: BTreeMap<CardType, Vec<CardSummary>>,
}

/// Assembles decks from one inventory against one reference provider.
///
/// `R` is the randomness source for basic-land colors; it defaults to an
/// OS-seeded [`StdRng`]. Use [`DeckAssembler::with_seed`] or
/// [`DeckAssembler::with_rng`] for reproducible builds.
pub struct DeckAssembler<P, R = StdRng> {
    provider: P,
    inventory: InventoryIndex,
    rng: R,
    progress: ProgressReporter,
}

impl<P: ReferenceDataProvider> DeckAssembler<P> {
    pub fn new(provider: P, inventory: InventoryIndex) -> Self {
        Self {
            provider,
            inventory,
            rng: StdRng::from_os_rng(),
            progress: ProgressReporter::disabled(),
        }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<P: ReferenceDataProvider, R: Rng> DeckAssembler<P, R> {
    /// Replaces the randomness source.
    pub fn with_rng<R2: Rng>(self, rng: R2) -> DeckAssembler<P, R2> {
        DeckAssembler {
            provider: self.provider,
            inventory: self.inventory,
            rng,
            progress: self.progress,
        }
    }

    /// Reports progress of subsequent builds to `sender`.
    pub fn with_progress(mut self, sender: Sender<BuildProgress>) -> Self {
        self.progress = ProgressReporter::new(sender);
        self
    }

    pub fn inventory(&self) -> &InventoryIndex {
        &self.inventory
    }

    /// Convenience wrapper around [`DeckAssembler::build`].
    pub fn build_for(
        &mut self,
        commander: &str,
        partner: Option<&str>,
        theme: Option<&str>,
        budget: BudgetTier,
    ) -> Result<DeckResult, BuildError> {
        let mut request = BuildRequest::new(commander).with_budget(budget);
        if let Some(partner) = partner {
            request = request.with_partner(partner);
        }
        if let Some(theme) = theme {
            request = request.with_theme(theme);
        }
        self.build(&request)
    }

    /// Builds a deck for `request`.
    ///
    /// Fails on invalid input (before any provider call), when no reference
    /// deck exists for the commander, and on any provider failure except an
    /// unknown card during similarity substitution, which leaves that card
    /// unavailable.
    pub fn build(&mut self, request: &BuildRequest) -> Result<DeckResult, BuildError> {
        request.validate()?;

        let (commander_name, reference) = self.resolve_reference_deck(request)?;
        let (mut working, unavailable) = self.filter_by_inventory(&reference);
        let mut substitutions = Vec::new();

        let unavailable = if unavailable.is_empty() {
            unavailable
        } else {
            let identity = self.commander_identity(request)?;
            self.substitute_similar(identity, unavailable, &mut working, &mut substitutions)?
        };

        let fallback = if unavailable.is_empty() {
            TypeFallback::default()
        } else {
            self.fill_from_top_cards(
                &commander_name,
                &unavailable,
                &mut working,
                &mut substitutions,
            )?
        };
        let deck = working.deck;

        let unavailable_cards: Vec<String> = unavailable
            .into_iter()
            .filter(|card| !fallback.replaced.contains(card))
            .collect();
        let deck_size = deck.total();

        info!(
            commander = %commander_name,
            deck_size,
            unavailable = unavailable_cards.len(),
            "deck assembled"
        );
        self.progress.report(BuildProgress::Finished {
            deck_size,
            unavailable: unavailable_cards.len(),
        });

        Ok(DeckResult {
            deck,
            deck_size,
            commander_name,
            unavailable_cards,
            unavailable_cards_by_type: fallback.unavailable_by_type,
            extra_cards_by_type: fallback.extras_by_type,
            substitutions,
        })
    }

    /// Step 1: fetch the reference deck, retrying partner pairs reversed.
    fn resolve_reference_deck(
        &self,
        request: &BuildRequest,
    ) -> Result<(String, ReferenceDeck), BuildError> {
        let theme = request.theme.as_deref();
        let mut candidates = vec![request.commander_name()];
        candidates.extend(request.reversed_commander_name());

        for commander_name in candidates {
            let reference = self
                .provider
                .avg_deck(&commander_name, theme, request.budget)?;
            if reference.is_empty() {
                debug!(commander = %commander_name, "no average deck under this name");
                continue;
            }
            info!(
                commander = %commander_name,
                cards = reference.len(),
                budget = %request.budget,
                "resolved average deck"
            );
            self.progress.report(BuildProgress::ReferenceResolved {
                commander_name: commander_name.clone(),
                cards: reference.len(),
            });
            return Ok((commander_name, reference));
        }

        Err(BuildError::MissingProviderData(format!(
            "no average deck for '{}'",
            request.commander_name()
        )))
    }

    /// Step 2: partition the reference deck into owned cards and the rest.
    fn filter_by_inventory(&self, reference: &ReferenceDeck) -> (DeckInProgress, Vec<String>) {
        let mut working = DeckInProgress::default();
        let mut unavailable = Vec::new();
        for (name, count) in reference.iter() {
            if self.inventory.contains(name) || is_basic_land(name) {
                working.place(fold_ascii(name), count);
            } else {
                unavailable.push(name.to_string());
            }
        }
        let kept = working.deck.len();
        info!(kept, unavailable = unavailable.len(), "filtered by inventory");
        self.progress.report(BuildProgress::InventoryFiltered {
            kept,
            unavailable: unavailable.len(),
        });
        (working, unavailable)
    }

    fn commander_identity(&self, request: &BuildRequest) -> Result<ColorSet, BuildError> {
        let mut identity = self.provider.card_details(&request.commander)?.color_identity;
        if let Some(partner) = &request.partner {
            identity = identity.union(self.provider.card_details(partner)?.color_identity);
        }
        debug!(identity = %identity, "commander color identity");
        Ok(identity)
    }

    /// Step 3: similarity substitution, then basic lands for missing lands.
    /// Returns the cards that are still unavailable, in order.
    fn substitute_similar(
        &mut self,
        identity: ColorSet,
        unavailable: Vec<String>,
        working: &mut DeckInProgress,
        substitutions: &mut Vec<Substitution>,
    ) -> Result<Vec<String>, BuildError> {
        let total = unavailable.len();
        let mut still_unavailable = Vec::new();

        for (index, card) in unavailable.into_iter().enumerate() {
            info!("Checking {}/{} - {}", index + 1, total, card);
            self.progress.report(BuildProgress::Checking {
                index: index + 1,
                total,
                card: card.clone(),
            });

            if let Some(similar) = self.find_similar(&card, identity, working)? {
                info!("Found {} similar to {}", similar, card);
                working.place(similar.as_str(), 1);
                self.record(substitutions, card, similar, SubstitutionKind::Similar);
                continue;
            }

            let details = match self.provider.card_details(&presentation_name(&card)) {
                Ok(details) => details,
                Err(ProviderError::UnknownCard(name)) => {
                    warn!(card = %card, lookup = %name, "no card details; leaving unavailable");
                    still_unavailable.push(card);
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            if details.card_type != CardType::Land {
                info!("Did not find a replacement for {}", card);
                still_unavailable.push(card);
                continue;
            }

            match add_basic_land(identity, &mut working.deck, &mut self.rng) {
                Some(land) => {
                    info!("{} is a land, replace with {}", card, land);
                    working.placed.insert(lookup_key(land));
                    self.record(substitutions, card, land.to_string(), SubstitutionKind::BasicLand);
                }
                None => {
                    warn!(card = %card, "colorless commander has no basic land to substitute");
                    still_unavailable.push(card);
                }
            }
        }

        Ok(still_unavailable)
    }

    /// First similar card that is legal, unused and owned.
    fn find_similar(
        &self,
        card: &str,
        identity: ColorSet,
        working: &DeckInProgress,
    ) -> Result<Option<String>, BuildError> {
        let candidates = self.provider.similar(&presentation_name(card))?;
        Ok(candidates
            .into_iter()
            .find(|candidate| {
                is_legal(candidate.color_identity, identity)
                    && !working.holds(&candidate.name)
                    && self.inventory.contains(&candidate.name)
            })
            .map(|candidate| candidate.name))
    }

    /// Step 4: replace remaining cards with popular owned cards of their type.
    fn fill_from_top_cards(
        &self,
        commander_name: &str,
        unavailable: &[String],
        working: &mut DeckInProgress,
        substitutions: &mut Vec<Substitution>,
    ) -> Result<TypeFallback, BuildError> {
        let card_list = self.provider.card_list(unavailable)?;

        // Buckets in order of first appearance.
        let mut buckets: Vec<(CardType, Vec<String>)> = Vec::new();
        for card in unavailable {
            let Some(metadata) = card_list.get(card) else {
                debug!(card = %card, "no metadata for type fallback");
                continue;
            };
            match buckets.iter_mut().find(|(t, _)| *t == metadata.card_type) {
                Some((_, cards)) => cards.push(card.clone()),
                None => buckets.push((metadata.card_type, vec![card.clone()])),
            }
        }

        let mut fallback = TypeFallback::default();
        for (card_type, missing) in buckets {
            let top_cards = self.provider.top_cards_for_type(commander_name, card_type)?;

            let mut replacements: Vec<String> = Vec::new();
            let mut extras: Vec<CardSummary> = Vec::new();
            for candidate in top_cards {
                if working.holds(&candidate.name) || !self.inventory.contains(&candidate.name) {
                    continue;
                }
                if replacements.len() < missing.len() {
                    working.place(candidate.name.as_str(), 1);
                    replacements.push(candidate.name);
                } else if !extras
                    .iter()
                    .any(|extra| lookup_key(&extra.name) == lookup_key(&candidate.name))
                {
                    extras.push(candidate);
                }
            }

            info!(
                card_type = %card_type,
                missing = missing.len(),
                replaced = replacements.len(),
                extras = extras.len(),
                "type fallback"
            );
            self.progress.report(BuildProgress::TypeFallback {
                card_type,
                missing: missing.len(),
                replaced: replacements.len(),
            });

            let mut missing = missing.into_iter();
            for replacement in replacements {
                if let Some(original) = missing.next() {
                    fallback.replaced.insert(original.clone());
                    let kind = SubstitutionKind::TypeFallback;
                    self.record(substitutions, original, replacement, kind);
                }
            }
            let still_missing: Vec<String> = missing.collect();
            if !still_missing.is_empty() {
                fallback.unavailable_by_type.insert(card_type, still_missing);
            }
            fallback.extras_by_type.insert(card_type, extras);
        }

        Ok(fallback)
    }

    fn record(
        &self,
        substitutions: &mut Vec<Substitution>,
        original: String,
        replacement: String,
        kind: SubstitutionKind,
    ) {
        self.progress.report(BuildProgress::Substituted {
            original: original.clone(),
            replacement: replacement.clone(),
            kind,
        });
        substitutions.push(Substitution {
            original,
            replacement,
            kind,
        });
    }
}
