use std::collections::HashMap;
use std::io::Read;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{CardList, CardMetadata, CardSummary, ReferenceDataProvider};
use crate::color::ColorSet;
use crate::deck::ReferenceDeck;
use crate::error::{ParseError, ProviderError};
use crate::types::{BudgetTier, CardType};

/// Provider backed by a reference document fetched ahead of time.
///
/// Expected shape:
///
/// ```json
/// {
///   "avg_deck": {"Sol Ring": 1, "Forest": 5},
///   "card_list": {"cards": {"Card": {"primary_type": "Creature", "color_identity": ["G"]}}},
///   "top_cards_by_type": {"Creature": [{"name": "...", "color_identity": []}]},
///   "similar": {"Missing Card": [{"name": "...", "color_identity": []}]},
///   "card_details": {"Card": {"type": "Land", "color_identity": []}}
/// }
/// ```
///
/// Only `avg_deck` is required. It may also be a list of `{"name", "count"}`
/// objects or of `"2 Card Name"` lines. The document describes a single
/// commander, so the commander/theme/budget arguments do not select anything.
#[derive(Debug, Clone, Default)]
pub struct PayloadProvider {
    payload: Payload,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Payload {
    #[serde(default)]
    avg_deck: Option<AvgDeckPayload>,
    #[serde(default)]
    card_list: CardListPayload,
    #[serde(default)]
    top_cards_by_type: HashMap<String, Vec<SummaryPayload>>,
    #[serde(default)]
    similar: HashMap<String, Vec<SummaryPayload>>,
    #[serde(default)]
    card_details: HashMap<String, DetailsPayload>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum AvgDeckPayload {
    Counts(Map<String, Value>),
    Lines(Vec<DeckLinePayload>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum DeckLinePayload {
    Entry { name: String, count: CountPayload },
    Line(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum CountPayload {
    Number(u32),
    Text(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CardListPayload {
    #[serde(default)]
    cards: HashMap<String, Option<DetailsPayload>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum SummaryPayload {
    Name(String),
    Full(CardSummary),
}

#[derive(Debug, Clone, Deserialize)]
struct DetailsPayload {
    #[serde(rename = "type", default)]
    type_line: Option<String>,
    #[serde(default)]
    primary_type: Option<String>,
    #[serde(default)]
    color_identity: ColorSet,
}

impl PayloadProvider {
    pub fn from_value(value: Value) -> Result<Self, ProviderError> {
        let payload = serde_json::from_value(value).map_err(malformed)?;
        Ok(Self { payload })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ProviderError> {
        let payload = serde_json::from_str(json).map_err(malformed)?;
        Ok(Self { payload })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ProviderError> {
        let payload = serde_json::from_reader(reader).map_err(malformed)?;
        Ok(Self { payload })
    }
}

fn malformed(err: serde_json::Error) -> ProviderError {
    ProviderError::Malformed(err.to_string())
}

impl CountPayload {
    fn value(&self, card: &str) -> Result<u32, ProviderError> {
        match self {
            CountPayload::Number(n) => Ok(*n),
            CountPayload::Text(text) => text.trim().parse().map_err(|_| {
                ProviderError::Malformed(format!("invalid count '{text}' for '{card}'"))
            }),
        }
    }
}

impl AvgDeckPayload {
    fn to_deck(&self) -> Result<ReferenceDeck, ProviderError> {
        let mut deck = ReferenceDeck::new();
        match self {
            AvgDeckPayload::Counts(counts) => {
                for (name, raw) in counts {
                    let count = CountPayload::deserialize(raw)
                        .map_err(|_| {
                            ProviderError::Malformed(format!("invalid count {raw} for '{name}'"))
                        })?
                        .value(name)?;
                    deck.insert(name.as_str(), count);
                }
            }
            AvgDeckPayload::Lines(lines) => {
                for line in lines {
                    match line {
                        DeckLinePayload::Entry { name, count } => {
                            deck.insert(name.as_str(), count.value(name)?);
                        }
                        DeckLinePayload::Line(text) => match parse_deck_line(text) {
                            Some((count, name)) => deck.insert(name, count),
                            None => debug!(line = %text, "skipping non-card decklist line"),
                        },
                    }
                }
            }
        }
        Ok(deck)
    }
}

/// Parses `"2 Card Name"`. Lines without a leading count are not cards
/// (section headers, comments).
fn parse_deck_line(line: &str) -> Option<(u32, &str)> {
    let (count, name) = line.trim().split_once(' ')?;
    if count.is_empty() || !count.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let count = count.parse().ok()?;
    Some((count, name.trim()))
}

/// Accepts a bare type ("Creature") or a type line ("Legendary Artifact
/// Creature — Golem"); for multi-typed lines the rightmost type wins.
fn parse_card_type(raw: &str) -> Result<CardType, ParseError> {
    if let Ok(card_type) = raw.parse() {
        return Ok(card_type);
    }
    let types = raw.split(['—', '-']).next().unwrap_or_default();
    types
        .split_whitespace()
        .rev()
        .find_map(|word| word.parse().ok())
        .ok_or_else(|| ParseError::CardType(raw.to_string()))
}

impl DetailsPayload {
    fn metadata(&self, primary_first: bool) -> Result<CardMetadata, ParseError> {
        let (first, second) = if primary_first {
            (&self.primary_type, &self.type_line)
        } else {
            (&self.type_line, &self.primary_type)
        };
        let raw = first
            .as_deref()
            .or(second.as_deref())
            .ok_or_else(|| ParseError::CardType(String::new()))?;
        Ok(CardMetadata::new(
            parse_card_type(raw)?,
            self.color_identity,
        ))
    }
}

impl SummaryPayload {
    fn to_summary(&self) -> CardSummary {
        match self {
            SummaryPayload::Name(name) => CardSummary::new(name.as_str(), ColorSet::COLORLESS),
            SummaryPayload::Full(summary) => summary.clone(),
        }
    }
}

impl ReferenceDataProvider for PayloadProvider {
    fn avg_deck(
        &self,
        _commander_name: &str,
        _theme: Option<&str>,
        _budget: BudgetTier,
    ) -> Result<ReferenceDeck, ProviderError> {
        self.payload
            .avg_deck
            .as_ref()
            .ok_or_else(|| ProviderError::MissingData("avg_deck".to_string()))?
            .to_deck()
    }

    fn card_list(&self, names: &[String]) -> Result<CardList, ProviderError> {
        let mut cards = Vec::new();
        for name in names {
            let Some(Some(details)) = self.payload.card_list.cards.get(name) else {
                continue;
            };
            match details.metadata(true) {
                Ok(metadata) => cards.push((name.clone(), metadata)),
                Err(err) => warn!(card = %name, error = %err, "skipping card with unusable type"),
            }
        }
        Ok(CardList { cards })
    }

    fn top_cards_for_type(
        &self,
        _commander_name: &str,
        card_type: CardType,
    ) -> Result<Vec<CardSummary>, ProviderError> {
        let by_type = &self.payload.top_cards_by_type;
        let list = by_type.get(card_type.as_str()).or_else(|| {
            by_type
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(card_type.as_str()))
                .map(|(_, list)| list)
        });
        Ok(list
            .map(|list| list.iter().map(SummaryPayload::to_summary).collect())
            .unwrap_or_default())
    }

    fn similar(&self, card_name: &str) -> Result<Vec<CardSummary>, ProviderError> {
        Ok(self
            .payload
            .similar
            .get(card_name)
            .map(|list| list.iter().map(SummaryPayload::to_summary).collect())
            .unwrap_or_default())
    }

    fn card_details(&self, card_name: &str) -> Result<CardMetadata, ProviderError> {
        let details = self
            .payload
            .card_details
            .get(card_name)
            .ok_or_else(|| ProviderError::UnknownCard(card_name.to_string()))?;
        details
            .metadata(false)
            .map_err(|err| ProviderError::Malformed(format!("'{card_name}': {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn avg_deck_from_count_map_keeps_order() {
        let provider = PayloadProvider::from_value(json!({
            "avg_deck": {"Sol Ring": 1, "Forest": "5", "Arcane Signet": 1}
        }))
        .unwrap();
        let deck = provider.avg_deck("Zur", None, BudgetTier::Regular).unwrap();
        let entries: Vec<_> = deck.iter().collect();
        assert_eq!(
            entries,
            vec![("Sol Ring", 1), ("Forest", 5), ("Arcane Signet", 1)]
        );
    }

    #[test]
    fn avg_deck_from_entries_and_lines() {
        let provider = PayloadProvider::from_value(json!({
            "avg_deck": [
                {"name": "Sol Ring", "count": 1},
                "12 Island",
                "// Lands",
                "Commander"
            ]
        }))
        .unwrap();
        let deck = provider.avg_deck("Zur", None, BudgetTier::Budget).unwrap();
        assert_eq!(deck.len(), 2);
        assert_eq!(deck.count("Island"), 12);
        assert_eq!(deck.count("Sol Ring"), 1);
    }

    #[test]
    fn missing_avg_deck_is_missing_data() {
        let provider = PayloadProvider::from_value(json!({"similar": {}})).unwrap();
        assert_eq!(
            provider.avg_deck("Zur", None, BudgetTier::Regular),
            Err(ProviderError::MissingData("avg_deck".to_string()))
        );
    }

    #[test]
    fn bad_count_is_malformed() {
        let provider = PayloadProvider::from_value(json!({"avg_deck": {"Sol Ring": "lots"}}))
            .unwrap();
        assert!(matches!(
            provider.avg_deck("Zur", None, BudgetTier::Regular),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[test]
    fn not_json_is_malformed() {
        assert!(matches!(
            PayloadProvider::from_json_str("{not json"),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[test]
    fn card_details_and_unknown_cards() {
        let provider = PayloadProvider::from_value(json!({
            "avg_deck": {},
            "card_details": {
                "Command Tower": {"type": "Land", "color_identity": []},
                "Zur the Enchanter": {"type": "Legendary Creature — Human Wizard", "color_identity": ["W", "U", "B"]},
            }
        }))
        .unwrap();

        let tower = provider.card_details("Command Tower").unwrap();
        assert_eq!(tower.card_type, CardType::Land);
        assert!(tower.color_identity.is_empty());

        let zur = provider.card_details("Zur the Enchanter").unwrap();
        assert_eq!(zur.card_type, CardType::Creature);
        assert_eq!(zur.color_identity.iter().count(), 3);

        assert_eq!(
            provider.card_details("Nope"),
            Err(ProviderError::UnknownCard("Nope".to_string()))
        );
    }

    #[test]
    fn card_list_filters_to_requested_names_in_order() {
        let provider = PayloadProvider::from_value(json!({
            "avg_deck": {},
            "card_list": {"cards": {
                "Rhystic Study": {"primary_type": "Enchantment", "color_identity": ["U"]},
                "Llanowar Elves": {"primary_type": "Creature", "color_identity": ["G"]},
                "Weird Thing": {"primary_type": "Scheme"},
                "Unset": null
            }}
        }))
        .unwrap();
        let names: Vec<String> = ["Llanowar Elves", "Missing", "Weird Thing", "Unset", "Rhystic Study"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let list = provider.card_list(&names).unwrap();
        let found: Vec<&str> = list.cards.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(found, vec!["Llanowar Elves", "Rhystic Study"]);
        assert_eq!(
            list.get("Rhystic Study").map(|m| m.card_type),
            Some(CardType::Enchantment)
        );
    }

    #[test]
    fn summaries_accept_bare_names() {
        let provider = PayloadProvider::from_value(json!({
            "avg_deck": {},
            "top_cards_by_type": {"creature": ["Llanowar Elves", {"name": "Birds of Paradise", "color_identity": ["G"]}]},
            "similar": {"Fire-Ice": [{"name": "Lightning Bolt", "color_identity": ["R"]}]}
        }))
        .unwrap();

        let top = provider.top_cards_for_type("Zur", CardType::Creature).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "Llanowar Elves");
        assert_eq!(top[1].color_identity, ColorSet::GREEN);
        assert!(provider.top_cards_for_type("Zur", CardType::Land).unwrap().is_empty());

        let similar = provider.similar("Fire-Ice").unwrap();
        assert_eq!(similar[0].name, "Lightning Bolt");
        assert!(provider.similar("Fire // Ice").unwrap().is_empty());
    }

    #[test]
    fn deck_lines() {
        assert_eq!(parse_deck_line("1 Sol Ring"), Some((1, "Sol Ring")));
        assert_eq!(parse_deck_line("  10 Snow-Covered Island "), Some((10, "Snow-Covered Island")));
        assert_eq!(parse_deck_line("Sol Ring"), None);
        assert_eq!(parse_deck_line("1x Sol Ring"), None);
    }

    #[test]
    fn type_lines() {
        assert_eq!(parse_card_type("Instant"), Ok(CardType::Instant));
        assert_eq!(parse_card_type("Artifact Creature — Golem"), Ok(CardType::Creature));
        assert_eq!(parse_card_type("Legendary Enchantment - Aura"), Ok(CardType::Enchantment));
        assert!(parse_card_type("Scheme").is_err());
    }
}
