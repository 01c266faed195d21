use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseError;

/// Primary card type, as used for type-bucketed popularity lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CardType {
    Creature,
    Sorcery,
    Land,
    Instant,
    Enchantment,
    Artifact,
    Planeswalker,
    Battle,
}

impl CardType {
    pub const ALL: [CardType; 8] = [
        CardType::Creature,
        CardType::Sorcery,
        CardType::Land,
        CardType::Instant,
        CardType::Enchantment,
        CardType::Artifact,
        CardType::Planeswalker,
        CardType::Battle,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            CardType::Creature => "Creature",
            CardType::Sorcery => "Sorcery",
            CardType::Land => "Land",
            CardType::Instant => "Instant",
            CardType::Enchantment => "Enchantment",
            CardType::Artifact => "Artifact",
            CardType::Planeswalker => "Planeswalker",
            CardType::Battle => "Battle",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        CardType::ALL
            .into_iter()
            .find(|card_type| card_type.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseError::CardType(s.to_string()))
    }
}

impl Serialize for CardType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CardType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Which variant of the average deck to request from the reference data.
///
/// Only changes the query; assembly itself is identical for every tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BudgetTier {
    #[default]
    Regular,
    Budget,
    Expansive,
}

impl BudgetTier {
    /// The provider query value; `None` selects the regular list.
    pub const fn query_value(self) -> Option<&'static str> {
        match self {
            BudgetTier::Regular => None,
            BudgetTier::Budget => Some("budget"),
            BudgetTier::Expansive => Some("expansive"),
        }
    }

    /// Parses an optional form token. Missing or blank means `Regular`.
    pub fn from_token(token: Option<&str>) -> Result<Self, ParseError> {
        match token.map(str::trim) {
            None | Some("") => Ok(BudgetTier::Regular),
            Some(raw) => raw.parse(),
        }
    }
}

impl FromStr for BudgetTier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regular" => Ok(BudgetTier::Regular),
            "budget" => Ok(BudgetTier::Budget),
            "expansive" => Ok(BudgetTier::Expansive),
            _ => Err(ParseError::Budget(s.to_ascii_uppercase())),
        }
    }
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query_value().unwrap_or("regular"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_type_parses_case_insensitively() {
        assert_eq!("creature".parse::<CardType>(), Ok(CardType::Creature));
        assert_eq!(" Planeswalker ".parse::<CardType>(), Ok(CardType::Planeswalker));
        assert_eq!(
            "Kindred".parse::<CardType>(),
            Err(ParseError::CardType("Kindred".to_string()))
        );
    }

    #[test]
    fn card_type_serializes_as_display_name() {
        assert_eq!(serde_json::to_string(&CardType::Land).unwrap(), r#""Land""#);
        let parsed: CardType = serde_json::from_str(r#""artifact""#).unwrap();
        assert_eq!(parsed, CardType::Artifact);
    }

    #[test]
    fn budget_tokens() {
        assert_eq!(BudgetTier::from_token(None), Ok(BudgetTier::Regular));
        assert_eq!(BudgetTier::from_token(Some("  ")), Ok(BudgetTier::Regular));
        assert_eq!(BudgetTier::from_token(Some("BUDGET")), Ok(BudgetTier::Budget));
        assert_eq!(
            BudgetTier::from_token(Some("expansive")),
            Ok(BudgetTier::Expansive)
        );
        assert_eq!(
            BudgetTier::from_token(Some("cheap")),
            Err(ParseError::Budget("CHEAP".to_string()))
        );
    }

    #[test]
    fn budget_query_values() {
        assert_eq!(BudgetTier::Regular.query_value(), None);
        assert_eq!(BudgetTier::Budget.query_value(), Some("budget"));
        assert_eq!(BudgetTier::Expansive.query_value(), Some("expansive"));
    }
}
