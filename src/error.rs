use thiserror::Error;

/// Errors parsing closed vocabularies (colors, card types, budget tiers).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown color symbol '{0}'")]
    ColorSymbol(String),
    #[error("unknown card type '{0}'")]
    CardType(String),
    #[error("invalid budget option: {0}")]
    Budget(String),
}

/// Errors reading an owned-card inventory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// The header row has no `Name` column.
    #[error("inventory has no 'Name' column")]
    MissingNameColumn,
    /// A row was handed over without a `Name` field.
    #[error("inventory row {row} has no 'Name' field")]
    MissingName { row: usize },
    /// The CSV stream could not be decoded.
    #[error("malformed inventory CSV{}: {message}", .line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Csv { line: Option<u64>, message: String },
}

impl From<csv::Error> for InventoryError {
    fn from(err: csv::Error) -> Self {
        InventoryError::Csv {
            line: err.position().map(|pos| pos.line()),
            message: err.to_string(),
        }
    }
}

/// Errors reported by a [`ReferenceDataProvider`](crate::provider::ReferenceDataProvider).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// A required key is absent from the reference payload.
    #[error("missing '{0}' in provided reference data")]
    MissingData(String),
    /// The provider does not know the card.
    #[error("missing card details for '{0}'")]
    UnknownCard(String),
    /// The provider could not be reached.
    #[error("reference data unavailable: {0}")]
    Unavailable(String),
    /// The provider answered with data that does not decode.
    #[error("malformed reference data: {0}")]
    Malformed(String),
}

/// Terminal outcome of a failed deck build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Rejected before any provider call was made.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("missing reference data: {0}")]
    MissingProviderData(String),
    #[error("unknown card '{0}'")]
    UnknownCard(String),
    #[error("reference data provider unavailable: {0}")]
    ProviderUnavailable(String),
}

impl From<ProviderError> for BuildError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::MissingData(key) => {
                BuildError::MissingProviderData(format!("missing '{key}'"))
            }
            ProviderError::Malformed(reason) => BuildError::MissingProviderData(reason),
            ProviderError::UnknownCard(name) => BuildError::UnknownCard(name),
            ProviderError::Unavailable(reason) => BuildError::ProviderUnavailable(reason),
        }
    }
}

impl From<InventoryError> for BuildError {
    fn from(err: InventoryError) -> Self {
        BuildError::InvalidInput(err.to_string())
    }
}

impl From<ParseError> for BuildError {
    fn from(err: ParseError) -> Self {
        BuildError::InvalidInput(err.to_string())
    }
}
