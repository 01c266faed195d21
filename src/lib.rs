//! edhforge - commander decks from the cards you own.
//!
//! Starts from a community average decklist for a commander and rewrites it
//! against an inventory: owned cards are kept, missing ones are replaced by
//! owned similar cards, basic lands, or popular owned cards of the same type.
//!
//! ```ignore
//! let inventory = InventoryIndex::from_reader(File::open("cards.csv")?)?;
//! let provider = PayloadProvider::from_reader(File::open("payload.json")?)?;
//! let mut assembler = DeckAssembler::new(provider, inventory).with_seed(7);
//! let result = assembler.build(&BuildRequest::new("Zur the Enchanter"))?;
//! print!("{result}");
//! ```

pub mod assembler;
pub mod basic_land;
pub mod color;
pub mod deck;
pub mod error;
pub mod inventory;
pub mod names;
pub mod progress;
pub mod provider;
pub mod types;


pub use assembler::{BuildRequest, DeckAssembler, DeckResult, Substitution};
pub use basic_land::{add_basic_land, is_basic_land};
pub use color::{Color, ColorSet, is_legal};
pub use deck::{Decklist, ReferenceDeck, WorkingDeck};
pub use error::{BuildError, InventoryError, ParseError, ProviderError};
pub use inventory::{InventoryIndex, InventoryRow};
pub use names::{fold_ascii, lookup_key, presentation_name};
pub use progress::{BuildProgress, ProgressReporter, SubstitutionKind};
pub use provider::{CardList, CardMetadata, CardSummary, PayloadProvider, ReferenceDataProvider};
pub use types::{BudgetTier, CardType};
