//! Basic-land fallback for missing lands.
//!
//! A land from the reference deck that the inventory cannot supply, and
//! that has no owned similar card, is treated as fungible: one basic land of
//! a random commander color takes its slot.

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::color::{Color, ColorSet};
use crate::deck::WorkingDeck;

/// True for the five basic land names. These never need to be owned.
pub fn is_basic_land(name: &str) -> bool {
    Color::ALL
        .iter()
        .any(|color| color.basic_land_name() == name)
}

/// Adds one basic land of a color chosen uniformly from `identity`.
///
/// Returns the land added, or `None` for a colorless identity, which has no
/// basic land to choose from.
pub fn add_basic_land<R: Rng + ?Sized>(
    identity: ColorSet,
    deck: &mut WorkingDeck,
    rng: &mut R,
) -> Option<&'static str> {
    let colors: Vec<Color> = identity.iter().collect();
    let land = colors.choose(rng)?.basic_land_name();
    deck.add_copies(land, 1);
    Some(land)
}
