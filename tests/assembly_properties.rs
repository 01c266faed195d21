use std::collections::HashSet;

use edhforge::{
    BuildRequest, Color, ColorSet, DeckAssembler, InventoryIndex, PayloadProvider,
    SubstitutionKind, is_legal, lookup_key,
};
use proptest::prelude::*;
use proptest::test_runner::Config;
use serde_json::{Map, Value, json};

const COMMANDER: &str = "Atraxa, Praetors' Voice";

fn color_set(bits: u8) -> ColorSet {
    Color::ALL
        .iter()
        .enumerate()
        .filter(|(i, _)| bits & (1 << i) != 0)
        .map(|(_, color)| *color)
        .collect()
}

/// Reference deck of `Card {i}`, owned where the flag is set, plus `spares`
/// owned creatures offered by the type fallback. Missing cards are all
/// listed as creatures.
fn scenario(cards: &[(bool, u32)], spares: usize) -> (PayloadProvider, InventoryIndex) {
    let mut avg_deck = Map::new();
    let mut listed = Map::new();
    let mut owned = Vec::new();
    for (i, &(is_owned, count)) in cards.iter().enumerate() {
        let name = format!("Card {i}");
        avg_deck.insert(name.clone(), json!(count));
        if is_owned {
            owned.push(name);
        } else {
            listed.insert(name, json!({"primary_type": "Creature", "color_identity": []}));
        }
    }
    let spare_names: Vec<String> = (0..spares).map(|j| format!("Spare {j}")).collect();
    owned.extend(spare_names.iter().cloned());

    let payload = json!({
        "avg_deck": Value::Object(avg_deck),
        "card_details": {
            COMMANDER: {"type": "Legendary Creature", "color_identity": ["W", "U", "B", "G"]}
        },
        "card_list": {"cards": Value::Object(listed)},
        "top_cards_by_type": {"Creature": spare_names}
    });
    (
        PayloadProvider::from_value(payload).expect("payload"),
        InventoryIndex::from_names(owned),
    )
}

/// One missing card whose similar-cards pool is `pool`, every candidate
/// owned, under a commander of identity `commander`.
fn similar_pool_scenario(
    commander: ColorSet,
    pool: &[ColorSet],
) -> (PayloadProvider, InventoryIndex) {
    let candidates: Vec<Value> = pool
        .iter()
        .enumerate()
        .map(|(j, identity)| {
            json!({"name": format!("Candidate {j}"), "color_identity": identity})
        })
        .collect();
    let payload = json!({
        "avg_deck": {"Missing Card": 1},
        "card_details": {
            COMMANDER: {"type": "Legendary Creature", "color_identity": commander}
        },
        "similar": {"Missing Card": candidates}
    });
    let owned = (0..pool.len()).map(|j| format!("Candidate {j}"));
    (
        PayloadProvider::from_value(payload).expect("payload"),
        InventoryIndex::from_names(owned),
    )
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn legality_is_subset(candidate in 0u8..32, commander in 0u8..32) {
        let candidate = color_set(candidate);
        let commander = color_set(commander);
        let expected = candidate.iter().all(|color| commander.contains(color));
        prop_assert_eq!(is_legal(candidate, commander), expected);
    }

    #[test]
    fn similar_substitutes_stay_inside_commander_identity(
        commander in 0u8..32,
        pool in prop::collection::vec(0u8..32, 0..8),
        seed in any::<u64>(),
    ) {
        let commander = color_set(commander);
        let pool: Vec<ColorSet> = pool.into_iter().map(color_set).collect();
        let (provider, inventory) = similar_pool_scenario(commander, &pool);
        let result = DeckAssembler::new(provider, inventory)
            .with_seed(seed)
            .build(&BuildRequest::new(COMMANDER))
            .expect("build");

        let similar: Vec<&str> = result
            .substitutions
            .iter()
            .filter(|s| s.kind == SubstitutionKind::Similar)
            .map(|s| s.replacement.as_str())
            .collect();
        for replacement in &similar {
            let index: usize = replacement
                .trim_start_matches("Candidate ")
                .parse()
                .expect("candidate index");
            prop_assert!(is_legal(pool[index], commander), "{} is off-color", replacement);
        }

        let first_legal = pool.iter().position(|identity| is_legal(*identity, commander));
        let expected = first_legal.map(|j| format!("Candidate {j}"));
        prop_assert_eq!(similar.first().map(|name| name.to_string()), expected);
    }

    #[test]
    fn lookup_key_is_idempotent(name in "\\PC{0,24}( // \\PC{0,12})?") {
        let key = lookup_key(&name);
        prop_assert_eq!(lookup_key(&key), key.clone());
        prop_assert!(key.is_ascii());
    }

    #[test]
    fn every_reference_card_lands_in_exactly_one_place(
        cards in prop::collection::vec((any::<bool>(), 1u32..4), 1..30),
        spares in 0usize..6,
        seed in any::<u64>(),
    ) {
        let (provider, inventory) = scenario(&cards, spares);
        let result = DeckAssembler::new(provider, inventory)
            .with_seed(seed)
            .build(&BuildRequest::new(COMMANDER))
            .expect("build");

        let missing = cards.iter().filter(|(owned, _)| !owned).count();
        let replaced: HashSet<&str> = result
            .substitutions
            .iter()
            .map(|s| s.original.as_str())
            .collect();
        prop_assert_eq!(replaced.len(), missing.min(spares));
        prop_assert_eq!(result.unavailable_cards.len(), missing - replaced.len());

        for (i, &(owned, count)) in cards.iter().enumerate() {
            let name = format!("Card {i}");
            let in_deck = result.deck.contains(&name);
            let is_replaced = replaced.contains(name.as_str());
            let is_unavailable = result.unavailable_cards.contains(&name);
            prop_assert_eq!(
                [in_deck, is_replaced, is_unavailable].iter().filter(|b| **b).count(),
                1,
                "{} placed more than once", name
            );
            if owned {
                prop_assert_eq!(result.deck.count(&name), count);
            }
        }
    }

    #[test]
    fn deck_size_is_the_sum_of_counts(
        cards in prop::collection::vec((any::<bool>(), 1u32..5), 1..20),
        spares in 0usize..4,
    ) {
        let (provider, inventory) = scenario(&cards, spares);
        let result = DeckAssembler::new(provider, inventory)
            .with_seed(9)
            .build(&BuildRequest::new(COMMANDER))
            .expect("build");

        prop_assert_eq!(result.deck_size, result.deck.total());
        let owned: u32 = cards.iter().filter(|(owned, _)| *owned).map(|(_, n)| n).sum();
        let missing = cards.iter().filter(|(owned, _)| !owned).count();
        prop_assert_eq!(result.deck_size, owned + missing.min(spares) as u32);
    }
}
