//! Deck construction from catalog and learner progress.
//!
//! # Invariants
//! - The built deck is a permutation of the filtered pool: same members, no
//!   duplicates, `total == len`.
//! - Shuffling is Fisher-Yates over the injected random source.

use crate::catalog::WordCatalog;
use crate::model::card::CardId;
use crate::model::deck::SessionDeck;
use crate::model::progress::{DrillMode, ProgressState};
use log::info;
use rand::Rng;

/// Ids eligible for the current level filter and mode, in catalog order.
///
/// `All` drops mastered cards; `Saved` keeps only saved cards and ignores
/// mastery.
pub fn pool_ids(catalog: &WordCatalog, progress: &ProgressState) -> Vec<CardId> {
    catalog
        .by_levels(progress.selected_levels())
        .filter(|card| match progress.mode() {
            DrillMode::Saved => progress.is_saved(card.id),
            DrillMode::All => !progress.is_mastered(card.id),
        })
        .map(|card| card.id)
        .collect()
}

/// Builds a freshly shuffled deck; empty when the pool is empty.
pub fn build_deck<G: Rng + ?Sized>(
    catalog: &WordCatalog,
    progress: &ProgressState,
    rng: &mut G,
) -> SessionDeck {
    let mut ids = pool_ids(catalog, progress);
    info!(
        "event=deck_build module=deck_builder status=ok mode={} pool_size={}",
        progress.mode(),
        ids.len()
    );
    if ids.is_empty() {
        return SessionDeck::empty();
    }

    shuffle_in_place(&mut ids, rng);
    SessionDeck::new(ids)
}

/// Uniform in-place Fisher-Yates shuffle.
pub fn shuffle_in_place<T, G: Rng + ?Sized>(items: &mut [T], rng: &mut G) {
    for upper in (1..items.len()).rev() {
        let pick = rng.random_range(0..=upper);
        items.swap(upper, pick);
    }
}
