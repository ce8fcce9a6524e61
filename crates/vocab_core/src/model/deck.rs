//! Session deck model and snapshot addressing.
//!
//! # Responsibility
//! - Hold the live, reorderable card sequence of one drill session.
//! - Address persisted snapshots by `(mode, level set)`.
//!
//! # Invariants
//! - `card_ids` holds no duplicates.
//! - `cursor < card_ids.len()` whenever the deck is non-empty.
//! - `total` is fixed at construction; only an explicit `remove` lowers it.

use crate::model::card::{CardId, Level};
use crate::model::progress::DrillMode;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Live working deck; also the persisted snapshot shape.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDeck {
    card_ids: Vec<CardId>,
    cursor: usize,
    total: usize,
}

impl SessionDeck {
    /// Creates a deck at cursor 0 with `total` equal to its size.
    ///
    /// Duplicate ids keep their first occurrence only.
    pub fn new(card_ids: Vec<CardId>) -> Self {
        let card_ids = dedup_preserving_order(card_ids);
        let total = card_ids.len();
        Self {
            card_ids,
            cursor: 0,
            total,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn card_ids(&self) -> &[CardId] {
        &self.card_ids
    }

    /// Cursor, re-clamped to the current deck size.
    pub fn cursor(&self) -> usize {
        clamp_index(self.cursor, self.card_ids.len())
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn len(&self) -> usize {
        self.card_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.card_ids.is_empty()
    }

    /// Card id under the cursor.
    pub fn current(&self) -> Option<CardId> {
        self.card_ids.get(self.cursor()).copied()
    }

    /// Moves the cursor forward by one.
    ///
    /// Returns `false` when the deck is exhausted; the cursor is then left at
    /// `len()` and the caller must rebuild.
    pub fn step(&mut self) -> bool {
        self.cursor = self.cursor() + 1;
        self.cursor < self.card_ids.len()
    }

    /// Moves the current card to a random later slot.
    ///
    /// The card is removed at `cursor` and reinserted uniformly in
    /// `[cursor + 1, len]` of the shortened deck, so the following card slides
    /// under the cursor. Returns the new index, or `None` when the card has no
    /// later slot (it is last) and stays where it was.
    pub fn requeue_current<G: Rng + ?Sized>(&mut self, rng: &mut G) -> Option<usize> {
        let cursor = self.cursor();
        if cursor + 1 >= self.card_ids.len() {
            return None;
        }

        let id = self.card_ids.remove(cursor);
        let target = rng.random_range(cursor + 1..=self.card_ids.len());
        self.card_ids.insert(target, id);
        self.cursor = cursor;
        Some(target)
    }

    /// Removes `id` from the deck and lowers `total` by one.
    ///
    /// Cards ahead of the cursor shift back so the cursor keeps pointing at the
    /// same upcoming card. Returns `false` when `id` was not in the deck.
    pub fn remove(&mut self, id: CardId) -> bool {
        let Some(index) = self.card_ids.iter().position(|member| *member == id) else {
            return false;
        };
        let cursor = self.cursor();
        self.card_ids.remove(index);
        self.total = self.total.saturating_sub(1);
        self.cursor = if index < cursor { cursor - 1 } else { cursor };
        self.cursor = clamp_index(self.cursor, self.card_ids.len());
        true
    }

    /// Repairs a snapshot read back from storage.
    ///
    /// Drops duplicate ids and ids rejected by `is_known`, clamps the cursor
    /// and keeps `total` at least as large as the remaining deck.
    pub fn sanitized(self, is_known: impl Fn(CardId) -> bool) -> Self {
        let card_ids: Vec<CardId> = dedup_preserving_order(self.card_ids)
            .into_iter()
            .filter(|id| is_known(*id))
            .collect();
        let cursor = clamp_index(self.cursor, card_ids.len());
        let total = self.total.max(card_ids.len());
        Self {
            card_ids,
            cursor,
            total,
        }
    }

    /// `(position, total)` for progress display; `(0, 0)` when empty.
    pub fn progress_counter(&self) -> (usize, usize) {
        if self.card_ids.is_empty() {
            return (0, self.total);
        }
        ((self.cursor() + 1).min(self.total), self.total)
    }
}

/// Composite address of a session snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub mode: DrillMode,
    pub levels: BTreeSet<Level>,
}

impl SessionKey {
    pub fn new(mode: DrillMode, levels: impl IntoIterator<Item = Level>) -> Self {
        Self {
            mode,
            levels: levels.into_iter().collect(),
        }
    }

    /// Storage key without namespace, e.g. `session_all_A1+B1`.
    ///
    /// Levels are emitted in ascending order so equal sets map to one key.
    pub fn storage_key(&self) -> String {
        let levels = self
            .levels
            .iter()
            .map(|level| level.as_str())
            .collect::<Vec<_>>()
            .join("+");
        format!("session_{}_{}", self.mode.as_str(), levels)
    }
}

fn dedup_preserving_order(ids: Vec<CardId>) -> Vec<CardId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

fn clamp_index(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        index.min(len - 1)
    }
}
