//! Learner progress model.
//!
//! # Responsibility
//! - Hold the persisted learner facts: saved cards, mastered cards, level
//!   filter and drill mode.
//! - Provide pure mutators; persistence is driven by the session engine.
//!
//! # Invariants
//! - `selected_levels` is never empty.
//! - `mastered_ids` only affects deck building in `DrillMode::All`.

use crate::model::card::{CardId, Level};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Which pool a drill session draws from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DrillMode {
    /// Every card in the selected levels that is not mastered yet.
    #[default]
    All,
    /// Only bookmarked cards, mastery ignored.
    Saved,
}

impl DrillMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Saved => "saved",
        }
    }
}

impl Display for DrillMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable learner progress.
///
/// Fields are private so the non-empty level invariant cannot be bypassed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressState {
    saved_ids: BTreeSet<CardId>,
    mastered_ids: BTreeSet<CardId>,
    selected_levels: BTreeSet<Level>,
    mode: DrillMode,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            saved_ids: BTreeSet::new(),
            mastered_ids: BTreeSet::new(),
            selected_levels: Level::ALL.into_iter().collect(),
            mode: DrillMode::All,
        }
    }
}

impl ProgressState {
    /// Rebuilds progress from persisted parts.
    ///
    /// An empty level set is replaced by all levels.
    pub fn from_parts(
        saved_ids: impl IntoIterator<Item = CardId>,
        mastered_ids: impl IntoIterator<Item = CardId>,
        selected_levels: impl IntoIterator<Item = Level>,
        mode: DrillMode,
    ) -> Self {
        let mut selected_levels: BTreeSet<Level> = selected_levels.into_iter().collect();
        if selected_levels.is_empty() {
            selected_levels = Level::ALL.into_iter().collect();
        }
        Self {
            saved_ids: saved_ids.into_iter().collect(),
            mastered_ids: mastered_ids.into_iter().collect(),
            selected_levels,
            mode,
        }
    }

    pub fn saved_ids(&self) -> &BTreeSet<CardId> {
        &self.saved_ids
    }

    pub fn mastered_ids(&self) -> &BTreeSet<CardId> {
        &self.mastered_ids
    }

    pub fn selected_levels(&self) -> &BTreeSet<Level> {
        &self.selected_levels
    }

    pub fn mode(&self) -> DrillMode {
        self.mode
    }

    pub fn is_saved(&self, id: CardId) -> bool {
        self.saved_ids.contains(&id)
    }

    pub fn is_mastered(&self, id: CardId) -> bool {
        self.mastered_ids.contains(&id)
    }

    /// Adds or removes `level` from the selection.
    ///
    /// Returns `false` when the call would empty the selection and was ignored.
    pub fn toggle_level(&mut self, level: Level) -> bool {
        if self.selected_levels.contains(&level) {
            if self.selected_levels.len() == 1 {
                return false;
            }
            self.selected_levels.remove(&level);
        } else {
            self.selected_levels.insert(level);
        }
        true
    }

    /// Flips saved membership; returns the new saved flag.
    pub fn toggle_saved(&mut self, id: CardId) -> bool {
        if self.saved_ids.remove(&id) {
            false
        } else {
            self.saved_ids.insert(id);
            true
        }
    }

    /// Marks a card mastered; returns `false` if it already was.
    pub fn mark_mastered(&mut self, id: CardId) -> bool {
        self.mastered_ids.insert(id)
    }

    /// Forgets all mastered cards. Saved cards are kept.
    pub fn clear_mastered(&mut self) -> bool {
        let changed = !self.mastered_ids.is_empty();
        self.mastered_ids.clear();
        changed
    }

    /// Switches mode; returns `false` when unchanged.
    pub fn set_mode(&mut self, mode: DrillMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        true
    }
}
