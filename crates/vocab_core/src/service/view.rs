//! Collaborator interfaces implemented by presentation layers.
//!
//! The core never renders; it pushes state into these sinks.

use crate::model::card::{CardId, WordCard};
use crate::model::progress::DrillMode;

/// Why no card can be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// `All` mode pool is empty (everything mastered or no cards in levels).
    NoMatchingCards,
    /// `Saved` mode pool is empty.
    NoSavedCards,
    /// The word list was never supplied.
    CatalogUnavailable,
}

impl EmptyReason {
    pub fn for_mode(mode: DrillMode) -> Self {
        match mode {
            DrillMode::All => Self::NoMatchingCards,
            DrillMode::Saved => Self::NoSavedCards,
        }
    }
}

/// Judgment of one submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub card_id: CardId,
    pub correct: bool,
    /// Target word as stored in the catalog.
    pub expected: String,
    /// Answer as submitted, before normalization.
    pub submitted: String,
}

/// Card presentation sink.
pub trait DrillView {
    fn show_card(&mut self, card: &WordCard, saved: bool);
    fn show_empty(&mut self, reason: EmptyReason);
    fn show_saved(&mut self, saved: bool);
    fn show_feedback(&mut self, outcome: &AnswerOutcome, card: &WordCard);
    fn show_progress(&mut self, position: usize, total: usize);
}

/// Fire-and-forget pronunciation sink.
///
/// Implementations cancel any utterance still playing before starting `word`.
pub trait Pronouncer {
    fn speak(&mut self, word: &str);
}
