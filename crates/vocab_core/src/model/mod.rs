//! Domain model for the drill core.
//!
//! # Responsibility
//! - Define cards, learner progress, session decks and answer history.
//!
//! # Invariants
//! - Every entity references cards by `CardId`, never by embedding.

pub mod card;
pub mod deck;
pub mod history;
pub mod progress;
