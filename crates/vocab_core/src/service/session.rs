//! Drill session engine.
//!
//! # Responsibility
//! - Own the live deck, learner progress and answer history.
//! - Run the check / requeue / advance state machine.
//! - Persist progress and the deck snapshot after every state change, and
//!   restore them on open.
//!
//! # Invariants
//! - `check` only acts in `Ready`; `advance` only acts in `Revealed`.
//! - A missed or skipped card is never the next card shown unless it was the
//!   last card of the deck.
//! - Deck exhaustion always rebuilds the pool, in both modes.
//! - Progress is persisted right after each mutation, never batched.

use crate::catalog::WordCatalog;
use crate::model::card::{CardId, Level, WordCard};
use crate::model::deck::{SessionDeck, SessionKey};
use crate::model::history::{push_record, AnswerRecord};
use crate::model::progress::{DrillMode, ProgressState};
use crate::repo::kv_repo::KeyValueRepository;
use crate::service::deck_builder::build_deck;
use crate::service::store::{keys, PersistentStore};
use crate::service::view::{AnswerOutcome, DrillView, EmptyReason, Pronouncer};
use log::{debug, info, warn};
use rand::Rng;

/// Stored data version marker. Bump to discard all stored drill data.
pub const DATA_SCHEMA_VERSION: &str = "2";

/// Externally visible engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillState {
    /// A card is presented and input is accepted.
    Ready,
    /// The current card was judged; input is locked until `advance`.
    Revealed,
    /// No card for the current mode and levels.
    Empty,
}

#[derive(Debug, Clone)]
enum Phase {
    Ready,
    Revealed {
        outcome: AnswerOutcome,
        /// The card moved later in the deck, so the next card already sits
        /// under the cursor.
        requeued: bool,
    },
    Empty,
}

/// Owns one drill session and its persistence.
pub struct SessionEngine<R: KeyValueRepository, G: Rng> {
    catalog: WordCatalog,
    store: PersistentStore<R>,
    progress: ProgressState,
    deck: SessionDeck,
    history: Vec<AnswerRecord>,
    phase: Phase,
    rng: G,
    pronouncer: Option<Box<dyn Pronouncer>>,
}

impl<R: KeyValueRepository, G: Rng> SessionEngine<R, G> {
    /// Opens a session over `repo`, restoring stored progress and deck.
    ///
    /// # Side effects
    /// - Wipes stored drill data when `DATA_SCHEMA_VERSION` changed.
    /// - Rebuilds and persists a deck when no usable snapshot exists.
    pub fn open(catalog: WordCatalog, repo: R, rng: G) -> Self {
        let store = PersistentStore::new(repo);
        store.migrate_if_version_changed(DATA_SCHEMA_VERSION);

        let progress = load_progress(&store);
        let history = store.get(keys::HISTORY, Vec::new());

        let mut engine = Self {
            catalog,
            store,
            progress,
            deck: SessionDeck::empty(),
            history,
            phase: Phase::Empty,
            rng,
            pronouncer: None,
        };
        engine.restore_or_rebuild();
        engine
    }

    /// Attaches the optional pronunciation sink.
    pub fn with_pronouncer(mut self, pronouncer: Box<dyn Pronouncer>) -> Self {
        self.pronouncer = Some(pronouncer);
        self
    }

    pub fn state(&self) -> DrillState {
        match self.phase {
            Phase::Ready => DrillState::Ready,
            Phase::Revealed { .. } => DrillState::Revealed,
            Phase::Empty => DrillState::Empty,
        }
    }

    pub fn catalog(&self) -> &WordCatalog {
        &self.catalog
    }

    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }

    pub fn deck(&self) -> &SessionDeck {
        &self.deck
    }

    /// Answer history, newest first.
    pub fn history(&self) -> &[AnswerRecord] {
        &self.history
    }

    pub fn store(&self) -> &PersistentStore<R> {
        &self.store
    }

    /// Snapshot address for the current mode and levels.
    pub fn session_key(&self) -> SessionKey {
        SessionKey::new(
            self.progress.mode(),
            self.progress.selected_levels().iter().copied(),
        )
    }

    /// Id of the card being presented or judged.
    pub fn current_id(&self) -> Option<CardId> {
        match &self.phase {
            Phase::Ready => self.deck.current(),
            Phase::Revealed { outcome, .. } => Some(outcome.card_id),
            Phase::Empty => None,
        }
    }

    pub fn current_card(&self) -> Option<&WordCard> {
        self.current_id().and_then(|id| self.catalog.get(id))
    }

    /// `(position, total)` for progress display.
    pub fn progress_counter(&self) -> (usize, usize) {
        self.deck.progress_counter()
    }

    /// Judges `answer` against the current card.
    ///
    /// Returns `None` without side effects when no card is presented or the
    /// current card was already judged.
    pub fn check(&mut self, answer: &str) -> Option<AnswerOutcome> {
        if !matches!(self.phase, Phase::Ready) {
            debug!("event=drill_check module=session status=ignored state={:?}", self.state());
            return None;
        }
        let card_id = self.deck.current()?;
        let Some(card) = self.catalog.get(card_id) else {
            warn!("event=drill_check module=session status=error error_code=card_not_found card_id={card_id}");
            return None;
        };

        let correct = answers_match(answer, &card.word);
        let outcome = AnswerOutcome {
            card_id,
            correct,
            expected: card.word.clone(),
            submitted: answer.to_string(),
        };
        let record = AnswerRecord::for_card(card, correct);
        if let Some(pronouncer) = self.pronouncer.as_mut() {
            pronouncer.speak(&card.word);
        }

        let mut requeued = false;
        if correct {
            if self.progress.mode() == DrillMode::All && self.progress.mark_mastered(card_id) {
                self.persist_progress();
            }
        } else {
            requeued = self.deck.requeue_current(&mut self.rng).is_some();
        }

        push_record(&mut self.history, record);
        self.store.set(keys::HISTORY, &self.history);

        debug!(
            "event=drill_check module=session status=ok card_id={} correct={} requeued={}",
            card_id, correct, requeued
        );
        self.phase = Phase::Revealed {
            outcome: outcome.clone(),
            requeued,
        };
        self.persist_deck();
        Some(outcome)
    }

    /// Moves past a judged card.
    ///
    /// Rebuilds the deck when the cursor runs off the end. No-op unless the
    /// engine is `Revealed`.
    pub fn advance(&mut self) -> DrillState {
        let requeued = match &self.phase {
            Phase::Revealed { requeued, .. } => *requeued,
            _ => return self.state(),
        };

        if !requeued && !self.deck.step() {
            info!("event=drill_advance module=session status=ok deck_exhausted=true");
            self.rebuild();
            return self.state();
        }

        self.phase = Phase::Ready;
        self.persist_deck();
        debug!(
            "event=drill_advance module=session status=ok cursor={}",
            self.deck.cursor()
        );
        self.state()
    }

    /// Defers the current card without judging it.
    ///
    /// Returns `true` when the card moved.
    pub fn skip(&mut self) -> bool {
        if !matches!(self.phase, Phase::Ready) {
            return false;
        }
        let moved = self.deck.requeue_current(&mut self.rng).is_some();
        if moved {
            self.persist_deck();
        }
        debug!("event=drill_skip module=session status=ok moved={moved}");
        moved
    }

    /// Flips the saved flag of the current card; returns the new flag.
    ///
    /// In `Saved` mode an un-saved card leaves the live deck immediately.
    pub fn toggle_saved(&mut self) -> Option<bool> {
        let card_id = self.current_id()?;
        let saved = self.progress.toggle_saved(card_id);
        self.persist_progress();

        if !saved && self.progress.mode() == DrillMode::Saved && self.deck.remove(card_id) {
            self.phase = if self.deck.is_empty() {
                Phase::Empty
            } else {
                Phase::Ready
            };
            self.persist_deck();
        }

        debug!("event=drill_toggle_saved module=session status=ok card_id={card_id} saved={saved}");
        Some(saved)
    }

    /// Toggles a level in the filter and rebuilds the deck.
    ///
    /// Returns `false` when the toggle was refused (last selected level).
    pub fn toggle_level(&mut self, level: Level) -> bool {
        if !self.progress.toggle_level(level) {
            debug!("event=drill_toggle_level module=session status=ignored level={level}");
            return false;
        }
        self.persist_progress();
        self.rebuild();
        true
    }

    /// Switches mode and rebuilds the deck; `false` when unchanged.
    pub fn set_mode(&mut self, mode: DrillMode) -> bool {
        if !self.progress.set_mode(mode) {
            return false;
        }
        self.persist_progress();
        self.rebuild();
        true
    }

    /// Rebuilds the deck for the current filters.
    pub fn reshuffle(&mut self) {
        self.rebuild();
    }

    /// Forgets mastered cards, keeping saved ones, and rebuilds the deck.
    pub fn reset_progress(&mut self) {
        self.progress.clear_mastered();
        self.persist_progress();
        info!("event=drill_reset module=session status=ok");
        self.rebuild();
    }

    /// Pushes the current state into `view`.
    pub fn render(&self, view: &mut impl DrillView) {
        let (position, total) = self.progress_counter();
        view.show_progress(position, total);

        let Some(card) = self.current_card() else {
            view.show_empty(EmptyReason::for_mode(self.progress.mode()));
            return;
        };
        let saved = self.progress.is_saved(card.id);
        view.show_card(card, saved);
        view.show_saved(saved);
        if let Phase::Revealed { outcome, .. } = &self.phase {
            view.show_feedback(outcome, card);
        }
    }

    fn restore_or_rebuild(&mut self) {
        let key = self.session_key();
        let snapshot: Option<SessionDeck> = self.store.get(&key.storage_key(), None);
        let Some(snapshot) = snapshot else {
            self.rebuild();
            return;
        };

        let levels = self.progress.selected_levels();
        let mode = self.progress.mode();
        let deck = snapshot.sanitized(|id| {
            self.catalog.get(id).is_some_and(|card| {
                levels.contains(&card.level)
                    && (mode == DrillMode::All || self.progress.is_saved(id))
            })
        });

        if deck.is_empty() {
            self.rebuild();
            return;
        }

        info!(
            "event=session_restore module=session status=ok key={} deck_size={} cursor={}",
            key.storage_key(),
            deck.len(),
            deck.cursor()
        );
        self.deck = deck;
        self.phase = Phase::Ready;
        self.persist_deck();
    }

    fn rebuild(&mut self) {
        self.deck = build_deck(&self.catalog, &self.progress, &mut self.rng);
        self.persist_deck();
        self.phase = if self.deck.is_empty() {
            Phase::Empty
        } else {
            Phase::Ready
        };
    }

    fn persist_deck(&self) {
        self.store.set(&self.session_key().storage_key(), &self.deck);
    }

    fn persist_progress(&self) {
        save_progress(&self.store, &self.progress);
    }
}

/// Trimmed, case-insensitive comparison; blank answers never match.
pub fn answers_match(answer: &str, target: &str) -> bool {
    let answer = normalize_answer(answer);
    !answer.is_empty() && answer == normalize_answer(target)
}

fn normalize_answer(value: &str) -> String {
    value.trim().to_lowercase()
}

fn load_progress<R: KeyValueRepository>(store: &PersistentStore<R>) -> ProgressState {
    let saved: Vec<CardId> = store.get(keys::SAVED, Vec::new());
    let mastered: Vec<CardId> = store.get(keys::MASTERED, Vec::new());
    let levels: Vec<Level> = store.get(keys::LEVELS, Level::ALL.to_vec());
    let mode: DrillMode = store.get(keys::MODE, DrillMode::All);
    ProgressState::from_parts(saved, mastered, levels, mode)
}

fn save_progress<R: KeyValueRepository>(store: &PersistentStore<R>, progress: &ProgressState) {
    store.set(keys::SAVED, progress.saved_ids());
    store.set(keys::MASTERED, progress.mastered_ids());
    store.set(keys::LEVELS, progress.selected_levels());
    store.set(keys::MODE, &progress.mode());
}
