use rand::rngs::StdRng;
use rand::SeedableRng;
use rusqlite::Connection;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use vocab_core::db::open_db_in_memory;
use vocab_core::{
    AnswerOutcome, DrillMode, DrillState, DrillView, EmptyReason, Level, PersistentStore,
    Pronouncer, SessionDeck, SessionEngine, SqliteKeyValueRepository, WordCard, WordCatalog,
    WordRecord, DATA_SCHEMA_VERSION, HISTORY_LIMIT,
};

type Engine<'conn> = SessionEngine<SqliteKeyValueRepository<'conn>, StdRng>;

fn record(word: &str, level: Level) -> WordRecord {
    WordRecord {
        word: word.to_string(),
        level,
        part_of_speech: "n.".to_string(),
        translation: format!("{word}-zh"),
        example_source: format!("A {word}."),
        example_translation: String::new(),
    }
}

fn catalog() -> WordCatalog {
    WordCatalog::load(vec![
        record("cat", Level::A1),
        record("dog", Level::A1),
        record("fish", Level::B1),
    ])
}

fn open(conn: &Connection, seed: u64) -> Engine<'_> {
    let repo = SqliteKeyValueRepository::try_new(conn).unwrap();
    SessionEngine::open(catalog(), repo, StdRng::seed_from_u64(seed))
}

fn seed_store(conn: &Connection, levels: &[Level], mode: DrillMode, saved: &[u32]) {
    let store = PersistentStore::new(SqliteKeyValueRepository::try_new(conn).unwrap());
    store.set("schema_version", DATA_SCHEMA_VERSION);
    store.set("levels", levels);
    store.set("mode", &mode);
    store.set("saved", saved);
}

fn word_of(engine: &Engine<'_>, id: u32) -> String {
    engine.catalog().get(id).unwrap().word.clone()
}

#[derive(Default)]
struct RecordingView {
    cards: Vec<u32>,
    empty: Vec<EmptyReason>,
    saved: Vec<bool>,
    feedback: Vec<bool>,
    progress: Vec<(usize, usize)>,
}

impl DrillView for RecordingView {
    fn show_card(&mut self, card: &WordCard, _saved: bool) {
        self.cards.push(card.id);
    }

    fn show_empty(&mut self, reason: EmptyReason) {
        self.empty.push(reason);
    }

    fn show_saved(&mut self, saved: bool) {
        self.saved.push(saved);
    }

    fn show_feedback(&mut self, outcome: &AnswerOutcome, _card: &WordCard) {
        self.feedback.push(outcome.correct);
    }

    fn show_progress(&mut self, position: usize, total: usize) {
        self.progress.push((position, total));
    }
}

struct RecordingPronouncer(Rc<RefCell<Vec<String>>>);

impl Pronouncer for RecordingPronouncer {
    fn speak(&mut self, word: &str) {
        self.0.borrow_mut().push(word.to_string());
    }
}

#[test]
fn mastered_card_is_dropped_on_exhaustion_rebuild() {
    let conn = open_db_in_memory().unwrap();
    seed_store(&conn, &[Level::A1], DrillMode::All, &[]);
    let mut engine = open(&conn, 7);

    let ids: BTreeSet<u32> = engine.deck().card_ids().iter().copied().collect();
    assert_eq!(ids, [0, 1].into_iter().collect());
    assert_eq!(engine.deck().total(), 2);
    assert_eq!(engine.state(), DrillState::Ready);

    if engine.current_id() == Some(1) {
        assert!(engine.skip());
    }
    assert_eq!(engine.current_id(), Some(0));

    let outcome = engine.check("cat").unwrap();
    assert!(outcome.correct);
    assert!(engine.progress().is_mastered(0));
    assert_eq!(engine.state(), DrillState::Revealed);

    assert_eq!(engine.advance(), DrillState::Ready);
    assert_eq!(engine.current_id(), Some(1));

    let outcome = engine.check("not a dog").unwrap();
    assert!(!outcome.correct);
    assert_eq!(engine.advance(), DrillState::Ready);
    assert_eq!(engine.deck().card_ids(), &[1]);
    assert_eq!(engine.deck().total(), 1);
}

#[test]
fn missed_card_is_never_the_next_card() {
    for seed in 0..40 {
        let conn = open_db_in_memory().unwrap();
        let mut engine = open(&conn, seed);
        assert_eq!(engine.deck().len(), 3);

        let missed = engine.current_id().unwrap();
        let following = engine.deck().card_ids()[1];
        let outcome = engine.check("   ").unwrap();
        assert!(!outcome.correct);
        assert_eq!(engine.deck().cursor(), 0);
        assert_eq!(engine.deck().total(), 3);

        let new_index = engine
            .deck()
            .card_ids()
            .iter()
            .position(|id| *id == missed)
            .unwrap();
        assert!(new_index >= 1, "seed {seed}: missed card stayed at cursor");

        assert_eq!(engine.advance(), DrillState::Ready);
        assert_eq!(engine.current_id(), Some(following));
        assert!(!engine.progress().is_mastered(missed));
    }
}

#[test]
fn duplicate_and_stray_triggers_are_ignored() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open(&conn, 1);

    assert_eq!(engine.advance(), DrillState::Ready);
    let first = engine.current_id().unwrap();
    let word = word_of(&engine, first);

    assert!(engine.check(&word.to_uppercase()).is_some());
    let deck_after_check = engine.deck().clone();
    assert!(engine.check(&word).is_none());
    assert!(!engine.skip());
    assert_eq!(engine.deck(), &deck_after_check);
    assert_eq!(engine.history().len(), 1);
}

#[test]
fn skip_defers_without_judging() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open(&conn, 9);
    let skipped = engine.current_id().unwrap();

    assert!(engine.skip());
    assert_eq!(engine.state(), DrillState::Ready);
    assert_eq!(engine.deck().cursor(), 0);
    assert_ne!(engine.current_id(), Some(skipped));
    assert!(engine.history().is_empty());
    assert!(engine.progress().mastered_ids().is_empty());
}

#[test]
fn saved_mode_unsave_removes_exactly_the_current_card() {
    let conn = open_db_in_memory().unwrap();
    seed_store(&conn, &Level::ALL, DrillMode::Saved, &[0, 1, 2]);
    let mut engine = open(&conn, 4);
    assert_eq!(engine.deck().total(), 3);

    let current = engine.current_id().unwrap();
    let others: Vec<u32> = engine
        .deck()
        .card_ids()
        .iter()
        .copied()
        .filter(|id| *id != current)
        .collect();

    assert_eq!(engine.toggle_saved(), Some(false));
    assert_eq!(engine.deck().card_ids(), others.as_slice());
    assert_eq!(engine.deck().total(), 2);
    assert_eq!(engine.state(), DrillState::Ready);
    assert!(!engine.progress().is_saved(current));

    assert_eq!(engine.toggle_saved(), Some(false));
    assert_eq!(engine.toggle_saved(), Some(false));
    assert_eq!(engine.state(), DrillState::Empty);
    assert_eq!(engine.deck().total(), 0);
    assert_eq!(engine.toggle_saved(), None);

    let mut view = RecordingView::default();
    engine.render(&mut view);
    assert_eq!(view.empty, vec![EmptyReason::NoSavedCards]);
    assert_eq!(view.progress, vec![(0, 0)]);
}

#[test]
fn saved_mode_unsave_after_miss_removes_the_judged_card() {
    let conn = open_db_in_memory().unwrap();
    seed_store(&conn, &Level::ALL, DrillMode::Saved, &[0, 1, 2]);
    let mut engine = open(&conn, 12);

    let missed = engine.current_id().unwrap();
    let following = engine.deck().card_ids()[1];
    engine.check("wrong").unwrap();
    assert_eq!(engine.current_id(), Some(missed));

    assert_eq!(engine.toggle_saved(), Some(false));
    assert!(!engine.deck().card_ids().contains(&missed));
    assert_eq!(engine.deck().total(), 2);
    assert_eq!(engine.state(), DrillState::Ready);
    assert_eq!(engine.current_id(), Some(following));
}

#[test]
fn saved_mode_correct_answer_does_not_master() {
    let conn = open_db_in_memory().unwrap();
    seed_store(&conn, &Level::ALL, DrillMode::Saved, &[2]);
    let mut engine = open(&conn, 2);

    assert!(engine.check("Fish ").unwrap().correct);
    assert!(engine.progress().mastered_ids().is_empty());

    assert_eq!(engine.advance(), DrillState::Ready);
    assert_eq!(engine.deck().card_ids(), &[2]);
}

#[test]
fn all_mode_toggle_saved_keeps_deck() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open(&conn, 3);
    let deck = engine.deck().clone();
    let current = engine.current_id().unwrap();

    assert_eq!(engine.toggle_saved(), Some(true));
    assert!(engine.progress().is_saved(current));
    assert_eq!(engine.toggle_saved(), Some(false));
    assert_eq!(engine.deck(), &deck);
}

#[test]
fn session_and_progress_survive_reopen() {
    let conn = open_db_in_memory().unwrap();
    let (deck_before, saved_before) = {
        let mut engine = open(&conn, 21);
        let current = engine.current_id().unwrap();
        let word = word_of(&engine, current);
        engine.check(&word).unwrap();
        engine.advance();
        engine.toggle_saved();
        engine.skip();
        (engine.deck().clone(), engine.progress().saved_ids().clone())
    };

    let engine = open(&conn, 99);
    assert_eq!(engine.deck(), &deck_before);
    assert_eq!(engine.progress().saved_ids(), &saved_before);
    assert_eq!(engine.progress().mastered_ids().len(), 1);
    assert_eq!(engine.history().len(), 1);
    assert_eq!(engine.state(), DrillState::Ready);
}

#[test]
fn restored_snapshot_drops_unknown_ids() {
    let conn = open_db_in_memory().unwrap();
    seed_store(&conn, &[Level::A1], DrillMode::All, &[]);
    let store = PersistentStore::new(SqliteKeyValueRepository::try_new(&conn).unwrap());
    let stale: SessionDeck =
        serde_json::from_str(r#"{"cardIds":[1,40,2,0],"cursor":1,"total":4}"#).unwrap();
    store.set("session_all_A1", &stale);

    let engine = open(&conn, 0);
    assert_eq!(engine.deck().card_ids(), &[1, 0]);
    assert_eq!(engine.deck().cursor(), 1);
    assert_eq!(engine.deck().total(), 4);
}

#[test]
fn data_version_change_wipes_stored_progress() {
    let conn = open_db_in_memory().unwrap();
    {
        let store = PersistentStore::new(SqliteKeyValueRepository::try_new(&conn).unwrap());
        store.set("schema_version", "0");
        store.set("saved", &[0u32, 1]);
        store.set("mode", &DrillMode::Saved);
    }

    let engine = open(&conn, 5);
    assert!(engine.progress().saved_ids().is_empty());
    assert_eq!(engine.progress().mode(), DrillMode::All);
    assert_eq!(
        engine.store().get::<Option<String>>("schema_version", None).as_deref(),
        Some(DATA_SCHEMA_VERSION)
    );
}

#[test]
fn level_and_mode_changes_rebuild_and_persist() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open(&conn, 8);

    for level in [Level::A2, Level::B2, Level::C1, Level::C2, Level::B1] {
        assert!(engine.toggle_level(level));
    }
    assert_eq!(
        engine.progress().selected_levels(),
        &[Level::A1].into_iter().collect::<BTreeSet<_>>()
    );
    assert!(!engine.toggle_level(Level::A1));
    assert_eq!(engine.deck().total(), 2);

    assert!(engine.set_mode(DrillMode::Saved));
    assert!(!engine.set_mode(DrillMode::Saved));
    assert_eq!(engine.state(), DrillState::Empty);

    let mut view = RecordingView::default();
    engine.render(&mut view);
    assert_eq!(view.empty, vec![EmptyReason::NoSavedCards]);

    drop(engine);
    let engine = open(&conn, 8);
    assert_eq!(engine.progress().mode(), DrillMode::Saved);
    assert_eq!(engine.progress().selected_levels().len(), 1);
    assert_eq!(engine.session_key().storage_key(), "session_saved_A1");
}

#[test]
fn reset_progress_brings_mastered_cards_back() {
    let conn = open_db_in_memory().unwrap();
    seed_store(&conn, &[Level::B1], DrillMode::All, &[]);
    let mut engine = open(&conn, 6);

    engine.check("fish").unwrap();
    assert_eq!(engine.advance(), DrillState::Empty);

    let mut view = RecordingView::default();
    engine.render(&mut view);
    assert_eq!(view.empty, vec![EmptyReason::NoMatchingCards]);

    engine.reset_progress();
    assert!(engine.progress().mastered_ids().is_empty());
    assert_eq!(engine.state(), DrillState::Ready);
    assert_eq!(engine.deck().card_ids(), &[2]);
}

#[test]
fn render_reports_card_feedback_and_progress() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = open(&conn, 10);
    let current = engine.current_id().unwrap();

    let mut view = RecordingView::default();
    engine.render(&mut view);
    assert_eq!(view.cards, vec![current]);
    assert_eq!(view.saved, vec![false]);
    assert_eq!(view.progress, vec![(1, 3)]);
    assert!(view.feedback.is_empty());

    engine.check("definitely wrong").unwrap();
    let mut view = RecordingView::default();
    engine.render(&mut view);
    assert_eq!(view.cards, vec![current]);
    assert_eq!(view.feedback, vec![false]);
}

#[test]
fn pronouncer_receives_target_word_on_check() {
    let conn = open_db_in_memory().unwrap();
    let spoken = Rc::new(RefCell::new(Vec::new()));
    let mut engine = open(&conn, 13).with_pronouncer(Box::new(RecordingPronouncer(spoken.clone())));
    let word = word_of(&engine, engine.current_id().unwrap());

    engine.check("???").unwrap();
    assert_eq!(spoken.borrow().as_slice(), &[word]);
}

#[test]
fn history_is_capped_newest_first() {
    let conn = open_db_in_memory().unwrap();
    seed_store(&conn, &Level::ALL, DrillMode::Saved, &[0, 1, 2]);
    let mut engine = open(&conn, 14);

    for _ in 0..(HISTORY_LIMIT + 3) {
        engine.check("nope").unwrap();
        engine.advance();
    }
    assert_eq!(engine.history().len(), HISTORY_LIMIT);
    assert!(engine.history().iter().all(|entry| !entry.correct));

    let last = engine.history()[0].clone();
    drop(engine);
    let engine = open(&conn, 14);
    assert_eq!(engine.history().len(), HISTORY_LIMIT);
    assert_eq!(engine.history()[0], last);
}

#[test]
fn empty_catalog_starts_empty() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKeyValueRepository::try_new(&conn).unwrap();
    let mut engine = SessionEngine::open(WordCatalog::load(Vec::new()), repo, StdRng::seed_from_u64(0));

    assert_eq!(engine.state(), DrillState::Empty);
    assert!(engine.check("cat").is_none());
    assert_eq!(engine.advance(), DrillState::Empty);
    assert_eq!(engine.progress_counter(), (0, 0));
}
