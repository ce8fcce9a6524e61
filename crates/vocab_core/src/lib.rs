//! Core domain logic for the vocabulary drill.
//! This crate is the single source of truth for session invariants.

pub mod catalog;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use catalog::{CatalogError, CatalogResult, WordCatalog};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::card::{CardId, Level, LevelParseError, WordCard, WordRecord};
pub use model::deck::{SessionDeck, SessionKey};
pub use model::history::{AnswerRecord, HISTORY_LIMIT};
pub use model::progress::{DrillMode, ProgressState};
pub use repo::kv_repo::{KeyValueRepository, RepoError, RepoResult, SqliteKeyValueRepository};
pub use service::deck_builder::{build_deck, pool_ids, shuffle_in_place};
pub use service::session::{answers_match, DrillState, SessionEngine, DATA_SCHEMA_VERSION};
pub use service::store::{PersistentStore, KEY_NAMESPACE};
pub use service::view::{AnswerOutcome, DrillView, EmptyReason, Pronouncer};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
