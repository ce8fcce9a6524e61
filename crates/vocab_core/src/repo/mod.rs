//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define raw key/value data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repositories report faults; they never substitute defaults. Fallback
//!   policy belongs to `service::store::PersistentStore`.

pub mod kv_repo;
