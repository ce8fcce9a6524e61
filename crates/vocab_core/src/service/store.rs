//! Best-effort persistent store.
//!
//! # Responsibility
//! - Namespace, serialize and deserialize drill data over a raw repository.
//! - Turn every storage fault into a logged fallback.
//! - Wipe the namespace when the stored data version marker changes.
//!
//! # Invariants
//! - No method returns a storage error; storage is advisory.
//! - All keys written here carry `KEY_NAMESPACE`.

use crate::repo::kv_repo::KeyValueRepository;
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Prefix applied to every stored key.
pub const KEY_NAMESPACE: &str = "vocab_app_";

/// Un-namespaced storage keys.
pub mod keys {
    pub const SCHEMA_VERSION: &str = "schema_version";
    pub const SAVED: &str = "saved";
    pub const MASTERED: &str = "mastered";
    pub const LEVELS: &str = "levels";
    pub const MODE: &str = "mode";
    pub const HISTORY: &str = "history";
}

/// Safe-parse key/value store over a `KeyValueRepository`.
pub struct PersistentStore<R: KeyValueRepository> {
    repo: R,
}

impl<R: KeyValueRepository> PersistentStore<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Reads `key`, falling back to `default` on absence, corruption or fault.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let full_key = namespaced(key);
        let raw = match self.repo.get_value(&full_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(err) => {
                warn!(
                    "event=store_read module=store status=error key={} error={}",
                    full_key, err
                );
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "event=store_read module=store status=error error_code=corrupt_value key={} error={}",
                    full_key, err
                );
                default
            }
        }
    }

    /// Serializes and writes `value`; faults are logged and dropped.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let full_key = namespaced(key);
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(
                    "event=store_write module=store status=error error_code=serialize_failed key={} error={}",
                    full_key, err
                );
                return;
            }
        };

        if let Err(err) = self.repo.put_value(&full_key, &raw) {
            warn!(
                "event=store_write module=store status=error key={} error={}",
                full_key, err
            );
        }
    }

    pub fn remove(&self, key: &str) {
        let full_key = namespaced(key);
        if let Err(err) = self.repo.delete_value(&full_key) {
            warn!(
                "event=store_remove module=store status=error key={} error={}",
                full_key, err
            );
        }
    }

    /// Wipes the namespace when the stored version marker differs.
    ///
    /// Returns `true` when a wipe was performed. There is no field-level
    /// upgrade path; a version change discards all stored drill data.
    pub fn migrate_if_version_changed(&self, current_version: &str) -> bool {
        let stored: Option<String> = self.get(keys::SCHEMA_VERSION, None);
        if stored.as_deref() == Some(current_version) {
            return false;
        }

        match self.repo.delete_prefix(KEY_NAMESPACE) {
            Ok(removed) => info!(
                "event=store_migrate module=store status=ok from={} to={} removed_keys={}",
                stored.as_deref().unwrap_or("none"),
                current_version,
                removed
            ),
            Err(err) => warn!(
                "event=store_migrate module=store status=error to={} error={}",
                current_version, err
            ),
        }
        self.set(keys::SCHEMA_VERSION, current_version);
        true
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }
}

fn namespaced(key: &str) -> String {
    format!("{KEY_NAMESPACE}{key}")
}
