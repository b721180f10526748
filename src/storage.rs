//! Key-value persistence used by the progress store.
//!
//! Values are whole documents (JSON text or a bare string) rewritten on every
//! update, the same shape a browser local storage entry has.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use anyhow::Result;

use crate::db::Database;

pub const PROGRESS_KEY: &str = "progress";
pub const NUTRITION_KEY: &str = "nutrition";
pub const THEME_KEY: &str = "theme";

#[derive(Clone)]
pub enum Storage {
    Sqlite(Database),
    Memory(MemoryStore),
}

impl Storage {
    pub fn memory() -> Self {
        Storage::Memory(MemoryStore::default())
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        match self {
            Storage::Sqlite(db) => db.get_value(key).await,
            Storage::Memory(store) => Ok(store.get(key)),
        }
    }

    pub async fn set(&self, key: &str, value: String) -> Result<()> {
        match self {
            Storage::Sqlite(db) => db.set_value(key, value).await,
            Storage::Memory(store) => store.set(key, value),
        }
    }
}

impl From<Database> for Storage {
    fn from(db: Database) -> Self {
        Storage::Sqlite(db)
    }
}

/// Process-local map. Can be made read-only to exercise storage failures.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    read_only: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn get(&self, key: &str) -> Option<String> {
        let guard = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.get(key).cloned()
    }

    pub fn set(&self, key: &str, value: String) -> Result<()> {
        if self.is_read_only() {
            anyhow::bail!("storage is read-only, cannot write '{key}'");
        }
        let mut guard = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.insert(key.to_string(), value);
        Ok(())
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    fn is_read_only(&self) -> bool {
        self.read_only.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_round_trips_and_blocks_writes_when_read_only() {
        let store = MemoryStore::default();
        let storage = Storage::Memory(store.clone());

        storage.set(THEME_KEY, "light".into()).await.unwrap();
        assert_eq!(storage.get(THEME_KEY).await.unwrap().as_deref(), Some("light"));

        store.set_read_only(true);
        assert!(storage.set(THEME_KEY, "dark".into()).await.is_err());
        assert_eq!(storage.get(THEME_KEY).await.unwrap().as_deref(), Some("light"));
    }
}
