//! Flat-file JSON ledger storage.
//!
//! Each ledger is one logical JSON document, rewritten in full on every
//! mutation. Writes go to a temp file first and are renamed into place so
//! a crash mid-write never truncates a ledger.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::error::PersistenceError;

/// The independently persisted documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ledger {
    Categories,
    Nominations,
    Votes,
    Countdowns,
    CommunityConfig,
}

impl Ledger {
    fn file_name(self) -> &'static str {
        match self {
            Ledger::Categories => "categories.json",
            Ledger::Nominations => "nominations.json",
            Ledger::Votes => "votes.json",
            Ledger::Countdowns => "countdowns.json",
            Ledger::CommunityConfig => "config.json",
        }
    }
}

/// Loads and saves whole-ledger blobs.
pub trait LedgerStore: Send + Sync {
    /// Returns `None` if the ledger has never been written.
    fn load(&self, ledger: Ledger) -> Result<Option<String>, PersistenceError>;

    /// Atomically replace the ledger's contents.
    fn save(&self, ledger: Ledger, contents: &str) -> Result<(), PersistenceError>;
}

/// Returns `~/.config/ovation[-dev]/` based on OVATION_ENV, or the
/// directory named by OVATION_DATA_DIR when set.
///
/// Set OVATION_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, PersistenceError> {
    let dir = if let Ok(custom) = std::env::var("OVATION_DATA_DIR") {
        PathBuf::from(custom)
    } else {
        let base_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config");
        let env = std::env::var("OVATION_ENV").unwrap_or_else(|_| "production".to_string());
        if env == "dev" {
            base_dir.join("ovation-dev")
        } else {
            base_dir.join("ovation")
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// File-backed store: one JSON file per ledger under the data directory.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open the store rooted at the default data directory.
    pub fn open() -> Result<Self, PersistenceError> {
        Ok(Self { dir: data_dir()? })
    }

    /// Open the store rooted at a custom directory.
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self, ledger: Ledger) -> Result<Option<String>, PersistenceError> {
        let path = self.dir.join(ledger.file_name());
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn save(&self, ledger: Ledger, contents: &str) -> Result<(), PersistenceError> {
        let path = self.dir.join(ledger.file_name());
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-memory store for tests and embedders that manage durability
/// themselves. `reject_writes` makes every save fail, to exercise the
/// error path where the in-memory ledger is ahead of disk.
pub struct MemoryStore {
    blobs: Mutex<HashMap<Ledger, String>>,
    reject_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            blobs: Mutex::new(HashMap::new()),
            reject_writes: AtomicBool::new(false),
        }
    }

    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self, ledger: Ledger) -> Result<Option<String>, PersistenceError> {
        Ok(self.blobs.lock().unwrap().get(&ledger).cloned())
    }

    fn save(&self, ledger: Ledger, contents: &str) -> Result<(), PersistenceError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::WriteRejected(
                "memory store is rejecting writes".to_string(),
            ));
        }
        self.blobs.lock().unwrap().insert(ledger, contents.to_string());
        Ok(())
    }
}
