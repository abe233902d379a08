//! Recent location history.
//!
//! The history is a short most-recent-first list of queried locations,
//! deduplicated and capped. It is mirrored to durable storage after every
//! new query and read back once at session start:
//! - wasm32: browser `localStorage`
//! - native: a JSON file in the platform data directory
//! - anywhere: an in-memory store (tests, headless hosts)

use std::cell::RefCell;
use std::rc::Rc;

use crate::constants::{HISTORY_LIMIT, HISTORY_STORAGE_KEY};

/// Errors that can occur when reading or writing persisted history.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// Stored value is not a JSON array of strings
    #[error("Malformed history: {0}")]
    Malformed(#[from] serde_json::Error),

    /// I/O error on the history file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage error (localStorage in WASM)
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Durable storage for the encoded history list.
pub trait HistoryStore {
    /// Read the stored JSON, or None if nothing was stored yet.
    fn read(&self) -> Result<Option<String>, HistoryError>;

    /// Replace the stored JSON.
    fn write(&mut self, json: &str) -> Result<(), HistoryError>;
}

/// Bounded, deduplicated, most-recent-first list of locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentHistory {
    entries: Vec<String>,
    limit: usize,
}

impl RecentHistory {
    /// Create an empty history holding at most `limit` entries (1..=5).
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: limit.clamp(1, HISTORY_LIMIT),
        }
    }

    /// Build from a stored list, dropping duplicates and overflow.
    pub fn from_entries(entries: impl IntoIterator<Item = String>, limit: usize) -> Self {
        let mut history = Self::new(limit);
        for entry in entries {
            if history.entries.len() >= history.limit {
                break;
            }
            if !history.entries.contains(&entry) {
                history.entries.push(entry);
            }
        }
        history
    }

    /// Read the history from a store.
    ///
    /// Absent or malformed data yields an empty history. Never fails.
    pub fn restore(store: &dyn HistoryStore, limit: usize) -> Self {
        let json = match store.read() {
            Ok(Some(json)) => json,
            Ok(None) => {
                log::debug!("No stored location history");
                return Self::new(limit);
            }
            Err(e) => {
                log::warn!("Failed to read location history: {}", e);
                return Self::new(limit);
            }
        };

        match serde_json::from_str::<Vec<String>>(&json) {
            Ok(entries) => {
                let history = Self::from_entries(entries, limit);
                log::info!("Restored {} recent locations", history.len());
                history
            }
            Err(e) => {
                log::warn!("Ignoring malformed location history: {}", e);
                Self::new(limit)
            }
        }
    }

    /// Move `location` to the front, inserting it if absent.
    pub fn push(&mut self, location: &str) {
        self.entries.retain(|entry| entry != location);
        self.entries.insert(0, location.to_string());
        self.entries.truncate(self.limit);
    }

    /// Write the history to a store.
    pub fn persist(&self, store: &mut dyn HistoryStore) -> Result<(), HistoryError> {
        let json = serde_json::to_string(&self.entries)?;
        store.write(&json)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn contains(&self, location: &str) -> bool {
        self.entries.iter().any(|entry| entry == location)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for RecentHistory {
    fn default() -> Self {
        Self::new(HISTORY_LIMIT)
    }
}

/// In-memory history store.
///
/// Clones share the same slot, so a host can keep a handle to inspect what
/// the session persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    slot: Rc<RefCell<Option<String>>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with raw stored content.
    pub fn with_contents(json: impl Into<String>) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(json.into()))),
        }
    }

    /// Currently stored JSON.
    pub fn contents(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn read(&self) -> Result<Option<String>, HistoryError> {
        Ok(self.slot.borrow().clone())
    }

    fn write(&mut self, json: &str) -> Result<(), HistoryError> {
        *self.slot.borrow_mut() = Some(json.to_string());
        Ok(())
    }
}

/// History stored as a JSON file (native only).
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileHistoryStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// History file in the platform data directory, if one can be found.
    pub fn default_path() -> Option<std::path::PathBuf> {
        let base = dirs::data_dir().or_else(|| dirs::home_dir().map(|h| h.join(".local/share")))?;
        Some(
            base.join("satview")
                .join(format!("{}.json", HISTORY_STORAGE_KEY)),
        )
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl HistoryStore for FileHistoryStore {
    fn read(&self) -> Result<Option<String>, HistoryError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, json: &str) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;
        log::debug!("Saved location history to {:?}", self.path);
        Ok(())
    }
}

/// History stored under a single browser `localStorage` key (WASM only).
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageHistoryStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageHistoryStore {
    fn storage() -> Result<web_sys::Storage, HistoryError> {
        let window = web_sys::window()
            .ok_or_else(|| HistoryError::Storage("No window object available".to_string()))?;
        window
            .local_storage()
            .map_err(|e| HistoryError::Storage(format!("localStorage access error: {:?}", e)))?
            .ok_or_else(|| HistoryError::Storage("localStorage not available".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl HistoryStore for LocalStorageHistoryStore {
    fn read(&self) -> Result<Option<String>, HistoryError> {
        Self::storage()?
            .get_item(HISTORY_STORAGE_KEY)
            .map_err(|e| HistoryError::Storage(format!("Failed to read localStorage: {:?}", e)))
    }

    fn write(&mut self, json: &str) -> Result<(), HistoryError> {
        Self::storage()?
            .set_item(HISTORY_STORAGE_KEY, json)
            .map_err(|e| HistoryError::Storage(format!("Failed to save to localStorage: {:?}", e)))
    }
}
