//! Currency persistence
//!
//! A single integer balance stored under a fixed key. Read once at startup (absent
//! means 0) and written after every change.
//!
//! Backends:
//! - `MemoryStore`: in-process, shareable handle (tests, headless runs)
//! - `FileStore`: JSON object on disk, written via tmp file + rename
//! - `LocalStorageStore`: browser LocalStorage (wasm32 only)

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::error::PersistenceError;

/// Key the balance is stored under
pub const CURRENCY_KEY: &str = "gameMoney";

/// Storage for the persisted currency balance
pub trait CurrencyStore: fmt::Debug {
    /// Stored balance, `None` if nothing has been saved yet
    fn load(&self) -> Result<Option<u64>, PersistenceError>;

    fn save(&mut self, amount: u64) -> Result<(), PersistenceError>;
}

/// In-memory store. Clones share the same slot, so a test can keep a handle and
/// observe what the economy wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Rc<Cell<Option<u64>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a balance
    pub fn with_balance(amount: u64) -> Self {
        Self {
            slot: Rc::new(Cell::new(Some(amount))),
        }
    }

    /// Last saved value
    pub fn value(&self) -> Option<u64> {
        self.slot.get()
    }
}

impl CurrencyStore for MemoryStore {
    fn load(&self) -> Result<Option<u64>, PersistenceError> {
        Ok(self.slot.get())
    }

    fn save(&mut self, amount: u64) -> Result<(), PersistenceError> {
        self.slot.set(Some(amount));
        Ok(())
    }
}

/// JSON file store: `{ "gameMoney": 1234 }`. Other keys in the file are preserved.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_map(&self) -> Result<serde_json::Map<String, serde_json::Value>, PersistenceError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(serde_json::Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl CurrencyStore for FileStore {
    fn load(&self) -> Result<Option<u64>, PersistenceError> {
        let map = self.read_map()?;
        match map.get(CURRENCY_KEY) {
            None => Ok(None),
            Some(value) => value.as_u64().map(Some).ok_or_else(|| PersistenceError::Corrupt {
                key: CURRENCY_KEY.to_string(),
                value: value.to_string(),
            }),
        }
    }

    fn save(&mut self, amount: u64) -> Result<(), PersistenceError> {
        // A corrupt file is replaced rather than blocking every future save
        let mut map = self.read_map().unwrap_or_default();
        map.insert(CURRENCY_KEY.to_string(), serde_json::Value::from(amount));

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(&map)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Browser LocalStorage store
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    fn storage() -> Result<web_sys::Storage, PersistenceError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| PersistenceError::Unavailable("LocalStorage".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl CurrencyStore for LocalStorageStore {
    fn load(&self) -> Result<Option<u64>, PersistenceError> {
        let storage = Self::storage()?;
        let Ok(item) = storage.get_item(CURRENCY_KEY) else {
            return Err(PersistenceError::Unavailable("LocalStorage read".to_string()));
        };
        match item {
            None => Ok(None),
            Some(text) => text.trim().parse().map(Some).map_err(|_| PersistenceError::Corrupt {
                key: CURRENCY_KEY.to_string(),
                value: text,
            }),
        }
    }

    fn save(&mut self, amount: u64) -> Result<(), PersistenceError> {
        Self::storage()?
            .set_item(CURRENCY_KEY, &amount.to_string())
            .map_err(|_| PersistenceError::Unavailable("LocalStorage write".to_string()))
    }
}
