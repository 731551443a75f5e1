//! Key-value persistence for the little state that outlives a session.

use log::{debug, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::event::EventId;

const STATE_FILE: &str = "state.json";
// Maximum allowed size for the state file (10MB)
const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Storage key of the registered event ids.
pub const REGISTERED_EVENTS_KEY: &str = "registeredEvents";

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("State I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse state data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("State file {0} exceeds size limit")]
    TooLarge(PathBuf),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StateError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StateError>;
}

/// Process-local store, used when nothing should touch the disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StateError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StateError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// All keys in a single JSON object on disk. Loaded once, rewritten on set.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn open(state_dir: &Path) -> Result<Self, StateError> {
        std::fs::create_dir_all(state_dir)?;
        let path = state_dir.join(STATE_FILE);
        let entries = load_entries(&path)?;
        debug!("Loaded {} state entries from {}", entries.len(), path.display());
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), StateError> {
        let file = OpenOptions::new().write(true).create(true).truncate(true).open(&self.path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.entries)?;
        Ok(())
    }
}

fn load_entries(path: &Path) -> Result<BTreeMap<String, String>, StateError> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let metadata = std::fs::metadata(path)?;
    if metadata.len() > MAX_FILE_SIZE {
        return Err(StateError::TooLarge(path.to_path_buf()));
    }

    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StateError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StateError> {
        self.entries.insert(key.to_string(), value);
        self.save()
    }
}

/// Events the user signed up for.
#[derive(Debug)]
pub struct Registrations<S> {
    store: S,
    ids: Vec<EventId>,
}

#[derive(Deserialize)]
#[serde(transparent)]
struct RegisteredIds(Vec<EventId>);

impl<S: KeyValueStore> Registrations<S> {
    /// Reads the stored ids. A corrupt value is logged and treated as empty.
    pub fn load(store: S) -> Result<Self, StateError> {
        let ids = match store.get(REGISTERED_EVENTS_KEY)? {
            Some(raw) => match serde_json::from_str::<RegisteredIds>(&raw) {
                Ok(RegisteredIds(ids)) => ids,
                Err(err) => {
                    warn!("Ignoring unreadable registrations: {err}");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        Ok(Self { store, ids })
    }

    pub fn ids(&self) -> &[EventId] {
        &self.ids
    }

    pub fn is_registered(&self, id: EventId) -> bool {
        self.ids.contains(&id)
    }

    /// Returns false when already registered.
    pub fn register(&mut self, id: EventId) -> Result<bool, StateError> {
        if self.is_registered(id) {
            return Ok(false);
        }
        let mut ids = self.ids.clone();
        ids.push(id);
        self.commit(ids)?;
        Ok(true)
    }

    /// Returns false when there was nothing to remove.
    pub fn unregister(&mut self, id: EventId) -> Result<bool, StateError> {
        if !self.is_registered(id) {
            return Ok(false);
        }
        let ids = self.ids.iter().copied().filter(|registered| *registered != id).collect();
        self.commit(ids)?;
        Ok(true)
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Writes `ids` first; memory only changes once the store accepted them.
    fn commit(&mut self, ids: Vec<EventId>) -> Result<(), StateError> {
        let raw = serde_json::to_string(&ids)?;
        self.store.set(REGISTERED_EVENTS_KEY, raw)?;
        self.ids = ids;
        Ok(())
    }
}
