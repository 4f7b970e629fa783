use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

/// Fixed keys under which the dashboard persists its state
pub mod keys {
    pub const TASKS: &str = "tasks";
    pub const PROJECTS: &str = "projects";
    pub const STREAK: &str = "streak";
    pub const LAST_COMPLETION_DATE: &str = "lastCompletionDate";
    /// Streak completion records
    pub const HISTORY: &str = "history";
    pub const QUICK_NOTES: &str = "quickNotes";
    pub const DAILY_GOAL: &str = "dailyGoal";
    pub const POMODORO_MODE: &str = "pomodoro_mode";
    pub const POMODORO_RUNNING: &str = "pomodoro_running";
    pub const POMODORO_REMAINING: &str = "pomodoro_remaining";
    pub const POMODORO_CYCLES: &str = "pomodoro_cycles";
    pub const LAST_BACKUP_DATE: &str = "lastBackupDate";

    pub const ALL: [&str; 12] = [
        TASKS,
        PROJECTS,
        STREAK,
        LAST_COMPLETION_DATE,
        HISTORY,
        QUICK_NOTES,
        DAILY_GOAL,
        POMODORO_MODE,
        POMODORO_RUNNING,
        POMODORO_REMAINING,
        POMODORO_CYCLES,
        LAST_BACKUP_DATE,
    ];
}

/// Error type for key-value store writes
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        source: io::Error,
    },
    #[error("could not serialize '{key}': {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },
}

/// String-keyed storage of JSON values.
///
/// Reads never fail at the typed layer: anything missing or unreadable falls
/// back to the caller's default. Writes propagate.
pub trait KeyValueStore {
    /// Raw stored text for `key`, or `None` if nothing is stored.
    fn read_raw(&self, key: &str) -> io::Result<Option<String>>;

    fn write_raw(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// Parse the value under `key`, or return `default` when it is missing,
    /// unreadable or malformed. Never fails.
    fn load_or_default<T: DeserializeOwned>(&self, key: &str, default: T) -> T
    where
        Self: Sized,
    {
        match self.read_raw(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    log::warn!("malformed value for '{}', using default: {}", key, e);
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                log::warn!("could not read '{}', using default: {}", key, e);
                default
            }
        }
    }

    /// Serialize `value` as JSON under `key`.
    fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.write_raw(key, &json)
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// One `<key>.json` file per key inside a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) the data directory at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(FileStore { dir })
    }

    pub fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn read_raw(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write_raw(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.key_path(key);
        atomic_write(&path, value.as_bytes()).map_err(|source| StoreError::Io { path, source })
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.key_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Store that lives only as long as the value does
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn read_raw(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write_raw(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}
