//! Session record persistence.
//!
//! The save file is a hex SHA-256 digest line followed by the JSON record. The digest is salted
//! with the user's home directory, so a record copied from another account or edited by hand
//! fails its integrity check and is treated as absent.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::PersistenceError;

/// Overrides the save file location.
pub const SAVE_PATH_ENV: &str = "PACMAN_TERM_SAVE";

const SAVE_DIR: &str = "pacman-term";
const SAVE_FILE: &str = "savegame.dat";
const SALT: &str = "pacman-term-save-salt";

/// Progress that survives between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionRecord {
    pub mute: bool,
    /// Level to resume at. Empty starts at the first level.
    pub level_name: String,
    pub games_won: u32,
    pub high_score: u32,
    /// Best completion time per level name, in whole seconds.
    pub elapsed_time: BTreeMap<String, u64>,
}

impl SessionRecord {
    /// Keeps the smaller of the stored and the new completion time for a level.
    pub fn record_elapsed(&mut self, level: &str, seconds: u64) {
        self.elapsed_time
            .entry(level.to_string())
            .and_modify(|best| *best = (*best).min(seconds))
            .or_insert(seconds);
    }

    pub fn best_elapsed(&self, level: &str) -> Option<u64> {
        self.elapsed_time.get(level).copied()
    }

    pub fn record_score(&mut self, score: u32) {
        self.high_score = self.high_score.max(score);
    }
}

/// Where session records are kept.
pub trait SessionStore: Send {
    fn load(&self) -> Result<SessionRecord, PersistenceError>;
    fn save(&self, record: &SessionRecord) -> Result<(), PersistenceError>;

    /// Loads the stored record, falling back to a fresh one on any failure.
    fn load_or_default(&self) -> SessionRecord {
        match self.load() {
            Ok(record) => record,
            Err(PersistenceError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No saved session found");
                SessionRecord::default()
            }
            Err(e) => {
                warn!(error = %e, "Could not load the saved session, starting fresh");
                SessionRecord::default()
            }
        }
    }
}

/// Stores the record in a file guarded by a salted digest.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: Option<PathBuf>,
    salt: String,
}

impl FileStore {
    /// Resolves the save path from the environment or the user's config directory.
    pub fn from_env() -> Self {
        let path = std::env::var_os(SAVE_PATH_ENV).map(PathBuf::from).or_else(default_save_path);
        let home = std::env::var("HOME").unwrap_or_default();
        Self {
            path,
            salt: format!("{home}{SALT}"),
        }
    }

    pub fn at(path: impl Into<PathBuf>, salt: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            salt: salt.into(),
        }
    }

    fn digest(&self, json: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.salt.as_bytes());
        hasher.update(json);
        format!("{:x}", hasher.finalize())
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Result<SessionRecord, PersistenceError> {
        let path = self.path.as_ref().ok_or(PersistenceError::Unavailable)?;
        let contents = fs::read_to_string(path)?;
        let (digest, json) = contents.split_once('\n').ok_or(PersistenceError::Truncated)?;
        if json.is_empty() {
            return Err(PersistenceError::Truncated);
        }
        if digest != self.digest(json.as_bytes()) {
            return Err(PersistenceError::Integrity);
        }

        let record = serde_json::from_str(json)?;
        debug!(path = %path.display(), "Session loaded");
        Ok(record)
    }

    fn save(&self, record: &SessionRecord) -> Result<(), PersistenceError> {
        let path = self.path.as_ref().ok_or(PersistenceError::Unavailable)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(record)?;
        let contents = format!("{}\n{}", self.digest(json.as_bytes()), json);
        fs::write(path, contents)?;
        info!(path = %path.display(), level = %record.level_name, "Session saved");
        Ok(())
    }
}

/// Keeps the record in memory. Used when no save location is wanted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<Option<SessionRecord>>,
}

impl MemoryStore {
    /// The last saved record, if any.
    pub fn saved(&self) -> Option<SessionRecord> {
        self.record.lock().clone()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<SessionRecord, PersistenceError> {
        self.record.lock().clone().ok_or(PersistenceError::Unavailable)
    }

    fn save(&self, record: &SessionRecord) -> Result<(), PersistenceError> {
        *self.record.lock() = Some(record.clone());
        Ok(())
    }
}

fn default_save_path() -> Option<PathBuf> {
    let config_dir = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .filter(|dir| dir.is_absolute())
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(config_dir.join(SAVE_DIR).join(SAVE_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_elapsed_keeps_minimum() {
        let mut record = SessionRecord::default();
        record.record_elapsed("first", 40);
        record.record_elapsed("first", 55);
        record.record_elapsed("first", 31);
        assert_eq!(record.best_elapsed("first"), Some(31));
        assert_eq!(record.best_elapsed("second"), None);
    }

    #[test]
    fn test_high_score_only_grows() {
        let mut record = SessionRecord::default();
        record.record_score(120);
        record.record_score(80);
        assert_eq!(record.high_score, 120);
    }

    #[test]
    fn test_memory_store_without_record_is_unavailable() {
        let store = MemoryStore::default();
        assert!(matches!(store.load(), Err(PersistenceError::Unavailable)));
        assert_eq!(store.load_or_default(), SessionRecord::default());
    }
}
