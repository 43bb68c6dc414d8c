//! Durable token slot
//!
//! The bearer token is mirrored into a small key-value store so that a new process can
//! pick the session back up. The in-memory session owns the truth while running; this
//! slot is only a mirror.

use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Key the bearer token is stored under unless configured otherwise
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// File name of the key-value store inside the state directory
const STORAGE_FILE: &str = "storage.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Corrupt storage file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A single durable string slot holding the bearer token
pub trait TokenStore: Send + Sync {
    /// Read the stored token
    fn get(&self) -> Result<Option<String>, StorageError>;

    /// Replace the stored token
    fn set(&self, token: &str) -> Result<(), StorageError>;

    /// Delete the stored token. Deleting an absent token succeeds.
    fn remove(&self) -> Result<(), StorageError>;
}

/// In-process token slot
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot that already holds a token, as after a reload
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn set(&self, token: &str) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }
}

/// Token slot backed by a JSON object file
///
/// The file may hold other keys; only the configured key is touched. A file that no
/// longer parses reads as empty and is replaced on the next write.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    key: String,
    // serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileTokenStore {
    /// Create a store over an explicit file
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
            lock: Mutex::new(()),
        }
    }

    /// Create a store inside `state_dir`, or the platform data directory when unset
    pub fn in_state_dir(state_dir: Option<&Path>, key: impl Into<String>) -> Self {
        let dir = state_dir.map_or_else(default_state_dir, Path::to_path_buf);
        Self::new(dir.join(STORAGE_FILE), key)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(err.into()),
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    /// Read the entries, discarding a file that no longer parses
    ///
    /// The flag is set when the file was discarded and must be rewritten.
    fn load(&self) -> Result<(BTreeMap<String, String>, bool), StorageError> {
        match self.read_entries() {
            Ok(entries) => Ok((entries, false)),
            Err(StorageError::Corrupt(err)) => {
                warn!(path = %self.path.display(), error = %err, "Discarding corrupt storage file");
                Ok((BTreeMap::new(), true))
            }
            Err(err) => Err(err),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;

        // The file holds a credential; owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut entries, _) = self.load()?;
        Ok(entries.remove(&self.key))
    }

    fn set(&self, token: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut entries, _) = self.load()?;
        entries.insert(self.key.clone(), token.to_string());
        self.write_entries(&entries)?;
        debug!("Stored token in {}", self.path.display());
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut entries, discarded) = self.load()?;
        if entries.remove(&self.key).is_some() || discarded {
            self.write_entries(&entries)?;
            debug!("Removed token from {}", self.path.display());
        }
        Ok(())
    }
}

fn default_state_dir() -> PathBuf {
    if let Some(dirs) = ProjectDirs::from("dev", "Porter", "porter") {
        dirs.data_dir().to_path_buf()
    } else {
        warn!("Failed to determine platform data directory, using ./data");
        PathBuf::from("./data")
    }
}
