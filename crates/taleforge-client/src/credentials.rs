//! Credential storage.
//!
//! Tokens live under string keys. The store is shared between the gateway
//! (which reads the access token for every request) and the session view
//! (which clears everything on an authentication failure).

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use crate::CredentialError;

/// Key of the bearer token attached to requests.
pub const ACCESS_TOKEN: &str = "access";

/// Key of the refresh token.
pub const REFRESH_TOKEN: &str = "refresh";

/// Key-value token storage.
pub trait CredentialStore: Send + Sync {
    /// Value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError>;

    /// Remove every stored credential.
    fn clear(&self) -> Result<(), CredentialError>;
}

/// In-process store. Lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryCredentials {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCredentials {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding only an access token.
    pub fn with_access_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.entries_mut().insert(ACCESS_TOKEN.to_owned(), token.into());
        store
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries_mut().is_empty()
    }

    fn entries_mut(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CredentialStore for MemoryCredentials {
    fn get(&self, key: &str) -> Option<String> {
        self.entries_mut().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        self.entries_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        self.entries_mut().clear();
        Ok(())
    }
}

/// Store persisted as a flat JSON object.
///
/// The whole file is rewritten on every change. A missing file reads as an
/// empty store; [`CredentialStore::clear`] deletes it.
#[derive(Debug)]
pub struct FileCredentials {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileCredentials {
    /// Load the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CredentialError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };
        tracing::debug!(path = %path.display(), count = entries.len(), "loaded credentials");
        Ok(Self { path, entries: Mutex::new(entries) })
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(entries)?)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentials {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
        self.persist(&entries)
    }

    fn clear(&self) -> Result<(), CredentialError> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
