use crate::model::Session;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, warn};

pub const KEY_BASE_URL: &str = "baseUrl";
pub const KEY_ACCESS_TOKEN: &str = "accessToken";
pub const KEY_REFRESH_TOKEN: &str = "refreshToken";
pub const KEY_EXPIRES_IN: &str = "expiresIn";

pub const SESSION_KEYS: [&str; 4] = [
    KEY_BASE_URL,
    KEY_ACCESS_TOKEN,
    KEY_REFRESH_TOKEN,
    KEY_EXPIRES_IN,
];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store io at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session store file {path} is not a string map: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("session store backend failed for {key}: {message}")]
    Backend { key: String, message: String },
    #[error("session store lock poisoned")]
    Poisoned,
}

/// Durable string key/value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Writes every entry. Backends that can commit all entries at once
    /// override this; the default writes them one at a time.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}

/// JSON object file holding every key. Multi-key writes go through a temp
/// file and a rename, so readers never see half a session.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let data = fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;
        if data.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&data).map_err(|source| StoreError::Format {
            path: self.path.clone(),
            source,
        })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        let data = serde_json::to_string_pretty(map).map_err(|source| StoreError::Format {
            path: self.path.clone(),
            source,
        })?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, data).map_err(|source| StoreError::Io {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &self.path).map_err(|source| self.io_error(source))
    }

    fn update<F>(&self, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _lock = self.guard.lock().map_err(|_| StoreError::Poisoned)?;
        let mut map = self.read_map()?;
        apply(&mut map);
        self.write_map(&map)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _lock = self.guard.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_many(&[(key, value)])
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.remove_many(&[key])
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        self.update(|map| {
            for (key, value) in entries {
                map.insert(key.to_string(), value.to_string());
            }
        })
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        self.update(|map| {
            for key in keys {
                map.remove(*key);
            }
        })
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_many(&[(key, value)])
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn set_many(&self, items: &[(&str, &str)]) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        for (key, value) in items {
            entries.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

/// Typed view of the four session keys over any [`KeyValueStore`].
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn backend(&self) -> &dyn KeyValueStore {
        self.backend.as_ref()
    }

    /// Returns `None` unless all four keys are present and the expiry parses.
    pub fn load(&self) -> Result<Option<Session>, StoreError> {
        let base_url = self.backend.get(KEY_BASE_URL)?;
        let access_token = self.backend.get(KEY_ACCESS_TOKEN)?;
        let refresh_token = self.backend.get(KEY_REFRESH_TOKEN)?;
        let expires = self.backend.get(KEY_EXPIRES_IN)?;
        let (Some(base_url), Some(access_token), Some(refresh_token), Some(expires)) =
            (base_url, access_token, refresh_token, expires)
        else {
            debug!("No complete session stored");
            return Ok(None);
        };
        let Ok(expires_at_epoch_ms) = expires.trim().parse::<i64>() else {
            warn!(value = %expires, "Stored session expiry is not an epoch-ms integer");
            return Ok(None);
        };
        Ok(Some(Session {
            base_url,
            access_token,
            refresh_token,
            expires_at_epoch_ms,
        }))
    }

    pub fn commit(&self, session: &Session) -> Result<(), StoreError> {
        let expires = session.expires_at_epoch_ms.to_string();
        self.backend.set_many(&[
            (KEY_BASE_URL, session.base_url.as_str()),
            (KEY_ACCESS_TOKEN, session.access_token.as_str()),
            (KEY_REFRESH_TOKEN, session.refresh_token.as_str()),
            (KEY_EXPIRES_IN, expires.as_str()),
        ])
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.backend.remove_many(&SESSION_KEYS)
    }
}
