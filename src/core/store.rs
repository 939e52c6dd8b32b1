use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::models::DataSourceProfile;

/// Key holding the JSON list of saved data sources.
pub const PROFILES_KEY: &str = "hbaseDataSources";

/// Durable string key-value storage.
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), ClientError>;
}

/// One `<key>.json` file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read {:?}: {}", path, e);
                None
            }
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ClientError> {
        fs::create_dir_all(&self.dir)?;
        // Write beside the target and rename so a crash never leaves half a file
        let mut file = tempfile::NamedTempFile::new_in(&self.dir)?;
        file.write_all(value.as_bytes())?;
        file.flush()?;
        file.persist(self.path_for(key)).map_err(|e| e.error)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The saved data source list. Every write replaces the whole list.
pub struct ProfileStore {
    storage: Box<dyn Storage>,
}

impl ProfileStore {
    pub fn new(storage: impl Storage + 'static) -> Self {
        ProfileStore {
            storage: Box::new(storage),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// Saved profiles in order. Missing or unreadable data counts as an empty list.
    pub fn load(&self) -> Vec<DataSourceProfile> {
        let Some(raw) = self.storage.get_item(PROFILES_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<DataSourceProfile>>(&raw) {
            Ok(profiles) => {
                debug!("Loaded {} saved data sources", profiles.len());
                profiles
            }
            Err(e) => {
                warn!("Ignoring corrupt data source list: {}", e);
                Vec::new()
            }
        }
    }

    pub fn save_all(&self, profiles: &[DataSourceProfile]) -> Result<(), ClientError> {
        let raw = serde_json::to_string(profiles)?;
        self.storage.set_item(PROFILES_KEY, &raw)
    }
}
