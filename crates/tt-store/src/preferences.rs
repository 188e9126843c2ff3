//! Small string key/value persistence surviving app restarts
//!
//! [`FilePreferences`] keeps every key in one JSON file, rewritten on each
//! change. The file is versioned; an unknown version starts empty.

use anyhow::{Context, bail};
use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{Result, StoreError};

pub const LAST_PROJECT: &str = "lastProject";
pub const LAST_FILTER: &str = "lastFilter";
pub const LAST_SORT: &str = "lastSort";
pub const TOKEN: &str = "token";
pub const DEVICE_ID: &str = "did";

const FILE_VERSION: u8 = 1;

#[async_trait]
pub trait Preferences: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory preferences, lost on exit
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: Mutex::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    fn values(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Preferences for MemoryPreferences {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values().remove(key);
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PreferencesFile {
    version: u8,
    values: BTreeMap<String, String>,
}

/// Preferences persisted to a JSON file
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FilePreferences {
    /// Open the preferences file, starting empty if it does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();

        let values = if path.exists() {
            Self::load_from_disk(&path).unwrap_or_else(|e| {
                warn!(
                    "Failed to load preferences from {}: {:#}, starting empty",
                    path.display(),
                    e
                );
                BTreeMap::new()
            })
        } else {
            BTreeMap::new()
        };

        debug!(
            "Preferences opened from {} with {} keys",
            path.display(),
            values.len()
        );

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_disk(path: &Path) -> anyhow::Result<BTreeMap<String, String>> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file: PreferencesFile =
            serde_json::from_str(&content).context("Failed to parse preferences file")?;

        if file.version != FILE_VERSION {
            bail!("unsupported preferences file version {}", file.version);
        }

        Ok(file.values)
    }

    fn save_to_disk(&self, values: &BTreeMap<String, String>) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        let file = PreferencesFile {
            version: FILE_VERSION,
            values: values.clone(),
        };
        let content = serde_json::to_string_pretty(&file)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        apply(&mut values);
        self.save_to_disk(&values)
            .map_err(|e| StoreError::Preferences(format!("{:#}", e)))
    }
}

#[async_trait]
impl Preferences for FilePreferences {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        debug!("Preferences SET: {}", key);
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    async fn remove(&self, key: &str) -> Result<()> {
        debug!("Preferences REMOVE: {}", key);
        self.update(|values| {
            values.remove(key);
        })
    }
}
