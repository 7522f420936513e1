//! JSON-file snapshot store.
//!
//! One file per concern under a state directory; each save serializes the
//! full snapshot and replaces the file via a temp-file rename. Malformed or
//! missing state degrades to "nothing stored" with a warning so callers fall
//! back to in-memory defaults instead of crashing.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

use crate::repository::{
    ChecklistSnapshot, ChecklistStore, SettingsRecord, SettingsStore, Storage, StorageError,
};

const CHECKLIST_FILE: &str = "checklist.json";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum JsonInitError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// File-backed store keeping one JSON document per concern.
#[derive(Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Opens (and creates if needed) the state directory.
    ///
    /// # Errors
    ///
    /// Returns `JsonInitError` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, JsonInitError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    async fn read_document<T: DeserializeOwned>(
        &self,
        file: &str,
    ) -> Result<Option<T>, StorageError> {
        let path = self.path(file);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StorageError::Io(err.to_string())),
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                // Unreadable state falls back to defaults; the file will be
                // overwritten wholesale on the next save.
                warn!(file, error = %err, "stored snapshot is malformed, ignoring it");
                Ok(None)
            }
        }
    }

    async fn write_document<T: Serialize>(&self, file: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(value)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        let path = self.path(file);
        let tmp = self.dir.join(format!("{file}.tmp"));
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|err| StorageError::Io(err.to_string()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|err| StorageError::Io(err.to_string()))?;
        Ok(())
    }

    async fn remove_document(&self, file: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.path(file)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Io(err.to_string())),
        }
    }
}

#[async_trait]
impl ChecklistStore for JsonStore {
    async fn save(&self, snapshot: &ChecklistSnapshot) -> Result<(), StorageError> {
        self.write_document(CHECKLIST_FILE, snapshot).await
    }

    async fn load(&self) -> Result<Option<ChecklistSnapshot>, StorageError> {
        self.read_document(CHECKLIST_FILE).await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.remove_document(CHECKLIST_FILE).await
    }
}

#[async_trait]
impl SettingsStore for JsonStore {
    async fn save_settings(&self, settings: &SettingsRecord) -> Result<(), StorageError> {
        self.write_document(SETTINGS_FILE, settings).await
    }

    async fn load_settings(&self) -> Result<Option<SettingsRecord>, StorageError> {
        self.read_document(SETTINGS_FILE).await
    }
}

impl Storage {
    /// Build a `Storage` backed by JSON files under `dir`.
    ///
    /// # Errors
    ///
    /// Returns `JsonInitError` if the state directory cannot be created.
    pub fn json(dir: impl Into<PathBuf>) -> Result<Self, JsonInitError> {
        let store = JsonStore::open(dir)?;
        let checklists: std::sync::Arc<dyn ChecklistStore> = std::sync::Arc::new(store.clone());
        let settings: std::sync::Arc<dyn SettingsStore> = std::sync::Arc::new(store);
        Ok(Self {
            checklists,
            settings,
        })
    }
}
