use std::sync::Arc;

use tracing::warn;

use preflight_core::model::{AppSettings, AppSettingsDraft};
use storage::repository::{SettingsRecord, SettingsStore};

use crate::error::SettingsServiceError;

#[derive(Clone)]
pub struct SettingsService {
    store: Arc<dyn SettingsStore>,
}

impl SettingsService {
    #[must_use]
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// Load persisted settings, falling back to defaults when nothing is
    /// stored or the stored values no longer validate.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError::Storage` on unrecoverable IO failures.
    pub async fn load(&self) -> Result<AppSettings, SettingsServiceError> {
        let Some(record) = self.store.load_settings().await? else {
            return Ok(AppSettings::default());
        };

        match record.into_settings() {
            Ok(settings) => Ok(settings),
            Err(err) => {
                warn!(error = %err, "stored settings failed validation, using defaults");
                Ok(AppSettings::default())
            }
        }
    }

    /// Validate and persist new settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError::Settings` if validation fails, or
    /// `SettingsServiceError::Storage` if persistence fails.
    pub async fn save(
        &self,
        draft: AppSettingsDraft,
    ) -> Result<AppSettings, SettingsServiceError> {
        let settings = draft.validate()?;
        self.store
            .save_settings(&SettingsRecord::from_settings(&settings))
            .await?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryStore;

    #[tokio::test]
    async fn load_defaults_when_nothing_stored() {
        let service = SettingsService::new(Arc::new(InMemoryStore::new()));
        let settings = service.load().await.unwrap();
        assert_eq!(settings, AppSettings::default());
    }

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let service = SettingsService::new(Arc::new(InMemoryStore::new()));

        let mut draft = AppSettingsDraft::new();
        draft.exporter_name = Some("Dana".into());
        draft.autosave_debounce_ms = 2_000;
        let saved = service.save(draft).await.unwrap();

        let loaded = service.load().await.unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.exporter_name(), Some("Dana"));
        assert_eq!(loaded.autosave_debounce_ms(), 2_000);
    }

    #[tokio::test]
    async fn invalid_draft_is_rejected_without_persisting() {
        let store = InMemoryStore::new();
        let service = SettingsService::new(Arc::new(store.clone()));

        let mut draft = AppSettingsDraft::new();
        draft.autosave_debounce_ms = 1;
        assert!(matches!(
            service.save(draft).await.unwrap_err(),
            SettingsServiceError::Settings(_)
        ));

        assert_eq!(service.load().await.unwrap(), AppSettings::default());
    }

    #[tokio::test]
    async fn corrupt_stored_settings_fall_back_to_defaults() {
        let store = InMemoryStore::new();
        let record = SettingsRecord {
            exporter_name: None,
            autosave_debounce_ms: 5, // below the validated minimum
            show_completed_sections: true,
            confirm_reset: true,
        };
        store.save_settings(&record).await.unwrap();

        let service = SettingsService::new(Arc::new(store));
        assert_eq!(service.load().await.unwrap(), AppSettings::default());
    }
}
