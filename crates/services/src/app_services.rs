use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use storage::repository::{Storage, StorageError};

use crate::Clock;
use crate::autosave::Autosave;
use crate::catalog::TemplateCatalog;
use crate::checklist_service::ChecklistService;
use crate::error::AppServicesError;
use crate::export_service::ExportService;
use crate::settings_service::SettingsService;

/// Assembles the app-facing services over a single storage backend.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<TemplateCatalog>,
    checklists: Arc<ChecklistService>,
    export: Arc<ExportService>,
    settings: Arc<SettingsService>,
    autosave: Arc<Autosave>,
}

impl AppServices {
    /// Build services backed by JSON files under `state_dir`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the state directory cannot be prepared
    /// or initial loads fail.
    pub async fn new_json(state_dir: &Path, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::json(state_dir)?;
        Self::from_storage(storage, clock).await
    }

    /// Build services over an already-constructed storage backend.
    ///
    /// Settings load first so the autosave debounce window honors the
    /// persisted preference.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the initial loads fail.
    pub async fn from_storage(storage: Storage, clock: Clock) -> Result<Self, AppServicesError> {
        let settings_service = Arc::new(SettingsService::new(Arc::clone(&storage.settings)));
        let settings = settings_service.load().await?;

        let autosave = Arc::new(Autosave::start(
            Arc::clone(&storage.checklists),
            Duration::from_millis(u64::from(settings.autosave_debounce_ms())),
        ));
        let catalog = Arc::new(TemplateCatalog::builtin());
        let checklists = Arc::new(
            ChecklistService::load(
                clock,
                Arc::clone(&catalog),
                storage.checklists.as_ref(),
                Arc::clone(&autosave),
            )
            .await?,
        );
        let export = Arc::new(ExportService::new(clock));

        Ok(Self {
            catalog,
            checklists,
            export,
            settings: settings_service,
            autosave,
        })
    }

    #[must_use]
    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn checklists(&self) -> &ChecklistService {
        &self.checklists
    }

    #[must_use]
    pub fn export(&self) -> &ExportService {
        &self.export
    }

    #[must_use]
    pub fn settings(&self) -> &SettingsService {
        &self.settings
    }

    /// Forces any pending autosave write; call before process exit.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the forced write fails.
    pub async fn flush(&self) -> Result<(), StorageError> {
        self.autosave.flush().await
    }
}
