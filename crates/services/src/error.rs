//! Shared error types for the services crate.

use thiserror::Error;

use preflight_core::model::{AppSettingsError, ChecklistError, TemplateId};
use storage::json::JsonInitError;
use storage::repository::StorageError;

/// Errors emitted by `ChecklistService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChecklistServiceError {
    #[error("no active checklist; start one from a template")]
    NoActiveChecklist,

    #[error("unknown template: {0}")]
    UnknownTemplate(TemplateId),

    #[error(transparent)]
    Checklist(#[from] ChecklistError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ExportService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error("failed to write export file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors emitted by `SettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsServiceError {
    #[error(transparent)]
    Settings(#[from] AppSettingsError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Init(#[from] JsonInitError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Settings(#[from] SettingsServiceError),

    #[error(transparent)]
    Checklist(#[from] ChecklistServiceError),
}
