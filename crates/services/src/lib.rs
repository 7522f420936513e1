#![forbid(unsafe_code)]

pub mod app_services;
pub mod autosave;
pub mod catalog;
pub mod checklist_service;
pub mod error;
pub mod export_service;
pub mod settings_service;

pub use preflight_core::Clock;

pub use app_services::AppServices;
pub use autosave::Autosave;
pub use catalog::TemplateCatalog;
pub use checklist_service::ChecklistService;
pub use error::{
    AppServicesError, ChecklistServiceError, ExportError, SettingsServiceError,
};
pub use export_service::{ExportDocument, ExportFormat, ExportOptions, ExportService};
pub use settings_service::SettingsService;
