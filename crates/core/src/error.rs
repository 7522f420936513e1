use thiserror::Error;

use crate::model::{AppSettingsError, ChecklistError, ItemError, SectionError};

/// Umbrella error for the domain layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Checklist(#[from] ChecklistError),
    #[error(transparent)]
    Section(#[from] SectionError),
    #[error(transparent)]
    Item(#[from] ItemError),
    #[error(transparent)]
    Settings(#[from] AppSettingsError),
}
