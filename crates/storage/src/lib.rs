#![forbid(unsafe_code)]

//! Persistence layer: snapshot records, store contracts, and the JSON-file
//! adapter used by the app.

pub mod json;
pub mod repository;

pub use json::{JsonInitError, JsonStore};
pub use repository::{
    ChecklistSnapshot, ChecklistStore, InMemoryStore, ItemRecord, SectionRecord, SettingsRecord,
    SettingsStore, Storage, StorageError,
};
