use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use preflight_core::model::{
    AppSettings, AppSettingsError, Checklist, ChecklistError, ChecklistId, Item, ItemError,
    ItemId, Priority, Section, SectionId, TemplateId,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── SNAPSHOT RECORDS ──────────────────────────────────────────────────────────
//

/// Persisted shape for an item.
///
/// Records mirror the domain model so stores can serialize whole snapshots
/// without leaking storage concerns into `preflight-core`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub title: String,
    pub description: Option<String>,
    pub required: bool,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub photo: Option<String>,
    pub tags: Vec<String>,
}

impl ItemRecord {
    #[must_use]
    pub fn from_item(item: &Item) -> Self {
        Self {
            id: item.id(),
            title: item.title().to_owned(),
            description: item.description().map(str::to_owned),
            required: item.required(),
            completed: item.completed(),
            completed_at: item.completed_at(),
            notes: item.notes().map(str::to_owned),
            photo: item.photo().map(str::to_owned),
            tags: item.tags().to_vec(),
        }
    }

    /// Convert the record back into a domain `Item`, re-running validation.
    ///
    /// # Errors
    ///
    /// Returns `ItemError` if the stored title fails validation.
    pub fn into_item(self) -> Result<Item, ItemError> {
        Item::from_persisted(
            self.id,
            self.title,
            self.description,
            self.required,
            self.completed,
            self.completed_at,
            self.notes,
            self.photo,
            self.tags,
        )
    }
}

/// Persisted shape for a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub id: SectionId,
    pub title: String,
    pub description: Option<String>,
    pub items: Vec<ItemRecord>,
    pub collapsed: bool,
    pub position: u32,
}

impl SectionRecord {
    #[must_use]
    pub fn from_section(section: &Section) -> Self {
        Self {
            id: section.id(),
            title: section.title().to_owned(),
            description: section.description().map(str::to_owned),
            items: section.items().iter().map(ItemRecord::from_item).collect(),
            collapsed: section.collapsed(),
            position: section.position(),
        }
    }

    /// Convert the record back into a domain `Section`.
    ///
    /// # Errors
    ///
    /// Returns `SectionError` for title failures and `ItemError` (wrapped into
    /// `ChecklistError` upstream) for item failures.
    pub fn into_section(self) -> Result<Section, ChecklistError> {
        let items = self
            .items
            .into_iter()
            .map(ItemRecord::into_item)
            .collect::<Result<Vec<_>, _>>()?;
        let section = Section::from_persisted(
            self.id,
            self.title,
            self.description,
            items,
            self.collapsed,
            self.position,
        )?;
        Ok(section)
    }
}

/// Whole-checklist snapshot: the unit of persistence.
///
/// Loaded once at startup and overwritten wholesale on every save; there is
/// no schema versioning, a shape change means clearing the stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistSnapshot {
    pub id: ChecklistId,
    pub template_id: TemplateId,
    pub title: String,
    pub description: Option<String>,
    pub sections: Vec<SectionRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub priority: Priority,
}

impl ChecklistSnapshot {
    #[must_use]
    pub fn from_checklist(checklist: &Checklist) -> Self {
        Self {
            id: checklist.id(),
            template_id: checklist.template_id().clone(),
            title: checklist.title().to_owned(),
            description: checklist.description().map(str::to_owned),
            sections: checklist
                .sections()
                .iter()
                .map(SectionRecord::from_section)
                .collect(),
            created_at: checklist.created_at(),
            updated_at: checklist.updated_at(),
            completed_at: checklist.completed_at(),
            tags: checklist.tags().to_vec(),
            priority: checklist.priority(),
        }
    }

    /// Convert the snapshot back into a domain `Checklist`.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistError` if any stored field fails validation.
    pub fn into_checklist(self) -> Result<Checklist, ChecklistError> {
        let sections = self
            .sections
            .into_iter()
            .map(SectionRecord::into_section)
            .collect::<Result<Vec<_>, _>>()?;
        Checklist::from_persisted(
            self.id,
            self.template_id,
            self.title,
            self.description,
            sections,
            self.created_at,
            self.updated_at,
            self.completed_at,
            self.tags,
            self.priority,
        )
    }
}

/// Persisted shape for app settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsRecord {
    pub exporter_name: Option<String>,
    pub autosave_debounce_ms: u32,
    pub show_completed_sections: bool,
    pub confirm_reset: bool,
}

impl SettingsRecord {
    #[must_use]
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            exporter_name: settings.exporter_name().map(str::to_owned),
            autosave_debounce_ms: settings.autosave_debounce_ms(),
            show_completed_sections: settings.show_completed_sections(),
            confirm_reset: settings.confirm_reset(),
        }
    }

    /// Convert the record back into domain `AppSettings`.
    ///
    /// # Errors
    ///
    /// Returns `AppSettingsError` if the stored values fail validation.
    pub fn into_settings(self) -> Result<AppSettings, AppSettingsError> {
        AppSettings::from_persisted(
            self.exporter_name,
            self.autosave_debounce_ms,
            self.show_completed_sections,
            self.confirm_reset,
        )
    }
}

//
// ─── STORE CONTRACTS ───────────────────────────────────────────────────────────
//

/// Store contract for the active checklist snapshot.
#[async_trait]
pub trait ChecklistStore: Send + Sync {
    /// Overwrite the stored snapshot wholesale.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    async fn save(&self, snapshot: &ChecklistSnapshot) -> Result<(), StorageError>;

    /// Load the stored snapshot, if any.
    ///
    /// Missing or unreadable state degrades to `Ok(None)` where the adapter
    /// can tell the difference; hard IO failures still surface as errors.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on unrecoverable IO failures.
    async fn load(&self) -> Result<Option<ChecklistSnapshot>, StorageError>;

    /// Discard the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be removed.
    async fn clear(&self) -> Result<(), StorageError>;
}

/// Store contract for app settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Overwrite stored settings wholesale.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the settings cannot be written.
    async fn save_settings(&self, settings: &SettingsRecord) -> Result<(), StorageError>;

    /// Load stored settings, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on unrecoverable IO failures.
    async fn load_settings(&self) -> Result<Option<SettingsRecord>, StorageError>;
}

//
// ─── IN-MEMORY STORE ───────────────────────────────────────────────────────────
//

/// Simple in-memory store implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    checklist: Arc<Mutex<Option<ChecklistSnapshot>>>,
    settings: Arc<Mutex<Option<SettingsRecord>>>,
    save_count: Arc<AtomicUsize>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of checklist saves observed, for debounce assertions in tests.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChecklistStore for InMemoryStore {
    async fn save(&self, snapshot: &ChecklistSnapshot) -> Result<(), StorageError> {
        let mut guard = self
            .checklist
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))?;
        *guard = Some(snapshot.clone());
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load(&self) -> Result<Option<ChecklistSnapshot>, StorageError> {
        let guard = self
            .checklist
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let mut guard = self
            .checklist
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for InMemoryStore {
    async fn save_settings(&self, settings: &SettingsRecord) -> Result<(), StorageError> {
        let mut guard = self
            .settings
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))?;
        *guard = Some(settings.clone());
        Ok(())
    }

    async fn load_settings(&self) -> Result<Option<SettingsRecord>, StorageError> {
        let guard = self
            .settings
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(guard.clone())
    }
}

/// Aggregates stores behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub checklists: Arc<dyn ChecklistStore>,
    pub settings: Arc<dyn SettingsStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let store = InMemoryStore::new();
        let checklists: Arc<dyn ChecklistStore> = Arc::new(store.clone());
        let settings: Arc<dyn SettingsStore> = Arc::new(store);
        Self {
            checklists,
            settings,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use preflight_core::model::{Checklist, Item, ItemId, Section, SectionId};
    use preflight_core::time::fixed_now;

    fn build_checklist() -> Checklist {
        let mut checklist = Checklist::new(
            ChecklistId::generate(),
            TemplateId::new("test"),
            "Shift prep",
            Some("before opening".into()),
            fixed_now(),
        )
        .unwrap();
        let mut section = Section::new(SectionId::generate(), "Stations", None, 0).unwrap();
        section.push_item(Item::new(ItemId::generate(), "Stock napkins", None, true).unwrap());
        checklist.add_section(section, fixed_now());
        checklist
    }

    #[tokio::test]
    async fn in_memory_roundtrips_checklist() {
        let store = InMemoryStore::new();
        let checklist = build_checklist();
        let snapshot = ChecklistSnapshot::from_checklist(&checklist);

        store.save(&snapshot).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, snapshot);

        let restored = loaded.into_checklist().unwrap();
        assert_eq!(restored, checklist);
    }

    #[tokio::test]
    async fn clear_discards_snapshot() {
        let store = InMemoryStore::new();
        let snapshot = ChecklistSnapshot::from_checklist(&build_checklist());
        store.save(&snapshot).await.unwrap();

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn settings_record_roundtrips() {
        let store = InMemoryStore::new();
        assert!(store.load_settings().await.unwrap().is_none());

        let settings = AppSettings::from_persisted(Some("Dana".into()), 500, false, true).unwrap();
        let record = SettingsRecord::from_settings(&settings);
        store.save_settings(&record).await.unwrap();

        let loaded = store.load_settings().await.unwrap().unwrap();
        assert_eq!(loaded.into_settings().unwrap(), settings);
    }

    #[test]
    fn snapshot_rejects_corrupt_title() {
        let mut snapshot = ChecklistSnapshot::from_checklist(&build_checklist());
        snapshot.title = "  ".into();
        assert!(snapshot.into_checklist().is_err());
    }
}
