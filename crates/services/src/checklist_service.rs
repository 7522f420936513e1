use std::sync::{Arc, Mutex, MutexGuard};

use tracing::warn;

use preflight_core::model::{
    Checklist, ChecklistError, Item, ItemId, Section, SectionId, TemplateId,
};
use preflight_core::{Clock, Progress};
use storage::repository::{ChecklistSnapshot, ChecklistStore, StorageError};

use crate::autosave::Autosave;
use crate::catalog::TemplateCatalog;
use crate::error::ChecklistServiceError;

/// Orchestrates the active checklist: instantiation from templates, item and
/// section edits, reset, and debounced persistence.
///
/// State is read from the store once at construction and held in memory from
/// then on; every mutation schedules a full-snapshot save through the
/// autosave handle.
pub struct ChecklistService {
    clock: Clock,
    catalog: Arc<TemplateCatalog>,
    autosave: Arc<Autosave>,
    state: Mutex<Option<Checklist>>,
}

impl ChecklistService {
    /// Builds the service, loading any persisted checklist once.
    ///
    /// A snapshot that fails domain validation is treated like corrupt
    /// storage: logged and discarded, never fatal.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistServiceError::Storage` on unrecoverable IO failures.
    pub async fn load(
        clock: Clock,
        catalog: Arc<TemplateCatalog>,
        store: &dyn ChecklistStore,
        autosave: Arc<Autosave>,
    ) -> Result<Self, ChecklistServiceError> {
        let state = match store.load().await? {
            Some(snapshot) => match snapshot.into_checklist() {
                Ok(checklist) => Some(checklist),
                Err(err) => {
                    warn!(error = %err, "stored checklist failed validation, starting empty");
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            clock,
            catalog,
            autosave,
            state: Mutex::new(state),
        })
    }

    /// The current checklist, if one has been started.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistServiceError::Storage` if the state lock is poisoned.
    pub fn active(&self) -> Result<Option<Checklist>, ChecklistServiceError> {
        Ok(self.lock_state()?.clone())
    }

    /// Instantiates a catalog template as the new active checklist.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistServiceError::UnknownTemplate` for a slug the
    /// catalog does not know, or `ChecklistServiceError::Checklist` if the
    /// blueprint fails validation.
    pub fn start_from_template(
        &self,
        template_id: &TemplateId,
    ) -> Result<Checklist, ChecklistServiceError> {
        let template = self
            .catalog
            .get(template_id)
            .ok_or_else(|| ChecklistServiceError::UnknownTemplate(template_id.clone()))?;
        let checklist = template.instantiate(self.clock.now())?;

        let mut guard = self.lock_state()?;
        *guard = Some(checklist.clone());
        self.persist(&guard);
        Ok(checklist)
    }

    /// Discards the active checklist and starts a fresh copy of the template
    /// it originally came from.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistServiceError::NoActiveChecklist` if nothing is
    /// active, or `ChecklistServiceError::UnknownTemplate` if the originating
    /// template has disappeared from the catalog.
    pub fn reset(&self) -> Result<Checklist, ChecklistServiceError> {
        let template_id = {
            let guard = self.lock_state()?;
            let checklist = guard
                .as_ref()
                .ok_or(ChecklistServiceError::NoActiveChecklist)?;
            checklist.template_id().clone()
        };
        self.start_from_template(&template_id)
    }

    /// Flips an item's completion flag; returns the updated checklist.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistServiceError::NoActiveChecklist` if nothing is
    /// active, or `ChecklistServiceError::Checklist` if the item is unknown.
    pub fn toggle_item(&self, item_id: ItemId) -> Result<Checklist, ChecklistServiceError> {
        self.mutate(|checklist, now| {
            checklist.toggle_item(item_id, now)?;
            Ok(())
        })
    }

    /// Adds an item to a section; returns the new item's id.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistServiceError` if nothing is active, the section is
    /// unknown, or the title fails validation.
    pub fn add_item(
        &self,
        section_id: SectionId,
        title: String,
        description: Option<String>,
        required: bool,
    ) -> Result<ItemId, ChecklistServiceError> {
        let item = Item::new(ItemId::generate(), title, description, required)
            .map_err(ChecklistError::from)?;
        let item_id = item.id();
        self.mutate(|checklist, now| checklist.add_item(section_id, item, now))?;
        Ok(item_id)
    }

    /// Removes an item wherever it lives.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistServiceError` if nothing is active or the item is
    /// unknown.
    pub fn remove_item(&self, item_id: ItemId) -> Result<Checklist, ChecklistServiceError> {
        self.mutate(|checklist, now| {
            checklist.remove_item(item_id, now)?;
            Ok(())
        })
    }

    /// Appends an empty section; returns the new section's id.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistServiceError` if nothing is active or the title
    /// fails validation.
    pub fn add_section(
        &self,
        title: String,
        description: Option<String>,
    ) -> Result<SectionId, ChecklistServiceError> {
        let mut guard = self.lock_state()?;
        let checklist = guard
            .as_mut()
            .ok_or(ChecklistServiceError::NoActiveChecklist)?;

        let position = u32::try_from(checklist.sections().len()).unwrap_or(u32::MAX);
        let section = Section::new(SectionId::generate(), title, description, position)
            .map_err(ChecklistError::from)?;
        let section_id = section.id();
        checklist.add_section(section, self.clock.now());
        self.persist(&guard);
        Ok(section_id)
    }

    /// Removes a section and everything it owns.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistServiceError` if nothing is active or the section is
    /// unknown.
    pub fn remove_section(
        &self,
        section_id: SectionId,
    ) -> Result<Checklist, ChecklistServiceError> {
        self.mutate(|checklist, now| {
            checklist.remove_section(section_id, now)?;
            Ok(())
        })
    }

    /// Replaces an item's free-text notes.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistServiceError` if nothing is active or the item is
    /// unknown.
    pub fn set_item_notes(
        &self,
        item_id: ItemId,
        notes: Option<String>,
    ) -> Result<Checklist, ChecklistServiceError> {
        self.mutate(|checklist, now| checklist.set_item_notes(item_id, notes, now))
    }

    /// Collapses or expands a section.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistServiceError` if nothing is active or the section is
    /// unknown.
    pub fn set_section_collapsed(
        &self,
        section_id: SectionId,
        collapsed: bool,
    ) -> Result<Checklist, ChecklistServiceError> {
        self.mutate(|checklist, now| checklist.set_section_collapsed(section_id, collapsed, now))
    }

    /// Derived completion metrics for the active checklist.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistServiceError::NoActiveChecklist` if nothing is
    /// active.
    pub fn progress(&self) -> Result<Progress, ChecklistServiceError> {
        let guard = self.lock_state()?;
        let checklist = guard
            .as_ref()
            .ok_or(ChecklistServiceError::NoActiveChecklist)?;
        Ok(checklist.progress())
    }

    fn mutate(
        &self,
        op: impl FnOnce(&mut Checklist, chrono::DateTime<chrono::Utc>) -> Result<(), ChecklistError>,
    ) -> Result<Checklist, ChecklistServiceError> {
        let mut guard = self.lock_state()?;
        let checklist = guard
            .as_mut()
            .ok_or(ChecklistServiceError::NoActiveChecklist)?;
        op(checklist, self.clock.now())?;
        let updated = checklist.clone();
        self.persist(&guard);
        Ok(updated)
    }

    fn persist(&self, guard: &MutexGuard<'_, Option<Checklist>>) {
        if let Some(checklist) = guard.as_ref() {
            self.autosave
                .schedule(ChecklistSnapshot::from_checklist(checklist));
        }
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, Option<Checklist>>, ChecklistServiceError> {
        self.state
            .lock()
            .map_err(|e| ChecklistServiceError::Storage(StorageError::Io(e.to_string())))
    }
}
