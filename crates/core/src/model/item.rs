use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::ItemId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ItemError {
    #[error("item title cannot be empty")]
    EmptyTitle,
}

//
// ─── ITEM ──────────────────────────────────────────────────────────────────────
//

/// A single actionable task inside a section.
///
/// Completion is a plain flag; `completed_at` tracks when the flag was last
/// set and is cleared when the item is unticked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    id: ItemId,
    title: String,
    description: Option<String>,
    required: bool,
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
    notes: Option<String>,
    photo: Option<String>,
    tags: Vec<String>,
}

impl Item {
    /// Creates a fresh, incomplete item.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::EmptyTitle` if the title is empty or
    /// whitespace-only.
    pub fn new(
        id: ItemId,
        title: impl Into<String>,
        description: Option<String>,
        required: bool,
    ) -> Result<Self, ItemError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ItemError::EmptyTitle);
        }

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            description: normalize_optional(description),
            required,
            completed: false,
            completed_at: None,
            notes: None,
            photo: None,
            tags: Vec::new(),
        })
    }

    /// Rebuilds an item from a persisted snapshot, re-running validation.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::EmptyTitle` if the stored title fails validation.
    #[allow(clippy::too_many_arguments, clippy::fn_params_excessive_bools)]
    pub fn from_persisted(
        id: ItemId,
        title: String,
        description: Option<String>,
        required: bool,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
        notes: Option<String>,
        photo: Option<String>,
        tags: Vec<String>,
    ) -> Result<Self, ItemError> {
        let mut item = Self::new(id, title, description, required)?;
        item.completed = completed;
        item.completed_at = completed_at;
        item.notes = normalize_optional(notes);
        item.photo = normalize_optional(photo);
        item.tags = tags;
        Ok(item)
    }

    /// Flips the completion flag, stamping or clearing `completed_at`.
    ///
    /// Returns the new completion state.
    pub fn toggle(&mut self, now: DateTime<Utc>) -> bool {
        self.completed = !self.completed;
        self.completed_at = self.completed.then_some(now);
        self.completed
    }

    /// Replaces the free-text notes; blank text clears them.
    pub fn set_notes(&mut self, notes: Option<String>) {
        self.notes = normalize_optional(notes);
    }

    /// Attaches or clears a photo reference (path or URL).
    pub fn set_photo(&mut self, photo: Option<String>) {
        self.photo = normalize_optional(photo);
    }

    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = tags;
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    #[must_use]
    pub fn photo(&self) -> Option<&str> {
        self.photo.as_deref()
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_owned())
        .filter(|val| !val.is_empty())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn new_rejects_empty_title() {
        let err = Item::new(ItemId::generate(), "   ", None, false).unwrap_err();
        assert_eq!(err, ItemError::EmptyTitle);
    }

    #[test]
    fn new_trims_title_and_filters_blank_description() {
        let item = Item::new(
            ItemId::generate(),
            "  Wipe counters  ",
            Some("   ".into()),
            true,
        )
        .unwrap();

        assert_eq!(item.title(), "Wipe counters");
        assert_eq!(item.description(), None);
        assert!(item.required());
        assert!(!item.completed());
        assert!(item.completed_at().is_none());
    }

    #[test]
    fn toggle_stamps_and_clears_completed_at() {
        let mut item = Item::new(ItemId::generate(), "Empty trash", None, false).unwrap();

        assert!(item.toggle(fixed_now()));
        assert_eq!(item.completed_at(), Some(fixed_now()));

        assert!(!item.toggle(fixed_now()));
        assert!(item.completed_at().is_none());
    }

    #[test]
    fn set_notes_normalizes_blank_text() {
        let mut item = Item::new(ItemId::generate(), "Check fridge temp", None, false).unwrap();

        item.set_notes(Some("  reads 3C  ".into()));
        assert_eq!(item.notes(), Some("reads 3C"));

        item.set_notes(Some("   ".into()));
        assert_eq!(item.notes(), None);
    }

    #[test]
    fn from_persisted_restores_all_fields() {
        let id = ItemId::generate();
        let item = Item::from_persisted(
            id,
            "Degrease hood".into(),
            Some("use the orange spray".into()),
            true,
            true,
            Some(fixed_now()),
            Some("left side stubborn".into()),
            Some("photos/hood.jpg".into()),
            vec!["deep-clean".into()],
        )
        .unwrap();

        assert_eq!(item.id(), id);
        assert!(item.completed());
        assert_eq!(item.completed_at(), Some(fixed_now()));
        assert_eq!(item.notes(), Some("left side stubborn"));
        assert_eq!(item.photo(), Some("photos/hood.jpg"));
        assert_eq!(item.tags(), ["deep-clean".to_string()]);
    }
}
