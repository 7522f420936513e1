use thiserror::Error;

use crate::model::ids::{ItemId, SectionId};
use crate::model::item::Item;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SectionError {
    #[error("section title cannot be empty")]
    EmptyTitle,
}

//
// ─── SECTION ───────────────────────────────────────────────────────────────────
//

/// A named grouping of items within a checklist.
///
/// Item counts are always recomputed from the item list; they are never
/// stored, so they cannot drift out of sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    id: SectionId,
    title: String,
    description: Option<String>,
    items: Vec<Item>,
    collapsed: bool,
    position: u32,
}

impl Section {
    /// Creates an empty, expanded section.
    ///
    /// # Errors
    ///
    /// Returns `SectionError::EmptyTitle` if the title is empty or
    /// whitespace-only.
    pub fn new(
        id: SectionId,
        title: impl Into<String>,
        description: Option<String>,
        position: u32,
    ) -> Result<Self, SectionError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(SectionError::EmptyTitle);
        }

        let description = description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            description,
            items: Vec::new(),
            collapsed: false,
            position,
        })
    }

    /// Rebuilds a section from persisted parts, re-running validation.
    ///
    /// # Errors
    ///
    /// Returns `SectionError::EmptyTitle` if the stored title fails validation.
    pub fn from_persisted(
        id: SectionId,
        title: String,
        description: Option<String>,
        items: Vec<Item>,
        collapsed: bool,
        position: u32,
    ) -> Result<Self, SectionError> {
        let mut section = Self::new(id, title, description, position)?;
        section.items = items;
        section.collapsed = collapsed;
        Ok(section)
    }

    /// Appends an item at the end of the section.
    pub fn push_item(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Removes an item by id, returning it if present.
    pub fn remove_item(&mut self, item_id: ItemId) -> Option<Item> {
        let index = self.items.iter().position(|i| i.id() == item_id)?;
        Some(self.items.remove(index))
    }

    #[must_use]
    pub fn item(&self, item_id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id() == item_id)
    }

    pub fn item_mut(&mut self, item_id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id() == item_id)
    }

    pub fn set_collapsed(&mut self, collapsed: bool) {
        self.collapsed = collapsed;
    }

    // Derived counts

    /// Total number of items in this section.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Number of items whose completed flag is set.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|i| i.completed()).count()
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> SectionId {
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
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn collapsed(&self) -> bool {
        self.collapsed
    }

    #[must_use]
    pub fn position(&self) -> u32 {
        self.position
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
