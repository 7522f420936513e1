use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{ChecklistId, ItemId, SectionId, TemplateId};
use crate::model::item::{Item, ItemError};
use crate::model::section::{Section, SectionError};
use crate::progress::Progress;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChecklistError {
    #[error("checklist title cannot be empty")]
    EmptyTitle,

    #[error("section {0} not found")]
    SectionNotFound(SectionId),

    #[error("item {0} not found")]
    ItemNotFound(ItemId),

    #[error(transparent)]
    Section(#[from] SectionError),

    #[error(transparent)]
    Item(#[from] ItemError),
}

//
// ─── PRIORITY ──────────────────────────────────────────────────────────────────
//

/// Coarse urgency marker for a checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

//
// ─── CHECKLIST ─────────────────────────────────────────────────────────────────
//

/// Root task list: an ordered tree of sections, each owning its items.
///
/// Progress and the completed flag are always derived from the item tree via
/// [`Progress`]; only `completed_at` is stored, and it is stamped exactly once
/// per transition to 100%.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checklist {
    id: ChecklistId,
    template_id: TemplateId,
    title: String,
    description: Option<String>,
    sections: Vec<Section>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    tags: Vec<String>,
    priority: Priority,
}

impl Checklist {
    /// Creates an empty checklist tied to the template it came from.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistError::EmptyTitle` if the title is empty or
    /// whitespace-only.
    pub fn new(
        id: ChecklistId,
        template_id: TemplateId,
        title: impl Into<String>,
        description: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, ChecklistError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ChecklistError::EmptyTitle);
        }

        let description = description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());

        Ok(Self {
            id,
            template_id,
            title: title.trim().to_owned(),
            description,
            sections: Vec::new(),
            created_at: now,
            updated_at: now,
            completed_at: None,
            tags: Vec::new(),
            priority: Priority::default(),
        })
    }

    /// Rebuilds a checklist from persisted parts.
    ///
    /// Timestamps are restored as stored; the completion stamp is not
    /// recomputed here, since loading must not rewrite history.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistError::EmptyTitle` if the stored title fails
    /// validation.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: ChecklistId,
        template_id: TemplateId,
        title: String,
        description: Option<String>,
        sections: Vec<Section>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
        tags: Vec<String>,
        priority: Priority,
    ) -> Result<Self, ChecklistError> {
        let mut checklist = Self::new(id, template_id, title, description, created_at)?;
        checklist.sections = sections;
        checklist.updated_at = updated_at;
        checklist.completed_at = completed_at;
        checklist.tags = tags;
        checklist.priority = priority;
        Ok(checklist)
    }

    // ─── Mutations ─────────────────────────────────────────────────────────

    /// Appends a section at the end of the checklist.
    pub fn add_section(&mut self, section: Section, now: DateTime<Utc>) {
        self.sections.push(section);
        self.touch(now);
    }

    /// Removes a section and everything it owns.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistError::SectionNotFound` if no section has that id.
    pub fn remove_section(
        &mut self,
        section_id: SectionId,
        now: DateTime<Utc>,
    ) -> Result<Section, ChecklistError> {
        let index = self
            .sections
            .iter()
            .position(|s| s.id() == section_id)
            .ok_or(ChecklistError::SectionNotFound(section_id))?;
        let removed = self.sections.remove(index);
        self.touch(now);
        Ok(removed)
    }

    /// Appends an item to the given section.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistError::SectionNotFound` if no section has that id.
    pub fn add_item(
        &mut self,
        section_id: SectionId,
        item: Item,
        now: DateTime<Utc>,
    ) -> Result<(), ChecklistError> {
        let section = self
            .sections
            .iter_mut()
            .find(|s| s.id() == section_id)
            .ok_or(ChecklistError::SectionNotFound(section_id))?;
        section.push_item(item);
        self.touch(now);
        Ok(())
    }

    /// Removes an item wherever it lives.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistError::ItemNotFound` if no section contains the item.
    pub fn remove_item(
        &mut self,
        item_id: ItemId,
        now: DateTime<Utc>,
    ) -> Result<Item, ChecklistError> {
        for section in &mut self.sections {
            if let Some(removed) = section.remove_item(item_id) {
                self.touch(now);
                return Ok(removed);
            }
        }
        Err(ChecklistError::ItemNotFound(item_id))
    }

    /// Flips an item's completion flag, returning the new state.
    ///
    /// Stamps `completed_at` on the checklist exactly once when the toggle
    /// takes overall progress to 100%, and clears it when progress drops back
    /// below 100%.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistError::ItemNotFound` if no section contains the item.
    pub fn toggle_item(
        &mut self,
        item_id: ItemId,
        now: DateTime<Utc>,
    ) -> Result<bool, ChecklistError> {
        let item = self
            .sections
            .iter_mut()
            .find_map(|s| s.item_mut(item_id))
            .ok_or(ChecklistError::ItemNotFound(item_id))?;
        let state = item.toggle(now);
        self.touch(now);
        Ok(state)
    }

    /// Replaces an item's free-text notes.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistError::ItemNotFound` if no section contains the item.
    pub fn set_item_notes(
        &mut self,
        item_id: ItemId,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), ChecklistError> {
        let item = self
            .sections
            .iter_mut()
            .find_map(|s| s.item_mut(item_id))
            .ok_or(ChecklistError::ItemNotFound(item_id))?;
        item.set_notes(notes);
        self.touch(now);
        Ok(())
    }

    /// Collapses or expands a section in display terms.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistError::SectionNotFound` if no section has that id.
    pub fn set_section_collapsed(
        &mut self,
        section_id: SectionId,
        collapsed: bool,
        now: DateTime<Utc>,
    ) -> Result<(), ChecklistError> {
        let section = self
            .sections
            .iter_mut()
            .find(|s| s.id() == section_id)
            .ok_or(ChecklistError::SectionNotFound(section_id))?;
        section.set_collapsed(collapsed);
        self.touch(now);
        Ok(())
    }

    pub fn set_priority(&mut self, priority: Priority, now: DateTime<Utc>) {
        self.priority = priority;
        self.touch(now);
    }

    pub fn set_tags(&mut self, tags: Vec<String>, now: DateTime<Utc>) {
        self.tags = tags;
        self.touch(now);
    }

    /// Stamps `updated_at` and reconciles the completion stamp with derived
    /// progress. Every mutation funnels through here.
    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        let progress = Progress::of_checklist(self);
        if progress.is_complete {
            if self.completed_at.is_none() {
                self.completed_at = Some(now);
            }
        } else {
            self.completed_at = None;
        }
    }

    // ─── Lookups ───────────────────────────────────────────────────────────

    #[must_use]
    pub fn section(&self, section_id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id() == section_id)
    }

    /// Finds the section that owns the given item.
    #[must_use]
    pub fn section_of_item(&self, item_id: ItemId) -> Option<&Section> {
        self.sections.iter().find(|s| s.item(item_id).is_some())
    }

    #[must_use]
    pub fn item(&self, item_id: ItemId) -> Option<&Item> {
        self.sections.iter().find_map(|s| s.item(item_id))
    }

    /// Derived completion metrics over every item in every section.
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress::of_checklist(self)
    }

    /// True once every item is ticked and at least one item exists.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.progress().is_complete
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> ChecklistId {
        self.id
    }

    #[must_use]
    pub fn template_id(&self) -> &TemplateId {
        &self.template_id
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
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    #[must_use]
    pub fn priority(&self) -> Priority {
        self.priority
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn checklist_with(sections: &[&[&str]]) -> Checklist {
        let mut checklist = Checklist::new(
            ChecklistId::generate(),
            TemplateId::new("test"),
            "Pre-work",
            None,
            fixed_now(),
        )
        .unwrap();

        for (pos, titles) in sections.iter().enumerate() {
            let mut section = Section::new(
                SectionId::generate(),
                format!("Section {pos}"),
                None,
                u32::try_from(pos).unwrap(),
            )
            .unwrap();
            for title in *titles {
                section.push_item(Item::new(ItemId::generate(), *title, None, false).unwrap());
            }
            checklist.add_section(section, fixed_now());
        }
        checklist
    }

    #[test]
    fn new_rejects_empty_title() {
        let err = Checklist::new(
            ChecklistId::generate(),
            TemplateId::new("test"),
            "  ",
            None,
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, ChecklistError::EmptyTitle);
    }

    #[test]
    fn empty_checklist_is_never_complete() {
        let checklist = checklist_with(&[]);
        assert_eq!(checklist.progress().percent, 0);
        assert!(!checklist.is_completed());
        assert!(checklist.completed_at().is_none());
    }

    #[test]
    fn two_by_two_scenario_hits_expected_percentages() {
        let mut checklist = checklist_with(&[&["a", "b"], &["c", "d"]]);
        assert_eq!(checklist.progress().percent, 0);

        // One item per section.
        let first = checklist.sections()[0].items()[0].id();
        let third = checklist.sections()[1].items()[0].id();
        checklist.toggle_item(first, fixed_now()).unwrap();
        checklist.toggle_item(third, fixed_now()).unwrap();
        assert_eq!(checklist.progress().percent, 50);
        assert!(!checklist.is_completed());

        // All four.
        let second = checklist.sections()[0].items()[1].id();
        let fourth = checklist.sections()[1].items()[1].id();
        checklist.toggle_item(second, fixed_now()).unwrap();
        checklist.toggle_item(fourth, fixed_now()).unwrap();
        assert_eq!(checklist.progress().percent, 100);
        assert!(checklist.is_completed());
        assert!(checklist.completed_at().is_some());
    }

    #[test]
    fn completed_at_is_stamped_once_and_cleared_on_regression() {
        let mut checklist = checklist_with(&[&["a", "b"]]);
        let a = checklist.sections()[0].items()[0].id();
        let b = checklist.sections()[0].items()[1].id();

        let t0 = fixed_now();
        checklist.toggle_item(a, t0).unwrap();
        checklist.toggle_item(b, t0).unwrap();
        assert_eq!(checklist.completed_at(), Some(t0));

        // A later no-op mutation must not restamp.
        let t1 = t0 + Duration::minutes(5);
        checklist.set_priority(Priority::High, t1);
        assert_eq!(checklist.completed_at(), Some(t0));

        // Dropping below 100% clears the stamp; finishing again restamps.
        let t2 = t0 + Duration::minutes(10);
        checklist.toggle_item(a, t2).unwrap();
        assert_eq!(checklist.completed_at(), None);
        let t3 = t0 + Duration::minutes(15);
        checklist.toggle_item(a, t3).unwrap();
        assert_eq!(checklist.completed_at(), Some(t3));
    }

    #[test]
    fn double_toggle_restores_percentage() {
        let mut checklist = checklist_with(&[&["a", "b", "c", "d"]]);
        let a = checklist.sections()[0].items()[0].id();
        checklist.toggle_item(a, fixed_now()).unwrap();
        let after_one = checklist.progress().percent;
        assert_eq!(after_one, 25);

        let b = checklist.sections()[0].items()[1].id();
        checklist.toggle_item(b, fixed_now()).unwrap();
        checklist.toggle_item(b, fixed_now()).unwrap();
        assert_eq!(checklist.progress().percent, after_one);
    }

    #[test]
    fn remove_item_can_complete_a_checklist() {
        let mut checklist = checklist_with(&[&["a", "b"]]);
        let a = checklist.sections()[0].items()[0].id();
        let b = checklist.sections()[0].items()[1].id();
        checklist.toggle_item(a, fixed_now()).unwrap();

        // Removing the only incomplete item takes progress to 100%.
        checklist.remove_item(b, fixed_now()).unwrap();
        assert!(checklist.is_completed());
        assert!(checklist.completed_at().is_some());
    }

    #[test]
    fn removing_last_section_clears_completion() {
        let mut checklist = checklist_with(&[&["a"]]);
        let a = checklist.sections()[0].items()[0].id();
        checklist.toggle_item(a, fixed_now()).unwrap();
        assert!(checklist.is_completed());

        let section_id = checklist.sections()[0].id();
        checklist.remove_section(section_id, fixed_now()).unwrap();
        assert!(!checklist.is_completed());
        assert!(checklist.completed_at().is_none());
    }

    #[test]
    fn toggle_unknown_item_fails() {
        let mut checklist = checklist_with(&[&["a"]]);
        let missing = ItemId::generate();
        let err = checklist.toggle_item(missing, fixed_now()).unwrap_err();
        assert_eq!(err, ChecklistError::ItemNotFound(missing));
    }

    #[test]
    fn section_of_item_finds_owner() {
        let checklist = checklist_with(&[&["a"], &["b"]]);
        let b = checklist.sections()[1].items()[0].id();
        let owner = checklist.section_of_item(b).unwrap();
        assert_eq!(owner.id(), checklist.sections()[1].id());
    }
}
