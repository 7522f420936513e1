use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::checklist::{Checklist, ChecklistError};
use crate::model::ids::{ChecklistId, ItemId, SectionId, TemplateId};
use crate::model::item::Item;
use crate::model::section::Section;

//
// ─── TEMPLATE ──────────────────────────────────────────────────────────────────
//

/// Broad grouping used to browse the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    Cleaning,
    Maintenance,
    Safety,
    Opening,
    Closing,
}

impl std::fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateCategory::Cleaning => write!(f, "cleaning"),
            TemplateCategory::Maintenance => write!(f, "maintenance"),
            TemplateCategory::Safety => write!(f, "safety"),
            TemplateCategory::Opening => write!(f, "opening"),
            TemplateCategory::Closing => write!(f, "closing"),
        }
    }
}

impl std::str::FromStr for TemplateCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cleaning" => Ok(Self::Cleaning),
            "maintenance" => Ok(Self::Maintenance),
            "safety" => Ok(Self::Safety),
            "opening" => Ok(Self::Opening),
            "closing" => Ok(Self::Closing),
            _ => Err(UnknownCategory(s.trim().to_owned())),
        }
    }
}

/// Error returned when parsing an unrecognized category name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown template category: {0}")]
pub struct UnknownCategory(pub String);

/// Item blueprint inside a template section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateItem {
    pub title: &'static str,
    pub description: Option<&'static str>,
    pub required: bool,
}

/// Section blueprint inside a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSection {
    pub title: &'static str,
    pub description: Option<&'static str>,
    pub items: Vec<TemplateItem>,
}

/// Read-only blueprint a checklist is instantiated from.
///
/// Templates never change at runtime; instantiation deep-copies the tree into
/// fresh domain values with brand-new ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub id: TemplateId,
    pub name: &'static str,
    pub description: &'static str,
    pub category: TemplateCategory,
    pub sections: Vec<TemplateSection>,
}

impl Template {
    /// Deep-copies the blueprint into a fresh, fully incomplete checklist.
    ///
    /// Every section and item receives a newly generated id; the template is
    /// left untouched so it can be instantiated again (e.g. on reset).
    ///
    /// # Errors
    ///
    /// Returns `ChecklistError` if a blueprint title fails domain validation.
    pub fn instantiate(&self, now: DateTime<Utc>) -> Result<Checklist, ChecklistError> {
        let mut checklist = Checklist::new(
            ChecklistId::generate(),
            self.id.clone(),
            self.name,
            Some(self.description.to_owned()),
            now,
        )?;

        for (position, blueprint) in self.sections.iter().enumerate() {
            let mut section = Section::new(
                SectionId::generate(),
                blueprint.title,
                blueprint.description.map(str::to_owned),
                u32::try_from(position).unwrap_or(u32::MAX),
            )?;
            for item in &blueprint.items {
                section.push_item(Item::new(
                    ItemId::generate(),
                    item.title,
                    item.description.map(str::to_owned),
                    item.required,
                )?);
            }
            checklist.add_section(section, now);
        }

        Ok(checklist)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn sample() -> Template {
        Template {
            id: TemplateId::new("sample"),
            name: "Sample walkthrough",
            description: "A tiny template for tests",
            category: TemplateCategory::Opening,
            sections: vec![TemplateSection {
                title: "Front of house",
                description: None,
                items: vec![
                    TemplateItem {
                        title: "Unlock doors",
                        description: None,
                        required: true,
                    },
                    TemplateItem {
                        title: "Lights on",
                        description: Some("including patio"),
                        required: false,
                    },
                ],
            }],
        }
    }

    #[test]
    fn instantiate_copies_structure_with_fresh_state() {
        let template = sample();
        let checklist = template.instantiate(fixed_now()).unwrap();

        assert_eq!(checklist.template_id(), &TemplateId::new("sample"));
        assert_eq!(checklist.title(), "Sample walkthrough");
        assert_eq!(checklist.sections().len(), 1);
        assert_eq!(checklist.sections()[0].item_count(), 2);
        assert_eq!(checklist.progress().percent, 0);
        assert_eq!(checklist.created_at(), fixed_now());
        assert!(checklist.sections()[0].items().iter().all(|i| !i.completed()));
    }

    #[test]
    fn instantiate_twice_yields_distinct_ids() {
        let template = sample();
        let first = template.instantiate(fixed_now()).unwrap();
        let second = template.instantiate(fixed_now()).unwrap();

        assert_ne!(first.id(), second.id());
        assert_ne!(first.sections()[0].id(), second.sections()[0].id());
        assert_ne!(
            first.sections()[0].items()[0].id(),
            second.sections()[0].items()[0].id()
        );
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!(
            "Cleaning".parse::<TemplateCategory>().unwrap(),
            TemplateCategory::Cleaning
        );
        assert!("weekly".parse::<TemplateCategory>().is_err());
    }
}
