use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Error type for parsing an ID from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

/// Unique identifier for a Checklist.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChecklistId(Uuid);

impl ChecklistId {
    /// Wraps an existing UUID.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn value(&self) -> Uuid {
        self.0
    }
}

/// Unique identifier for a Section.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectionId(Uuid);

impl SectionId {
    /// Wraps an existing UUID.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn value(&self) -> Uuid {
        self.0
    }
}

/// Unique identifier for an Item.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Wraps an existing UUID.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn value(&self) -> Uuid {
        self.0
    }
}

/// Identifier for a catalog Template.
///
/// Templates live in a static catalog, so a human-readable slug is the
/// identifier rather than a UUID.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(String);

impl TemplateId {
    /// Wraps a slug such as `kitchen-opening`.
    #[must_use]
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    /// Returns the slug.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ChecklistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChecklistId({})", self.0)
    }
}

impl fmt::Debug for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SectionId({})", self.0)
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

impl fmt::Debug for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TemplateId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for ChecklistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

impl FromStr for ChecklistId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(ChecklistId::new)
            .map_err(|_| ParseIdError { kind: "ChecklistId" })
    }
}

impl FromStr for SectionId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(SectionId::new)
            .map_err(|_| ParseIdError { kind: "SectionId" })
    }
}

impl FromStr for ItemId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(ItemId::new)
            .map_err(|_| ParseIdError { kind: "ItemId" })
    }
}

impl FromStr for TemplateId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let slug = s.trim();
        if slug.is_empty() {
            return Err(ParseIdError { kind: "TemplateId" });
        }
        Ok(TemplateId::new(slug))
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(ItemId::generate(), ItemId::generate());
        assert_ne!(SectionId::generate(), SectionId::generate());
        assert_ne!(ChecklistId::generate(), ChecklistId::generate());
    }

    #[test]
    fn item_id_roundtrips_through_display() {
        let original = ItemId::generate();
        let parsed: ItemId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn checklist_id_rejects_garbage() {
        let result = "not-a-uuid".parse::<ChecklistId>();
        assert!(result.is_err());
    }

    #[test]
    fn template_id_trims_slug() {
        let id: TemplateId = "  kitchen-opening  ".parse().unwrap();
        assert_eq!(id.as_str(), "kitchen-opening");
    }

    #[test]
    fn template_id_rejects_empty_slug() {
        assert!("   ".parse::<TemplateId>().is_err());
    }
}
