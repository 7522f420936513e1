use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use preflight_core::Clock;
use preflight_core::model::Checklist;
use storage::repository::ChecklistSnapshot;

use crate::error::ExportError;

/// Default exporter identity when no name is configured.
const ANONYMOUS_EXPORTER: &str = "anonymous";

/// Output format of an export. Only JSON is implemented; PDF, email, and
/// web-link exports were never specified and are deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
}

/// Flags controlling which optional fields the export carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub include_notes: bool,
    pub include_photos: bool,
    pub include_timestamps: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_notes: true,
            include_photos: true,
            include_timestamps: true,
        }
    }
}

/// The export artifact: the full checklist snapshot plus metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub exported_at: DateTime<Utc>,
    pub exported_by: String,
    pub format: ExportFormat,
    pub include_notes: bool,
    pub include_photos: bool,
    pub include_timestamps: bool,
    pub checklist: ChecklistSnapshot,
}

/// Builds and delivers JSON export documents.
#[derive(Clone)]
pub struct ExportService {
    clock: Clock,
}

impl ExportService {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self { clock }
    }

    /// Builds an export document, stripping the fields the options exclude.
    #[must_use]
    pub fn build(
        &self,
        checklist: &Checklist,
        exporter_name: Option<&str>,
        options: ExportOptions,
    ) -> ExportDocument {
        let mut snapshot = ChecklistSnapshot::from_checklist(checklist);

        if !options.include_timestamps {
            snapshot.completed_at = None;
        }
        for section in &mut snapshot.sections {
            for item in &mut section.items {
                if !options.include_notes {
                    item.notes = None;
                }
                if !options.include_photos {
                    item.photo = None;
                }
                if !options.include_timestamps {
                    item.completed_at = None;
                }
            }
        }

        ExportDocument {
            exported_at: self.clock.now(),
            exported_by: exporter_name.unwrap_or(ANONYMOUS_EXPORTER).to_owned(),
            format: ExportFormat::Json,
            include_notes: options.include_notes,
            include_photos: options.include_photos,
            include_timestamps: options.include_timestamps,
            checklist: snapshot,
        }
    }

    /// Renders the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Serialization` if encoding fails.
    pub fn render(&self, document: &ExportDocument) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(document)?)
    }

    /// Writes the rendered document to a file.
    ///
    /// Failure is non-fatal for the app: it is logged here and returned so
    /// the caller can surface a simple alert-style message.
    ///
    /// # Errors
    ///
    /// Returns `ExportError` if encoding or the file write fails.
    pub async fn write_to_file(
        &self,
        document: &ExportDocument,
        path: &Path,
    ) -> Result<(), ExportError> {
        let json = self.render(document)?;
        if let Err(err) = tokio::fs::write(path, json.as_bytes()).await {
            error!(path = %path.display(), error = %err, "export write failed");
            return Err(ExportError::Io(err));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use preflight_core::model::{
        Checklist, ChecklistId, Item, ItemId, Section, SectionId, TemplateId,
    };
    use preflight_core::time::{fixed_clock, fixed_now};

    fn checklist_with_extras() -> Checklist {
        let mut checklist = Checklist::new(
            ChecklistId::generate(),
            TemplateId::new("test"),
            "Prep",
            None,
            fixed_now(),
        )
        .unwrap();
        let mut section = Section::new(SectionId::generate(), "Floor", None, 0).unwrap();
        let mut item = Item::new(ItemId::generate(), "Mop", None, false).unwrap();
        item.set_notes(Some("corner first".into()));
        item.set_photo(Some("photos/mop.jpg".into()));
        section.push_item(item);
        checklist.add_section(section, fixed_now());

        let id = checklist.sections()[0].items()[0].id();
        checklist.toggle_item(id, fixed_now()).unwrap();
        checklist
    }

    #[test]
    fn build_defaults_keep_everything() {
        let service = ExportService::new(fixed_clock());
        let checklist = checklist_with_extras();

        let doc = service.build(&checklist, Some("Dana"), ExportOptions::default());
        assert_eq!(doc.exported_at, fixed_now());
        assert_eq!(doc.exported_by, "Dana");
        assert_eq!(doc.format, ExportFormat::Json);

        let item = &doc.checklist.sections[0].items[0];
        assert_eq!(item.notes.as_deref(), Some("corner first"));
        assert_eq!(item.photo.as_deref(), Some("photos/mop.jpg"));
        assert!(item.completed_at.is_some());
        assert!(doc.checklist.completed_at.is_some());
    }

    #[test]
    fn flags_strip_optional_fields() {
        let service = ExportService::new(fixed_clock());
        let checklist = checklist_with_extras();

        let doc = service.build(
            &checklist,
            None,
            ExportOptions {
                include_notes: false,
                include_photos: false,
                include_timestamps: false,
            },
        );
        assert_eq!(doc.exported_by, "anonymous");

        let item = &doc.checklist.sections[0].items[0];
        assert!(item.notes.is_none());
        assert!(item.photo.is_none());
        assert!(item.completed_at.is_none());
        assert!(doc.checklist.completed_at.is_none());
        // Completion state itself is data, not a timestamp; it survives.
        assert!(item.completed);
    }

    #[test]
    fn render_roundtrips_through_serde() {
        let service = ExportService::new(fixed_clock());
        let doc = service.build(
            &checklist_with_extras(),
            Some("Dana"),
            ExportOptions::default(),
        );

        let json = service.render(&doc).unwrap();
        let parsed: ExportDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, doc);
    }

    #[tokio::test]
    async fn write_to_file_creates_the_artifact() {
        let service = ExportService::new(fixed_clock());
        let doc = service.build(&checklist_with_extras(), None, ExportOptions::default());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        service.write_to_file(&doc, &path).await.unwrap();

        let parsed: ExportDocument =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(parsed, doc);
    }

    #[tokio::test]
    async fn write_to_unwritable_path_fails_without_panicking() {
        let service = ExportService::new(fixed_clock());
        let doc = service.build(&checklist_with_extras(), None, ExportOptions::default());

        let err = service
            .write_to_file(&doc, Path::new("/nonexistent-dir/export.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
    }
}
