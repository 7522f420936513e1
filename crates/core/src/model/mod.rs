mod checklist;
mod ids;
mod item;
mod section;
mod settings;
mod template;

pub use checklist::{Checklist, ChecklistError, Priority};
pub use ids::{ChecklistId, ItemId, ParseIdError, SectionId, TemplateId};
pub use item::{Item, ItemError};
pub use section::{Section, SectionError};
pub use settings::{
    AppSettings, AppSettingsDraft, AppSettingsError, MAX_DEBOUNCE_MS, MIN_DEBOUNCE_MS,
};
pub use template::{
    Template, TemplateCategory, TemplateItem, TemplateSection, UnknownCategory,
};
