//! Built-in template catalog.
//!
//! The catalog is static: assembled once at startup and read-only for the
//! rest of the process lifetime.

use preflight_core::model::{
    Template, TemplateCategory, TemplateId, TemplateItem, TemplateSection,
};

/// Read-only collection of the predefined pre-work templates.
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl TemplateCatalog {
    /// Builds the built-in catalog.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            templates: vec![
                kitchen_opening(),
                kitchen_closing(),
                deep_clean(),
                equipment_maintenance(),
                safety_walkthrough(),
            ],
        }
    }

    /// All templates, in catalog order.
    #[must_use]
    pub fn all(&self) -> &[Template] {
        &self.templates
    }

    /// Templates in the given category, preserving catalog order.
    #[must_use]
    pub fn by_category(&self, category: TemplateCategory) -> Vec<&Template> {
        self.templates
            .iter()
            .filter(|t| t.category == category)
            .collect()
    }

    /// Looks up a template by its slug.
    #[must_use]
    pub fn get(&self, id: &TemplateId) -> Option<&Template> {
        self.templates.iter().find(|t| &t.id == id)
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn item(title: &'static str, required: bool) -> TemplateItem {
    TemplateItem {
        title,
        description: None,
        required,
    }
}

fn kitchen_opening() -> Template {
    Template {
        id: TemplateId::new("kitchen-opening"),
        name: "Kitchen opening",
        description: "Daily pre-service kitchen setup",
        category: TemplateCategory::Opening,
        sections: vec![
            TemplateSection {
                title: "Surfaces",
                description: Some("all prep counters and boards"),
                items: vec![
                    item("Wipe and sanitize counters", true),
                    item("Sanitize cutting boards", true),
                    item("Check towel and glove stock", false),
                ],
            },
            TemplateSection {
                title: "Equipment",
                description: None,
                items: vec![
                    item("Record fridge temperature", true),
                    item("Record freezer temperature", true),
                    item("Preheat ovens", false),
                    item("Run dishwasher rinse cycle", false),
                ],
            },
            TemplateSection {
                title: "Stock",
                description: None,
                items: vec![
                    item("Date-check prepped containers", true),
                    item("Restock line stations", false),
                ],
            },
        ],
    }
}

fn kitchen_closing() -> Template {
    Template {
        id: TemplateId::new("kitchen-closing"),
        name: "Kitchen closing",
        description: "End-of-day shutdown and cleandown",
        category: TemplateCategory::Closing,
        sections: vec![
            TemplateSection {
                title: "Cleandown",
                description: None,
                items: vec![
                    item("Break down and clean line stations", true),
                    item("Empty and sanitize bins", true),
                    item("Sweep and mop floors", true),
                ],
            },
            TemplateSection {
                title: "Shutdown",
                description: Some("everything that draws power or gas"),
                items: vec![
                    item("Switch off ovens and hobs", true),
                    item("Confirm gas valves closed", true),
                    item("Lock walk-in fridge", false),
                ],
            },
        ],
    }
}

fn deep_clean() -> Template {
    Template {
        id: TemplateId::new("deep-clean"),
        name: "Weekly deep clean",
        description: "Weekly rotation of heavy cleaning tasks",
        category: TemplateCategory::Cleaning,
        sections: vec![
            TemplateSection {
                title: "High areas",
                description: None,
                items: vec![
                    item("Degrease extraction hood", true),
                    item("Wipe shelving and high ledges", false),
                ],
            },
            TemplateSection {
                title: "Floors and drains",
                description: None,
                items: vec![
                    item("Scrub floor under equipment", true),
                    item("Flush and disinfect drains", true),
                    item("Replace drain covers", false),
                ],
            },
        ],
    }
}

fn equipment_maintenance() -> Template {
    Template {
        id: TemplateId::new("equipment-maintenance"),
        name: "Equipment maintenance",
        description: "Monthly equipment checks",
        category: TemplateCategory::Maintenance,
        sections: vec![
            TemplateSection {
                title: "Refrigeration",
                description: None,
                items: vec![
                    item("Clean condenser coils", true),
                    item("Inspect door seals", true),
                    item("Verify defrost cycle", false),
                ],
            },
            TemplateSection {
                title: "Small equipment",
                description: None,
                items: vec![
                    item("Descale coffee machine", false),
                    item("Sharpen or replace blades", true),
                ],
            },
        ],
    }
}

fn safety_walkthrough() -> Template {
    Template {
        id: TemplateId::new("safety-walkthrough"),
        name: "Safety walkthrough",
        description: "Pre-shift safety inspection",
        category: TemplateCategory::Safety,
        sections: vec![
            TemplateSection {
                title: "Fire safety",
                description: None,
                items: vec![
                    item("Check extinguisher pressure gauges", true),
                    item("Confirm fire exits are clear", true),
                ],
            },
            TemplateSection {
                title: "First aid",
                description: None,
                items: vec![
                    item("Restock first aid kit", false),
                    item("Check burn gel expiry", true),
                ],
            },
        ],
    }
}
