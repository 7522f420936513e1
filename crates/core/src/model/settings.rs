use thiserror::Error;

/// Bounds for the autosave debounce window, in milliseconds.
pub const MIN_DEBOUNCE_MS: u32 = 100;
pub const MAX_DEBOUNCE_MS: u32 = 60_000;
const DEFAULT_DEBOUNCE_MS: u32 = 1_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppSettings {
    exporter_name: Option<String>,
    autosave_debounce_ms: u32,
    show_completed_sections: bool,
    confirm_reset: bool,
}

#[derive(Clone, Debug)]
pub struct AppSettingsDraft {
    pub exporter_name: Option<String>,
    pub autosave_debounce_ms: u32,
    pub show_completed_sections: bool,
    pub confirm_reset: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AppSettingsError {
    #[error("autosave debounce must be between {MIN_DEBOUNCE_MS} and {MAX_DEBOUNCE_MS} ms")]
    InvalidDebounce,
}

impl Default for AppSettingsDraft {
    fn default() -> Self {
        Self {
            exporter_name: None,
            autosave_debounce_ms: DEFAULT_DEBOUNCE_MS,
            show_completed_sections: true,
            confirm_reset: true,
        }
    }
}

impl AppSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and normalize the draft into persisted settings.
    ///
    /// # Errors
    ///
    /// Returns `AppSettingsError::InvalidDebounce` if the debounce window is
    /// out of bounds.
    pub fn validate(self) -> Result<AppSettings, AppSettingsError> {
        if !(MIN_DEBOUNCE_MS..=MAX_DEBOUNCE_MS).contains(&self.autosave_debounce_ms) {
            return Err(AppSettingsError::InvalidDebounce);
        }

        Ok(AppSettings {
            exporter_name: normalize_optional(self.exporter_name),
            autosave_debounce_ms: self.autosave_debounce_ms,
            show_completed_sections: self.show_completed_sections,
            confirm_reset: self.confirm_reset,
        })
    }
}

impl AppSettings {
    /// Rebuilds settings from persisted values, re-running validation.
    ///
    /// # Errors
    ///
    /// Returns `AppSettingsError` if the stored debounce window is out of
    /// bounds.
    pub fn from_persisted(
        exporter_name: Option<String>,
        autosave_debounce_ms: u32,
        show_completed_sections: bool,
        confirm_reset: bool,
    ) -> Result<Self, AppSettingsError> {
        AppSettingsDraft {
            exporter_name,
            autosave_debounce_ms,
            show_completed_sections,
            confirm_reset,
        }
        .validate()
    }

    #[must_use]
    pub fn exporter_name(&self) -> Option<&str> {
        self.exporter_name.as_deref()
    }

    #[must_use]
    pub fn autosave_debounce_ms(&self) -> u32 {
        self.autosave_debounce_ms
    }

    #[must_use]
    pub fn show_completed_sections(&self) -> bool {
        self.show_completed_sections
    }

    #[must_use]
    pub fn confirm_reset(&self) -> bool {
        self.confirm_reset
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            exporter_name: None,
            autosave_debounce_ms: DEFAULT_DEBOUNCE_MS,
            show_completed_sections: true,
            confirm_reset: true,
        }
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_draft_validates() {
        let settings = AppSettingsDraft::new().validate().unwrap();
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.autosave_debounce_ms(), 1_000);
        assert!(settings.confirm_reset());
    }

    #[test]
    fn rejects_out_of_bounds_debounce() {
        let mut draft = AppSettingsDraft::new();
        draft.autosave_debounce_ms = 50;
        assert_eq!(
            draft.clone().validate().unwrap_err(),
            AppSettingsError::InvalidDebounce
        );

        draft.autosave_debounce_ms = 120_000;
        assert_eq!(draft.validate().unwrap_err(), AppSettingsError::InvalidDebounce);
    }

    #[test]
    fn exporter_name_is_normalized() {
        let mut draft = AppSettingsDraft::new();
        draft.exporter_name = Some("  Dana  ".into());
        let settings = draft.validate().unwrap();
        assert_eq!(settings.exporter_name(), Some("Dana"));

        let blank = AppSettings::from_persisted(Some("   ".into()), 1_000, true, true).unwrap();
        assert_eq!(blank.exporter_name(), None);
    }
}
