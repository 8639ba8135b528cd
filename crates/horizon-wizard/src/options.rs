//! Wizard configuration.
//!
//! [`WizardOptions`] can be built programmatically or loaded from JSON or
//! TOML. Keys use camelCase in both formats.
//!
//! ```
//! use horizon_wizard::options::WizardOptions;
//!
//! let options = WizardOptions::from_toml_str(r#"
//!     readOnly = true
//!
//!     [buttonSettings]
//!     showPrevious = false
//! "#).unwrap();
//!
//! assert!(options.read_only);
//! assert!(!options.button_settings.show_previous);
//! // Cancel is hidden by default on read-only forms
//! assert!(!options.show_cancel());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::DefinitionError;

/// Options controlling wizard behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WizardOptions {
    /// Skip validation on `next` and never offer submit.
    pub read_only: bool,
    /// Render all pages as one continuous view, without page bounds.
    pub full: bool,
    /// Breadcrumb behavior.
    pub breadcrumb_settings: BreadcrumbSettings,
    /// Which control buttons are shown.
    pub button_settings: ButtonSettings,
}

impl WizardOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load options from TOML.
    pub fn from_toml_str(toml: &str) -> Result<Self, DefinitionError> {
        Ok(toml::from_str(toml)?)
    }

    /// Set read-only mode (builder pattern).
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Set full mode (builder pattern).
    pub fn with_full(mut self, full: bool) -> Self {
        self.full = full;
        self
    }

    /// Set whether breadcrumbs are clickable (builder pattern).
    pub fn with_clickable_breadcrumbs(mut self, clickable: bool) -> Self {
        self.breadcrumb_settings.clickable = clickable;
        self
    }

    /// Set the button settings (builder pattern).
    pub fn with_buttons(mut self, buttons: ButtonSettings) -> Self {
        self.button_settings = buttons;
        self
    }

    /// Whether the cancel button is shown, resolving the read-only default.
    pub fn show_cancel(&self) -> bool {
        self.button_settings
            .show_cancel
            .unwrap_or(!self.read_only)
    }
}

/// Breadcrumb settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BreadcrumbSettings {
    /// Whether clicking a breadcrumb jumps to that page.
    pub clickable: bool,
}

impl Default for BreadcrumbSettings {
    fn default() -> Self {
        Self { clickable: true }
    }
}

/// Control button settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ButtonSettings {
    /// Show the previous button.
    pub show_previous: bool,
    /// Show the next button.
    pub show_next: bool,
    /// Show the cancel button; `None` means "unless read-only".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_cancel: Option<bool>,
}

impl Default for ButtonSettings {
    fn default() -> Self {
        Self {
            show_previous: true,
            show_next: true,
            show_cancel: None,
        }
    }
}

impl ButtonSettings {
    /// Set whether previous is shown (builder pattern).
    pub fn with_previous(mut self, show: bool) -> Self {
        self.show_previous = show;
        self
    }

    /// Set whether next is shown (builder pattern).
    pub fn with_next(mut self, show: bool) -> Self {
        self.show_next = show;
        self
    }

    /// Set whether cancel is shown (builder pattern).
    pub fn with_cancel(mut self, show: bool) -> Self {
        self.show_cancel = Some(show);
        self
    }
}
