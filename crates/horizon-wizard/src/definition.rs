//! Wizard definitions.
//!
//! A [`WizardDefinition`] is the static, declarative description of a
//! wizard: an ordered list of [`Item`]s. Panels become pages; hidden fields
//! become global components present on every page. Order is fixed at load
//! time; only visibility depends on data.
//!
//! # Example
//!
//! ```
//! use horizon_wizard::definition::{Item, WizardDefinition};
//!
//! let definition = WizardDefinition::from_json_str(r#"{
//!     "title": "Signup",
//!     "components": [
//!         {"type": "panel", "key": "account", "title": "Account",
//!          "components": [{"key": "email", "validate": {"required": true}}]},
//!         {"type": "hidden", "key": "source"}
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(definition.panels().count(), 1);
//! assert!(matches!(definition.components[1], Item::Hidden(_)));
//! ```

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::DefinitionError;
use crate::evaluator::{BranchExpression, Condition};

/// The static description of a wizard.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardDefinition {
    /// Form title.
    #[serde(default)]
    pub title: Option<String>,
    /// Display mode as declared by the form (`"wizard"` for paged forms).
    #[serde(default = "default_display")]
    pub display: String,
    /// Ordered items.
    #[serde(default)]
    pub components: Vec<Item>,
}

fn default_display() -> String {
    "wizard".to_string()
}

impl WizardDefinition {
    /// Create an empty definition with a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            display: default_display(),
            components: Vec::new(),
        }
    }

    /// Append a panel (builder pattern).
    pub fn panel(mut self, panel: PanelDefinition) -> Self {
        self.components.push(Item::Panel(panel));
        self
    }

    /// Append a hidden global field (builder pattern).
    pub fn hidden(mut self, field: FieldDefinition) -> Self {
        self.components.push(Item::Hidden(field));
        self
    }

    /// Parse and validate a definition from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, DefinitionError> {
        let definition: Self = serde_json::from_str(json)?;
        definition.validate()?;
        Ok(definition)
    }

    /// Parse and validate a definition from a JSON value.
    pub fn from_value(value: Value) -> Result<Self, DefinitionError> {
        let definition: Self = serde_json::from_value(value)?;
        definition.validate()?;
        Ok(definition)
    }

    /// Check every field key and validation pattern.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        for (position, field) in self.fields().enumerate() {
            if field.key.is_empty() {
                return Err(DefinitionError::MissingKey { position });
            }
            field.validate.compile_pattern(&field.key)?;
        }
        Ok(())
    }

    /// All panels, in order, regardless of visibility.
    pub fn panels(&self) -> impl Iterator<Item = &PanelDefinition> {
        self.components.iter().filter_map(|item| match item {
            Item::Panel(panel) => Some(panel),
            Item::Hidden(_) => None,
        })
    }

    /// All field definitions: panel children and hidden fields, in order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.components.iter().flat_map(|item| match item {
            Item::Panel(panel) => panel.components.iter().collect::<Vec<_>>(),
            Item::Hidden(field) => vec![field],
        })
    }
}

/// A top-level item of a wizard definition.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Item {
    /// A page-level group of fields with optional visibility and branching.
    Panel(PanelDefinition),
    /// A field present on every page.
    Hidden(FieldDefinition),
}

/// A panel: the definition of one page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelDefinition {
    /// Page key used by key-based branching.
    #[serde(default)]
    pub key: Option<String>,
    /// Page title.
    #[serde(default)]
    pub title: Option<String>,
    /// Visibility condition; absent means always visible.
    #[serde(default)]
    pub conditional: Option<Condition>,
    /// Branch expression overriding the default next page.
    #[serde(default)]
    pub next_page: Option<BranchExpression>,
    /// Ordered child fields.
    #[serde(default)]
    pub components: Vec<FieldDefinition>,
}

impl PanelDefinition {
    /// Create a panel with a key and title.
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Set the visibility condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditional = Some(condition);
        self
    }

    /// Set the branch expression.
    pub fn with_next_page(mut self, expression: BranchExpression) -> Self {
        self.next_page = Some(expression);
        self
    }

    /// Append a child field.
    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.components.push(field);
        self
    }

    /// The key this panel's page is known by.
    ///
    /// Falls back to the first child's key, then the title, then
    /// `page{position}` where `position` is the panel's item position.
    pub fn page_key(&self, position: usize) -> String {
        self.key
            .clone()
            .filter(|key| !key.is_empty())
            .or_else(|| {
                self.components
                    .first()
                    .map(|field| field.key.clone())
                    .filter(|key| !key.is_empty())
            })
            .or_else(|| self.title.clone())
            .unwrap_or_else(|| format!("page{position}"))
    }
}

/// A single input field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Data path the field reads and writes.
    #[serde(default)]
    pub key: String,
    /// Human-readable label.
    #[serde(default)]
    pub label: Option<String>,
    /// Field type; `textfield` when absent.
    #[serde(rename = "type", default)]
    pub field_type: Option<String>,
    /// Validation rules.
    #[serde(default)]
    pub validate: ValidationRules,
    /// Value written to the document when the field is first built.
    #[serde(default)]
    pub default_value: Option<Value>,
}

impl FieldDefinition {
    /// Create a field with a key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the field type.
    pub fn with_type(mut self, field_type: impl Into<String>) -> Self {
        self.field_type = Some(field_type.into());
        self
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.validate.required = true;
        self
    }

    /// Set a validation pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.validate.pattern = Some(pattern.into());
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// The field type, defaulting to `textfield`.
    pub fn field_type(&self) -> &str {
        self.field_type.as_deref().unwrap_or("textfield")
    }

    /// The label, defaulting to the key.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.key)
    }
}

/// Validation rules for a field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    /// The field must have a non-empty value.
    #[serde(default)]
    pub required: bool,
    /// The whole value must match this regular expression.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Minimum length in characters.
    #[serde(default)]
    pub min_length: Option<usize>,
    /// Maximum length in characters.
    #[serde(default)]
    pub max_length: Option<usize>,
}

impl ValidationRules {
    /// Compile the pattern anchored to the whole value.
    pub fn compile_pattern(&self, key: &str) -> Result<Option<Regex>, DefinitionError> {
        self.pattern
            .as_deref()
            .filter(|pattern| !pattern.is_empty())
            .map(|pattern| {
                Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
                    DefinitionError::InvalidPattern {
                        key: key.to_string(),
                        source,
                    }
                })
            })
            .transpose()
    }
}
