//! Field components and validation results.
//!
//! The engine treats a page as an ordered group of opaque, validatable
//! [`FieldComponent`]s. Components are created by a [`ComponentFactory`]
//! every time the page graph is rebuilt and torn down with
//! [`FieldComponent::destroy`] before the next rebuild; no instance survives
//! a rebuild.
//!
//! [`BasicField`] is the built-in component: it enforces the `validate`
//! block of a [`FieldDefinition`] (required, pattern, length bounds). Hosts
//! with richer field types supply their own factory.

use std::fmt;

use horizon_wizard_core::lookup;
use regex::Regex;
use serde_json::Value;

use crate::definition::FieldDefinition;
use crate::error::DefinitionError;
use crate::evaluator::value_text;

// ============================================================================
// ValidationResult
// ============================================================================

/// The outcome of a validity check over a page and the global components.
///
/// A result can be invalid without carrying errors: components that have not
/// been interacted with fail silently unless validation is forced with
/// `dirty = true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    valid: bool,
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// A passing result.
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// A failing result carrying whatever errors the components display.
    pub fn failed(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }

    /// Whether the check passed.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The displayed errors, in page order then globals.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// The first displayed error message.
    pub fn first_error_message(&self) -> Option<&str> {
        self.errors.first().map(|e| e.message.as_str())
    }
}

// ============================================================================
// ValidationError
// ============================================================================

/// A validation error with message and optional field key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The error message.
    pub message: String,
    /// Key of the field the error belongs to.
    pub key: Option<String>,
}

impl ValidationError {
    /// Create a validation error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            key: None,
        }
    }

    /// Create a validation error for a field.
    pub fn with_field(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{key}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

// ============================================================================
// Component capability
// ============================================================================

/// Where a component lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentScope {
    /// On the page with this index (at construction time).
    Page(usize),
    /// On every page.
    Global,
}

/// Options passed to a [`ComponentFactory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentOptions {
    /// Where the component lives.
    pub scope: ComponentScope,
    /// Whether the form is read-only.
    pub read_only: bool,
}

impl ComponentOptions {
    /// Options for a component on page `index`.
    pub fn page(index: usize, read_only: bool) -> Self {
        Self {
            scope: ComponentScope::Page(index),
            read_only,
        }
    }

    /// Options for a global component.
    pub fn global(read_only: bool) -> Self {
        Self {
            scope: ComponentScope::Global,
            read_only,
        }
    }

    /// The page index, for page-scoped components.
    pub fn page_index(&self) -> Option<usize> {
        match self.scope {
            ComponentScope::Page(index) => Some(index),
            ComponentScope::Global => None,
        }
    }
}

/// A validatable field on a page.
pub trait FieldComponent: Send + Sync {
    /// The data key this component is bound to.
    fn key(&self) -> &str;

    /// The component's type name.
    fn field_type(&self) -> &str;

    /// Human-readable label.
    fn label(&self) -> &str {
        self.key()
    }

    /// Validate against the data document and record the error state.
    ///
    /// With `dirty = true` the component is treated as interacted with, so
    /// its errors become visible even if the user never touched it.
    fn check_validity(&mut self, data: &Value, dirty: bool) -> bool;

    /// Errors recorded by the last [`check_validity`](Self::check_validity)
    /// that are currently visible.
    fn errors(&self) -> &[ValidationError];

    /// Release any resources held by the component.
    fn destroy(&mut self) {}
}

impl fmt::Debug for dyn FieldComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldComponent")
            .field("key", &self.key())
            .field("type", &self.field_type())
            .finish()
    }
}

/// Creates field components from definitions.
pub trait ComponentFactory: Send + Sync {
    /// Create a component for `definition`.
    fn create_component(
        &self,
        definition: &FieldDefinition,
        options: &ComponentOptions,
    ) -> Result<Box<dyn FieldComponent>, DefinitionError>;
}

// ============================================================================
// BasicField
// ============================================================================

/// The built-in field component.
#[derive(Debug)]
pub struct BasicField {
    definition: FieldDefinition,
    options: ComponentOptions,
    pattern: Option<Regex>,
    pristine: bool,
    errors: Vec<ValidationError>,
}

impl BasicField {
    /// Create a field from its definition.
    pub fn new(
        definition: FieldDefinition,
        options: ComponentOptions,
    ) -> Result<Self, DefinitionError> {
        let pattern = definition.validate.compile_pattern(&definition.key)?;
        Ok(Self {
            definition,
            options,
            pattern,
            pristine: true,
            errors: Vec::new(),
        })
    }

    /// The field's definition.
    pub fn definition(&self) -> &FieldDefinition {
        &self.definition
    }

    /// The options the field was created with.
    pub fn options(&self) -> &ComponentOptions {
        &self.options
    }

    /// Whether the field has not been forced into an error-showing state.
    pub fn is_pristine(&self) -> bool {
        self.pristine
    }

    /// Mark the field as interacted with (or not).
    pub fn set_pristine(&mut self, pristine: bool) {
        self.pristine = pristine;
    }

    /// Run the validation rules without recording anything.
    pub fn validate(&self, data: &Value) -> Vec<ValidationError> {
        let rules = &self.definition.validate;
        let key = &self.definition.key;
        let label = self.definition.label();
        let value = lookup(data, key).unwrap_or(&Value::Null);

        if is_empty(value) {
            return if rules.required {
                vec![ValidationError::with_field(key, format!("{label} is required"))]
            } else {
                Vec::new()
            };
        }

        let mut errors = Vec::new();
        if let Value::String(text) = value {
            let length = text.chars().count();
            if let Some(min) = rules.min_length.filter(|&min| length < min) {
                errors.push(ValidationError::with_field(
                    key,
                    format!("{label} must have at least {min} characters"),
                ));
            }
            if let Some(max) = rules.max_length.filter(|&max| length > max) {
                errors.push(ValidationError::with_field(
                    key,
                    format!("{label} must have no more than {max} characters"),
                ));
            }
        }
        if let Some(pattern) = &self.pattern
            && !pattern.is_match(&value_text(value))
        {
            let source = rules.pattern.as_deref().unwrap_or_default();
            errors.push(ValidationError::with_field(
                key,
                format!("{label} does not match the pattern {source}"),
            ));
        }
        errors
    }
}

impl FieldComponent for BasicField {
    fn key(&self) -> &str {
        &self.definition.key
    }

    fn field_type(&self) -> &str {
        match self.options.scope {
            ComponentScope::Global => "hidden",
            ComponentScope::Page(_) => self.definition.field_type(),
        }
    }

    fn label(&self) -> &str {
        self.definition.label()
    }

    fn check_validity(&mut self, data: &Value, dirty: bool) -> bool {
        if dirty {
            self.pristine = false;
        }
        let errors = self.validate(data);
        let valid = errors.is_empty();
        self.errors = if self.pristine { Vec::new() } else { errors };
        valid
    }

    fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    fn destroy(&mut self) {
        self.errors.clear();
    }
}

/// Whether a value counts as "not filled in".
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Factory producing [`BasicField`]s for every field type.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicFieldFactory;

impl BasicFieldFactory {
    /// Create a new factory.
    pub fn new() -> Self {
        Self
    }
}

impl ComponentFactory for BasicFieldFactory {
    fn create_component(
        &self,
        definition: &FieldDefinition,
        options: &ComponentOptions,
    ) -> Result<Box<dyn FieldComponent>, DefinitionError> {
        Ok(Box::new(BasicField::new(definition.clone(), *options)?))
    }
}
