//! Error types for the wizard engine.

use horizon_wizard_core::DocumentError;
use thiserror::Error;

use crate::actions::WizardAction;
use crate::component::ValidationResult;

/// Result type alias for wizard operations.
pub type Result<T> = std::result::Result<T, WizardError>;

/// Errors that can occur while driving a wizard session.
///
/// None of these are fatal: a failed transition leaves the session in its
/// last settled state.
#[derive(Error, Debug)]
pub enum WizardError {
    /// The requested page does not exist, or a branch ended the flow.
    ///
    /// `target` is `None` when a branch expression yielded no target.
    #[error(
        "page not found: {}",
        .target.map_or_else(|| "no target".to_string(), |t| t.to_string())
    )]
    PageNotFound { target: Option<i64> },

    /// The current page did not pass validation.
    #[error("validation failed with {} error(s)", .0.errors().len())]
    ValidationFailed(ValidationResult),

    /// A host hook (before-advance, redraw) rejected the transition.
    #[error("transition rejected by hook: {0}")]
    HookRejected(#[source] HookError),

    /// Another transition is still in flight.
    #[error("another transition is already in progress")]
    Busy,

    /// Direct page jumps are disabled by the breadcrumb settings.
    #[error("breadcrumb navigation is disabled")]
    NavigationDisabled,

    /// The requested action is not currently available.
    #[error("action '{0}' is not available")]
    ActionUnavailable(WizardAction),

    /// The wizard definition is invalid.
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// The data document rejected a read or write.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl WizardError {
    /// Whether this error is a rejected page lookup.
    pub fn is_page_not_found(&self) -> bool {
        matches!(self, Self::PageNotFound { .. })
    }

    /// The validation result carried by a [`WizardError::ValidationFailed`].
    pub fn validation(&self) -> Option<&ValidationResult> {
        match self {
            Self::ValidationFailed(result) => Some(result),
            _ => None,
        }
    }
}

impl From<NavigationError> for WizardError {
    fn from(err: NavigationError) -> Self {
        match err {
            NavigationError::PageNotFound { target } => Self::PageNotFound {
                target: Some(target),
            },
            NavigationError::NoTarget => Self::PageNotFound { target: None },
        }
    }
}

/// Errors produced by the pure navigation functions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// The target index is outside the visible pages.
    #[error("page not found: {target}")]
    PageNotFound { target: i64 },

    /// A branch expression terminated the flow, so there is no page to move to.
    #[error("page not found: branch has no target")]
    NoTarget,
}

/// Errors raised while loading or validating a wizard definition.
#[derive(Error, Debug)]
pub enum DefinitionError {
    /// Invalid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid TOML.
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// A field's validation pattern is not a valid regular expression.
    #[error("invalid pattern for field '{key}': {source}")]
    InvalidPattern {
        key: String,
        #[source]
        source: regex::Error,
    },

    /// A field has an empty key.
    #[error("field at position {position} has an empty key")]
    MissingKey { position: usize },
}

/// An error reported by a host hook.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HookError {
    /// Description supplied by the host.
    pub message: String,
}

impl HookError {
    /// Create a hook error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An error raised while evaluating a branch expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// The evaluator does not understand this kind of expression.
    #[error("unsupported expression: {0}")]
    Unsupported(String),

    /// The expression failed at runtime.
    #[error("expression failed: {0}")]
    Failed(String),
}
