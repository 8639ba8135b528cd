//! Condition and branch evaluation.
//!
//! Page visibility and page-to-page branching are data-dependent expressions.
//! The engine never interprets an expression language itself: it hands
//! [`Condition`]s and [`BranchExpression`]s to an [`Evaluator`] together with
//! the current data document. [`BasicEvaluator`] understands the declarative
//! forms (simple equality conditions, literal targets, switch tables, and
//! host closures); hosts that want scripted expressions implement
//! [`Evaluator`] themselves.
//!
//! Whatever an evaluator returns for a branch is converted to a
//! [`BranchTarget`] at this boundary, so the navigation engine only ever
//! deals with typed targets.

use std::fmt;
use std::sync::Arc;

use horizon_wizard_core::lookup;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::EvaluationError;
use crate::graph::Page;

/// Host-supplied visibility predicate.
pub type ConditionFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Host-supplied branch function.
pub type BranchFn =
    Arc<dyn Fn(&BranchContext<'_>) -> Result<Value, EvaluationError> + Send + Sync>;

// ============================================================================
// Conditions
// ============================================================================

/// A visibility condition attached to a panel.
#[derive(Clone, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    /// Show (or hide) when the value at `when` equals `eq`.
    ///
    /// When the data value is an array, the condition matches if the array
    /// contains `eq`.
    Simple {
        #[serde(deserialize_with = "lenient_bool")]
        show: bool,
        when: String,
        #[serde(default)]
        eq: Value,
    },

    /// An opaque expression for a host evaluator.
    Script { script: String },

    /// A host closure over the data document.
    #[serde(skip_deserializing)]
    Custom(ConditionFn),
}

impl Condition {
    /// Create a simple equality condition.
    pub fn simple(show: bool, when: impl Into<String>, eq: impl Into<Value>) -> Self {
        Self::Simple {
            show,
            when: when.into(),
            eq: eq.into(),
        }
    }

    /// Create a condition from a closure.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple { show, when, eq } => f
                .debug_struct("Simple")
                .field("show", show)
                .field("when", when)
                .field("eq", eq)
                .finish(),
            Self::Script { script } => f.debug_struct("Script").field("script", script).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Accepts `true`/`false` as booleans or strings.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::String(s) => Ok(s.trim().eq_ignore_ascii_case("true")),
        other => Err(serde::de::Error::custom(format!(
            "expected a boolean, found {other}"
        ))),
    }
}

// ============================================================================
// Branch expressions
// ============================================================================

/// A branch expression overriding a page's default "next page".
#[derive(Clone, Deserialize)]
#[serde(untagged)]
pub enum BranchExpression {
    /// Pick a target by the value at `when`.
    ///
    /// Case keys are compared with the textual form of the data value. When
    /// no case matches and `default` is absent, the default next page is used.
    Switch {
        when: String,
        cases: Map<String, Value>,
        #[serde(rename = "default", default, deserialize_with = "present")]
        otherwise: Option<Value>,
    },

    /// A fixed target: an index, a page key, or `null` to end the flow.
    Literal { target: Value },

    /// An opaque expression for a host evaluator.
    Script(String),

    /// A host closure.
    #[serde(skip_deserializing)]
    Custom(BranchFn),
}

impl BranchExpression {
    /// A branch that always ends the flow.
    pub fn terminate() -> Self {
        Self::Literal {
            target: Value::Null,
        }
    }

    /// A branch that always yields `target`.
    pub fn target(target: impl Into<Value>) -> Self {
        Self::Literal {
            target: target.into(),
        }
    }

    /// Create a branch from a closure.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&BranchContext<'_>) -> Result<Value, EvaluationError> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }
}

impl fmt::Debug for BranchExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Switch {
                when,
                cases,
                otherwise,
            } => f
                .debug_struct("Switch")
                .field("when", when)
                .field("cases", cases)
                .field("default", otherwise)
                .finish(),
            Self::Literal { target } => f.debug_struct("Literal").field("target", target).finish(),
            Self::Script(script) => f.debug_tuple("Script").field(script).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Keeps an explicit `null` as `Some(Value::Null)` so it is distinguishable
/// from an absent key.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// The typed result of a branch expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchTarget {
    /// Go to this page index (not bounds-checked).
    GoTo(i64),
    /// Go to the first page with this key.
    GoToKey(String),
    /// No next page: the flow ends here.
    Terminate,
}

impl BranchTarget {
    /// Convert an evaluator result into a target.
    ///
    /// `null` terminates. Numbers and strings with a leading integer are
    /// indices (`"2"`, `" 3rd"`, `2.7` all go to an index). Everything else is
    /// a page key.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Terminate,
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::GoTo(i),
                None => match n.as_f64() {
                    Some(f) if f.is_finite() => Self::GoTo(f.trunc() as i64),
                    _ => Self::GoToKey(n.to_string()),
                },
            },
            Value::String(s) => match parse_int_prefix(s) {
                Some(i) => Self::GoTo(i),
                None => Self::GoToKey(s.clone()),
            },
            other => Self::GoToKey(other.to_string()),
        }
    }
}

/// Parse a leading base-10 integer, ignoring leading whitespace and any
/// trailing text.
fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Textual form of a data value used for equality against case keys.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// Evaluator
// ============================================================================

/// Context for evaluating a panel condition.
#[derive(Debug, Clone, Copy)]
pub struct ConditionContext<'a> {
    /// The data document.
    pub data: &'a Value,
    /// Key of the item carrying the condition, if it has one.
    pub item_key: Option<&'a str>,
}

/// Context for evaluating a branch expression.
#[derive(Debug, Clone, Copy)]
pub struct BranchContext<'a> {
    /// The default next index (`current + 1`).
    pub next: i64,
    /// Same as `next`; kept as a separate name for expressions that use it.
    pub page: i64,
    /// The data document.
    pub data: &'a Value,
    /// The page whose branch is being evaluated.
    pub form: &'a Page,
}

/// Evaluates visibility conditions and branch expressions.
///
/// Implementations must be side-effect free: the engine evaluates the same
/// expressions repeatedly (for example to decide which buttons to show).
pub trait Evaluator: Send + Sync {
    /// Whether an item with this condition is visible.
    fn check_condition(&self, condition: &Condition, ctx: &ConditionContext<'_>) -> bool;

    /// Evaluate a branch expression to a raw value.
    ///
    /// Convert the result with [`BranchTarget::from_value`].
    fn evaluate_branch(
        &self,
        expression: &BranchExpression,
        ctx: &BranchContext<'_>,
    ) -> Result<Value, EvaluationError>;
}

/// The built-in evaluator for declarative expressions and closures.
///
/// Script expressions are not supported: script conditions evaluate to
/// visible, and script branches return [`EvaluationError::Unsupported`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicEvaluator;

impl BasicEvaluator {
    /// Create a new basic evaluator.
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for BasicEvaluator {
    fn check_condition(&self, condition: &Condition, ctx: &ConditionContext<'_>) -> bool {
        match condition {
            Condition::Simple { show, when, eq } => {
                if when.is_empty() {
                    return true;
                }
                let found = match lookup(ctx.data, when) {
                    Some(Value::Array(items)) => items.iter().any(|item| values_match(item, eq)),
                    Some(value) => values_match(value, eq),
                    None => values_match(&Value::Null, eq),
                };
                if *show { found } else { !found }
            }
            Condition::Script { .. } => {
                tracing::warn!(
                    target: "horizon_wizard::graph",
                    item = ctx.item_key,
                    "script conditions need a scripting evaluator; treating as visible"
                );
                true
            }
            Condition::Custom(f) => f(ctx.data),
        }
    }

    fn evaluate_branch(
        &self,
        expression: &BranchExpression,
        ctx: &BranchContext<'_>,
    ) -> Result<Value, EvaluationError> {
        match expression {
            BranchExpression::Literal { target } => Ok(target.clone()),
            BranchExpression::Switch {
                when,
                cases,
                otherwise,
            } => {
                let key = lookup(ctx.data, when).map(value_text).unwrap_or_default();
                Ok(cases
                    .get(&key)
                    .or(otherwise.as_ref())
                    .cloned()
                    .unwrap_or_else(|| Value::from(ctx.next)))
            }
            BranchExpression::Script(script) => Err(EvaluationError::Unsupported(script.clone())),
            BranchExpression::Custom(f) => f(ctx),
        }
    }
}

/// Loose equality: identical JSON, or identical textual form (`1` matches `"1"`).
fn values_match(value: &Value, expected: &Value) -> bool {
    value == expected || value_text(value) == value_text(expected)
}
