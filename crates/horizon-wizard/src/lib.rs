//! Horizon Wizard - a headless multi-page form wizard engine.
//!
//! A wizard is an ordered sequence of pages, each a group of input fields.
//! Pages can be hidden by data-dependent conditions, can branch to other
//! pages, and must validate before the user moves forward. This crate
//! implements the navigation state machine behind that: given the data
//! document and the declarative page graph, it computes the visible pages,
//! the next and previous page, whether a move is allowed, and which control
//! actions to offer, and recomputes all of it whenever the data changes.
//!
//! Rendering is left to the host. The host connects to the session's
//! signals and implements [`WizardHooks`] to redraw, confirm cancellation,
//! or run async checks before moving forward.
//!
//! # Quick Start
//!
//! ```
//! use horizon_wizard::{
//!     BranchExpression, Condition, FieldDefinition, PanelDefinition, Wizard, WizardAction,
//!     WizardDefinition,
//! };
//! use serde_json::json;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let definition = WizardDefinition::new("Insurance quote")
//!     .panel(PanelDefinition::new("vehicle", "Vehicle")
//!         .field(FieldDefinition::new("plate").required()))
//!     .panel(PanelDefinition::new("driver", "Young driver")
//!         .with_condition(Condition::simple(true, "youngDriver", true)))
//!     .panel(PanelDefinition::new("summary", "Summary")
//!         .with_next_page(BranchExpression::terminate()));
//!
//! let wizard = Wizard::new(definition).unwrap();
//! assert_eq!(wizard.page_count(), 2);
//!
//! wizard.set_value("plate", json!("EL 12345")).await.unwrap();
//! wizard.set_value("youngDriver", json!(true)).await.unwrap();
//! assert_eq!(wizard.page_count(), 3);
//!
//! wizard.next().await.unwrap();
//! wizard.next().await.unwrap();
//! assert!(wizard.is_action_available(WizardAction::Submit));
//! assert!(!wizard.is_action_available(WizardAction::Next));
//! # });
//! ```
//!
//! # Modules
//!
//! - [`definition`]: The wizard definition model, loaded from JSON
//! - [`options`]: Configuration, loaded from JSON or TOML
//! - [`evaluator`]: Conditions, branch expressions, and their evaluation
//! - [`component`]: Field components and validation results
//! - [`graph`]: Builds the visible pages from a definition
//! - [`validity`]: Validates pages
//! - [`navigation`]: Pure next/previous page resolution and history
//! - [`actions`]: Which control actions are available
//! - [`hooks`]: Async host callbacks
//! - [`session`]: The [`Wizard`] session controller
//! - [`debug`]: Tree visualization of the page graph

pub mod actions;
pub mod component;
pub mod debug;
pub mod definition;
mod error;
pub mod evaluator;
pub mod graph;
pub mod hooks;
pub mod navigation;
pub mod options;
pub mod session;
pub mod validity;

pub use actions::{WizardAction, available_actions, is_action_available};
pub use component::{
    BasicField, BasicFieldFactory, ComponentFactory, ComponentOptions, ComponentScope,
    FieldComponent, ValidationError, ValidationResult,
};
pub use definition::{FieldDefinition, Item, PanelDefinition, ValidationRules, WizardDefinition};
pub use error::{
    DefinitionError, EvaluationError, HookError, NavigationError, Result, WizardError,
};
pub use evaluator::{
    BasicEvaluator, BranchContext, BranchExpression, BranchTarget, Condition, ConditionContext,
    Evaluator,
};
pub use graph::{Page, PageGraph, PageGraphBuilder, PanelId};
pub use hooks::{NoopHooks, RenderRequest, WizardHooks};
pub use navigation::{HistoryStack, NavigationState, get_next_page};
pub use options::{BreadcrumbSettings, ButtonSettings, WizardOptions};
pub use session::{PageChange, PageInfo, Wizard, WizardBuilder};

/// Re-exported core primitives.
pub use horizon_wizard_core::{DataDocument, Signal};
