//! Debug visualization of a wizard's page graph.
//!
//! # Example
//!
//! ```
//! use horizon_wizard::debug::{TreeFormatOptions, WizardTreeDebug};
//! use horizon_wizard::{FieldDefinition, PanelDefinition, Wizard, WizardDefinition};
//!
//! let wizard = Wizard::new(
//!     WizardDefinition::new("Signup")
//!         .panel(PanelDefinition::new("account", "Account").field(FieldDefinition::new("email")))
//!         .panel(PanelDefinition::new("done", "Done")),
//! ).unwrap();
//!
//! let output = WizardTreeDebug::new().format(&wizard);
//! assert!(output.contains("account"));
//! println!("{output}");
//! // Wizard "Signup" (2 pages, 0 globals):
//! // ├── [0] account "Account" *
//! // │   └── email (textfield)
//! // └── [1] done "Done"
//! ```

use std::fmt::Write;

use crate::component::FieldComponent;
use crate::graph::PageGraph;
use crate::navigation::NavigationState;
use crate::session::Wizard;

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact indented list.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to list each page's fields.
    pub show_fields: bool,
    /// Whether to show field type names.
    pub show_types: bool,
    /// Whether to show recorded validation errors under each field.
    pub show_errors: bool,
    /// Whether to print the history stack.
    pub show_history: bool,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_fields: true,
            show_types: true,
            show_errors: false,
            show_history: false,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_errors: true,
            show_history: true,
            ..Default::default()
        }
    }

    /// Create options for minimal output: pages only.
    pub fn minimal() -> Self {
        Self {
            show_fields: false,
            show_types: false,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing the pages of a wizard.
#[derive(Debug, Clone, Default)]
pub struct WizardTreeDebug {
    options: TreeFormatOptions,
}

impl WizardTreeDebug {
    /// Create a new debug visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format a wizard's current pages.
    pub fn format(&self, wizard: &Wizard) -> String {
        let title = wizard.definition().title;
        wizard.with_graph(|graph, nav| self.format_graph(title.as_deref(), graph, nav))
    }

    /// Format a page graph with the current page marked.
    pub fn format_graph(
        &self,
        title: Option<&str>,
        graph: &PageGraph,
        nav: &NavigationState,
    ) -> String {
        let mut output = String::new();
        writeln!(
            output,
            "Wizard \"{}\" ({} pages, {} globals):",
            title.unwrap_or("(untitled)"),
            graph.len(),
            graph.globals().len()
        )
        .expect("write to String");

        let has_globals = !graph.globals().is_empty();
        if graph.is_empty() && !has_globals {
            writeln!(output, "  (empty)").expect("write to String");
        }

        for (i, page) in graph.pages().iter().enumerate() {
            let is_last = i + 1 == graph.len() && !has_globals;
            output.push_str(&self.build_prefix(&[], is_last));
            write!(output, "[{}] {} \"{}\"", i, page.key(), page.title()).expect("write to String");
            if i == nav.current_page() && !nav.is_full() {
                output.push_str(" *");
            }
            output.push('\n');
            if self.options.show_fields {
                self.format_fields(page.components(), is_last, &mut output);
            }
        }

        if has_globals {
            output.push_str(&self.build_prefix(&[], true));
            output.push_str("(globals)\n");
            self.format_fields(graph.globals(), true, &mut output);
        }

        if self.options.show_history {
            writeln!(output, "history: {:?}", nav.history().as_slice()).expect("write to String");
        }

        output
    }

    fn format_fields(
        &self,
        components: &[Box<dyn FieldComponent>],
        parent_is_last: bool,
        output: &mut String,
    ) {
        let count = components.len();
        for (i, component) in components.iter().enumerate() {
            let is_last = i + 1 == count;
            output.push_str(&self.build_prefix(&[parent_is_last], is_last));
            output.push_str(component.key());
            if self.options.show_types {
                write!(output, " ({})", component.field_type()).expect("write to String");
            }
            output.push('\n');

            if self.options.show_errors {
                for error in component.errors() {
                    output.push_str(&self.build_prefix(&[parent_is_last, is_last], true));
                    writeln!(output, "! {}", error.message).expect("write to String");
                }
            }
        }
    }

    /// Build the prefix for a node whose ancestors' "is last" flags are
    /// `ancestors`.
    fn build_prefix(&self, ancestors: &[bool], is_last: bool) -> String {
        let (branch, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|   ", "+-- ", "`-- "),
            TreeStyle::Unicode => (
                "\u{2502}   ",
                "\u{251c}\u{2500}\u{2500} ",
                "\u{2514}\u{2500}\u{2500} ",
            ),
            TreeStyle::Compact => ("  ", "- ", "- "),
        };

        let mut prefix = String::new();
        for &ancestor_is_last in ancestors {
            if ancestor_is_last || self.options.style == TreeStyle::Compact {
                prefix.push_str(&" ".repeat(branch.chars().count()));
            } else {
                prefix.push_str(branch);
            }
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{FieldDefinition, PanelDefinition, WizardDefinition};
    use serde_json::json;

    fn wizard() -> Wizard {
        Wizard::new(
            WizardDefinition::new("Test")
                .panel(
                    PanelDefinition::new("one", "One")
                        .field(FieldDefinition::new("name").required())
                        .field(FieldDefinition::new("age").with_type("number")),
                )
                .panel(PanelDefinition::new("two", "Two"))
                .hidden(FieldDefinition::new("token")),
        )
        .unwrap()
    }

    #[test]
    fn test_format_empty() {
        let wizard = Wizard::new(WizardDefinition::default()).unwrap();
        let output = WizardTreeDebug::new().format(&wizard);
        assert!(output.contains("(untitled)"));
        assert!(output.contains("(empty)"));
    }

    #[test]
    fn test_format_unicode() {
        let output = WizardTreeDebug::new().format(&wizard());
        let expected = "\
Wizard \"Test\" (2 pages, 1 globals):
├── [0] one \"One\" *
│   ├── name (textfield)
│   └── age (number)
├── [1] two \"Two\"
└── (globals)
    └── token (hidden)
";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_format_minimal_ascii() {
        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..TreeFormatOptions::minimal()
        };
        let output = WizardTreeDebug::with_options(options).format(&wizard());
        assert!(output.contains("+-- [0] one \"One\" *"));
        assert!(output.contains("`-- (globals)"));
        assert!(!output.contains("name"));
    }

    #[tokio::test]
    async fn test_format_detailed_shows_errors_and_history() {
        let wizard = wizard();
        assert!(wizard.next().await.is_err());
        wizard.set_value("name", json!("Ada")).await.unwrap();
        wizard.set_value("token", json!("t")).await.unwrap();

        let output = WizardTreeDebug::with_options(TreeFormatOptions::detailed()).format(&wizard);
        assert!(output.contains("history: []"));

        let wizard = self::wizard();
        let _ = wizard.next().await;
        let output = WizardTreeDebug::with_options(TreeFormatOptions::detailed()).format(&wizard);
        assert!(output.contains("! name is required"));
    }
}
