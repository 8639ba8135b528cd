//! Control action availability.
//!
//! Decides which of cancel, previous, next, and submit the host should offer,
//! from the current page, the computed next page, the page count, and the
//! options.

use std::fmt;

use crate::options::WizardOptions;

/// A control action offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardAction {
    /// Abandon the wizard and return to the first page.
    Cancel,
    /// Go back.
    Previous,
    /// Go forward.
    Next,
    /// Submit the form.
    Submit,
}

impl WizardAction {
    /// All actions, in button order.
    pub const ALL: [WizardAction; 4] = [Self::Cancel, Self::Previous, Self::Next, Self::Submit];

    /// The action's name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cancel => "cancel",
            Self::Previous => "previous",
            Self::Next => "next",
            Self::Submit => "submit",
        }
    }
}

impl fmt::Display for WizardAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `action` is available.
///
/// `next_page` is the navigation engine's answer for the current page:
/// `None` means a branch ended the flow.
pub fn is_action_available(
    action: WizardAction,
    current_page: usize,
    next_page: Option<i64>,
    page_count: usize,
    options: &WizardOptions,
) -> bool {
    match action {
        WizardAction::Previous => current_page > 0 && options.button_settings.show_previous,
        WizardAction::Next => {
            next_page.is_some_and(|next| next < page_count as i64)
                && options.button_settings.show_next
        }
        WizardAction::Cancel => options.show_cancel(),
        WizardAction::Submit => {
            !options.read_only
                && (next_page.is_none() || page_count.checked_sub(1) == Some(current_page))
        }
    }
}

/// Every available action, in button order.
pub fn available_actions(
    current_page: usize,
    next_page: Option<i64>,
    page_count: usize,
    options: &WizardOptions,
) -> Vec<WizardAction> {
    WizardAction::ALL
        .into_iter()
        .filter(|&action| is_action_available(action, current_page, next_page, page_count, options))
        .collect()
}
