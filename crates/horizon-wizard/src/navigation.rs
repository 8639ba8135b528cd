//! The navigation engine.
//!
//! Everything here is pure: [`NavigationState`] is an owned value, and each
//! transition returns a new state instead of mutating the old one. A failed
//! transition therefore leaves the caller's state exactly as it was, which
//! includes the history entry a failed backward move would otherwise lose.
//!
//! # Example
//!
//! ```
//! use horizon_wizard::navigation::NavigationState;
//!
//! let state = NavigationState::new(false);
//! let state = state.advance(Some(1), 3).unwrap();
//! let state = state.advance(Some(2), 3).unwrap();
//! assert_eq!(state.history().as_slice(), &[0, 1]);
//!
//! let (target, popped) = state.previous_page();
//! let state = popped.set_page(target, 3).unwrap();
//! assert_eq!(state.current_page(), 1);
//!
//! // Out of range: the caller keeps its state
//! assert!(state.set_page(7, 3).is_err());
//! ```

use serde_json::Value;

use crate::error::NavigationError;
use crate::evaluator::{BranchContext, BranchTarget, Evaluator};
use crate::graph::{PageGraph, PanelId};

// ============================================================================
// HistoryStack
// ============================================================================

/// LIFO record of visited page indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryStack {
    entries: Vec<usize>,
}

impl HistoryStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a page index.
    pub fn push(&mut self, page: usize) {
        self.entries.push(page);
    }

    /// Pop the most recent page index.
    pub fn pop(&mut self) -> Option<usize> {
        self.entries.pop()
    }

    /// The most recent page index.
    pub fn peek(&self) -> Option<usize> {
        self.entries.last().copied()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Map every entry through `f`, dropping those it rejects.
    pub fn relocate<F>(&mut self, f: F)
    where
        F: FnMut(usize) -> Option<usize>,
    {
        self.entries = self.entries.iter().copied().filter_map(f).collect();
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from oldest to newest.
    pub fn as_slice(&self) -> &[usize] {
        &self.entries
    }
}

// ============================================================================
// NavigationState
// ============================================================================

/// The current page and the history behind it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    current_page: usize,
    history: HistoryStack,
    full: bool,
}

impl NavigationState {
    /// Start on page 0 with empty history.
    pub fn new(full: bool) -> Self {
        Self {
            current_page: 0,
            history: HistoryStack::new(),
            full,
        }
    }

    /// The current page index.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// The visited-page history.
    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// Whether all pages render as one view.
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Move to `target`.
    ///
    /// The current page is a no-op. In full mode, or with no pages, every
    /// target succeeds without moving. Otherwise the target must be in
    /// `0..page_count`.
    pub fn set_page(&self, target: i64, page_count: usize) -> Result<Self, NavigationError> {
        if target == self.current_page as i64 || self.full || page_count == 0 {
            return Ok(self.clone());
        }
        match usize::try_from(target) {
            Ok(index) if index < page_count => Ok(Self {
                current_page: index,
                ..self.clone()
            }),
            _ => Err(NavigationError::PageNotFound { target }),
        }
    }

    /// Record the current page in history and move to `target`.
    ///
    /// A `None` target (a branch that ended the flow) fails without touching
    /// history. A branch back to the current page stays put without a push.
    pub fn advance(
        &self,
        target: Option<i64>,
        page_count: usize,
    ) -> Result<Self, NavigationError> {
        let target = target.ok_or(NavigationError::NoTarget)?;
        if target == self.current_page as i64 {
            return Ok(self.clone());
        }
        let mut pushed = self.clone();
        pushed.history.push(self.current_page);
        pushed.set_page(target, page_count)
    }

    /// The backward target and the state with that history entry popped.
    ///
    /// With empty history the target is `current - 1`, which is negative on
    /// the first page. Commit the popped state only if the move succeeds.
    pub fn previous_page(&self) -> (i64, Self) {
        let mut popped = self.clone();
        let target = match popped.history.pop() {
            Some(page) => page as i64,
            None => self.current_page as i64 - 1,
        };
        (target, popped)
    }

    /// Clear history and go back to the first page.
    pub fn reset(&self, page_count: usize) -> Self {
        let mut cleared = self.clone();
        cleared.history.clear();
        match cleared.set_page(0, page_count) {
            Ok(state) => state,
            Err(_) => Self {
                current_page: 0,
                ..cleared
            },
        }
    }

    /// Carry the state over to a rebuilt page list.
    ///
    /// `before` and `after` are the visible panels of the old and the new
    /// graph. The current page follows its panel to the panel's new index;
    /// only when that panel is gone is the index clamped to the last page
    /// (0 when there are none). History entries follow their panels the same
    /// way, and entries whose panel is gone are dropped.
    pub fn remap(&self, before: &[PanelId], after: &[PanelId]) -> Self {
        let relocate = |page: usize| {
            let panel = before.get(page)?;
            after.iter().position(|id| id == panel)
        };

        let current_page = relocate(self.current_page)
            .unwrap_or_else(|| self.current_page.min(after.len().saturating_sub(1)));
        let mut history = self.history.clone();
        history.relocate(relocate);
        // The clamped page may have landed on the most recent entry
        while history.peek() == Some(current_page) {
            history.pop();
        }

        Self {
            current_page,
            history,
            full: self.full,
        }
    }
}

// ============================================================================
// Next page resolution
// ============================================================================

/// Compute the page after `current`.
///
/// Without a branch expression this is `current + 1`, even past the last
/// page. A branch expression may name an index (used verbatim), a page key
/// (first match, else 0), or end the flow (`None`). A failing branch falls
/// back to `current + 1`.
pub fn get_next_page(
    graph: &PageGraph,
    data: &Value,
    current: usize,
    evaluator: &dyn Evaluator,
) -> Option<i64> {
    let page = graph.page(current)?;
    let next = current as i64 + 1;

    let Some(expression) = page.next_page() else {
        return Some(next);
    };

    let ctx = BranchContext {
        next,
        page: next,
        data,
        form: page,
    };
    let value = match evaluator.evaluate_branch(expression, &ctx) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(
                target: "horizon_wizard::navigation",
                page = page.key(),
                error = %err,
                "branch expression failed; using default next page"
            );
            return Some(next);
        }
    };

    match BranchTarget::from_value(&value) {
        BranchTarget::Terminate => None,
        BranchTarget::GoTo(index) => Some(index),
        BranchTarget::GoToKey(key) => Some(graph.page_index_by_key(&key) as i64),
    }
}
