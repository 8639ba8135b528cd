//! Host hooks.
//!
//! The session suspends at exactly three points, all supplied by the host:
//! the before-advance check, the cancel confirmation, and the redraw of the
//! pages after a transition. Each returns a boxed future so hosts can do
//! async work (a server-side pre-check, a confirmation dialog, re-rendering).
//!
//! Every method has a default that approves immediately.

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};
use serde_json::Value;

use crate::error::HookError;

/// What the host should render after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderRequest {
    /// The page to show.
    pub page: usize,
    /// Number of visible pages.
    pub page_count: usize,
    /// Whether all pages render as one view.
    pub full: bool,
}

/// Async callbacks into the host.
pub trait WizardHooks: Send + Sync {
    /// Called after the current page validated and before moving forward.
    ///
    /// Returning an error cancels the move.
    fn before_next<'a>(
        &'a self,
        _page: usize,
        _data: &'a Value,
    ) -> BoxFuture<'a, Result<(), HookError>> {
        future::ready(Ok(())).boxed()
    }

    /// Ask whether the user really wants to cancel.
    fn confirm_cancel(&self) -> BoxFuture<'_, bool> {
        future::ready(true).boxed()
    }

    /// Re-render the wizard.
    ///
    /// Returning an error cancels the transition that asked for it.
    fn redraw(&self, _request: RenderRequest) -> BoxFuture<'_, Result<(), HookError>> {
        future::ready(Ok(())).boxed()
    }
}

/// Hooks that approve everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl WizardHooks for NoopHooks {}
