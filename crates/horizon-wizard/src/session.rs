//! The wizard session controller.
//!
//! [`Wizard`] owns the data document, the current page graph, and the
//! navigation state, and exposes the lifecycle operations: advance, retreat,
//! jump, cancel, submit, and rebuild on data change. Every transition is
//! async because it may suspend in a host hook; a transition that fails
//! leaves the session in its last settled state.
//!
//! # Signals
//!
//! - `next_page(PageChange)`: Emitted after a forward move
//! - `prev_page(PageChange)`: Emitted after a backward move
//! - `form_load(WizardDefinition)`: Emitted after a new definition is loaded
//! - `page_changed(usize)`: Emitted whenever the current page index changes
//! - `pages_changed(usize)`: Emitted after a rebuild changed the visible pages
//! - `validation_failed(ValidationResult)`: Emitted when validation blocks a move
//! - `cancelled(())`: Emitted after a confirmed cancel
//! - `submitted(Value)`: Emitted with the data on a successful submit
//! - `busy_changed(bool)`: Emitted when a transition starts or settles
//!
//! # Example
//!
//! ```
//! use horizon_wizard::{FieldDefinition, PanelDefinition, Wizard, WizardDefinition};
//! use serde_json::json;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let definition = WizardDefinition::new("Signup")
//!     .panel(PanelDefinition::new("account", "Account")
//!         .field(FieldDefinition::new("email").required()))
//!     .panel(PanelDefinition::new("done", "Done"));
//!
//! let wizard = Wizard::builder(definition).build().unwrap();
//! wizard.next_page.connect(|change| println!("now on page {}", change.page));
//!
//! // Blocked by validation
//! assert!(wizard.next().await.is_err());
//!
//! wizard.set_value("email", json!("ada@example.com")).await.unwrap();
//! assert_eq!(wizard.next().await.unwrap(), 1);
//! # });
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use horizon_wizard_core::logging::span_names;
use horizon_wizard_core::{DataDocument, PerfSpan, Signal};
use parking_lot::Mutex;
use serde_json::Value;

use crate::actions::{self, WizardAction};
use crate::component::{BasicFieldFactory, ComponentFactory, ValidationError, ValidationResult};
use crate::definition::WizardDefinition;
use crate::error::{Result, WizardError};
use crate::evaluator::{BasicEvaluator, Evaluator};
use crate::graph::{PageGraph, PageGraphBuilder, PanelId};
use crate::hooks::{NoopHooks, RenderRequest, WizardHooks};
use crate::navigation::{self, NavigationState};
use crate::options::WizardOptions;
use crate::validity;

/// Payload of the `next_page` and `prev_page` signals.
#[derive(Debug, Clone, PartialEq)]
pub struct PageChange {
    /// The page now current.
    pub page: usize,
    /// The submission data at the time of the move.
    pub submission: Value,
}

/// A summary of one visible page, for breadcrumbs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    /// Page index.
    pub index: usize,
    /// Page key.
    pub key: String,
    /// Page title.
    pub title: String,
}

// ============================================================================
// Busy flag
// ============================================================================

struct BusyState {
    flag: AtomicBool,
    changed: Signal<bool>,
}

/// Marks the session busy until dropped, on success and failure alike.
struct BusyGuard {
    state: Arc<BusyState>,
}

impl BusyGuard {
    fn acquire(state: &Arc<BusyState>) -> Result<Self> {
        if state
            .flag
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!(target: "horizon_wizard::session", "transition rejected: busy");
            return Err(WizardError::Busy);
        }
        state.changed.emit(true);
        Ok(Self {
            state: Arc::clone(state),
        })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.state.flag.store(false, Ordering::SeqCst);
        self.state.changed.emit(false);
    }
}

// ============================================================================
// WizardBuilder
// ============================================================================

/// Configures and creates a [`Wizard`].
pub struct WizardBuilder {
    definition: WizardDefinition,
    options: WizardOptions,
    data: Value,
    evaluator: Arc<dyn Evaluator>,
    factory: Arc<dyn ComponentFactory>,
    hooks: Arc<dyn WizardHooks>,
}

impl WizardBuilder {
    /// Start from a definition with default options, empty data, and the
    /// built-in evaluator, component factory, and hooks.
    pub fn new(definition: WizardDefinition) -> Self {
        Self {
            definition,
            options: WizardOptions::default(),
            data: Value::Null,
            evaluator: Arc::new(BasicEvaluator),
            factory: Arc::new(BasicFieldFactory),
            hooks: Arc::new(NoopHooks),
        }
    }

    /// Set the options.
    pub fn options(mut self, options: WizardOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the initial submission data.
    pub fn data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Use a custom condition/branch evaluator.
    pub fn evaluator(mut self, evaluator: impl Evaluator + 'static) -> Self {
        self.evaluator = Arc::new(evaluator);
        self
    }

    /// Use a custom component factory.
    pub fn component_factory(mut self, factory: impl ComponentFactory + 'static) -> Self {
        self.factory = Arc::new(factory);
        self
    }

    /// Use custom host hooks.
    pub fn hooks(mut self, hooks: impl WizardHooks + 'static) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// Validate the definition and build the first page graph.
    ///
    /// No signal is emitted and no redraw is requested.
    pub fn build(self) -> Result<Wizard> {
        self.definition.validate()?;
        let document = Arc::new(DataDocument::from_value(self.data)?);
        seed_defaults(&document, &self.definition)?;

        let graph = document.with(|data| {
            PageGraphBuilder::new(&self.definition, self.evaluator.as_ref(), self.factory.as_ref())
                .read_only(self.options.read_only)
                .build(data)
        })?;

        tracing::debug!(
            target: "horizon_wizard::session",
            title = self.definition.title.as_deref(),
            pages = graph.len(),
            "wizard created"
        );

        Ok(Wizard {
            state: Mutex::new(SessionState {
                initial: document.snapshot(),
                nav: NavigationState::new(self.options.full),
                definition: self.definition,
                graph,
            }),
            options: self.options,
            document,
            evaluator: self.evaluator,
            factory: self.factory,
            hooks: self.hooks,
            busy: Arc::new(BusyState {
                flag: AtomicBool::new(false),
                changed: Signal::new(),
            }),
            next_page: Signal::new(),
            prev_page: Signal::new(),
            form_load: Signal::new(),
            page_changed: Signal::new(),
            pages_changed: Signal::new(),
            validation_failed: Signal::new(),
            cancelled: Signal::new(),
            submitted: Signal::new(),
        })
    }
}

/// Write each field's default value where the document has none.
fn seed_defaults(document: &DataDocument, definition: &WizardDefinition) -> Result<()> {
    for field in definition.fields() {
        if let Some(default) = &field.default_value
            && document.get(&field.key).is_none()
        {
            document.set(&field.key, default.clone())?;
        }
    }
    Ok(())
}

// ============================================================================
// Wizard
// ============================================================================

struct SessionState {
    definition: WizardDefinition,
    graph: PageGraph,
    nav: NavigationState,
    /// Data restored by cancel.
    initial: Value,
}

/// A wizard session.
///
/// All operations take `&self`. Only one transition (`set_page`, `next`,
/// `previous`, `cancel`, `jump_to`, `submit`, `set_form`) may be in flight at
/// a time; a second one fails with [`WizardError::Busy`].
pub struct Wizard {
    state: Mutex<SessionState>,
    options: WizardOptions,
    document: Arc<DataDocument>,
    evaluator: Arc<dyn Evaluator>,
    factory: Arc<dyn ComponentFactory>,
    hooks: Arc<dyn WizardHooks>,
    busy: Arc<BusyState>,

    /// Signal emitted after a forward move.
    pub next_page: Signal<PageChange>,
    /// Signal emitted after a backward move.
    pub prev_page: Signal<PageChange>,
    /// Signal emitted after [`set_form`](Self::set_form) loaded a definition.
    pub form_load: Signal<WizardDefinition>,
    /// Signal emitted when the current page index changes.
    pub page_changed: Signal<usize>,
    /// Signal emitted with the new page count after the visible pages changed.
    pub pages_changed: Signal<usize>,
    /// Signal emitted when validation blocks a move or a submit.
    pub validation_failed: Signal<ValidationResult>,
    /// Signal emitted after a confirmed cancel.
    pub cancelled: Signal<()>,
    /// Signal emitted with the submission data after a successful submit.
    pub submitted: Signal<Value>,
}

impl Wizard {
    /// Create a wizard with default collaborators.
    pub fn new(definition: WizardDefinition) -> Result<Self> {
        WizardBuilder::new(definition).build()
    }

    /// Start configuring a wizard.
    pub fn builder(definition: WizardDefinition) -> WizardBuilder {
        WizardBuilder::new(definition)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The options.
    pub fn options(&self) -> &WizardOptions {
        &self.options
    }

    /// The shared data document.
    ///
    /// Writing through it directly does not rebuild the pages; use
    /// [`set_value`](Self::set_value) or call [`rebuild`](Self::rebuild).
    pub fn document(&self) -> &Arc<DataDocument> {
        &self.document
    }

    /// A copy of the submission data.
    pub fn data(&self) -> Value {
        self.document.snapshot()
    }

    /// A copy of the current definition.
    pub fn definition(&self) -> WizardDefinition {
        self.state.lock().definition.clone()
    }

    /// The current page index.
    pub fn current_page(&self) -> usize {
        self.state.lock().nav.current_page()
    }

    /// A copy of the navigation state.
    pub fn navigation(&self) -> NavigationState {
        self.state.lock().nav.clone()
    }

    /// The history of visited pages, oldest first.
    pub fn history(&self) -> Vec<usize> {
        self.state.lock().nav.history().as_slice().to_vec()
    }

    /// Number of visible pages.
    pub fn page_count(&self) -> usize {
        self.state.lock().graph.len()
    }

    /// The visible pages, for breadcrumbs.
    pub fn pages(&self) -> Vec<PageInfo> {
        self.state
            .lock()
            .graph
            .pages()
            .iter()
            .map(|page| PageInfo {
                index: page.index(),
                key: page.key().to_string(),
                title: page.title().to_string(),
            })
            .collect()
    }

    /// Indices of the pages to render: all of them in full mode, otherwise
    /// just the current one.
    pub fn rendered_pages(&self) -> Vec<usize> {
        let state = self.state.lock();
        if self.options.full {
            (0..state.graph.len()).collect()
        } else if state.graph.is_empty() {
            Vec::new()
        } else {
            vec![state.nav.current_page()]
        }
    }

    /// Run `f` with read access to the page graph.
    ///
    /// `f` must not call back into the wizard.
    pub fn with_graph<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&PageGraph, &NavigationState) -> R,
    {
        let state = self.state.lock();
        f(&state.graph, &state.nav)
    }

    /// Visible errors on the current page and the global components.
    pub fn current_errors(&self) -> Vec<ValidationError> {
        let state = self.state.lock();
        let page = state.graph.page(state.nav.current_page());
        page.map(|p| validity::collect_errors(p.components()))
            .unwrap_or_default()
            .into_iter()
            .chain(validity::collect_errors(state.graph.globals()))
            .collect()
    }

    /// Whether a transition is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.flag.load(Ordering::SeqCst)
    }

    /// Signal emitted with `true` when a transition starts and `false` when
    /// it settles.
    pub fn busy_changed(&self) -> &Signal<bool> {
        &self.busy.changed
    }

    /// The page the next action would move to (`None` when a branch ends the
    /// flow).
    pub fn next_page_index(&self) -> Option<i64> {
        let state = self.state.lock();
        self.resolve_next(&state)
    }

    fn resolve_next(&self, state: &SessionState) -> Option<i64> {
        self.document.with(|data| {
            navigation::get_next_page(
                &state.graph,
                data,
                state.nav.current_page(),
                self.evaluator.as_ref(),
            )
        })
    }

    /// Whether `action` is currently available.
    pub fn is_action_available(&self, action: WizardAction) -> bool {
        let state = self.state.lock();
        let next = self.resolve_next(&state);
        actions::is_action_available(
            action,
            state.nav.current_page(),
            next,
            state.graph.len(),
            &self.options,
        )
    }

    /// Every currently available action.
    pub fn available_actions(&self) -> Vec<WizardAction> {
        let state = self.state.lock();
        let next = self.resolve_next(&state);
        actions::available_actions(
            state.nav.current_page(),
            next,
            state.graph.len(),
            &self.options,
        )
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Go to page `target`.
    ///
    /// The current page is a no-op. In full mode, or with no pages, any
    /// target succeeds without moving. Otherwise an index outside the
    /// visible pages fails with [`WizardError::PageNotFound`].
    #[tracing::instrument(skip(self), target = "horizon_wizard::session", level = "debug")]
    pub async fn set_page(&self, target: i64) -> Result<usize> {
        let _busy = BusyGuard::acquire(&self.busy)?;
        self.go_to(target).await
    }

    /// Jump to a page from a breadcrumb.
    ///
    /// Fails with [`WizardError::NavigationDisabled`] unless breadcrumbs are
    /// clickable. No validation runs.
    pub async fn jump_to(&self, index: usize) -> Result<usize> {
        if !self.options.breadcrumb_settings.clickable {
            return Err(WizardError::NavigationDisabled);
        }
        self.set_page(i64::try_from(index).unwrap_or(i64::MAX)).await
    }

    /// Move forward.
    ///
    /// Unless the form is read-only, the current page and the global
    /// components must validate (errors are forced visible) and the
    /// before-advance hook must approve. Only then is the current page pushed
    /// on the history and the next page resolved and shown.
    #[tracing::instrument(skip(self), target = "horizon_wizard::session", level = "debug")]
    pub async fn next(&self) -> Result<usize> {
        let _busy = BusyGuard::acquire(&self.busy)?;

        if !self.options.read_only {
            let (current, result) = {
                let mut state = self.state.lock();
                let current = state.nav.current_page();
                let result = self
                    .document
                    .with(|data| validity::check_current(&mut state.graph, current, data, true));
                (current, result)
            };

            if !result.is_valid() {
                tracing::debug!(
                    target: "horizon_wizard::session",
                    page = current,
                    errors = result.errors().len(),
                    "next blocked by validation"
                );
                self.validation_failed.emit(result.clone());
                return Err(WizardError::ValidationFailed(result));
            }

            let data = self.document.snapshot();
            self.hooks
                .before_next(current, &data)
                .await
                .map_err(WizardError::HookRejected)?;
        }

        let pending = {
            let state = self.state.lock();
            let current = state.nav.current_page();
            let target = self.resolve_next(&state);
            let candidate = state.nav.advance(target, state.graph.len())?;
            Pending::new(&state, candidate, target != Some(current as i64))
        };

        let page = self.commit(pending).await?;
        self.next_page.emit(PageChange {
            page,
            submission: self.document.snapshot(),
        });
        Ok(page)
    }

    /// Move back to the last visited page, or the previous index when there
    /// is no history.
    ///
    /// If the target no longer exists the move fails and the history is kept.
    #[tracing::instrument(skip(self), target = "horizon_wizard::session", level = "debug")]
    pub async fn previous(&self) -> Result<usize> {
        let _busy = BusyGuard::acquire(&self.busy)?;

        let pending = {
            let state = self.state.lock();
            let (target, popped) = state.nav.previous_page();
            let candidate = popped.set_page(target, state.graph.len())?;
            Pending::new(&state, candidate, target != state.nav.current_page() as i64)
        };

        let page = self.commit(pending).await?;
        self.prev_page.emit(PageChange {
            page,
            submission: self.document.snapshot(),
        });
        Ok(page)
    }

    /// Cancel the wizard.
    ///
    /// If the host confirms, the data is reset to its initial value, the
    /// history cleared, and the first page shown; returns `true`. If the host
    /// declines nothing changes; returns `false`. The reset pages are built
    /// and redrawn before anything is replaced, so a failed redraw leaves the
    /// data and the navigation as they were.
    #[tracing::instrument(skip(self), target = "horizon_wizard::session", level = "debug")]
    pub async fn cancel(&self) -> Result<bool> {
        let _busy = BusyGuard::acquire(&self.busy)?;

        if !self.hooks.confirm_cancel().await {
            tracing::debug!(target: "horizon_wizard::session", "cancel declined");
            return Ok(false);
        }

        let (initial, staged, pending) = {
            let state = self.state.lock();
            let initial = state.initial.clone();
            let builder = self.graph_builder(&state.definition);
            let staged = if builder.visible_panels(&initial) == state.graph.visible_panels() {
                None
            } else {
                Some(builder.build(&initial)?)
            };
            let count = staged.as_ref().map_or(state.graph.len(), PageGraph::len);
            let reset = state.nav.reset(count);
            let redraw = staged.is_some() || reset.current_page() != state.nav.current_page();
            (initial, staged, Pending::new(&state, reset, redraw))
        };

        if pending.redraw {
            let count = staged.as_ref().map_or_else(|| self.page_count(), PageGraph::len);
            if let Err(err) = self.render(pending.nav.current_page(), count).await {
                discard(staged);
                return Err(err);
            }
        }
        if let Err(err) = self.document.replace(initial) {
            discard(staged);
            return Err(err.into());
        }

        let rebuilt = staged.as_ref().map(PageGraph::len);
        let (before, after) = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let before = state.nav.current_page();
            let panels = match staged {
                Some(graph) => {
                    let panels = graph.visible_panels().to_vec();
                    state.graph.destroy();
                    state.graph = graph;
                    panels
                }
                None => pending.panels,
            };
            state.nav = pending.nav.remap(&panels, state.graph.visible_panels());
            (before, state.nav.current_page())
        };
        // Data written while the redraw was pending may have changed the pages
        let late = self.rebuild_graph()?;

        if before != after {
            self.page_changed.emit(after);
        }
        if let Some(count) = late.or(rebuilt) {
            self.pages_changed.emit(count);
        }
        self.cancelled.emit(());
        Ok(true)
    }

    /// Submit the form.
    ///
    /// Requires the submit action to be available; every visible page and
    /// the global components must validate.
    #[tracing::instrument(skip(self), target = "horizon_wizard::session", level = "debug")]
    pub async fn submit(&self) -> Result<Value> {
        let _busy = BusyGuard::acquire(&self.busy)?;

        if !self.is_action_available(WizardAction::Submit) {
            return Err(WizardError::ActionUnavailable(WizardAction::Submit));
        }

        let result = {
            let mut state = self.state.lock();
            self.document
                .with(|data| validity::check_all(&mut state.graph, data, true))
        };
        if !result.is_valid() {
            self.validation_failed.emit(result.clone());
            return Err(WizardError::ValidationFailed(result));
        }

        let submission = self.document.snapshot();
        tracing::info!(target: "horizon_wizard::session", "wizard submitted");
        self.submitted.emit(submission.clone());
        Ok(submission)
    }

    /// Load a new definition.
    ///
    /// Missing default values are written to the data, the pages are rebuilt
    /// from scratch, and navigation restarts on the first page with empty
    /// history. The new pages are built and redrawn before the old ones are
    /// torn down; if either step fails the session keeps its old definition,
    /// pages, data, and navigation.
    #[tracing::instrument(skip_all, target = "horizon_wizard::session", level = "debug")]
    pub async fn set_form(&self, definition: WizardDefinition) -> Result<()> {
        let _busy = BusyGuard::acquire(&self.busy)?;
        definition.validate()?;

        let seeded = DataDocument::from_value(self.document.snapshot())?;
        seed_defaults(&seeded, &definition)?;
        let graph = seeded.with(|data| self.graph_builder(&definition).build(data))?;
        let count = graph.len();

        if let Err(err) = self.render(0, count).await {
            discard(Some(graph));
            return Err(err);
        }
        if let Err(err) = seed_defaults(&self.document, &definition) {
            discard(Some(graph));
            return Err(err);
        }

        let before = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let before = state.nav.current_page();
            state.graph.destroy();
            state.graph = graph;
            state.definition = definition.clone();
            state.nav = NavigationState::new(self.options.full);
            before
        };
        // Data written while the redraw was pending may have changed the pages
        let late = self.rebuild_graph()?;
        self.state.lock().initial = self.document.snapshot();

        tracing::info!(
            target: "horizon_wizard::session",
            title = definition.title.as_deref(),
            pages = late.unwrap_or(count),
            "form loaded"
        );
        if before != 0 {
            self.page_changed.emit(0);
        }
        self.form_load.emit(definition);
        Ok(())
    }

    // =========================================================================
    // Data changes
    // =========================================================================

    /// Set one value and rebuild if the data changed.
    ///
    /// Returns whether the data changed.
    pub async fn set_value(&self, path: &str, value: Value) -> Result<bool> {
        if !self.document.set(path, value)? {
            return Ok(false);
        }
        self.rebuild().await?;
        Ok(true)
    }

    /// Replace the submission data and rebuild if it changed.
    ///
    /// Returns whether the data changed.
    pub async fn set_submission(&self, data: Value) -> Result<bool> {
        if !self.document.replace(data)? {
            return Ok(false);
        }
        self.rebuild().await?;
        Ok(true)
    }

    /// Recompute which panels are visible and rebuild the pages if that set
    /// changed.
    ///
    /// On a rebuild every component is destroyed and recreated. The current
    /// page stays on its panel when that panel is still visible and is
    /// clamped to the last visible page otherwise; history entries follow
    /// their panels and are dropped when their panel is hidden. Returns
    /// whether a rebuild happened.
    #[tracing::instrument(skip(self), target = "horizon_wizard::session", level = "debug")]
    pub async fn rebuild(&self) -> Result<bool> {
        let Some(count) = self.rebuild_graph()? else {
            return Ok(false);
        };
        let page = self.current_page();
        self.render(page, count).await?;
        self.pages_changed.emit(count);
        Ok(true)
    }

    /// Rebuild the graph if the visible panels changed; returns the new page
    /// count when it did.
    ///
    /// The new generation is built first, so a failing factory leaves the
    /// current pages in place. The current page and the history follow their
    /// panels into the new graph.
    fn rebuild_graph(&self) -> Result<Option<usize>> {
        let _perf = PerfSpan::new(span_names::REBUILD);
        let (before, after, count) = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let builder = self.graph_builder(&state.definition);

            let visible = self.document.with(|data| builder.visible_panels(data));
            if visible == state.graph.visible_panels() {
                return Ok(None);
            }

            let graph = self.document.with(|data| builder.build(data))?;
            let before = state.nav.current_page();
            state.nav = state
                .nav
                .remap(state.graph.visible_panels(), graph.visible_panels());
            state.graph.destroy();
            state.graph = graph;

            tracing::debug!(
                target: "horizon_wizard::session",
                pages = state.graph.len(),
                current = state.nav.current_page(),
                "pages rebuilt"
            );
            (before, state.nav.current_page(), state.graph.len())
        };

        if before != after {
            self.page_changed.emit(after);
        }
        Ok(Some(count))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn graph_builder<'a>(&'a self, definition: &'a WizardDefinition) -> PageGraphBuilder<'a> {
        PageGraphBuilder::new(definition, self.evaluator.as_ref(), self.factory.as_ref())
            .read_only(self.options.read_only)
    }

    async fn go_to(&self, target: i64) -> Result<usize> {
        let pending = {
            let state = self.state.lock();
            let candidate = state.nav.set_page(target, state.graph.len())?;
            Pending::new(&state, candidate, target != state.nav.current_page() as i64)
        };
        self.commit(pending).await
    }

    async fn render(&self, page: usize, page_count: usize) -> Result<()> {
        let request = RenderRequest {
            page,
            page_count,
            full: self.options.full,
        };
        self.hooks
            .redraw(request)
            .await
            .map_err(WizardError::HookRejected)
    }

    /// Redraw for the pending state if asked, then make it the navigation
    /// state.
    async fn commit(&self, pending: Pending) -> Result<usize> {
        if pending.redraw {
            let page_count = self.page_count();
            self.render(pending.nav.current_page(), page_count).await?;
        }

        let (page, changed) = {
            let mut state = self.state.lock();
            let before = state.nav.current_page();
            // Pages may have been rebuilt while the redraw was pending
            state.nav = pending.nav.remap(&pending.panels, state.graph.visible_panels());
            let page = state.nav.current_page();
            (page, page != before)
        };

        if changed {
            tracing::debug!(target: "horizon_wizard::session", page, "page changed");
            self.page_changed.emit(page);
        }
        Ok(page)
    }
}

/// A navigation state computed against one generation of the page graph.
struct Pending {
    nav: NavigationState,
    /// Visible panels of the graph `nav` was computed against.
    panels: Vec<PanelId>,
    redraw: bool,
}

impl Pending {
    fn new(state: &SessionState, nav: NavigationState, redraw: bool) -> Self {
        Self {
            nav,
            panels: state.graph.visible_panels().to_vec(),
            redraw,
        }
    }
}

/// Tear down a graph that was built but never installed.
fn discard(graph: Option<PageGraph>) {
    if let Some(mut graph) = graph {
        graph.destroy();
    }
}

impl Drop for Wizard {
    fn drop(&mut self) {
        self.state.get_mut().graph.destroy();
    }
}

impl fmt::Debug for Wizard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Wizard")
            .field("title", &state.definition.title)
            .field("current_page", &state.nav.current_page())
            .field("page_count", &state.graph.len())
            .field("history", &state.nav.history().as_slice())
            .field("options", &self.options)
            .field("busy", &self.is_busy())
            .finish()
    }
}
