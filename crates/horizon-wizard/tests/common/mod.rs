//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use horizon_wizard::{
    BasicFieldFactory, ComponentFactory, ComponentOptions, DefinitionError, FieldComponent,
    FieldDefinition, HookError, RenderRequest, ValidationError, WizardHooks,
};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("horizon_wizard=debug")),
        )
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Hooks
// ============================================================================

/// Hooks that record every call and can be told to reject.
#[derive(Clone, Default)]
pub struct RecordingHooks {
    pub redraws: Arc<Mutex<Vec<RenderRequest>>>,
    pub before_next_calls: Arc<Mutex<Vec<usize>>>,
    pub reject_next: Arc<AtomicBool>,
    pub decline_cancel: Arc<AtomicBool>,
    pub fail_redraw: Arc<AtomicBool>,
    /// When set, `before_next` waits for a notification.
    pub gate: Option<Arc<Notify>>,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn redraw_count(&self) -> usize {
        self.redraws.lock().len()
    }
}

impl WizardHooks for RecordingHooks {
    fn before_next<'a>(
        &'a self,
        page: usize,
        _data: &'a Value,
    ) -> BoxFuture<'a, Result<(), HookError>> {
        async move {
            self.before_next_calls.lock().push(page);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.reject_next.load(Ordering::SeqCst) {
                Err(HookError::new("pre-check failed"))
            } else {
                Ok(())
            }
        }
        .boxed()
    }

    fn confirm_cancel(&self) -> BoxFuture<'_, bool> {
        let confirmed = !self.decline_cancel.load(Ordering::SeqCst);
        async move { confirmed }.boxed()
    }

    fn redraw(&self, request: RenderRequest) -> BoxFuture<'_, Result<(), HookError>> {
        async move {
            if self.fail_redraw.load(Ordering::SeqCst) {
                return Err(HookError::new("render failed"));
            }
            self.redraws.lock().push(request);
            Ok(())
        }
        .boxed()
    }
}

// ============================================================================
// Component factory
// ============================================================================

/// Counts component construction and teardown.
#[derive(Clone, Default)]
pub struct TrackingFactory {
    pub created: Arc<AtomicUsize>,
    pub destroyed: Arc<AtomicUsize>,
    /// Field key whose construction fails.
    pub fail_on: Arc<Mutex<Option<String>>>,
}

impl TrackingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn destroyed(&self) -> usize {
        self.destroyed.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.created() - self.destroyed()
    }

    pub fn fail_on(&self, key: &str) {
        *self.fail_on.lock() = Some(key.to_string());
    }
}

struct TrackedField {
    inner: Box<dyn FieldComponent>,
    destroyed: Arc<AtomicUsize>,
}

impl FieldComponent for TrackedField {
    fn key(&self) -> &str {
        self.inner.key()
    }

    fn field_type(&self) -> &str {
        self.inner.field_type()
    }

    fn check_validity(&mut self, data: &Value, dirty: bool) -> bool {
        self.inner.check_validity(data, dirty)
    }

    fn errors(&self) -> &[ValidationError] {
        self.inner.errors()
    }

    fn destroy(&mut self) {
        self.inner.destroy();
        self.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}

impl ComponentFactory for TrackingFactory {
    fn create_component(
        &self,
        definition: &FieldDefinition,
        options: &ComponentOptions,
    ) -> Result<Box<dyn FieldComponent>, DefinitionError> {
        if self.fail_on.lock().as_deref() == Some(definition.key.as_str()) {
            return Err(DefinitionError::MissingKey { position: 0 });
        }
        let inner = BasicFieldFactory.create_component(definition, options)?;
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TrackedField {
            inner,
            destroyed: Arc::clone(&self.destroyed),
        }))
    }
}

/// Collects every value a signal emits.
pub fn record<T>(signal: &horizon_wizard::Signal<T>) -> Arc<Mutex<Vec<T>>>
where
    T: Clone + Send + 'static,
{
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    signal.connect(move |value: &T| sink.lock().push(value.clone()));
    seen
}
