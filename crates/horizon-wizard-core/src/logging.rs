//! Logging facilities for Horizon Wizard.
//!
//! This module provides:
//! - Target and span names used with the `tracing` crate
//! - Performance tracing hooks for profiling page rebuilds
//!
//! # Tracing Integration
//!
//! Horizon Wizard uses the `tracing` crate for instrumentation and never
//! installs a subscriber itself. To see logs, install one in the host:
//!
//! ```ignore
//! use tracing_subscriber::EnvFilter;
//!
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter(EnvFilter::new("horizon_wizard=debug"))
//!         .init();
//!
//!     // Your application code...
//! }
//! ```

/// Span names used throughout Horizon Wizard for tracing.
///
/// These constants can be used to filter traces for specific subsystems.
pub mod span_names {
    /// Session transition span (next, previous, set page, cancel).
    pub const TRANSITION: &str = "horizon_wizard::transition";
    /// Page graph rebuild span.
    pub const REBUILD: &str = "horizon_wizard::rebuild";
    /// Signal emission span.
    pub const SIGNAL: &str = "horizon_wizard::signal";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_wizard_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_wizard_core::signal";
    /// Data document target.
    pub const DOCUMENT: &str = "horizon_wizard_core::document";
    /// Session controller target.
    pub const SESSION: &str = "horizon_wizard::session";
    /// Navigation engine target.
    pub const NAVIGATION: &str = "horizon_wizard::navigation";
    /// Page graph builder target.
    pub const GRAPH: &str = "horizon_wizard::graph";
    /// Validity gate target.
    pub const VALIDITY: &str = "horizon_wizard::validity";
    /// Performance spans target.
    pub const PERF: &str = "horizon_wizard::perf";
}

/// A guard that keeps a tracing span entered until it is dropped.
///
/// This is useful for tracking the duration of operations such as a page
/// graph rebuild.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_wizard::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}
