//! Core systems for Horizon Wizard.
//!
//! This crate provides the foundational, domain-neutral components the
//! wizard engine is built on:
//!
//! - **Signal/Slot System**: Type-safe publish/subscribe used to report
//!   transitions to the host UI
//! - **Data Document**: The single shared submission document, with dotted
//!   path access and change detection
//! - **Logging**: Tracing targets, span names and performance spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_wizard_core::Signal;
//!
//! let submitted = Signal::<String>::new();
//!
//! let conn_id = submitted.connect(|form| {
//!     println!("Submitted: {}", form);
//! });
//!
//! submitted.emit("registration".to_string());
//! submitted.disconnect(conn_id);
//! ```
//!
//! # Data Document Example
//!
//! ```
//! use horizon_wizard_core::DataDocument;
//! use serde_json::json;
//!
//! let doc = DataDocument::new();
//! if doc.set("plan", json!("premium")).unwrap() {
//!     // Something changed: re-evaluate page conditions
//! }
//! assert_eq!(doc.get("plan"), Some(json!("premium")));
//! ```

pub mod document;
mod error;
pub mod logging;
pub mod signal;

pub use document::{lookup, DataDocument};
pub use error::{DocumentError, DocumentResult};
pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal};
