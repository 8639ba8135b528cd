//! The validity gate.
//!
//! Asks every component on a page to validate against the data document and
//! aggregates the answers. All components are asked, without
//! short-circuiting, so each one records its own error state.

use serde_json::Value;

use crate::component::{FieldComponent, ValidationError, ValidationResult};
use crate::graph::{Page, PageGraph};

/// Validate a group of components. Every component is asked.
pub fn check_components(
    components: &mut [Box<dyn FieldComponent>],
    data: &Value,
    dirty: bool,
) -> bool {
    components
        .iter_mut()
        .fold(true, |valid, component| component.check_validity(data, dirty) && valid)
}

/// Whether every component on `page` passes validation.
pub fn is_page_valid(page: &mut Page, data: &Value, dirty: bool) -> bool {
    let valid = check_components(page.components_mut(), data, dirty);
    tracing::trace!(
        target: "horizon_wizard::validity",
        page = page.index(),
        valid,
        dirty,
        "page validated"
    );
    valid
}

/// Aggregate the currently visible errors of a group of components.
pub fn collect_errors<'a, I>(components: I) -> Vec<ValidationError>
where
    I: IntoIterator<Item = &'a Box<dyn FieldComponent>>,
{
    components
        .into_iter()
        .flat_map(|component| component.errors().iter().cloned())
        .collect()
}

/// Validate the page at `index` together with the global components.
///
/// A missing page validates only the globals.
pub fn check_current(
    graph: &mut PageGraph,
    index: usize,
    data: &Value,
    dirty: bool,
) -> ValidationResult {
    let (page, globals) = graph.page_and_globals_mut(index);
    let mut valid = true;
    let mut errors = Vec::new();

    if let Some(page) = page {
        valid &= is_page_valid(page, data, dirty);
        errors.extend(collect_errors(page.components()));
    }
    valid &= check_components(globals, data, dirty);
    errors.extend(collect_errors(globals.iter()));

    into_result(valid, errors)
}

/// Validate every visible page and the global components.
pub fn check_all(graph: &mut PageGraph, data: &Value, dirty: bool) -> ValidationResult {
    let (pages, globals) = graph.pages_and_globals_mut();
    let mut valid = true;
    let mut errors = Vec::new();

    for page in pages.iter_mut() {
        valid &= is_page_valid(page, data, dirty);
        errors.extend(collect_errors(page.components()));
    }
    valid &= check_components(globals, data, dirty);
    errors.extend(collect_errors(globals.iter()));

    into_result(valid, errors)
}

fn into_result(valid: bool, errors: Vec<ValidationError>) -> ValidationResult {
    if valid {
        ValidationResult::valid()
    } else {
        ValidationResult::failed(errors)
    }
}
