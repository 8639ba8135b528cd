//! Integration tests for page visibility, branching, and navigation.

mod common;

use common::{RecordingHooks, TrackingFactory, init_tracing, record};
use horizon_wizard::{
    BranchExpression, Condition, FieldDefinition, PanelDefinition, Wizard, WizardAction,
    WizardDefinition, WizardError, WizardOptions,
};
use serde_json::json;

fn linear(count: usize) -> WizardDefinition {
    (0..count).fold(WizardDefinition::new("Linear"), |definition, i| {
        definition.panel(PanelDefinition::new(format!("page{i}"), format!("Page {i}")))
    })
}

fn keys(wizard: &Wizard) -> Vec<String> {
    wizard.pages().into_iter().map(|page| page.key).collect()
}

fn current_key(wizard: &Wizard) -> String {
    wizard.pages()[wizard.current_page()].key.clone()
}

// =========================================================================
// Page visibility
// =========================================================================

#[tokio::test]
async fn visible_pages_preserve_definition_order() {
    init_tracing();
    let definition = WizardDefinition::new("Conditional")
        .panel(PanelDefinition::new("a", "A").with_condition(Condition::simple(true, "x", 1)))
        .panel(PanelDefinition::new("b", "B").with_condition(Condition::simple(true, "y", 1)))
        .panel(PanelDefinition::new("c", "C").with_condition(Condition::simple(true, "x", 1)))
        .panel(PanelDefinition::new("d", "D"));
    let wizard = Wizard::new(definition).unwrap();
    assert_eq!(keys(&wizard), ["d"]);

    wizard.set_value("y", json!(1)).await.unwrap();
    assert_eq!(keys(&wizard), ["b", "d"]);

    wizard.set_value("x", json!(1)).await.unwrap();
    assert_eq!(keys(&wizard), ["a", "b", "c", "d"]);

    wizard.set_value("y", json!(0)).await.unwrap();
    assert_eq!(keys(&wizard), ["a", "c", "d"]);
}

#[tokio::test]
async fn unrelated_data_change_keeps_components() {
    init_tracing();
    let factory = TrackingFactory::new();
    let definition = WizardDefinition::new("Stable")
        .panel(PanelDefinition::new("a", "A").field(FieldDefinition::new("name")))
        .panel(
            PanelDefinition::new("b", "B")
                .with_condition(Condition::simple(true, "more", true))
                .field(FieldDefinition::new("extra")),
        )
        .hidden(FieldDefinition::new("token"));
    let wizard = Wizard::builder(definition)
        .component_factory(factory.clone())
        .build()
        .unwrap();
    let pages_changed = record(&wizard.pages_changed);

    assert_eq!(factory.created(), 2);
    assert!(wizard.set_value("name", json!("Ada")).await.unwrap());
    assert!(!wizard.rebuild().await.unwrap());
    assert_eq!(factory.created(), 2);
    assert_eq!(factory.destroyed(), 0);
    assert!(pages_changed.lock().is_empty());

    // A visibility change rebuilds everything from scratch
    wizard.set_value("more", json!(true)).await.unwrap();
    assert_eq!(factory.destroyed(), 2);
    assert_eq!(factory.created(), 5);
    assert_eq!(factory.live(), 3);
    assert_eq!(*pages_changed.lock(), vec![2]);
}

#[tokio::test]
async fn hidden_panel_data_is_untouched() {
    let definition = WizardDefinition::new("Keep data")
        .panel(PanelDefinition::new("a", "A"))
        .panel(
            PanelDefinition::new("b", "B")
                .with_condition(Condition::simple(true, "show", true))
                .field(FieldDefinition::new("detail")),
        );
    let wizard = Wizard::builder(definition)
        .data(json!({"show": true, "detail": "kept"}))
        .build()
        .unwrap();
    wizard.set_value("show", json!(false)).await.unwrap();
    assert_eq!(wizard.page_count(), 1);
    assert_eq!(wizard.data()["detail"], json!("kept"));
}

#[tokio::test]
async fn hiding_current_page_clamps_to_last_page() {
    init_tracing();
    let definition = WizardDefinition::new("Collapse")
        .panel(PanelDefinition::new("a", "A"))
        .panel(PanelDefinition::new("b", "B"))
        .panel(
            PanelDefinition::new("c", "C")
                .with_condition(Condition::simple(false, "skipC", true)),
        );
    let hooks = RecordingHooks::new();
    let wizard = Wizard::builder(definition)
        .hooks(hooks.clone())
        .build()
        .unwrap();
    let changed = record(&wizard.page_changed);

    wizard.next().await.unwrap();
    wizard.next().await.unwrap();
    assert_eq!(wizard.current_page(), 2);
    assert_eq!(wizard.history(), vec![0, 1]);

    assert!(wizard.set_value("skipC", json!(true)).await.unwrap());
    assert_eq!(keys(&wizard), ["a", "b"]);
    assert_eq!(wizard.current_page(), 1);
    // The clamped page is no longer behind us
    assert_eq!(wizard.history(), vec![0]);
    assert_eq!(*changed.lock(), vec![1, 2, 1]);
    assert_eq!(hooks.redraws.lock().last().map(|r| r.page_count), Some(2));
}

#[tokio::test]
async fn hiding_an_earlier_page_keeps_the_current_page() {
    init_tracing();
    let definition = WizardDefinition::new("Shifting")
        .panel(PanelDefinition::new("a", "A"))
        .panel(
            PanelDefinition::new("b", "B")
                .with_condition(Condition::simple(true, "showB", true)),
        )
        .panel(PanelDefinition::new("c", "C").field(FieldDefinition::new("code").required()))
        .panel(PanelDefinition::new("d", "D"));
    let wizard = Wizard::builder(definition)
        .data(json!({"showB": true}))
        .build()
        .unwrap();
    let changed = record(&wizard.page_changed);

    wizard.next().await.unwrap();
    wizard.next().await.unwrap();
    assert_eq!(current_key(&wizard), "c");
    assert_eq!(wizard.history(), vec![0, 1]);

    assert!(wizard.set_value("showB", json!(false)).await.unwrap());
    assert_eq!(keys(&wizard), ["a", "c", "d"]);
    assert_eq!(current_key(&wizard), "c");
    assert_eq!(wizard.current_page(), 1);
    assert_eq!(wizard.history(), vec![0]);
    assert_eq!(*changed.lock(), vec![1, 2, 1]);

    // Still gated by the page the user is actually on
    assert!(matches!(wizard.next().await, Err(WizardError::ValidationFailed(_))));
    assert_eq!(current_key(&wizard), "c");

    // Showing the page again moves the index, not the user
    assert!(wizard.set_value("showB", json!(true)).await.unwrap());
    assert_eq!(current_key(&wizard), "c");
    assert_eq!(wizard.current_page(), 2);
    assert_eq!(wizard.previous().await.unwrap(), 0);
}

#[tokio::test]
async fn every_page_hidden_leaves_an_empty_wizard() {
    let definition = WizardDefinition::new("Vanishing")
        .panel(PanelDefinition::new("a", "A").with_condition(Condition::simple(true, "on", true)));
    let wizard = Wizard::builder(definition)
        .data(json!({"on": true}))
        .build()
        .unwrap();
    wizard.set_value("on", json!(false)).await.unwrap();

    assert_eq!(wizard.page_count(), 0);
    assert_eq!(wizard.current_page(), 0);
    assert!(wizard.rendered_pages().is_empty());
    // No pages: set_page succeeds without moving
    assert_eq!(wizard.set_page(3).await.unwrap(), 0);
}

// =========================================================================
// set_page
// =========================================================================

#[tokio::test]
async fn set_page_to_current_is_a_noop() {
    let hooks = RecordingHooks::new();
    let wizard = Wizard::builder(linear(3)).hooks(hooks.clone()).build().unwrap();
    let changed = record(&wizard.page_changed);

    assert_eq!(wizard.set_page(0).await.unwrap(), 0);
    assert_eq!(hooks.redraw_count(), 0);
    assert!(wizard.history().is_empty());
    assert!(changed.lock().is_empty());
}

#[tokio::test]
async fn set_page_rejects_out_of_range() {
    let wizard = Wizard::new(linear(3)).unwrap();
    for target in [-1, 3, 100] {
        let err = wizard.set_page(target).await.unwrap_err();
        assert!(err.is_page_not_found(), "{target}: {err}");
    }
    assert_eq!(wizard.current_page(), 0);
    assert_eq!(wizard.set_page(2).await.unwrap(), 2);
    // Direct jumps do not touch history
    assert!(wizard.history().is_empty());
}

#[tokio::test]
async fn breadcrumb_jumps_respect_clickable() {
    let wizard = Wizard::new(linear(3)).unwrap();
    assert_eq!(wizard.jump_to(2).await.unwrap(), 2);

    let locked = Wizard::builder(linear(3))
        .options(WizardOptions::new().with_clickable_breadcrumbs(false))
        .build()
        .unwrap();
    assert!(matches!(
        locked.jump_to(2).await,
        Err(WizardError::NavigationDisabled)
    ));
    assert_eq!(locked.current_page(), 0);
}

// =========================================================================
// Next / previous
// =========================================================================

#[tokio::test]
async fn next_without_branch_is_increment() {
    let wizard = Wizard::new(linear(4)).unwrap();
    for expected in 1..4 {
        assert_eq!(wizard.next_page_index(), Some(expected as i64));
        assert_eq!(wizard.next().await.unwrap(), expected);
    }
    // Last page: the default next runs off the end
    assert_eq!(wizard.next_page_index(), Some(4));
    assert!(wizard.next().await.unwrap_err().is_page_not_found());
    assert_eq!(wizard.current_page(), 3);
    assert_eq!(wizard.history(), vec![0, 1, 2]);
}

#[tokio::test]
async fn branch_by_key_and_unknown_key() {
    let definition = WizardDefinition::new("Keys")
        .panel(
            PanelDefinition::new("start", "Start")
                .with_next_page(BranchExpression::target("finish")),
        )
        .panel(PanelDefinition::new("skipped", "Skipped"))
        .panel(
            PanelDefinition::new("finish", "Finish")
                .with_next_page(BranchExpression::target("nope")),
        );
    let wizard = Wizard::new(definition).unwrap();

    assert_eq!(wizard.next().await.unwrap(), 2);
    assert_eq!(wizard.next_page_index(), Some(0));
    assert_eq!(wizard.next().await.unwrap(), 0);
    assert_eq!(wizard.history(), vec![0, 2]);
}

#[tokio::test]
async fn branch_from_json_switch() {
    let definition = WizardDefinition::from_json_str(
        r#"{
            "title": "Customer",
            "components": [
                {"type": "panel", "key": "kind", "title": "Kind",
                 "nextPage": {"when": "kind", "cases": {"company": "org", "person": "3"}},
                 "components": [{"key": "kind", "validate": {"required": true}}]},
                {"type": "panel", "key": "org", "title": "Organisation",
                 "nextPage": {"target": null}},
                {"type": "panel", "key": "unused", "title": "Unused"},
                {"type": "panel", "key": "person", "title": "Person"}
            ]
        }"#,
    )
    .unwrap();

    let wizard = Wizard::builder(definition.clone())
        .data(json!({"kind": "person"}))
        .build()
        .unwrap();
    assert_eq!(wizard.next().await.unwrap(), 3);

    let wizard = Wizard::builder(definition)
        .data(json!({"kind": "company"}))
        .build()
        .unwrap();
    assert_eq!(wizard.next().await.unwrap(), 1);
    assert!(wizard.is_action_available(WizardAction::Submit));
    assert!(!wizard.is_action_available(WizardAction::Next));
}

#[tokio::test]
async fn history_symmetry() {
    init_tracing();
    let wizard = Wizard::new(linear(4)).unwrap();
    let next_events = record(&wizard.next_page);
    let prev_events = record(&wizard.prev_page);

    wizard.set_value("note", json!("hi")).await.unwrap();
    wizard.next().await.unwrap();
    wizard.next().await.unwrap();
    assert_eq!(wizard.previous().await.unwrap(), 1);
    assert_eq!(wizard.previous().await.unwrap(), 0);
    assert!(wizard.history().is_empty());

    let next_pages: Vec<_> = next_events.lock().iter().map(|e| e.page).collect();
    let prev_pages: Vec<_> = prev_events.lock().iter().map(|e| e.page).collect();
    assert_eq!(next_pages, [1, 2]);
    assert_eq!(prev_pages, [1, 0]);
    assert_eq!(next_events.lock()[0].submission, json!({"note": "hi"}));
}

#[tokio::test]
async fn previous_follows_history_across_branches() {
    let definition = WizardDefinition::new("Jump")
        .panel(PanelDefinition::new("a", "A").with_next_page(BranchExpression::target(3)))
        .panel(PanelDefinition::new("b", "B"))
        .panel(PanelDefinition::new("c", "C"))
        .panel(PanelDefinition::new("d", "D"));
    let wizard = Wizard::new(definition).unwrap();

    assert_eq!(wizard.next().await.unwrap(), 3);
    // History, not decrement
    assert_eq!(wizard.previous().await.unwrap(), 0);
}

#[tokio::test]
async fn previous_on_first_page_fails_cleanly() {
    let wizard = Wizard::new(linear(2)).unwrap();
    let err = wizard.previous().await.unwrap_err();
    assert!(matches!(err, WizardError::PageNotFound { target: Some(-1) }));
    assert_eq!(wizard.current_page(), 0);
}

#[tokio::test]
async fn previous_without_history_decrements() {
    let wizard = Wizard::new(linear(3)).unwrap();
    wizard.set_page(2).await.unwrap();
    assert_eq!(wizard.previous().await.unwrap(), 1);
}

// =========================================================================
// Validation gating
// =========================================================================

#[tokio::test]
async fn invalid_page_blocks_next() {
    init_tracing();
    let definition = WizardDefinition::new("Gate")
        .panel(
            PanelDefinition::new("contact", "Contact")
                .field(
                    FieldDefinition::new("email")
                        .with_label("Email")
                        .required()
                        .with_pattern(r"[^@\s]+@[^@\s]+"),
                )
                .field(FieldDefinition::new("phone").required()),
        )
        .panel(PanelDefinition::new("done", "Done"));
    let hooks = RecordingHooks::new();
    let wizard = Wizard::builder(definition)
        .hooks(hooks.clone())
        .build()
        .unwrap();
    let failures = record(&wizard.validation_failed);

    let err = wizard.next().await.unwrap_err();
    let result = err.validation().expect("validation error");
    assert_eq!(result.errors().len(), 2);
    assert_eq!(wizard.current_page(), 0);
    assert!(wizard.history().is_empty());
    assert!(hooks.before_next_calls.lock().is_empty());
    assert_eq!(failures.lock().len(), 1);
    assert_eq!(wizard.current_errors().len(), 2);

    wizard.set_value("email", json!("not-an-email")).await.unwrap();
    wizard.set_value("phone", json!("555")).await.unwrap();
    let err = wizard.next().await.unwrap_err();
    assert_eq!(
        err.validation().and_then(|r| r.first_error_message()),
        Some(r"Email does not match the pattern [^@\s]+@[^@\s]+")
    );

    wizard.set_value("email", json!("ada@example.com")).await.unwrap();
    assert_eq!(wizard.next().await.unwrap(), 1);
    assert_eq!(*hooks.before_next_calls.lock(), vec![0]);
}

#[tokio::test]
async fn global_components_gate_every_page() {
    let definition = WizardDefinition::new("Globals")
        .panel(PanelDefinition::new("a", "A"))
        .panel(PanelDefinition::new("b", "B"))
        .hidden(FieldDefinition::new("consent").required());
    let wizard = Wizard::new(definition).unwrap();

    assert!(matches!(
        wizard.next().await,
        Err(WizardError::ValidationFailed(_))
    ));
    wizard.set_value("consent", json!(true)).await.unwrap();
    assert_eq!(wizard.next().await.unwrap(), 1);
}

#[tokio::test]
async fn read_only_skips_validation() {
    let definition = WizardDefinition::new("Review")
        .panel(PanelDefinition::new("a", "A").field(FieldDefinition::new("required").required()))
        .panel(
            PanelDefinition::new("b", "B")
                .field(FieldDefinition::new("zip").with_pattern("[0-9]+")),
        )
        .panel(PanelDefinition::new("c", "C"));
    let hooks = RecordingHooks::new();
    let wizard = Wizard::builder(definition)
        .options(WizardOptions::new().with_read_only(true))
        .data(json!({"zip": "letters"}))
        .hooks(hooks.clone())
        .build()
        .unwrap();

    assert_eq!(wizard.next().await.unwrap(), 1);
    assert_eq!(wizard.next().await.unwrap(), 2);
    assert!(wizard.current_errors().is_empty());
    assert!(hooks.before_next_calls.lock().is_empty());
    assert!(!wizard.is_action_available(WizardAction::Submit));
    assert!(!wizard.is_action_available(WizardAction::Cancel));
}

// =========================================================================
// Action availability scenarios
// =========================================================================

#[tokio::test]
async fn linear_wizard_offers_submit_on_last_page() {
    let wizard = Wizard::new(linear(3)).unwrap();

    for _ in 0..3 {
        let page = wizard.current_page();
        let on_last = page == 2;
        assert_eq!(wizard.is_action_available(WizardAction::Submit), on_last);
        assert_eq!(wizard.is_action_available(WizardAction::Next), !on_last);
        assert_eq!(wizard.is_action_available(WizardAction::Previous), page > 0);
        let _ = wizard.next().await;
    }

    assert_eq!(wizard.current_page(), 2);
    assert_eq!(
        wizard.available_actions(),
        vec![WizardAction::Cancel, WizardAction::Previous, WizardAction::Submit]
    );
}

#[tokio::test]
async fn terminating_branch_offers_submit_early() {
    let definition = WizardDefinition::new("Dead end")
        .panel(PanelDefinition::new("a", "A"))
        .panel(PanelDefinition::new("b", "B").with_next_page(BranchExpression::terminate()))
        .panel(PanelDefinition::new("c", "C"))
        .panel(PanelDefinition::new("d", "D"));
    let wizard = Wizard::new(definition).unwrap();
    wizard.next().await.unwrap();

    assert_eq!(wizard.current_page(), 1);
    assert_eq!(wizard.next_page_index(), None);
    assert!(!wizard.is_action_available(WizardAction::Next));
    assert!(wizard.is_action_available(WizardAction::Submit));

    let err = wizard.next().await.unwrap_err();
    assert!(matches!(err, WizardError::PageNotFound { target: None }));
    assert_eq!(wizard.history(), vec![0]);
}

#[tokio::test]
async fn full_mode_ignores_bounds() {
    let hooks = RecordingHooks::new();
    let wizard = Wizard::builder(linear(3))
        .options(WizardOptions::new().with_full(true))
        .hooks(hooks.clone())
        .build()
        .unwrap();

    assert_eq!(wizard.set_page(10).await.unwrap(), 0);
    assert_eq!(wizard.set_page(-5).await.unwrap(), 0);
    assert_eq!(wizard.rendered_pages(), vec![0, 1, 2]);
    assert!(hooks.redraws.lock().iter().all(|r| r.full));
}
