use std::time::Duration;

use foldom::{Document, DomError, EventKind, Height, MemoryDocument, Node, NodeId, Notification, Rule};
use unfold::{Config, ElementState, Error, Expander, Settings};

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn setup() -> (MemoryDocument, NodeId) {
    let mut doc = MemoryDocument::new();
    let panel = doc.append_to_body(
        Node::div()
            .class("panel")
            .content_height(120)
            .height(Height::Px(0)),
    );
    (doc, panel)
}

fn deliver(doc: &mut MemoryDocument, engine: &mut Expander, notifications: Vec<Notification>) {
    for notification in notifications {
        engine.handle(doc, &notification).unwrap();
    }
}

fn settle(doc: &mut MemoryDocument, engine: &mut Expander) {
    let notifications = doc.finish_transitions();
    deliver(doc, engine, notifications);
}

fn classes(doc: &MemoryDocument, node: NodeId) -> Vec<String> {
    doc.node(node)
        .unwrap()
        .classes
        .iter()
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Collapse early exit
// ============================================================================

#[test]
fn test_collapse_when_collapsed_is_noop() {
    let (mut doc, panel) = setup();
    let mut engine = Expander::new();
    let before = doc.mutations();

    engine.collapse(&mut doc, panel, &Config::new()).unwrap();

    assert_eq!(doc.mutations(), before);
    assert_eq!(doc.listener_count(panel), 0);
    assert_eq!(engine.state(panel), Some(ElementState::Collapsed));
    assert!(classes(&doc, panel).iter().all(|c| c != "collapsing"));
}

// ============================================================================
// Expand / collapse cycle
// ============================================================================

#[test]
fn test_expand_marks_measures_and_completes() {
    let (mut doc, panel) = setup();
    let mut engine = Expander::new();

    engine.expand(&mut doc, panel, &Config::new()).unwrap();
    assert_eq!(engine.state(panel), Some(ElementState::Expanding));
    assert!(doc.has_class(panel, "expanding").unwrap());
    assert_eq!(doc.inline_height(panel).unwrap(), Some(Height::Px(120)));
    assert_eq!(doc.inline_transition(panel).unwrap(), "height 300ms");
    assert_eq!(doc.listener_count(panel), 1);
    assert!(engine.is_pending(panel));

    settle(&mut doc, &mut engine);
    assert_eq!(engine.state(panel), Some(ElementState::Expanded));
    assert!(!doc.has_class(panel, "expanding").unwrap());
    assert_eq!(doc.inline_height(panel).unwrap(), Some(Height::Auto));
    assert_eq!(doc.inline_transition(panel).unwrap(), "");
    assert_eq!(doc.client_height(panel).unwrap(), 120);
    assert_eq!(doc.listener_count(panel), 0);
    assert_eq!(engine.pending_count(), 0);
}

#[test]
fn test_round_trip_restores_inline_state() {
    let (mut doc, panel) = setup();
    let mut engine = Expander::new();
    let inline_before = doc.inline_height(panel).unwrap();
    let classes_before = classes(&doc, panel);

    engine.expand(&mut doc, panel, &Config::new()).unwrap();
    settle(&mut doc, &mut engine);

    engine.collapse(&mut doc, panel, &Config::new()).unwrap();
    assert_eq!(engine.state(panel), Some(ElementState::Collapsing));
    assert!(doc.has_class(panel, "collapsing").unwrap());
    assert_eq!(doc.inline_height(panel).unwrap(), Some(Height::Px(0)));
    assert_eq!(doc.client_height(panel).unwrap(), 120);

    settle(&mut doc, &mut engine);
    assert_eq!(engine.state(panel), Some(ElementState::Collapsed));
    assert_eq!(doc.inline_height(panel).unwrap(), inline_before);
    assert_eq!(classes(&doc, panel), classes_before);
    assert_eq!(doc.client_height(panel).unwrap(), 0);
    assert_eq!(doc.inline_transition(panel).unwrap(), "");
}

#[test]
fn test_configured_classes_follow_state() {
    let (mut doc, panel) = setup();
    let mut engine = Expander::new();
    let config = Config::new()
        .class_on_expanded("open")
        .class_on_collapsed("closed");
    doc.add_class(panel, "closed").unwrap();

    engine.expand(&mut doc, panel, &config).unwrap();
    settle(&mut doc, &mut engine);
    assert!(doc.has_class(panel, "open").unwrap());
    assert!(!doc.has_class(panel, "closed").unwrap());
    assert!(!doc.has_class(panel, "expanding").unwrap());

    engine.collapse(&mut doc, panel, &config).unwrap();
    settle(&mut doc, &mut engine);
    assert!(doc.has_class(panel, "closed").unwrap());
    assert!(!doc.has_class(panel, "open").unwrap());
    assert!(!doc.has_class(panel, "collapsing").unwrap());
}

#[test]
fn test_class_on_expanded_hands_height_to_css() {
    let (mut doc, panel) = setup();
    let mut engine = Expander::new();

    engine
        .expand(&mut doc, panel, &Config::new().class_on_expanded("show"))
        .unwrap();
    settle(&mut doc, &mut engine);

    assert!(doc.has_class(panel, "show").unwrap());
    assert_eq!(doc.inline_height(panel).unwrap(), None);
    assert_eq!(doc.client_height(panel).unwrap(), 120);

    // No inline override: new content reflows without the engine.
    doc.set_content_height(panel, 200).unwrap();
    assert_eq!(doc.client_height(panel).unwrap(), 200);
}

#[test]
fn test_class_on_expanded_collapse_with_stylesheet() {
    let mut doc = MemoryDocument::new();
    doc.add_rule(Rule::new(".panel").unwrap().height(Height::Px(0)));
    doc.add_rule(Rule::new(".panel.show").unwrap().height(Height::Auto));
    let panel = doc.append_to_body(Node::div().class("panel").content_height(80));
    let mut engine = Expander::new();
    let config = Config::new().class_on_expanded("show");

    assert_eq!(doc.client_height(panel).unwrap(), 0);
    engine.expand(&mut doc, panel, &config).unwrap();
    settle(&mut doc, &mut engine);
    assert_eq!(doc.client_height(panel).unwrap(), 80);

    engine.collapse(&mut doc, panel, &config).unwrap();
    assert!(doc.is_transitioning(panel, "height").unwrap());
    settle(&mut doc, &mut engine);
    assert!(!doc.has_class(panel, "show").unwrap());
    assert_eq!(doc.inline_height(panel).unwrap(), None);
    assert_eq!(doc.client_height(panel).unwrap(), 0);
}

// ============================================================================
// Temporary transition
// ============================================================================

#[test]
fn test_injected_transition_is_restored_exactly() {
    let (mut doc, panel) = setup();
    doc.set_transition(panel, "opacity 1s").unwrap();
    let mut engine = Expander::new();

    engine.expand(&mut doc, panel, &Config::new()).unwrap();
    assert!(doc.computed_transition(panel).unwrap().contains("height"));

    settle(&mut doc, &mut engine);
    assert_eq!(doc.inline_transition(panel).unwrap(), "opacity 1s");
}

#[test]
fn test_existing_height_transition_is_respected() {
    let mut doc = MemoryDocument::new();
    doc.add_rule(Rule::new(".panel").unwrap().transition("height 100ms linear"));
    let panel = doc.append_to_body(
        Node::div()
            .class("panel")
            .content_height(50)
            .height(Height::Px(0)),
    );
    let mut engine = Expander::new();

    engine.expand(&mut doc, panel, &Config::new()).unwrap();
    assert_eq!(doc.inline_transition(panel).unwrap(), "");

    let notifications = doc.advance(ms(100));
    assert_eq!(notifications.len(), 1);
    deliver(&mut doc, &mut engine, notifications);
    assert_eq!(engine.state(panel), Some(ElementState::Expanded));
}

#[test]
fn test_custom_default_duration() {
    let (mut doc, panel) = setup();
    let settings = Settings::from_json(r#"{"defaultTransitionMs": 50}"#).unwrap();
    let mut engine = Expander::with_settings(settings);

    engine.expand(&mut doc, panel, &Config::new()).unwrap();
    assert_eq!(doc.inline_transition(panel).unwrap(), "height 50ms");
    let notifications = doc.advance(ms(50));
    deliver(&mut doc, &mut engine, notifications);
    assert_eq!(engine.state(panel), Some(ElementState::Expanded));
}

#[test]
fn test_zero_duration_settles_immediately() {
    let (mut doc, panel) = setup();
    doc.set_transition(panel, "height 0s").unwrap();
    let mut engine = Expander::new();

    engine.expand(&mut doc, panel, &Config::new()).unwrap();
    assert_eq!(engine.state(panel), Some(ElementState::Expanded));
    assert!(!doc.has_class(panel, "expanding").unwrap());
    assert_eq!(doc.listener_count(panel), 0);
    assert_eq!(doc.client_height(panel).unwrap(), 120);
}

// ============================================================================
// Preemption
// ============================================================================

#[test]
fn test_collapse_mid_expand_supersedes_completion() {
    let (mut doc, panel) = setup();
    // Collapsed height comes from CSS once the inline override is cleared.
    doc.add_rule(Rule::new(".panel").unwrap().height(Height::Px(0)));
    let mut engine = Expander::new();
    let config = Config::new()
        .class_on_expanded("open")
        .class_on_collapsed("closed");

    engine.expand(&mut doc, panel, &config).unwrap();
    doc.advance(ms(150));
    let midway = doc.client_height(panel).unwrap();
    assert!(midway > 0 && midway < 120);

    engine.collapse(&mut doc, panel, &config).unwrap();
    assert_eq!(doc.listener_count(panel), 1);
    assert!(!doc.has_class(panel, "expanding").unwrap());
    assert!(doc.has_class(panel, "collapsing").unwrap());
    assert_eq!(doc.client_height(panel).unwrap(), midway);

    settle(&mut doc, &mut engine);
    assert_eq!(engine.state(panel), Some(ElementState::Collapsed));
    assert!(doc.has_class(panel, "closed").unwrap());
    assert!(!doc.has_class(panel, "open").unwrap());
    assert_eq!(doc.client_height(panel).unwrap(), 0);
    assert_eq!(doc.inline_transition(panel).unwrap(), "");
    assert_eq!(doc.listener_count(panel), 0);
}

#[test]
fn test_expand_mid_expand_remeasures() {
    let (mut doc, panel) = setup();
    let mut engine = Expander::new();

    engine.expand(&mut doc, panel, &Config::new()).unwrap();
    doc.advance(ms(100));
    let midway = doc.client_height(panel).unwrap();
    assert!(midway > 0 && midway < 120);

    doc.set_content_height(panel, 200).unwrap();
    engine.expand(&mut doc, panel, &Config::new()).unwrap();
    assert_eq!(engine.state(panel), Some(ElementState::Expanding));
    assert_eq!(doc.inline_height(panel).unwrap(), Some(Height::Px(200)));
    assert_eq!(doc.client_height(panel).unwrap(), midway);
    assert_eq!(doc.listener_count(panel), 1);
    assert_eq!(engine.pending_count(), 1);

    settle(&mut doc, &mut engine);
    assert_eq!(engine.state(panel), Some(ElementState::Expanded));
    assert_eq!(doc.client_height(panel).unwrap(), 200);
    assert_eq!(doc.inline_height(panel).unwrap(), Some(Height::Auto));
    assert_eq!(doc.inline_transition(panel).unwrap(), "");
    assert_eq!(doc.listener_count(panel), 0);
}

#[test]
fn test_rapid_toggling_ends_stable() {
    let (mut doc, panel) = setup();
    let mut engine = Expander::new();

    for _ in 0..5 {
        engine.toggle(&mut doc, panel, &Config::new()).unwrap();
        assert!(doc.listener_count(panel) <= 1);
        let notifications = doc.advance(ms(100));
        deliver(&mut doc, &mut engine, notifications);
    }
    settle(&mut doc, &mut engine);

    assert_eq!(engine.state(panel), Some(ElementState::Expanded));
    assert_eq!(doc.client_height(panel).unwrap(), 120);
    assert_eq!(doc.listener_count(panel), 0);
    assert_eq!(engine.pending_count(), 0);
    assert!(!doc.has_class(panel, "expanding").unwrap());
    assert!(!doc.has_class(panel, "collapsing").unwrap());
    assert_eq!(doc.inline_transition(panel).unwrap(), "");
}

#[test]
fn test_toggle_during_collapse_reopens() {
    let (mut doc, panel) = setup();
    let mut engine = Expander::new();
    engine.expand(&mut doc, panel, &Config::new()).unwrap();
    settle(&mut doc, &mut engine);

    engine.toggle(&mut doc, panel, &Config::new()).unwrap();
    doc.advance(ms(100));
    assert!(doc.client_height(panel).unwrap() > 0);

    engine.toggle(&mut doc, panel, &Config::new()).unwrap();
    assert_eq!(engine.state(panel), Some(ElementState::Expanding));
    settle(&mut doc, &mut engine);
    assert_eq!(engine.state(panel), Some(ElementState::Expanded));
    assert_eq!(doc.client_height(panel).unwrap(), 120);
}

#[test]
fn test_toggle_infers_state_from_height() {
    let mut doc = MemoryDocument::new();
    let open = doc.append_to_body(Node::div().content_height(40));
    let mut engine = Expander::new();

    assert_eq!(engine.state_of(&doc, open).unwrap(), ElementState::Expanded);
    engine.toggle(&mut doc, open, &Config::new()).unwrap();
    assert_eq!(engine.state(open), Some(ElementState::Collapsing));
}

#[test]
fn test_settled_state_follows_rendered_height() {
    let (mut doc, panel) = setup();
    let mut engine = Expander::new();
    engine.expand(&mut doc, panel, &Config::new()).unwrap();
    settle(&mut doc, &mut engine);
    assert_eq!(engine.state(panel), Some(ElementState::Expanded));

    // Closed behind the engine's back.
    doc.set_height(panel, Height::Px(0)).unwrap();
    assert_eq!(doc.client_height(panel).unwrap(), 0);
    assert_eq!(engine.state_of(&doc, panel).unwrap(), ElementState::Collapsed);

    let before = doc.mutations();
    engine.collapse(&mut doc, panel, &Config::new()).unwrap();
    assert_eq!(doc.mutations(), before);
    assert_eq!(engine.state(panel), Some(ElementState::Collapsed));

    engine.toggle(&mut doc, panel, &Config::new()).unwrap();
    assert_eq!(engine.state(panel), Some(ElementState::Expanding));
    settle(&mut doc, &mut engine);
    assert_eq!(doc.client_height(panel).unwrap(), 120);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_not_rendered_fails_fast() {
    let (mut doc, panel) = setup();
    doc.set_hidden(panel, true).unwrap();
    let mut engine = Expander::new();
    let before = doc.mutations();

    let err = engine.expand(&mut doc, panel, &Config::new()).unwrap_err();
    assert!(matches!(err, Error::NotRendered(node) if node == panel));
    assert!(matches!(
        engine.toggle(&mut doc, panel, &Config::new()),
        Err(Error::NotRendered(_))
    ));
    assert_eq!(doc.mutations(), before);

    let detached = doc.append_to_body(Node::div().content_height(10));
    doc.detach(detached).unwrap();
    assert!(matches!(
        engine.collapse(&mut doc, detached, &Config::new()),
        Err(Error::NotRendered(_))
    ));
}

#[test]
fn test_matching_reports_count() {
    let (mut doc, first) = setup();
    let second = doc.append_to_body(Node::div().class("panel").content_height(60));
    let mut engine = Expander::new();

    let count = engine
        .expand_matching(&mut doc, ".panel", &Config::new())
        .unwrap();
    assert_eq!(count, 2);
    assert_eq!(engine.state(first), Some(ElementState::Expanding));
    // The second panel is already at full height, so it settles at once.
    assert_eq!(engine.state(second), Some(ElementState::Expanded));

    let err = engine
        .collapse_matching(&mut doc, ".nothing", &Config::new())
        .unwrap_err();
    assert!(matches!(err, Error::NoMatchingElements { selector } if selector == ".nothing"));

    let err = engine
        .toggle_matching(&mut doc, "div >", &Config::new())
        .unwrap_err();
    assert!(matches!(err, Error::Dom(DomError::InvalidSelector { .. })));
}

#[test]
fn test_matching_validates_before_mutating() {
    let (mut doc, _) = setup();
    let hidden = doc.append_to_body(Node::div().class("panel").hidden(true));
    let mut engine = Expander::new();
    let before = doc.mutations();

    let err = engine
        .expand_matching(&mut doc, ".panel", &Config::new())
        .unwrap_err();
    assert!(matches!(err, Error::NotRendered(node) if node == hidden));
    assert_eq!(doc.mutations(), before);
}

// ============================================================================
// Notifications & teardown
// ============================================================================

#[test]
fn test_handle_ignores_foreign_notifications() {
    let (mut doc, panel) = setup();
    let mut engine = Expander::new();
    let listener = doc.add_listener(panel, EventKind::Click).unwrap();

    let notifications = doc.click(panel);
    assert_eq!(notifications[0].listener, listener);
    assert!(!engine.handle(&mut doc, &notifications[0]).unwrap());
}

#[test]
fn test_forget_drops_pending_work() {
    let (mut doc, panel) = setup();
    let mut engine = Expander::new();
    engine.expand(&mut doc, panel, &Config::new()).unwrap();

    engine.forget(&mut doc, panel).unwrap();
    assert_eq!(doc.listener_count(panel), 0);
    assert_eq!(doc.inline_transition(panel).unwrap(), "");
    assert_eq!(engine.state(panel), None);
    assert!(doc.finish_transitions().is_empty());
}

#[test]
fn test_custom_marker_classes() {
    let (mut doc, panel) = setup();
    let settings = Settings {
        expanding_class: "is-opening".to_string(),
        collapsing_class: "is-closing".to_string(),
        ..Settings::default()
    };
    let mut engine = Expander::with_settings(settings);

    engine.expand(&mut doc, panel, &Config::new()).unwrap();
    assert!(doc.has_class(panel, "is-opening").unwrap());
    assert!(!doc.has_class(panel, "expanding").unwrap());
    settle(&mut doc, &mut engine);
    assert!(!doc.has_class(panel, "is-opening").unwrap());

    engine.collapse(&mut doc, panel, &Config::new()).unwrap();
    assert!(doc.has_class(panel, "is-closing").unwrap());
}
