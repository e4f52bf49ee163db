//! Scenario: tearing a menu off into its own window
//!
//! Journey: with tear-off enabled every menu starts with a dashed strip.
//! Clicking it closes the popup and hands the menu's visible rows to a
//! persistent instance, which keeps running after selections.

use crate::common::*;
use popmenu::backend::Op;
use popmenu::engine::{Button, Event, Key, TearoffRequest};
use popmenu::render::Element;
use popmenu::{parse_str, Engine, Outcome, Point, WindowId};

const APPS: &str = "Apps\n\tTerm\txterm\n\tWeb\tfirefox\nLock\tslock\n";

fn tearoff_options() -> popmenu::Options {
    options_with(|m| m.tearoff = true)
}

/// SCENARIO: tearing off the root menu carries the whole visible menu
#[test]
fn scenario_tear_off_root_menu() {
    let mut backend = backend();
    backend.push_event(release(ROOT, 0, Button::Primary));

    let outcome = run_menu(APPS, &mut backend, tearoff_options());
    let request = match outcome {
        Outcome::TornOff(request) => request,
        other => panic!("expected a tear-off, got {other:?}"),
    };
    assert_eq!(request.title, "popmenu");
    assert_eq!(request.text, APPS);
    assert_eq!(parse_str(&request.text).unwrap().to_text(), request.text);
    assert_eq!(backend.live_windows(), 0);
}

/// SCENARIO: tearing off a submenu carries only that submenu, titled by its
/// parent item
#[test]
fn scenario_tear_off_submenu() {
    let mut backend = backend();
    // Rows start below the tear-off strip.
    backend.push_event(motion(ROOT, SEPARATOR));
    backend.push_event(release(WindowId(2), 0, Button::Primary));

    let outcome = run_menu(APPS, &mut backend, tearoff_options());
    assert_eq!(
        outcome,
        Outcome::TornOff(TearoffRequest {
            title: "Apps".into(),
            text: "Term\txterm\nWeb\tfirefox\n".into(),
        })
    );

    // The popup is gone before the request is handed back.
    let ops = backend.ops();
    let ungrab = ops.iter().position(|op| *op == Op::Ungrab).unwrap();
    assert_eq!(count(&ops[..ungrab], |op| matches!(op, Op::Destroy(_))), 2);
}

/// SCENARIO: hovering the strip highlights it
#[test]
fn scenario_tearoff_strip_highlights_on_hover() {
    let mut tree = parse_str(APPS).unwrap();
    let mut backend = backend();
    let mut engine = Engine::new(&mut tree, &mut backend, tearoff_options());
    engine.open(None).unwrap();
    engine
        .handle(Event::Motion {
            window: Some(ROOT),
            pos: Point::new(20, 3),
        })
        .unwrap();

    let head = engine.stack().head().unwrap();
    assert!(head.tearoff_hover);
    assert_eq!(head.selected, None);
    let paint = popmenu::render::MenuPaint::build(head, engine.tree(), engine.metrics());
    assert!(matches!(
        paint.elements.first(),
        Some(Element::Tearoff { hover: true, .. })
    ));
}

/// SCENARIO: a torn-off instance stays up through outside clicks and never
/// grabs input
#[test]
fn scenario_persistent_instance_ignores_outside_clicks() {
    let mut backend = backend();
    backend.push_event(Event::ButtonPress {
        window: None,
        pos: Point::new(900, 700),
        button: Button::Primary,
    });
    backend.push_event(Event::ButtonRelease {
        window: None,
        pos: Point::new(900, 700),
        button: Button::Primary,
    });
    backend.push_event(key(Key::Escape));

    let mut options = options();
    options.persistent = true;
    let outcome = run_menu(APPS, &mut backend, options);

    assert_eq!(outcome, Outcome::Cancelled);
    assert!(!backend.ops().contains(&Op::Grab));
}
