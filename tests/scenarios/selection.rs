//! Scenario: picking an item with the pointer
//!
//! Journey: a script pipes a menu in, the user clicks an entry (possibly
//! inside a submenu) and the script reads the entry's output.

use crate::common::*;
use popmenu::backend::Op;
use popmenu::engine::{Button, Event, Key};
use popmenu::{parse_str, Engine, Outcome, WindowId};

const FLAT: &str = "A\tA\nB\tB\n";
const NESTED: &str = "A\tA\n\tA1\tA1\n\tA2\tA2\nB\tB\n";

/// SCENARIO: clicking a top-level leaf prints its output
#[test]
fn scenario_click_top_level_item() {
    let mut backend = backend();
    backend.push_event(motion(ROOT, row(0)));
    click(&mut backend, ROOT, row(0));

    let outcome = run_menu(FLAT, &mut backend, options());
    assert_eq!(outcome, Outcome::Selected("A".into()));

    // Everything is torn down and the grab released once the engine is gone.
    assert_eq!(backend.live_windows(), 0);
    assert!(backend.ops().contains(&Op::Grab));
    assert_eq!(backend.ops().last(), Some(&Op::Ungrab));
}

/// SCENARIO: hovering a parent opens its submenu, clicking a child prints it
#[test]
fn scenario_click_item_in_submenu() {
    let mut tree = parse_str(NESTED).unwrap();
    let mut backend = backend();
    let mut engine = Engine::new(&mut tree, &mut backend, options());
    engine.open(None).unwrap();

    assert!(engine.handle(motion(ROOT, row(0))).unwrap().is_none());
    assert_eq!(engine.stack().len(), 2);
    let sub = engine.stack().head().unwrap();
    let labels: Vec<_> = sub
        .rows
        .iter()
        .map(|r| engine.tree().get(r.item).label.clone().unwrap())
        .collect();
    assert_eq!(labels, vec!["A1", "A2"]);
    assert_eq!(sub.selected, None, "a fresh submenu has no selection");
    assert_eq!(engine.stack().get(0).unwrap().selected, Some(0));

    let window = sub.window;
    engine.handle(motion(window, row(1))).unwrap();
    assert_eq!(engine.stack().head().unwrap().selected, Some(1));
    engine.handle(press(window, row(1), Button::Primary)).unwrap();
    let outcome = engine.handle(release(window, row(1), Button::Primary)).unwrap();
    assert_eq!(outcome, Some(Outcome::Selected("A2".into())));
}

/// SCENARIO: the secondary button prints the alternate output
#[test]
fn scenario_secondary_button_uses_alternate_output() {
    let input = "Edit\tvim notes\n\"\tcode notes\n";

    let mut secondary = backend();
    secondary.push_event(release(ROOT, row(0), Button::Secondary));
    let outcome = run_menu(input, &mut secondary, options());
    assert_eq!(outcome, Outcome::Selected("code notes".into()));

    let mut primary = backend();
    primary.push_event(release(ROOT, row(0), Button::Primary));
    let outcome = run_menu(input, &mut primary, options());
    assert_eq!(outcome, Outcome::Selected("vim notes".into()));
}

/// SCENARIO: with right-click disabled the secondary button does nothing
#[test]
fn scenario_right_click_disabled() {
    let mut backend = backend();
    backend.push_event(release(ROOT, row(0), Button::Secondary));
    backend.push_event(key(Key::Escape));

    let mut options = options();
    options.right_click = false;
    let outcome = run_menu(FLAT, &mut backend, options);
    assert_eq!(outcome, Outcome::Cancelled);
}

/// SCENARIO: clicking outside every menu dismisses the popup
#[test]
fn scenario_click_outside_cancels() {
    let mut backend = backend();
    backend.push_event(Event::ButtonPress {
        window: None,
        pos: popmenu::Point::new(900, 700),
        button: Button::Primary,
    });

    let outcome = run_menu(FLAT, &mut backend, options());
    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(backend.live_windows(), 0);
}

/// SCENARIO: a separator swallows clicks
#[test]
fn scenario_click_on_separator_is_ignored() {
    let mut backend = backend();
    // Rows: A at 0, separator at ITEM, B below it.
    click(&mut backend, ROOT, ITEM);
    click(&mut backend, ROOT, ITEM + SEPARATOR);

    let outcome = run_menu("A\n\nB\n", &mut backend, options());
    assert_eq!(outcome, Outcome::Selected("B".into()));
}

/// SCENARIO: the window manager closes a submenu window
#[test]
fn scenario_window_manager_closes_submenu() {
    let mut tree = parse_str(NESTED).unwrap();
    let mut backend = backend();
    let mut engine = Engine::new(&mut tree, &mut backend, options());
    engine.open(None).unwrap();
    engine.handle(motion(ROOT, row(0))).unwrap();
    assert_eq!(engine.stack().len(), 2);

    let outcome = engine.handle(Event::Close { window: WindowId(2) }).unwrap();
    assert_eq!(outcome, None);
    assert_eq!(engine.stack().len(), 1);

    let outcome = engine.handle(Event::Close { window: ROOT }).unwrap();
    assert_eq!(outcome, Some(Outcome::Cancelled));
}
