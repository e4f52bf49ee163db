//! Scenario: driving menus from the keyboard
//!
//! Journey: the user never touches the pointer. Tab and the arrows move the
//! selection, digits jump to a row, typing searches, Right/Enter open or
//! activate, Left/Escape back out.

use crate::common::*;
use popmenu::engine::{Button, Key};
use popmenu::render::{Element, MenuPaint};
use popmenu::{parse_str, Engine, Outcome};

/// SCENARIO: Tab cycles through selectable rows, skipping the separator
#[test]
fn scenario_tab_skips_separators_and_wraps() {
    let mut tree = parse_str("A\n\nB\n").unwrap();
    let mut backend = backend();
    let mut engine = Engine::new(&mut tree, &mut backend, options());
    engine.open(None).unwrap();

    let mut seen = Vec::new();
    for _ in 0..4 {
        engine.handle(key(Key::Tab)).unwrap();
        seen.push(engine.stack().head().unwrap().selected);
    }
    assert_eq!(seen, vec![Some(0), Some(2), Some(0), Some(2)]);

    engine.handle(shifted(Key::Tab)).unwrap();
    assert_eq!(engine.stack().head().unwrap().selected, Some(0));
    engine.handle(shifted(Key::Tab)).unwrap();
    assert_eq!(engine.stack().head().unwrap().selected, Some(2));
}

/// SCENARIO: the separator is painted as a rule between the two rows
#[test]
fn scenario_separator_is_painted_as_rule() {
    let mut tree = parse_str("A\n\nB\n").unwrap();
    let mut backend = backend();
    let mut engine = Engine::new(&mut tree, &mut backend, options());
    engine.open(None).unwrap();
    engine.handle(key(Key::Down)).unwrap();
    engine.handle(key(Key::Down)).unwrap();

    let head = engine.stack().head().unwrap();
    let paint = MenuPaint::build(head, engine.tree(), engine.metrics());
    let kinds: Vec<_> = paint
        .elements
        .iter()
        .map(|e| match e {
            Element::Separator { .. } => "rule",
            Element::Row { selected: true, .. } => "selected",
            Element::Row { .. } => "row",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, vec!["row", "rule", "selected"]);
}

/// SCENARIO: a digit selects the nth selectable row
#[test]
fn scenario_digit_jumps_to_row() {
    let mut backend = backend();
    backend.push_event(key(Key::Char('3')));
    backend.push_event(key(Key::Enter));

    let outcome = run_menu("a\n\nb\nc\nd\n", &mut backend, options());
    assert_eq!(outcome, Outcome::Selected("c".into()));
}

/// SCENARIO: digits past the end clamp to the last row
#[test]
fn scenario_digit_past_end_clamps() {
    let mut backend = backend();
    backend.push_event(key(Key::Char('9')));
    backend.push_event(key(Key::Enter));

    let outcome = run_menu("a\nb\n", &mut backend, options());
    assert_eq!(outcome, Outcome::Selected("b".into()));
}

/// SCENARIO: Escape on the root menu dismisses without output
#[test]
fn scenario_escape_at_root_cancels() {
    let mut backend = backend();
    backend.push_event(key(Key::Down));
    backend.push_event(key(Key::Escape));

    let outcome = run_menu("A\tA\nB\tB\n", &mut backend, options());
    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(backend.live_windows(), 0);
}

/// SCENARIO: Right opens a submenu with its first row selected, Left closes
/// it again and the parent keeps its selection
#[test]
fn scenario_right_and_left_walk_the_hierarchy() {
    let mut tree = parse_str("Apps\n\tTerm\n\tWeb\nQuit\n").unwrap();
    let mut backend = backend();
    let mut engine = Engine::new(&mut tree, &mut backend, options());
    engine.open(None).unwrap();

    engine.handle(key(Key::Down)).unwrap();
    engine.handle(key(Key::Right)).unwrap();
    assert_eq!(engine.stack().len(), 2);
    assert_eq!(engine.stack().head().unwrap().selected, Some(0));

    engine.handle(key(Key::Left)).unwrap();
    assert_eq!(engine.stack().len(), 1);
    assert_eq!(engine.stack().head().unwrap().selected, Some(0));

    // Escape below the root only closes one level.
    engine.handle(key(Key::Right)).unwrap();
    assert_eq!(engine.handle(key(Key::Escape)).unwrap(), None);
    assert_eq!(engine.stack().len(), 1);

    engine.handle(key(Key::Right)).unwrap();
    engine.handle(key(Key::Down)).unwrap();
    let outcome = engine.handle(key(Key::Enter)).unwrap();
    assert_eq!(outcome, Some(Outcome::Selected("Web".into())));
}

/// SCENARIO: typing searches labels; Tab moves to the next match
#[test]
fn scenario_typeahead_search() {
    let mut tree = parse_str("Alpha\nBeta\nAlphabet\nGamma\n").unwrap();
    let mut backend = backend();
    let mut engine = Engine::new(&mut tree, &mut backend, options());
    engine.open(None).unwrap();

    engine.handle(key(Key::Char('a'))).unwrap();
    engine.handle(key(Key::Char('l'))).unwrap();
    assert_eq!(engine.typeahead(), "al");
    assert_eq!(engine.stack().head().unwrap().selected, Some(0));

    engine.handle(key(Key::Tab)).unwrap();
    assert_eq!(engine.stack().head().unwrap().selected, Some(2));
    engine.handle(key(Key::Tab)).unwrap();
    assert_eq!(engine.stack().head().unwrap().selected, Some(0));
    engine.handle(shifted(Key::Tab)).unwrap();
    assert_eq!(engine.stack().head().unwrap().selected, Some(2));

    // A character that matches nothing restarts the search from it.
    engine.handle(key(Key::Char('g'))).unwrap();
    assert_eq!(engine.typeahead(), "g");
    assert_eq!(engine.stack().head().unwrap().selected, Some(3));

    engine.handle(key(Key::Backspace)).unwrap();
    assert_eq!(engine.typeahead(), "");
}

/// SCENARIO: Shift-Enter activates with the alternate output
#[test]
fn scenario_shift_enter_uses_alternate_output() {
    let mut backend = backend();
    backend.push_event(key(Key::Down));
    backend.push_event(shifted(Key::Enter));

    let outcome = run_menu("Open\txdg-open .\n\"\tfiles .\n", &mut backend, options());
    assert_eq!(outcome, Outcome::Selected("files .".into()));
}

/// SCENARIO: the wheel moves the selection and warps the pointer to it
#[test]
fn scenario_wheel_moves_selection() {
    let mut tree = parse_str("a\nb\nc\n").unwrap();
    let mut backend = backend();
    let mut engine = Engine::new(&mut tree, &mut backend, options());
    engine.open(None).unwrap();

    engine.handle(release(ROOT, row(0), Button::WheelDown)).unwrap();
    engine.handle(release(ROOT, row(0), Button::WheelDown)).unwrap();
    assert_eq!(engine.stack().head().unwrap().selected, Some(1));
    engine.handle(release(ROOT, row(0), Button::WheelUp)).unwrap();
    assert_eq!(engine.stack().head().unwrap().selected, Some(0));
    drop(engine);

    let warps = count(backend.ops(), |op| matches!(op, popmenu::backend::Op::Warp(..)));
    assert_eq!(warps, 3);
}
