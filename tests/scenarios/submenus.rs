//! Scenario: moving through a cascade of submenus
//!
//! Journey: the user sweeps the pointer across nested menus. Only the menus
//! that actually change may be unmapped or created; everything above the
//! point where the old and new paths split stays on screen untouched.

use crate::common::*;
use popmenu::backend::Op;
use popmenu::engine::Event;
use popmenu::{parse_str, Engine, WindowId};

const NESTED: &str = "A\tA\n\tA1\tA1\n\tA2\tA2\nB\tB\n";
const DEEP: &str = "A\n\tA1\n\t\tA1x\n\tA2\n\t\tA2x\nB\n\tB1\n";

fn windows(engine: &Engine<'_, popmenu::HeadlessBackend>) -> Vec<WindowId> {
    engine.stack().iter().map(|m| m.window).collect()
}

/// SCENARIO: wandering inside an already open chain changes nothing on screen
#[test]
fn scenario_hover_within_open_chain_is_noop() {
    let mut tree = parse_str(NESTED).unwrap();
    let mut backend = backend();
    let mut engine = Engine::new(&mut tree, &mut backend, options());
    engine.open(None).unwrap();

    engine.handle(motion(ROOT, row(0))).unwrap();
    let sub = WindowId(2);
    assert_eq!(windows(&engine), vec![ROOT, sub]);

    engine.handle(motion(sub, row(0))).unwrap();
    engine.handle(motion(sub, row(1))).unwrap();
    engine.handle(motion(ROOT, row(0))).unwrap();
    engine.handle(motion(sub, row(1))).unwrap();
    assert_eq!(windows(&engine), vec![ROOT, sub]);
    drop(engine);

    let ops = backend.ops();
    assert_eq!(count(ops, |op| matches!(op, Op::Create(_))), 2);
    assert_eq!(count(ops, |op| matches!(op, Op::Map(_))), 2);
    // The only unmaps are the final teardown.
    assert_eq!(count(ops, |op| matches!(op, Op::Unmap(_))), 2);
}

/// SCENARIO: switching to a sibling branch replaces only the menus below
/// the common ancestor
#[test]
fn scenario_branch_switch_replaces_only_diverging_menus() {
    let mut tree = parse_str(DEEP).unwrap();
    let mut backend = backend();
    let mut engine = Engine::new(&mut tree, &mut backend, options());
    engine.open(None).unwrap();

    engine.handle(motion(ROOT, row(0))).unwrap();
    engine.handle(motion(WindowId(2), row(0))).unwrap();
    assert_eq!(windows(&engine), vec![ROOT, WindowId(2), WindowId(3)]);

    // A1 -> A2: the menu of A stays, A1's menu is swapped for A2's.
    engine.handle(motion(WindowId(2), row(1))).unwrap();
    assert_eq!(windows(&engine), vec![ROOT, WindowId(2), WindowId(4)]);

    // A2 -> B: both of A's menus go, B's opens next to the root.
    engine.handle(motion(ROOT, row(1))).unwrap();
    assert_eq!(windows(&engine), vec![ROOT, WindowId(5)]);
    let head = engine.stack().head().unwrap();
    assert_eq!(engine.tree().get(head.owner).label.as_deref(), Some("B"));
    drop(engine);

    let ops = backend.ops();
    let first_root_unmap = ops.iter().position(|op| *op == Op::Unmap(ROOT)).unwrap();
    let last_create = ops.iter().rposition(|op| matches!(op, Op::Create(_))).unwrap();
    assert!(
        first_root_unmap > last_create,
        "root menu must stay mapped while branches change"
    );
}

/// SCENARIO: clicking an open parent closes its submenu, clicking again
/// reopens it with the first row selected
#[test]
fn scenario_click_toggles_submenu() {
    let mut tree = parse_str(NESTED).unwrap();
    let mut backend = backend();
    let mut engine = Engine::new(&mut tree, &mut backend, options());
    engine.open(None).unwrap();

    engine.handle(motion(ROOT, row(0))).unwrap();
    assert_eq!(engine.stack().len(), 2);

    engine.handle(release(ROOT, row(0), popmenu::engine::Button::Primary)).unwrap();
    assert_eq!(engine.stack().len(), 1);

    engine.handle(release(ROOT, row(0), popmenu::engine::Button::Primary)).unwrap();
    assert_eq!(engine.stack().len(), 2);
    assert_eq!(engine.stack().head().unwrap().selected, Some(0));
}

/// SCENARIO: hovering a separator closes any open submenu
#[test]
fn scenario_hover_separator_closes_submenu() {
    let mut tree = parse_str("A\n\tA1\n\nB\n").unwrap();
    let mut backend = backend();
    let mut engine = Engine::new(&mut tree, &mut backend, options());
    engine.open(None).unwrap();

    engine.handle(motion(ROOT, row(0))).unwrap();
    assert_eq!(engine.stack().len(), 2);

    engine.handle(motion(ROOT, ITEM)).unwrap();
    assert_eq!(engine.stack().len(), 1);
    assert_eq!(engine.stack().head().unwrap().selected, None);
}

/// SCENARIO: leaving the menus clears the head selection but keeps them open
#[test]
fn scenario_leave_clears_head_selection() {
    let mut tree = parse_str(NESTED).unwrap();
    let mut backend = backend();
    let mut engine = Engine::new(&mut tree, &mut backend, options());
    engine.open(None).unwrap();

    engine.handle(motion(ROOT, row(0))).unwrap();
    engine.handle(motion(WindowId(2), row(1))).unwrap();
    assert_eq!(engine.stack().head().unwrap().selected, Some(1));

    engine.handle(Event::Leave { window: WindowId(2) }).unwrap();
    assert_eq!(engine.stack().len(), 2);
    assert_eq!(engine.stack().head().unwrap().selected, None);
    assert_eq!(engine.stack().get(0).unwrap().selected, Some(0));
}

/// SCENARIO: collapsing returns to the bare root menu
#[test]
fn scenario_collapse_to_root() {
    let mut tree = parse_str(DEEP).unwrap();
    let mut backend = backend();
    let mut engine = Engine::new(&mut tree, &mut backend, options());
    engine.open(None).unwrap();

    engine.handle(motion(ROOT, row(0))).unwrap();
    engine.handle(motion(WindowId(2), row(0))).unwrap();
    assert_eq!(engine.stack().len(), 3);

    engine.collapse().unwrap();
    assert_eq!(windows(&engine), vec![ROOT]);
    assert_eq!(engine.stack().head().unwrap().selected, None);
}

/// SCENARIO: a submenu is placed beside its parent, level by level
#[test]
fn scenario_submenu_levels_match_depth() {
    let mut tree = parse_str(DEEP).unwrap();
    let mut backend = backend();
    let mut engine = Engine::new(&mut tree, &mut backend, options());
    engine.open(None).unwrap();

    engine.handle(motion(ROOT, row(0))).unwrap();
    engine.handle(motion(WindowId(2), row(1))).unwrap();

    let stack = engine.stack();
    for (level, menu) in stack.iter().enumerate() {
        assert_eq!(menu.level, level);
        assert_eq!(engine.tree().depth(menu.owner), level);
    }
    let root = stack.get(0).unwrap().geometry;
    let child = stack.get(1).unwrap().geometry;
    assert!(child.x >= root.right(), "submenu opens to the right");
}
