//! Scenario: browsing directories as submenus
//!
//! Journey: with browsing on, an entry whose output is a directory opens a
//! generated listing. Picking a file prints its full path; the generated
//! entries disappear again when their menu closes.

use crate::common::*;
use popmenu::engine::{Button, Key};
use popmenu::{parse_str, Engine, Outcome, WindowId};
use tempfile::TempDir;

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("b.txt"), "b").unwrap();
    std::fs::write(dir.path().join("a.txt"), "a").unwrap();
    std::fs::write(dir.path().join(".hidden"), "h").unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("sub").join("c.txt"), "c").unwrap();
    dir
}

fn menu_for(dir: &TempDir) -> String {
    format!("Files\t{}\nQuit\tquit\n", dir.path().display())
}

fn browse_options() -> popmenu::Options {
    options_with(|m| m.browse = true)
}

/// SCENARIO: a directory opens as a sorted listing without hidden entries
#[test]
fn scenario_directory_listing_opens_and_closes() {
    let dir = fixture();
    let mut tree = parse_str(&menu_for(&dir)).unwrap();
    let parsed = tree.len();
    let mut backend = backend();
    let mut engine = Engine::new(&mut tree, &mut backend, browse_options());
    engine.open(None).unwrap();
    assert!(engine.stack().head().unwrap().rows[0].submenu);

    engine.handle(motion(ROOT, row(0))).unwrap();
    let listing = engine.stack().head().unwrap();
    let labels: Vec<_> = listing
        .rows
        .iter()
        .map(|r| engine.tree().get(r.item).label.clone().unwrap())
        .collect();
    assert_eq!(labels, vec!["a.txt", "b.txt", "sub"]);
    assert_eq!(engine.tree().len(), parsed + 3);

    // Nested directories browse too.
    engine.handle(motion(WindowId(2), row(2))).unwrap();
    assert_eq!(engine.stack().len(), 3);
    assert_eq!(engine.tree().len(), parsed + 4);

    engine.handle(key(Key::Left)).unwrap();
    assert_eq!(engine.stack().len(), 2);
    assert_eq!(engine.tree().len(), parsed + 3);

    engine.handle(motion(ROOT, row(1))).unwrap();
    assert_eq!(engine.stack().len(), 1);
    assert_eq!(engine.tree().len(), parsed);
}

/// SCENARIO: picking a listed file prints its full path
#[test]
fn scenario_pick_file_from_listing() {
    let dir = fixture();
    let mut backend = backend();
    backend.push_event(motion(ROOT, row(0)));
    click(&mut backend, WindowId(2), row(1));

    let outcome = run_menu(&menu_for(&dir), &mut backend, browse_options());
    let expected = dir.path().join("b.txt").to_string_lossy().into_owned();
    assert_eq!(outcome, Outcome::Selected(expected));
}

/// SCENARIO: without browsing, a directory entry is an ordinary leaf
#[test]
fn scenario_directory_is_leaf_without_browsing() {
    let dir = fixture();
    let mut backend = backend();
    backend.push_event(motion(ROOT, row(0)));
    backend.push_event(release(ROOT, row(0), Button::Primary));

    let outcome = run_menu(&menu_for(&dir), &mut backend, options());
    let expected = dir.path().to_string_lossy().into_owned();
    assert_eq!(outcome, Outcome::Selected(expected));
    assert_eq!(backend.live_windows(), 0);
}

/// SCENARIO: an empty directory does not open a menu
#[test]
fn scenario_empty_directory_stays_closed() {
    let dir = TempDir::new().unwrap();
    let mut tree = parse_str(&menu_for(&dir)).unwrap();
    let mut backend = backend();
    let mut engine = Engine::new(&mut tree, &mut backend, browse_options());
    engine.open(None).unwrap();

    engine.handle(motion(ROOT, row(0))).unwrap();
    assert_eq!(engine.stack().len(), 1);
    assert_eq!(engine.stack().head().unwrap().selected, Some(0));
}
