//! Keyboard selection helpers over a menu's rows

use crate::menu::Menu;
use crate::tree::ItemTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    Next,
    Prev,
    First,
    Last,
}

/// Row selected by moving in `direction`, skipping separators and wrapping
pub fn cycle(menu: &Menu, direction: Cycle) -> Option<usize> {
    let rows = &menu.rows;
    let selectable = |i: &usize| !rows[*i].separator;
    let first = (0..rows.len()).find(selectable);
    let last = (0..rows.len()).rev().find(selectable);

    match direction {
        Cycle::First => first,
        Cycle::Last => last,
        Cycle::Next => match menu.selected {
            Some(sel) => (sel + 1..rows.len()).find(selectable).or(first),
            None => first,
        },
        Cycle::Prev => match menu.selected {
            Some(sel) => (0..sel).rev().find(selectable).or(last),
            None => last,
        },
    }
}

/// The `n`th selectable row (1-based), clamped to the last one
pub fn nth(menu: &Menu, n: usize) -> Option<usize> {
    let mut found = None;
    for (count, row) in menu.selectable().enumerate() {
        found = Some(row);
        if count + 1 >= n {
            break;
        }
    }
    found
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Search {
    /// First match from the top
    FromTop,
    /// Next match after the selection, wrapping
    Forward,
    /// Previous match before the selection, wrapping
    Backward,
}

/// Row whose label contains `text`, compared case-insensitively
pub fn find_match(tree: &ItemTree, menu: &Menu, text: &str, search: Search) -> Option<usize> {
    if text.is_empty() {
        return None;
    }
    let needle = text.to_lowercase();
    let matches = |i: &usize| {
        tree.get(menu.rows[*i].item)
            .label
            .as_deref()
            .is_some_and(|l| l.to_lowercase().contains(&needle))
    };
    let len = menu.rows.len();

    match (search, menu.selected) {
        (Search::Forward, Some(sel)) => (sel + 1..len).chain(0..=sel).find(matches),
        (Search::Backward, Some(sel)) => (0..sel).rev().chain((sel..len).rev()).find(matches),
        (Search::Backward, None) => (0..len).rev().find(matches),
        _ => (0..len).find(matches),
    }
}
