//! Open menus: geometry, per-row layout and the stack of open levels
//!
//! # Module Structure
//!
//! - `layout` - sizing, overflow, placement and hit-testing of one menu
//! - `stack` - the chain of open menus and branch switching

mod layout;
mod stack;

pub use layout::{select_monitor, Hit, Metrics, MonitorSpec, Position};
pub use stack::{MenuStack, Retarget};

use crate::backend::WindowId;
use crate::tree::ItemId;

/// Screen or window coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }
}

/// Layout of one row in a menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    pub item: ItemId,
    /// Offset from the top of the full (unscrolled) row list
    pub y: u32,
    pub height: u32,
    pub text_width: u32,
    /// Activating the row opens a submenu
    pub submenu: bool,
    pub separator: bool,
}

/// One open level of the popup chain
#[derive(Debug, Clone)]
pub struct Menu {
    /// Item whose children are listed; the hidden container for the root
    pub owner: ItemId,
    /// Position in the stack (the root menu is level 0)
    pub level: usize,
    pub rows: Vec<Row>,
    pub selected: Option<usize>,
    /// First visible row
    pub first: usize,
    /// Last visible row
    pub last: usize,
    /// Outer top-left corner plus inner size, border excluded
    pub geometry: Rect,
    pub overflow: bool,
    pub has_icon: bool,
    pub has_submenu: bool,
    /// A tear-off row is drawn at the top
    pub tearoff: bool,
    /// Pointer rests on the tear-off row
    pub tearoff_hover: bool,
    pub window: WindowId,
    /// Arena length before this menu generated dynamic items
    pub dynamic_mark: Option<usize>,
    /// Height available to rows while overflowed
    viewport: u32,
}

impl Menu {
    pub fn selected_item(&self) -> Option<ItemId> {
        self.selected.map(|i| self.rows[i].item)
    }

    pub fn row_of(&self, item: ItemId) -> Option<usize> {
        self.rows.iter().position(|r| r.item == item)
    }

    /// Row indices that hold selectable items
    pub fn selectable(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.separator)
            .map(|(i, _)| i)
    }

    /// Items of the rows currently visible
    pub fn visible_items(&self) -> Vec<ItemId> {
        if self.rows.is_empty() {
            return Vec::new();
        }
        self.rows[self.first..=self.last]
            .iter()
            .map(|r| r.item)
            .collect()
    }
}
