//! Sizing, overflow, placement and hit-testing of a single menu

use std::fmt;
use std::str::FromStr;

use super::{Menu, Point, Rect, Row};
use crate::backend::{TextMeasure, WindowId};
use crate::config::{Alignment, Config};
use crate::error::MenuError;
use crate::tree::{is_browsable, ItemId, ItemTree};

/// Layout parameters shared by every menu of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub min_width: u32,
    pub item_height: u32,
    pub separator_height: u32,
    pub border: u32,
    pub gap: u32,
    pub horizontal_padding: u32,
    pub icon_padding: u32,
    pub triangle_width: u32,
    pub triangle_height: u32,
    /// Visible row limit; 0 means unlimited
    pub max_items: usize,
    pub alignment: Alignment,
    /// Icons are drawn
    pub icons: bool,
    /// Menus get a tear-off row
    pub tearoff: bool,
    /// Childless items naming a directory open a listing
    pub browse: bool,
}

impl Metrics {
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_width: config.min_width,
            item_height: config.item_height,
            separator_height: config.separator_height,
            border: config.border_width,
            gap: config.gap,
            horizontal_padding: config.horizontal_padding,
            icon_padding: config.icon_padding,
            triangle_width: 3,
            triangle_height: 7,
            max_items: config.max_items,
            alignment: config.alignment,
            icons: true,
            tearoff: config.tearoff,
            browse: false,
        }
    }

    /// Side of the square icon area
    pub fn icon_size(&self) -> u32 {
        self.item_height.saturating_sub(2 * self.icon_padding)
    }
}

/// Which monitor an explicit position refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorSpec {
    Index(usize),
    Cursor,
}

/// Explicit root-menu position, `XxY[:N|:CUR]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub monitor: Option<MonitorSpec>,
}

impl FromStr for Position {
    type Err = MenuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MenuError::InvalidPosition(s.to_string());
        let (coords, monitor) = match s.split_once(':') {
            Some((coords, mon)) if mon.eq_ignore_ascii_case("cur") => {
                (coords, Some(MonitorSpec::Cursor))
            }
            Some((coords, mon)) => {
                let n = parse_coord(mon).ok_or_else(invalid)?;
                (coords, Some(MonitorSpec::Index(n as usize)))
            }
            None => (s, None),
        };
        let (x, y) = coords.split_once('x').ok_or_else(invalid)?;
        Ok(Self {
            x: parse_coord(x).ok_or_else(invalid)?,
            y: parse_coord(y).ok_or_else(invalid)?,
            monitor,
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.x, self.y)?;
        match self.monitor {
            Some(MonitorSpec::Index(n)) => write!(f, ":{n}"),
            Some(MonitorSpec::Cursor) => write!(f, ":CUR"),
            None => Ok(()),
        }
    }
}

fn parse_coord(s: &str) -> Option<i32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Pick the monitor for the root menu.
///
/// An explicit, valid monitor index wins; otherwise the monitor under the
/// cursor is used, falling back to the first one.
pub fn select_monitor(monitors: &[Rect], cursor: Point, requested: Option<MonitorSpec>) -> Rect {
    if let Some(MonitorSpec::Index(n)) = requested {
        if let Some(mon) = monitors.get(n) {
            return *mon;
        }
    }
    monitors
        .iter()
        .find(|m| m.contains(cursor))
        .or_else(|| monitors.first())
        .copied()
        .unwrap_or_default()
}

/// Result of hit-testing a point inside a menu window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Row(usize),
    ScrollUp,
    ScrollDown,
    Tearoff,
    Nothing,
}

impl Menu {
    /// Measure `items` and size a menu for them; placement happens separately.
    ///
    /// `cap` is the tallest the window may be, usually the monitor height
    /// minus both borders.
    pub fn layout(
        tree: &ItemTree,
        owner: ItemId,
        items: &[ItemId],
        level: usize,
        metrics: &Metrics,
        measure: &dyn TextMeasure,
        cap: u32,
    ) -> Self {
        let has_icon = metrics.icons && items.iter().any(|&id| tree.get(id).icon.is_some());
        let mut rows = Vec::with_capacity(items.len());
        let mut width = metrics.min_width;
        let mut y = 0;

        for &id in items {
            let item = tree.get(id);
            let separator = item.is_separator();
            let text_width = item
                .label
                .as_deref()
                .map(|l| measure.text_width(l))
                .unwrap_or(0);
            let height = if separator {
                metrics.separator_height
            } else {
                metrics.item_height
            };
            let submenu =
                !separator && (tree.has_children(id) || (metrics.browse && is_browsable(tree, id)));

            let mut item_width =
                text_width + metrics.triangle_width + 3 * metrics.horizontal_padding;
            if has_icon {
                item_width += metrics.icon_size() + metrics.horizontal_padding;
            }
            width = width.max(item_width);

            rows.push(Row {
                item: id,
                y,
                height,
                text_width,
                submenu,
                separator,
            });
            y += height;
        }

        let mut menu = Self {
            owner,
            level,
            has_submenu: rows.iter().any(|r| r.submenu),
            rows,
            selected: None,
            first: 0,
            last: 0,
            geometry: Rect::new(0, 0, width, 0),
            overflow: false,
            has_icon,
            tearoff: metrics.tearoff,
            tearoff_hover: false,
            window: WindowId::default(),
            dynamic_mark: None,
            viewport: 0,
        };
        menu.fit(cap, metrics);
        menu
    }

    fn content_height(&self) -> u32 {
        self.rows.iter().map(|r| r.height).sum()
    }

    /// Height of the tear-off row, if any
    pub fn header_height(&self, metrics: &Metrics) -> u32 {
        if self.tearoff {
            metrics.separator_height
        } else {
            0
        }
    }

    /// Window-local y where the first visible row starts
    pub fn content_top(&self, metrics: &Metrics) -> u32 {
        let affordance = if self.overflow { metrics.item_height } else { 0 };
        self.header_height(metrics) + affordance
    }

    /// Decide overflow against `cap` and size the visible window
    fn fit(&mut self, cap: u32, metrics: &Metrics) {
        let header = self.header_height(metrics);
        let content = self.content_height();
        let too_many = metrics.max_items > 0 && self.rows.len() > metrics.max_items;
        self.first = 0;

        if (header + content <= cap && !too_many) || self.rows.is_empty() {
            self.overflow = false;
            self.last = self.rows.len().saturating_sub(1);
            self.viewport = content;
            self.geometry.height = header + content;
            return;
        }

        self.overflow = true;
        self.viewport = cap.saturating_sub(header + 2 * metrics.item_height);
        self.refit_window(metrics);
        self.viewport = self.rows[self.first..=self.last]
            .iter()
            .map(|r| r.height)
            .sum();
        self.geometry.height = header + 2 * metrics.item_height + self.viewport;
    }

    /// Recompute `last` so the rows from `first` fill the viewport
    fn refit_window(&mut self, metrics: &Metrics) {
        if self.rows.is_empty() {
            self.first = 0;
            self.last = 0;
            return;
        }
        let limit = if metrics.max_items > 0 {
            metrics.max_items
        } else {
            usize::MAX
        };
        let mut used = 0;
        let mut last = self.first;
        for (i, row) in self.rows.iter().enumerate().skip(self.first) {
            if i > self.first && (used + row.height > self.viewport || i - self.first >= limit) {
                break;
            }
            used += row.height;
            last = i;
        }
        self.last = last;
    }

    /// The backend reported a new geometry for this menu's window
    pub fn apply_forced_geometry(&mut self, geometry: Rect, metrics: &Metrics) {
        self.geometry.x = geometry.x;
        self.geometry.y = geometry.y;
        if geometry.height == self.geometry.height && geometry.width == self.geometry.width {
            return;
        }
        self.geometry.width = geometry.width;
        self.geometry.height = geometry.height;

        let header = self.header_height(metrics);
        let too_many = metrics.max_items > 0 && self.rows.len() > metrics.max_items;
        if header + self.content_height() <= geometry.height && !too_many {
            self.overflow = false;
            self.first = 0;
            self.last = self.rows.len().saturating_sub(1);
            self.viewport = self.content_height();
        } else {
            self.overflow = true;
            self.viewport = geometry
                .height
                .saturating_sub(header + 2 * metrics.item_height);
            self.refit_window(metrics);
            if let Some(sel) = self.selected {
                self.ensure_visible(sel, metrics);
            }
        }
    }

    /// Move the visible window one row; returns false at the list boundary
    pub fn scroll_by(&mut self, down: bool, metrics: &Metrics) -> bool {
        if !self.overflow {
            return false;
        }
        if down {
            if self.last + 1 >= self.rows.len() {
                return false;
            }
            self.first += 1;
        } else {
            if self.first == 0 {
                return false;
            }
            self.first -= 1;
        }
        self.refit_window(metrics);
        true
    }

    /// Scroll so that `row` is inside the visible window
    pub fn ensure_visible(&mut self, row: usize, metrics: &Metrics) {
        if !self.overflow || row >= self.rows.len() {
            return;
        }
        if row < self.first {
            self.first = row;
            self.refit_window(metrics);
        }
        while row > self.last && self.scroll_by(true, metrics) {}
    }

    /// Window-local y of a visible row
    pub fn row_top(&self, row: usize, metrics: &Metrics) -> Option<u32> {
        if row < self.first || row > self.last || row >= self.rows.len() {
            return None;
        }
        let base = self.rows[self.first].y;
        Some(self.content_top(metrics) + self.rows[row].y - base)
    }

    /// What lies under window-local `y`
    pub fn hit(&self, y: i32, metrics: &Metrics) -> Hit {
        if y < 0 || y >= self.geometry.height as i32 {
            return Hit::Nothing;
        }
        let mut y = y as u32;
        let header = self.header_height(metrics);
        if y < header {
            return Hit::Tearoff;
        }
        y -= header;
        if self.overflow {
            if y < metrics.item_height {
                return Hit::ScrollUp;
            }
            if y >= metrics.item_height + self.viewport {
                return Hit::ScrollDown;
            }
            y -= metrics.item_height;
        }
        if self.rows.is_empty() {
            return Hit::Nothing;
        }
        let target = self.rows[self.first].y + y;
        (self.first..=self.last)
            .find(|&i| {
                let row = &self.rows[i];
                target >= row.y && target < row.y + row.height
            })
            .map(Hit::Row)
            .unwrap_or(Hit::Nothing)
    }

    fn outer_size(&self, metrics: &Metrics) -> (i32, i32) {
        (
            (self.geometry.width + 2 * metrics.border) as i32,
            (self.geometry.height + 2 * metrics.border) as i32,
        )
    }

    /// Place the root menu at `anchor`.
    ///
    /// An explicit anchor is used verbatim. Otherwise the menu opens
    /// right/down when it fits, left/up when that fits, and is clamped to
    /// the monitor edge as a last resort.
    pub fn place_root(&mut self, anchor: Point, explicit: bool, monitor: Rect, metrics: &Metrics) {
        if explicit {
            self.geometry.x = anchor.x;
            self.geometry.y = anchor.y;
            return;
        }
        let (w, h) = self.outer_size(metrics);
        self.geometry.x = fit_axis(anchor.x, w, monitor.x, monitor.right(), anchor.x - w);
        self.geometry.y = fit_axis(anchor.y, h, monitor.y, monitor.bottom(), anchor.y - h);
    }

    /// Place a submenu next to `row` of `parent`
    pub fn place_submenu(&mut self, parent: &Menu, row: usize, monitor: Rect, metrics: &Metrics) {
        let (w, h) = self.outer_size(metrics);
        let (parent_w, _) = parent.outer_size(metrics);
        let right = parent.geometry.x + parent_w + metrics.gap as i32;
        let left = parent.geometry.x - metrics.gap as i32 - w;
        self.geometry.x = fit_axis(right, w, monitor.x, monitor.right(), left);

        let top = parent.geometry.y + parent.row_top(row, metrics).unwrap_or(0) as i32;
        self.geometry.y = fit_axis(top, h, monitor.y, monitor.bottom(), i32::MIN);
    }
}

/// Prefer `start`, then `fallback`, then clamp against the far edge
fn fit_axis(start: i32, size: i32, low: i32, high: i32, fallback: i32) -> i32 {
    if start >= low && start + size <= high {
        start
    } else if fallback >= low && fallback + size <= high {
        fallback
    } else {
        (high - size).max(low)
    }
}
