//! Hover-driven scrolling of overflowed menus

use crate::menu::{Menu, Metrics};

/// Pointer is resting on a scroll arrow of the menu at `level`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    pub level: usize,
    pub down: bool,
}

impl ScrollState {
    pub fn new(level: usize, down: bool) -> Self {
        Self { level, down }
    }

    /// Advance one row; `false` once the list boundary is reached
    pub fn tick(&self, menu: &mut Menu, metrics: &Metrics) -> bool {
        let moved = menu.scroll_by(self.down, metrics);
        if moved {
            tracing::trace!(level = self.level, first = menu.first, "scrolled");
        }
        moved
    }
}
