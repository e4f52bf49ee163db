//! The chain of open menus
//!
//! Menus form a simple path from the root menu (level 0) to the head. Branch
//! switches are planned against the item tree: only the menus strictly below
//! the lowest common ancestor of the old and new owners change.

use super::Menu;
use crate::backend::WindowId;
use crate::tree::{ItemId, ItemTree};

/// Minimal change turning the current chain into one headed by a new owner
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Retarget {
    /// Menus to pop, head first
    pub pops: usize,
    /// Owners of menus to open, root-to-leaf
    pub pushes: Vec<ItemId>,
}

impl Retarget {
    pub fn is_noop(&self) -> bool {
        self.pops == 0 && self.pushes.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct MenuStack {
    menus: Vec<Menu>,
}

impl MenuStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.menus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }

    pub fn head(&self) -> Option<&Menu> {
        self.menus.last()
    }

    pub fn head_mut(&mut self) -> Option<&mut Menu> {
        self.menus.last_mut()
    }

    pub fn get(&self, level: usize) -> Option<&Menu> {
        self.menus.get(level)
    }

    pub fn get_mut(&mut self, level: usize) -> Option<&mut Menu> {
        self.menus.get_mut(level)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Menu> {
        self.menus.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Menu> {
        self.menus.iter_mut()
    }

    /// Level of the menu shown in `window`
    pub fn level_of(&self, window: WindowId) -> Option<usize> {
        self.menus.iter().position(|m| m.window == window)
    }

    pub fn push(&mut self, mut menu: Menu) {
        menu.level = self.menus.len();
        tracing::debug!(level = menu.level, owner = ?menu.owner, "menu pushed");
        self.menus.push(menu);
    }

    pub fn pop(&mut self) -> Option<Menu> {
        let menu = self.menus.pop()?;
        tracing::debug!(level = menu.level, owner = ?menu.owner, "menu popped");
        Some(menu)
    }

    /// Plan the switch to a chain headed by a menu listing `target`'s children
    pub fn plan(&self, tree: &ItemTree, target: ItemId) -> Retarget {
        let Some(head) = self.head() else {
            return Retarget::default();
        };
        if head.owner == target {
            return Retarget::default();
        }

        let lca = tree.lowest_common_ancestor(head.owner, target);
        let keep = self
            .menus
            .iter()
            .position(|m| m.owner == lca)
            .map_or(1, |i| i + 1);
        Retarget {
            pops: self.menus.len() - keep,
            pushes: tree.path_below(self.menus[keep - 1].owner, target),
        }
    }
}
