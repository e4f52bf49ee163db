//! Menu item tree
//!
//! Items live in an arena ([`ItemTree`]) and refer to each other by
//! [`ItemId`]. Handle 0 is a hidden container whose children are the
//! top-level items, so every real item has a parent.
//!
//! # Module Structure
//!
//! - `builder` - line-at-a-time parser producing the tree
//! - `text` - flattening back to indented text and JSON dumps
//! - `listing` - dynamic directory-listing items

mod builder;
mod listing;
mod text;

pub use builder::{build_tree, parse_str, Line, TreeBuilder, ICON_PREFIX, REPEAT_SENTINEL};
pub use listing::{expand_home, is_browsable, list_directory};
pub use text::ItemDump;

/// Handle of an item inside an [`ItemTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u32);

impl ItemId {
    /// The hidden container holding the top-level items
    pub const ROOT: ItemId = ItemId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single menu entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    /// Text drawn on the row; `None` marks a separator
    pub label: Option<String>,
    /// Printed when the item is activated
    pub output: Option<String>,
    /// Printed instead of `output` for the alternate activation gesture
    pub alt_output: Option<String>,
    /// Icon file name
    pub icon: Option<String>,
    depth: usize,
    parent: Option<ItemId>,
    first_child: Option<ItemId>,
    last_child: Option<ItemId>,
    prev: Option<ItemId>,
    next: Option<ItemId>,
}

impl Item {
    /// A selectable item; `output` defaults to the label
    pub fn entry(label: impl Into<String>, output: Option<String>) -> Self {
        let label = label.into();
        Self {
            output: Some(output.unwrap_or_else(|| label.clone())),
            label: Some(label),
            ..Self::default()
        }
    }

    /// A separator row
    pub fn separator() -> Self {
        Self::default()
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn is_separator(&self) -> bool {
        self.label.is_none()
    }

    /// Number of parent hops to the hidden container (top-level items are 1)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// String printed on activation; `alternate` prefers `alt_output`
    pub fn emission(&self, alternate: bool) -> Option<&str> {
        if alternate {
            if let Some(alt) = self.alt_output.as_deref() {
                return Some(alt);
            }
        }
        self.output.as_deref()
    }
}

/// Arena of menu items
#[derive(Debug, Clone)]
pub struct ItemTree {
    nodes: Vec<Item>,
}

impl Default for ItemTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemTree {
    /// Create a tree holding only the hidden container
    pub fn new() -> Self {
        Self {
            nodes: vec![Item::default()],
        }
    }

    pub fn get(&self, id: ItemId) -> &Item {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: ItemId) -> &mut Item {
        &mut self.nodes[id.index()]
    }

    /// Arena length including the hidden container
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_child(ItemId::ROOT).is_none()
    }

    /// Number of real items (parsed and dynamic)
    pub fn item_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Append `item` as the last child of `parent`
    pub fn append_child(&mut self, parent: ItemId, mut item: Item) -> ItemId {
        let id = ItemId(self.nodes.len() as u32);
        item.depth = self.get(parent).depth + 1;
        item.parent = Some(parent);
        item.prev = self.get(parent).last_child;
        item.next = None;
        item.first_child = None;
        item.last_child = None;

        match item.prev {
            Some(prev) => self.get_mut(prev).next = Some(id),
            None => self.get_mut(parent).first_child = Some(id),
        }
        self.get_mut(parent).last_child = Some(id);
        self.nodes.push(item);
        id
    }

    /// Append an item that points at `parent` without joining its child list.
    ///
    /// Detached items are generated on demand and removed again with
    /// [`ItemTree::truncate`] when the menu showing them closes.
    pub fn push_detached(&mut self, parent: ItemId, mut item: Item) -> ItemId {
        let id = ItemId(self.nodes.len() as u32);
        item.depth = self.get(parent).depth + 1;
        item.parent = Some(parent);
        item.prev = None;
        item.next = None;
        item.first_child = None;
        item.last_child = None;
        self.nodes.push(item);
        id
    }

    /// Drop every item at or after arena position `len`
    pub fn truncate(&mut self, len: usize) {
        let len = len.max(1);
        debug_assert!(self.nodes[..len.min(self.nodes.len())]
            .iter()
            .all(|n| n.first_child.map_or(true, |c| c.index() < len)));
        self.nodes.truncate(len);
    }

    pub fn parent(&self, id: ItemId) -> Option<ItemId> {
        self.get(id).parent
    }

    pub fn first_child(&self, id: ItemId) -> Option<ItemId> {
        self.get(id).first_child
    }

    pub fn next_sibling(&self, id: ItemId) -> Option<ItemId> {
        self.get(id).next
    }

    pub fn prev_sibling(&self, id: ItemId) -> Option<ItemId> {
        self.get(id).prev
    }

    pub fn has_children(&self, id: ItemId) -> bool {
        self.get(id).first_child.is_some()
    }

    pub fn depth(&self, id: ItemId) -> usize {
        self.get(id).depth
    }

    /// Iterate over the children of `id` in input order
    pub fn children(&self, id: ItemId) -> Children<'_> {
        Children {
            tree: self,
            next: self.first_child(id),
        }
    }

    /// Every real item handle in arena order
    pub fn ids(&self) -> impl Iterator<Item = ItemId> {
        (1..self.nodes.len() as u32).map(ItemId)
    }

    /// Iterate over the top-level items
    pub fn root_items(&self) -> Children<'_> {
        self.children(ItemId::ROOT)
    }

    /// Deepest indentation level among parsed items (top level is 0)
    pub fn max_indent(&self) -> Option<usize> {
        self.nodes.iter().skip(1).map(|n| n.depth - 1).max()
    }

    /// Lowest common ancestor of `a` and `b` (either may be the container).
    ///
    /// The deeper handle walks up until both are at the same depth, then
    /// both walk up in lockstep until they meet.
    pub fn lowest_common_ancestor(&self, a: ItemId, b: ItemId) -> ItemId {
        let (mut deep, mut shallow) = if self.depth(a) >= self.depth(b) {
            (a, b)
        } else {
            (b, a)
        };
        while self.depth(deep) > self.depth(shallow) {
            deep = self.parent(deep).unwrap_or(ItemId::ROOT);
        }
        while deep != shallow {
            deep = self.parent(deep).unwrap_or(ItemId::ROOT);
            shallow = self.parent(shallow).unwrap_or(ItemId::ROOT);
        }
        deep
    }

    /// Items on the way from `ancestor` (exclusive) down to `descendant`
    /// (inclusive), in root-to-leaf order.
    pub fn path_below(&self, ancestor: ItemId, descendant: ItemId) -> Vec<ItemId> {
        let mut path = Vec::new();
        let mut cursor = descendant;
        while cursor != ancestor {
            path.push(cursor);
            match self.parent(cursor) {
                Some(parent) => cursor = parent,
                None => break,
            }
        }
        path.reverse();
        path
    }
}

/// Iterator over a sibling list
pub struct Children<'a> {
    tree: &'a ItemTree,
    next: Option<ItemId>,
}

impl Iterator for Children<'_> {
    type Item = ItemId;

    fn next(&mut self) -> Option<ItemId> {
        let current = self.next?;
        self.next = self.tree.next_sibling(current);
        Some(current)
    }
}
