//! Flattening trees back to indented text, and JSON dumps

use serde::Serialize;

use super::{ItemId, ItemTree, ICON_PREFIX, REPEAT_SENTINEL};

/// Serializable view of an item and its subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemDump {
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ItemDump>,
}

impl ItemTree {
    /// Append the whole tree as indented text
    pub fn write_text(&self, out: &mut String) {
        for id in self.root_items() {
            self.write_item(id, 0, out);
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out);
        out
    }

    /// Append `items` and their subtrees with the first level at depth 0
    pub fn write_items(&self, items: &[ItemId], out: &mut String) {
        for &id in items {
            self.write_item(id, 0, out);
        }
    }

    fn write_item(&self, id: ItemId, indent: usize, out: &mut String) {
        let item = self.get(id);
        push_tabs(out, indent);
        if let Some(label) = &item.label {
            if let Some(icon) = &item.icon {
                out.push_str(ICON_PREFIX);
                out.push_str(icon);
                out.push('\t');
            }
            out.push_str(label);
            if let Some(output) = item.output.as_ref().filter(|o| *o != label) {
                out.push('\t');
                out.push_str(output);
            }
        }
        out.push('\n');

        if let Some(alt) = &item.alt_output {
            push_tabs(out, indent);
            out.push_str(REPEAT_SENTINEL);
            out.push('\t');
            out.push_str(alt);
            out.push('\n');
        }

        for child in self.children(id) {
            self.write_item(child, indent + 1, out);
        }
    }

    /// Serializable copy of the top-level items
    pub fn dump(&self) -> Vec<ItemDump> {
        self.root_items().map(|id| self.dump_item(id)).collect()
    }

    fn dump_item(&self, id: ItemId) -> ItemDump {
        let item = self.get(id);
        ItemDump {
            label: item.label.clone(),
            output: item.output.clone(),
            alt_output: item.alt_output.clone(),
            icon: item.icon.clone(),
            children: self.children(id).map(|c| self.dump_item(c)).collect(),
        }
    }
}

fn push_tabs(out: &mut String, n: usize) {
    out.extend(std::iter::repeat('\t').take(n));
}
