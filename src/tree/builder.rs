//! Line-oriented item tree parser
//!
//! Each input line is `<tabs><label>[\t<output>]`. The number of leading
//! tabs is the depth; runs of tabs between fields count as one separator.

use std::io::BufRead;

use super::{Item, ItemId, ItemTree};
use crate::error::{MenuError, MenuResult};

/// Label prefix attaching an icon; the next field is the real label
pub const ICON_PREFIX: &str = "IMG:";

/// Label of a line that sets the alternate output of the previous item
pub const REPEAT_SENTINEL: &str = "\"";

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    pub depth: usize,
    pub label: Option<String>,
    pub output: Option<String>,
    pub icon: Option<String>,
}

impl Line {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_suffix('\n').unwrap_or(raw);
        let raw = raw.strip_suffix('\r').unwrap_or(raw);

        let depth = raw.bytes().take_while(|b| *b == b'\t').count();
        let (mut label, mut rest) = next_field(&raw[depth..]);

        let mut icon = None;
        if let Some(file) = label.and_then(|l| l.strip_prefix(ICON_PREFIX)) {
            icon = Some(file.to_string());
            (label, rest) = next_field(rest);
        }

        let output = rest.trim_start_matches('\t');
        let label = label.map(str::to_string);
        Self {
            depth,
            icon: label.as_ref().and(icon),
            label,
            output: (!output.is_empty()).then(|| output.to_string()),
        }
    }

    fn is_repeat(&self) -> bool {
        self.label.as_deref() == Some(REPEAT_SENTINEL)
    }
}

/// Split off the first tab-delimited field, skipping leading tabs
fn next_field(s: &str) -> (Option<&str>, &str) {
    let s = s.trim_start_matches('\t');
    let end = s.find('\t').unwrap_or(s.len());
    let field = &s[..end];
    ((!field.is_empty()).then_some(field), &s[end..])
}

/// Incremental tree parser holding the ancestor cursor chain.
///
/// `chain[d]` is the most recent item at relative depth `d`; it is cut back
/// whenever a shallower line arrives.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    tree: ItemTree,
    base: Option<usize>,
    chain: Vec<ItemId>,
    line: usize,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and insert one raw input line
    pub fn push_line(&mut self, raw: &str) -> MenuResult<()> {
        self.push(Line::parse(raw))
    }

    /// Insert one already parsed line
    pub fn push(&mut self, line: Line) -> MenuResult<()> {
        self.line += 1;
        let line_no = self.line;

        let base = *self.base.get_or_insert(line.depth);
        if line.depth < base {
            return Err(MenuError::ImproperIndentation { line: line_no });
        }
        let depth = line.depth - base;

        if line.is_repeat() {
            let target = self
                .chain
                .get(depth)
                .copied()
                .ok_or(MenuError::OrphanRepeat { line: line_no })?;
            let alt = line
                .output
                .ok_or(MenuError::MissingAltOutput { line: line_no })?;
            self.tree.get_mut(target).alt_output = Some(alt);
            return Ok(());
        }

        let parent = if depth == self.chain.len() {
            match self.chain.last() {
                Some(&prev) if self.tree.get(prev).is_separator() => {
                    return Err(MenuError::SeparatorParent { line: line_no });
                }
                Some(&prev) => prev,
                None => ItemId::ROOT,
            }
        } else if depth > self.chain.len() {
            return Err(MenuError::IndentationJump {
                line: line_no,
                from: self.chain.len() - 1,
                to: depth,
            });
        } else {
            let sibling = self.chain[depth];
            self.chain.truncate(depth);
            self.tree.parent(sibling).unwrap_or(ItemId::ROOT)
        };

        let item = match line.label {
            Some(label) => {
                let item = Item::entry(label, line.output);
                match line.icon {
                    Some(icon) => item.with_icon(icon),
                    None => item,
                }
            }
            None => Item::separator(),
        };
        let id = self.tree.append_child(parent, item);
        self.chain.push(id);
        Ok(())
    }

    /// Number of lines consumed so far
    pub fn lines(&self) -> usize {
        self.line
    }

    pub fn finish(self) -> MenuResult<ItemTree> {
        if self.tree.is_empty() {
            return Err(MenuError::EmptyMenu);
        }
        Ok(self.tree)
    }
}

/// Build a tree from a line reader. Invalid UTF-8 is replaced lossily.
pub fn build_tree<R: BufRead>(mut reader: R) -> MenuResult<ItemTree> {
    let mut builder = TreeBuilder::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        builder.push_line(&String::from_utf8_lossy(&buf))?;
    }
    tracing::debug!(lines = builder.lines(), "menu input consumed");
    builder.finish()
}

/// Build a tree from an in-memory string
pub fn parse_str(input: &str) -> MenuResult<ItemTree> {
    build_tree(input.as_bytes())
}
