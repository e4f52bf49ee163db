//! Backend-neutral description of a menu's contents
//!
//! The engine turns a [`Menu`] into a [`MenuPaint`]; backends only know how
//! to draw its elements.

use crate::config::Alignment;
use crate::menu::{Menu, Metrics};
use crate::tree::ItemTree;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// Dashed line inviting a tear-off
    Tearoff { y: u32, height: u32, hover: bool },
    /// Triangle pointing up or down
    ScrollArrow { y: u32, height: u32, up: bool },
    /// Horizontal rule
    Separator { y: u32, height: u32 },
    Row {
        y: u32,
        height: u32,
        label: String,
        text_x: u32,
        icon: Option<String>,
        selected: bool,
        submenu: bool,
    },
}

/// Everything needed to draw one menu window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuPaint {
    pub width: u32,
    pub height: u32,
    pub elements: Vec<Element>,
}

impl MenuPaint {
    pub fn build(menu: &Menu, tree: &ItemTree, metrics: &Metrics) -> Self {
        let mut elements = Vec::new();
        let width = menu.geometry.width;
        let height = menu.geometry.height;

        if menu.tearoff {
            elements.push(Element::Tearoff {
                y: 0,
                height: metrics.separator_height,
                hover: menu.tearoff_hover,
            });
        }
        if menu.overflow {
            elements.push(Element::ScrollArrow {
                y: menu.header_height(metrics),
                height: metrics.item_height,
                up: true,
            });
        }

        for (index, row) in menu.rows.iter().enumerate() {
            let Some(y) = menu.row_top(index, metrics) else {
                continue;
            };
            let item = tree.get(row.item);
            match &item.label {
                None => elements.push(Element::Separator {
                    y,
                    height: row.height,
                }),
                Some(label) => elements.push(Element::Row {
                    y,
                    height: row.height,
                    label: label.clone(),
                    text_x: text_x(menu, row.text_width, metrics),
                    icon: if menu.has_icon {
                        item.icon.clone()
                    } else {
                        None
                    },
                    selected: menu.selected == Some(index),
                    submenu: row.submenu,
                }),
            }
        }

        if menu.overflow {
            elements.push(Element::ScrollArrow {
                y: height.saturating_sub(metrics.item_height),
                height: metrics.item_height,
                up: false,
            });
        }

        Self {
            width,
            height,
            elements,
        }
    }
}

/// Horizontal start of a row's label
fn text_x(menu: &Menu, text_width: u32, metrics: &Metrics) -> u32 {
    let pad = metrics.horizontal_padding;
    let icon_column = if menu.has_icon {
        metrics.icon_size() + pad
    } else {
        0
    };
    let width = menu.geometry.width;
    match metrics.alignment {
        Alignment::Left => pad + icon_column,
        Alignment::Center => (width.saturating_sub(text_width) / 2).max(pad + icon_column),
        Alignment::Right => width
            .saturating_sub(text_width + metrics.triangle_width + 2 * pad)
            .max(pad + icon_column),
    }
}

/// Horizontal start of the submenu triangle
pub fn triangle_x(width: u32, metrics: &Metrics) -> u32 {
    width.saturating_sub(metrics.horizontal_padding + metrics.triangle_width)
}
