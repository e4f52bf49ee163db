//! Configuration types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Horizontal placement of labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl FromStr for Alignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Alignment::Left),
            "center" => Ok(Alignment::Center),
            "right" => Ok(Alignment::Right),
            _ => Err(format!("expected left, center or right, got {s:?}")),
        }
    }
}

/// 24-bit RGB colour written as `#rgb` or `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `0xRRGGBB`
    pub fn to_u32(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid colour {s:?}");
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize, width: usize| -> Result<u8, String> {
            let v = u8::from_str_radix(&hex[i * width..(i + 1) * width], 16).map_err(|_| invalid())?;
            Ok(if width == 1 { v * 17 } else { v })
        };
        match hex.len() {
            3 => Ok(Self::rgb(channel(0, 1)?, channel(1, 1)?, channel(2, 1)?)),
            6 => Ok(Self::rgb(channel(0, 2)?, channel(1, 2)?, channel(2, 2)?)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Resource settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// X core font name
    pub font: String,
    pub background: Color,
    pub foreground: Color,
    pub selected_background: Color,
    pub selected_foreground: Color,
    pub separator_color: Color,
    pub border_color: Color,
    pub min_width: u32,
    pub item_height: u32,
    pub border_width: u32,
    pub separator_height: u32,
    pub gap: u32,
    pub horizontal_padding: u32,
    pub icon_padding: u32,
    pub alignment: Alignment,
    /// 0 means unlimited
    pub max_items: usize,
    pub tearoff: bool,
    pub scroll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            font: "fixed".to_string(),
            background: Color::rgb(0xFF, 0xFF, 0xFF),
            foreground: Color::rgb(0x2E, 0x34, 0x36),
            selected_background: Color::rgb(0xE6, 0xE6, 0xE6),
            selected_foreground: Color::rgb(0x00, 0x00, 0x00),
            separator_color: Color::rgb(0xCD, 0xC7, 0xC2),
            border_color: Color::rgb(0xE6, 0xE6, 0xE6),
            min_width: 190,
            item_height: 35,
            border_width: 1,
            separator_height: 11,
            gap: 10,
            horizontal_padding: 8,
            icon_padding: 4,
            alignment: Alignment::Left,
            max_items: 0,
            tearoff: false,
            scroll_interval_ms: 80,
        }
    }
}
