//! Resource file loading
//!
//! The file is flat TOML. Keys are applied one at a time so a bad value only
//! costs that key: it is reported as a warning and the default stays.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use toml::Value;

use crate::error::{MenuError, MenuResult};

use super::types::{Alignment, Color, Config};

/// Environment variable naming the resource file
pub const CONFIG_ENV: &str = "POPMENU_CONFIG";

/// Every key the resource file understands
pub const KEYS: &[&str] = &[
    "font",
    "background",
    "foreground",
    "selected_background",
    "selected_foreground",
    "separator_color",
    "border_color",
    "min_width",
    "item_height",
    "border_width",
    "separator_height",
    "gap",
    "horizontal_padding",
    "icon_padding",
    "alignment",
    "max_items",
    "tearoff",
    "scroll_interval_ms",
];

/// Older key names and their replacements
const DEPRECATED_ALIASES: &[(&str, &str)] = &[
    ("selbackground", "selected_background"),
    ("selforeground", "selected_foreground"),
    ("separator", "separator_color"),
    ("border", "border_color"),
    ("width", "min_width"),
    ("height", "item_height"),
    ("borderWidth", "border_width"),
    ("separatorWidth", "separator_height"),
    ("gapWidth", "gap"),
    ("maxItems", "max_items"),
    ("tearOff", "tearoff"),
];

/// Non-fatal problem found while loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub kind: WarningKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
    UnknownKey { suggestion: Option<String> },
    InvalidValue { message: String },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
        }
        match &self.kind {
            WarningKind::UnknownKey { suggestion } => {
                write!(f, ": unknown key `{}`", self.key)?;
                if let Some(s) = suggestion {
                    write!(f, " (did you mean `{s}`?)")?;
                }
                Ok(())
            }
            WarningKind::InvalidValue { message } => {
                write!(f, ": ignoring `{}`: {message}", self.key)
            }
        }
    }
}

impl Config {
    /// Load a resource file, failing on unreadable or malformed files
    pub fn load(path: &Path) -> MenuResult<Self> {
        load_with_warnings(path).map(|(config, _)| config)
    }
}

/// Load configuration and collect non-fatal warnings
pub fn load_with_warnings(path: &Path) -> MenuResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;
    parse_with_warnings(&content, path)
}

/// Parse resource text; `path` is only used in messages
pub fn parse_with_warnings(
    content: &str,
    path: &Path,
) -> MenuResult<(Config, Vec<ConfigWarning>)> {
    let table: toml::Table = content.parse().map_err(|e: toml::de::Error| MenuError::Config {
        file: path.to_path_buf(),
        message: e.message().to_string(),
    })?;

    let mut config = Config::default();
    let mut warnings = Vec::new();
    for (key, value) in &table {
        let warning = |kind| ConfigWarning {
            key: key.clone(),
            file: path.to_path_buf(),
            line: find_line_number(content, key),
            kind,
        };
        let Some(canonical) = canonical_key(key) else {
            warnings.push(warning(WarningKind::UnknownKey {
                suggestion: suggest_key(key),
            }));
            continue;
        };
        if let Err(message) = apply(&mut config, canonical, value) {
            warnings.push(warning(WarningKind::InvalidValue { message }));
        }
    }
    Ok((config, warnings))
}

/// Resolve the resource file path: explicit, then `$POPMENU_CONFIG`, then
/// the user config directory.
pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        .or_else(|| dirs_config_dir().map(|dir| dir.join("popmenu/config.toml")))
}

/// Load from the resolved path, falling back to defaults.
///
/// Problems are logged rather than returned; a missing file is only worth
/// a warning when it was named explicitly.
pub fn load_or_default(explicit: Option<&Path>) -> Config {
    let Some(path) = resolve_path(explicit) else {
        return Config::default();
    };
    if !path.exists() {
        if explicit.is_some() {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
        }
        return Config::default();
    }
    match load_with_warnings(&path) {
        Ok((config, warnings)) => {
            for warning in warnings {
                tracing::warn!("{warning}");
            }
            tracing::debug!(path = %path.display(), "config loaded");
            config
        }
        Err(err) => {
            tracing::warn!(error = %err, "using default configuration");
            Config::default()
        }
    }
}

fn canonical_key(key: &str) -> Option<&'static str> {
    if let Some(k) = KEYS.iter().find(|k| **k == key) {
        return Some(*k);
    }
    DEPRECATED_ALIASES
        .iter()
        .find(|(old, _)| *old == key)
        .map(|(_, new)| *new)
}

fn apply(config: &mut Config, key: &str, value: &Value) -> Result<(), String> {
    match key {
        "font" => config.font = string(value)?,
        "background" => config.background = color(value)?,
        "foreground" => config.foreground = color(value)?,
        "selected_background" => config.selected_background = color(value)?,
        "selected_foreground" => config.selected_foreground = color(value)?,
        "separator_color" => config.separator_color = color(value)?,
        "border_color" => config.border_color = color(value)?,
        "min_width" => config.min_width = integer(value, 1)?,
        "item_height" => config.item_height = integer(value, 1)?,
        "border_width" => config.border_width = integer(value, 0)?,
        "separator_height" => config.separator_height = integer(value, 1)?,
        "gap" => config.gap = integer(value, 0)?,
        "horizontal_padding" => config.horizontal_padding = integer(value, 0)?,
        "icon_padding" => config.icon_padding = integer(value, 0)?,
        "alignment" => config.alignment = string(value)?.parse::<Alignment>()?,
        "max_items" => config.max_items = integer(value, 0)?,
        "tearoff" => {
            config.tearoff = value
                .as_bool()
                .ok_or_else(|| format!("expected a boolean, got {}", value.type_str()))?
        }
        "scroll_interval_ms" => config.scroll_interval_ms = integer(value, 1)?,
        _ => return Err(format!("unhandled key {key}")),
    }
    Ok(())
}

fn string(value: &Value) -> Result<String, String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| format!("expected a string, got {}", value.type_str()))
}

fn color(value: &Value) -> Result<Color, String> {
    string(value)?.parse()
}

fn integer<T: TryFrom<i64>>(value: &Value, min: i64) -> Result<T, String> {
    let n = value
        .as_integer()
        .ok_or_else(|| format!("expected an integer, got {}", value.type_str()))?;
    if n < min {
        return Err(format!("must be at least {min}, got {n}"));
    }
    T::try_from(n).map_err(|_| format!("{n} is out of range"))
}

/// Get XDG config directory
fn dirs_config_dir() -> Option<PathBuf> {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.trim_start().starts_with(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for candidate in KEYS {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = usize::from(ac != bc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
