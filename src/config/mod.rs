//! Resource configuration
//!
//! Appearance and geometry settings come from a flat TOML file, looked up in
//! this order:
//! 1. `--config PATH`
//! 2. `$POPMENU_CONFIG`
//! 3. `$XDG_CONFIG_HOME/popmenu/config.toml` (or `~/.config/popmenu/config.toml`)
//! 4. Built-in defaults
//!
//! Command-line flags are applied on top by the caller.

mod loader;
mod types;
mod watch;

pub use loader::{
    load_or_default, load_with_warnings, parse_with_warnings, resolve_path, ConfigWarning,
    WarningKind, CONFIG_ENV, KEYS,
};
pub use types::{Alignment, Color, Config};
pub use watch::ConfigWatcher;
