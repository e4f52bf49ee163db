//! popmenu - hierarchical popup context menus from an indented list
//!
//! Menu items are read as tab-indented lines, shown as a cascade of popup
//! windows, and the output of the chosen item is printed on stdout.
//!
//! - [`tree`] parses the input into an arena of items
//! - [`menu`] sizes, places and stacks the open menus
//! - [`engine`] turns input events into selections
//! - [`backend`] draws on X11, a terminal, or nowhere (tests)

pub mod app;
pub mod backend;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod icon;
pub mod logging;
pub mod menu;
pub mod render;
pub mod tree;

/// Name used for window titles and `WM_CLASS`
pub const PROGRAM_NAME: &str = "popmenu";

// Re-exports for convenience
pub use backend::{Backend, HeadlessBackend, WindowId};
pub use config::Config;
pub use engine::{Engine, Event, Options, Outcome};
pub use error::{MenuError, MenuResult};
pub use menu::{Metrics, Point, Rect};
pub use tree::{build_tree, parse_str, ItemId, ItemTree};
