//! Error types for popmenu
//!
//! Library code returns [`MenuError`] through [`MenuResult`]; the binary wraps
//! these in `anyhow` so fatal errors end up on stderr with exit status 1.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for popmenu operations
pub type MenuResult<T> = Result<T, MenuError>;

/// Main error type for popmenu operations
#[derive(Error, Debug)]
pub enum MenuError {
    /// A line is shallower than the first line of the input
    #[error("improper indentation detected on line {line}")]
    ImproperIndentation { line: usize },

    /// A line is more than one level deeper than the line before it
    #[error("indentation on line {line} jumps from level {from} to level {to}")]
    IndentationJump { line: usize, from: usize, to: usize },

    /// A line tries to open a submenu below a separator
    #[error("a separator is no valid root for a submenu (line {line})")]
    SeparatorParent { line: usize },

    /// A repeat line has no earlier item at its depth
    #[error("repeat line {line} has no previous item at the same depth")]
    OrphanRepeat { line: usize },

    /// A repeat line carries no alternate output
    #[error("repeat line {line} has no output field")]
    MissingAltOutput { line: usize },

    /// Input contained no items
    #[error("no menu generated")]
    EmptyMenu,

    /// Display connection or protocol failure
    #[error("display error: {0}")]
    Display(String),

    /// The configured font could not be loaded
    #[error("could not load font: {0}")]
    Font(String),

    /// A colour could not be allocated
    #[error("could not allocate color: {0}")]
    Color(String),

    /// Pointer, keyboard or focus could not be grabbed
    #[error("could not grab {0}")]
    Grab(&'static str),

    /// Malformed `-p` argument
    #[error("improper position: {0}")]
    InvalidPosition(String),

    /// Malformed root-mode trigger
    #[error("improper trigger: {0}")]
    InvalidTrigger(String),

    /// Resource file could not be parsed
    #[error("invalid configuration in {file}: {message}")]
    Config { file: PathBuf, message: String },

    /// Scripted event source ran dry
    #[error("event source exhausted")]
    EventsExhausted,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
