//! CLI Argument Parsing
//!
//! The menu itself comes from stdin; flags only tune how it is shown.

use std::path::PathBuf;

use clap::Parser;

use crate::backend::Trigger;
use crate::menu::Position;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// X11 when `$DISPLAY` is set, the terminal otherwise
    #[default]
    Auto,
    X11,
    Terminal,
}

/// popmenu - hierarchical popup menu driven by stdin
#[derive(Parser, Debug)]
#[command(name = "popmenu")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Each stdin line is `<tabs><label>[\\t<output>]`; the chosen output is printed.")]
pub struct Cli {
    /// Window title
    pub title: Option<String>,

    /// Disable icons
    #[arg(short = 'i', long)]
    pub no_icons: bool,

    /// The secondary button does not activate items
    #[arg(short = 'r', long)]
    pub no_right_click: bool,

    /// Let the window manager manage menu windows
    #[arg(short = 'w', long)]
    pub windowed: bool,

    /// Root menu position, XxY[:MONITOR|:CUR]
    #[arg(short = 'p', long, value_name = "POSITION")]
    pub position: Option<Position>,

    /// Wait for a click on the desktop background before each popup
    #[arg(short = 'x', long, value_name = "[MOD-]BUTTON", conflicts_with = "root_mode_pass")]
    pub root_mode: Option<Trigger>,

    /// Like --root-mode, but replay the click to the root window
    #[arg(short = 'X', long, value_name = "[MOD-]BUTTON")]
    pub root_mode_pass: Option<Trigger>,

    /// Items whose output is a directory open a listing of it
    #[arg(short = 'd', long)]
    pub browse: bool,

    /// Draw tear-off rows regardless of configuration
    #[arg(short = 't', long)]
    pub tearoff: bool,

    /// Resource file
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Window class
    #[arg(long, default_value = "PopMenu")]
    pub class: String,

    /// Display backend
    #[arg(long, value_enum, default_value_t = BackendKind::Auto)]
    pub backend: BackendKind,

    /// Parse stdin, print the menu tree and exit
    #[arg(long)]
    pub check: bool,

    /// JSON output for --check
    #[arg(long, requires = "check")]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Run as a persistent tear-off window
    #[arg(long, hide = true)]
    pub tearoff_child: bool,
}

impl Cli {
    /// Root-mode trigger, with `pass` set for `-X`
    pub fn trigger(&self) -> Option<Trigger> {
        match (self.root_mode, self.root_mode_pass) {
            (Some(t), _) => Some(t),
            (None, Some(t)) => Some(Trigger { pass: true, ..t }),
            (None, None) => None,
        }
    }

    /// Managed windows; root mode always uses popups
    pub fn windowed(&self) -> bool {
        (self.windowed || self.tearoff_child) && self.trigger().is_none()
    }
}
