//! Display backends
//!
//! The engine talks to the display only through [`Backend`]. Three
//! implementations exist:
//!
//! - `x11` - X11 via `x11rb` (feature `x11`)
//! - `term` - boxes composited onto a terminal with `crossterm`
//! - `headless` - scripted events and recorded operations, for tests

pub mod headless;
pub mod term;
#[cfg(feature = "x11")]
pub mod x11;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::config::Config;
use crate::engine::Event;
use crate::error::{MenuError, MenuResult};
use crate::menu::{Metrics, Point, Rect};
use crate::render::MenuPaint;

pub use headless::{HeadlessBackend, Op};
pub use term::TermBackend;
#[cfg(feature = "x11")]
pub use x11::X11Backend;

/// Opaque handle of a backend window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct WindowId(pub u32);

/// Measures label widths in backend units
pub trait TextMeasure {
    fn text_width(&self, text: &str) -> u32;
}

/// How a menu window should be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSpec {
    pub geometry: Rect,
    pub title: String,
    pub class: String,
    /// Let the window manager manage the window
    pub managed: bool,
    /// Long-lived tear-off window rather than a popup
    pub persistent: bool,
}

/// Root-mode trigger, `[MOD-]BUTTON`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    /// Pointer button number, 1-5
    pub button: u8,
    /// Modifier index, 1-5 (`Mod1`..`Mod5`)
    pub modifier: Option<u8>,
    /// Replay the click to the clicked window
    pub pass: bool,
}

impl FromStr for Trigger {
    type Err = MenuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MenuError::InvalidTrigger(s.to_string());
        let (modifier, button) = match s.rsplit_once('-') {
            Some((m, b)) => (Some(parse_modifier(m).ok_or_else(invalid)?), b),
            None => (None, s),
        };
        let button = match button.as_bytes() {
            [b @ b'1'..=b'5'] => b - b'0',
            _ => return Err(invalid()),
        };
        Ok(Self {
            button,
            modifier,
            pass: false,
        })
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(m) = self.modifier {
            write!(f, "{m}-")?;
        }
        write!(f, "{}", self.button)
    }
}

fn parse_modifier(s: &str) -> Option<u8> {
    if s.eq_ignore_ascii_case("alt") {
        return Some(1);
    }
    if s.eq_ignore_ascii_case("super") {
        return Some(4);
    }
    match s.as_bytes() {
        [b @ b'1'..=b'5'] => Some(b - b'0'),
        _ => None,
    }
}

/// Display services used by the menu engine
pub trait Backend: TextMeasure {
    /// Adjust layout metrics to the backend's units
    fn scale_metrics(&self, metrics: Metrics) -> Metrics {
        metrics
    }

    fn monitors(&mut self) -> MenuResult<Vec<Rect>>;

    /// Pointer position in root coordinates
    fn pointer(&mut self) -> MenuResult<Point>;

    fn create_window(&mut self, spec: &WindowSpec) -> MenuResult<WindowId>;

    fn map(&mut self, window: WindowId) -> MenuResult<()>;

    fn unmap(&mut self, window: WindowId) -> MenuResult<()>;

    /// Destroy a window and release its drawing resources
    fn destroy_window(&mut self, window: WindowId) -> MenuResult<()>;

    fn draw(&mut self, window: WindowId, paint: &MenuPaint) -> MenuResult<()>;

    fn focus(&mut self, window: WindowId) -> MenuResult<()>;

    /// Grab pointer and keyboard for the popup
    fn grab_input(&mut self) -> MenuResult<()>;

    fn ungrab_input(&mut self) -> MenuResult<()>;

    /// Move the pointer to window-local `at`
    fn warp_pointer(&mut self, window: WindowId, at: Point) -> MenuResult<()>;

    /// Wait for the next event; `Ok(None)` when `timeout` elapses first
    fn next_event(&mut self, timeout: Option<Duration>) -> MenuResult<Option<Event>>;

    /// Block until the root-mode trigger fires; returns the click position
    fn wait_trigger(&mut self, trigger: &Trigger) -> MenuResult<Point>;

    /// Apply colours and font from a (re)loaded configuration
    fn apply_style(&mut self, config: &Config) -> MenuResult<()>;

    fn flush(&mut self) -> MenuResult<()>;
}
