//! Input events delivered by backends

use crate::backend::WindowId;
use crate::menu::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
    WheelUp,
    WheelDown,
    Other(u8),
}

impl Button {
    /// Map a conventional pointer button number
    pub fn from_number(n: u8) -> Self {
        match n {
            1 => Button::Primary,
            2 => Button::Middle,
            3 => Button::Secondary,
            4 => Button::WheelUp,
            5 => Button::WheelDown,
            other => Button::Other(other),
        }
    }

    pub fn is_wheel(self) -> bool {
        matches!(self, Button::WheelUp | Button::WheelDown)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Tab,
    Enter,
    Escape,
    Backspace,
    Char(char),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
}

impl KeyPress {
    pub const fn new(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub const fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }
}

/// Something that happened on the display.
///
/// Pointer positions are local to `window` when it is set, and in root
/// coordinates when the pointer is outside every menu window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Motion {
        window: Option<WindowId>,
        pos: Point,
    },
    ButtonPress {
        window: Option<WindowId>,
        pos: Point,
        button: Button,
    },
    ButtonRelease {
        window: Option<WindowId>,
        pos: Point,
        button: Button,
    },
    Key(KeyPress),
    Leave {
        window: WindowId,
    },
    Expose {
        window: WindowId,
    },
    /// The window's geometry was changed from outside
    Configure {
        window: WindowId,
        geometry: Rect,
    },
    /// The window manager asked to close the window
    Close {
        window: WindowId,
    },
}

impl Event {
    /// Whether the event comes from the user rather than the display server
    pub fn is_input(&self) -> bool {
        !matches!(
            self,
            Event::Expose { .. } | Event::Configure { .. }
        )
    }
}
