//! Common helpers for scenario tests.
//!
//! Scenarios drive a real `Engine` against the headless backend: events
//! are queued up front, the engine runs until it reaches an outcome, and
//! the recorded window operations are inspected afterwards.

#![allow(dead_code)]

use popmenu::backend::Op;
use popmenu::engine::{Button, Event, Key, KeyPress};
use popmenu::{
    parse_str, Config, Engine, HeadlessBackend, Metrics, Options, Outcome, Point, Rect, WindowId,
};

/// Row height with the default configuration
pub const ITEM: i32 = 35;

/// Separator height with the default configuration
pub const SEPARATOR: i32 = 11;

/// The root menu is always the first window created
pub const ROOT: WindowId = WindowId(1);

pub fn backend() -> HeadlessBackend {
    HeadlessBackend::new(Rect::new(0, 0, 1280, 800)).with_pointer(Point::new(100, 100))
}

pub fn metrics() -> Metrics {
    Metrics::from_config(&Config::default())
}

pub fn options() -> Options {
    Options::new(metrics())
}

pub fn options_with(f: impl FnOnce(&mut Metrics)) -> Options {
    let mut metrics = metrics();
    f(&mut metrics);
    Options::new(metrics)
}

/// Window-local point inside the row starting at `top`
pub fn at(top: i32) -> Point {
    Point::new(20, top + 5)
}

/// Top of plain row `n` in a menu without separators, tear-off or overflow
pub fn row(n: i32) -> i32 {
    n * ITEM
}

pub fn motion(window: WindowId, y: i32) -> Event {
    Event::Motion {
        window: Some(window),
        pos: at(y),
    }
}

pub fn press(window: WindowId, y: i32, button: Button) -> Event {
    Event::ButtonPress {
        window: Some(window),
        pos: at(y),
        button,
    }
}

pub fn release(window: WindowId, y: i32, button: Button) -> Event {
    Event::ButtonRelease {
        window: Some(window),
        pos: at(y),
        button,
    }
}

/// Press and release the primary button on the row starting at `y`
pub fn click(backend: &mut HeadlessBackend, window: WindowId, y: i32) {
    backend.push_event(press(window, y, Button::Primary));
    backend.push_event(release(window, y, Button::Primary));
}

pub fn key(key: Key) -> Event {
    Event::Key(KeyPress::new(key))
}

pub fn shifted(key: Key) -> Event {
    Event::Key(KeyPress::shifted(key))
}

pub fn count(ops: &[Op], wanted: fn(&Op) -> bool) -> usize {
    ops.iter().filter(|op| wanted(op)).count()
}

/// Open `input` as a menu and run it against the queued events
pub fn run_menu(input: &str, backend: &mut HeadlessBackend, options: Options) -> Outcome {
    let mut tree = parse_str(input).expect("menu input parses");
    let mut engine = Engine::new(&mut tree, backend, options);
    engine.open(None).expect("menu opens");
    engine.run().expect("interaction ends with an outcome")
}
