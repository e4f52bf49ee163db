//! Scripted backend without a display
//!
//! Events come from a queue filled by the caller; every window operation is
//! recorded so tests can assert on what would have been shown.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::time::Duration;

use super::{Backend, TextMeasure, Trigger, WindowId, WindowSpec};
use crate::config::Config;
use crate::engine::Event;
use crate::error::{MenuError, MenuResult};
use crate::menu::{Point, Rect};
use crate::render::MenuPaint;

/// A recorded backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Create(WindowId),
    Map(WindowId),
    Unmap(WindowId),
    Destroy(WindowId),
    Draw(WindowId),
    Focus(WindowId),
    Grab,
    Ungrab,
    Warp(WindowId, Point),
    Style,
}

impl Op {
    /// Whether the operation changes window visibility
    pub fn is_mapping(&self) -> bool {
        matches!(self, Op::Map(_) | Op::Unmap(_))
    }
}

#[derive(Debug)]
pub struct HeadlessBackend {
    monitors: Vec<Rect>,
    pointer: Point,
    char_width: u32,
    /// `None` entries stand for an elapsed timeout
    events: VecDeque<Option<Event>>,
    triggers: VecDeque<Point>,
    ops: Vec<Op>,
    next_window: u32,
    windows: BTreeMap<WindowId, WindowSpec>,
    mapped: BTreeSet<WindowId>,
    paints: BTreeMap<WindowId, MenuPaint>,
}

impl HeadlessBackend {
    pub fn new(monitor: Rect) -> Self {
        Self {
            monitors: vec![monitor],
            pointer: Point::default(),
            char_width: 10,
            events: VecDeque::new(),
            triggers: VecDeque::new(),
            ops: Vec::new(),
            next_window: 1,
            windows: BTreeMap::new(),
            mapped: BTreeSet::new(),
            paints: BTreeMap::new(),
        }
    }

    pub fn with_monitors(mut self, monitors: Vec<Rect>) -> Self {
        self.monitors = monitors;
        self
    }

    pub fn with_pointer(mut self, pointer: Point) -> Self {
        self.pointer = pointer;
        self
    }

    pub fn push_event(&mut self, event: Event) {
        self.events.push_back(Some(event));
    }

    /// Queue an elapsed timeout
    pub fn push_tick(&mut self) {
        self.events.push_back(None);
    }

    pub fn push_trigger(&mut self, at: Point) {
        self.triggers.push_back(at);
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<Op> {
        std::mem::take(&mut self.ops)
    }

    pub fn mapped(&self) -> impl Iterator<Item = WindowId> + '_ {
        self.mapped.iter().copied()
    }

    /// Windows that exist (created and not destroyed)
    pub fn live_windows(&self) -> usize {
        self.windows.len()
    }

    pub fn spec(&self, window: WindowId) -> Option<&WindowSpec> {
        self.windows.get(&window)
    }

    pub fn last_paint(&self, window: WindowId) -> Option<&MenuPaint> {
        self.paints.get(&window)
    }

    fn known(&self, window: WindowId) -> MenuResult<()> {
        if self.windows.contains_key(&window) {
            Ok(())
        } else {
            Err(MenuError::Display(format!("unknown window {}", window.0)))
        }
    }
}

impl TextMeasure for HeadlessBackend {
    fn text_width(&self, text: &str) -> u32 {
        text.chars().count() as u32 * self.char_width
    }
}

impl Backend for HeadlessBackend {
    fn monitors(&mut self) -> MenuResult<Vec<Rect>> {
        Ok(self.monitors.clone())
    }

    fn pointer(&mut self) -> MenuResult<Point> {
        Ok(self.pointer)
    }

    fn create_window(&mut self, spec: &WindowSpec) -> MenuResult<WindowId> {
        let id = WindowId(self.next_window);
        self.next_window += 1;
        self.windows.insert(id, spec.clone());
        self.ops.push(Op::Create(id));
        Ok(id)
    }

    fn map(&mut self, window: WindowId) -> MenuResult<()> {
        self.known(window)?;
        self.mapped.insert(window);
        self.ops.push(Op::Map(window));
        Ok(())
    }

    fn unmap(&mut self, window: WindowId) -> MenuResult<()> {
        self.known(window)?;
        self.mapped.remove(&window);
        self.ops.push(Op::Unmap(window));
        Ok(())
    }

    fn destroy_window(&mut self, window: WindowId) -> MenuResult<()> {
        self.known(window)?;
        self.windows.remove(&window);
        self.mapped.remove(&window);
        self.paints.remove(&window);
        self.ops.push(Op::Destroy(window));
        Ok(())
    }

    fn draw(&mut self, window: WindowId, paint: &MenuPaint) -> MenuResult<()> {
        self.known(window)?;
        self.paints.insert(window, paint.clone());
        self.ops.push(Op::Draw(window));
        Ok(())
    }

    fn focus(&mut self, window: WindowId) -> MenuResult<()> {
        self.ops.push(Op::Focus(window));
        Ok(())
    }

    fn grab_input(&mut self) -> MenuResult<()> {
        self.ops.push(Op::Grab);
        Ok(())
    }

    fn ungrab_input(&mut self) -> MenuResult<()> {
        self.ops.push(Op::Ungrab);
        Ok(())
    }

    fn warp_pointer(&mut self, window: WindowId, at: Point) -> MenuResult<()> {
        self.ops.push(Op::Warp(window, at));
        Ok(())
    }

    fn next_event(&mut self, timeout: Option<Duration>) -> MenuResult<Option<Event>> {
        loop {
            match self.events.pop_front() {
                Some(Some(event)) => return Ok(Some(event)),
                Some(None) if timeout.is_some() => return Ok(None),
                Some(None) => continue,
                None => return Err(MenuError::EventsExhausted),
            }
        }
    }

    fn wait_trigger(&mut self, _trigger: &Trigger) -> MenuResult<Point> {
        self.triggers.pop_front().ok_or(MenuError::EventsExhausted)
    }

    fn apply_style(&mut self, _config: &Config) -> MenuResult<()> {
        self.ops.push(Op::Style);
        Ok(())
    }

    fn flush(&mut self) -> MenuResult<()> {
        Ok(())
    }
}
