//! Navigation state machine
//!
//! [`Engine`] owns the stack of open menus and turns backend events into
//! selection changes, submenu switches and, eventually, an [`Outcome`].
//! Every transition happens synchronously inside [`Engine::handle`]; the only
//! timed behaviour is hover scrolling, driven by bounded waits in
//! [`Engine::run`].
//!
//! # Module Structure
//!
//! - `event` - input events delivered by backends
//! - `nav` - keyboard selection helpers
//! - `scroll` - hover scrolling
//! - `tearoff` - detaching a menu into a new process

mod event;
mod nav;
mod scroll;
mod tearoff;

pub use event::{Button, Event, Key, KeyPress};
pub use nav::{cycle, find_match, nth, Cycle, Search};
pub use scroll::ScrollState;
pub use tearoff::{Spawner, TearoffRequest};

use std::time::Duration;

use crate::backend::{Backend, WindowId, WindowSpec};
use crate::error::MenuResult;
use crate::menu::{select_monitor, Hit, Menu, MenuStack, Metrics, Point, Position, Rect};
use crate::render::MenuPaint;
use crate::tree::{is_browsable, list_directory, ItemId, ItemTree};

/// How an interaction ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A leaf was activated; its output line
    Selected(String),
    /// Dismissed without a selection
    Cancelled,
    /// The user tore a menu off
    TornOff(TearoffRequest),
}

/// Behaviour switches for one engine
#[derive(Debug, Clone)]
pub struct Options {
    pub metrics: Metrics,
    /// Explicit root-menu position
    pub position: Option<Position>,
    /// The secondary button activates items
    pub right_click: bool,
    /// Window-manager managed windows
    pub windowed: bool,
    /// Tear-off instance: selections collapse back to the root menu
    pub persistent: bool,
    pub scroll_interval: Duration,
    pub title: String,
    pub class: String,
}

impl Options {
    pub fn new(metrics: Metrics) -> Self {
        Self {
            metrics,
            position: None,
            right_click: true,
            windowed: false,
            persistent: false,
            scroll_interval: Duration::from_millis(80),
            title: crate::PROGRAM_NAME.to_string(),
            class: "PopMenu".to_string(),
        }
    }
}

pub struct Engine<'a, B: Backend> {
    tree: &'a mut ItemTree,
    backend: &'a mut B,
    options: Options,
    stack: MenuStack,
    monitor: Rect,
    typeahead: String,
    /// Last row entered by the pointer, as (level, row)
    hover: Option<(usize, usize)>,
    /// A button went down since the popup opened
    pressed: bool,
    grabbed: bool,
    scroll: Option<ScrollState>,
}

impl<'a, B: Backend> Engine<'a, B> {
    pub fn new(tree: &'a mut ItemTree, backend: &'a mut B, mut options: Options) -> Self {
        options.metrics = backend.scale_metrics(options.metrics);
        Self {
            tree,
            backend,
            options,
            stack: MenuStack::new(),
            monitor: Rect::default(),
            typeahead: String::new(),
            hover: None,
            pressed: false,
            grabbed: false,
            scroll: None,
        }
    }

    pub fn stack(&self) -> &MenuStack {
        &self.stack
    }

    pub fn tree(&self) -> &ItemTree {
        self.tree
    }

    pub fn metrics(&self) -> &Metrics {
        &self.options.metrics
    }

    pub fn scroll_state(&self) -> Option<ScrollState> {
        self.scroll
    }

    pub fn typeahead(&self) -> &str {
        &self.typeahead
    }

    /// Open the root menu at `anchor` (the pointer when `None`)
    pub fn open(&mut self, anchor: Option<Point>) -> MenuResult<()> {
        self.close_all()?;
        self.pressed = false;
        self.typeahead.clear();

        let cursor = self.backend.pointer()?;
        let monitors = self.backend.monitors()?;
        let requested = self.options.position.and_then(|p| p.monitor);
        self.monitor = select_monitor(&monitors, cursor, requested);

        let (anchor, explicit) = match self.options.position {
            Some(p) if p.monitor.is_some() => {
                (Point::new(self.monitor.x + p.x, self.monitor.y + p.y), true)
            }
            Some(p) => (Point::new(p.x, p.y), true),
            None => (anchor.unwrap_or(cursor), false),
        };

        let items: Vec<_> = self.tree.root_items().collect();
        let mut menu = self.layout(ItemId::ROOT, &items, 0);
        menu.place_root(anchor, explicit, self.monitor, &self.options.metrics);
        let window = self.show(menu, None)?;

        if !self.options.windowed && !self.options.persistent {
            self.backend.grab_input()?;
            self.grabbed = true;
        }
        self.backend.focus(window)?;
        tracing::info!(items = items.len(), "menu opened");
        self.backend.flush()
    }

    /// Wait for events until the interaction ends
    pub fn run(&mut self) -> MenuResult<Outcome> {
        loop {
            let timeout = self.scroll.map(|_| self.options.scroll_interval);
            match self.backend.next_event(timeout)? {
                Some(event) => {
                    if let Some(outcome) = self.handle(event)? {
                        return Ok(outcome);
                    }
                }
                None => self.scroll_tick()?,
            }
            self.backend.flush()?;
        }
    }

    /// Dispatch one event
    pub fn handle(&mut self, event: Event) -> MenuResult<Option<Outcome>> {
        tracing::trace!(?event, "event");
        let keep_scroll = matches!(event, Event::Motion { .. }) || !event.is_input();
        if !keep_scroll {
            self.scroll = None;
        }

        match event {
            Event::Motion { window, pos } => self.on_motion(window, pos),
            Event::ButtonPress { window, .. } => {
                self.pressed = true;
                let inside = window.and_then(|w| self.stack.level_of(w)).is_some();
                if !inside && !self.options.persistent {
                    return Ok(Some(Outcome::Cancelled));
                }
                Ok(None)
            }
            Event::ButtonRelease {
                window,
                pos,
                button,
            } => self.on_release(window, pos, button),
            Event::Key(key) => self.on_key(key),
            Event::Leave { window } => {
                if self.stack.level_of(window).is_some() {
                    self.hover = None;
                    self.scroll = None;
                    for menu in self.stack.iter_mut() {
                        menu.tearoff_hover = false;
                    }
                    if let Some(head) = self.stack.head_mut() {
                        head.selected = None;
                    }
                    self.redraw()?;
                }
                Ok(None)
            }
            Event::Expose { window } => {
                if let Some(level) = self.stack.level_of(window) {
                    self.draw_level(level)?;
                }
                Ok(None)
            }
            Event::Configure { window, geometry } => {
                if let Some(level) = self.stack.level_of(window) {
                    let metrics = self.options.metrics;
                    if let Some(menu) = self.stack.get_mut(level) {
                        menu.apply_forced_geometry(geometry, &metrics);
                    }
                    self.draw_level(level)?;
                }
                Ok(None)
            }
            Event::Close { window } => match self.stack.level_of(window) {
                Some(0) => Ok(Some(Outcome::Cancelled)),
                Some(level) => {
                    let owner = self.stack.get(level - 1).map(|m| m.owner);
                    if let Some(owner) = owner {
                        self.retarget(owner)?;
                        self.redraw()?;
                    }
                    Ok(None)
                }
                None => Ok(None),
            },
        }
    }

    fn on_motion(&mut self, window: Option<WindowId>, pos: Point) -> MenuResult<Option<Outcome>> {
        let Some(level) = window.and_then(|w| self.stack.level_of(w)) else {
            self.scroll = None;
            return Ok(None);
        };
        let metrics = self.options.metrics;
        let hit = match self.stack.get(level) {
            Some(menu) => menu.hit(pos.y, &metrics),
            None => return Ok(None),
        };

        match hit {
            Hit::ScrollUp | Hit::ScrollDown => {
                let state = ScrollState::new(level, hit == Hit::ScrollDown);
                if self.scroll != Some(state) {
                    tracing::debug!(level, down = state.down, "hover scrolling");
                    self.scroll = Some(state);
                }
                self.hover = None;
                Ok(None)
            }
            Hit::Tearoff => {
                self.scroll = None;
                if let Some(menu) = self.stack.get_mut(level) {
                    if !menu.tearoff_hover {
                        menu.tearoff_hover = true;
                        self.draw_level(level)?;
                    }
                }
                Ok(None)
            }
            Hit::Row(row) => {
                self.scroll = None;
                if self.hover == Some((level, row)) {
                    return Ok(None);
                }
                self.hover = Some((level, row));
                self.typeahead.clear();
                self.enter_row(level, row)?;
                Ok(None)
            }
            Hit::Nothing => {
                self.scroll = None;
                Ok(None)
            }
        }
    }

    /// The pointer entered `row` of the menu at `level`
    fn enter_row(&mut self, level: usize, row: usize) -> MenuResult<()> {
        let Some(menu) = self.stack.get_mut(level) else {
            return Ok(());
        };
        menu.tearoff_hover = false;
        let owner = menu.owner;
        let info = menu.rows[row];

        if info.separator {
            menu.selected = None;
            self.retarget(owner)?;
        } else {
            menu.selected = Some(row);
            if info.submenu {
                self.retarget(info.item)?;
            } else {
                self.retarget(owner)?;
            }
        }
        self.redraw()
    }

    fn on_release(
        &mut self,
        window: Option<WindowId>,
        pos: Point,
        button: Button,
    ) -> MenuResult<Option<Outcome>> {
        if button.is_wheel() {
            let direction = if button == Button::WheelUp {
                Cycle::Prev
            } else {
                Cycle::Next
            };
            self.typeahead.clear();
            self.select_in_head(|_, menu| cycle(menu, direction))?;
            self.warp_to_selection()?;
            return Ok(None);
        }
        let alternate = match button {
            Button::Primary | Button::Middle => false,
            Button::Secondary if self.options.right_click => true,
            _ => return Ok(None),
        };

        let Some(level) = window.and_then(|w| self.stack.level_of(w)) else {
            if self.pressed && !self.options.persistent {
                return Ok(Some(Outcome::Cancelled));
            }
            return Ok(None);
        };
        let metrics = self.options.metrics;
        let hit = match self.stack.get(level) {
            Some(menu) => menu.hit(pos.y, &metrics),
            None => return Ok(None),
        };

        match hit {
            Hit::Row(row) => self.activate(level, row, alternate, button == Button::Middle),
            Hit::ScrollUp | Hit::ScrollDown => {
                if let Some(menu) = self.stack.get_mut(level) {
                    if menu.scroll_by(hit == Hit::ScrollDown, &metrics) {
                        self.draw_level(level)?;
                    }
                }
                Ok(None)
            }
            Hit::Tearoff => self.tear_off(level).map(Some),
            Hit::Nothing => Ok(None),
        }
    }

    /// Activate `row` of the menu at `level`: toggle its submenu or emit
    fn activate(
        &mut self,
        level: usize,
        row: usize,
        alternate: bool,
        warp: bool,
    ) -> MenuResult<Option<Outcome>> {
        let Some(menu) = self.stack.get_mut(level) else {
            return Ok(None);
        };
        let info = menu.rows[row];
        if info.separator {
            return Ok(None);
        }
        let owner = menu.owner;
        menu.selected = Some(row);
        self.typeahead.clear();

        if !info.submenu {
            let item = self.tree.get(info.item);
            let output = item.emission(alternate).unwrap_or_default().to_string();
            tracing::info!(%output, "item activated");
            return Ok(Some(Outcome::Selected(output)));
        }

        let already_open = self
            .stack
            .get(level + 1)
            .is_some_and(|m| m.owner == info.item);
        if already_open {
            self.retarget(owner)?;
            self.redraw()?;
            return Ok(None);
        }

        self.retarget(info.item)?;
        if self.stack.head().map(|m| m.owner) == Some(info.item) {
            self.select_in_head(|_, menu| cycle(menu, Cycle::First))?;
            if warp {
                self.warp_to_selection()?;
            }
        }
        self.redraw()?;
        Ok(None)
    }

    fn on_key(&mut self, press: KeyPress) -> MenuResult<Option<Outcome>> {
        let Some(level) = self.stack.head().map(|m| m.level) else {
            return Ok(None);
        };

        match press.key {
            Key::Escape if level == 0 => return Ok(Some(Outcome::Cancelled)),
            Key::Escape | Key::Left => {
                self.typeahead.clear();
                if level > 0 {
                    self.ascend()?;
                }
            }
            Key::Tab if !self.typeahead.is_empty() => {
                let search = if press.shift {
                    Search::Backward
                } else {
                    Search::Forward
                };
                let text = self.typeahead.clone();
                self.select_in_head(|tree, menu| find_match(tree, menu, &text, search))?;
            }
            Key::Tab | Key::Up | Key::Down => {
                self.typeahead.clear();
                let backwards = press.key == Key::Up || (press.key == Key::Tab && press.shift);
                let direction = if backwards { Cycle::Prev } else { Cycle::Next };
                self.select_in_head(|_, menu| cycle(menu, direction))?;
            }
            Key::Home | Key::End => {
                self.typeahead.clear();
                let direction = if press.key == Key::Home {
                    Cycle::First
                } else {
                    Cycle::Last
                };
                self.select_in_head(|_, menu| cycle(menu, direction))?;
            }
            Key::Char(c @ '1'..='9') => {
                self.typeahead.clear();
                let n = c as usize - '0' as usize;
                self.select_in_head(|_, menu| nth(menu, n))?;
            }
            Key::Right | Key::Enter => {
                self.typeahead.clear();
                let selected = self.stack.head().and_then(|m| m.selected);
                if let Some(row) = selected {
                    let alternate = press.key == Key::Enter && press.shift;
                    return self.activate(level, row, alternate, false);
                }
            }
            Key::Backspace => {
                self.typeahead.clear();
            }
            Key::Char(c) if !c.is_control() => self.type_char(c)?,
            Key::Char(_) | Key::Other => {}
        }
        Ok(None)
    }

    /// Extend the search string, restarting it when nothing matches
    fn type_char(&mut self, c: char) -> MenuResult<()> {
        self.typeahead.push(c);
        let Some(head) = self.stack.head() else {
            return Ok(());
        };
        let mut found = find_match(self.tree, head, &self.typeahead, Search::FromTop);
        if found.is_none() {
            self.typeahead.clear();
            self.typeahead.push(c);
            found = find_match(self.tree, head, &self.typeahead, Search::FromTop);
        }
        if let Some(row) = found {
            self.select_in_head(|_, _| Some(row))?;
        }
        Ok(())
    }

    /// Close the head menu; its parent keeps the invoking row selected
    fn ascend(&mut self) -> MenuResult<()> {
        let len = self.stack.len();
        if len < 2 {
            return Ok(());
        }
        let parent = self.stack.get(len - 2).map(|m| m.owner);
        if let Some(parent) = parent {
            self.retarget(parent)?;
        }
        self.redraw()
    }

    /// Change the head menu's selection to whatever `pick` returns
    fn select_in_head<F>(&mut self, pick: F) -> MenuResult<()>
    where
        F: FnOnce(&ItemTree, &Menu) -> Option<usize>,
    {
        let metrics = self.options.metrics;
        let tree: &ItemTree = self.tree;
        let Some(head) = self.stack.head_mut() else {
            return Ok(());
        };
        let Some(row) = pick(tree, head) else {
            return Ok(());
        };
        head.selected = Some(row);
        head.ensure_visible(row, &metrics);
        let level = head.level;
        self.draw_level(level)
    }

    fn warp_to_selection(&mut self) -> MenuResult<()> {
        let metrics = self.options.metrics;
        let Some(head) = self.stack.head() else {
            return Ok(());
        };
        let Some(row) = head.selected else {
            return Ok(());
        };
        if let Some(top) = head.row_top(row, &metrics) {
            let at = Point::new(
                (head.geometry.width / 2) as i32,
                (top + head.rows[row].height / 2) as i32,
            );
            let window = head.window;
            self.hover = Some((head.level, row));
            self.backend.warp_pointer(window, at)?;
        }
        Ok(())
    }

    fn scroll_tick(&mut self) -> MenuResult<()> {
        let Some(state) = self.scroll else {
            return Ok(());
        };
        let metrics = self.options.metrics;
        let moved = match self.stack.get_mut(state.level) {
            Some(menu) => state.tick(menu, &metrics),
            None => false,
        };
        if moved {
            self.draw_level(state.level)
        } else {
            tracing::debug!(level = state.level, "scrolling stopped at boundary");
            self.scroll = None;
            Ok(())
        }
    }

    fn tear_off(&mut self, level: usize) -> MenuResult<Outcome> {
        let Some(menu) = self.stack.get(level) else {
            return Ok(Outcome::Cancelled);
        };
        let request = TearoffRequest::from_menu(self.tree, menu, &self.options.title);
        tracing::info!(level, title = %request.title, "menu torn off");
        while self.stack.len() > level + 1 {
            self.pop_menu()?;
        }
        self.close_all()?;
        Ok(Outcome::TornOff(request))
    }

    /// Collapse to the root menu with nothing selected
    pub fn collapse(&mut self) -> MenuResult<()> {
        self.typeahead.clear();
        self.hover = None;
        self.scroll = None;
        self.retarget(ItemId::ROOT)?;
        if let Some(root) = self.stack.get_mut(0) {
            root.selected = None;
        }
        self.redraw()?;
        self.backend.flush()
    }

    /// Switch the open chain to one headed by `target`, touching only menus
    /// below the lowest common ancestor.
    pub fn retarget(&mut self, target: ItemId) -> MenuResult<()> {
        let plan = self.stack.plan(self.tree, target);
        if plan.is_noop() {
            return Ok(());
        }
        tracing::debug!(pops = plan.pops, pushes = plan.pushes.len(), "retarget");
        for _ in 0..plan.pops {
            self.pop_menu()?;
        }
        for owner in plan.pushes {
            if !self.push_menu(owner)? {
                break;
            }
        }
        Ok(())
    }

    /// Open a submenu listing `owner`'s children; `false` when nothing opened
    fn push_menu(&mut self, owner: ItemId) -> MenuResult<bool> {
        let mut mark = None;
        let items: Vec<ItemId> = if self.tree.has_children(owner) {
            self.tree.children(owner).collect()
        } else if self.options.metrics.browse && is_browsable(self.tree, owner) {
            let len = self.tree.len();
            match list_directory(self.tree, owner) {
                Ok(items) if !items.is_empty() => {
                    mark = Some(len);
                    items
                }
                Ok(_) => {
                    tracing::debug!(?owner, "empty directory not opened");
                    return Ok(false);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "could not list directory");
                    self.tree.truncate(len);
                    return Ok(false);
                }
            }
        } else {
            return Ok(false);
        };

        let level = self.stack.len();
        let mut menu = self.layout(owner, &items, level);
        menu.dynamic_mark = mark;
        if let Some(parent) = self.stack.head() {
            let row = parent.row_of(owner).unwrap_or(parent.first);
            menu.place_submenu(parent, row, self.monitor, &self.options.metrics);
        }
        self.show(menu, Some(owner))?;
        Ok(true)
    }

    fn layout(&self, owner: ItemId, items: &[ItemId], level: usize) -> Menu {
        let metrics = &self.options.metrics;
        let cap = self.monitor.height.saturating_sub(2 * metrics.border);
        Menu::layout(self.tree, owner, items, level, metrics, &*self.backend, cap)
    }

    /// Create, push, map and draw a laid-out menu
    fn show(&mut self, mut menu: Menu, owner: Option<ItemId>) -> MenuResult<WindowId> {
        let title = match owner {
            Some(item) => self
                .tree
                .get(item)
                .output
                .clone()
                .unwrap_or_default(),
            None => self.options.title.clone(),
        };
        let spec = WindowSpec {
            geometry: menu.geometry,
            title,
            class: self.options.class.clone(),
            managed: self.options.windowed || self.options.persistent,
            persistent: self.options.persistent,
        };
        let window = self.backend.create_window(&spec)?;
        menu.window = window;
        let level = self.stack.len();
        self.stack.push(menu);
        self.backend.map(window)?;
        self.draw_level(level)?;
        Ok(window)
    }

    /// Unmap and destroy the head menu, then drop it from the stack
    fn pop_menu(&mut self) -> MenuResult<()> {
        let Some(head) = self.stack.head() else {
            return Ok(());
        };
        let window = head.window;
        let mark = head.dynamic_mark;
        self.backend.unmap(window)?;
        self.backend.destroy_window(window)?;
        self.stack.pop();

        if let Some(mark) = mark {
            self.tree.truncate(mark);
        }
        let len = self.stack.len();
        if self.scroll.is_some_and(|s| s.level >= len) {
            self.scroll = None;
        }
        if self.hover.is_some_and(|(level, _)| level >= len) {
            self.hover = None;
        }
        Ok(())
    }

    /// Close every menu and release the input grab
    pub fn close_all(&mut self) -> MenuResult<()> {
        while !self.stack.is_empty() {
            self.pop_menu()?;
        }
        self.hover = None;
        self.scroll = None;
        if self.grabbed {
            self.grabbed = false;
            self.backend.ungrab_input()?;
        }
        self.backend.flush()
    }

    fn draw_level(&mut self, level: usize) -> MenuResult<()> {
        let Some(menu) = self.stack.get(level) else {
            return Ok(());
        };
        let paint = MenuPaint::build(menu, self.tree, &self.options.metrics);
        let window = menu.window;
        self.backend.draw(window, &paint)
    }

    fn redraw(&mut self) -> MenuResult<()> {
        for level in 0..self.stack.len() {
            self.draw_level(level)?;
        }
        Ok(())
    }
}

impl<B: Backend> Drop for Engine<'_, B> {
    fn drop(&mut self) {
        if let Err(err) = self.close_all() {
            tracing::warn!(error = %err, "failed to close menus");
        }
    }
}
