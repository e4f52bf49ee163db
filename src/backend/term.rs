//! Terminal backend
//!
//! Cells stand in for pixels and the terminal for the single monitor. Menus
//! are boxes composited onto the alternate screen, which lives on stderr so
//! stdout stays free for the selected output. Keys and mouse events come
//! from the controlling terminal.

use std::collections::{BTreeMap, VecDeque};
use std::io::{self, Stderr, Write};
use std::time::Duration;

use crossterm::event::{
    self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::style::{Color as TermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::{cursor, execute, queue, terminal};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::{Backend, TextMeasure, Trigger, WindowId, WindowSpec};
use crate::config::{Color, Config};
use crate::engine::{Button, Event, Key, KeyPress};
use crate::error::MenuResult;
use crate::menu::{Metrics, Point, Rect};
use crate::render::{triangle_x, Element, MenuPaint};

/// Placeholder for the right half of a double-width character
const CONTINUATION: char = '\0';

/// What a cell belongs to, for colouring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    /// Not covered by any menu
    Screen,
    Normal,
    Selected,
    Border,
    Separator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: CellStyle,
}

impl Cell {
    const BLANK: Cell = Cell {
        ch: ' ',
        style: CellStyle::Screen,
    };
}

/// A composited screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub width: u32,
    pub height: u32,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; (width * height) as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Cell> {
        if x < self.width && y < self.height {
            Some(self.cells[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            self.cells[(y as u32 * self.width + x as u32) as usize] = cell;
        }
    }

    fn fill(&mut self, x: i32, y: i32, width: u32, cell: Cell) {
        for dx in 0..width as i32 {
            self.set(x + dx, y, cell);
        }
    }

    /// Write `text` from `x`, never past `limit`
    fn text(&mut self, x: i32, y: i32, limit: i32, text: &str, style: CellStyle) {
        let mut col = x;
        for ch in text.chars() {
            let w = ch.width().unwrap_or(0) as i32;
            if w == 0 {
                continue;
            }
            if col + w > limit {
                break;
            }
            self.set(col, y, Cell { ch, style });
            if w == 2 {
                self.set(
                    col + 1,
                    y,
                    Cell {
                        ch: CONTINUATION,
                        style,
                    },
                );
            }
            col += w;
        }
    }

    /// The screen as plain text, trailing blanks trimmed
    pub fn to_text(&self) -> String {
        let mut lines = Vec::with_capacity(self.height as usize);
        for row in self.cells.chunks(self.width.max(1) as usize) {
            let line: String = row
                .iter()
                .map(|c| c.ch)
                .filter(|&ch| ch != CONTINUATION)
                .collect();
            lines.push(line.trim_end().to_string());
        }
        lines.join("\n")
    }
}

/// One mapped menu window, bottom-most first
#[derive(Debug, Clone, Copy)]
pub struct Layer<'a> {
    pub geometry: Rect,
    pub paint: &'a MenuPaint,
}

/// Draw `layers` onto a `width` x `height` screen
pub fn composite(width: u32, height: u32, metrics: &Metrics, layers: &[Layer<'_>]) -> Grid {
    let mut grid = Grid::new(width, height);
    let b = metrics.border as i32;
    for layer in layers {
        let g = layer.geometry;
        let (w, h) = (g.width as i32, g.height as i32);
        let (ox, oy) = (g.x + b, g.y + b);

        if b > 0 {
            let border = |ch| Cell {
                ch,
                style: CellStyle::Border,
            };
            grid.set(g.x, g.y, border('┌'));
            grid.set(g.x + w + 1, g.y, border('┐'));
            grid.set(g.x, g.y + h + 1, border('└'));
            grid.set(g.x + w + 1, g.y + h + 1, border('┘'));
            grid.fill(ox, g.y, w as u32, border('─'));
            grid.fill(ox, g.y + h + 1, w as u32, border('─'));
            for dy in 0..h {
                grid.set(g.x, oy + dy, border('│'));
                grid.set(g.x + w + 1, oy + dy, border('│'));
            }
        }
        let blank = Cell {
            ch: ' ',
            style: CellStyle::Normal,
        };
        for dy in 0..h {
            grid.fill(ox, oy + dy, g.width, blank);
        }

        for element in &layer.paint.elements {
            match element {
                Element::Tearoff { y, hover, .. } => {
                    let style = if *hover {
                        CellStyle::Selected
                    } else {
                        CellStyle::Separator
                    };
                    grid.fill(ox, oy + *y as i32, g.width, Cell { ch: '╌', style });
                }
                Element::ScrollArrow { y, up, .. } => {
                    let ch = if *up { '▲' } else { '▼' };
                    grid.set(
                        ox + w / 2,
                        oy + *y as i32,
                        Cell {
                            ch,
                            style: CellStyle::Normal,
                        },
                    );
                }
                Element::Separator { y, height } => {
                    let cell = Cell {
                        ch: '─',
                        style: CellStyle::Separator,
                    };
                    grid.fill(ox, oy + (*y + height / 2) as i32, g.width, cell);
                }
                Element::Row {
                    y,
                    label,
                    text_x,
                    selected,
                    submenu,
                    ..
                } => {
                    let style = if *selected {
                        CellStyle::Selected
                    } else {
                        CellStyle::Normal
                    };
                    let row = oy + *y as i32;
                    grid.fill(ox, row, g.width, Cell { ch: ' ', style });
                    let arrow = triangle_x(g.width, metrics) as i32;
                    let limit = if *submenu { ox + arrow } else { ox + w };
                    grid.text(ox + *text_x as i32, row, limit, label, style);
                    if *submenu {
                        grid.set(ox + arrow, row, Cell { ch: '▸', style });
                    }
                }
            }
        }
    }
    grid
}

#[derive(Debug, Clone, Copy)]
struct Palette {
    background: TermColor,
    foreground: TermColor,
    selected_background: TermColor,
    selected_foreground: TermColor,
    separator: TermColor,
    border: TermColor,
}

impl Palette {
    fn from_config(config: &Config) -> Self {
        let c = |color: Color| TermColor::Rgb {
            r: color.r,
            g: color.g,
            b: color.b,
        };
        Self {
            background: c(config.background),
            foreground: c(config.foreground),
            selected_background: c(config.selected_background),
            selected_foreground: c(config.selected_foreground),
            separator: c(config.separator_color),
            border: c(config.border_color),
        }
    }

    fn colors(&self, style: CellStyle) -> (TermColor, TermColor) {
        match style {
            CellStyle::Screen => (TermColor::Reset, TermColor::Reset),
            CellStyle::Normal => (self.foreground, self.background),
            CellStyle::Selected => (self.selected_foreground, self.selected_background),
            CellStyle::Border => (self.border, self.background),
            CellStyle::Separator => (self.separator, self.background),
        }
    }
}

#[derive(Debug)]
struct TermWindow {
    geometry: Rect,
    mapped: bool,
    paint: Option<MenuPaint>,
}

pub struct TermBackend {
    out: Stderr,
    size: (u32, u32),
    metrics: Metrics,
    palette: Palette,
    pointer: Point,
    hovered: Option<WindowId>,
    pending: VecDeque<Event>,
    next_window: u32,
    windows: BTreeMap<WindowId, TermWindow>,
    dirty: bool,
}

impl TermBackend {
    /// Enter the alternate screen and enable mouse reporting
    pub fn new(config: &Config) -> MenuResult<Self> {
        let mut out = io::stderr();
        terminal::enable_raw_mode()?;
        execute!(
            out,
            terminal::EnterAlternateScreen,
            event::EnableMouseCapture,
            cursor::Hide
        )?;
        let (cols, rows) = terminal::size()?;
        tracing::debug!(cols, rows, "terminal backend ready");
        Ok(Self {
            out,
            size: (u32::from(cols), u32::from(rows)),
            metrics: Metrics::from_config(config),
            palette: Palette::from_config(config),
            pointer: Point::new(i32::from(cols) / 4, i32::from(rows) / 4),
            hovered: None,
            pending: VecDeque::new(),
            next_window: 1,
            windows: BTreeMap::new(),
            dirty: false,
        })
    }

    /// Topmost mapped window under a screen cell
    fn window_at(&self, col: i32, row: i32) -> Option<(WindowId, Point)> {
        let b = self.metrics.border as i32;
        self.windows
            .iter()
            .rev()
            .filter(|(_, w)| w.mapped)
            .find(|(_, w)| {
                let g = w.geometry;
                let outer = Rect::new(g.x, g.y, g.width + 2 * b as u32, g.height + 2 * b as u32);
                outer.contains(Point::new(col, row))
            })
            .map(|(id, w)| (*id, Point::new(col - w.geometry.x - b, row - w.geometry.y - b)))
    }

    fn translate(&mut self, ev: TermEvent) -> Option<Event> {
        match ev {
            TermEvent::Key(key) => translate_key(key).map(Event::Key),
            TermEvent::Mouse(mouse) => self.translate_mouse(mouse),
            TermEvent::Resize(cols, rows) => {
                self.size = (u32::from(cols), u32::from(rows));
                self.dirty = true;
                let ids: Vec<_> = self.windows.keys().copied().collect();
                self.pending
                    .extend(ids.into_iter().map(|window| Event::Expose { window }));
                self.pending.pop_front()
            }
            _ => None,
        }
    }

    fn translate_mouse(&mut self, mouse: MouseEvent) -> Option<Event> {
        let (col, row) = (i32::from(mouse.column), i32::from(mouse.row));
        self.pointer = Point::new(col, row);
        let (window, pos) = match self.window_at(col, row) {
            Some((id, local)) => (Some(id), local),
            None => (None, self.pointer),
        };

        if self.hovered != window {
            if let Some(left) = self.hovered {
                self.pending.push_back(Event::Leave { window: left });
            }
            self.hovered = window;
        }

        let event = match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => Event::Motion { window, pos },
            MouseEventKind::Down(b) => Event::ButtonPress {
                window,
                pos,
                button: mouse_button(b),
            },
            MouseEventKind::Up(b) => Event::ButtonRelease {
                window,
                pos,
                button: mouse_button(b),
            },
            MouseEventKind::ScrollUp => Event::ButtonRelease {
                window,
                pos,
                button: Button::WheelUp,
            },
            MouseEventKind::ScrollDown => Event::ButtonRelease {
                window,
                pos,
                button: Button::WheelDown,
            },
            _ => return self.pending.pop_front(),
        };
        self.pending.push_back(event);
        self.pending.pop_front()
    }

    fn repaint(&mut self) -> MenuResult<()> {
        let layers: Vec<Layer<'_>> = self
            .windows
            .values()
            .filter(|w| w.mapped)
            .filter_map(|w| {
                w.paint.as_ref().map(|paint| Layer {
                    geometry: w.geometry,
                    paint,
                })
            })
            .collect();
        let grid = composite(self.size.0, self.size.1, &self.metrics, &layers);

        queue!(self.out, terminal::Clear(terminal::ClearType::All))?;
        for y in 0..grid.height {
            queue!(self.out, cursor::MoveTo(0, y as u16))?;
            let mut run = String::new();
            let mut style = CellStyle::Screen;
            for x in 0..grid.width {
                let Some(cell) = grid.get(x, y) else { continue };
                if cell.style != style && !run.is_empty() {
                    let (fg, bg) = self.palette.colors(style);
                    queue!(
                        self.out,
                        SetForegroundColor(fg),
                        SetBackgroundColor(bg),
                        Print(std::mem::take(&mut run))
                    )?;
                }
                style = cell.style;
                if cell.ch != CONTINUATION {
                    run.push(cell.ch);
                }
            }
            let (fg, bg) = self.palette.colors(style);
            queue!(
                self.out,
                SetForegroundColor(fg),
                SetBackgroundColor(bg),
                Print(run)
            )?;
        }
        queue!(self.out, ResetColor)?;
        self.dirty = false;
        Ok(())
    }

    fn window(&mut self, id: WindowId) -> MenuResult<&mut TermWindow> {
        self.windows
            .get_mut(&id)
            .ok_or_else(|| crate::error::MenuError::Display(format!("unknown window {}", id.0)))
    }
}

impl Drop for TermBackend {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            cursor::Show,
            event::DisableMouseCapture,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

fn mouse_button(b: MouseButton) -> Button {
    match b {
        MouseButton::Left => Button::Primary,
        MouseButton::Middle => Button::Middle,
        MouseButton::Right => Button::Secondary,
    }
}

/// Convert a key event to a menu key press
pub fn translate_key(key: KeyEvent) -> Option<KeyPress> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    let key = match key.code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => return Some(KeyPress::shifted(Key::Tab)),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Key::Escape,
        KeyCode::Char(c) => Key::Char(c),
        _ => Key::Other,
    };
    Some(KeyPress { key, shift })
}

impl TextMeasure for TermBackend {
    fn text_width(&self, text: &str) -> u32 {
        text.width() as u32
    }
}

impl Backend for TermBackend {
    fn scale_metrics(&self, metrics: Metrics) -> Metrics {
        Metrics {
            min_width: (metrics.min_width / 10).max(8),
            item_height: 1,
            separator_height: 1,
            border: metrics.border.min(1),
            gap: 0,
            horizontal_padding: 1,
            icon_padding: 0,
            triangle_width: 1,
            triangle_height: 1,
            icons: false,
            ..metrics
        }
    }

    fn monitors(&mut self) -> MenuResult<Vec<Rect>> {
        Ok(vec![Rect::new(0, 0, self.size.0, self.size.1)])
    }

    fn pointer(&mut self) -> MenuResult<Point> {
        Ok(self.pointer)
    }

    fn create_window(&mut self, spec: &WindowSpec) -> MenuResult<WindowId> {
        let id = WindowId(self.next_window);
        self.next_window += 1;
        self.windows.insert(
            id,
            TermWindow {
                geometry: spec.geometry,
                mapped: false,
                paint: None,
            },
        );
        Ok(id)
    }

    fn map(&mut self, window: WindowId) -> MenuResult<()> {
        self.window(window)?.mapped = true;
        self.dirty = true;
        Ok(())
    }

    fn unmap(&mut self, window: WindowId) -> MenuResult<()> {
        self.window(window)?.mapped = false;
        self.dirty = true;
        Ok(())
    }

    fn destroy_window(&mut self, window: WindowId) -> MenuResult<()> {
        self.windows.remove(&window);
        if self.hovered == Some(window) {
            self.hovered = None;
        }
        self.dirty = true;
        Ok(())
    }

    fn draw(&mut self, window: WindowId, paint: &MenuPaint) -> MenuResult<()> {
        self.window(window)?.paint = Some(paint.clone());
        self.dirty = true;
        Ok(())
    }

    fn focus(&mut self, _window: WindowId) -> MenuResult<()> {
        Ok(())
    }

    fn grab_input(&mut self) -> MenuResult<()> {
        Ok(())
    }

    fn ungrab_input(&mut self) -> MenuResult<()> {
        Ok(())
    }

    fn warp_pointer(&mut self, window: WindowId, at: Point) -> MenuResult<()> {
        let b = self.metrics.border as i32;
        let g = self.window(window)?.geometry;
        self.pointer = Point::new(g.x + b + at.x, g.y + b + at.y);
        Ok(())
    }

    fn next_event(&mut self, timeout: Option<Duration>) -> MenuResult<Option<Event>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }
            if let Some(limit) = timeout {
                if !event::poll(limit)? {
                    return Ok(None);
                }
            }
            let raw = event::read()?;
            if let Some(event) = self.translate(raw) {
                return Ok(Some(event));
            }
        }
    }

    fn wait_trigger(&mut self, trigger: &Trigger) -> MenuResult<Point> {
        self.flush()?;
        loop {
            let TermEvent::Mouse(mouse) = event::read()? else {
                continue;
            };
            let MouseEventKind::Down(b) = mouse.kind else {
                continue;
            };
            let number = match b {
                MouseButton::Left => 1,
                MouseButton::Middle => 2,
                MouseButton::Right => 3,
            };
            let modifier_ok = match trigger.modifier {
                None => true,
                Some(1) => mouse.modifiers.contains(KeyModifiers::ALT),
                Some(_) => false,
            };
            if number == trigger.button && modifier_ok {
                self.pointer = Point::new(i32::from(mouse.column), i32::from(mouse.row));
                return Ok(self.pointer);
            }
        }
    }

    fn apply_style(&mut self, config: &Config) -> MenuResult<()> {
        self.palette = Palette::from_config(config);
        self.metrics = self.scale_metrics(Metrics::from_config(config));
        self.dirty = true;
        Ok(())
    }

    fn flush(&mut self) -> MenuResult<()> {
        if self.dirty {
            self.repaint()?;
        }
        self.out.flush()?;
        Ok(())
    }
}
