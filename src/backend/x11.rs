//! X11 backend
//!
//! Talks to the server through `x11rb`'s pure-Rust connection. Every menu
//! window is drawn into its own pixmap first and copied over in one request.
//! Text uses a core font; icons are uploaded as 32-bit Z-pixmaps.

use std::cell::RefCell;
use std::collections::HashMap;
use std::thread::sleep;
use std::time::{Duration, Instant};

use x11rb::connection::{Connection, RequestConnection as _};
use x11rb::properties::{WmSizeHints, WmSizeHintsSpecification};
use x11rb::protocol::xinerama::{self, ConnectionExt as _};
use x11rb::protocol::xproto::{
    Allow, AtomEnum, ButtonIndex, Char2b, ChangeGCAux, ConnectionExt as _, CoordMode,
    CreateGCAux, CreateWindowAux, EventMask, Font, Gcontext, GrabMode, GrabStatus, ImageFormat,
    ImageOrder, InputFocus, KeyButMask, ModMask, Pixmap, Point as XPoint, PolyShape, PropMode,
    Rectangle, Window, WindowClass,
};
use x11rb::protocol::Event as XEvent;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;
use x11rb::{COPY_DEPTH_FROM_PARENT, CURRENT_TIME, NONE};

use super::{Backend, TextMeasure, Trigger, WindowId, WindowSpec};
use crate::config::{Color, Config};
use crate::engine::{Button, Event, Key, KeyPress};
use crate::error::{MenuError, MenuResult};
use crate::icon::IconLoader;
use crate::menu::{Metrics, Point, Rect};
use crate::render::{triangle_x, Element, MenuPaint};

x11rb::atom_manager! {
    Atoms: AtomsCookie {
        WM_PROTOCOLS,
        WM_DELETE_WINDOW,
        UTF8_STRING,
        _NET_WM_NAME,
        _NET_WM_WINDOW_TYPE,
        _NET_WM_WINDOW_TYPE_POPUP_MENU,
        _NET_WM_WINDOW_TYPE_NORMAL,
    }
}

const GRAB_TRIES: u32 = 1000;
const GRAB_DELAY: Duration = Duration::from_millis(1);
const FOCUS_TRIES: u32 = 100;
const FOCUS_DELAY: Duration = Duration::from_millis(10);
const POLL_DELAY: Duration = Duration::from_millis(2);

fn display_err(err: impl std::fmt::Display) -> MenuError {
    MenuError::Display(err.to_string())
}

/// Allocated pixel values
#[derive(Debug, Clone, Copy, Default)]
struct Pixels {
    background: u32,
    foreground: u32,
    selected_background: u32,
    selected_foreground: u32,
    separator: u32,
    border: u32,
}

#[derive(Debug)]
struct XWindow {
    window: Window,
    pixmap: Pixmap,
    size: (u16, u16),
    managed: bool,
}

/// Keycode to keysym table
#[derive(Debug, Default)]
struct Keymap {
    min_keycode: u8,
    per_keycode: usize,
    keysyms: Vec<u32>,
}

impl Keymap {
    fn keysym(&self, keycode: u8, shift: bool) -> u32 {
        if keycode < self.min_keycode || self.per_keycode == 0 {
            return 0;
        }
        let base = usize::from(keycode - self.min_keycode) * self.per_keycode;
        let lower = self.keysyms.get(base).copied().unwrap_or(0);
        let upper = if self.per_keycode > 1 {
            self.keysyms.get(base + 1).copied().unwrap_or(0)
        } else {
            0
        };
        if shift && upper != 0 {
            upper
        } else {
            lower
        }
    }
}

pub struct X11Backend {
    conn: RustConnection,
    root: Window,
    depth: u8,
    visual: u32,
    colormap: u32,
    lsb_first: bool,
    true_color_icons: bool,
    atoms: Atoms,
    keymap: Keymap,
    gc: Gcontext,
    font: Font,
    font_name: String,
    ascent: u32,
    descent: u32,
    pixels: Pixels,
    /// Row backgrounds icons are blended onto, unselected and selected
    icon_backgrounds: (Color, Color),
    metrics: Metrics,
    icons: IconLoader,
    windows: HashMap<WindowId, XWindow>,
    text_cache: RefCell<HashMap<String, u32>>,
    next_window: u32,
    trigger_grabbed: bool,
}

impl X11Backend {
    /// Connect to `$DISPLAY` and load the configured font and colours
    pub fn connect(config: &Config) -> MenuResult<Self> {
        let (conn, screen_num) = x11rb::connect(None).map_err(display_err)?;
        let setup = conn.setup();
        let screen = &setup.roots[screen_num];
        let root = screen.root;
        let depth = screen.root_depth;
        let visual = screen.root_visual;
        let colormap = screen.default_colormap;
        let lsb_first = setup.image_byte_order == ImageOrder::LSB_FIRST;
        let true_color_icons = depth >= 24
            && setup
                .pixmap_formats
                .iter()
                .any(|f| f.depth == depth && f.bits_per_pixel == 32);

        let min_keycode = setup.min_keycode;
        let count = setup.max_keycode - min_keycode + 1;
        let mapping = conn
            .get_keyboard_mapping(min_keycode, count)
            .map_err(display_err)?
            .reply()
            .map_err(display_err)?;
        let keymap = Keymap {
            min_keycode,
            per_keycode: usize::from(mapping.keysyms_per_keycode),
            keysyms: mapping.keysyms,
        };

        let atoms = Atoms::new(&conn)
            .map_err(display_err)?
            .reply()
            .map_err(display_err)?;
        let gc = conn.generate_id().map_err(display_err)?;
        conn.create_gc(gc, root, &CreateGCAux::new().graphics_exposures(0))
            .map_err(display_err)?;

        let metrics = Metrics::from_config(config);
        let mut backend = Self {
            conn,
            root,
            depth,
            visual,
            colormap,
            lsb_first,
            true_color_icons,
            atoms,
            keymap,
            gc,
            font: NONE,
            font_name: String::new(),
            ascent: 0,
            descent: 0,
            pixels: Pixels::default(),
            icon_backgrounds: (config.background, config.selected_background),
            metrics,
            icons: IconLoader::from_env(metrics.icon_size()),
            windows: HashMap::new(),
            text_cache: RefCell::new(HashMap::new()),
            next_window: 1,
            trigger_grabbed: false,
        };
        backend.apply_style(config)?;
        tracing::info!(depth, icons = true_color_icons, "connected to X server");
        Ok(backend)
    }

    fn load_font(&mut self, name: &str) -> MenuResult<()> {
        if name == self.font_name && self.font != NONE {
            return Ok(());
        }
        let font = self.conn.generate_id().map_err(display_err)?;
        self.conn
            .open_font(font, name.as_bytes())
            .map_err(display_err)?
            .check()
            .map_err(|_| MenuError::Font(name.to_string()))?;
        let info = self
            .conn
            .query_font(font)
            .map_err(display_err)?
            .reply()
            .map_err(|_| MenuError::Font(name.to_string()))?;
        if self.font != NONE {
            self.conn.close_font(self.font).map_err(display_err)?;
        }
        self.font = font;
        self.font_name = name.to_string();
        self.ascent = info.font_ascent.max(0) as u32;
        self.descent = info.font_descent.max(0) as u32;
        self.text_cache.borrow_mut().clear();
        tracing::debug!(font = name, "font loaded");
        Ok(())
    }

    fn alloc(&self, color: Color) -> MenuResult<u32> {
        let scale = |c: u8| u16::from(c) * 257;
        self.conn
            .alloc_color(self.colormap, scale(color.r), scale(color.g), scale(color.b))
            .map_err(display_err)?
            .reply()
            .map(|r| r.pixel)
            .map_err(|_| MenuError::Color(color.to_string()))
    }

    fn font_height(&self) -> u32 {
        self.ascent + self.descent
    }

    fn xwindow(&self, id: WindowId) -> MenuResult<&XWindow> {
        self.windows
            .get(&id)
            .ok_or_else(|| MenuError::Display(format!("unknown window {}", id.0)))
    }

    fn id_of(&self, window: Window) -> Option<WindowId> {
        self.windows
            .iter()
            .find(|(_, w)| w.window == window)
            .map(|(id, _)| *id)
    }

    fn set_properties(&self, window: Window, spec: &WindowSpec) -> MenuResult<()> {
        let conn = &self.conn;
        conn.change_property8(
            PropMode::REPLACE,
            window,
            AtomEnum::WM_NAME,
            AtomEnum::STRING,
            spec.title.as_bytes(),
        )
        .map_err(display_err)?;
        conn.change_property8(
            PropMode::REPLACE,
            window,
            self.atoms._NET_WM_NAME,
            self.atoms.UTF8_STRING,
            spec.title.as_bytes(),
        )
        .map_err(display_err)?;

        let class = format!("{}\0{}\0", crate::PROGRAM_NAME, spec.class);
        conn.change_property8(
            PropMode::REPLACE,
            window,
            AtomEnum::WM_CLASS,
            AtomEnum::STRING,
            class.as_bytes(),
        )
        .map_err(display_err)?;
        conn.change_property32(
            PropMode::REPLACE,
            window,
            self.atoms.WM_PROTOCOLS,
            AtomEnum::ATOM,
            &[self.atoms.WM_DELETE_WINDOW],
        )
        .map_err(display_err)?;

        let kind = if spec.persistent {
            self.atoms._NET_WM_WINDOW_TYPE_NORMAL
        } else {
            self.atoms._NET_WM_WINDOW_TYPE_POPUP_MENU
        };
        conn.change_property32(
            PropMode::REPLACE,
            window,
            self.atoms._NET_WM_WINDOW_TYPE,
            AtomEnum::ATOM,
            &[kind],
        )
        .map_err(display_err)?;

        let g = spec.geometry;
        let (w, h) = (g.width.max(1) as i32, g.height.max(1) as i32);
        let hints = WmSizeHints {
            position: Some((WmSizeHintsSpecification::UserSpecified, g.x, g.y)),
            min_size: Some((w, h)),
            max_size: Some((w, h)),
            ..WmSizeHints::default()
        };
        hints.set_normal_hints(conn, window).map_err(display_err)?;
        Ok(())
    }

    fn set_foreground(&self, pixel: u32) -> MenuResult<()> {
        self.conn
            .change_gc(self.gc, &ChangeGCAux::new().foreground(pixel))
            .map_err(display_err)?;
        Ok(())
    }

    fn fill(&self, pixmap: Pixmap, pixel: u32, x: i32, y: u32, width: u32, height: u32) -> MenuResult<()> {
        self.set_foreground(pixel)?;
        self.conn
            .poly_fill_rectangle(
                pixmap,
                self.gc,
                &[Rectangle {
                    x: x as i16,
                    y: y as i16,
                    width: width as u16,
                    height: height as u16,
                }],
            )
            .map_err(display_err)?;
        Ok(())
    }

    fn polygon(&self, pixmap: Pixmap, pixel: u32, points: &[XPoint]) -> MenuResult<()> {
        self.set_foreground(pixel)?;
        self.conn
            .fill_poly(pixmap, self.gc, PolyShape::CONVEX, CoordMode::ORIGIN, points)
            .map_err(display_err)?;
        Ok(())
    }

    fn text(&self, pixmap: Pixmap, fg: u32, bg: u32, x: u32, y: u32, height: u32, text: &str) -> MenuResult<()> {
        let chars = to_char2b(text);
        if chars.is_empty() {
            return Ok(());
        }
        let baseline = y + height.saturating_sub(self.font_height()) / 2 + self.ascent;
        self.conn
            .change_gc(
                self.gc,
                &ChangeGCAux::new().foreground(fg).background(bg).font(self.font),
            )
            .map_err(display_err)?;
        self.conn
            .image_text16(pixmap, self.gc, x as i16, baseline as i16, &chars)
            .map_err(display_err)?;
        Ok(())
    }

    fn icon(&mut self, pixmap: Pixmap, name: &str, y: u32, bg: Color) -> MenuResult<()> {
        if !self.true_color_icons {
            return Ok(());
        }
        let lsb_first = self.lsb_first;
        let Some(image) = self.icons.load(name) else {
            return Ok(());
        };
        let (w, h) = image.dimensions();
        let mut data = Vec::with_capacity((w * h * 4) as usize);
        for px in image.pixels() {
            let [r, g, b, a] = px.0;
            let blend = |c: u8, under: u8| {
                ((u16::from(c) * u16::from(a) + u16::from(under) * (255 - u16::from(a))) / 255) as u8
            };
            let (r, g, b) = (blend(r, bg.r), blend(g, bg.g), blend(b, bg.b));
            if lsb_first {
                data.extend_from_slice(&[b, g, r, 0]);
            } else {
                data.extend_from_slice(&[0, r, g, b]);
            }
        }
        let x = self.metrics.horizontal_padding;
        let y = y + self.metrics.icon_padding;
        self.conn
            .put_image(
                ImageFormat::Z_PIXMAP,
                pixmap,
                self.gc,
                w as u16,
                h as u16,
                x as i16,
                y as i16,
                0,
                self.depth,
                &data,
            )
            .map_err(display_err)?;
        Ok(())
    }

    /// Grab with retries; `grab` returns whether it succeeded
    fn retry<F>(&self, tries: u32, delay: Duration, what: &'static str, mut grab: F) -> MenuResult<()>
    where
        F: FnMut(&Self) -> MenuResult<bool>,
    {
        for _ in 0..tries {
            if grab(self)? {
                return Ok(());
            }
            sleep(delay);
        }
        Err(MenuError::Grab(what))
    }

    fn translate(&mut self, event: XEvent) -> Option<Event> {
        match event {
            XEvent::Expose(e) if e.count == 0 => self
                .id_of(e.window)
                .map(|window| Event::Expose { window }),
            XEvent::MotionNotify(e) => {
                let (window, pos) = self.locate(e.event, (e.event_x, e.event_y), (e.root_x, e.root_y));
                Some(Event::Motion { window, pos })
            }
            XEvent::ButtonPress(e) => {
                let (window, pos) = self.locate(e.event, (e.event_x, e.event_y), (e.root_x, e.root_y));
                Some(Event::ButtonPress {
                    window,
                    pos,
                    button: Button::from_number(e.detail),
                })
            }
            XEvent::ButtonRelease(e) => {
                let (window, pos) = self.locate(e.event, (e.event_x, e.event_y), (e.root_x, e.root_y));
                Some(Event::ButtonRelease {
                    window,
                    pos,
                    button: Button::from_number(e.detail),
                })
            }
            XEvent::KeyPress(e) => {
                let shift = u16::from(e.state) & u16::from(KeyButMask::SHIFT) != 0;
                let keysym = self.keymap.keysym(e.detail, shift);
                Some(Event::Key(translate_keysym(keysym, shift)))
            }
            XEvent::LeaveNotify(e) => self.id_of(e.event).map(|window| Event::Leave { window }),
            XEvent::ConfigureNotify(e) => {
                let window = self.id_of(e.window)?;
                let managed = self.windows.get(&window).is_some_and(|w| w.managed);
                managed.then(|| Event::Configure {
                    window,
                    geometry: Rect::new(
                        i32::from(e.x),
                        i32::from(e.y),
                        u32::from(e.width),
                        u32::from(e.height),
                    ),
                })
            }
            XEvent::ClientMessage(e) => {
                let window = self.id_of(e.window)?;
                (e.format == 32 && e.data.as_data32()[0] == self.atoms.WM_DELETE_WINDOW)
                    .then_some(Event::Close { window })
            }
            XEvent::Error(err) => {
                tracing::warn!(?err, "X protocol error");
                None
            }
            _ => None,
        }
    }

    /// Window and local position for a pointer event
    fn locate(&self, event_window: Window, local: (i16, i16), root: (i16, i16)) -> (Option<WindowId>, Point) {
        match self.id_of(event_window) {
            Some(id) => (Some(id), Point::new(i32::from(local.0), i32::from(local.1))),
            None => (None, Point::new(i32::from(root.0), i32::from(root.1))),
        }
    }
}

fn to_char2b(text: &str) -> Vec<Char2b> {
    text.chars()
        .take(255)
        .map(|c| {
            let code = if (c as u32) <= 0xFFFF { c as u32 } else { u32::from('?') };
            Char2b {
                byte1: (code >> 8) as u8,
                byte2: code as u8,
            }
        })
        .collect()
}

fn modifier_mask(modifier: u8) -> u16 {
    1 << (modifier + 2)
}

/// Map a keysym to a menu key press
pub fn translate_keysym(keysym: u32, shift: bool) -> KeyPress {
    let key = match keysym {
        0xff52 => Key::Up,
        0xff54 => Key::Down,
        0xff51 => Key::Left,
        0xff53 => Key::Right,
        0xff50 => Key::Home,
        0xff57 => Key::End,
        0xff09 => Key::Tab,
        0xfe20 => return KeyPress::shifted(Key::Tab),
        0xff0d | 0xff8d => Key::Enter,
        0xff1b => Key::Escape,
        0xff08 | 0xff0b | 0xffff => Key::Backspace,
        0x20..=0x7e | 0xa0..=0xff => char::from_u32(keysym).map_or(Key::Other, Key::Char),
        k if k & 0xff00_0000 == 0x0100_0000 => {
            char::from_u32(k & 0x00ff_ffff).map_or(Key::Other, Key::Char)
        }
        _ => Key::Other,
    };
    KeyPress { key, shift }
}

impl TextMeasure for X11Backend {
    fn text_width(&self, text: &str) -> u32 {
        if let Some(w) = self.text_cache.borrow().get(text) {
            return *w;
        }
        let chars = to_char2b(text);
        let width = self
            .conn
            .query_text_extents(self.font, &chars)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .map(|r| r.overall_width.max(0) as u32)
            .unwrap_or_else(|| chars.len() as u32 * self.font_height() / 2);
        self.text_cache.borrow_mut().insert(text.to_string(), width);
        width
    }
}

impl Backend for X11Backend {
    fn scale_metrics(&self, metrics: Metrics) -> Metrics {
        Metrics {
            item_height: metrics.item_height.max(self.font_height() + 2),
            icons: metrics.icons && self.true_color_icons,
            ..metrics
        }
    }

    fn monitors(&mut self) -> MenuResult<Vec<Rect>> {
        let has_xinerama = self
            .conn
            .extension_information(xinerama::X11_EXTENSION_NAME)
            .map_err(display_err)?
            .is_some();
        if has_xinerama {
            let active = self
                .conn
                .xinerama_is_active()
                .map_err(display_err)?
                .reply()
                .map_err(display_err)?
                .state
                != 0;
            if active {
                let screens = self
                    .conn
                    .xinerama_query_screens()
                    .map_err(display_err)?
                    .reply()
                    .map_err(display_err)?;
                let monitors: Vec<Rect> = screens
                    .screen_info
                    .iter()
                    .map(|s| {
                        Rect::new(
                            i32::from(s.x_org),
                            i32::from(s.y_org),
                            u32::from(s.width),
                            u32::from(s.height),
                        )
                    })
                    .collect();
                if !monitors.is_empty() {
                    return Ok(monitors);
                }
            }
        }
        let screen = &self.conn.setup().roots[0];
        Ok(vec![Rect::new(
            0,
            0,
            u32::from(screen.width_in_pixels),
            u32::from(screen.height_in_pixels),
        )])
    }

    fn pointer(&mut self) -> MenuResult<Point> {
        let reply = self
            .conn
            .query_pointer(self.root)
            .map_err(display_err)?
            .reply()
            .map_err(display_err)?;
        Ok(Point::new(i32::from(reply.root_x), i32::from(reply.root_y)))
    }

    fn create_window(&mut self, spec: &WindowSpec) -> MenuResult<WindowId> {
        let g = spec.geometry;
        let (w, h) = (g.width.max(1) as u16, g.height.max(1) as u16);
        let window = self.conn.generate_id().map_err(display_err)?;
        let mask = EventMask::EXPOSURE
            | EventMask::KEY_PRESS
            | EventMask::BUTTON_PRESS
            | EventMask::BUTTON_RELEASE
            | EventMask::POINTER_MOTION
            | EventMask::LEAVE_WINDOW
            | EventMask::STRUCTURE_NOTIFY;
        self.conn
            .create_window(
                COPY_DEPTH_FROM_PARENT,
                window,
                self.root,
                g.x as i16,
                g.y as i16,
                w,
                h,
                self.metrics.border as u16,
                WindowClass::INPUT_OUTPUT,
                self.visual,
                &CreateWindowAux::new()
                    .override_redirect(u32::from(!spec.managed))
                    .save_under(u32::from(!spec.managed))
                    .background_pixel(self.pixels.background)
                    .border_pixel(self.pixels.border)
                    .event_mask(mask),
            )
            .map_err(display_err)?;
        self.set_properties(window, spec)?;

        let pixmap = self.conn.generate_id().map_err(display_err)?;
        self.conn
            .create_pixmap(self.depth, pixmap, window, w, h)
            .map_err(display_err)?;

        let id = WindowId(self.next_window);
        self.next_window += 1;
        self.windows.insert(
            id,
            XWindow {
                window,
                pixmap,
                size: (w, h),
                managed: spec.managed,
            },
        );
        tracing::debug!(window = id.0, ?g, "window created");
        Ok(id)
    }

    fn map(&mut self, window: WindowId) -> MenuResult<()> {
        let w = self.xwindow(window)?.window;
        self.conn.map_window(w).map_err(display_err)?;
        Ok(())
    }

    fn unmap(&mut self, window: WindowId) -> MenuResult<()> {
        let w = self.xwindow(window)?.window;
        self.conn.unmap_window(w).map_err(display_err)?;
        Ok(())
    }

    fn destroy_window(&mut self, window: WindowId) -> MenuResult<()> {
        let Some(w) = self.windows.remove(&window) else {
            return Ok(());
        };
        self.conn.free_pixmap(w.pixmap).map_err(display_err)?;
        self.conn.destroy_window(w.window).map_err(display_err)?;
        Ok(())
    }

    fn draw(&mut self, window: WindowId, paint: &MenuPaint) -> MenuResult<()> {
        let (xwin, mut pixmap, size) = {
            let w = self.xwindow(window)?;
            (w.window, w.pixmap, w.size)
        };
        let want = (paint.width.max(1) as u16, paint.height.max(1) as u16);
        if want != size {
            self.conn.free_pixmap(pixmap).map_err(display_err)?;
            pixmap = self.conn.generate_id().map_err(display_err)?;
            self.conn
                .create_pixmap(self.depth, pixmap, xwin, want.0, want.1)
                .map_err(display_err)?;
            if let Some(w) = self.windows.get_mut(&window) {
                w.pixmap = pixmap;
                w.size = want;
            }
        }

        let p = self.pixels;
        let m = self.metrics;
        self.fill(pixmap, p.background, 0, 0, paint.width, paint.height)?;

        for element in &paint.elements {
            match element {
                Element::Tearoff { y, height, hover } => {
                    let color = if *hover {
                        self.fill(pixmap, p.selected_background, 0, *y, paint.width, *height)?;
                        p.selected_foreground
                    } else {
                        p.separator
                    };
                    let mid = y + height / 2;
                    let mut x = m.horizontal_padding;
                    while x + 4 <= paint.width.saturating_sub(m.horizontal_padding) {
                        self.fill(pixmap, color, x as i32, mid, 4, 1)?;
                        x += 8;
                    }
                }
                Element::ScrollArrow { y, height, up } => {
                    let cx = (paint.width / 2) as i16;
                    let mid = (y + height / 2) as i16;
                    let points = if *up {
                        [
                            XPoint { x: cx - 3, y: mid + 2 },
                            XPoint { x: cx, y: mid - 2 },
                            XPoint { x: cx + 3, y: mid + 2 },
                        ]
                    } else {
                        [
                            XPoint { x: cx - 3, y: mid - 2 },
                            XPoint { x: cx, y: mid + 2 },
                            XPoint { x: cx + 3, y: mid - 2 },
                        ]
                    };
                    self.polygon(pixmap, p.foreground, &points)?;
                }
                Element::Separator { y, height } => {
                    let x = m.horizontal_padding;
                    let width = paint.width.saturating_sub(2 * x);
                    self.fill(pixmap, p.separator, x as i32, y + height / 2, width, 1)?;
                }
                Element::Row {
                    y,
                    height,
                    label,
                    text_x,
                    icon,
                    selected,
                    submenu,
                } => {
                    let (fg, bg) = if *selected {
                        (p.selected_foreground, p.selected_background)
                    } else {
                        (p.foreground, p.background)
                    };
                    self.fill(pixmap, bg, 0, *y, paint.width, *height)?;
                    self.text(pixmap, fg, bg, *text_x, *y, *height, label)?;
                    if *submenu {
                        let x = triangle_x(paint.width, &m) as i16;
                        let top = (y + height.saturating_sub(m.triangle_height) / 2) as i16;
                        let (tw, th) = (m.triangle_width as i16, m.triangle_height as i16);
                        let points = [
                            XPoint { x, y: top },
                            XPoint { x: x + tw, y: top + th / 2 },
                            XPoint { x, y: top + th },
                        ];
                        self.polygon(pixmap, fg, &points)?;
                    }
                    if let Some(name) = icon {
                        let under = if *selected {
                            self.icon_backgrounds.1
                        } else {
                            self.icon_backgrounds.0
                        };
                        self.icon(pixmap, name, *y, under)?;
                    }
                }
            }
        }

        self.conn
            .copy_area(pixmap, xwin, self.gc, 0, 0, 0, 0, want.0, want.1)
            .map_err(display_err)?;
        Ok(())
    }

    fn focus(&mut self, window: WindowId) -> MenuResult<()> {
        let (target, managed) = {
            let w = self.xwindow(window)?;
            (w.window, w.managed)
        };
        let result = self.retry(FOCUS_TRIES, FOCUS_DELAY, "focus", |s| {
            s.conn
                .set_input_focus(InputFocus::PARENT, target, CURRENT_TIME)
                .map_err(display_err)?;
            let focus = s
                .conn
                .get_input_focus()
                .map_err(display_err)?
                .reply()
                .map_err(display_err)?
                .focus;
            Ok(focus == target)
        });
        match result {
            Err(MenuError::Grab(_)) if managed => {
                tracing::warn!(window = window.0, "window manager kept the focus");
                Ok(())
            }
            other => other,
        }
    }

    fn grab_input(&mut self) -> MenuResult<()> {
        let root = self.root;
        let mask = EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE | EventMask::POINTER_MOTION;
        self.retry(GRAB_TRIES, GRAB_DELAY, "pointer", |s| {
            let status = s
                .conn
                .grab_pointer(true, root, mask, GrabMode::ASYNC, GrabMode::ASYNC, NONE, NONE, CURRENT_TIME)
                .map_err(display_err)?
                .reply()
                .map_err(display_err)?
                .status;
            Ok(status == GrabStatus::SUCCESS)
        })?;
        self.retry(GRAB_TRIES, GRAB_DELAY, "keyboard", |s| {
            let status = s
                .conn
                .grab_keyboard(true, root, CURRENT_TIME, GrabMode::ASYNC, GrabMode::ASYNC)
                .map_err(display_err)?
                .reply()
                .map_err(display_err)?
                .status;
            Ok(status == GrabStatus::SUCCESS)
        })?;
        tracing::debug!("input grabbed");
        Ok(())
    }

    fn ungrab_input(&mut self) -> MenuResult<()> {
        self.conn.ungrab_pointer(CURRENT_TIME).map_err(display_err)?;
        self.conn.ungrab_keyboard(CURRENT_TIME).map_err(display_err)?;
        Ok(())
    }

    fn warp_pointer(&mut self, window: WindowId, at: Point) -> MenuResult<()> {
        let target = self.xwindow(window)?.window;
        self.conn
            .warp_pointer(NONE, target, 0, 0, 0, 0, at.x as i16, at.y as i16)
            .map_err(display_err)?;
        Ok(())
    }

    fn next_event(&mut self, timeout: Option<Duration>) -> MenuResult<Option<Event>> {
        self.conn.flush().map_err(display_err)?;
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            let raw = match deadline {
                None => self.conn.wait_for_event().map_err(display_err)?,
                Some(deadline) => match self.conn.poll_for_event().map_err(display_err)? {
                    Some(raw) => raw,
                    None if Instant::now() >= deadline => return Ok(None),
                    None => {
                        sleep(POLL_DELAY);
                        continue;
                    }
                },
            };
            if let Some(event) = self.translate(raw) {
                return Ok(Some(event));
            }
        }
    }

    fn wait_trigger(&mut self, trigger: &Trigger) -> MenuResult<Point> {
        if !self.trigger_grabbed {
            self.conn
                .grab_button(
                    false,
                    self.root,
                    EventMask::BUTTON_PRESS,
                    GrabMode::SYNC,
                    GrabMode::ASYNC,
                    NONE,
                    NONE,
                    ButtonIndex::from(trigger.button),
                    ModMask::ANY,
                )
                .map_err(display_err)?;
            self.trigger_grabbed = true;
        }
        self.conn.flush().map_err(display_err)?;
        loop {
            let XEvent::ButtonPress(e) = self.conn.wait_for_event().map_err(display_err)? else {
                continue;
            };
            if e.event != self.root {
                continue;
            }
            let state = u16::from(e.state);
            let triggered = match trigger.modifier {
                Some(m) if state & modifier_mask(m) != 0 => true,
                _ => e.child == NONE,
            };
            if !triggered {
                self.conn
                    .allow_events(Allow::REPLAY_POINTER, CURRENT_TIME)
                    .map_err(display_err)?;
                self.conn.flush().map_err(display_err)?;
                continue;
            }
            let mode = if trigger.pass {
                Allow::REPLAY_POINTER
            } else {
                Allow::ASYNC_POINTER
            };
            self.conn.allow_events(mode, CURRENT_TIME).map_err(display_err)?;
            tracing::debug!(button = trigger.button, "root trigger");
            return Ok(Point::new(i32::from(e.root_x), i32::from(e.root_y)));
        }
    }

    fn apply_style(&mut self, config: &Config) -> MenuResult<()> {
        self.load_font(&config.font)?;
        self.pixels = Pixels {
            background: self.alloc(config.background)?,
            foreground: self.alloc(config.foreground)?,
            selected_background: self.alloc(config.selected_background)?,
            selected_foreground: self.alloc(config.selected_foreground)?,
            separator: self.alloc(config.separator_color)?,
            border: self.alloc(config.border_color)?,
        };
        self.icon_backgrounds = (config.background, config.selected_background);
        self.metrics = self.scale_metrics(Metrics::from_config(config));
        self.icons.set_size(self.metrics.icon_size());
        Ok(())
    }

    fn flush(&mut self) -> MenuResult<()> {
        self.conn.flush().map_err(display_err)?;
        Ok(())
    }
}
