//! X11 access to the terminal window this process is running in
//!
//! Everything pixel-shaped lives here; the placement policy only ever sees
//! the [`Rect`]s and cell counts these queries produce. Terminals advertise
//! their character cell size through WM_NORMAL_HINTS resize increments,
//! which is what makes column/row arithmetic possible at all.

use anyhow::{Context, Result};
use std::env;
use tracing::{debug, warn};
use x11rb::connection::Connection;
use x11rb::properties::WmSizeHints;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

use crate::geometry::Rect;
use crate::placement::TerminalLimits;

/// Pre-cached X11 atoms to avoid repeated roundtrips
pub struct CachedAtoms {
    pub net_active_window: Atom,
    pub net_workarea: Atom,
    pub net_current_desktop: Atom,
}

impl CachedAtoms {
    pub fn new(conn: &RustConnection) -> Result<Self> {
        // do all intern_atom roundtrips once at startup
        Ok(Self {
            net_active_window: conn
                .intern_atom(false, b"_NET_ACTIVE_WINDOW")
                .context("Failed to intern _NET_ACTIVE_WINDOW atom")?
                .reply()
                .context("Failed to get reply for _NET_ACTIVE_WINDOW atom")?
                .atom,
            net_workarea: conn
                .intern_atom(false, b"_NET_WORKAREA")
                .context("Failed to intern _NET_WORKAREA atom")?
                .reply()
                .context("Failed to get reply for _NET_WORKAREA atom")?
                .atom,
            net_current_desktop: conn
                .intern_atom(false, b"_NET_CURRENT_DESKTOP")
                .context("Failed to intern _NET_CURRENT_DESKTOP atom")?
                .reply()
                .context("Failed to get reply for _NET_CURRENT_DESKTOP atom")?
                .atom,
        })
    }
}

/// Character cell metrics from WM_NORMAL_HINTS
#[derive(Debug, Clone, Copy)]
struct CellMetrics {
    base_width: i32,
    base_height: i32,
    width_inc: i32,
    height_inc: i32,
}

impl CellMetrics {
    fn query(conn: &RustConnection, window: Window) -> Result<Self> {
        let hints = WmSizeHints::get_normal_hints(conn, window)
            .context("Failed to request WM_NORMAL_HINTS")?
            .reply()
            .ok()
            .flatten();

        let increment = hints.as_ref().and_then(|h| h.size_increment);
        if increment.is_none() {
            warn!("terminal window advertises no cell size; treating one pixel as one cell");
        }
        let (width_inc, height_inc) = increment.unwrap_or((1, 1));
        let (base_width, base_height) = hints
            .as_ref()
            .and_then(|h| h.base_size.or(h.min_size))
            .unwrap_or((0, 0));

        Ok(Self {
            base_width: base_width as i32,
            base_height: base_height as i32,
            width_inc: (width_inc as i32).max(1),
            height_inc: (height_inc as i32).max(1),
        })
    }

    fn columns_for(&self, pixels: i32) -> u16 {
        ((pixels - self.base_width).max(0) / self.width_inc) as u16
    }

    fn rows_for(&self, pixels: i32) -> u16 {
        ((pixels - self.base_height).max(0) / self.height_inc) as u16
    }

    fn width_for(&self, columns: u16) -> u32 {
        (self.base_width + i32::from(columns) * self.width_inc) as u32
    }

    fn height_for(&self, rows: u16) -> u32 {
        (self.base_height + i32::from(rows) * self.height_inc) as u32
    }
}

/// Handle on the terminal's own top-level window
pub struct TermWindow {
    conn: RustConnection,
    root: Window,
    screen_width: u16,
    screen_height: u16,
    window: Window,
    atoms: CachedAtoms,
    cell: CellMetrics,
}

impl TermWindow {
    /// Connect to the display and locate the window this terminal lives in
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) =
            x11rb::connect(None).context("Failed to connect to X11 display")?;
        let screen = &conn.setup().roots[screen_num];
        let root = screen.root;
        let screen_width = screen.width_in_pixels;
        let screen_height = screen.height_in_pixels;
        debug!(screen = screen_num, width = screen_width, height = screen_height, "connected to x11");

        let atoms = CachedAtoms::new(&conn)?;
        let window = find_own_window(&conn, root, &atoms)?;
        let cell = CellMetrics::query(&conn, window)?;
        debug!(window = window, cell = ?cell, "located terminal window");

        Ok(Self { conn, root, screen_width, screen_height, window, atoms, cell })
    }

    /// Current window rectangle in root coordinates
    pub fn rect(&self) -> Result<Rect> {
        let geom = self
            .conn
            .get_geometry(self.window)
            .context("Failed to send geometry query for terminal window")?
            .reply()
            .context("Failed to get geometry for terminal window")?;
        // geometry coordinates are parent-relative; ask for the root offset
        let origin = self
            .conn
            .translate_coordinates(self.window, self.root, 0, 0)
            .context("Failed to send coordinate translation for terminal window")?
            .reply()
            .context("Failed to translate terminal window coordinates to root")?;

        Ok(Rect {
            x: i32::from(origin.dst_x),
            y: i32::from(origin.dst_y),
            width: i32::from(geom.width),
            height: i32::from(geom.height),
        })
    }

    /// Working area of the current desktop, falling back to the whole
    /// screen when the window manager does not publish one
    pub fn work_area(&self) -> Result<Rect> {
        let desktop = self
            .conn
            .get_property(false, self.root, self.atoms.net_current_desktop, AtomEnum::CARDINAL, 0, 1)
            .context("Failed to query _NET_CURRENT_DESKTOP property")?
            .reply()
            .context("Failed to get reply for _NET_CURRENT_DESKTOP query")?
            .value32()
            .and_then(|mut values| values.next())
            .unwrap_or(0);

        let reply = self
            .conn
            .get_property(false, self.root, self.atoms.net_workarea, AtomEnum::CARDINAL, 0, u32::MAX)
            .context("Failed to query _NET_WORKAREA property")?
            .reply()
            .context("Failed to get reply for _NET_WORKAREA query")?;

        if let Some(values) = reply.value32() {
            let values: Vec<u32> = values.collect();
            let slot = desktop as usize * 4;
            if let Some(area) = values.get(slot..slot + 4) {
                return Ok(Rect {
                    x: area[0] as i32,
                    y: area[1] as i32,
                    width: area[2] as i32,
                    height: area[3] as i32,
                });
            }
        }

        debug!("window manager publishes no work area; using the full screen");
        Ok(Rect {
            x: 0,
            y: 0,
            width: i32::from(self.screen_width),
            height: i32::from(self.screen_height),
        })
    }

    /// Current terminal size in character cells
    pub fn size(&self) -> Result<(u16, u16)> {
        let rect = self.rect()?;
        Ok((self.cell.columns_for(rect.width), self.cell.rows_for(rect.height)))
    }

    /// Largest terminal that fits the given working area
    pub fn limits(&self, work_area: &Rect) -> TerminalLimits {
        TerminalLimits {
            max_columns: self.cell.columns_for(work_area.width),
            max_rows: self.cell.rows_for(work_area.height),
        }
    }

    /// Resize to `columns` wide, leaving the height alone
    pub fn set_columns(&self, columns: u16) -> Result<()> {
        self.conn
            .configure_window(
                self.window,
                &ConfigureWindowAux::new().width(self.cell.width_for(columns)),
            )
            .context("Failed to set terminal window width")?;
        self.conn
            .flush()
            .context("Failed to flush X11 connection after width change")?;
        Ok(())
    }

    /// Resize to `rows` tall, leaving the width alone
    pub fn set_rows(&self, rows: u16) -> Result<()> {
        self.conn
            .configure_window(
                self.window,
                &ConfigureWindowAux::new().height(self.cell.height_for(rows)),
            )
            .context("Failed to set terminal window height")?;
        self.conn
            .flush()
            .context("Failed to flush X11 connection after height change")?;
        Ok(())
    }

    /// Move the window, re-asserting its size so the move never shrinks it
    pub fn move_to(&self, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        self.conn
            .configure_window(
                self.window,
                &ConfigureWindowAux::new()
                    .x(x)
                    .y(y)
                    .width(width.max(1) as u32)
                    .height(height.max(1) as u32),
            )
            .context("Failed to move terminal window")?;
        self.conn
            .flush()
            .context("Failed to flush X11 connection after move")?;
        Ok(())
    }
}

/// The terminal's window id: `WINDOWID` when the terminal exports it,
/// otherwise whichever window currently holds focus
fn find_own_window(conn: &RustConnection, root: Window, atoms: &CachedAtoms) -> Result<Window> {
    if let Ok(id) = env::var("WINDOWID")
        && let Ok(window) = id.trim().parse::<u32>()
        && window != 0
    {
        return Ok(window);
    }

    let reply = conn
        .get_property(false, root, atoms.net_active_window, AtomEnum::WINDOW, 0, 1)
        .context("Failed to query _NET_ACTIVE_WINDOW property")?
        .reply()
        .context("Failed to get reply for _NET_ACTIVE_WINDOW query")?;

    match reply.value32().and_then(|mut values| values.next()) {
        Some(window) if window != 0 => Ok(window),
        _ => anyhow::bail!(
            "cannot locate the terminal window: WINDOWID is unset and no window is active"
        ),
    }
}
