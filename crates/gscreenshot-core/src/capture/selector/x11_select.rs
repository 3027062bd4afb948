//! In-process rubber-band selection on X11
//!
//! Grabs the pointer and keyboard on the root window and draws the
//! selection rectangle with an XOR graphics context, so no helper binary is
//! needed. Button 1 drag selects a rectangle, a button 1 click without a
//! drag selects the window under the pointer, and button 3 or any key
//! cancels.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;
use x11rb::{
    CURRENT_TIME, NONE,
    connection::Connection,
    protocol::{
        Event,
        xproto::{
            ConnectionExt as _, CreateGCAux, EventMask, GX, GrabMode, GrabStatus, Rectangle,
            Screen, SubwindowMode, Window,
        },
    },
    rust_connection::RustConnection,
};

use crate::{
    capture::{constants::selection_timeout, traits::RegionSelector},
    error::SelectionError,
    model::{Capability, CapabilityMap, Region, SelectionColor},
    util::detect::SystemProbe,
};

/// `XC_crosshair` from the X cursor font
const XC_CROSSHAIR: u16 = 34;

/// Drags shorter than this count as a click
const CLICK_SLOP_PX: i32 = 3;

/// Rubber-band selector drawn directly on the X11 root window
#[derive(Debug, Clone)]
pub struct X11RubberBandSelector {
    scale: f64,
}

impl X11RubberBandSelector {
    pub const NAME: &'static str = "x11";

    pub fn new(scale: f64) -> Self {
        Self { scale }
    }

    pub fn can_run(probe: &SystemProbe) -> bool {
        !probe.session_is_wayland() && probe.env_var("DISPLAY").is_some()
    }

    pub fn from_probe(probe: &SystemProbe) -> Self {
        Self::new(probe.scale().factor())
    }
}

#[async_trait]
impl RegionSelector for X11RubberBandSelector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn capabilities(&self) -> CapabilityMap {
        CapabilityMap::new()
            .with(Capability::RegionSelection, Self::NAME)
            .with(Capability::WindowSelection, Self::NAME)
    }

    async fn region_select(
        &self,
        _color: &SelectionColor,
        border_weight: u32,
    ) -> Result<Region, SelectionError> {
        let deadline = Instant::now() + selection_timeout();
        let region = tokio::task::spawn_blocking(move || rubber_band(border_weight, deadline))
            .await
            .map_err(|e| exec_failed(e.to_string()))??;

        Ok(region.scaled(self.scale))
    }
}

fn exec_failed(reason: impl Into<String>) -> SelectionError {
    SelectionError::ExecFailed {
        tool:   X11RubberBandSelector::NAME.to_string(),
        reason: reason.into(),
    }
}

fn x11_err(e: impl std::fmt::Display) -> SelectionError {
    exec_failed(e.to_string())
}

/// Pointer and keyboard grab plus drawing resources, released on drop
struct Grab<'c> {
    conn:   &'c RustConnection,
    root:   Window,
    gc:     u32,
    font:   u32,
    cursor: u32,
    drawn:  Option<Rectangle>,
}

impl<'c> Grab<'c> {
    fn acquire(conn: &'c RustConnection, screen: &Screen, border_weight: u32) -> Result<Self, SelectionError> {
        let root = screen.root;

        let font = conn.generate_id().map_err(x11_err)?;
        conn.open_font(font, b"cursor").map_err(x11_err)?;
        let cursor = conn.generate_id().map_err(x11_err)?;
        conn.create_glyph_cursor(
            cursor,
            font,
            font,
            XC_CROSSHAIR,
            XC_CROSSHAIR + 1,
            0,
            0,
            0,
            0xffff,
            0xffff,
            0xffff,
        )
        .map_err(x11_err)?;

        let gc = conn.generate_id().map_err(x11_err)?;
        conn.create_gc(
            gc,
            root,
            &CreateGCAux::new()
                .function(GX::XOR)
                .foreground(screen.white_pixel ^ screen.black_pixel)
                .line_width(border_weight.clamp(1, u16::MAX as u32))
                .subwindow_mode(SubwindowMode::INCLUDE_INFERIORS),
        )
        .map_err(x11_err)?;

        let grab = Self {
            conn,
            root,
            gc,
            font,
            cursor,
            drawn: None,
        };

        let pointer = conn
            .grab_pointer(
                false,
                root,
                EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE | EventMask::POINTER_MOTION,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                NONE,
                cursor,
                CURRENT_TIME,
            )
            .map_err(x11_err)?
            .reply()
            .map_err(x11_err)?;
        if pointer.status != GrabStatus::SUCCESS {
            return Err(exec_failed(format!("pointer grab failed: {:?}", pointer.status)));
        }

        let keyboard = conn
            .grab_keyboard(false, root, CURRENT_TIME, GrabMode::ASYNC, GrabMode::ASYNC)
            .map_err(x11_err)?
            .reply()
            .map_err(x11_err)?;
        if keyboard.status != GrabStatus::SUCCESS {
            return Err(exec_failed(format!("keyboard grab failed: {:?}", keyboard.status)));
        }

        conn.flush().map_err(x11_err)?;
        Ok(grab)
    }

    /// Replaces the drawn rectangle; XOR drawing twice erases
    fn draw(&mut self, rect: Option<Rectangle>) -> Result<(), SelectionError> {
        if let Some(old) = self.drawn.take() {
            self.conn.poly_rectangle(self.root, self.gc, &[old]).map_err(x11_err)?;
        }
        if let Some(new) = rect {
            self.conn.poly_rectangle(self.root, self.gc, &[new]).map_err(x11_err)?;
            self.drawn = Some(new);
        }
        self.conn.flush().map_err(x11_err)
    }
}

impl Drop for Grab<'_> {
    fn drop(&mut self) {
        let _ = self.draw(None);
        let _ = self.conn.ungrab_pointer(CURRENT_TIME);
        let _ = self.conn.ungrab_keyboard(CURRENT_TIME);
        let _ = self.conn.free_gc(self.gc);
        let _ = self.conn.free_cursor(self.cursor);
        let _ = self.conn.close_font(self.font);
        let _ = self.conn.flush();
    }
}

fn normalized(a: (i32, i32), b: (i32, i32)) -> Region {
    Region::new(a.0.min(b.0), a.1.min(b.1), a.0.max(b.0), a.1.max(b.1))
}

fn to_rectangle(region: Region) -> Rectangle {
    Rectangle {
        x:      region.left as i16,
        y:      region.top as i16,
        width:  region.width().min(u16::MAX as u32) as u16,
        height: region.height().min(u16::MAX as u32) as u16,
    }
}

/// Geometry of a top-level window in root coordinates
fn window_region(conn: &RustConnection, root: Window, window: Window) -> Result<Region, SelectionError> {
    let geometry = conn.get_geometry(window).map_err(x11_err)?.reply().map_err(x11_err)?;
    let origin = conn
        .translate_coordinates(window, root, 0, 0)
        .map_err(x11_err)?
        .reply()
        .map_err(x11_err)?;

    Ok(Region::from_xywh(
        origin.dst_x as i32,
        origin.dst_y as i32,
        geometry.width as i32,
        geometry.height as i32,
    ))
}

fn rubber_band(border_weight: u32, deadline: Instant) -> Result<Region, SelectionError> {
    let (conn, screen_num) = x11rb::connect(None).map_err(x11_err)?;
    let screen = conn
        .setup()
        .roots
        .get(screen_num)
        .ok_or_else(|| exec_failed(format!("screen {} not found", screen_num)))?
        .clone();

    let mut grab = Grab::acquire(&conn, &screen, border_weight)?;
    let mut anchor: Option<(i32, i32)> = None;
    let mut clicked_window: Window = NONE;

    loop {
        if Instant::now() >= deadline {
            return Err(exec_failed("timed out waiting for a selection"));
        }

        let Some(event) = conn.poll_for_event().map_err(x11_err)? else {
            std::thread::sleep(Duration::from_millis(10));
            continue;
        };

        match event {
            Event::ButtonPress(e) if e.detail == 1 => {
                anchor = Some((e.root_x as i32, e.root_y as i32));
                clicked_window = e.child;
            }
            Event::ButtonPress(e) if e.detail == 3 => {
                debug!("Rubber band cancelled with right click");
                return Err(SelectionError::Cancelled);
            }
            Event::KeyPress(_) => {
                debug!("Rubber band cancelled from keyboard");
                return Err(SelectionError::Cancelled);
            }
            Event::MotionNotify(e) => {
                if let Some(start) = anchor {
                    let region = normalized(start, (e.root_x as i32, e.root_y as i32));
                    grab.draw(Some(to_rectangle(region)))?;
                }
            }
            Event::ButtonRelease(e) if e.detail == 1 => {
                let Some(start) = anchor else {
                    continue;
                };
                let end = (e.root_x as i32, e.root_y as i32);
                grab.draw(None)?;

                let dragged = (end.0 - start.0).abs() > CLICK_SLOP_PX
                    || (end.1 - start.1).abs() > CLICK_SLOP_PX;
                if dragged {
                    return Ok(normalized(start, end));
                }

                let target = if clicked_window == NONE {
                    screen.root
                } else {
                    clicked_window
                };
                return window_region(&conn, screen.root, target);
            }
            _ => {}
        }
    }
}
