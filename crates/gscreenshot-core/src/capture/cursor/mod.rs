//! Cursor locators
//!
//! On X11 the pointer can be queried directly. Wayland offers no such
//! query, so the user clicks the spot where the cursor glyph should go.

mod slurp_point;
#[cfg(target_os = "linux")]
mod x11;

pub use slurp_point::SlurpPointLocator;
#[cfg(target_os = "linux")]
pub use x11::X11CursorLocator;
