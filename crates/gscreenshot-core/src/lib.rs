//! gscreenshot-core: screenshot capture orchestration for Linux desktops
//!
//! This library drives external capture and selection utilities (scrot,
//! grim, ImageMagick, imlib2, slop, slurp, xdg-desktop-portal) plus a few
//! in-process fallbacks, and turns their output into [`Screenshot`] values
//! with non-destructive crop and cursor-stamp effects.
//!
//! The entry point for most consumers is [`app::Gscreenshot`], which picks
//! the best available backend for the current session, runs captures and
//! keeps the captured images in a navigable [`ScreenshotCollection`].
//!
//! [`Screenshot`]: screenshot::Screenshot
//! [`ScreenshotCollection`]: screenshot::ScreenshotCollection

pub mod app;
pub mod capture;
pub mod error;
pub mod model;
pub mod screenshot;
pub mod util;
