//! Capture backends, selectors, cursor locators and their orchestration
//!
//! # Architecture
//!
//! The pipeline is built from three strategy roles, each a trait in
//! [`traits`]:
//!
//! - [`CaptureBackend`] - full-screen capture (scrot, grim, portal, ...)
//! - [`RegionSelector`] - interactive rectangle selection (slop, slurp, ...)
//! - [`CursorLocator`] - pointer position lookup
//!
//! [`factory::ScreenshooterFactory`] probes the session and picks one
//! implementation per role, and [`screenshooter::Screenshooter`] drives
//! them through the capture pipelines.
//!
//! ```rust,ignore
//! use gscreenshot_core::{capture::factory::ScreenshooterFactory, model::GrabOptions};
//!
//! let shooter = ScreenshooterFactory::detect().create()?;
//! if let Some(shot) = shooter.grab_selection(&GrabOptions::default()).await {
//!     let image = shot.get_image();
//! }
//! ```
//!
//! ## Backend Capabilities
//!
//! | Backend | Session | Cursor capture | Output |
//! |---------|---------|----------------|--------|
//! | scrot | X11 | ✓ | temp file |
//! | imagemagick | X11 | - | temp file |
//! | imlib2 | X11 | - | temp file |
//! | xcap | X11 | - | in process |
//! | grim | Wayland | ✓ | stdout |
//! | xdg-desktop-portal | Wayland | - | portal file |

pub mod constants;
pub mod cursor;
pub mod factory;
pub mod image_buffer;
pub mod process;
pub mod screenshooter;
pub mod selector;
pub mod traits;

pub use factory::ScreenshooterFactory;
pub use image_buffer::ImageBuffer;
pub use screenshooter::{PipelineState, Screenshooter};
pub use traits::{CaptureBackend, CursorLocator, RegionSelector};
