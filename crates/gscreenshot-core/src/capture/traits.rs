//! Strategy traits for the three backend roles
//!
//! Every concrete backend fills exactly one role:
//!
//! - [`CaptureBackend`]: grabs the whole screen (scrot, grim, portal, ...)
//! - [`RegionSelector`]: lets the user pick a rectangle (slop, slurp, ...)
//! - [`CursorLocator`]: reports where the pointer is
//!
//! Each role advertises what it provides through a [`CapabilityMap`]. The
//! orchestration core in [`super::screenshooter`] merges the three maps and
//! uses them to decide pipeline branches.

use async_trait::async_trait;

use super::ImageBuffer;
use crate::{
    error::{CaptureResult, SelectionError},
    model::{CapabilityMap, Region, SelectionColor},
};

/// Capability: backend can capture the full screen.
///
/// Implementations must not retain any temporary file past the call; the
/// returned image is fully decoded in memory.
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Display name, also used as the provider name in capability maps
    fn name(&self) -> &'static str;

    /// Capabilities this backend provides on its own
    fn capabilities(&self) -> CapabilityMap;

    /// Captures every monitor as one image.
    ///
    /// `capture_cursor` is only honoured by backends that declare
    /// [`Capability::CursorCapture`](crate::model::Capability::CursorCapture);
    /// others ignore it.
    async fn capture_fullscreen(&self, capture_cursor: bool) -> CaptureResult<ImageBuffer>;
}

/// Capability: backend can run an interactive selection.
#[async_trait]
pub trait RegionSelector: Send + Sync {
    /// Display name, also used as the provider name in capability maps
    fn name(&self) -> &'static str;

    /// Capabilities this selector provides
    fn capabilities(&self) -> CapabilityMap;

    /// Asks the user for a rectangle.
    ///
    /// The returned region is already multiplied by the display scaling
    /// factor.
    async fn region_select(
        &self,
        color: &SelectionColor,
        border_weight: u32,
    ) -> Result<Region, SelectionError>;

    /// Asks the user to pick a window.
    ///
    /// None of the supported tools distinguish windows from regions, so
    /// this defaults to [`RegionSelector::region_select`].
    async fn window_select(
        &self,
        color: &SelectionColor,
        border_weight: u32,
    ) -> Result<Region, SelectionError> {
        self.region_select(color, border_weight).await
    }
}

/// Capability: backend can report the pointer position.
#[async_trait]
pub trait CursorLocator: Send + Sync {
    /// Display name, also used as the provider name in capability maps
    fn name(&self) -> &'static str;

    /// Capabilities this locator provides
    fn capabilities(&self) -> CapabilityMap;

    /// Raw pointer position in logical (unscaled) pixels, if known
    async fn cursor_position(&self) -> Option<(i32, i32)>;

    /// Pointer position multiplied by the display scaling factor
    async fn cursor_position_adjusted(&self, scale: f64) -> Option<(i32, i32)> {
        let (x, y) = self.cursor_position().await?;
        Some((
            (x as f64 * scale).round() as i32,
            (y as f64 * scale).round() as i32,
        ))
    }
}
