//! In-process X11 capture through `xcap`
//!
//! Last resort when none of the external X11 tools are installed. Every
//! monitor is captured and the frames are laid out left to right in the
//! order xcap reports them.

use async_trait::async_trait;
use image::{DynamicImage, GenericImage, RgbaImage};
use tracing::debug;
use xcap::Monitor;

use crate::{
    capture::{
        ImageBuffer, constants::capture_timeout, process::with_timeout, traits::CaptureBackend,
    },
    error::{CaptureError, CaptureResult},
    model::{Capability, CapabilityMap},
    util::detect::SystemProbe,
};

#[derive(Debug, Clone, Default)]
pub struct XcapBackend;

impl XcapBackend {
    pub const NAME: &'static str = "xcap";

    pub fn can_run(probe: &SystemProbe) -> bool {
        !probe.session_is_wayland() && probe.env_var("DISPLAY").is_some()
    }

    fn failed(reason: impl Into<String>) -> CaptureError {
        CaptureError::ScreenshotFailed {
            backend: Self::NAME.to_string(),
            reason:  reason.into(),
        }
    }

    fn capture_all_monitors() -> CaptureResult<ImageBuffer> {
        let monitors =
            Monitor::all().map_err(|e| Self::failed(format!("monitor enumeration: {}", e)))?;

        let frames = monitors
            .iter()
            .map(|m| m.capture_image())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| Self::failed(e.to_string()))?;

        debug!("xcap captured {} monitor(s)", frames.len());
        stitch(frames).map(ImageBuffer::new)
    }
}

/// Lays frames out horizontally, top-aligned
fn stitch(frames: Vec<RgbaImage>) -> CaptureResult<DynamicImage> {
    let mut frames = frames.into_iter();
    let Some(first) = frames.next() else {
        return Err(XcapBackend::failed("no monitors detected"));
    };

    let rest: Vec<RgbaImage> = frames.collect();
    if rest.is_empty() {
        return Ok(DynamicImage::ImageRgba8(first));
    }

    let width = first.width() + rest.iter().map(|f| f.width()).sum::<u32>();
    let height = rest.iter().map(|f| f.height()).fold(first.height(), u32::max);

    let mut canvas = RgbaImage::new(width, height);
    let mut offset = 0;
    for frame in std::iter::once(first).chain(rest) {
        canvas
            .copy_from(&frame, offset, 0)
            .map_err(|e| CaptureError::ImageError(e.to_string()))?;
        offset += frame.width();
    }

    Ok(DynamicImage::ImageRgba8(canvas))
}

#[async_trait]
impl CaptureBackend for XcapBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn capabilities(&self) -> CapabilityMap {
        CapabilityMap::new().with(Capability::CaptureFullscreen, Self::NAME)
    }

    async fn capture_fullscreen(&self, _capture_cursor: bool) -> CaptureResult<ImageBuffer> {
        // xcap talks to the X server synchronously
        let task = async {
            tokio::task::spawn_blocking(Self::capture_all_monitors)
                .await
                .map_err(|e| Self::failed(format!("capture task failed: {}", e)))?
        };
        with_timeout(Self::NAME, task, capture_timeout()).await
    }
}
