//! Full-screen capture through the xdg-desktop-portal Screenshot interface
//!
//! Works on any Wayland compositor that ships a portal implementation
//! (GNOME, KDE, wlroots via xdg-desktop-portal-wlr). The portal writes the
//! image to a file of its own choosing and hands back a `file://` URI; the
//! file is adopted as a [`ScopedTempFile`] so it is removed once decoded.

use async_trait::async_trait;
use ashpd::desktop::screenshot::Screenshot as PortalScreenshot;
use tracing::{debug, info};

use crate::{
    capture::{
        ImageBuffer, constants::capture_timeout, process::with_timeout, traits::CaptureBackend,
    },
    error::{CaptureError, CaptureResult},
    model::{Capability, CapabilityMap},
    util::{detect::SystemProbe, temp_files::ScopedTempFile},
};

/// Non-interactive Screenshot portal request
#[derive(Debug, Clone, Default)]
pub struct PortalBackend;

impl PortalBackend {
    pub const NAME: &'static str = "xdg-desktop-portal";

    /// The portal is reached over the session bus
    pub fn can_run(probe: &SystemProbe) -> bool {
        probe.session_is_wayland() && probe.env_var("DBUS_SESSION_BUS_ADDRESS").is_some()
    }

    fn failed(reason: impl Into<String>) -> CaptureError {
        CaptureError::ScreenshotFailed {
            backend: Self::NAME.to_string(),
            reason:  reason.into(),
        }
    }

    async fn request() -> CaptureResult<ImageBuffer> {
        info!("Requesting screenshot from the desktop portal");

        let response = PortalScreenshot::request()
            .interactive(false)
            .modal(false)
            .send()
            .await
            .map_err(|e| Self::failed(format!("portal unavailable: {}", e)))?
            .response()
            .map_err(|e| Self::failed(format!("request was denied or failed: {}", e)))?;

        let uri = response.uri();
        debug!("Portal returned {}", uri);

        if uri.scheme() != "file" {
            return Err(Self::failed(format!(
                "unsupported URI scheme '{}'",
                uri.scheme()
            )));
        }

        let path = uri
            .to_file_path()
            .map_err(|_| Self::failed(format!("URI is not a local path: {}", uri)))?;

        let file = ScopedTempFile::adopt(path);
        ImageBuffer::load(file.path())
    }
}

#[async_trait]
impl CaptureBackend for PortalBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn capabilities(&self) -> CapabilityMap {
        CapabilityMap::new().with(Capability::CaptureFullscreen, Self::NAME)
    }

    async fn capture_fullscreen(&self, _capture_cursor: bool) -> CaptureResult<ImageBuffer> {
        with_timeout(Self::NAME, Self::request(), capture_timeout()).await
    }
}
