use std::path::PathBuf;

use async_trait::async_trait;

use crate::{
    capture::{
        ImageBuffer, constants::capture_timeout, process::capture_from_stdout,
        traits::CaptureBackend,
    },
    error::CaptureResult,
    model::{Capability, CapabilityMap},
    util::detect::SystemProbe,
};

/// Full-screen capture through `grim` (wlroots Wayland compositors)
///
/// grim streams the PNG to stdout, so no temp file is involved.
#[derive(Debug, Clone)]
pub struct GrimBackend {
    program: PathBuf,
}

impl GrimBackend {
    pub const NAME: &'static str = "grim";

    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }

    pub fn can_run(probe: &SystemProbe) -> bool {
        probe.session_is_wayland() && probe.has_executable(Self::NAME)
    }

    pub fn from_probe(probe: &SystemProbe) -> Self {
        let program = probe
            .find_executable(Self::NAME)
            .unwrap_or_else(|| PathBuf::from(Self::NAME));
        Self::new(program)
    }

    pub fn args(capture_cursor: bool) -> Vec<String> {
        let mut args = vec!["-t".to_string(), "png".to_string()];
        if capture_cursor {
            args.push("-c".to_string());
        }
        args.push("-".to_string());
        args
    }
}

#[async_trait]
impl CaptureBackend for GrimBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn capabilities(&self) -> CapabilityMap {
        CapabilityMap::new()
            .with(Capability::CaptureFullscreen, Self::NAME)
            .with(Capability::CursorCapture, Self::NAME)
    }

    async fn capture_fullscreen(&self, capture_cursor: bool) -> CaptureResult<ImageBuffer> {
        capture_from_stdout(
            Self::NAME,
            &self.program,
            &Self::args(capture_cursor),
            capture_timeout(),
        )
        .await
    }
}
