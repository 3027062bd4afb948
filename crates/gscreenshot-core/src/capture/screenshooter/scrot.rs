use std::path::PathBuf;

use async_trait::async_trait;

use crate::{
    capture::{
        ImageBuffer, constants::capture_timeout, process::capture_to_file, traits::CaptureBackend,
    },
    error::CaptureResult,
    model::{Capability, CapabilityMap},
    util::detect::SystemProbe,
};

/// Full-screen capture through `scrot`
///
/// scrot can burn the pointer into the image itself (`-p`), so cursor
/// capture never needs a stamp effect here.
#[derive(Debug, Clone)]
pub struct ScrotBackend {
    program: PathBuf,
}

impl ScrotBackend {
    pub const NAME: &'static str = "scrot";

    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }

    pub fn can_run(probe: &SystemProbe) -> bool {
        !probe.session_is_wayland() && probe.has_executable(Self::NAME)
    }

    pub fn from_probe(probe: &SystemProbe) -> Self {
        let program = probe
            .find_executable(Self::NAME)
            .unwrap_or_else(|| PathBuf::from(Self::NAME));
        Self::new(program)
    }

    /// `-z` keeps scrot from beeping
    pub fn args(output: &std::path::Path, capture_cursor: bool) -> Vec<String> {
        let mut args = vec!["-z".to_string()];
        if capture_cursor {
            args.push("-p".to_string());
        }
        args.push(output.display().to_string());
        args
    }
}

#[async_trait]
impl CaptureBackend for ScrotBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn capabilities(&self) -> CapabilityMap {
        CapabilityMap::new()
            .with(Capability::CaptureFullscreen, Self::NAME)
            .with(Capability::CursorCapture, Self::NAME)
    }

    async fn capture_fullscreen(&self, capture_cursor: bool) -> CaptureResult<ImageBuffer> {
        capture_to_file(
            Self::NAME,
            &self.program,
            |path| Self::args(path, capture_cursor),
            capture_timeout(),
        )
        .await
    }
}
