use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{
    capture::{
        ImageBuffer, constants::capture_timeout, process::capture_to_file, traits::CaptureBackend,
    },
    error::CaptureResult,
    model::{Capability, CapabilityMap},
    util::detect::SystemProbe,
};

/// Full-screen capture through `imlib2_grab`
#[derive(Debug, Clone)]
pub struct Imlib2Backend {
    program: PathBuf,
}

impl Imlib2Backend {
    pub const NAME: &'static str = "imlib2";
    pub const EXECUTABLE: &'static str = "imlib2_grab";

    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }

    pub fn can_run(probe: &SystemProbe) -> bool {
        !probe.session_is_wayland() && probe.has_executable(Self::EXECUTABLE)
    }

    pub fn from_probe(probe: &SystemProbe) -> Self {
        let program = probe
            .find_executable(Self::EXECUTABLE)
            .unwrap_or_else(|| PathBuf::from(Self::EXECUTABLE));
        Self::new(program)
    }
}

#[async_trait]
impl CaptureBackend for Imlib2Backend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn capabilities(&self) -> CapabilityMap {
        CapabilityMap::new().with(Capability::CaptureFullscreen, Self::NAME)
    }

    async fn capture_fullscreen(&self, _capture_cursor: bool) -> CaptureResult<ImageBuffer> {
        capture_to_file(
            Self::NAME,
            &self.program,
            |path: &Path| vec![path.display().to_string()],
            capture_timeout(),
        )
        .await
    }
}
