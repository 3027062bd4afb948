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

/// Full-screen capture through ImageMagick's `import`
#[derive(Debug, Clone)]
pub struct ImageMagickBackend {
    program: PathBuf,
}

impl ImageMagickBackend {
    pub const NAME: &'static str = "imagemagick";
    pub const EXECUTABLE: &'static str = "import";

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

    pub fn args(output: &Path) -> Vec<String> {
        vec![
            "-silent".to_string(),
            "-window".to_string(),
            "root".to_string(),
            output.display().to_string(),
        ]
    }
}

#[async_trait]
impl CaptureBackend for ImageMagickBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn capabilities(&self) -> CapabilityMap {
        CapabilityMap::new().with(Capability::CaptureFullscreen, Self::NAME)
    }

    async fn capture_fullscreen(&self, _capture_cursor: bool) -> CaptureResult<ImageBuffer> {
        capture_to_file(Self::NAME, &self.program, Self::args, capture_timeout()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args() {
        assert_eq!(
            ImageMagickBackend::args(Path::new("/tmp/x.png")),
            vec!["-silent", "-window", "root", "/tmp/x.png"]
        );
    }

    #[test]
    fn test_no_native_cursor() {
        let caps = ImageMagickBackend::new(PathBuf::from("import")).capabilities();
        assert!(!caps.contains(Capability::CursorCapture));
        assert_eq!(caps.provider(Capability::CaptureFullscreen), Some("imagemagick"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_output_is_a_failure() {
        let backend = ImageMagickBackend::new(PathBuf::from("/bin/true"));
        let err = backend.capture_fullscreen(false).await.unwrap_err();
        assert!(err.to_string().contains("wrote no image"));
    }
}
