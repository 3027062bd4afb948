//! Error types for screenshot capture operations
//!
//! Three families of errors live here:
//!
//! - [`CaptureError`]: failures of the capture machinery itself. Only
//!   [`CaptureError::NoSupportedBackend`] is ever fatal to a consumer; every
//!   other capture failure is recovered inside the orchestration core and
//!   turned into "no screenshot".
//! - [`SelectionError`]: outcomes of an interactive region selection that did
//!   not produce a rectangle. These never leave the orchestration core; each
//!   one selects a fallback path instead.
//! - [`ScreenshotActionError`]: failures of the user-requested final actions
//!   (save, copy, open). These are always surfaced to the caller.
//!
//! Like the rest of the crate, every user-facing error offers a
//! `remediation_hint()` with an actionable next step.

use std::path::PathBuf;

use crate::model::BackendKind;

/// Result type alias for capture operations
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Error type for capture, backend discovery and image processing
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// None of the candidates for a backend role can run in this session
    #[error("No supported {kind} found (tried: {})", candidates.join(", "))]
    NoSupportedBackend {
        /// Role that could not be filled
        kind:       BackendKind,
        /// Names of every candidate that was probed, in priority order
        candidates: Vec<String>,
    },

    /// A capture backend ran but produced no usable image
    #[error("Screenshot backend '{backend}' failed: {reason}")]
    ScreenshotFailed {
        /// Display name of the backend
        backend: String,
        /// Diagnostic output or a description of what went wrong
        reason:  String,
    },

    /// An external tool could not be started
    #[error("Failed to run '{tool}': {source}")]
    ToolSpawnFailed {
        /// Executable name
        tool:   String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// An external tool did not finish in time and was killed
    #[error("'{tool}' timed out after {duration_ms}ms")]
    CaptureTimeout {
        /// Executable or backend name
        tool:        String,
        /// Timeout duration in milliseconds
        duration_ms: u64,
    },

    /// Invalid parameter provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: String,
        /// Reason why it's invalid
        reason:    String,
    },

    /// Image encoding failed
    #[error("Failed to encode image as {format}: {reason}")]
    EncodingFailed {
        /// Image format that failed
        format: String,
        /// Reason for encoding failure
        reason: String,
    },

    /// Image decoding or processing error
    #[error("Image processing error: {0}")]
    ImageError(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CaptureError {
    /// Returns an actionable remediation hint for this error
    ///
    /// # Examples
    ///
    /// ```
    /// use gscreenshot_core::{error::CaptureError, model::BackendKind};
    ///
    /// let error = CaptureError::NoSupportedBackend {
    ///     kind:       BackendKind::Screenshooter,
    ///     candidates: vec!["scrot".to_string(), "import".to_string()],
    /// };
    ///
    /// assert!(error.remediation_hint().contains("scrot, import"));
    /// ```
    pub fn remediation_hint(&self) -> String {
        match self {
            CaptureError::NoSupportedBackend { kind, candidates } => {
                if candidates.is_empty() {
                    format!("No {} is available for this platform.", kind)
                } else {
                    format!(
                        "Install one of the following and make sure it is on your PATH: {}",
                        candidates.join(", ")
                    )
                }
            }
            CaptureError::ScreenshotFailed { .. } => {
                "The capture tool did not produce an image. Run it by hand to see its error \
                 output, and check that it supports your session type (X11 or Wayland)."
                    .to_string()
            }
            CaptureError::ToolSpawnFailed { tool, .. } => {
                format!("Check that '{}' is installed and executable.", tool)
            }
            CaptureError::CaptureTimeout { .. } => {
                "The tool took too long. Close any stuck selection overlay or permission dialog \
                 and retry, or raise GSCREENSHOT_CAPTURE_TIMEOUT_SECS."
                    .to_string()
            }
            CaptureError::InvalidParameter { parameter, .. } => match parameter.as_str() {
                "region" => "Regions are given as X,Y,W,H with a positive width and height and \
                             must overlap the captured image."
                    .to_string(),
                "delay" => "Delay must be a non-negative number of seconds.".to_string(),
                _ => "Check the parameter value and retry.".to_string(),
            },
            CaptureError::EncodingFailed { format, .. } => format!(
                "Encoding as {} failed. Try saving as PNG instead.",
                format
            ),
            CaptureError::ImageError(_) => {
                "Image processing failed. Ensure the capture tool writes a supported image \
                 format (PNG is always supported)."
                    .to_string()
            }
            CaptureError::IoError(_) => {
                "An I/O error occurred. Check file permissions, disk space, and that the \
                 temporary directory is writable."
                    .to_string()
            }
        }
    }
}

/// Why an interactive selection did not yield a rectangle
///
/// All variants are recovered by the orchestration core, which falls back to
/// a full-screen capture. They are kept distinct so the fallback can be
/// logged with the right severity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// The user dismissed the selection overlay
    #[error("Selection was cancelled")]
    Cancelled,

    /// The selection tool is missing, crashed, or timed out
    #[error("Selection tool '{tool}' failed: {reason}")]
    ExecFailed {
        /// Tool or selector name
        tool:   String,
        /// What went wrong
        reason: String,
    },

    /// The selection tool printed something that is not a rectangle
    #[error("Could not parse selection output: {output:?}")]
    ParseFailed {
        /// The raw output that failed to parse
        output: String,
    },
}

/// Failure of a user-requested action on a finished screenshot
#[derive(Debug, thiserror::Error)]
pub enum ScreenshotActionError {
    /// There is no current screenshot to act on
    #[error("No screenshot has been taken")]
    NoScreenshot,

    /// Writing the image to disk failed
    #[error("Failed to save screenshot to {}: {reason}", path.display())]
    Save {
        /// Destination path
        path:   PathBuf,
        /// Why it failed
        reason: String,
    },

    /// Copying the image to the clipboard failed
    #[error("Failed to copy screenshot to the clipboard: {reason}")]
    Clipboard {
        /// Why it failed
        reason: String,
    },

    /// Opening the image in an external viewer failed
    #[error("Failed to open screenshot: {reason}")]
    Open {
        /// Why it failed
        reason: String,
    },

    /// Underlying capture or encoding error
    #[error(transparent)]
    Capture(#[from] CaptureError),
}

impl ScreenshotActionError {
    /// Returns an actionable remediation hint for this error
    pub fn remediation_hint(&self) -> String {
        match self {
            ScreenshotActionError::NoScreenshot => {
                "Take a screenshot first.".to_string()
            }
            ScreenshotActionError::Save { .. } => {
                "Check that the target directory exists and is writable, and that the file \
                 extension is one of png, jpg, jpeg, webp, bmp, gif, tif or tiff."
                    .to_string()
            }
            ScreenshotActionError::Clipboard { .. } => {
                "Install wl-clipboard (Wayland) or xclip (X11) to copy images to the clipboard."
                    .to_string()
            }
            ScreenshotActionError::Open { .. } => {
                "Install xdg-utils and configure a default image viewer.".to_string()
            }
            ScreenshotActionError::Capture(e) => e.remediation_hint(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_supported_backend_message_lists_candidates() {
        let error = CaptureError::NoSupportedBackend {
            kind:       BackendKind::Screenshooter,
            candidates: vec!["grim".to_string(), "xdg-desktop-portal".to_string()],
        };

        let msg = error.to_string();
        assert!(msg.contains("screenshooter"));
        assert!(msg.contains("grim, xdg-desktop-portal"));

        let hint = error.remediation_hint();
        assert!(hint.contains("Install one of"));
        assert!(hint.contains("grim"));
    }

    #[test]
    fn test_no_supported_backend_without_candidates() {
        let error = CaptureError::NoSupportedBackend {
            kind:       BackendKind::RegionSelector,
            candidates: Vec::new(),
        };

        assert!(error.remediation_hint().contains("region selector"));
    }

    #[test]
    fn test_screenshot_failed_message() {
        let error = CaptureError::ScreenshotFailed {
            backend: "scrot".to_string(),
            reason:  "Can't open X display".to_string(),
        };

        let msg = error.to_string();
        assert!(msg.contains("scrot"));
        assert!(msg.contains("Can't open X display"));
    }

    #[test]
    fn test_capture_timeout_message() {
        let error = CaptureError::CaptureTimeout {
            tool:        "slop".to_string(),
            duration_ms: 60_000,
        };

        assert!(error.to_string().contains("60000"));
        assert!(error.remediation_hint().contains("GSCREENSHOT_CAPTURE_TIMEOUT_SECS"));
    }

    #[test]
    fn test_invalid_region_remediation() {
        let error = CaptureError::InvalidParameter {
            parameter: "region".to_string(),
            reason:    "zero width".to_string(),
        };

        assert!(error.remediation_hint().contains("X,Y,W,H"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: CaptureError = io_error.into();

        assert!(error.to_string().contains("I/O error"));
    }

    #[test]
    fn test_selection_error_variants_are_distinct() {
        let cancelled = SelectionError::Cancelled;
        let exec = SelectionError::ExecFailed {
            tool:   "slurp".to_string(),
            reason: "exit status 127".to_string(),
        };
        let parse = SelectionError::ParseFailed {
            output: "garbage".to_string(),
        };

        assert_ne!(cancelled, exec);
        assert!(exec.to_string().contains("slurp"));
        assert!(parse.to_string().contains("garbage"));
    }

    #[test]
    fn test_action_error_wraps_capture_error() {
        let error: ScreenshotActionError = CaptureError::EncodingFailed {
            format: "webp".to_string(),
            reason: "encoder error".to_string(),
        }
        .into();

        assert!(error.to_string().contains("webp"));
        assert!(error.remediation_hint().contains("PNG"));
    }

    #[test]
    fn test_clipboard_hint_names_tools() {
        let error = ScreenshotActionError::Clipboard {
            reason: "wl-copy not found".to_string(),
        };

        let hint = error.remediation_hint();
        assert!(hint.contains("wl-clipboard"));
        assert!(hint.contains("xclip"));
    }
}
