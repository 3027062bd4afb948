//! Clipboard and file-opener integration
//!
//! Both go through external helpers: `wl-copy` on Wayland, `xclip` on X11,
//! and `xdg-open` everywhere.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{
    capture::{constants::desktop_helper_timeout, process::run_detached},
    error::ScreenshotActionError,
    model::ImageFormat,
    util::detect::SystemProbe,
};

/// A helper invocation: program plus arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperCommand {
    pub program: PathBuf,
    pub args:    Vec<String>,
}

/// Command that puts an image of `format` on the clipboard from stdin
///
/// Returns `None` when the session's clipboard tool is not installed.
pub fn clipboard_command(probe: &SystemProbe, format: ImageFormat) -> Option<HelperCommand> {
    if probe.session_is_wayland() {
        let program = probe.find_executable("wl-copy")?;
        return Some(HelperCommand {
            program,
            args: vec!["--type".to_string(), format.mime_type().to_string()],
        });
    }

    let program = probe.find_executable("xclip")?;
    Some(HelperCommand {
        program,
        args: vec![
            "-selection".to_string(),
            "clipboard".to_string(),
            "-t".to_string(),
            format.mime_type().to_string(),
            "-i".to_string(),
        ],
    })
}

/// Puts encoded image bytes on the clipboard
pub async fn copy_to_clipboard(
    probe: &SystemProbe,
    bytes: &[u8],
    format: ImageFormat,
) -> Result<(), ScreenshotActionError> {
    let Some(command) = clipboard_command(probe, format) else {
        let tool = if probe.session_is_wayland() {
            "wl-copy"
        } else {
            "xclip"
        };
        return Err(ScreenshotActionError::Clipboard {
            reason: format!("'{}' is not installed", tool),
        });
    };

    debug!("Copying {} bytes via {}", bytes.len(), command.program.display());

    let status = run_detached(
        &command.program,
        &command.args,
        Some(bytes),
        desktop_helper_timeout(),
    )
    .await
    .map_err(|e| ScreenshotActionError::Clipboard {
        reason: e.to_string(),
    })?;

    if !status.success() {
        return Err(ScreenshotActionError::Clipboard {
            reason: format!("{} exited with {}", command.program.display(), status),
        });
    }

    info!("Screenshot copied to the clipboard");
    Ok(())
}

/// Opens `path` with the desktop's default application
pub async fn open_with_default_app(
    probe: &SystemProbe,
    path: &Path,
) -> Result<(), ScreenshotActionError> {
    let program = probe
        .find_executable("xdg-open")
        .ok_or_else(|| ScreenshotActionError::Open {
            reason: "'xdg-open' is not installed".to_string(),
        })?;

    let status = run_detached(
        &program,
        &[path.as_os_str()],
        None,
        desktop_helper_timeout(),
    )
    .await
    .map_err(|e| ScreenshotActionError::Open {
        reason: e.to_string(),
    })?;

    if !status.success() {
        return Err(ScreenshotActionError::Open {
            reason: format!("xdg-open exited with {}", status),
        });
    }

    info!("Opened {}", path.display());
    Ok(())
}
