//! Running external capture and selection tools
//!
//! Every tool is spawned with `kill_on_drop`, so a timed-out or abandoned
//! call never leaves a stray process behind. Tools that write an image file
//! get a [`ScopedTempFile`] path; tools that stream the image to stdout are
//! decoded straight from memory.

use std::{
    ffi::OsStr,
    path::Path,
    process::{ExitStatus, Stdio},
    time::Duration,
};

use tokio::{io::AsyncWriteExt, process::Command};
use tracing::{debug, warn};

use super::ImageBuffer;
use crate::{
    error::{CaptureError, CaptureResult},
    util::temp_files::ScopedTempFile,
};

/// Collected result of a finished tool
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Whatever the tool printed, stderr first, trimmed
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr_text();
        let stdout = self.stdout_text();
        [stderr.trim(), stdout.trim()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Bounds `future` by `timeout`, mapping expiry to [`CaptureError::CaptureTimeout`]
pub async fn with_timeout<F, T>(tool: &str, future: F, timeout: Duration) -> CaptureResult<T>
where
    F: std::future::Future<Output = CaptureResult<T>>,
{
    tokio::time::timeout(timeout, future).await.map_err(|_| {
        warn!("'{}' timed out after {}ms", tool, timeout.as_millis());
        CaptureError::CaptureTimeout {
            tool:        tool.to_string(),
            duration_ms: timeout.as_millis() as u64,
        }
    })?
}

/// Runs `program` to completion and collects its output
///
/// `stdin`, when given, is written to the tool's standard input and then
/// closed. A non-zero exit is not an error here; callers decide what it
/// means.
pub async fn run_tool<S>(
    program: &Path,
    args: &[S],
    stdin: Option<&[u8]>,
    timeout: Duration,
) -> CaptureResult<ToolOutput>
where
    S: AsRef<OsStr>,
{
    let tool = tool_name(program);
    debug!(
        "Running {} {}",
        program.display(),
        args.iter()
            .map(|a| a.as_ref().to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let mut child = Command::new(program)
        .args(args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| CaptureError::ToolSpawnFailed {
            tool: tool.clone(),
            source,
        })?;

    let feed = child.stdin.take();

    with_timeout(
        &tool,
        async move {
            if let (Some(mut pipe), Some(data)) = (feed, stdin) {
                pipe.write_all(data).await?;
                pipe.shutdown().await?;
            }
            let output = child.wait_with_output().await?;
            Ok(ToolOutput {
                status: output.status,
                stdout: output.stdout,
                stderr: output.stderr,
            })
        },
        timeout,
    )
    .await
}

/// Runs a tool that writes a full-screen image to a file path
///
/// `build_args` receives the temp file path, which is named after the
/// backend and the process id. The capture fails when the tool
/// exits non-zero or exits cleanly without writing the file; either way the
/// temp file is removed.
pub async fn capture_to_file<F>(
    backend: &str,
    program: &Path,
    build_args: F,
    timeout: Duration,
) -> CaptureResult<ImageBuffer>
where
    F: FnOnce(&Path) -> Vec<String>,
{
    let file = ScopedTempFile::for_process(&format!("gscreenshot-{}", backend), "png")?;
    let args = build_args(file.path());

    let output = run_tool(program, &args, None, timeout).await?;

    if !output.success() {
        return Err(CaptureError::ScreenshotFailed {
            backend: backend.to_string(),
            reason:  format!("{}: {}", output.status, or_silent(output.diagnostic())),
        });
    }

    if !file.exists() {
        let diagnostic = output.diagnostic();
        let reason = if diagnostic.is_empty() {
            "exited successfully but wrote no image".to_string()
        } else {
            format!("wrote no image: {}", diagnostic)
        };
        return Err(CaptureError::ScreenshotFailed {
            backend: backend.to_string(),
            reason,
        });
    }

    let image = ImageBuffer::load(file.path())?;
    debug!("{} captured {}x{}", backend, image.width(), image.height());
    Ok(image)
}

/// Runs a tool that streams an encoded image to stdout
pub async fn capture_from_stdout<S>(
    backend: &str,
    program: &Path,
    args: &[S],
    timeout: Duration,
) -> CaptureResult<ImageBuffer>
where
    S: AsRef<OsStr>,
{
    let output = run_tool(program, args, None, timeout).await?;

    if !output.success() {
        return Err(CaptureError::ScreenshotFailed {
            backend: backend.to_string(),
            reason:  format!("{}: {}", output.status, or_silent(output.stderr_text())),
        });
    }

    if output.stdout.is_empty() {
        return Err(CaptureError::ScreenshotFailed {
            backend: backend.to_string(),
            reason:  format!("no image on stdout: {}", or_silent(output.stderr_text())),
        });
    }

    ImageBuffer::from_encoded(&output.stdout)
}

/// Runs a desktop helper that may leave a background process behind
///
/// Clipboard tools such as `xclip` and `wl-copy` fork a daemon that keeps
/// serving the selection and inherits the tool's stdio. Output is therefore
/// discarded rather than collected, and only the direct child's exit
/// status is awaited.
pub async fn run_detached<S>(
    program: &Path,
    args: &[S],
    stdin: Option<&[u8]>,
    timeout: Duration,
) -> CaptureResult<ExitStatus>
where
    S: AsRef<OsStr>,
{
    let tool = tool_name(program);
    debug!("Running {} detached", program.display());

    let mut child = Command::new(program)
        .args(args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| CaptureError::ToolSpawnFailed {
            tool: tool.clone(),
            source,
        })?;

    let feed = child.stdin.take();

    with_timeout(
        &tool,
        async move {
            if let (Some(mut pipe), Some(data)) = (feed, stdin) {
                pipe.write_all(data).await?;
                pipe.shutdown().await?;
            }
            Ok(child.wait().await?)
        },
        timeout,
    )
    .await
}

/// Executable file name, for messages
pub fn tool_name(program: &Path) -> String {
    program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string())
}

fn or_silent(text: String) -> String {
    let text = text.trim().to_string();
    if text.is_empty() {
        "(no output)".to_string()
    } else {
        text
    }
}
