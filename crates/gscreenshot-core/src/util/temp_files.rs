//! Scoped temporary files for exchanging images with external tools
//!
//! Capture tools write their output to a file whose name we choose. A
//! [`ScopedTempFile`] owns that path and deletes the file when dropped, on
//! every exit path including tool failure and decode errors. Files live in a
//! dedicated subdirectory of the system temporary directory.
//!
//! # Examples
//!
//! ```
//! use gscreenshot_core::util::temp_files::ScopedTempFile;
//!
//! let path = {
//!     let file = ScopedTempFile::for_process("doctest", "png").unwrap();
//!     std::fs::write(file.path(), b"not really a png").unwrap();
//!     file.path().to_path_buf()
//! };
//!
//! // The file is gone once the guard is dropped
//! assert!(!path.exists());
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::{CaptureError, CaptureResult};

/// Owns a temporary path and removes the file behind it on drop
///
/// The file itself is not created; the path is handed to a tool that
/// creates it. Cleanup is best-effort: errors are logged, never raised.
#[derive(Debug)]
pub struct ScopedTempFile {
    path: PathBuf,
    keep: bool,
}

impl ScopedTempFile {
    /// Gets the base directory for temporary files
    ///
    /// Returns `$TEMP_DIR/gscreenshot/`.
    pub fn temp_dir() -> PathBuf {
        std::env::temp_dir().join("gscreenshot")
    }

    /// Ensures the temp directory exists, creating it if necessary
    fn ensure_temp_dir() -> CaptureResult<PathBuf> {
        let dir = Self::temp_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(CaptureError::IoError)?;
        }
        Ok(dir)
    }

    /// Reserves `{prefix}-{pid}.{ext}` in the temp directory
    ///
    /// A stale file left at that path by an earlier run is removed first, so
    /// the existence of the file afterwards proves the tool wrote it.
    pub fn for_process(prefix: &str, ext: &str) -> CaptureResult<Self> {
        let dir = Self::ensure_temp_dir()?;
        let path = dir.join(format!("{}-{}.{}", prefix, std::process::id(), ext));

        if path.exists() {
            debug!("Removing stale temp file {}", path.display());
            fs::remove_file(&path).map_err(CaptureError::IoError)?;
        }

        Ok(Self { path, keep: false })
    }

    /// Reserves a unique timestamped path in the temp directory
    ///
    /// The filename format is `{prefix}-{timestamp}.{ext}`.
    pub fn with_timestamp(prefix: &str, ext: &str) -> CaptureResult<Self> {
        let dir = Self::ensure_temp_dir()?;

        let timestamp_str: String = Utc::now()
            .to_rfc3339()
            .chars()
            .map(|c| match c {
                ':' => '-',
                '+' | '.' => '_',
                _ => c,
            })
            .collect();

        let path = dir.join(format!("{}-{}.{}", prefix, timestamp_str, ext));
        Ok(Self { path, keep: false })
    }

    /// Takes ownership of a file created by someone else
    ///
    /// Used for files handed back by the desktop portal.
    pub fn adopt(path: PathBuf) -> Self {
        Self { path, keep: false }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the tool actually produced the file
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Disarms cleanup and returns the path
    pub fn keep(mut self) -> PathBuf {
        self.keep = true;
        std::mem::take(&mut self.path)
    }
}

impl Drop for ScopedTempFile {
    fn drop(&mut self) {
        if self.keep || !self.path.exists() {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("Failed to remove temp file {:?}: {}", self.path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_process_path_contains_pid() {
        let file = ScopedTempFile::for_process("pidtest", "png").unwrap();
        let name = file.path().file_name().unwrap().to_string_lossy().to_string();

        assert_eq!(name, format!("pidtest-{}.png", std::process::id()));
        assert!(file.path().starts_with(ScopedTempFile::temp_dir()));
        assert!(!file.exists());
    }

    #[test]
    fn test_for_process_removes_stale_file() {
        let first = ScopedTempFile::for_process("stale", "png").unwrap();
        fs::write(first.path(), b"old").unwrap();
        let path = first.keep();
        assert!(path.exists());

        let second = ScopedTempFile::for_process("stale", "png").unwrap();
        assert_eq!(second.path(), path.as_path());
        assert!(!second.exists());
    }

    #[test]
    fn test_drop_removes_file() {
        let file = ScopedTempFile::for_process("droptest", "png").unwrap();
        fs::write(file.path(), b"data").unwrap();
        let path = file.path().to_path_buf();
        assert!(path.exists());

        drop(file);
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_without_file_is_silent() {
        let file = ScopedTempFile::for_process("missing", "png").unwrap();
        drop(file);
    }

    #[test]
    fn test_keep_disarms_cleanup() {
        let file = ScopedTempFile::with_timestamp("keeptest", "png").unwrap();
        fs::write(file.path(), b"data").unwrap();

        let path = file.keep();
        assert!(path.exists());
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_adopt_removes_foreign_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portal-shot.png");
        fs::write(&path, b"data").unwrap();

        drop(ScopedTempFile::adopt(path.clone()));
        assert!(!path.exists());
    }

    #[test]
    fn test_timestamped_names_have_extension() {
        let file = ScopedTempFile::with_timestamp("ts", "jpg").unwrap();
        let name = file.path().to_string_lossy().to_string();
        assert!(name.contains("ts-"));
        assert!(name.ends_with(".jpg"));
        assert!(!name.contains(':'));
    }
}
