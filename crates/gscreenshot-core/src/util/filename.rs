//! Save-target resolution for screenshots
//!
//! Filenames may contain strftime placeholders (`%Y-%m-%d`), which are
//! filled in with the local time. A directory target gets the default
//! filename pattern appended.

use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local, TimeZone};

use crate::{
    error::{CaptureError, CaptureResult},
    model::ImageFormat,
};

/// Default filename pattern for saved screenshots
pub const DEFAULT_FILENAME_PATTERN: &str = "gscreenshot_%Y-%m-%d-%H%M%S.png";

/// Expands strftime placeholders in `template`
///
/// Templates chrono cannot format (such as a dangling `%`) are returned
/// unchanged.
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
/// use gscreenshot_core::util::filename::interpolate;
///
/// let when = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
/// assert_eq!(interpolate("shot_%Y-%m-%d-%H%M%S.png", &when), "shot_2024-03-09-140507.png");
/// ```
pub fn interpolate<Tz>(template: &str, when: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    match write!(out, "{}", when.format(template)) {
        Ok(()) => out,
        Err(_) => template.to_string(),
    }
}

/// Default filename for the current local time
pub fn default_filename() -> String {
    interpolate(DEFAULT_FILENAME_PATTERN, &Local::now())
}

/// Resolves a user-supplied save target to a concrete path and format
///
/// - placeholders in the target are expanded
/// - an existing directory (or a target ending in `/`) gets the default
///   filename appended
/// - the format comes from the extension; a missing or unknown extension
///   is an error
pub fn resolve_save_target<Tz>(target: &Path, when: &DateTime<Tz>) -> CaptureResult<(PathBuf, ImageFormat)>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let raw = target.to_string_lossy();
    let expanded = PathBuf::from(interpolate(&raw, when));

    let path = if expanded.is_dir() || raw.ends_with(std::path::MAIN_SEPARATOR) {
        expanded.join(interpolate(DEFAULT_FILENAME_PATTERN, when))
    } else {
        expanded
    };

    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageFormat::from_extension)
        .ok_or_else(|| CaptureError::InvalidParameter {
            parameter: "filename".to_string(),
            reason:    format!(
                "'{}' does not end in a supported extension ({})",
                path.display(),
                ImageFormat::EXTENSIONS.join(", ")
            ),
        })?;

    Ok((path, format))
}

/// Like [`resolve_save_target`] at the current local time
pub fn resolve_save_target_now(target: &Path) -> CaptureResult<(PathBuf, ImageFormat)> {
    resolve_save_target(target, &Local::now())
}
