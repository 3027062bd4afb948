//! Centralized timeout and sizing constants for the capture pipeline.
//!
//! # Runtime Configuration
//!
//! Timeouts can be overridden at runtime via environment variables:
//!
//! | Environment Variable | Default | Description |
//! |---------------------|---------|-------------|
//! | `GSCREENSHOT_SELECTION_TIMEOUT_SECS` | 60 | Interactive selection tools (slop, slurp, rubber band) |
//! | `GSCREENSHOT_CAPTURE_TIMEOUT_SECS` | 30 | Non-interactive capture tools and portal requests |
//!
//! Values that do not parse as a positive integer fall back to the default.
//!
//! # Timeout Philosophy
//!
//! Interactive selection waits on a human, so it gets the longer budget.
//! Capture tools normally finish in well under a second; the capture
//! timeout exists to catch hung tools, and also covers portal requests
//! that may pop up a permission dialog on first use.

use std::time::Duration;

/// Default timeout for interactive selection tools, in seconds.
///
/// Used by: slop, slurp, the in-process X11 rubber band, slurp point picking
pub const SELECTION_TIMEOUT_SECS: u64 = 60;

/// Default timeout for capture tools, in seconds.
///
/// Used by: scrot, import, imlib2_grab, grim, xdg-desktop-portal, xcap
pub const CAPTURE_TIMEOUT_SECS: u64 = 30;

/// Timeout for clipboard and viewer helpers, in seconds.
pub const DESKTOP_HELPER_TIMEOUT_SECS: u64 = 10;

/// Edge length of the built-in cursor glyphs, in pixels.
pub const CURSOR_GLYPH_SIZE: u32 = 64;

/// Image width at which a stamped glyph is drawn at its native size.
pub const GLYPH_REFERENCE_WIDTH: u32 = 1920;

/// Smallest scale applied to a stamped glyph.
///
/// Keeps glyphs visible (and non-degenerate) on very small captures.
pub const MIN_GLYPH_SCALE: f64 = 0.25;

// =============================================================================
// Environment Variable Overrides
// =============================================================================

/// Helper to get a timeout from environment variable or fall back to default.
fn get_timeout_from_env(env_var: &str, default: u64) -> u64 {
    std::env::var(env_var)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(default)
}

/// Get the selection timeout, checking environment variable override.
///
/// Override with: `GSCREENSHOT_SELECTION_TIMEOUT_SECS`
///
/// # Example
///
/// ```bash
/// # Give users two minutes to draw a region
/// export GSCREENSHOT_SELECTION_TIMEOUT_SECS=120
/// ```
pub fn selection_timeout() -> Duration {
    Duration::from_secs(get_timeout_from_env(
        "GSCREENSHOT_SELECTION_TIMEOUT_SECS",
        SELECTION_TIMEOUT_SECS,
    ))
}

/// Get the capture timeout, checking environment variable override.
///
/// Override with: `GSCREENSHOT_CAPTURE_TIMEOUT_SECS`
pub fn capture_timeout() -> Duration {
    Duration::from_secs(get_timeout_from_env(
        "GSCREENSHOT_CAPTURE_TIMEOUT_SECS",
        CAPTURE_TIMEOUT_SECS,
    ))
}

/// Timeout for clipboard and `xdg-open` helpers.
pub fn desktop_helper_timeout() -> Duration {
    Duration::from_secs(DESKTOP_HELPER_TIMEOUT_SECS)
}

#[cfg(test)]
#[allow(clippy::assertions_on_constants)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_sanity() {
        assert!(CAPTURE_TIMEOUT_SECS > 0);
        assert!(SELECTION_TIMEOUT_SECS > CAPTURE_TIMEOUT_SECS);
        assert!(DESKTOP_HELPER_TIMEOUT_SECS < CAPTURE_TIMEOUT_SECS);
    }

    #[test]
    fn test_glyph_constants() {
        assert!(MIN_GLYPH_SCALE > 0.0);
        assert!(CURSOR_GLYPH_SIZE > 0);
        assert!(GLYPH_REFERENCE_WIDTH >= CURSOR_GLYPH_SIZE);
    }

    #[test]
    fn test_env_override_defaults() {
        temp_env::with_vars_unset(
            ["GSCREENSHOT_SELECTION_TIMEOUT_SECS", "GSCREENSHOT_CAPTURE_TIMEOUT_SECS"],
            || {
                assert_eq!(selection_timeout(), Duration::from_secs(60));
                assert_eq!(capture_timeout(), Duration::from_secs(30));
            },
        );
    }

    #[test]
    fn test_env_override_with_value() {
        temp_env::with_var("GSCREENSHOT_SELECTION_TIMEOUT_SECS", Some("120"), || {
            assert_eq!(selection_timeout(), Duration::from_secs(120));
        });

        temp_env::with_var("GSCREENSHOT_CAPTURE_TIMEOUT_SECS", Some(" 5 "), || {
            assert_eq!(capture_timeout(), Duration::from_secs(5));
        });
    }

    #[test]
    fn test_env_override_invalid_value() {
        temp_env::with_var("GSCREENSHOT_SELECTION_TIMEOUT_SECS", Some("soon"), || {
            assert_eq!(selection_timeout(), Duration::from_secs(SELECTION_TIMEOUT_SECS));
        });

        temp_env::with_var("GSCREENSHOT_CAPTURE_TIMEOUT_SECS", Some("0"), || {
            assert_eq!(capture_timeout(), Duration::from_secs(CAPTURE_TIMEOUT_SECS));
        });

        temp_env::with_var("GSCREENSHOT_CAPTURE_TIMEOUT_SECS", Some("-1"), || {
            assert_eq!(capture_timeout(), Duration::from_secs(CAPTURE_TIMEOUT_SECS));
        });
    }
}
