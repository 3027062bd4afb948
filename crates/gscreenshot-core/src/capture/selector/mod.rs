//! Interactive region selectors
//!
//! Process-based selectors (slop, slurp) print the chosen rectangle with a
//! `-f X=%x,Y=%y,W=%w,H=%h` format string. [`parse_selection_output`] turns
//! that output into a [`Region`], and [`run_selection_tool`] maps the tool's
//! exit behaviour onto [`SelectionError`]:
//!
//! | Outcome | Result |
//! |---------|--------|
//! | exit 0 | stdout lines, parsed by the caller |
//! | non-zero exit, stderr mentions "cancel" | [`SelectionError::Cancelled`] |
//! | non-zero exit otherwise, spawn failure, timeout | [`SelectionError::ExecFailed`] |

use std::{collections::HashMap, path::Path, time::Duration};

use tracing::debug;

use super::process::{run_tool, tool_name};
use crate::{
    error::{CaptureError, SelectionError},
    model::Region,
};

mod slop;
mod slurp;
#[cfg(target_os = "linux")]
mod x11_select;

pub use slop::SlopSelector;
pub use slurp::SlurpSelector;
#[cfg(target_os = "linux")]
pub use x11_select::X11RubberBandSelector;

/// Format string handed to slop and slurp
pub const SELECTION_FORMAT: &str = "X=%x,Y=%y,W=%w,H=%h";

/// Parses selector output into a scaled region
///
/// Accepts the four `KEY=value` pairs on one comma-separated line or spread
/// over several lines, ignoring anything that is not a pair. Later values
/// win if a key repeats.
///
/// # Examples
///
/// ```
/// use gscreenshot_core::capture::selector::parse_selection_output;
///
/// let region = parse_selection_output(&["X=1,Y=2,W=3,H=4"], 1.0).unwrap();
/// assert_eq!(region.as_tuple(), (1, 2, 4, 6));
///
/// let region = parse_selection_output(&["garbage", "X=1", "Y=2", "W=3", "H=4"], 2.0).unwrap();
/// assert_eq!(region.as_tuple(), (2, 4, 8, 12));
/// ```
pub fn parse_selection_output<S>(lines: &[S], scale: f64) -> Result<Region, SelectionError>
where
    S: AsRef<str>,
{
    let mut values: HashMap<String, i32> = HashMap::new();

    for line in lines {
        for pair in line.as_ref().split(',') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            let Ok(value) = value.trim().parse::<f64>() else {
                continue;
            };
            values.insert(key.trim().to_ascii_uppercase(), value.round() as i32);
        }
    }

    let get = |key: &str| values.get(key).copied();
    match (get("X"), get("Y"), get("W"), get("H")) {
        (Some(x), Some(y), Some(w), Some(h)) => Ok(Region::from_xywh(x, y, w, h).scaled(scale)),
        _ => Err(SelectionError::ParseFailed {
            output: lines
                .iter()
                .map(|l| l.as_ref())
                .collect::<Vec<_>>()
                .join("\n"),
        }),
    }
}

/// Runs a selection tool and returns its stdout lines
pub async fn run_selection_tool(
    program: &Path,
    args: &[String],
    timeout: Duration,
) -> Result<Vec<String>, SelectionError> {
    let tool = tool_name(program);

    let output = run_tool(program, args, None, timeout)
        .await
        .map_err(|e| exec_failed(&tool, &e))?;

    if !output.success() {
        let stderr = output.stderr_text();
        if stderr.to_ascii_lowercase().contains("cancel") {
            debug!("{} reported cancellation: {}", tool, stderr.trim());
            return Err(SelectionError::Cancelled);
        }
        return Err(SelectionError::ExecFailed {
            tool,
            reason: format!("{}: {}", output.status, output.diagnostic()),
        });
    }

    let lines: Vec<String> = output.stdout_text().lines().map(str::to_string).collect();
    debug!("{} printed {:?}", tool, lines);
    Ok(lines)
}

fn exec_failed(tool: &str, error: &CaptureError) -> SelectionError {
    SelectionError::ExecFailed {
        tool:   tool.to_string(),
        reason: error.to_string(),
    }
}
