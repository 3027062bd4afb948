use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::{
    capture::{
        constants::selection_timeout,
        selector::{SELECTION_FORMAT, parse_selection_output, run_selection_tool},
        traits::CursorLocator,
    },
    error::SelectionError,
    model::{Capability, CapabilityMap},
    util::detect::SystemProbe,
};

/// Asks the user to click where the cursor should be drawn, via `slurp -p`
#[derive(Debug, Clone)]
pub struct SlurpPointLocator {
    program: PathBuf,
}

impl SlurpPointLocator {
    pub const NAME: &'static str = "slurp";

    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }

    pub fn can_run(probe: &SystemProbe) -> bool {
        probe.has_executable(Self::NAME)
    }

    pub fn from_probe(probe: &SystemProbe) -> Self {
        let program = probe
            .find_executable(Self::NAME)
            .unwrap_or_else(|| PathBuf::from(Self::NAME));
        Self::new(program)
    }

    pub fn args() -> Vec<String> {
        vec!["-p".to_string(), "-f".to_string(), SELECTION_FORMAT.to_string()]
    }
}

#[async_trait]
impl CursorLocator for SlurpPointLocator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn capabilities(&self) -> CapabilityMap {
        CapabilityMap::new().with(Capability::AlternateCursor, Self::NAME)
    }

    async fn cursor_position(&self) -> Option<(i32, i32)> {
        let result = run_selection_tool(&self.program, &Self::args(), selection_timeout())
            .await
            .and_then(|lines| parse_selection_output(&lines, 1.0));

        match result {
            Ok(region) => Some((region.left, region.top)),
            Err(SelectionError::Cancelled) => {
                info!("Cursor placement cancelled, no cursor will be drawn");
                None
            }
            Err(e) => {
                debug!("Cursor placement failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args() {
        assert_eq!(SlurpPointLocator::args(), vec!["-p", "-f", "X=%x,Y=%y,W=%w,H=%h"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_position_and_scaling() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let program = dir.path().join("slurp");
        std::fs::write(&program, "#!/bin/sh\necho 'X=100,Y=200,W=1,H=1'\n").unwrap();
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();

        let locator = SlurpPointLocator::new(program);
        assert_eq!(locator.cursor_position().await, Some((100, 200)));
        assert_eq!(locator.cursor_position_adjusted(2.0).await, Some((200, 400)));
    }

    #[tokio::test]
    async fn test_missing_tool_yields_none() {
        let locator = SlurpPointLocator::new(PathBuf::from("/nonexistent/slurp"));
        assert_eq!(locator.cursor_position().await, None);
    }
}
