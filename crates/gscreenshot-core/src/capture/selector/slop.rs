use std::path::PathBuf;

use async_trait::async_trait;

use super::{SELECTION_FORMAT, parse_selection_output, run_selection_tool};
use crate::{
    capture::{constants::selection_timeout, traits::RegionSelector},
    error::SelectionError,
    model::{Capability, CapabilityMap, Region, SelectionColor},
    util::detect::SystemProbe,
};

/// Region selection through `slop` (X11)
#[derive(Debug, Clone)]
pub struct SlopSelector {
    program: PathBuf,
    scale:   f64,
}

impl SlopSelector {
    pub const NAME: &'static str = "slop";

    pub fn new(program: PathBuf, scale: f64) -> Self {
        Self { program, scale }
    }

    pub fn can_run(probe: &SystemProbe) -> bool {
        probe.has_executable(Self::NAME)
    }

    pub fn from_probe(probe: &SystemProbe) -> Self {
        let program = probe
            .find_executable(Self::NAME)
            .unwrap_or_else(|| PathBuf::from(Self::NAME));
        Self::new(program, probe.scale().factor())
    }

    /// Command line for one selection
    pub fn args(color: &SelectionColor, border_weight: u32) -> Vec<String> {
        vec![
            "-f".to_string(),
            SELECTION_FORMAT.to_string(),
            "-c".to_string(),
            color.to_float_list(),
            "-b".to_string(),
            border_weight.to_string(),
        ]
    }
}

#[async_trait]
impl RegionSelector for SlopSelector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn capabilities(&self) -> CapabilityMap {
        CapabilityMap::new()
            .with(Capability::RegionSelection, Self::NAME)
            .with(Capability::WindowSelection, Self::NAME)
    }

    async fn region_select(
        &self,
        color: &SelectionColor,
        border_weight: u32,
    ) -> Result<Region, SelectionError> {
        let lines = run_selection_tool(
            &self.program,
            &Self::args(color, border_weight),
            selection_timeout(),
        )
        .await?;
        parse_selection_output(&lines, self.scale)
    }
}
