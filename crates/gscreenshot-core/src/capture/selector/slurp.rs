use std::path::PathBuf;

use async_trait::async_trait;

use super::{SELECTION_FORMAT, parse_selection_output, run_selection_tool};
use crate::{
    capture::{constants::selection_timeout, traits::RegionSelector},
    error::SelectionError,
    model::{Capability, CapabilityMap, Region, SelectionColor},
    util::detect::SystemProbe,
};

/// Region selection through `slurp` (wlroots Wayland compositors)
#[derive(Debug, Clone)]
pub struct SlurpSelector {
    program: PathBuf,
    scale:   f64,
}

impl SlurpSelector {
    pub const NAME: &'static str = "slurp";

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
    ///
    /// The color fills the selection; the border is drawn opaque.
    pub fn args(color: &SelectionColor, border_weight: u32) -> Vec<String> {
        let border = SelectionColor { a: 1.0, ..*color };
        vec![
            "-f".to_string(),
            SELECTION_FORMAT.to_string(),
            "-s".to_string(),
            color.to_hex_rgba(),
            "-c".to_string(),
            border.to_hex_rgba(),
            "-w".to_string(),
            border_weight.to_string(),
        ]
    }
}

#[async_trait]
impl RegionSelector for SlurpSelector {
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
