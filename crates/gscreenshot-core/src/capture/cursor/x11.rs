use async_trait::async_trait;
use tracing::debug;
use x11rb::{connection::Connection, protocol::xproto::ConnectionExt as _};

use crate::{
    capture::traits::CursorLocator,
    model::{Capability, CapabilityMap},
    util::detect::SystemProbe,
};

/// Pointer position straight from the X server
#[derive(Debug, Clone, Default)]
pub struct X11CursorLocator;

impl X11CursorLocator {
    pub const NAME: &'static str = "x11";

    pub fn can_run(probe: &SystemProbe) -> bool {
        !probe.session_is_wayland() && probe.env_var("DISPLAY").is_some()
    }

    fn query() -> Result<(i32, i32), String> {
        let (conn, screen_num) = x11rb::connect(None).map_err(|e| e.to_string())?;
        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .map(|s| s.root)
            .ok_or_else(|| format!("screen {} not found", screen_num))?;

        let reply = conn
            .query_pointer(root)
            .map_err(|e| e.to_string())?
            .reply()
            .map_err(|e| e.to_string())?;

        Ok((reply.root_x as i32, reply.root_y as i32))
    }
}

#[async_trait]
impl CursorLocator for X11CursorLocator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn capabilities(&self) -> CapabilityMap {
        CapabilityMap::new().with(Capability::AlternateCursor, Self::NAME)
    }

    async fn cursor_position(&self) -> Option<(i32, i32)> {
        match tokio::task::spawn_blocking(Self::query).await {
            Ok(Ok(position)) => Some(position),
            Ok(Err(e)) => {
                debug!("X11 pointer query failed: {}", e);
                None
            }
            Err(e) => {
                debug!("X11 pointer query task failed: {}", e);
                None
            }
        }
    }
}
