//! Shared test doubles for pipeline integration tests
//!
//! Each fake records how often it was called so tests can assert the exact
//! number of backend invocations a pipeline made.

#![allow(dead_code)] // Not every test file uses every fake

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use gscreenshot_core::{
    capture::{CaptureBackend, CursorLocator, ImageBuffer, RegionSelector},
    error::{CaptureError, CaptureResult, SelectionError},
    model::{Capability, CapabilityMap, Region, SelectionColor},
};

/// Width and height of every fake capture
pub const FAKE_SIZE: (u32, u32) = (640, 480);

/// Capture backend returning a fixed test pattern
#[derive(Default)]
pub struct FakeBackend {
    pub calls:         AtomicUsize,
    pub cursor_native: bool,
    pub fail:          bool,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptureBackend for FakeBackend {
    fn name(&self) -> &'static str {
        "fake-backend"
    }

    fn capabilities(&self) -> CapabilityMap {
        let caps = CapabilityMap::new().with(Capability::CaptureFullscreen, "fake-backend");
        if self.cursor_native {
            caps.with(Capability::CursorCapture, "fake-backend")
        } else {
            caps
        }
    }

    async fn capture_fullscreen(&self, _capture_cursor: bool) -> CaptureResult<ImageBuffer> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CaptureError::ScreenshotFailed {
                backend: "fake-backend".to_string(),
                reason:  "exited successfully but wrote no image".to_string(),
            });
        }
        Ok(ImageBuffer::from_test_pattern(FAKE_SIZE.0, FAKE_SIZE.1))
    }
}

/// Selector answering with a preset result
pub struct FakeSelector {
    pub result: Result<Region, SelectionError>,
    pub calls:  AtomicUsize,
}

impl FakeSelector {
    pub fn new(result: Result<Region, SelectionError>) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegionSelector for FakeSelector {
    fn name(&self) -> &'static str {
        "fake-selector"
    }

    fn capabilities(&self) -> CapabilityMap {
        CapabilityMap::new()
            .with(Capability::RegionSelection, "fake-selector")
            .with(Capability::WindowSelection, "fake-selector")
    }

    async fn region_select(
        &self,
        _color: &SelectionColor,
        _border_weight: u32,
    ) -> Result<Region, SelectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Locator reporting a fixed pointer position
pub struct FakeLocator {
    pub position: Option<(i32, i32)>,
}

impl FakeLocator {
    pub fn at(x: i32, y: i32) -> Arc<Self> {
        Arc::new(Self {
            position: Some((x, y)),
        })
    }
}

#[async_trait]
impl CursorLocator for FakeLocator {
    fn name(&self) -> &'static str {
        "fake-locator"
    }

    fn capabilities(&self) -> CapabilityMap {
        CapabilityMap::new().with(Capability::AlternateCursor, "fake-locator")
    }

    async fn cursor_position(&self) -> Option<(i32, i32)> {
        self.position
    }
}

/// Every way a selection can fail to produce a rectangle
pub fn failed_selections() -> Vec<SelectionError> {
    vec![
        SelectionError::Cancelled,
        SelectionError::ExecFailed {
            tool:   "slop".to_string(),
            reason: "timed out after 60000ms".to_string(),
        },
        SelectionError::ParseFailed {
            output: "not a rectangle".to_string(),
        },
    ]
}
