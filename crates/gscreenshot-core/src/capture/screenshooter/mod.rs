//! Capture orchestration
//!
//! A [`Screenshooter`] composes one [`CaptureBackend`], an optional
//! [`RegionSelector`] and an optional [`CursorLocator`] into the three
//! capture pipelines the application offers:
//!
//! - [`Screenshooter::grab_fullscreen`]: wait, capture, then stamp a cursor
//!   glyph when the backend cannot draw the pointer itself
//! - [`Screenshooter::grab_selection`]: select, capture full screen, attach
//!   a crop effect
//! - [`Screenshooter::grab_window`]: same as selection
//!
//! Selection failures never abort a capture. Every outcome that is not a
//! rectangle falls back to a plain full-screen capture, following the
//! transitions of [`PipelineState`]:
//!
//! ```text
//! SelectingRegion ─┬─ NoSelector ──┐
//!                  ├─ Cancelled ───┤
//!                  ├─ ExecFailed ──┼─> CapturingFullscreen { crop: None } ─> Done
//!                  ├─ ParseFailed ─┘
//!                  └─ Selected ──────> CapturingFullscreen { crop } ─> AttachingCrop ─> Done
//! ```
//!
//! A failed full-screen capture ends the pipeline with no screenshot.

mod grim;
mod imagemagick;
mod imlib2;
#[cfg(target_os = "linux")]
mod portal;
mod scrot;
#[cfg(target_os = "linux")]
mod xcap_backend;

use std::sync::Arc;

use tracing::{debug, info, warn};

pub use grim::GrimBackend;
pub use imagemagick::ImageMagickBackend;
pub use imlib2::Imlib2Backend;
#[cfg(target_os = "linux")]
pub use portal::PortalBackend;
pub use scrot::ScrotBackend;
#[cfg(target_os = "linux")]
pub use xcap_backend::XcapBackend;

use super::traits::{CaptureBackend, CursorLocator, RegionSelector};
use crate::{
    error::SelectionError,
    model::{Capability, CapabilityMap, GrabOptions, Region},
    screenshot::{CursorGlyph, Screenshot, ScreenshotEffect},
    util::scaling::ScaleFactor,
};

/// Alias of the crop effect attached by a selection
pub const REGION_EFFECT_ALIAS: &str = "region";

/// Alias of the stamp effect attached for the cursor
pub const CURSOR_EFFECT_ALIAS: &str = "cursor";

/// Provider name for capabilities the orchestration adds on its own
pub const CORE_PROVIDER: &str = "gscreenshot";

/// Steps of a selection-based capture
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    /// Waiting on the interactive selector
    SelectingRegion,
    /// No selector is configured
    NoSelector,
    /// The user dismissed the selection
    Cancelled,
    /// The selector could not run, crashed or timed out
    ExecFailed(String),
    /// The selector printed something that is not a rectangle
    ParseFailed(String),
    /// A rectangle is known, either selected or given up front
    Selected(Region),
    /// Running the full-screen backend, with the crop to attach afterwards
    CapturingFullscreen { crop: Option<Region> },
    /// Attaching the crop effect to the fresh capture
    AttachingCrop(Region),
    /// Pipeline finished
    Done,
}

impl PipelineState {
    /// State reached from a selector's answer
    pub fn on_selection(result: Result<Region, SelectionError>) -> Self {
        match result {
            Ok(region) => PipelineState::Selected(region),
            Err(SelectionError::Cancelled) => PipelineState::Cancelled,
            Err(e @ SelectionError::ExecFailed { .. }) => PipelineState::ExecFailed(e.to_string()),
            Err(SelectionError::ParseFailed { output }) => PipelineState::ParseFailed(output),
        }
    }

    /// Transition out of a selection outcome
    ///
    /// Every outcome other than [`PipelineState::Selected`] degrades to a
    /// full-screen capture without a crop. States that need I/O to leave are
    /// returned unchanged.
    pub fn resolve(self) -> Self {
        match self {
            PipelineState::NoSelector
            | PipelineState::Cancelled
            | PipelineState::ExecFailed(_)
            | PipelineState::ParseFailed(_) => PipelineState::CapturingFullscreen { crop: None },
            PipelineState::Selected(region) => PipelineState::CapturingFullscreen {
                crop: Some(region),
            },
            other => other,
        }
    }

    /// Whether this is one of the fallback outcomes
    pub fn is_fallback(&self) -> bool {
        matches!(
            self,
            PipelineState::NoSelector
                | PipelineState::Cancelled
                | PipelineState::ExecFailed(_)
                | PipelineState::ParseFailed(_)
        )
    }
}

/// Composed capture pipeline
///
/// # Examples
///
/// ```rust,ignore
/// use std::sync::Arc;
///
/// use gscreenshot_core::{
///     capture::screenshooter::{GrimBackend, Screenshooter},
///     model::GrabOptions,
/// };
///
/// let shooter = Screenshooter::new(Arc::new(GrimBackend::new("grim".into())));
/// let shot = shooter.grab_fullscreen(&GrabOptions::default()).await;
/// ```
#[derive(Clone)]
pub struct Screenshooter {
    backend:  Arc<dyn CaptureBackend>,
    selector: Option<Arc<dyn RegionSelector>>,
    locator:  Option<Arc<dyn CursorLocator>>,
    scale:    ScaleFactor,
}

impl Screenshooter {
    /// Pipeline with only a capture backend and no scaling
    pub fn new(backend: Arc<dyn CaptureBackend>) -> Self {
        Self {
            backend,
            selector: None,
            locator: None,
            scale: ScaleFactor::unscaled(),
        }
    }

    pub fn with_selector(mut self, selector: Option<Arc<dyn RegionSelector>>) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_cursor_locator(mut self, locator: Option<Arc<dyn CursorLocator>>) -> Self {
        self.locator = locator;
        self
    }

    pub fn with_scale(mut self, scale: ScaleFactor) -> Self {
        self.scale = scale;
        self
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn selector_name(&self) -> Option<&'static str> {
        self.selector.as_ref().map(|s| s.name())
    }

    pub fn cursor_locator_name(&self) -> Option<&'static str> {
        self.locator.as_ref().map(|l| l.name())
    }

    pub fn scale(&self) -> &ScaleFactor {
        &self.scale
    }

    /// Everything the composed pipeline can do, and who provides it
    ///
    /// Layers are merged lowest precedence first: capabilities the
    /// orchestration adds itself, then the cursor locator, then the
    /// selector, then the capture backend.
    pub fn capabilities(&self) -> CapabilityMap {
        let mut core = CapabilityMap::new().with(Capability::ReuseRegion, CORE_PROVIDER);
        if let Some(locator) = &self.locator {
            core = core.with(Capability::AlternateCursor, locator.name());
        }
        if let Some(source) = self.scale.source() {
            core = core.with(Capability::ScalingDetection, source);
        }

        let locator = self.locator.as_ref().map(|l| l.capabilities());
        let selector = self.selector.as_ref().map(|s| s.capabilities());
        let backend = self.backend.capabilities();

        CapabilityMap::merged(
            std::iter::once(&core)
                .chain(locator.as_ref())
                .chain(selector.as_ref())
                .chain(std::iter::once(&backend)),
        )
    }

    /// Captures the whole screen after `options.delay`
    ///
    /// With `capture_cursor` set, a backend declaring
    /// [`Capability::CursorCapture`] draws the pointer itself unless a
    /// specific glyph was requested. Otherwise the pointer is located and a
    /// stamp effect aliased [`CURSOR_EFFECT_ALIAS`] is attached. Returns
    /// `None` when the backend produced no image.
    pub async fn grab_fullscreen(&self, options: &GrabOptions) -> Option<Screenshot> {
        if !options.delay.is_zero() {
            debug!("Waiting {:?} before capture", options.delay);
            tokio::time::sleep(options.delay).await;
        }

        let native_cursor = options.capture_cursor
            && options.cursor_glyph.is_none()
            && self.backend.capabilities().contains(Capability::CursorCapture);

        let image = match self.backend.capture_fullscreen(native_cursor).await {
            Ok(image) => image,
            Err(e) => {
                warn!("{} produced no screenshot: {}", self.backend.name(), e);
                return None;
            }
        };

        let mut screenshot = Screenshot::new(image);

        if options.capture_cursor && !native_cursor {
            let glyph = options.cursor_glyph.clone().unwrap_or_default();
            if let Some(stamp) = self.cursor_stamp(glyph).await {
                screenshot.add_effect(stamp);
            }
        }

        Some(screenshot)
    }

    /// Captures a user-selected rectangle
    ///
    /// An explicit `options.region` skips the selector and is used as is,
    /// without scaling. Returns `None` only when the full-screen capture
    /// itself fails.
    pub async fn grab_selection(&self, options: &GrabOptions) -> Option<Screenshot> {
        self.run_pipeline(options, false).await
    }

    /// Captures a user-selected window
    ///
    /// None of the supported selectors tell windows and regions apart, so
    /// this follows [`Screenshooter::grab_selection`].
    pub async fn grab_window(&self, options: &GrabOptions) -> Option<Screenshot> {
        self.run_pipeline(options, true).await
    }

    async fn run_pipeline(&self, options: &GrabOptions, window: bool) -> Option<Screenshot> {
        let mut state = match options.region {
            Some(region) => {
                debug!("Using explicit region {:?}", region.as_tuple());
                PipelineState::Selected(region)
            }
            None => PipelineState::SelectingRegion,
        };
        let mut screenshot: Option<Screenshot> = None;

        loop {
            state = match state {
                PipelineState::SelectingRegion => self.select(options, window).await,
                PipelineState::CapturingFullscreen { crop } => {
                    screenshot = Some(self.grab_fullscreen(options).await?);
                    match crop {
                        Some(region) => PipelineState::AttachingCrop(region),
                        None => PipelineState::Done,
                    }
                }
                PipelineState::AttachingCrop(region) => {
                    if let Some(shot) = screenshot.as_mut() {
                        shot.add_effect(
                            ScreenshotEffect::crop(region).with_alias(REGION_EFFECT_ALIAS),
                        );
                    }
                    PipelineState::Done
                }
                PipelineState::Done => return screenshot,
                outcome => {
                    log_selection_outcome(&outcome);
                    outcome.resolve()
                }
            };
        }
    }

    async fn select(&self, options: &GrabOptions, window: bool) -> PipelineState {
        let Some(selector) = &self.selector else {
            return PipelineState::NoSelector;
        };

        debug!(
            "Asking {} for a {}",
            selector.name(),
            if window { "window" } else { "region" }
        );

        let result = if window {
            selector
                .window_select(&options.select_color, options.border_weight)
                .await
        } else {
            selector
                .region_select(&options.select_color, options.border_weight)
                .await
        };

        PipelineState::on_selection(result)
    }

    async fn cursor_stamp(&self, glyph: CursorGlyph) -> Option<ScreenshotEffect> {
        let Some(locator) = &self.locator else {
            debug!("No cursor locator, skipping cursor stamp");
            return None;
        };

        let Some(position) = locator.cursor_position_adjusted(self.scale.factor()).await else {
            debug!("{} could not locate the cursor", locator.name());
            return None;
        };

        debug!("Stamping {} cursor at {:?}", glyph.name(), position);
        Some(ScreenshotEffect::stamp(glyph, position).with_alias(CURSOR_EFFECT_ALIAS))
    }
}

impl std::fmt::Debug for Screenshooter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screenshooter")
            .field("backend", &self.backend_name())
            .field("selector", &self.selector_name())
            .field("locator", &self.cursor_locator_name())
            .field("scale", &self.scale)
            .finish()
    }
}

fn log_selection_outcome(state: &PipelineState) {
    match state {
        PipelineState::NoSelector => {
            info!("No region selector available, capturing the full screen")
        }
        PipelineState::Cancelled => info!("Selection cancelled, capturing the full screen"),
        PipelineState::ExecFailed(reason) => {
            warn!("Selector failed, falling back to full screen: {}", reason)
        }
        PipelineState::ParseFailed(output) => {
            warn!("Unexpected selector output, falling back to full screen: {:?}", output)
        }
        PipelineState::Selected(region) => debug!("Selected region {:?}", region.as_tuple()),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;

    use super::*;
    use crate::{
        capture::ImageBuffer,
        error::{CaptureError, CaptureResult},
        model::SelectionColor,
        screenshot::EffectKind,
    };

    #[derive(Default)]
    struct CountingBackend {
        calls:       AtomicUsize,
        native:      bool,
        fail:        bool,
        last_cursor: Mutex<Option<bool>>,
    }

    #[async_trait]
    impl CaptureBackend for CountingBackend {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn capabilities(&self) -> CapabilityMap {
            let caps = CapabilityMap::new().with(Capability::CaptureFullscreen, "counting");
            if self.native {
                caps.with(Capability::CursorCapture, "counting")
            } else {
                caps
            }
        }

        async fn capture_fullscreen(&self, capture_cursor: bool) -> CaptureResult<ImageBuffer> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_cursor.lock().unwrap() = Some(capture_cursor);
            if self.fail {
                return Err(CaptureError::ScreenshotFailed {
                    backend: "counting".to_string(),
                    reason:  "boom".to_string(),
                });
            }
            Ok(ImageBuffer::from_test_pattern(320, 200))
        }
    }

    struct ScriptedSelector(Result<Region, SelectionError>);

    #[async_trait]
    impl RegionSelector for ScriptedSelector {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn capabilities(&self) -> CapabilityMap {
            CapabilityMap::new()
                .with(Capability::RegionSelection, "scripted")
                .with(Capability::CaptureFullscreen, "scripted")
        }

        async fn region_select(
            &self,
            _color: &SelectionColor,
            _border_weight: u32,
        ) -> Result<Region, SelectionError> {
            self.0.clone()
        }
    }

    struct FixedLocator;

    #[async_trait]
    impl CursorLocator for FixedLocator {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn capabilities(&self) -> CapabilityMap {
            CapabilityMap::new().with(Capability::AlternateCursor, "fixed")
        }

        async fn cursor_position(&self) -> Option<(i32, i32)> {
            Some((100, 200))
        }
    }

    #[test]
    fn test_selection_outcomes_resolve_to_fullscreen() {
        let outcomes = [
            Err(SelectionError::Cancelled),
            Err(SelectionError::ExecFailed {
                tool:   "slop".to_string(),
                reason: "not found".to_string(),
            }),
            Err(SelectionError::ParseFailed {
                output: "junk".to_string(),
            }),
        ];

        for outcome in outcomes {
            let state = PipelineState::on_selection(outcome);
            assert!(state.is_fallback(), "{:?}", state);
            assert_eq!(state.resolve(), PipelineState::CapturingFullscreen { crop: None });
        }

        assert_eq!(
            PipelineState::NoSelector.resolve(),
            PipelineState::CapturingFullscreen { crop: None }
        );
    }

    #[test]
    fn test_selected_region_is_kept_for_the_crop() {
        let region = Region::from_xywh(1, 2, 3, 4);
        let state = PipelineState::on_selection(Ok(region));
        assert!(!state.is_fallback());
        assert_eq!(
            state.resolve(),
            PipelineState::CapturingFullscreen { crop: Some(region) }
        );
        assert_eq!(PipelineState::Done.resolve(), PipelineState::Done);
    }

    #[tokio::test]
    async fn test_selection_attaches_region_crop() {
        let backend = Arc::new(CountingBackend::default());
        let region = Region::from_xywh(10, 10, 50, 40);
        let shooter = Screenshooter::new(backend.clone())
            .with_selector(Some(Arc::new(ScriptedSelector(Ok(region)))));

        let shot = shooter.grab_selection(&GrabOptions::default()).await.unwrap();

        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        let crop = shot.effect(REGION_EFFECT_ALIAS).unwrap();
        assert_eq!(crop.kind(), &EffectKind::Crop(crate::screenshot::CropEffect { region }));
        assert_eq!(shot.get_image().dimensions(), (50, 40));
        assert_eq!(shot.raw_image().dimensions(), (320, 200));
    }

    #[tokio::test]
    async fn test_selection_without_selector_is_fullscreen() {
        let backend = Arc::new(CountingBackend::default());
        let shooter = Screenshooter::new(backend.clone());

        let shot = shooter.grab_window(&GrabOptions::default()).await.unwrap();
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert!(shot.effects().is_empty());
    }

    #[tokio::test]
    async fn test_explicit_region_skips_selector() {
        let backend = Arc::new(CountingBackend::default());
        let shooter = Screenshooter::new(backend.clone())
            .with_selector(Some(Arc::new(ScriptedSelector(Err(SelectionError::Cancelled)))))
            .with_scale(ScaleFactor::detected(2.0, "GDK_SCALE"));

        let options = GrabOptions::builder()
            .region(Some(Region::from_xywh(0, 0, 30, 20)))
            .build();
        let shot = shooter.grab_selection(&options).await.unwrap();

        // Not rescaled
        assert_eq!(shot.get_image().dimensions(), (30, 20));
    }

    #[tokio::test]
    async fn test_failed_capture_yields_none() {
        let backend = Arc::new(CountingBackend {
            fail: true,
            ..Default::default()
        });
        let shooter = Screenshooter::new(backend.clone())
            .with_selector(Some(Arc::new(ScriptedSelector(Ok(Region::from_xywh(0, 0, 5, 5))))));

        assert!(shooter.grab_selection(&GrabOptions::default()).await.is_none());
        assert!(shooter.grab_fullscreen(&GrabOptions::default()).await.is_none());
    }

    #[tokio::test]
    async fn test_native_cursor_is_requested_from_capable_backend() {
        let backend = Arc::new(CountingBackend {
            native: true,
            ..Default::default()
        });
        let shooter = Screenshooter::new(backend.clone())
            .with_cursor_locator(Some(Arc::new(FixedLocator)));

        let options = GrabOptions::builder().capture_cursor(true).build();
        let shot = shooter.grab_fullscreen(&options).await.unwrap();

        assert_eq!(*backend.last_cursor.lock().unwrap(), Some(true));
        assert!(shot.effect(CURSOR_EFFECT_ALIAS).is_none());
    }

    #[tokio::test]
    async fn test_requested_glyph_overrides_native_cursor() {
        let backend = Arc::new(CountingBackend {
            native: true,
            ..Default::default()
        });
        let shooter = Screenshooter::new(backend.clone())
            .with_cursor_locator(Some(Arc::new(FixedLocator)))
            .with_scale(ScaleFactor::detected(2.0, "GDK_SCALE"));

        let options = GrabOptions::builder()
            .capture_cursor(true)
            .cursor_glyph(Some(CursorGlyph::Prohibit))
            .build();
        let shot = shooter.grab_fullscreen(&options).await.unwrap();

        assert_eq!(*backend.last_cursor.lock().unwrap(), Some(false));
        let stamp = shot.effect(CURSOR_EFFECT_ALIAS).unwrap();
        match stamp.kind() {
            EffectKind::Stamp(s) => {
                assert_eq!(s.position, (200, 400));
                assert_eq!(s.glyph, CursorGlyph::Prohibit);
            }
            other => panic!("expected a stamp, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_locator_means_no_stamp() {
        let backend = Arc::new(CountingBackend::default());
        let shooter = Screenshooter::new(backend);

        let options = GrabOptions::builder().capture_cursor(true).build();
        let shot = shooter.grab_fullscreen(&options).await.unwrap();
        assert!(shot.effects().is_empty());
    }

    #[test]
    fn test_backend_capabilities_win_over_selector() {
        let shooter = Screenshooter::new(Arc::new(CountingBackend::default()))
            .with_selector(Some(Arc::new(ScriptedSelector(Err(SelectionError::Cancelled)))))
            .with_cursor_locator(Some(Arc::new(FixedLocator)))
            .with_scale(ScaleFactor::detected(1.5, "QT_SCALE_FACTOR"));

        let caps = shooter.capabilities();
        assert_eq!(caps.provider(Capability::CaptureFullscreen), Some("counting"));
        assert_eq!(caps.provider(Capability::RegionSelection), Some("scripted"));
        assert_eq!(caps.provider(Capability::AlternateCursor), Some("fixed"));
        assert_eq!(caps.provider(Capability::ReuseRegion), Some(CORE_PROVIDER));
        assert_eq!(caps.provider(Capability::ScalingDetection), Some("QT_SCALE_FACTOR"));
        assert!(!caps.contains(Capability::CursorCapture));
    }

    #[test]
    fn test_unscaled_pipeline_has_no_scaling_capability() {
        let shooter = Screenshooter::new(Arc::new(CountingBackend::default()));
        let caps = shooter.capabilities();
        assert!(!caps.contains(Capability::ScalingDetection));
        assert!(!caps.contains(Capability::AlternateCursor));
    }
}
