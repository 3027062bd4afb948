//! Backend discovery
//!
//! Each role has a fixed candidate list per session type, ordered from the
//! fastest and least intrusive tool to the last resort. The first candidate
//! whose `can_run` probe passes is built; nothing is re-probed mid-capture.
//!
//! | Role | X11 | Wayland |
//! |------|-----|---------|
//! | Screenshooter | scrot, imagemagick, imlib2, xcap | grim, xdg-desktop-portal |
//! | Region selector | slop, x11 | slurp |
//! | Cursor locator | x11 | slurp |
//!
//! Without a graphical session every list is empty.

use std::sync::Arc;

use tracing::{debug, info, warn};

#[cfg(target_os = "linux")]
use super::{
    cursor::X11CursorLocator,
    screenshooter::{PortalBackend, XcapBackend},
    selector::X11RubberBandSelector,
};
use super::{
    cursor::SlurpPointLocator,
    screenshooter::{GrimBackend, ImageMagickBackend, Imlib2Backend, Screenshooter, ScrotBackend},
    selector::{SlopSelector, SlurpSelector},
    traits::{CaptureBackend, CursorLocator, RegionSelector},
};
use crate::{
    error::{CaptureError, CaptureResult},
    model::{BackendKind, SessionType},
    util::detect::SystemProbe,
};

/// One entry of a candidate list
pub struct Candidate<T: ?Sized> {
    /// Name reported in "install one of" messages
    pub name:    &'static str,
    /// Static runnability probe
    pub can_run: fn(&SystemProbe) -> bool,
    /// Constructor, only called when `can_run` passed
    pub build:   fn(&SystemProbe) -> Arc<T>,
}

impl<T: ?Sized> Clone for Candidate<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Candidate<T> {}

impl<T: ?Sized> std::fmt::Debug for Candidate<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate").field("name", &self.name).finish()
    }
}

/// Builds the first candidate that can run
///
/// # Errors
///
/// [`CaptureError::NoSupportedBackend`] listing every candidate name, in
/// order, when none can run.
pub fn select_first<T: ?Sized>(
    kind: BackendKind,
    candidates: &[Candidate<T>],
    probe: &SystemProbe,
) -> CaptureResult<Arc<T>> {
    for candidate in candidates {
        if (candidate.can_run)(probe) {
            info!("Using {} '{}'", kind, candidate.name);
            return Ok((candidate.build)(probe));
        }
        debug!("{} '{}' cannot run here", kind, candidate.name);
    }

    Err(CaptureError::NoSupportedBackend {
        kind,
        candidates: candidates.iter().map(|c| c.name.to_string()).collect(),
    })
}

/// Picks a region selector
pub struct SelectorFactory;

impl SelectorFactory {
    pub fn candidates(session: SessionType) -> Vec<Candidate<dyn RegionSelector>> {
        let mut candidates: Vec<Candidate<dyn RegionSelector>> = Vec::new();
        match session {
            SessionType::X11 => {
                candidates.push(Candidate {
                    name:    SlopSelector::NAME,
                    can_run: SlopSelector::can_run,
                    build:   |p| Arc::new(SlopSelector::from_probe(p)),
                });
                #[cfg(target_os = "linux")]
                candidates.push(Candidate {
                    name:    X11RubberBandSelector::NAME,
                    can_run: X11RubberBandSelector::can_run,
                    build:   |p| Arc::new(X11RubberBandSelector::from_probe(p)),
                });
            }
            SessionType::Wayland => candidates.push(Candidate {
                name:    SlurpSelector::NAME,
                can_run: SlurpSelector::can_run,
                build:   |p| Arc::new(SlurpSelector::from_probe(p)),
            }),
            SessionType::None => {}
        }
        candidates
    }

    /// Returns `preferred` unchanged, or the first runnable candidate
    pub fn create(
        probe: &SystemProbe,
        preferred: Option<Arc<dyn RegionSelector>>,
    ) -> CaptureResult<Arc<dyn RegionSelector>> {
        match preferred {
            Some(selector) => Ok(selector),
            None => select_first(
                BackendKind::RegionSelector,
                &Self::candidates(probe.session()),
                probe,
            ),
        }
    }
}

/// Picks a cursor locator
pub struct CursorLocatorFactory;

impl CursorLocatorFactory {
    pub fn candidates(session: SessionType) -> Vec<Candidate<dyn CursorLocator>> {
        let mut candidates: Vec<Candidate<dyn CursorLocator>> = Vec::new();
        match session {
            SessionType::X11 => {
                #[cfg(target_os = "linux")]
                candidates.push(Candidate {
                    name:    X11CursorLocator::NAME,
                    can_run: X11CursorLocator::can_run,
                    build:   |_| Arc::new(X11CursorLocator),
                });
            }
            SessionType::Wayland => candidates.push(Candidate {
                name:    SlurpPointLocator::NAME,
                can_run: SlurpPointLocator::can_run,
                build:   |p| Arc::new(SlurpPointLocator::from_probe(p)),
            }),
            SessionType::None => {}
        }
        candidates
    }

    /// Returns `preferred` unchanged, or the first runnable candidate
    pub fn create(
        probe: &SystemProbe,
        preferred: Option<Arc<dyn CursorLocator>>,
    ) -> CaptureResult<Arc<dyn CursorLocator>> {
        match preferred {
            Some(locator) => Ok(locator),
            None => select_first(
                BackendKind::CursorLocator,
                &Self::candidates(probe.session()),
                probe,
            ),
        }
    }
}

/// Assembles a complete [`Screenshooter`]
///
/// The capture backend is mandatory. A missing selector or cursor locator
/// is logged and the pipeline runs without it, falling back to full-screen
/// captures and unstamped images.
///
/// # Examples
///
/// ```rust,ignore
/// use gscreenshot_core::capture::factory::ScreenshooterFactory;
///
/// let shooter = ScreenshooterFactory::detect().create()?;
/// println!("capturing with {}", shooter.backend_name());
/// ```
#[derive(Clone)]
pub struct ScreenshooterFactory {
    probe:    SystemProbe,
    backend:  Option<Arc<dyn CaptureBackend>>,
    selector: Option<Arc<dyn RegionSelector>>,
    locator:  Option<Arc<dyn CursorLocator>>,
}

impl ScreenshooterFactory {
    pub fn new(probe: SystemProbe) -> Self {
        Self {
            probe,
            backend: None,
            selector: None,
            locator: None,
        }
    }

    /// Factory over the live environment
    pub fn detect() -> Self {
        Self::new(SystemProbe::detect())
    }

    pub fn probe(&self) -> &SystemProbe {
        &self.probe
    }

    /// Uses `backend` instead of probing for one
    pub fn with_backend(mut self, backend: Arc<dyn CaptureBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Uses `selector` instead of probing for one
    pub fn with_selector(mut self, selector: Arc<dyn RegionSelector>) -> Self {
        self.selector = Some(selector);
        self
    }

    /// Uses `locator` instead of probing for one
    pub fn with_cursor_locator(mut self, locator: Arc<dyn CursorLocator>) -> Self {
        self.locator = Some(locator);
        self
    }

    pub fn candidates(session: SessionType) -> Vec<Candidate<dyn CaptureBackend>> {
        let mut candidates: Vec<Candidate<dyn CaptureBackend>> = Vec::new();
        match session {
            SessionType::X11 => {
                candidates.push(Candidate {
                    name:    ScrotBackend::NAME,
                    can_run: ScrotBackend::can_run,
                    build:   |p| Arc::new(ScrotBackend::from_probe(p)),
                });
                candidates.push(Candidate {
                    name:    ImageMagickBackend::NAME,
                    can_run: ImageMagickBackend::can_run,
                    build:   |p| Arc::new(ImageMagickBackend::from_probe(p)),
                });
                candidates.push(Candidate {
                    name:    Imlib2Backend::NAME,
                    can_run: Imlib2Backend::can_run,
                    build:   |p| Arc::new(Imlib2Backend::from_probe(p)),
                });
                #[cfg(target_os = "linux")]
                candidates.push(Candidate {
                    name:    XcapBackend::NAME,
                    can_run: XcapBackend::can_run,
                    build:   |_| Arc::new(XcapBackend),
                });
            }
            SessionType::Wayland => {
                candidates.push(Candidate {
                    name:    GrimBackend::NAME,
                    can_run: GrimBackend::can_run,
                    build:   |p| Arc::new(GrimBackend::from_probe(p)),
                });
                #[cfg(target_os = "linux")]
                candidates.push(Candidate {
                    name:    PortalBackend::NAME,
                    can_run: PortalBackend::can_run,
                    build:   |_| Arc::new(PortalBackend),
                });
            }
            SessionType::None => {}
        }
        candidates
    }

    /// The capture backend alone
    pub fn create_backend(&self) -> CaptureResult<Arc<dyn CaptureBackend>> {
        match &self.backend {
            Some(backend) => Ok(backend.clone()),
            None => select_first(
                BackendKind::Screenshooter,
                &Self::candidates(self.probe.session()),
                &self.probe,
            ),
        }
    }

    /// Builds the pipeline
    ///
    /// # Errors
    ///
    /// [`CaptureError::NoSupportedBackend`] when no capture backend can run.
    pub fn create(&self) -> CaptureResult<Screenshooter> {
        let backend = self.create_backend()?;

        let selector = SelectorFactory::create(&self.probe, self.selector.clone())
            .map_err(|e| warn!("{}; selections will capture the full screen", e))
            .ok();
        let locator = CursorLocatorFactory::create(&self.probe, self.locator.clone())
            .map_err(|e| warn!("{}; cursor glyphs will not be stamped", e))
            .ok();

        Ok(Screenshooter::new(backend)
            .with_selector(selector)
            .with_cursor_locator(locator)
            .with_scale(self.probe.scale().clone()))
    }
}

impl std::fmt::Debug for ScreenshooterFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenshooterFactory")
            .field("probe", &self.probe)
            .field("backend", &self.backend.as_ref().map(|b| b.name()))
            .field("selector", &self.selector.as_ref().map(|s| s.name()))
            .field("locator", &self.locator.as_ref().map(|l| l.name()))
            .finish()
    }
}
