//! Application facade
//!
//! [`Gscreenshot`] owns a [`Screenshooter`] and the session's
//! [`ScreenshotCollection`], and offers the user-facing actions front ends
//! are built from: capture, save, copy and open.
//!
//! Capture methods report success as a `bool`; the reasons a capture fails
//! are already logged by the pipeline. Save, copy and open are final user
//! requests, so they return a [`ScreenshotActionError`] instead.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::{
    capture::{ImageBuffer, Screenshooter, ScreenshooterFactory, screenshooter::REGION_EFFECT_ALIAS},
    error::{CaptureResult, ScreenshotActionError},
    model::{CapabilityMap, GrabOptions, ImageFormat, Region, SessionType},
    screenshot::{EffectKind, Screenshot, ScreenshotCollection},
    util::{
        cache::CacheStore,
        desktop,
        detect::SystemProbe,
        encode::{encode_png, write_image},
        filename::{default_filename, resolve_save_target_now},
        temp_files::ScopedTempFile,
    },
};

/// Program name reported to users and used for file names
pub const PROGRAM_NAME: &str = "gscreenshot";

#[derive(Debug)]
pub struct Gscreenshot {
    screenshooter: Screenshooter,
    probe:         SystemProbe,
    collection:    ScreenshotCollection,
    cache:         Option<CacheStore>,
}

impl Gscreenshot {
    /// Facade over an already assembled pipeline
    ///
    /// Uses the live environment for desktop helpers and the default cache
    /// location.
    pub fn new(screenshooter: Screenshooter) -> Self {
        Self {
            screenshooter,
            probe: SystemProbe::detect(),
            collection: ScreenshotCollection::new(),
            cache: CacheStore::default_location(),
        }
    }

    /// Facade over the best pipeline for the current session
    ///
    /// # Errors
    ///
    /// [`CaptureError::NoSupportedBackend`](crate::error::CaptureError::NoSupportedBackend)
    /// when no capture tool can run.
    pub fn with_defaults() -> CaptureResult<Self> {
        Self::from_factory(ScreenshooterFactory::detect())
    }

    pub fn from_factory(factory: ScreenshooterFactory) -> CaptureResult<Self> {
        let screenshooter = factory.create()?;
        Ok(Self::new(screenshooter).with_probe(factory.probe().clone()))
    }

    /// Replaces the environment snapshot used for desktop helpers
    pub fn with_probe(mut self, probe: SystemProbe) -> Self {
        self.probe = probe;
        self
    }

    /// Replaces the cache store; `None` disables persistence
    pub fn with_cache(mut self, cache: Option<CacheStore>) -> Self {
        self.cache = cache;
        self
    }

    pub fn screenshooter(&self) -> &Screenshooter {
        &self.screenshooter
    }

    pub fn capabilities(&self) -> CapabilityMap {
        self.screenshooter.capabilities()
    }

    pub fn session_type(&self) -> SessionType {
        self.probe.session()
    }

    pub fn get_program_name(&self) -> &'static str {
        PROGRAM_NAME
    }

    pub fn get_program_version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Captures the whole screen
    pub async fn screenshot_full_display(&mut self, options: &GrabOptions) -> bool {
        let shot = self.screenshooter.grab_fullscreen(options).await;
        self.keep(shot)
    }

    /// Captures a selected region and remembers it for reuse
    pub async fn screenshot_selected(&mut self, options: &GrabOptions) -> bool {
        let shot = self.screenshooter.grab_selection(options).await;
        if let Some(region) = shot.as_ref().and_then(selected_region) {
            self.remember_region(region);
        }
        self.keep(shot)
    }

    /// Captures a selected window
    pub async fn screenshot_window(&mut self, options: &GrabOptions) -> bool {
        debug!("Window capture requested");
        let shot = self.screenshooter.grab_window(options).await;
        self.keep(shot)
    }

    fn keep(&mut self, shot: Option<Screenshot>) -> bool {
        match shot {
            Some(shot) => {
                self.collection.append(shot);
                true
            }
            None => false,
        }
    }

    fn remember_region(&self, region: Region) {
        let Some(cache) = &self.cache else {
            return;
        };
        if let Err(e) = cache.update(|data| data.set_last_region(region)) {
            warn!("Could not store the selected region: {}", e);
        }
    }

    /// Region stored by the last successful selection
    pub fn last_region(&self) -> Option<Region> {
        self.cache.as_ref().and_then(|c| c.load().last_region())
    }

    pub fn current_screenshot(&self) -> Option<&Screenshot> {
        self.collection.current()
    }

    /// Current screenshot with its effects applied
    pub fn current_image(&self) -> Option<ImageBuffer> {
        self.collection.current().map(Screenshot::get_image)
    }

    pub fn collection(&self) -> &ScreenshotCollection {
        &self.collection
    }

    pub fn collection_mut(&mut self) -> &mut ScreenshotCollection {
        &mut self.collection
    }

    /// Directory new screenshots are saved to by default
    ///
    /// The last save directory from the cache if it still exists, then the
    /// pictures directory, then the home directory, then the working
    /// directory.
    pub fn get_last_save_directory(&self) -> PathBuf {
        self.cache
            .as_ref()
            .and_then(|c| c.load().last_save_dir)
            .filter(|dir| dir.is_dir())
            .or_else(dirs::picture_dir)
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Saves the current screenshot to `target`
    ///
    /// See [`Gscreenshot::save_and_return_path`].
    pub fn save_last_image(&mut self, target: &Path) -> Result<(), ScreenshotActionError> {
        self.save_and_return_path(Some(target)).map(|_| ())
    }

    /// Saves the current screenshot and returns where it went
    ///
    /// `target` may contain strftime placeholders and may be a directory.
    /// Without a target the default filename in
    /// [`Gscreenshot::get_last_save_directory`] is used. The format follows
    /// the extension.
    pub fn save_and_return_path(
        &mut self,
        target: Option<&Path>,
    ) -> Result<PathBuf, ScreenshotActionError> {
        let target = match target {
            Some(target) => target.to_path_buf(),
            None => self.get_last_save_directory().join(default_filename()),
        };
        let (path, format) = resolve_save_target_now(&target)?;

        let screenshot = self
            .collection
            .current_mut()
            .ok_or(ScreenshotActionError::NoScreenshot)?;

        write_image(&screenshot.get_image(), &path, format).map_err(|e| {
            ScreenshotActionError::Save {
                path:   path.clone(),
                reason: e.to_string(),
            }
        })?;

        screenshot.set_saved_path(Some(path.clone()));
        info!("Saved screenshot to {}", path.display());

        self.remember_save(&path, format);
        Ok(path)
    }

    fn remember_save(&self, path: &Path, format: ImageFormat) {
        let Some(cache) = &self.cache else {
            return;
        };
        let dir = path.parent().map(Path::to_path_buf);
        let result = cache.update(|data| {
            if let Some(dir) = dir {
                data.last_save_dir = Some(dir);
            }
            data.last_save_type = Some(format.extension().to_string());
        });
        if let Err(e) = result {
            warn!("Could not update the cache: {}", e);
        }
    }

    /// Copies the current screenshot to the clipboard as PNG
    pub async fn copy_last_screenshot_to_clipboard(&self) -> Result<(), ScreenshotActionError> {
        let image = self.current_image().ok_or(ScreenshotActionError::NoScreenshot)?;
        let bytes = encode_png(&image)?;
        desktop::copy_to_clipboard(&self.probe, &bytes, ImageFormat::Png).await
    }

    /// Opens the current screenshot in the default viewer
    ///
    /// An unsaved screenshot is written to a temporary PNG first. That file
    /// is left in place for the viewer.
    pub async fn open_last_screenshot(&self) -> Result<(), ScreenshotActionError> {
        let screenshot = self
            .collection
            .current()
            .ok_or(ScreenshotActionError::NoScreenshot)?;

        let path = match screenshot.saved_path().filter(|p| p.is_file()) {
            Some(saved) => saved.to_path_buf(),
            None => {
                let file = ScopedTempFile::with_timestamp(PROGRAM_NAME, ImageFormat::Png.extension())?;
                write_image(&screenshot.get_image(), file.path(), ImageFormat::Png)?;
                file.keep()
            }
        };

        desktop::open_with_default_app(&self.probe, &path).await
    }
}

/// Region of the crop attached by a selection, if it is enabled
fn selected_region(shot: &Screenshot) -> Option<Region> {
    let effect = shot.effect(REGION_EFFECT_ALIAS)?;
    match effect.kind() {
        EffectKind::Crop(crop) if effect.enabled() => Some(crop.region),
        _ => None,
    }
}
