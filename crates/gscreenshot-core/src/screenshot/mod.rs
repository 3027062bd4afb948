//! Captured screenshots and the collection that holds them
//!
//! A [`Screenshot`] owns the raw capture and an ordered list of
//! [`ScreenshotEffect`]s. The raw image is never modified: every call to
//! [`Screenshot::get_image`] applies the enabled effects, in order, to a
//! fresh copy.

mod collection;
mod effect;
mod glyph;

use std::path::{Path, PathBuf};

pub use collection::ScreenshotCollection;
pub use effect::{CropEffect, EffectKind, ScreenshotEffect, StampEffect};
pub use glyph::CursorGlyph;

use crate::capture::ImageBuffer;

/// Padding around previews drawn with a border
const PREVIEW_BORDER: u32 = 8;

/// One captured image plus its effects
#[derive(Debug, Clone)]
pub struct Screenshot {
    image:      ImageBuffer,
    effects:    Vec<ScreenshotEffect>,
    saved_path: Option<PathBuf>,
}

impl Screenshot {
    pub fn new(image: ImageBuffer) -> Self {
        Self {
            image,
            effects: Vec::new(),
            saved_path: None,
        }
    }

    /// The capture as taken, without effects
    pub fn raw_image(&self) -> &ImageBuffer {
        &self.image
    }

    /// Appends an effect; it is applied after every existing effect
    pub fn add_effect(&mut self, effect: ScreenshotEffect) {
        self.effects.push(effect);
    }

    /// Removes every effect with the given alias, returning how many went
    pub fn remove_effect(&mut self, alias: &str) -> usize {
        let before = self.effects.len();
        self.effects.retain(|e| e.alias() != Some(alias));
        before - self.effects.len()
    }

    pub fn effects(&self) -> &[ScreenshotEffect] {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut [ScreenshotEffect] {
        &mut self.effects
    }

    /// First effect with the given alias
    pub fn effect(&self, alias: &str) -> Option<&ScreenshotEffect> {
        self.effects.iter().find(|e| e.alias() == Some(alias))
    }

    /// Toggles every effect with the given alias
    ///
    /// Returns `false` when no effect has that alias.
    pub fn set_effect_enabled(&mut self, alias: &str, enabled: bool) -> bool {
        let mut found = false;
        for effect in self.effects.iter_mut().filter(|e| e.alias() == Some(alias)) {
            effect.set_enabled(enabled);
            found = true;
        }
        found
    }

    /// The raw image with every enabled effect applied in order
    pub fn get_image(&self) -> ImageBuffer {
        self.effects
            .iter()
            .fold(self.image.clone(), |image, effect| effect.apply_to(&image))
    }

    /// Scaled-down copy of [`Screenshot::get_image`] fitting `width` x `height`
    ///
    /// With `with_border` the image is shrunk further and framed with a
    /// transparent margin and drop shadow, still within the requested box.
    pub fn get_preview(&self, width: u32, height: u32, with_border: bool) -> ImageBuffer {
        let image = self.get_image();
        if !with_border {
            return image.resize_to_fit(width.max(1), height.max(1));
        }

        let inner_width = width.saturating_sub(PREVIEW_BORDER * 2).max(1);
        let inner_height = height.saturating_sub(PREVIEW_BORDER * 2).max(1);
        image
            .resize_to_fit(inner_width, inner_height)
            .pad_with_shadow(PREVIEW_BORDER)
    }

    /// Borderless preview, for galleries
    pub fn get_thumbnail(&self, width: u32, height: u32) -> ImageBuffer {
        self.get_preview(width, height, false)
    }

    /// Where the screenshot was last saved, if ever
    pub fn saved_path(&self) -> Option<&Path> {
        self.saved_path.as_deref()
    }

    pub fn set_saved_path(&mut self, path: Option<PathBuf>) {
        self.saved_path = path;
    }

    pub fn is_saved(&self) -> bool {
        self.saved_path.is_some()
    }
}
