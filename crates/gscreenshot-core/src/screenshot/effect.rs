//! Non-destructive effects layered on top of a raw capture

use tracing::warn;

use super::CursorGlyph;
use crate::{
    capture::{
        ImageBuffer,
        constants::{GLYPH_REFERENCE_WIDTH, MIN_GLYPH_SCALE},
    },
    error::CaptureResult,
    model::Region,
};

/// Crops the image to a region
#[derive(Debug, Clone, PartialEq)]
pub struct CropEffect {
    /// Region to keep, in image pixels
    pub region: Region,
}

impl CropEffect {
    pub fn apply_to(&self, image: &ImageBuffer) -> CaptureResult<ImageBuffer> {
        image.crop(self.region)
    }
}

/// Draws a cursor glyph centred on a point
#[derive(Debug, Clone, PartialEq)]
pub struct StampEffect {
    /// Glyph to draw
    pub glyph:    CursorGlyph,
    /// Pointer hotspot, in image pixels
    pub position: (i32, i32),
}

impl StampEffect {
    /// Scale applied to the glyph for an image of the given width
    ///
    /// Glyphs are drawn at native size on a 1920px-wide capture and scaled
    /// proportionally otherwise, never below [`MIN_GLYPH_SCALE`].
    pub fn glyph_scale(image_width: u32) -> f64 {
        (image_width as f64 / GLYPH_REFERENCE_WIDTH as f64).max(MIN_GLYPH_SCALE)
    }

    pub fn apply_to(&self, image: &ImageBuffer) -> CaptureResult<ImageBuffer> {
        let glyph = self
            .glyph
            .render()
            .scale(Self::glyph_scale(image.width()) as f32)?;
        let (gw, gh) = glyph.dimensions();

        let x = self.position.0 as i64 - (gw / 2) as i64;
        let y = self.position.1 as i64 - (gh / 2) as i64;
        Ok(image.overlay(&glyph, x, y))
    }
}

/// The kinds of effect a screenshot can carry
#[derive(Debug, Clone, PartialEq)]
pub enum EffectKind {
    Crop(CropEffect),
    Stamp(StampEffect),
}

/// An effect plus its toggle state and lookup alias
///
/// Disabling an effect keeps all of its parameters, so it can be turned back
/// on later with the same result.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenshotEffect {
    kind:    EffectKind,
    enabled: bool,
    alias:   Option<String>,
}

impl ScreenshotEffect {
    /// Enabled crop effect without an alias
    pub fn crop(region: Region) -> Self {
        Self::new(EffectKind::Crop(CropEffect { region }))
    }

    /// Enabled stamp effect without an alias
    pub fn stamp(glyph: CursorGlyph, position: (i32, i32)) -> Self {
        Self::new(EffectKind::Stamp(StampEffect { glyph, position }))
    }

    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            enabled: true,
            alias: None,
        }
    }

    /// Tags the effect so it can be found with [`Screenshot::effect`]
    ///
    /// [`Screenshot::effect`]: super::Screenshot::effect
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn kind(&self) -> &EffectKind {
        &self.kind
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Name of the effect type, for logs
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            EffectKind::Crop(_) => "crop",
            EffectKind::Stamp(_) => "stamp",
        }
    }

    /// Returns a transformed copy of `image`
    ///
    /// A disabled effect returns the input unchanged. An effect that cannot
    /// be applied (a crop entirely outside the image) is skipped with a
    /// warning.
    pub fn apply_to(&self, image: &ImageBuffer) -> ImageBuffer {
        if !self.enabled {
            return image.clone();
        }

        let result = match &self.kind {
            EffectKind::Crop(crop) => crop.apply_to(image),
            EffectKind::Stamp(stamp) => stamp.apply_to(image),
        };

        result.unwrap_or_else(|e| {
            warn!(effect = self.type_name(), alias = ?self.alias, "Skipping effect: {}", e);
            image.clone()
        })
    }
}
