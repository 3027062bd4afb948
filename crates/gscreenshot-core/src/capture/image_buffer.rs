//! Image buffer wrapper for screenshot data
//!
//! This module provides an `ImageBuffer` wrapper around `image::DynamicImage`
//! with the transformations the capture pipeline and the screenshot effects
//! need: cropping to a [`Region`], scaling, fitting into a preview box,
//! compositing a glyph, and padding with a drop shadow.
//!
//! All transformation methods return new `ImageBuffer` instances and leave
//! the original unchanged.
//!
//! # Examples
//!
//! ```
//! use gscreenshot_core::{capture::ImageBuffer, model::Region};
//!
//! let img = ImageBuffer::from_test_pattern(1920, 1080);
//!
//! let cropped = img.crop(Region::from_xywh(100, 100, 800, 400)).unwrap();
//! assert_eq!(cropped.dimensions(), (800, 400));
//!
//! let preview = img.resize_to_fit(192, 192);
//! assert_eq!(preview.dimensions(), (192, 108));
//! ```

use std::path::Path;

use image::{GenericImageView, Rgba, RgbaImage, imageops};

use crate::{
    error::{CaptureError, CaptureResult},
    model::Region,
};

/// Wrapper around `image::DynamicImage` with transformation methods
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBuffer {
    inner: image::DynamicImage,
}

impl ImageBuffer {
    /// Creates a new ImageBuffer from a DynamicImage
    pub fn new(image: image::DynamicImage) -> Self {
        Self { inner: image }
    }

    /// Decodes an image file fully into memory
    ///
    /// The file is not needed after this returns, so callers may delete it
    /// right away.
    pub fn load(path: &Path) -> CaptureResult<Self> {
        let image = image::open(path).map_err(|e| {
            CaptureError::ImageError(format!("failed to load {}: {}", path.display(), e))
        })?;
        Ok(Self::new(image))
    }

    /// Decodes an encoded image held in memory
    pub fn from_encoded(bytes: &[u8]) -> CaptureResult<Self> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| CaptureError::ImageError(format!("failed to decode image: {}", e)))?;
        Ok(Self::new(image))
    }

    /// Scales the image by the given factor
    ///
    /// Uses Lanczos3 filtering. The factor is clamped to 0.01-4.0 and the
    /// result is at least 1x1.
    pub fn scale(&self, factor: f32) -> CaptureResult<Self> {
        let factor = factor.clamp(0.01, 4.0);

        let (width, height) = self.dimensions();
        let new_width = ((width as f32) * factor) as u32;
        let new_height = ((height as f32) * factor) as u32;

        if new_width == width && new_height == height {
            return Ok(self.clone());
        }

        let scaled = self.inner.resize_exact(
            new_width.max(1),
            new_height.max(1),
            imageops::FilterType::Lanczos3,
        );

        Ok(Self::new(scaled))
    }

    /// Shrinks the image to fit inside `max_width` x `max_height`
    ///
    /// The aspect ratio is preserved and the image is never enlarged.
    pub fn resize_to_fit(&self, max_width: u32, max_height: u32) -> Self {
        let (width, height) = self.dimensions();
        if width <= max_width && height <= max_height {
            return self.clone();
        }

        let ratio = f64::min(
            max_width as f64 / width.max(1) as f64,
            max_height as f64 / height.max(1) as f64,
        );
        let new_width = ((width as f64 * ratio).round() as u32).max(1);
        let new_height = ((height as f64 * ratio).round() as u32).max(1);

        Self::new(
            self.inner
                .resize_exact(new_width, new_height, imageops::FilterType::Triangle),
        )
    }

    /// Crops the image to the specified region
    ///
    /// The region is clamped to the image bounds. A region that does not
    /// overlap the image at all is an error.
    pub fn crop(&self, region: Region) -> CaptureResult<Self> {
        let (img_width, img_height) = self.dimensions();

        let left = region.left.clamp(0, img_width as i32) as u32;
        let top = region.top.clamp(0, img_height as i32) as u32;
        let right = region.right.clamp(0, img_width as i32) as u32;
        let bottom = region.bottom.clamp(0, img_height as i32) as u32;

        if right <= left || bottom <= top {
            return Err(CaptureError::InvalidParameter {
                parameter: "region".to_string(),
                reason:    format!(
                    "Region {:?} does not overlap the image ({}x{})",
                    region.as_tuple(),
                    img_width,
                    img_height
                ),
            });
        }

        let cropped = self.inner.crop_imm(left, top, right - left, bottom - top);
        Ok(Self::new(cropped))
    }

    /// Alpha-composites `glyph` with its top-left corner at `(x, y)`
    ///
    /// Parts of the glyph outside the image, including negative offsets,
    /// are clipped.
    pub fn overlay(&self, glyph: &ImageBuffer, x: i64, y: i64) -> Self {
        let mut base = self.inner.to_rgba8();
        imageops::overlay(&mut base, &glyph.to_rgba8(), x, y);
        Self::new(image::DynamicImage::ImageRgba8(base))
    }

    /// Adds a transparent frame of `padding` pixels with a soft drop shadow
    pub fn pad_with_shadow(&self, padding: u32) -> Self {
        if padding == 0 {
            return self.clone();
        }

        let (width, height) = self.dimensions();
        let canvas_width = width + padding * 2;
        let canvas_height = height + padding * 2;
        let offset = padding / 2;

        let mut shadow = RgbaImage::new(canvas_width, canvas_height);
        for y in (padding + offset)..(padding + offset + height).min(canvas_height) {
            for x in (padding + offset)..(padding + offset + width).min(canvas_width) {
                shadow.put_pixel(x, y, Rgba([0, 0, 0, 110]));
            }
        }

        let mut canvas = imageops::blur(&shadow, (padding as f32 / 3.0).max(0.5));
        imageops::overlay(&mut canvas, &self.to_rgba8(), padding as i64, padding as i64);

        Self::new(image::DynamicImage::ImageRgba8(canvas))
    }

    /// Returns the dimensions of the image as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    /// Returns the image width in pixels
    pub fn width(&self) -> u32 {
        self.dimensions().0
    }

    /// Returns the image height in pixels
    pub fn height(&self) -> u32 {
        self.dimensions().1
    }

    /// Converts the image to RGBA8 format
    pub fn to_rgba8(&self) -> RgbaImage {
        self.inner.to_rgba8()
    }

    /// Creates a test pattern image with the specified dimensions
    ///
    /// The pattern is a vertical gradient from blue (top) to cyan (bottom),
    /// useful for exercising the pipeline without a real capture tool.
    pub fn from_test_pattern(width: u32, height: u32) -> Self {
        let start_color = Rgba([0u8, 0u8, 255u8, 255u8]);
        let end_color = Rgba([0u8, 255u8, 255u8, 255u8]);

        let img = RgbaImage::from_fn(width, height, |_x, y| {
            let ratio = y as f32 / height.max(1) as f32;
            Rgba([
                (start_color[0] as f32 * (1.0 - ratio) + end_color[0] as f32 * ratio) as u8,
                (start_color[1] as f32 * (1.0 - ratio) + end_color[1] as f32 * ratio) as u8,
                (start_color[2] as f32 * (1.0 - ratio) + end_color[2] as f32 * ratio) as u8,
                255,
            ])
        });

        Self::new(image::DynamicImage::ImageRgba8(img))
    }

    /// Returns a reference to the inner DynamicImage
    pub fn inner(&self) -> &image::DynamicImage {
        &self.inner
    }

    /// Consumes self and returns the inner DynamicImage
    pub fn into_inner(self) -> image::DynamicImage {
        self.inner
    }
}
