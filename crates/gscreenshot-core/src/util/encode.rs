//! Image encoding utilities for saving and exporting screenshots
//!
//! This module converts `ImageBuffer` instances into encoded byte arrays.
//! It handles format-specific requirements like alpha channel conversion.
//!
//! # Format Support
//!
//! - **PNG**: Lossless, adaptive filtering
//! - **JPEG**: Lossy, quality 1-100 (alpha is dropped)
//! - **WebP**: Lossless only in image crate v0.25
//! - **BMP / GIF / TIFF**: Written through the image crate's generic encoders
//!
//! # Examples
//!
//! ```
//! use gscreenshot_core::{capture::ImageBuffer, model::ImageFormat, util::encode::encode_image};
//!
//! let img = ImageBuffer::from_test_pattern(320, 200);
//!
//! let png_bytes = encode_image(&img, ImageFormat::Png).unwrap();
//! assert!(!png_bytes.is_empty());
//! ```

use std::{io::Cursor, path::Path};

use image::{
    DynamicImage, ImageEncoder, Rgb, RgbImage,
    codecs::{
        jpeg::JpegEncoder,
        png::{CompressionType, FilterType, PngEncoder},
        webp::WebPEncoder,
    },
};

use crate::{
    capture::ImageBuffer,
    error::{CaptureError, CaptureResult},
    model::ImageFormat,
};

/// JPEG quality used when saving screenshots
pub const JPEG_QUALITY: u8 = 90;

fn encoding_failed(format: ImageFormat) -> impl FnOnce(image::ImageError) -> CaptureError {
    move |e| CaptureError::EncodingFailed {
        format: format.to_string(),
        reason: e.to_string(),
    }
}

/// Encodes as PNG with adaptive filtering
pub fn encode_png(buffer: &ImageBuffer) -> CaptureResult<Vec<u8>> {
    let rgba = buffer.to_rgba8();
    let mut output = Vec::new();

    PngEncoder::new_with_quality(
        Cursor::new(&mut output),
        CompressionType::Default,
        FilterType::Adaptive,
    )
    .write_image(rgba.as_raw(), rgba.width(), rgba.height(), image::ExtendedColorType::Rgba8)
    .map_err(encoding_failed(ImageFormat::Png))?;

    Ok(output)
}

/// Encodes as JPEG, `quality` clamped to 1..=100
///
/// Translucent pixels are flattened onto white.
pub fn encode_jpeg(buffer: &ImageBuffer, quality: u8) -> CaptureResult<Vec<u8>> {
    let rgba = buffer.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(CaptureError::InvalidParameter {
            parameter: "dimensions".to_string(),
            reason:    "cannot encode an empty image".to_string(),
        });
    }

    let flat = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha)) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    });

    let mut output = Vec::new();
    JpegEncoder::new_with_quality(Cursor::new(&mut output), quality.clamp(1, 100))
        .write_image(flat.as_raw(), flat.width(), flat.height(), image::ExtendedColorType::Rgb8)
        .map_err(encoding_failed(ImageFormat::Jpeg))?;

    Ok(output)
}

/// Encodes as lossless WebP
pub fn encode_webp(buffer: &ImageBuffer) -> CaptureResult<Vec<u8>> {
    let rgba = buffer.to_rgba8();
    let mut output = Vec::new();

    WebPEncoder::new_lossless(Cursor::new(&mut output))
        .write_image(rgba.as_raw(), rgba.width(), rgba.height(), image::ExtendedColorType::Rgba8)
        .map_err(encoding_failed(ImageFormat::Webp))?;

    Ok(output)
}

/// Encodes an image in the requested format
pub fn encode_image(buffer: &ImageBuffer, format: ImageFormat) -> CaptureResult<Vec<u8>> {
    let target = match format {
        ImageFormat::Png => return encode_png(buffer),
        ImageFormat::Jpeg => return encode_jpeg(buffer, JPEG_QUALITY),
        ImageFormat::Webp => return encode_webp(buffer),
        ImageFormat::Bmp => image::ImageFormat::Bmp,
        ImageFormat::Gif => image::ImageFormat::Gif,
        ImageFormat::Tiff => image::ImageFormat::Tiff,
    };

    // RGBA8 is accepted by the BMP, GIF and TIFF writers alike
    let mut output = Vec::new();
    DynamicImage::ImageRgba8(buffer.to_rgba8())
        .write_to(&mut Cursor::new(&mut output), target)
        .map_err(encoding_failed(format))?;
    Ok(output)
}

/// Encodes an image and writes it to `path`
pub fn write_image(buffer: &ImageBuffer, path: &Path, format: ImageFormat) -> CaptureResult<()> {
    let bytes = encode_image(buffer, format)?;
    std::fs::write(path, bytes).map_err(CaptureError::IoError)
}

#[cfg(test)]
mod tests {
    use image::GenericImageView;

    use super::*;

    #[test]
    fn test_encode_png_is_lossless() {
        let img = ImageBuffer::from_test_pattern(64, 48);
        let bytes = encode_png(&img).unwrap();

        assert_eq!(&bytes[1..4], b"PNG");
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.to_rgba8(), img.to_rgba8());
    }

    #[test]
    fn test_encode_jpeg_alpha_removed() {
        let img = ImageBuffer::from_test_pattern(32, 32);
        let bytes = encode_jpeg(&img, 80).unwrap();

        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (32, 32));
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn test_encode_jpeg_flattens_onto_white() {
        let clear = image::RgbaImage::from_pixel(16, 16, image::Rgba([0, 0, 0, 0]));
        let img = ImageBuffer::new(image::DynamicImage::ImageRgba8(clear));

        let decoded = image::load_from_memory(&encode_jpeg(&img, 95).unwrap()).unwrap().to_rgb8();
        assert!(decoded.pixels().all(|p| p.0.iter().all(|&c| c > 245)));
    }

    #[test]
    fn test_encode_jpeg_quality_affects_size() {
        let img = ImageBuffer::from_test_pattern(256, 256);
        let low = encode_jpeg(&img, 10).unwrap();
        let high = encode_jpeg(&img, 100).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_encode_webp() {
        let img = ImageBuffer::from_test_pattern(40, 30);
        let bytes = encode_webp(&img).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");
    }

    #[test]
    fn test_encode_image_every_format_decodes() {
        let img = ImageBuffer::from_test_pattern(20, 10);
        for ext in ImageFormat::EXTENSIONS {
            let format = ImageFormat::from_extension(ext).unwrap();
            let bytes = encode_image(&img, format).unwrap();
            let decoded = image::load_from_memory(&bytes).unwrap();
            assert_eq!(decoded.dimensions(), (20, 10), "format {}", format);
        }
    }

    #[test]
    fn test_write_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bmp");
        write_image(&ImageBuffer::from_test_pattern(8, 8), &path, ImageFormat::Bmp).unwrap();
        assert_eq!(image::open(&path).unwrap().dimensions(), (8, 8));
    }

    #[test]
    fn test_write_image_to_missing_dir_fails() {
        let result = write_image(
            &ImageBuffer::from_test_pattern(8, 8),
            Path::new("/nonexistent/dir/out.png"),
            ImageFormat::Png,
        );
        assert!(matches!(result, Err(CaptureError::IoError(_))));
    }
}
