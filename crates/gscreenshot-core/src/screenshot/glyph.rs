//! Cursor glyphs stamped onto captures whose backend cannot draw the pointer
//!
//! The built-in glyphs are drawn procedurally so the crate does not ship
//! image assets. Each one is a square of [`CURSOR_GLYPH_SIZE`] pixels whose
//! hotspot sits at the centre, which lets the stamp effect centre the glyph
//! on the pointer position by subtracting half its size.

use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::{
    capture::{ImageBuffer, constants::CURSOR_GLYPH_SIZE},
    error::{CaptureError, CaptureResult},
};

const OUTLINE: Rgba<u8> = Rgba([0, 0, 0, 255]);
const FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);
const PROHIBIT_RED: Rgba<u8> = Rgba([204, 0, 0, 255]);
const ALLOW_GREEN: Rgba<u8> = Rgba([46, 160, 67, 255]);

/// Arrow outline relative to its tip, in glyph pixels
const ARROW: [(f32, f32); 7] = [
    (0.0, 0.0),
    (0.0, 26.0),
    (6.5, 20.0),
    (11.0, 30.0),
    (15.0, 28.5),
    (10.5, 18.5),
    (19.0, 18.5),
];

/// Glyph drawn in place of the pointer
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CursorGlyph {
    /// White arrow with a black outline
    #[default]
    Default,
    /// Same arrow, under the name of the GNOME cursor theme
    Adwaita,
    /// Red "not allowed" circle with a slash
    Prohibit,
    /// Green disc with a check mark
    Allow,
    /// User-supplied image, drawn centred on the pointer
    Custom(ImageBuffer),
}

impl CursorGlyph {
    /// Names accepted by [`CursorGlyph::from_name_or_path`]
    pub const BUILTIN_NAMES: [&'static str; 4] = ["default", "adwaita", "prohibit", "allow"];

    /// Resolves a built-in glyph name, or loads an image file
    ///
    /// # Examples
    ///
    /// ```
    /// use gscreenshot_core::screenshot::CursorGlyph;
    ///
    /// assert_eq!(CursorGlyph::from_name_or_path("Prohibit").unwrap(), CursorGlyph::Prohibit);
    /// assert!(CursorGlyph::from_name_or_path("/nonexistent/cursor.png").is_err());
    /// ```
    pub fn from_name_or_path(value: &str) -> CaptureResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(CursorGlyph::Default),
            "adwaita" => Ok(CursorGlyph::Adwaita),
            "prohibit" => Ok(CursorGlyph::Prohibit),
            "allow" => Ok(CursorGlyph::Allow),
            _ => {
                let path = Path::new(value);
                if !path.is_file() {
                    return Err(CaptureError::InvalidParameter {
                        parameter: "pointer-glyph".to_string(),
                        reason:    format!(
                            "'{}' is neither a file nor one of: {}",
                            value,
                            Self::BUILTIN_NAMES.join(", ")
                        ),
                    });
                }
                Ok(CursorGlyph::Custom(ImageBuffer::load(path)?))
            }
        }
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            CursorGlyph::Default => "default",
            CursorGlyph::Adwaita => "adwaita",
            CursorGlyph::Prohibit => "prohibit",
            CursorGlyph::Allow => "allow",
            CursorGlyph::Custom(_) => "custom",
        }
    }

    /// Renders the glyph at its native size
    pub fn render(&self) -> ImageBuffer {
        let image = match self {
            CursorGlyph::Default | CursorGlyph::Adwaita => draw_arrow(),
            CursorGlyph::Prohibit => draw_prohibit(),
            CursorGlyph::Allow => draw_allow(),
            CursorGlyph::Custom(image) => return image.clone(),
        };
        ImageBuffer::new(image::DynamicImage::ImageRgba8(image))
    }
}

/// Calls `paint` for the centre of every pixel, relative to the glyph centre
fn draw(paint: impl Fn(f32, f32) -> Option<Rgba<u8>>) -> RgbaImage {
    let half = CURSOR_GLYPH_SIZE as f32 / 2.0;
    RgbaImage::from_fn(CURSOR_GLYPH_SIZE, CURSOR_GLYPH_SIZE, |x, y| {
        paint(x as f32 + 0.5 - half, y as f32 + 0.5 - half).unwrap_or(Rgba([0, 0, 0, 0]))
    })
}

fn draw_arrow() -> RgbaImage {
    draw(|x, y| {
        if !inside_polygon(&ARROW, x, y) {
            return None;
        }
        let edge = ARROW
            .iter()
            .zip(ARROW.iter().cycle().skip(1))
            .map(|(a, b)| distance_to_segment((x, y), *a, *b))
            .fold(f32::MAX, f32::min);
        Some(if edge < 1.6 { OUTLINE } else { FILL })
    })
}

fn draw_prohibit() -> RgbaImage {
    draw(|x, y| {
        let r = (x * x + y * y).sqrt();
        if r > 26.0 {
            return None;
        }
        let on_ring = r >= 20.0;
        let on_slash = distance_to_segment((x, y), (-15.0, -15.0), (15.0, 15.0)) < 3.5;
        if on_ring || on_slash {
            Some(PROHIBIT_RED)
        } else {
            Some(FILL)
        }
    })
}

fn draw_allow() -> RgbaImage {
    draw(|x, y| {
        let r = (x * x + y * y).sqrt();
        if r > 26.0 {
            return None;
        }
        let on_check = distance_to_segment((x, y), (-12.0, 1.0), (-4.0, 10.0)) < 3.5
            || distance_to_segment((x, y), (-4.0, 10.0), (13.0, -9.0)) < 3.5;
        Some(if on_check { FILL } else { ALLOW_GREEN })
    })
}

/// Even-odd ray casting test
fn inside_polygon(points: &[(f32, f32)], x: f32, y: f32) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (xi, yi) = points[i];
        let (xj, yj) = points[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn distance_to_segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names_resolve() {
        for name in CursorGlyph::BUILTIN_NAMES {
            let glyph = CursorGlyph::from_name_or_path(name).unwrap();
            assert_eq!(glyph.name(), name);
        }
    }

    #[test]
    fn test_unknown_name_is_invalid_parameter() {
        let err = CursorGlyph::from_name_or_path("sparkles").unwrap_err();
        assert!(matches!(err, CaptureError::InvalidParameter { .. }));
        assert!(err.to_string().contains("prohibit"));
    }

    #[test]
    fn test_custom_glyph_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hand.png");
        ImageBuffer::from_test_pattern(12, 20).inner().save(&path).unwrap();

        let glyph = CursorGlyph::from_name_or_path(path.to_str().unwrap()).unwrap();
        assert_eq!(glyph.name(), "custom");
        assert_eq!(glyph.render().dimensions(), (12, 20));
    }

    #[test]
    fn test_builtin_glyphs_are_square() {
        for glyph in [
            CursorGlyph::Default,
            CursorGlyph::Adwaita,
            CursorGlyph::Prohibit,
            CursorGlyph::Allow,
        ] {
            assert_eq!(glyph.render().dimensions(), (CURSOR_GLYPH_SIZE, CURSOR_GLYPH_SIZE));
        }
    }

    #[test]
    fn test_arrow_tip_is_at_centre() {
        let arrow = CursorGlyph::Default.render().to_rgba8();
        let c = CURSOR_GLYPH_SIZE / 2;

        // Body of the arrow lies below-right of the tip, nothing above-left
        assert_eq!(arrow.get_pixel(c - 4, c - 4)[3], 0);
        assert_eq!(arrow.get_pixel(c + 4, c + 12), &FILL);
        assert_eq!(arrow.get_pixel(c, c + 10), &OUTLINE);
    }

    #[test]
    fn test_prohibit_and_allow_colors() {
        let c = CURSOR_GLYPH_SIZE / 2;
        let prohibit = CursorGlyph::Prohibit.render().to_rgba8();
        assert_eq!(prohibit.get_pixel(c, c), &PROHIBIT_RED);
        assert_eq!(prohibit.get_pixel(0, 0)[3], 0);

        let allow = CursorGlyph::Allow.render().to_rgba8();
        assert_eq!(allow.get_pixel(c, c - 18), &ALLOW_GREEN);
    }

    #[test]
    fn test_distance_to_segment() {
        assert_eq!(distance_to_segment((0.0, 5.0), (0.0, 0.0), (10.0, 0.0)), 5.0);
        assert_eq!(distance_to_segment((-3.0, 4.0), (0.0, 0.0), (10.0, 0.0)), 5.0);
    }
}
