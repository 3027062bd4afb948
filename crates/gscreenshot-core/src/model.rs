//! Data models and type definitions for gscreenshot-core
//!
//! This module defines the value types shared by the capture pipeline:
//! - Session and backend-role identification
//! - Screen regions and selection styling
//! - The capability map that backends use to advertise features
//! - Options accepted by the `grab_*` operations

use std::{collections::BTreeMap, str::FromStr, time::Duration};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{error::CaptureError, screenshot::CursorGlyph};

/// Desktop session type, which decides the backend candidate lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    /// No graphical session detected
    None,
    /// Wayland compositor
    Wayland,
    /// X11 display server
    X11,
}

impl SessionType {
    /// Returns the session type as a lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::None => "none",
            SessionType::Wayland => "wayland",
            SessionType::X11 => "x11",
        }
    }

    /// Whether Wayland-native tools must be used
    pub fn is_wayland(&self) -> bool {
        matches!(self, SessionType::Wayland)
    }
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Platform information including OS and session type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlatformInfo {
    /// Operating system name (e.g., "linux")
    pub os:      String,
    /// Detected session type
    pub session: SessionType,
}

impl PlatformInfo {
    /// Creates a new PlatformInfo instance
    pub fn new(os: String, session: SessionType) -> Self {
        Self { os, session }
    }
}

/// Role a strategy plays in the capture pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Full-screen capture utility
    Screenshooter,
    /// Interactive region/window picker
    RegionSelector,
    /// Pointer position lookup
    CursorLocator,
}

impl BackendKind {
    /// Human-readable role name
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Screenshooter => "screenshooter",
            BackendKind::RegionSelector => "region selector",
            BackendKind::CursorLocator => "cursor locator",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A rectangle in output pixel coordinates
///
/// Stored as `(left, top, right, bottom)` with `right`/`bottom` exclusive.
/// Regions produced by selectors are already multiplied by the display
/// scaling factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Region {
    /// Left edge
    pub left:   i32,
    /// Top edge
    pub top:    i32,
    /// Right edge (exclusive)
    pub right:  i32,
    /// Bottom edge (exclusive)
    pub bottom: i32,
}

impl Region {
    /// Creates a region from its four edges
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates a region from an origin and a size
    ///
    /// # Examples
    ///
    /// ```
    /// use gscreenshot_core::model::Region;
    ///
    /// let region = Region::from_xywh(1, 2, 3, 4);
    /// assert_eq!(region.as_tuple(), (1, 2, 4, 6));
    /// ```
    pub fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x.saturating_add(width), y.saturating_add(height))
    }

    /// Width in pixels (zero when the edges are inverted)
    pub fn width(&self) -> u32 {
        span(self.left, self.right)
    }

    /// Height in pixels (zero when the edges are inverted)
    pub fn height(&self) -> u32 {
        span(self.top, self.bottom)
    }

    /// Whether the region covers no pixels
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Multiplies every edge by a display scaling factor
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |v: i32| (v as f64 * factor).round() as i32;
        Self::new(
            scale(self.left),
            scale(self.top),
            scale(self.right),
            scale(self.bottom),
        )
    }

    /// Returns `(left, top, right, bottom)`
    pub fn as_tuple(&self) -> (i32, i32, i32, i32) {
        (self.left, self.top, self.right, self.bottom)
    }
}

/// Distance from `start` to `end`, computed wide so extreme edges cannot overflow
fn span(start: i32, end: i32) -> u32 {
    (i64::from(end) - i64::from(start)).clamp(0, i64::from(u32::MAX)) as u32
}

impl FromStr for Region {
    type Err = CaptureError;

    /// Parses `X,Y,W,H` (whitespace around the numbers is ignored)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| CaptureError::InvalidParameter {
            parameter: "region".to_string(),
            reason,
        };

        let parts: Vec<i32> = s
            .split(',')
            .map(|p| p.trim().parse::<i32>())
            .collect::<Result<_, _>>()
            .map_err(|e| invalid(format!("'{}' is not X,Y,W,H: {}", s, e)))?;

        let [x, y, w, h] = parts[..] else {
            return Err(invalid(format!("expected 4 values, got {}", parts.len())));
        };

        if w <= 0 || h <= 0 {
            return Err(invalid(format!("width and height must be positive, got {}x{}", w, h)));
        }

        Ok(Region::from_xywh(x, y, w, h))
    }
}

/// A named feature a backend may provide
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Interactive rectangle selection
    RegionSelection,
    /// Interactive window selection
    WindowSelection,
    /// The capture tool can burn the pointer into the image itself
    CursorCapture,
    /// A cursor glyph can be stamped onto the image after capture
    AlternateCursor,
    /// A previously selected region can be applied without re-selecting
    ReuseRegion,
    /// Display scaling was detected and is applied to regions
    ScalingDetection,
    /// Whole-screen capture
    CaptureFullscreen,
}

impl Capability {
    /// Every capability, in declaration order
    pub const ALL: [Capability; 7] = [
        Capability::RegionSelection,
        Capability::WindowSelection,
        Capability::CursorCapture,
        Capability::AlternateCursor,
        Capability::ReuseRegion,
        Capability::ScalingDetection,
        Capability::CaptureFullscreen,
    ];

    /// Kebab-case capability name
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::RegionSelection => "region-selection",
            Capability::WindowSelection => "window-selection",
            Capability::CursorCapture => "cursor-capture",
            Capability::AlternateCursor => "alternate-cursor",
            Capability::ReuseRegion => "reuse-region",
            Capability::ScalingDetection => "scaling-detection",
            Capability::CaptureFullscreen => "capture-fullscreen",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mapping from capability to the display name of the backend providing it
///
/// Maps are immutable once built; combining maps goes through
/// [`CapabilityMap::merged`], where later layers win on key collisions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityMap(BTreeMap<Capability, String>);

impl CapabilityMap {
    /// Creates an empty map
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns a copy of this map with one more entry
    ///
    /// # Examples
    ///
    /// ```
    /// use gscreenshot_core::model::{Capability, CapabilityMap};
    ///
    /// let caps = CapabilityMap::new()
    ///     .with(Capability::RegionSelection, "slop")
    ///     .with(Capability::WindowSelection, "slop");
    /// assert_eq!(caps.provider(Capability::RegionSelection), Some("slop"));
    /// ```
    pub fn with(mut self, capability: Capability, provider: impl Into<String>) -> Self {
        self.0.insert(capability, provider.into());
        self
    }

    /// Merges layers in order; a later layer overrides an earlier one for
    /// the same capability
    pub fn merged<'a>(layers: impl IntoIterator<Item = &'a CapabilityMap>) -> Self {
        let mut out = BTreeMap::new();
        for layer in layers {
            for (cap, provider) in &layer.0 {
                out.insert(*cap, provider.clone());
            }
        }
        Self(out)
    }

    /// Name of the backend providing a capability
    pub fn provider(&self, capability: Capability) -> Option<&str> {
        self.0.get(&capability).map(String::as_str)
    }

    /// Whether any backend provides a capability
    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains_key(&capability)
    }

    /// Number of capabilities provided
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no capability is provided
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates `(capability, provider)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (Capability, &str)> {
        self.0.iter().map(|(cap, provider)| (*cap, provider.as_str()))
    }
}

/// Normalized RGBA color for the selection overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionColor {
    /// Red, 0.0-1.0
    pub r: f32,
    /// Green, 0.0-1.0
    pub g: f32,
    /// Blue, 0.0-1.0
    pub b: f32,
    /// Alpha, 0.0-1.0
    pub a: f32,
}

impl SelectionColor {
    /// Translucent gray used when no color or an invalid color is given
    pub const DEFAULT: SelectionColor = SelectionColor {
        r: 0.5,
        g: 0.5,
        b: 0.5,
        a: 0.4,
    };

    /// Parses `#RRGGBB` or `#RRGGBBAA` (the `#` is optional)
    ///
    /// Malformed or missing input yields [`SelectionColor::DEFAULT`].
    ///
    /// # Examples
    ///
    /// ```
    /// use gscreenshot_core::model::SelectionColor;
    ///
    /// let red = SelectionColor::from_hex(Some("#ff000080"));
    /// assert_eq!(red.r, 1.0);
    /// assert!((red.a - 0.502).abs() < 0.01);
    ///
    /// assert_eq!(SelectionColor::from_hex(Some("nope")), SelectionColor::DEFAULT);
    /// ```
    pub fn from_hex(hex: Option<&str>) -> Self {
        hex.and_then(Self::parse_hex).unwrap_or(Self::DEFAULT)
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.is_ascii() || !(digits.len() == 6 || digits.len() == 8) {
            return None;
        }

        let channel = |i: usize| -> Option<f32> {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .ok()
                .map(|v| v as f32 / 255.0)
        };

        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if digits.len() == 8 { channel(6)? } else { 1.0 },
        })
    }

    /// Returns `(r, g, b, a)`
    pub fn as_tuple(&self) -> (f32, f32, f32, f32) {
        (self.r, self.g, self.b, self.a)
    }

    /// `r,g,b,a` floats, as slop's `--color` expects
    pub fn to_float_list(&self) -> String {
        format!("{:.3},{:.3},{:.3},{:.3}", self.r, self.g, self.b, self.a)
    }

    /// `#RRGGBBAA`, as slurp's `-b`/`-c` expect
    pub fn to_hex_rgba(&self) -> String {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}{:02x}",
            byte(self.r),
            byte(self.g),
            byte(self.b),
            byte(self.a)
        )
    }
}

impl Default for SelectionColor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Image formats screenshots can be saved as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG (lossless, default)
    Png,
    /// JPEG (lossy, no alpha)
    Jpeg,
    /// WebP (lossless)
    Webp,
    /// Windows bitmap
    Bmp,
    /// GIF (palette)
    Gif,
    /// TIFF
    Tiff,
}

impl ImageFormat {
    /// Extensions accepted by [`ImageFormat::from_extension`]
    pub const EXTENSIONS: [&'static str; 8] =
        ["png", "jpg", "jpeg", "webp", "bmp", "gif", "tif", "tiff"];

    /// Maps a file extension (case-insensitive, without the dot) to a format
    ///
    /// # Examples
    ///
    /// ```
    /// use gscreenshot_core::model::ImageFormat;
    ///
    /// assert_eq!(ImageFormat::from_extension("JPG"), Some(ImageFormat::Jpeg));
    /// assert_eq!(ImageFormat::from_extension("svg"), None);
    /// ```
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::Webp),
            "bmp" => Some(ImageFormat::Bmp),
            "gif" => Some(ImageFormat::Gif),
            "tif" | "tiff" => Some(ImageFormat::Tiff),
            _ => None,
        }
    }

    /// Canonical file extension
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Webp => "webp",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Gif => "gif",
            ImageFormat::Tiff => "tiff",
        }
    }

    /// MIME type, as clipboard tools expect
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Tiff => "image/tiff",
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Default selection border weight in pixels
pub const DEFAULT_BORDER_WEIGHT: u32 = 5;

/// Options accepted by every `grab_*` operation
#[derive(Debug, Clone)]
pub struct GrabOptions {
    /// Time to wait before capturing
    pub delay:          Duration,
    /// Whether the pointer should appear in the image
    pub capture_cursor: bool,
    /// Glyph to stamp instead of the native pointer
    pub cursor_glyph:   Option<CursorGlyph>,
    /// Explicit region; skips interactive selection when set
    pub region:         Option<Region>,
    /// Selection overlay color
    pub select_color:   SelectionColor,
    /// Selection overlay border weight in pixels
    pub border_weight:  u32,
}

impl Default for GrabOptions {
    fn default() -> Self {
        Self {
            delay:          Duration::ZERO,
            capture_cursor: false,
            cursor_glyph:   None,
            region:         None,
            select_color:   SelectionColor::DEFAULT,
            border_weight:  DEFAULT_BORDER_WEIGHT,
        }
    }
}

impl GrabOptions {
    /// Starts a builder with default options
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use gscreenshot_core::model::GrabOptions;
    ///
    /// let opts = GrabOptions::builder()
    ///     .delay(Duration::from_secs(2))
    ///     .capture_cursor(true)
    ///     .build();
    /// assert!(opts.capture_cursor);
    /// ```
    pub fn builder() -> GrabOptionsBuilder {
        GrabOptionsBuilder::default()
    }
}

/// Builder for [`GrabOptions`]
#[derive(Debug, Clone, Default)]
pub struct GrabOptionsBuilder {
    opts: GrabOptions,
}

impl GrabOptionsBuilder {
    /// Sets the capture delay
    pub fn delay(mut self, delay: Duration) -> Self {
        self.opts.delay = delay;
        self
    }

    /// Sets whether the pointer is captured
    pub fn capture_cursor(mut self, capture: bool) -> Self {
        self.opts.capture_cursor = capture;
        self
    }

    /// Sets a glyph to stamp in place of the native pointer
    pub fn cursor_glyph(mut self, glyph: Option<CursorGlyph>) -> Self {
        self.opts.cursor_glyph = glyph;
        self
    }

    /// Sets an explicit region
    pub fn region(mut self, region: Option<Region>) -> Self {
        self.opts.region = region;
        self
    }

    /// Sets the selection overlay color
    pub fn select_color(mut self, color: SelectionColor) -> Self {
        self.opts.select_color = color;
        self
    }

    /// Sets the selection overlay border weight
    pub fn border_weight(mut self, weight: u32) -> Self {
        self.opts.border_weight = weight;
        self
    }

    /// Finishes the builder
    pub fn build(self) -> GrabOptions {
        self.opts
    }
}
