//! Core data model for artwork placement.
//!
//! A `PlacementRecord` is one artwork instance on the canvas: a box
//! (`position` + `size`) with an independent 3D-ish transform applied on top,
//! plus optional frame and mat decorations. Records are immutable values;
//! every edit produces a new record (see `placement.rs`).

use crate::error::ModelError;
use crate::id::{ArtworkId, ScenarioId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0], serialized as hex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build an opaque color from 8-bit channels.
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let short = |i: usize| hex_val(bytes[i]).map(|v| (v * 17) as f32 / 255.0);
        let long = |i: usize| {
            let hi = hex_val(bytes[i])?;
            let lo = hex_val(bytes[i + 1])?;
            Some((hi << 4 | lo) as f32 / 255.0)
        };

        match bytes.len() {
            3 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, 1.0)),
            4 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, short(3)?)),
            6 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, 1.0)),
            8 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, long(6)?)),
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (r, g, b, a) = (channel(self.r), channel(self.g), channel(self.b), channel(self.a));
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).ok_or_else(|| serde::de::Error::custom(ModelError::InvalidColor(s)))
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// Top-left offset in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Bounding box in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Natural pixel dimensions of a source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageDimensions {
    pub width: f64,
    pub height: f64,
}

impl ImageDimensions {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// `width / height`, guarded against zero, negative, and non-finite sides.
    pub fn aspect_ratio(&self) -> Result<f64, ModelError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(self.width) || !valid(self.height) {
            return Err(ModelError::InvalidImageDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.width / self.height)
    }
}

// ─── Transform & decorations ─────────────────────────────────────────────

/// Perspective/rotation/scale applied around the center of the record's box.
/// Angles are in degrees, perspective in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform3d {
    pub perspective: f64,
    pub rotate_x: f64,
    pub rotate_y: f64,
    pub rotation: f64,
    pub scale: f64,
}

impl Transform3d {
    pub const DEFAULT: Self = Self {
        perspective: 1000.0,
        rotate_x: 0.0,
        rotate_y: 0.0,
        rotation: 0.0,
        scale: 1.0,
    };

    /// UI range for all three rotation angles.
    pub const ROTATION_RANGE: (f64, f64) = (-180.0, 180.0);
}

impl Default for Transform3d {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Decorative outer border drawn as padding around the mat and image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameStyle {
    pub show: bool,
    pub width: f64,
    pub height: f64,
    pub color: Color,
}

impl FrameStyle {
    pub const DEFAULT_COLOR: Color = Color::rgb8(0x33, 0x33, 0x33);
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self {
            show: false,
            width: 20.0,
            height: 20.0,
            color: Self::DEFAULT_COLOR,
        }
    }
}

/// Decorative inset border between the frame and the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatStyle {
    pub show: bool,
    pub width: f64,
    pub height: f64,
}

impl MatStyle {
    /// Mats are always drawn in this off-white.
    pub const COLOR: Color = Color::rgb8(0xF1, 0xF1, 0xF1);
}

impl Default for MatStyle {
    fn default() -> Self {
        Self {
            show: false,
            width: 20.0,
            height: 20.0,
        }
    }
}

// ─── Metadata & image ────────────────────────────────────────────────────

/// Descriptive data entered when the artwork is uploaded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkMetadata {
    pub title: String,
    pub artist: String,
    pub year: i32,
    /// Physical width in centimetres.
    pub physical_width: f64,
    /// Physical height in centimetres.
    pub physical_height: f64,
}

impl ArtworkMetadata {
    /// All descriptive fields are required by the upload form.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.title.trim().is_empty() {
            return Err(ModelError::invalid("metadata.title", "<empty>"));
        }
        if self.artist.trim().is_empty() {
            return Err(ModelError::invalid("metadata.artist", "<empty>"));
        }
        if !(self.physical_width.is_finite() && self.physical_width > 0.0) {
            return Err(ModelError::invalid(
                "metadata.physicalWidth",
                self.physical_width,
            ));
        }
        if !(self.physical_height.is_finite() && self.physical_height > 0.0) {
            return Err(ModelError::invalid(
                "metadata.physicalHeight",
                self.physical_height,
            ));
        }
        Ok(())
    }
}

/// Opaque reference to a stored image, as returned by the persistence service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitute the reference into a display URL.
    ///
    /// Relative references (`/api/uploads/...`) are appended to `base`;
    /// absolute URLs and `data:` URLs are returned unchanged.
    pub fn display_url(&self, base: &str) -> String {
        let r = self.0.as_str();
        if r.starts_with("data:") || r.starts_with("http://") || r.starts_with("https://") {
            return r.to_string();
        }
        let base = base.trim_end_matches('/');
        if r.starts_with('/') {
            format!("{base}{r}")
        } else {
            format!("{base}/{r}")
        }
    }
}

// ─── Records ─────────────────────────────────────────────────────────────

/// One artwork instance's editable state on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub id: ArtworkId,
    pub position: Position,
    pub size: Size,
    pub transform3d: Transform3d,
    pub frame: FrameStyle,
    pub mat: MatStyle,
    pub metadata: ArtworkMetadata,
    #[serde(default)]
    pub image: ImageRef,
}

/// A background room image artworks are composited against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    pub name: String,
    pub image: ImageRef,
}
