use crate::foundation::error::{SlidecastError, SlidecastResult};

pub use kurbo::{Point, Vec2};

/// Absolute 0-based frame index inside one clip or segment.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> SlidecastResult<Self> {
        if den == 0 {
            return Err(SlidecastError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(SlidecastError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Integer frame rate `num/1`.
    pub fn integer(num: u32) -> SlidecastResult<Self> {
        Self::new(num, 1)
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Convert seconds to frame count using floor semantics.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64()).floor().max(0.0) as u64
    }

    /// Convert seconds to the nearest frame count.
    pub fn secs_to_frames_round(self, secs: f64) -> u64 {
        (secs * self.as_f64()).round().max(0.0) as u64
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a canvas, rejecting zero-sized dimensions.
    pub fn new(width: u32, height: u32) -> SlidecastResult<Self> {
        if width == 0 || height == 0 {
            return Err(SlidecastError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        Ok(Self { width, height })
    }

    /// 1920x1080.
    pub const FULL_HD: Self = Self {
        width: 1920,
        height: 1080,
    };

    /// Number of RGBA8 bytes for one frame at this size.
    pub fn rgba_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }

    /// Width and height as `u16`, as required by the raster backend.
    pub fn as_u16(self) -> SlidecastResult<(u16, u16)> {
        let w: u16 = self
            .width
            .try_into()
            .map_err(|_| SlidecastError::validation("canvas width exceeds u16"))?;
        let h: u16 = self
            .height
            .try_into()
            .map_err(|_| SlidecastError::validation("canvas height exceeds u16"))?;
        Ok((w, h))
    }
}

/// Straight-alpha opaque RGB color, serialized as `[r, g, b]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Construct from channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Opaque RGBA8 bytes.
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }

    /// `0xRRGGBB` notation as understood by ffmpeg's `color` source.
    pub fn to_ffmpeg_hex(self) -> String {
        format!("0x{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for Rgb8 {
    fn from(v: [u8; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Rgb8> for [u8; 3] {
    fn from(c: Rgb8) -> Self {
        [c.r, c.g, c.b]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
