use crate::foundation::error::{RotoError, RotoResult};

pub use kurbo::{Point, Rect, Vec2};

/// Integer frame time. Negative frames are valid.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct Frame(pub i32);

impl Frame {
    /// Frame as a floating-point time value.
    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pixel-aligned rectangle requested from the renderer, in full-resolution pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: i32,
    /// Top edge in pixels.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Create a validated, non-empty viewport.
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> RotoResult<Self> {
        if width == 0 || height == 0 {
            return Err(RotoError::validation("viewport width/height must be > 0"));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Viewport anchored at the origin.
    pub fn from_size(width: u32, height: u32) -> RotoResult<Self> {
        Self::new(0, 0, width, height)
    }

    /// Scale this viewport down to mipmap `level`.
    ///
    /// The origin is floored and the far edge ceiled so the scaled viewport always covers the
    /// full-resolution one.
    pub fn at_mip(self, level: u32) -> Self {
        if level == 0 {
            return self;
        }
        let div = mip_divisor(level);
        let x0 = (f64::from(self.x) / div).floor();
        let y0 = (f64::from(self.y) / div).floor();
        let x1 = ((f64::from(self.x) + f64::from(self.width)) / div).ceil();
        let y1 = ((f64::from(self.y) + f64::from(self.height)) / div).ceil();
        Self {
            x: x0 as i32,
            y: y0 as i32,
            width: ((x1 - x0) as u32).max(1),
            height: ((y1 - y0) as u32).max(1),
        }
    }

    /// Number of pixels covered by the viewport.
    pub fn area(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }
}

/// Scale factor applied to canonical coordinates at mipmap `level`.
pub fn mip_scale(level: u32) -> f64 {
    1.0 / mip_divisor(level)
}

fn mip_divisor(level: u32) -> f64 {
    f64::from(2u32.saturating_pow(level.min(31)))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
