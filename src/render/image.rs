use std::path::Path;

use anyhow::Context;

use crate::foundation::core::Viewport;
use crate::foundation::error::{RotoError, RotoResult};

/// Single-channel float mask covering a [`Viewport`] at a given mipmap level.
///
/// `viewport` is expressed in pixels of the mip level, not full-resolution pixels. Values are
/// row-major and lie in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskImage {
    viewport: Viewport,
    mip_level: u32,
    data: Vec<f32>,
}

impl MaskImage {
    /// Black mask over `viewport`.
    pub fn new(viewport: Viewport, mip_level: u32) -> Self {
        Self {
            viewport,
            mip_level,
            data: vec![0.0; viewport.area()],
        }
    }

    pub(crate) fn from_data(viewport: Viewport, mip_level: u32, data: Vec<f32>) -> RotoResult<Self> {
        if data.len() != viewport.area() {
            return Err(RotoError::render(format!(
                "mask buffer has {} values, viewport needs {}",
                data.len(),
                viewport.area()
            )));
        }
        Ok(Self {
            viewport,
            mip_level,
            data,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.viewport.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.viewport.height
    }

    /// Covered area, in mip-level pixels.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Mipmap level the mask was rendered at.
    pub fn mip_level(&self) -> u32 {
        self.mip_level
    }

    /// Row-major mask values.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Value of the pixel at `(x, y)`, relative to the viewport origin.
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.viewport.width || y >= self.viewport.height {
            return None;
        }
        self.data
            .get(y as usize * self.viewport.width as usize + x as usize)
            .copied()
    }

    /// Value of the pixel at absolute mip-level coordinates `(x, y)`.
    pub fn value_at(&self, x: i32, y: i32) -> Option<f32> {
        let dx = u32::try_from(x - self.viewport.x).ok()?;
        let dy = u32::try_from(y - self.viewport.y).ok()?;
        self.get(dx, dy)
    }

    /// 8-bit grayscale copy.
    pub fn to_gray8(&self) -> image::GrayImage {
        image::GrayImage::from_fn(self.width(), self.height(), |x, y| {
            let v = self.get(x, y).unwrap_or(0.0);
            image::Luma([(v.clamp(0.0, 1.0) * 255.0).round() as u8])
        })
    }

    /// Float grayscale copy.
    pub fn to_luma32f(&self) -> image::ImageBuffer<image::Luma<f32>, Vec<f32>> {
        image::ImageBuffer::from_fn(self.width(), self.height(), |x, y| {
            image::Luma([self.get(x, y).unwrap_or(0.0)])
        })
    }

    /// Write the mask as an 8-bit grayscale PNG.
    pub fn save_png(&self, path: &Path) -> RotoResult<()> {
        self.to_gray8()
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("write mask png '{}'", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/image.rs"]
mod tests;
