use crate::foundation::core::{Frame, Point, mip_scale};
use crate::render::config::RenderConfig;
use crate::shape::bezier::Bezier;

/// One shape flattened for rasterization: polygons in mip-level pixels plus the knob values
/// the renderer needs.
///
/// Samples are detached from the item tree, so rendering runs without holding the context lock.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeSample {
    /// Closed main contour.
    pub contour: Vec<Point>,
    /// Closed feather contour (already offset by the feather distance).
    pub feather: Vec<Point>,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Feather fall-off exponent.
    pub fall_off: f64,
    /// Whether the contribution is inverted over the whole target.
    pub inverted: bool,
}

impl ShapeSample {
    /// Flatten `shape` at `time` for mip level `mip_level`.
    pub fn from_shape(shape: &Bezier, time: Frame, mip_level: u32, config: &RenderConfig) -> Self {
        let n = config.segments_at_mip(mip_level);
        let scale = mip_scale(mip_level);
        let to_mip = |p: Point| Point::new(p.x * scale, p.y * scale);
        Self {
            contour: shape.evaluate_at_time(time, n).into_iter().map(to_mip).collect(),
            feather: shape
                .evaluate_feather_at_time(time, n)
                .into_iter()
                .map(to_mip)
                .collect(),
            opacity: shape.opacity_at(time),
            fall_off: shape.feather_fall_off_at(time),
            inverted: shape.is_inverted_at(time),
        }
    }

    /// Polygon with opacity 1, no feather band and no inversion.
    pub fn solid(contour: Vec<Point>) -> Self {
        Self {
            feather: contour.clone(),
            contour,
            opacity: 1.0,
            fall_off: 1.0,
            inverted: false,
        }
    }

    /// Return `true` when the feather contour differs from the main contour.
    pub fn has_feather_band(&self) -> bool {
        self.feather.len() >= 3 && self.feather != self.contour
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/sample.rs"]
mod tests;
