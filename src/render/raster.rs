use kurbo::{Line, ParamCurveNearest};

use crate::foundation::core::{Point, Viewport};
use crate::render::sample::ShapeSample;

/// Sub-scanlines sampled per pixel row.
pub(crate) const SUBSCANLINES: usize = 4;
const SUBSCANLINE_WEIGHT: f32 = 1.0 / SUBSCANLINES as f32;
/// Overlaps below this are floating-point noise from pixel-aligned edges.
const SLIVER: f64 = 1e-9;

/// Closed polygon prepared for scanline filling.
#[derive(Clone, Debug)]
pub(crate) struct PolygonEdges {
    edges: Vec<(Point, Point)>,
    y_min: f64,
    y_max: f64,
}

impl PolygonEdges {
    pub(crate) fn new(ring: &[Point]) -> Self {
        let n = ring.len();
        let mut edges = Vec::with_capacity(n);
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        if n >= 3 {
            for i in 0..n {
                let a = ring[i];
                let b = ring[(i + 1) % n];
                y_min = y_min.min(a.y);
                y_max = y_max.max(a.y);
                if a.y != b.y {
                    edges.push((a, b));
                }
            }
        }
        Self {
            edges,
            y_min,
            y_max,
        }
    }

    fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Even-odd coverage of `poly` for the pixel row starting at `y_top`, written into `row`.
///
/// `x_origin` is the x coordinate of `row[0]`'s left edge. Each sub-scanline contributes the
/// exact horizontal overlap of its spans with every pixel.
pub(crate) fn coverage_row(
    poly: &PolygonEdges,
    x_origin: f64,
    y_top: f64,
    row: &mut [f32],
    crossings: &mut Vec<f64>,
) {
    row.fill(0.0);
    if poly.is_empty() || y_top + 1.0 <= poly.y_min || y_top >= poly.y_max {
        return;
    }
    for s in 0..SUBSCANLINES {
        let y = y_top + (s as f64 + 0.5) / SUBSCANLINES as f64;
        crossings.clear();
        for (a, b) in &poly.edges {
            if (a.y <= y) != (b.y <= y) {
                crossings.push(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y));
            }
        }
        crossings.sort_by(f64::total_cmp);
        for span in crossings.chunks_exact(2) {
            add_span(row, span[0] - x_origin, span[1] - x_origin);
        }
    }
    for v in row.iter_mut() {
        *v = v.min(1.0);
    }
}

fn add_span(row: &mut [f32], a: f64, b: f64) {
    let width = row.len() as f64;
    let a = a.clamp(0.0, width);
    let b = b.clamp(0.0, width);
    if b <= a {
        return;
    }
    let first = a.floor() as usize;
    let last = (b.ceil() as usize).min(row.len());
    for (px, v) in row.iter_mut().enumerate().take(last).skip(first) {
        let lo = a.max(px as f64);
        let hi = b.min(px as f64 + 1.0);
        if hi - lo > SLIVER {
            *v += (hi - lo) as f32 * SUBSCANLINE_WEIGHT;
        }
    }
}

/// Distance from `p` to the closed ring `ring`.
pub(crate) fn distance_to_ring(ring: &[Point], p: Point) -> f64 {
    let n = ring.len();
    match n {
        0 => f64::INFINITY,
        1 => (ring[0] - p).hypot(),
        _ => (0..n)
            .map(|i| {
                Line::new(ring[i], ring[(i + 1) % n])
                    .nearest(p, 1e-9)
                    .distance_sq
            })
            .fold(f64::INFINITY, f64::min)
            .sqrt(),
    }
}

/// Per-row scratch buffers reused across rows of one worker.
#[derive(Default)]
pub(crate) struct RowScratch {
    main: Vec<f32>,
    feather: Vec<f32>,
    crossings: Vec<f64>,
}

/// A [`ShapeSample`] with its polygons prepared for filling.
pub(crate) struct PreparedShape<'a> {
    sample: &'a ShapeSample,
    main: PolygonEdges,
    feather: Option<PolygonEdges>,
}

impl<'a> PreparedShape<'a> {
    pub(crate) fn new(sample: &'a ShapeSample) -> Self {
        let feather = sample
            .has_feather_band()
            .then(|| PolygonEdges::new(&sample.feather));
        Self {
            sample,
            main: PolygonEdges::new(&sample.contour),
            feather,
        }
    }

    /// Shape alpha for one row, before inversion and opacity.
    fn alpha_row(&self, x_origin: f64, y_top: f64, scratch: &mut RowScratch) {
        let RowScratch {
            main,
            feather,
            crossings,
        } = scratch;
        coverage_row(&self.main, x_origin, y_top, main, crossings);
        let Some(feather_edges) = &self.feather else {
            return;
        };
        coverage_row(feather_edges, x_origin, y_top, feather, crossings);

        let fall_off = self.sample.fall_off;
        for (i, (m, f)) in main.iter_mut().zip(feather.iter()).enumerate() {
            if (*m - *f).abs() <= 1e-6 {
                *m = m.max(*f);
                continue;
            }
            let centre = Point::new(x_origin + i as f64 + 0.5, y_top + 0.5);
            let d_main = distance_to_ring(&self.sample.contour, centre);
            let d_feather = distance_to_ring(&self.sample.feather, centre);
            // Ramp is 1 on the contour of the less covering polygon and 0 on the other.
            let (lo, d_lo, hi, d_hi) = if *m <= *f {
                (*m, d_main, *f, d_feather)
            } else {
                (*f, d_feather, *m, d_main)
            };
            *m = feather_alpha(lo, hi, d_lo, d_hi, fall_off) as f32;
        }
    }
}

/// `lo + (hi - lo) * ramp` with `ramp = (1 - d_lo / (d_lo + d_hi))^fall_off`.
pub(crate) fn feather_alpha(lo: f32, hi: f32, d_lo: f64, d_hi: f64, fall_off: f64) -> f64 {
    let sum = d_lo + d_hi;
    let ramp = if sum > 0.0 {
        (1.0 - d_lo / sum).clamp(0.0, 1.0).powf(fall_off)
    } else {
        1.0
    };
    f64::from(lo) + f64::from(hi - lo) * ramp
}

/// Composite every shape into one output row, bottom first.
pub(crate) fn composite_row(
    shapes: &[PreparedShape<'_>],
    viewport: Viewport,
    row_index: usize,
    out: &mut [f32],
    scratch: &mut RowScratch,
) {
    let width = out.len();
    scratch.main.resize(width, 0.0);
    scratch.feather.resize(width, 0.0);
    let x_origin = f64::from(viewport.x);
    let y_top = f64::from(viewport.y) + row_index as f64;

    for shape in shapes {
        shape.alpha_row(x_origin, y_top, scratch);
        let opacity = shape.sample.opacity as f32;
        let inverted = shape.sample.inverted;
        for (d, a) in out.iter_mut().zip(scratch.main.iter()) {
            let mut a = a.clamp(0.0, 1.0);
            if inverted {
                a = 1.0 - a;
            }
            a *= opacity;
            *d = *d + a - *d * a;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
