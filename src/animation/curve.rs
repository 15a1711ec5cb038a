use crate::foundation::core::Frame;
use crate::foundation::error::{RotoError, RotoResult};

/// Interpolation used on the segment leaving a keyframe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Interpolation {
    /// Hold the keyframe value until the next keyframe.
    Constant,
    /// Straight line toward the next keyframe.
    Linear,
    /// Catmull-Rom derivatives clamped so the curve never overshoots its neighbours.
    #[default]
    Smooth,
    /// Catmull-Rom derivatives (centered finite difference).
    CatmullRom,
    /// Explicit derivatives stored on the keyframe.
    Cubic,
    /// Zero derivative on both sides of the keyframe.
    Horizontal,
}

/// One keyframe of a [`Curve`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe {
    /// Keyframe time.
    pub time: Frame,
    /// Value at `time`.
    pub value: f64,
    /// Interpolation of this keyframe.
    pub interpolation: Interpolation,
    /// Derivative (value per frame) used on the segment arriving at this keyframe.
    #[serde(default)]
    pub left_derivative: f64,
    /// Derivative (value per frame) used on the segment leaving this keyframe.
    #[serde(default)]
    pub right_derivative: f64,
}

impl Keyframe {
    /// Keyframe with automatic derivatives.
    pub fn new(time: Frame, value: f64, interpolation: Interpolation) -> Self {
        Self {
            time,
            value,
            interpolation,
            left_derivative: 0.0,
            right_derivative: 0.0,
        }
    }
}

/// Keyframed animation of a single scalar.
///
/// Keyframes are kept sorted by strictly increasing time. An empty curve has no value of its own;
/// the owner supplies a static fallback.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Curve {
    keys: Vec<Keyframe>,
    #[serde(default)]
    default_interpolation: Interpolation,
}

impl Curve {
    /// Empty curve whose new keyframes use [`Interpolation::Smooth`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty curve whose new keyframes use `kind`.
    pub fn with_interpolation(kind: Interpolation) -> Self {
        Self {
            keys: Vec::new(),
            default_interpolation: kind,
        }
    }

    /// Number of keyframes.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Return `true` when the curve has no keyframes.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keyframes in time order.
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keys
    }

    /// Keyframe at `index`.
    pub fn keyframe(&self, index: usize) -> Option<&Keyframe> {
        self.keys.get(index)
    }

    /// Interpolation assigned to keyframes created by [`Curve::set_keyframe`].
    pub fn default_interpolation(&self) -> Interpolation {
        self.default_interpolation
    }

    /// Keyframe times in increasing order.
    pub fn keyframe_times(&self) -> impl Iterator<Item = Frame> + '_ {
        self.keys.iter().map(|k| k.time)
    }

    /// Index of the keyframe at exactly `time`.
    pub fn keyframe_index(&self, time: Frame) -> Option<usize> {
        self.keys.binary_search_by_key(&time, |k| k.time).ok()
    }

    /// Insert a keyframe at `time`, or replace the value of the keyframe already there.
    ///
    /// Returns the keyframe index.
    pub fn set_keyframe(&mut self, time: Frame, value: f64) -> usize {
        let index = match self.keys.binary_search_by_key(&time, |k| k.time) {
            Ok(i) => {
                self.keys[i].value = value;
                i
            }
            Err(i) => {
                self.keys
                    .insert(i, Keyframe::new(time, value, self.default_interpolation));
                i
            }
        };
        self.refresh_derivatives();
        index
    }

    /// Insert a fully specified keyframe, replacing any keyframe at the same time.
    pub fn set_keyframe_with(&mut self, key: Keyframe) -> usize {
        let index = match self.keys.binary_search_by_key(&key.time, |k| k.time) {
            Ok(i) => {
                self.keys[i] = key;
                i
            }
            Err(i) => {
                self.keys.insert(i, key);
                i
            }
        };
        self.refresh_derivatives();
        index
    }

    /// Delete the keyframe at `index`.
    pub fn delete_keyframe(&mut self, index: usize) -> RotoResult<()> {
        if index >= self.keys.len() {
            return Err(RotoError::contract(format!(
                "no keyframe at index {index} (curve has {})",
                self.keys.len()
            )));
        }
        self.keys.remove(index);
        self.refresh_derivatives();
        Ok(())
    }

    /// Delete the keyframe at exactly `time`.
    pub fn remove_keyframe_at(&mut self, time: Frame) -> RotoResult<()> {
        let index = self
            .keyframe_index(time)
            .ok_or_else(|| RotoError::contract(format!("no keyframe at time {time}")))?;
        self.delete_keyframe(index)
    }

    /// Move the keyframe at `index` to `time` with `value`.
    ///
    /// Returns the index after the move, which differs from `index` when the keyframe crosses a
    /// neighbour. Moving onto a time held by another keyframe is rejected and leaves the curve
    /// unchanged.
    pub fn set_keyframe_value_and_time(
        &mut self,
        index: usize,
        time: Frame,
        value: f64,
    ) -> RotoResult<usize> {
        let Some(current) = self.keys.get(index).copied() else {
            return Err(RotoError::contract(format!(
                "no keyframe at index {index} (curve has {})",
                self.keys.len()
            )));
        };
        if let Some(other) = self.keyframe_index(time)
            && other != index
        {
            return Err(RotoError::animation(format!(
                "cannot move keyframe to time {time}: another keyframe already exists there"
            )));
        }

        self.keys.remove(index);
        let moved = Keyframe {
            time,
            value,
            ..current
        };
        let new_index = self.keys.partition_point(|k| k.time < time);
        self.keys.insert(new_index, moved);
        self.refresh_derivatives();
        Ok(new_index)
    }

    /// Change the interpolation of the keyframe at `index`.
    pub fn set_interpolation(&mut self, index: usize, kind: Interpolation) -> RotoResult<()> {
        let key = self
            .keys
            .get_mut(index)
            .ok_or_else(|| RotoError::contract(format!("no keyframe at index {index}")))?;
        key.interpolation = kind;
        self.refresh_derivatives();
        Ok(())
    }

    /// Set explicit derivatives on the keyframe at `index`, switching it to
    /// [`Interpolation::Cubic`].
    pub fn set_derivatives(&mut self, index: usize, left: f64, right: f64) -> RotoResult<()> {
        let key = self
            .keys
            .get_mut(index)
            .ok_or_else(|| RotoError::contract(format!("no keyframe at index {index}")))?;
        key.interpolation = Interpolation::Cubic;
        key.left_derivative = left;
        key.right_derivative = right;
        self.refresh_derivatives();
        Ok(())
    }

    /// Add `delta` to every keyframe value.
    pub fn offset_values(&mut self, delta: f64) {
        for k in &mut self.keys {
            k.value += delta;
        }
        self.refresh_derivatives();
    }

    /// Remove every keyframe.
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Evaluate the curve at `time`, or `None` when it has no keyframes.
    ///
    /// Outside the keyed range the first/last value is held.
    pub fn evaluate_at(&self, time: Frame) -> Option<f64> {
        let first = self.keys.first()?;
        let last = self.keys[self.keys.len() - 1];
        if time <= first.time {
            return Some(first.value);
        }
        if time >= last.time {
            return Some(last.value);
        }

        let idx = self.keys.partition_point(|k| k.time <= time);
        let a = &self.keys[idx - 1];
        if a.time == time {
            return Some(a.value);
        }
        let b = &self.keys[idx];
        Some(interpolate_segment(a, b, time.as_f64()))
    }

    /// Minimum and maximum keyframe values.
    pub fn y_range(&self) -> Option<(f64, f64)> {
        let first = self.keys.first()?;
        let init = (first.value, first.value);
        Some(
            self.keys
                .iter()
                .fold(init, |(lo, hi), k| (lo.min(k.value), hi.max(k.value))),
        )
    }

    /// Validate ordering and finiteness, as required after deserialization.
    pub fn validate(&self) -> RotoResult<()> {
        if !self.keys.windows(2).all(|w| w[0].time < w[1].time) {
            return Err(RotoError::validation(
                "curve keyframes must have strictly increasing times",
            ));
        }
        if self.keys.iter().any(|k| {
            !k.value.is_finite() || !k.left_derivative.is_finite() || !k.right_derivative.is_finite()
        }) {
            return Err(RotoError::validation("curve keyframe values must be finite"));
        }
        Ok(())
    }

    /// Recompute automatic derivatives, e.g. after deserialization. `Cubic` keys keep their
    /// stored derivatives.
    pub(crate) fn refresh_derivatives(&mut self) {
        let n = self.keys.len();
        for i in 0..n {
            let prev = i.checked_sub(1).map(|j| self.keys[j]);
            let next = self.keys.get(i + 1).copied();
            let k = &mut self.keys[i];
            let (left, right) = auto_derivatives(k, prev.as_ref(), next.as_ref());
            k.left_derivative = left;
            k.right_derivative = right;
        }
    }
}

fn slope(a: &Keyframe, b: &Keyframe) -> f64 {
    let dt = b.time.as_f64() - a.time.as_f64();
    if dt == 0.0 {
        0.0
    } else {
        (b.value - a.value) / dt
    }
}

fn auto_derivatives(k: &Keyframe, prev: Option<&Keyframe>, next: Option<&Keyframe>) -> (f64, f64) {
    let in_slope = prev.map(|p| slope(p, k));
    let out_slope = next.map(|n| slope(k, n));
    match k.interpolation {
        Interpolation::Cubic => (k.left_derivative, k.right_derivative),
        Interpolation::Constant | Interpolation::Horizontal => (0.0, 0.0),
        Interpolation::Linear => {
            let left = in_slope.or(out_slope).unwrap_or(0.0);
            let right = out_slope.or(in_slope).unwrap_or(0.0);
            (left, right)
        }
        Interpolation::CatmullRom => {
            let d = match (prev, next) {
                (Some(p), Some(n)) => slope(p, n),
                _ => in_slope.or(out_slope).unwrap_or(0.0),
            };
            (d, d)
        }
        Interpolation::Smooth => {
            let (Some(p), Some(n), Some(si), Some(so)) = (prev, next, in_slope, out_slope) else {
                return (0.0, 0.0);
            };
            if si * so <= 0.0 {
                // Local extremum: flat tangent keeps the key a true min/max.
                return (0.0, 0.0);
            }
            let d = slope(p, n);
            let limit = 3.0 * si.abs().min(so.abs());
            let d = d.clamp(-limit, limit);
            (d, d)
        }
    }
}

fn interpolate_segment(a: &Keyframe, b: &Keyframe, t: f64) -> f64 {
    if a.interpolation == Interpolation::Constant {
        return a.value;
    }
    let t0 = a.time.as_f64();
    let dt = b.time.as_f64() - t0;
    let s = (t - t0) / dt;
    if a.interpolation == Interpolation::Linear && b.interpolation == Interpolation::Linear {
        return a.value + (b.value - a.value) * s;
    }

    let s2 = s * s;
    let s3 = s2 * s;
    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;
    h00 * a.value + h10 * dt * a.right_derivative + h01 * b.value + h11 * dt * b.left_derivative
}

#[cfg(test)]
#[path = "../../tests/unit/animation/curve.rs"]
mod tests;
