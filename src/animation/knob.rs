use crate::animation::curve::{Curve, Interpolation};
use crate::foundation::core::Frame;
use crate::foundation::error::{RotoError, RotoResult};

/// Value type carried by a [`Knob`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum KnobType {
    /// Real value.
    Double,
    /// Integer value, rounded after interpolation.
    Int,
    /// Boolean stored as `0.0`/`1.0`, held between keyframes.
    Bool,
}

/// Named, bounded, animatable parameter.
///
/// Values are stored as `f64` whatever the [`KnobType`]; writes are clamped to the declared
/// bounds, the underlying [`Curve`] never clamps.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Knob {
    name: String,
    ty: KnobType,
    value: f64,
    curve: Curve,
    min: f64,
    max: f64,
}

impl Knob {
    /// Real-valued knob with bounds `[min, max]`.
    pub fn double(name: impl Into<String>, default: f64, min: f64, max: f64) -> Self {
        Self::build(name, KnobType::Double, default, min, max, Interpolation::Smooth)
    }

    /// Integer knob with bounds `[min, max]`.
    pub fn int(name: impl Into<String>, default: i32, min: i32, max: i32) -> Self {
        Self::build(
            name,
            KnobType::Int,
            f64::from(default),
            f64::from(min),
            f64::from(max),
            Interpolation::Linear,
        )
    }

    /// Boolean knob.
    pub fn boolean(name: impl Into<String>, default: bool) -> Self {
        Self::build(
            name,
            KnobType::Bool,
            bool_to_f64(default),
            0.0,
            1.0,
            Interpolation::Constant,
        )
    }

    fn build(
        name: impl Into<String>,
        ty: KnobType,
        default: f64,
        min: f64,
        max: f64,
        interpolation: Interpolation,
    ) -> Self {
        Self {
            name: name.into(),
            ty,
            value: default.clamp(min, max),
            curve: Curve::with_interpolation(interpolation),
            min,
            max,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value type.
    pub fn knob_type(&self) -> KnobType {
        self.ty
    }

    /// Declared `(min, max)` bounds.
    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Animation curve (empty when the knob is static).
    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    /// Return `true` when the knob has at least one keyframe.
    pub fn is_animated(&self) -> bool {
        !self.curve.is_empty()
    }

    /// Static value used when the knob is not animated.
    pub fn static_value(&self) -> f64 {
        self.value
    }

    /// Value at `time`, clamped to bounds and normalized to the knob type.
    pub fn value_at(&self, time: Frame) -> f64 {
        let raw = self.curve.evaluate_at(time).unwrap_or(self.value);
        self.normalize(raw)
    }

    /// Boolean view of [`Knob::value_at`].
    pub fn bool_at(&self, time: Frame) -> bool {
        self.value_at(time) >= 0.5
    }

    /// Integer view of [`Knob::value_at`].
    pub fn int_at(&self, time: Frame) -> i32 {
        self.value_at(time) as i32
    }

    /// Overwrite the static value.
    pub fn set_value(&mut self, value: f64) -> RotoResult<()> {
        self.value = self.checked(value)?;
        Ok(())
    }

    /// Write `value` at `time`: keyframed when `auto_keying` is set or the knob is already
    /// animated, static otherwise.
    pub fn set_value_at_time(
        &mut self,
        time: Frame,
        value: f64,
        auto_keying: bool,
    ) -> RotoResult<()> {
        if auto_keying || self.is_animated() {
            self.set_keyframe(time, value)?;
            Ok(())
        } else {
            self.set_value(value)
        }
    }

    /// Insert or replace a keyframe.
    pub fn set_keyframe(&mut self, time: Frame, value: f64) -> RotoResult<usize> {
        let v = self.checked(value)?;
        Ok(self.curve.set_keyframe(time, v))
    }

    /// Remove the keyframe at `time`. Removing the last keyframe keeps its value as the static
    /// value.
    pub fn remove_keyframe(&mut self, time: Frame) -> RotoResult<()> {
        let baked = (self.curve.len() == 1)
            .then(|| self.curve.evaluate_at(time))
            .flatten();
        self.curve.remove_keyframe_at(time)?;
        if let Some(v) = baked {
            self.value = v;
        }
        Ok(())
    }

    pub(crate) fn refresh_derivatives(&mut self) {
        self.curve.refresh_derivatives();
    }

    /// Drop the animation; the knob keeps its static value.
    pub fn clear_animation(&mut self) {
        self.curve.clear();
    }

    /// Range of the animation curve clamped to the knob bounds.
    pub fn curve_y_range(&self) -> (f64, f64) {
        match self.curve.y_range() {
            Some((lo, hi)) => (lo.clamp(self.min, self.max), hi.clamp(self.min, self.max)),
            None => (self.value, self.value),
        }
    }

    pub(crate) fn validate(&self) -> RotoResult<()> {
        self.curve.validate()?;
        if !self.value.is_finite() || self.min > self.max {
            return Err(RotoError::validation(format!(
                "knob '{}' has an invalid value or bounds",
                self.name
            )));
        }
        Ok(())
    }

    fn checked(&self, value: f64) -> RotoResult<f64> {
        if !value.is_finite() {
            return Err(RotoError::validation(format!(
                "knob '{}' value must be finite",
                self.name
            )));
        }
        Ok(value.clamp(self.min, self.max))
    }

    fn normalize(&self, raw: f64) -> f64 {
        let v = raw.clamp(self.min, self.max);
        match self.ty {
            KnobType::Double => v,
            KnobType::Int => v.round(),
            KnobType::Bool => bool_to_f64(v >= 0.5),
        }
    }
}

fn bool_to_f64(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/knob.rs"]
mod tests;
