use std::collections::BTreeSet;
use std::sync::Arc;

use crate::animation::curve::{Curve, Interpolation};
use crate::foundation::core::{Frame, Point, Vec2};
use crate::foundation::error::{RotoError, RotoResult};
use crate::shape::policy::EditPolicy;
use crate::shape::track::{PointTrack, TrackHandle};

/// 2D value animated by an X and a Y curve, with a static fallback.
///
/// Both curves always share the same keyframe times.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnimatedPoint {
    pub(crate) x: Curve,
    pub(crate) y: Curve,
    pub(crate) fallback: Point,
}

impl AnimatedPoint {
    /// Static point at `p`.
    pub fn new(p: Point) -> Self {
        Self {
            x: Curve::with_interpolation(Interpolation::Smooth),
            y: Curve::with_interpolation(Interpolation::Smooth),
            fallback: p,
        }
    }

    /// Value at `time`.
    pub fn at(&self, time: Frame) -> Point {
        Point::new(
            self.x.evaluate_at(time).unwrap_or(self.fallback.x),
            self.y.evaluate_at(time).unwrap_or(self.fallback.y),
        )
    }

    /// Static fallback value.
    pub fn fallback(&self) -> Point {
        self.fallback
    }

    /// X curve.
    pub fn x_curve(&self) -> &Curve {
        &self.x
    }

    /// Y curve.
    pub fn y_curve(&self) -> &Curve {
        &self.y
    }

    /// Return `true` when the point has keyframes.
    pub fn is_animated(&self) -> bool {
        !self.x.is_empty()
    }

    fn has_key(&self, time: Frame) -> bool {
        self.x.keyframe_index(time).is_some()
    }

    fn write(&mut self, time: Frame, p: Point, keyed: bool) {
        if keyed {
            self.x.set_keyframe(time, p.x);
            self.y.set_keyframe(time, p.y);
        } else {
            self.fallback = p;
        }
    }

    fn key_current(&mut self, time: Frame) {
        let p = self.at(time);
        self.write(time, p, true);
    }

    fn remove_key(&mut self, time: Frame) {
        if self.has_key(time) {
            if self.x.len() == 1 {
                self.fallback = self.at(time);
            }
            let _ = self.x.remove_keyframe_at(time);
            let _ = self.y.remove_keyframe_at(time);
        }
    }

    pub(crate) fn refresh_derivatives(&mut self) {
        self.x.refresh_derivatives();
        self.y.refresh_derivatives();
    }

    fn offset(&mut self, delta: Vec2) {
        self.x.offset_values(delta.x);
        self.y.offset_values(delta.y);
        self.fallback += delta;
    }

    pub(crate) fn validate(&self) -> RotoResult<()> {
        self.x.validate()?;
        self.y.validate()?;
        let xs: Vec<Frame> = self.x.keyframe_times().collect();
        let ys: Vec<Frame> = self.y.keyframe_times().collect();
        if xs != ys {
            return Err(RotoError::validation(
                "point x and y curves must share keyframe times",
            ));
        }
        if !self.fallback.x.is_finite() || !self.fallback.y.is_finite() {
            return Err(RotoError::validation("point static value must be finite"));
        }
        Ok(())
    }
}

/// Where a control point reads its position from.
#[derive(Clone, Debug)]
pub enum PositionSource {
    /// Own curves and static value.
    Local(AnimatedPoint),
    /// Driven by an external track. `local` is kept for handle offsets and as a fallback once
    /// the track is gone.
    Mastered {
        /// Link to the driving track.
        track: TrackHandle,
        /// Position the point had before slaving.
        local: AnimatedPoint,
    },
}

/// Which part of a control point an edit targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PointPart {
    Position,
    Left,
    Right,
}

/// Vertex of a cubic Bezier spline with its two tangent handles.
///
/// Handles are stored in absolute coordinates. Every keyed write keys the position and both
/// handles together so the three share the same keyframe times.
#[derive(Clone, Debug)]
pub struct ControlPoint {
    source: PositionSource,
    left: AnimatedPoint,
    right: AnimatedPoint,
}

impl ControlPoint {
    /// Static point at `p` with both handles collapsed onto it.
    pub fn new(p: Point) -> Self {
        Self::with_tangents(p, p, p)
    }

    /// Static point with explicit handles.
    pub fn with_tangents(p: Point, left: Point, right: Point) -> Self {
        Self {
            source: PositionSource::Local(AnimatedPoint::new(p)),
            left: AnimatedPoint::new(left),
            right: AnimatedPoint::new(right),
        }
    }

    pub(crate) fn from_parts(
        local: AnimatedPoint,
        left: AnimatedPoint,
        right: AnimatedPoint,
        track: Option<TrackHandle>,
    ) -> Self {
        let source = match track {
            Some(track) => PositionSource::Mastered { track, local },
            None => PositionSource::Local(local),
        };
        Self {
            source,
            left,
            right,
        }
    }

    /// Position source.
    pub fn source(&self) -> &PositionSource {
        &self.source
    }

    /// Local position curves (used by mastered points once the track is gone).
    pub fn local(&self) -> &AnimatedPoint {
        match &self.source {
            PositionSource::Local(p) | PositionSource::Mastered { local: p, .. } => p,
        }
    }

    /// Left handle curves, in absolute coordinates.
    pub fn left(&self) -> &AnimatedPoint {
        &self.left
    }

    /// Right handle curves.
    pub fn right(&self) -> &AnimatedPoint {
        &self.right
    }

    fn local_mut(&mut self) -> &mut AnimatedPoint {
        match &mut self.source {
            PositionSource::Local(p) | PositionSource::Mastered { local: p, .. } => p,
        }
    }

    /// Offset between the track and the local position, zero for local points and dead tracks.
    fn master_offset(&self, time: Frame) -> Vec2 {
        match &self.source {
            PositionSource::Local(_) => Vec2::ZERO,
            PositionSource::Mastered { track, local } => track
                .position_at(time)
                .map(|t| t - local.at(time))
                .unwrap_or(Vec2::ZERO),
        }
    }

    /// Position at `time`.
    pub fn position_at(&self, time: Frame) -> Point {
        match &self.source {
            PositionSource::Local(p) => p.at(time),
            PositionSource::Mastered { track, local } => {
                track.position_at(time).unwrap_or_else(|| local.at(time))
            }
        }
    }

    /// Left handle at `time`.
    pub fn left_tangent_at(&self, time: Frame) -> Point {
        self.left.at(time) + self.master_offset(time)
    }

    /// Right handle at `time`.
    pub fn right_tangent_at(&self, time: Frame) -> Point {
        self.right.at(time) + self.master_offset(time)
    }

    /// Return `true` when any curve of the point has keyframes.
    pub fn is_animated(&self) -> bool {
        self.local().is_animated() || self.left.is_animated() || self.right.is_animated()
    }

    /// Return `true` when the point has a keyframe at exactly `time`.
    pub fn has_keyframe_at(&self, time: Frame) -> bool {
        self.local().has_key(time) || self.left.has_key(time) || self.right.has_key(time)
    }

    /// Keyframe times of the point in increasing order.
    pub fn keyframe_times(&self) -> Vec<Frame> {
        let mut times = BTreeSet::new();
        for p in [self.local(), &self.left, &self.right] {
            times.extend(p.x.keyframe_times());
        }
        times.into_iter().collect()
    }

    /// Key the position and both handles at `time` with their current values.
    pub fn set_keyframe(&mut self, time: Frame) {
        self.local_mut().key_current(time);
        self.left.key_current(time);
        self.right.key_current(time);
    }

    /// Drop the keyframe at `time` from every curve of the point.
    pub fn remove_keyframe(&mut self, time: Frame) -> RotoResult<()> {
        if !self.has_keyframe_at(time) {
            return Err(RotoError::contract(format!(
                "control point has no keyframe at time {time}"
            )));
        }
        self.local_mut().remove_key(time);
        self.left.remove_key(time);
        self.right.remove_key(time);
        Ok(())
    }

    /// Return `true` when a write at `time` under `policy` creates or updates a keyframe.
    pub fn writes_keyframe(&self, time: Frame, policy: EditPolicy) -> bool {
        policy.auto_keying || self.has_keyframe_at(time) || self.is_animated()
    }

    /// Set the position at `time`. Handles are left where they are.
    pub fn set_position_at(&mut self, time: Frame, p: Point, policy: EditPolicy) -> RotoResult<()> {
        self.ensure_local()?;
        let keyed = self.writes_keyframe(time, policy);
        self.store(PointPart::Position, time, p, keyed);
        Ok(())
    }

    /// Set the left handle at `time`.
    pub fn set_left_tangent_at(&mut self, time: Frame, p: Point, policy: EditPolicy) {
        let local = p - self.master_offset(time);
        let keyed = self.writes_keyframe(time, policy);
        self.store(PointPart::Left, time, local, keyed);
    }

    /// Set the right handle at `time`.
    pub fn set_right_tangent_at(&mut self, time: Frame, p: Point, policy: EditPolicy) {
        let local = p - self.master_offset(time);
        let keyed = self.writes_keyframe(time, policy);
        self.store(PointPart::Right, time, local, keyed);
    }

    /// Move the point and both handles by `delta` at `time`.
    ///
    /// With `ripple_edit` the same delta is applied at every other keyframe time as well.
    pub fn translate_at(&mut self, time: Frame, delta: Vec2, policy: EditPolicy) -> RotoResult<()> {
        self.ensure_local()?;
        self.translate_parts(
            &[PointPart::Position, PointPart::Left, PointPart::Right],
            time,
            delta,
            policy,
        );
        Ok(())
    }

    /// Move the left handle by `delta` at `time`.
    pub fn translate_left_at(&mut self, time: Frame, delta: Vec2, policy: EditPolicy) {
        self.translate_parts(&[PointPart::Left], time, delta, policy);
    }

    /// Move the right handle by `delta` at `time`.
    pub fn translate_right_at(&mut self, time: Frame, delta: Vec2, policy: EditPolicy) {
        self.translate_parts(&[PointPart::Right], time, delta, policy);
    }

    fn translate_parts(&mut self, parts: &[PointPart], time: Frame, delta: Vec2, policy: EditPolicy) {
        if policy.ripple_edit && self.is_animated() {
            for part in parts {
                let p = self.part_mut(*part);
                p.offset(delta);
            }
            if policy.auto_keying && !self.has_keyframe_at(time) {
                // Ripple already moved the interpolated value at `time`; key it in place.
                self.set_keyframe(time);
            }
            return;
        }

        let keyed = self.writes_keyframe(time, policy);
        for part in parts {
            let current = self.part_mut(*part).at(time);
            self.store(*part, time, current + delta, keyed);
        }
    }

    /// Write a raw local value. Keyed writes key the other parts at `time` too.
    pub(crate) fn store(&mut self, part: PointPart, time: Frame, p: Point, keyed: bool) {
        if keyed && !self.has_keyframe_at(time) {
            self.set_keyframe(time);
        }
        self.part_mut(part).write(time, p, keyed);
    }

    /// Write a raw static value.
    pub(crate) fn store_static(&mut self, part: PointPart, p: Point) {
        self.part_mut(part).fallback = p;
    }

    fn part_mut(&mut self, part: PointPart) -> &mut AnimatedPoint {
        match part {
            PointPart::Position => self.local_mut(),
            PointPart::Left => &mut self.left,
            PointPart::Right => &mut self.right,
        }
    }

    fn ensure_local(&self) -> RotoResult<()> {
        match &self.source {
            PositionSource::Local(_) => Ok(()),
            PositionSource::Mastered { track, .. } => Err(RotoError::invalid_operation(format!(
                "control point is slaved to track '{}'",
                track.name()
            ))),
        }
    }

    /// Drive the position from `track`. Replaces any previous master.
    pub fn slave_to(&mut self, track: &Arc<dyn PointTrack>) {
        let local = self.local().clone();
        self.source = PositionSource::Mastered {
            track: TrackHandle::new(track),
            local,
        };
    }

    /// Return to the local position. Returns `false` when the point was not slaved.
    pub fn unslave(&mut self) -> bool {
        match &self.source {
            PositionSource::Local(_) => false,
            PositionSource::Mastered { local, .. } => {
                self.source = PositionSource::Local(local.clone());
                true
            }
        }
    }

    /// Return `true` when the position is driven by a track.
    pub fn is_slaved(&self) -> bool {
        matches!(self.source, PositionSource::Mastered { .. })
    }

    /// Name of the master track, if any.
    pub fn master_track_name(&self) -> Option<&str> {
        match &self.source {
            PositionSource::Local(_) => None,
            PositionSource::Mastered { track, .. } => Some(track.name()),
        }
    }

    /// Return `true` when the point is slaved to a track that no longer exists.
    pub fn has_dead_master(&self) -> bool {
        matches!(&self.source, PositionSource::Mastered { track, .. } if !track.is_alive())
    }

    pub(crate) fn validate(&self) -> RotoResult<()> {
        self.local().validate()?;
        self.left.validate()?;
        self.right.validate()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shape/control_point.rs"]
mod tests;
