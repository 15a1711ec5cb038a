use std::collections::BTreeSet;
use std::sync::Arc;

use kurbo::{CubicBez, ParamCurve};

use crate::animation::knob::Knob;
use crate::foundation::core::{Frame, Point, Rect, Vec2};
use crate::foundation::error::{RotoError, RotoResult};
use crate::shape::control_point::{ControlPoint, PointPart};
use crate::shape::policy::EditPolicy;
use crate::shape::track::PointTrack;

/// Overlay colour drawn by interactive editors for a new shape.
pub const DEFAULT_OVERLAY_COLOR: [f64; 4] = [0.85164, 0.196936, 0.196936, 1.0];

/// Animatable parameters of a shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ShapeKnob {
    /// Opacity in `[0, 1]`.
    Opacity,
    /// Feather distance in pixels, `[-100, 100]`.
    Feather,
    /// Feather fall-off exponent, `[0.2, 5]`.
    FeatherFallOff,
    /// Whether the shape contributes to the mask.
    Activated,
    /// Whether the shape contribution is inverted.
    Inverted,
}

impl ShapeKnob {
    /// Every knob kind, in display order.
    pub const ALL: [ShapeKnob; 5] = [
        ShapeKnob::Opacity,
        ShapeKnob::Feather,
        ShapeKnob::FeatherFallOff,
        ShapeKnob::Activated,
        ShapeKnob::Inverted,
    ];
}

/// Knob set carried by every [`Bezier`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShapeKnobs {
    pub(crate) opacity: Knob,
    pub(crate) feather: Knob,
    pub(crate) feather_fall_off: Knob,
    pub(crate) activated: Knob,
    pub(crate) inverted: Knob,
}

impl Default for ShapeKnobs {
    fn default() -> Self {
        Self {
            opacity: Knob::double("opacity", 1.0, 0.0, 1.0),
            feather: Knob::int("feather", 0, -100, 100),
            feather_fall_off: Knob::double("feather_fall_off", 1.0, 0.2, 5.0),
            activated: Knob::boolean("activated", true),
            inverted: Knob::boolean("inverted", false),
        }
    }
}

impl ShapeKnobs {
    /// Knob of kind `kind`.
    pub fn get(&self, kind: ShapeKnob) -> &Knob {
        match kind {
            ShapeKnob::Opacity => &self.opacity,
            ShapeKnob::Feather => &self.feather,
            ShapeKnob::FeatherFallOff => &self.feather_fall_off,
            ShapeKnob::Activated => &self.activated,
            ShapeKnob::Inverted => &self.inverted,
        }
    }

    /// Mutable knob of kind `kind`.
    pub fn get_mut(&mut self, kind: ShapeKnob) -> &mut Knob {
        match kind {
            ShapeKnob::Opacity => &mut self.opacity,
            ShapeKnob::Feather => &mut self.feather,
            ShapeKnob::FeatherFallOff => &mut self.feather_fall_off,
            ShapeKnob::Activated => &mut self.activated,
            ShapeKnob::Inverted => &mut self.inverted,
        }
    }

    pub(crate) fn refresh_derivatives(&mut self) {
        for kind in ShapeKnob::ALL {
            self.get_mut(kind).refresh_derivatives();
        }
    }

    pub(crate) fn validate(&self) -> RotoResult<()> {
        for kind in ShapeKnob::ALL {
            self.get(kind).validate()?;
        }
        Ok(())
    }
}

/// Control point of the feather curve, paired with the main point at the same index.
#[derive(Clone, Debug)]
pub struct FeatherPoint {
    pub(crate) point: ControlPoint,
    pub(crate) decoupled: bool,
}

impl FeatherPoint {
    pub(crate) fn new(point: ControlPoint) -> Self {
        Self {
            point,
            decoupled: false,
        }
    }

    /// Underlying control point.
    pub fn point(&self) -> &ControlPoint {
        &self.point
    }

    /// Return `true` once the feather point has been moved on its own; linked moves skip it.
    pub fn is_decoupled(&self) -> bool {
        self.decoupled
    }
}

/// Cubic Bezier spline shape with a paired feather curve.
///
/// `points` and `feather_points` always have the same length. An unfinished shape is an open
/// polyline and does not render.
#[derive(Clone, Debug)]
pub struct Bezier {
    points: Vec<ControlPoint>,
    feather_points: Vec<FeatherPoint>,
    finished: bool,
    knobs: ShapeKnobs,
    overlay_color: [f64; 4],
}

impl Default for Bezier {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            feather_points: Vec::new(),
            finished: false,
            knobs: ShapeKnobs::default(),
            overlay_color: DEFAULT_OVERLAY_COLOR,
        }
    }
}

impl Bezier {
    /// Empty, open shape with default knobs.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        points: Vec<ControlPoint>,
        feather_points: Vec<FeatherPoint>,
        finished: bool,
        knobs: ShapeKnobs,
        overlay_color: [f64; 4],
    ) -> RotoResult<Self> {
        let shape = Self {
            points,
            feather_points,
            finished,
            knobs,
            overlay_color,
        };
        shape.check_invariants()?;
        Ok(shape)
    }

    /// Number of control points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Return `true` when the shape has no control points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Control points in spline order.
    pub fn control_points(&self) -> &[ControlPoint] {
        &self.points
    }

    /// Feather points, index-aligned with [`Bezier::control_points`].
    pub fn feather_points(&self) -> &[FeatherPoint] {
        &self.feather_points
    }

    /// Control point at `index`.
    pub fn control_point(&self, index: usize) -> Option<&ControlPoint> {
        self.points.get(index)
    }

    /// Feather point at `index`.
    pub fn feather_point(&self, index: usize) -> Option<&FeatherPoint> {
        self.feather_points.get(index)
    }

    /// Return `true` when the spline is closed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Close or reopen the spline.
    pub fn set_finished(&mut self, finished: bool) {
        self.finished = finished;
    }

    /// Knob set.
    pub fn knobs(&self) -> &ShapeKnobs {
        &self.knobs
    }

    /// Knob of kind `kind`.
    pub fn knob(&self, kind: ShapeKnob) -> &Knob {
        self.knobs.get(kind)
    }

    /// Mutable knob of kind `kind`.
    pub fn knob_mut(&mut self, kind: ShapeKnob) -> &mut Knob {
        self.knobs.get_mut(kind)
    }

    /// Opacity at `time`.
    pub fn opacity_at(&self, time: Frame) -> f64 {
        self.knobs.opacity.value_at(time)
    }

    /// Feather distance in pixels at `time`.
    pub fn feather_at(&self, time: Frame) -> f64 {
        self.knobs.feather.value_at(time)
    }

    /// Feather fall-off exponent at `time`.
    pub fn feather_fall_off_at(&self, time: Frame) -> f64 {
        self.knobs.feather_fall_off.value_at(time)
    }

    /// Whether the shape is active at `time`.
    pub fn is_activated_at(&self, time: Frame) -> bool {
        self.knobs.activated.bool_at(time)
    }

    /// Whether the shape is inverted at `time`.
    pub fn is_inverted_at(&self, time: Frame) -> bool {
        self.knobs.inverted.bool_at(time)
    }

    /// Overlay colour (RGBA).
    pub fn overlay_color(&self) -> [f64; 4] {
        self.overlay_color
    }

    /// Set the overlay colour (RGBA).
    pub fn set_overlay_color(&mut self, color: [f64; 4]) {
        self.overlay_color = color;
    }

    /// Append a control point and its feather point at `(x, y)`.
    ///
    /// The new point is keyed at `time` under auto-keying, and at every existing keyframe time
    /// of the shape. Closed shapes only accept points through
    /// [`Bezier::add_control_point_after_index`].
    pub fn add_control_point(
        &mut self,
        x: f64,
        y: f64,
        time: Frame,
        policy: EditPolicy,
    ) -> RotoResult<usize> {
        if self.finished {
            return Err(RotoError::invalid_operation(
                "cannot append to a finished shape; insert after an index instead",
            ));
        }
        if !x.is_finite() || !y.is_finite() {
            return Err(RotoError::contract("control point coordinates must be finite"));
        }

        let mut times = self.keyframe_times();
        if policy.auto_keying && !times.contains(&time) {
            times.push(time);
        }
        let p = Point::new(x, y);
        let mut cp = ControlPoint::new(p);
        let mut fp = ControlPoint::new(p);
        for &t in &times {
            cp.set_keyframe(t);
            fp.set_keyframe(t);
        }
        self.points.push(cp);
        self.feather_points.push(FeatherPoint::new(fp));
        self.check_invariants()?;

        let index = self.points.len() - 1;
        tracing::debug!(index, keyed = times.len(), "control point added");
        Ok(index)
    }

    /// Insert a point on the segment leaving `index` at parameter `t` in `(0, 1)`.
    ///
    /// The segment is split with de Casteljau at every keyframe time and for the static values,
    /// so the curve keeps its exact shape. The feather curve is split the same way. Returns the
    /// index of the new point.
    pub fn add_control_point_after_index(&mut self, index: usize, t: f64) -> RotoResult<usize> {
        if !(t > 0.0 && t < 1.0) {
            return Err(RotoError::invalid_operation(format!(
                "subdivision parameter must lie in (0, 1), got {t}"
            )));
        }
        let n = self.points.len();
        if index >= n {
            return Err(RotoError::contract(format!(
                "no control point at index {index} (shape has {n})"
            )));
        }
        let next = if index + 1 < n {
            index + 1
        } else if self.finished && n >= 2 {
            0
        } else {
            return Err(RotoError::contract(format!(
                "control point {index} has no following segment"
            )));
        };
        for i in [index, next] {
            if self.points[i].is_slaved() || self.feather_points[i].point.is_slaved() {
                return Err(RotoError::invalid_operation(format!(
                    "segment endpoint {i} is slaved to a track"
                )));
            }
        }

        let times = self.keyframe_times();
        let cp = {
            let (a, b) = pair_mut(&mut self.points, index, next);
            subdivide(a, b, t, &times)
        };
        let (fp, decoupled) = {
            let (a, b) = pair_mut(&mut self.feather_points, index, next);
            let decoupled = a.decoupled || b.decoupled;
            (subdivide(&mut a.point, &mut b.point, t, &times), decoupled)
        };

        let at = index + 1;
        self.points.insert(at, cp);
        self.feather_points.insert(at, FeatherPoint { point: fp, decoupled });
        self.check_invariants()?;
        tracing::debug!(after = index, t, "control point inserted");
        Ok(at)
    }

    /// Remove the control point at `index` and its feather point.
    pub fn remove_control_point_by_index(&mut self, index: usize) -> RotoResult<()> {
        self.check_index(index)?;
        self.points.remove(index);
        self.feather_points.remove(index);
        self.check_invariants()?;
        tracing::debug!(index, "control point removed");
        Ok(())
    }

    /// Move the control point at `index` and both its handles by `(dx, dy)` at `time`.
    ///
    /// With `feather_link` the paired feather point receives the same delta unless it is
    /// decoupled.
    pub fn move_control_point_by_index(
        &mut self,
        index: usize,
        time: Frame,
        dx: f64,
        dy: f64,
        policy: EditPolicy,
    ) -> RotoResult<()> {
        self.check_index(index)?;
        let linked = policy.feather_link && !self.feather_points[index].decoupled;
        if self.points[index].is_slaved() || (linked && self.feather_points[index].point.is_slaved())
        {
            return Err(RotoError::invalid_operation(format!(
                "control point {index} is slaved to a track"
            )));
        }
        let delta = Vec2::new(dx, dy);
        self.prepare_key(index, time, policy);
        self.points[index].translate_at(time, delta, policy)?;
        if linked {
            self.feather_points[index]
                .point
                .translate_at(time, delta, policy)?;
        }
        Ok(())
    }

    /// Move the left handle of the control point at `index` by `(dx, dy)` at `time`.
    pub fn move_left_bezier_point(
        &mut self,
        index: usize,
        time: Frame,
        dx: f64,
        dy: f64,
        policy: EditPolicy,
    ) -> RotoResult<()> {
        self.move_handle(index, time, Vec2::new(dx, dy), policy, PointPart::Left)
    }

    /// Move the right handle of the control point at `index` by `(dx, dy)` at `time`.
    pub fn move_right_bezier_point(
        &mut self,
        index: usize,
        time: Frame,
        dx: f64,
        dy: f64,
        policy: EditPolicy,
    ) -> RotoResult<()> {
        self.move_handle(index, time, Vec2::new(dx, dy), policy, PointPart::Right)
    }

    fn move_handle(
        &mut self,
        index: usize,
        time: Frame,
        delta: Vec2,
        policy: EditPolicy,
        part: PointPart,
    ) -> RotoResult<()> {
        self.check_index(index)?;
        self.prepare_key(index, time, policy);
        let linked = policy.feather_link && !self.feather_points[index].decoupled;
        let mut targets = vec![&mut self.points[index]];
        if linked {
            targets.push(&mut self.feather_points[index].point);
        }
        for cp in targets {
            match part {
                PointPart::Left => cp.translate_left_at(time, delta, policy),
                _ => cp.translate_right_at(time, delta, policy),
            }
        }
        Ok(())
    }

    /// Move the feather point at `index` by `(dx, dy)` at `time` and mark it decoupled.
    pub fn move_feather_point_by_index(
        &mut self,
        index: usize,
        time: Frame,
        dx: f64,
        dy: f64,
        policy: EditPolicy,
    ) -> RotoResult<()> {
        self.check_index(index)?;
        if self.feather_points[index].point.is_slaved() {
            return Err(RotoError::invalid_operation(format!(
                "feather point {index} is slaved to a track"
            )));
        }
        self.prepare_key(index, time, policy);
        let fp = &mut self.feather_points[index];
        fp.point.translate_at(time, Vec2::new(dx, dy), policy)?;
        fp.decoupled = true;
        Ok(())
    }

    /// Drive the control point at `index` and its feather point from `track`.
    pub fn slave_control_point(
        &mut self,
        index: usize,
        track: &Arc<dyn PointTrack>,
    ) -> RotoResult<()> {
        self.check_index(index)?;
        self.points[index].slave_to(track);
        self.feather_points[index].point.slave_to(track);
        Ok(())
    }

    /// Detach the control point at `index` and its feather point from their track.
    ///
    /// Returns `false` when the point was not slaved.
    pub fn unslave_control_point(&mut self, index: usize) -> RotoResult<bool> {
        self.check_index(index)?;
        let main = self.points[index].unslave();
        let feather = self.feather_points[index].point.unslave();
        Ok(main || feather)
    }

    /// Return `true` when any point is slaved to a track that has been dropped.
    pub fn has_dead_masters(&self) -> bool {
        self.points
            .iter()
            .chain(self.feather_points.iter().map(|f| &f.point))
            .any(ControlPoint::has_dead_master)
    }

    /// First control point (in spline order) inside the axis-aligned box of half-size
    /// `acceptance` around `(x, y)`.
    pub fn find_control_point_nearby(
        &self,
        x: f64,
        y: f64,
        acceptance: f64,
        time: Frame,
    ) -> Option<(usize, &ControlPoint)> {
        self.points
            .iter()
            .enumerate()
            .find(|(_, cp)| within_box(cp.position_at(time), x, y, acceptance))
    }

    /// Feather counterpart of [`Bezier::find_control_point_nearby`].
    pub fn find_feather_point_nearby(
        &self,
        x: f64,
        y: f64,
        acceptance: f64,
        time: Frame,
    ) -> Option<(usize, &FeatherPoint)> {
        self.feather_points
            .iter()
            .enumerate()
            .find(|(_, fp)| within_box(fp.point.position_at(time), x, y, acceptance))
    }

    /// Sample the main curve at `time` with `n_segments` samples per cubic segment.
    ///
    /// A finished shape yields a closed polyline (first point not repeated); an open shape ends
    /// on its last control point.
    pub fn evaluate_at_time(&self, time: Frame, n_segments: usize) -> Vec<Point> {
        let cps: Vec<&ControlPoint> = self.points.iter().collect();
        sample_spline(&cps, self.finished, time, n_segments)
    }

    /// Sample the feather curve at `time`, pushed along its outward normal by the feather
    /// distance.
    pub fn evaluate_feather_at_time(&self, time: Frame, n_segments: usize) -> Vec<Point> {
        let cps: Vec<&ControlPoint> = self.feather_points.iter().map(|f| &f.point).collect();
        let poly = sample_spline(&cps, self.finished, time, n_segments);
        let distance = self.feather_at(time);
        if distance == 0.0 || poly.len() < 2 {
            return poly;
        }
        offset_polyline(&poly, self.finished, distance)
    }

    /// Whether the feather point at `index` sits `distance` away from its control point.
    pub fn is_feather_point_at_distance(
        &self,
        index: usize,
        time: Frame,
        distance: f64,
    ) -> RotoResult<bool> {
        self.check_index(index)?;
        let d = (self.feather_points[index].point.position_at(time)
            - self.points[index].position_at(time))
        .hypot();
        Ok((d - distance).abs() <= 1e-6 * distance.abs().max(1.0))
    }

    /// Return `true` when any point has a keyframe at `time`.
    pub fn has_keyframe_at_time(&self, time: Frame) -> bool {
        self.all_points().any(|cp| cp.has_keyframe_at(time))
    }

    /// Union of the keyframe times of every point, in increasing order.
    pub fn keyframe_times(&self) -> Vec<Frame> {
        let mut times = BTreeSet::new();
        for cp in self.all_points() {
            times.extend(cp.keyframe_times());
        }
        times.into_iter().collect()
    }

    /// Key every point of the shape at `time` with its current value.
    pub fn set_keyframe(&mut self, time: Frame) {
        for cp in &mut self.points {
            cp.set_keyframe(time);
        }
        for fp in &mut self.feather_points {
            fp.point.set_keyframe(time);
        }
    }

    /// Drop the keyframe at `time` from every point.
    pub fn remove_keyframe(&mut self, time: Frame) -> RotoResult<()> {
        if !self.has_keyframe_at_time(time) {
            return Err(RotoError::contract(format!("shape has no keyframe at time {time}")));
        }
        for cp in self
            .points
            .iter_mut()
            .chain(self.feather_points.iter_mut().map(|f| &mut f.point))
        {
            if cp.has_keyframe_at(time) {
                cp.remove_keyframe(time)?;
            }
        }
        Ok(())
    }

    /// Bounds of every point and handle at `time`, padded by the feather distance.
    pub fn bounding_box_at_time(&self, time: Frame) -> Option<Rect> {
        let mut pts = self.all_points().flat_map(|cp| {
            [
                cp.position_at(time),
                cp.left_tangent_at(time),
                cp.right_tangent_at(time),
            ]
        });
        let first = pts.next()?;
        let rect = pts.fold(Rect::from_points(first, first), |r, p| r.union_pt(p));
        let pad = self.feather_at(time).abs();
        Some(rect.inflate(pad, pad))
    }

    /// Verify that every control point has a feather point.
    pub fn check_invariants(&self) -> RotoResult<()> {
        if self.points.len() != self.feather_points.len() {
            return Err(RotoError::invariant(format!(
                "shape has {} control points but {} feather points",
                self.points.len(),
                self.feather_points.len()
            )));
        }
        Ok(())
    }

    pub(crate) fn validate(&self) -> RotoResult<()> {
        self.check_invariants()?;
        for cp in self.all_points() {
            cp.validate()?;
        }
        self.knobs.validate()
    }

    fn all_points(&self) -> impl Iterator<Item = &ControlPoint> {
        self.points
            .iter()
            .chain(self.feather_points.iter().map(|f| &f.point))
    }

    fn check_index(&self, index: usize) -> RotoResult<()> {
        if index >= self.points.len() {
            return Err(RotoError::contract(format!(
                "no control point at index {index} (shape has {})",
                self.points.len()
            )));
        }
        Ok(())
    }

    /// Key the whole shape at `time` before a keyed edit of point `index`, so the shape keeps
    /// one set of keyframe times.
    fn prepare_key(&mut self, index: usize, time: Frame, policy: EditPolicy) {
        let keyed = self.points[index].writes_keyframe(time, policy)
            || self.feather_points[index].point.writes_keyframe(time, policy);
        if keyed && !self.has_keyframe_at_time(time) {
            self.set_keyframe(time);
        }
    }
}

fn within_box(p: Point, x: f64, y: f64, acceptance: f64) -> bool {
    (p.x - x).abs() <= acceptance && (p.y - y).abs() <= acceptance
}

fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(a, b);
    if a < b {
        let (lo, hi) = items.split_at_mut(b);
        (&mut lo[a], &mut hi[0])
    } else {
        let (lo, hi) = items.split_at_mut(a);
        (&mut hi[0], &mut lo[b])
    }
}

/// Result of splitting one cubic segment.
struct Split {
    a_right: Point,
    mid_left: Point,
    mid: Point,
    mid_right: Point,
    b_left: Point,
}

fn split_cubic(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Split {
    let q0 = p0.lerp(p1, t);
    let q1 = p1.lerp(p2, t);
    let q2 = p2.lerp(p3, t);
    let r0 = q0.lerp(q1, t);
    let r1 = q1.lerp(q2, t);
    Split {
        a_right: q0,
        mid_left: r0,
        mid: r0.lerp(r1, t),
        mid_right: r1,
        b_left: q2,
    }
}

fn subdivide(a: &mut ControlPoint, b: &mut ControlPoint, t: f64, times: &[Frame]) -> ControlPoint {
    let s = split_cubic(
        a.local().fallback(),
        a.right().fallback(),
        b.left().fallback(),
        b.local().fallback(),
        t,
    );
    let mut mid = ControlPoint::with_tangents(s.mid, s.mid_left, s.mid_right);
    a.store_static(PointPart::Right, s.a_right);
    b.store_static(PointPart::Left, s.b_left);

    // Split at every time first; keyed writes shift interpolation at the other times.
    let keyed: Vec<(Frame, Split)> = times
        .iter()
        .map(|&time| {
            let s = split_cubic(
                a.position_at(time),
                a.right_tangent_at(time),
                b.left_tangent_at(time),
                b.position_at(time),
                t,
            );
            (time, s)
        })
        .collect();
    for (time, s) in keyed {
        a.store(PointPart::Right, time, s.a_right, true);
        b.store(PointPart::Left, time, s.b_left, true);
        mid.store(PointPart::Position, time, s.mid, true);
        mid.store(PointPart::Left, time, s.mid_left, true);
        mid.store(PointPart::Right, time, s.mid_right, true);
    }
    mid
}

fn sample_spline(cps: &[&ControlPoint], closed: bool, time: Frame, n_segments: usize) -> Vec<Point> {
    let n = cps.len();
    match n {
        0 => return Vec::new(),
        1 => return vec![cps[0].position_at(time)],
        _ => {}
    }
    let steps = n_segments.max(1);
    let segments = if closed { n } else { n - 1 };
    let mut out = Vec::with_capacity(segments * steps + 1);
    for i in 0..segments {
        let a = cps[i];
        let b = cps[(i + 1) % n];
        let c = CubicBez::new(
            a.position_at(time),
            a.right_tangent_at(time),
            b.left_tangent_at(time),
            b.position_at(time),
        );
        out.extend((0..steps).map(|k| c.eval(k as f64 / steps as f64)));
    }
    if !closed {
        out.push(cps[n - 1].position_at(time));
    }
    out
}

/// Twice the signed area of the closed ring through `poly`.
pub(crate) fn signed_area2(poly: &[Point]) -> f64 {
    let n = poly.len();
    (0..n)
        .map(|i| {
            let a = poly[i];
            let b = poly[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum()
}

/// Push every vertex of `poly` by `distance` along the outward normal.
pub(crate) fn offset_polyline(poly: &[Point], closed: bool, distance: f64) -> Vec<Point> {
    let sign = if signed_area2(poly) >= 0.0 { 1.0 } else { -1.0 };
    let n = poly.len();
    (0..n)
        .map(|i| {
            let prev = match i {
                0 if closed => poly[n - 1],
                0 => poly[0],
                _ => poly[i - 1],
            };
            let next = if i + 1 < n {
                poly[i + 1]
            } else if closed {
                poly[0]
            } else {
                poly[i]
            };
            let d = next - prev;
            let len = d.hypot();
            if len <= f64::EPSILON {
                return poly[i];
            }
            let normal = Vec2::new(d.y, -d.x) * (sign / len);
            poly[i] + normal * distance
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/shape/bezier.rs"]
mod tests;
