use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use crate::animation::curve::Curve;
use crate::foundation::core::{Frame, Point};

/// External animated 2D track a control point can be slaved to.
pub trait PointTrack: Send + Sync {
    /// Stable name used to relink the track after a snapshot restore.
    fn name(&self) -> &str;

    /// Track position at `time`.
    fn position_at(&self, time: Frame) -> Point;
}

/// Non-owning link from a control point to a [`PointTrack`].
#[derive(Clone)]
pub struct TrackHandle {
    name: String,
    track: Weak<dyn PointTrack>,
}

impl TrackHandle {
    /// Link to `track` without extending its lifetime.
    pub fn new(track: &Arc<dyn PointTrack>) -> Self {
        Self {
            name: track.name().to_string(),
            track: Arc::downgrade(track),
        }
    }

    /// Name of the linked track.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Track position at `time`, or `None` once the track has been dropped.
    pub fn position_at(&self, time: Frame) -> Option<Point> {
        self.track.upgrade().map(|t| t.position_at(time))
    }

    /// Return `true` while the track is still alive.
    pub fn is_alive(&self) -> bool {
        self.track.strong_count() > 0
    }
}

impl std::fmt::Debug for TrackHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackHandle")
            .field("name", &self.name)
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// Resolves track names when restoring snapshots.
pub trait TrackRegistry {
    /// Track registered under `name`.
    fn resolve(&self, name: &str) -> Option<Arc<dyn PointTrack>>;
}

/// Registry with no tracks; mastered points are restored as local points.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTracks;

impl TrackRegistry for NoTracks {
    fn resolve(&self, _name: &str) -> Option<Arc<dyn PointTrack>> {
        None
    }
}

impl TrackRegistry for BTreeMap<String, Arc<dyn PointTrack>> {
    fn resolve(&self, name: &str) -> Option<Arc<dyn PointTrack>> {
        self.get(name).cloned()
    }
}

/// Track backed by two keyframed curves, e.g. the output of a point tracker.
#[derive(Clone, Debug)]
pub struct CurveTrack {
    name: String,
    x: Curve,
    y: Curve,
}

impl CurveTrack {
    /// Empty track named `name`; it sits at the origin until keyed.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            x: Curve::new(),
            y: Curve::new(),
        }
    }

    /// Key the track position at `time`.
    pub fn with_key(mut self, time: Frame, p: Point) -> Self {
        self.x.set_keyframe(time, p.x);
        self.y.set_keyframe(time, p.y);
        self
    }
}

impl PointTrack for CurveTrack {
    fn name(&self) -> &str {
        &self.name
    }

    fn position_at(&self, time: Frame) -> Point {
        Point::new(
            self.x.evaluate_at(time).unwrap_or(0.0),
            self.y.evaluate_at(time).unwrap_or(0.0),
        )
    }
}
