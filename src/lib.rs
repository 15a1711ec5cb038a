//! Rotomask is a roto shape engine: keyframed cubic Bezier shapes with paired feather curves,
//! organised in a layer tree and rasterized into anti-aliased grayscale masks.
//!
//! The public API is context-oriented:
//!
//! - Create a [`RotoContext`] and edit its [`RotoState`] through [`RotoContext::edit`]
//! - Author [`Bezier`] shapes with an explicit [`EditPolicy`]
//! - Request masks with [`RotoContext::get_or_render_mask`]
//! - Persist and restore with [`ContextSnapshot`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod context;
mod foundation;
mod render;
mod scene;
mod shape;
mod tree;

pub use crate::foundation::core::{Frame, Point, Rect, Vec2, Viewport, mip_scale};
pub use crate::foundation::error::{RotoError, RotoResult};

pub use crate::animation::curve::{Curve, Interpolation, Keyframe};
pub use crate::animation::knob::{Knob, KnobType};
pub use crate::context::cache::{CacheStats, MaskKey};
pub use crate::context::context::RotoContext;
pub use crate::context::state::RotoState;
pub use crate::render::config::{DEFAULT_MIN_SEGMENTS, DEFAULT_SEGMENTS_PER_BEZIER, RenderConfig};
pub use crate::render::image::MaskImage;
pub use crate::render::renderer::{MaskRenderer, RenderTarget, ScanlineRenderer};
pub use crate::render::sample::ShapeSample;
pub use crate::scene::snapshot::{
    ContextSnapshot, ControlPointDef, FeatherPointDef, ItemDef, ItemKindDef, SNAPSHOT_VERSION,
    ShapeDef,
};
pub use crate::shape::bezier::{
    Bezier, DEFAULT_OVERLAY_COLOR, FeatherPoint, ShapeKnob, ShapeKnobs,
};
pub use crate::shape::control_point::{AnimatedPoint, ControlPoint, PositionSource};
pub use crate::shape::policy::EditPolicy;
pub use crate::shape::track::{CurveTrack, NoTracks, PointTrack, TrackHandle, TrackRegistry};
pub use crate::tree::arena::ItemTree;
pub use crate::tree::item::{Item, ItemId, ItemKind};
