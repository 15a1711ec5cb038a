use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::context::context::RotoContext;
use crate::context::state::RotoState;
use crate::foundation::error::{RotoError, RotoResult};
use crate::shape::bezier::{Bezier, DEFAULT_OVERLAY_COLOR, FeatherPoint, ShapeKnobs};
use crate::shape::control_point::{AnimatedPoint, ControlPoint};
use crate::shape::policy::EditPolicy;
use crate::shape::track::{TrackHandle, TrackRegistry};
use crate::tree::item::{Item, ItemId, ItemKind};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

fn default_true() -> bool {
    true
}

fn default_overlay_color() -> [f64; 4] {
    DEFAULT_OVERLAY_COLOR
}

/// Persisted form of a roto context.
///
/// The tree is stored bottom first, so restoring reproduces render order exactly. The edit age
/// is not persisted; a restored context always gets a fresh one.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ContextSnapshot {
    /// Format version.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Editing flags.
    #[serde(default)]
    pub policy: EditPolicy,
    /// Per-kind default-name counters.
    #[serde(default)]
    pub counters: BTreeMap<String, u32>,
    /// Selected item names, least recently selected first.
    #[serde(default)]
    pub selection: Vec<String>,
    /// Root items, bottom first.
    #[serde(default)]
    pub items: Vec<ItemDef>,
}

/// Persisted item: shared attributes plus the layer or shape payload.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ItemDef {
    /// Item name.
    pub name: String,
    /// Whether the item renders.
    #[serde(default = "default_true")]
    pub globally_activated: bool,
    /// Whether the item refuses edits.
    #[serde(default)]
    pub locked: bool,
    /// Payload.
    #[serde(flatten)]
    pub kind: ItemKindDef,
}

/// Persisted item payload, tagged by `"type"`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKindDef {
    /// Layer with its children, bottom first.
    Layer {
        /// Child items.
        #[serde(default)]
        children: Vec<ItemDef>,
    },
    /// Bezier shape.
    Bezier(ShapeDef),
}

/// Persisted shape.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShapeDef {
    /// Whether the outline is closed.
    #[serde(default)]
    pub finished: bool,
    /// Shape knobs.
    #[serde(default)]
    pub knobs: ShapeKnobs,
    /// Overlay colour used by editors.
    #[serde(default = "default_overlay_color")]
    pub overlay_color: [f64; 4],
    /// Control points with their paired feather points.
    #[serde(default)]
    pub points: Vec<ControlPointDef>,
}

/// Persisted control point and its feather point.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ControlPointDef {
    /// Position.
    pub position: AnimatedPoint,
    /// Left handle.
    pub left: AnimatedPoint,
    /// Right handle.
    pub right: AnimatedPoint,
    /// Name of the track the point follows, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master: Option<String>,
    /// Paired feather point.
    pub feather: FeatherPointDef,
}

/// Persisted feather point.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FeatherPointDef {
    /// Position.
    pub position: AnimatedPoint,
    /// Left handle.
    pub left: AnimatedPoint,
    /// Right handle.
    pub right: AnimatedPoint,
    /// Whether the feather point has been moved independently.
    #[serde(default)]
    pub decoupled: bool,
}

impl ContextSnapshot {
    /// Capture `state`.
    pub fn capture(state: &RotoState) -> Self {
        let items = state
            .tree()
            .roots()
            .iter()
            .filter_map(|id| capture_item(state, *id))
            .collect();
        let selection = state
            .selection()
            .iter()
            .filter_map(|id| state.tree().get(*id).map(|item| item.name().to_string()))
            .collect();
        Self {
            version: SNAPSHOT_VERSION,
            policy: state.edit_policy(),
            counters: state.item_counters().clone(),
            selection,
            items,
        }
    }

    /// Parse a snapshot from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> RotoResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| RotoError::serde(format!("parse snapshot JSON: {e}")))
    }

    /// Parse a snapshot from a JSON string.
    pub fn from_json_str(s: &str) -> RotoResult<Self> {
        serde_json::from_str(s).map_err(|e| RotoError::serde(format!("parse snapshot JSON: {e}")))
    }

    /// Parse a snapshot from a JSON file on disk.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_path(path: impl AsRef<Path>) -> RotoResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            RotoError::validation(format!("open snapshot JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Pretty-printed JSON.
    pub fn to_json_string(&self) -> RotoResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| RotoError::serde(format!("serialize snapshot JSON: {e}")))
    }

    /// Rebuild a state from the snapshot.
    ///
    /// Master track names resolve through `tracks`; names it does not know are dropped with a
    /// warning and the point keeps its local animation. Selected names that no longer exist are
    /// skipped. The result is validated before it is returned.
    #[tracing::instrument(skip_all, fields(items = self.items.len()))]
    pub fn restore(&self, tracks: &dyn TrackRegistry) -> RotoResult<RotoState> {
        if self.version != SNAPSHOT_VERSION {
            return Err(RotoError::validation(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                self.version
            )));
        }

        let mut state = RotoState::new();
        for def in &self.items {
            restore_item(&mut state, None, def, tracks)?;
        }

        state.policy = self.policy;
        state.counters = self.counters.clone();
        for name in &self.selection {
            match state.tree.find_by_name(name) {
                Some(id) if !state.selection.contains(&id) => state.selection.push(id),
                Some(_) => {}
                None => tracing::warn!(name = %name, "selected item not found in snapshot"),
            }
        }
        state.validate()?;
        Ok(state)
    }
}

fn capture_item(state: &RotoState, id: ItemId) -> Option<ItemDef> {
    let item = state.tree().get(id)?;
    let kind = match item.kind() {
        ItemKind::Layer { children } => ItemKindDef::Layer {
            children: children
                .iter()
                .filter_map(|c| capture_item(state, *c))
                .collect(),
        },
        ItemKind::Shape(shape) => ItemKindDef::Bezier(capture_shape(shape)),
    };
    Some(ItemDef {
        name: item.name().to_string(),
        globally_activated: item.is_globally_activated(),
        locked: item.is_locked(),
        kind,
    })
}

fn capture_shape(shape: &Bezier) -> ShapeDef {
    let points = shape
        .control_points()
        .iter()
        .zip(shape.feather_points())
        .map(|(cp, fp)| ControlPointDef {
            position: cp.local().clone(),
            left: cp.left().clone(),
            right: cp.right().clone(),
            master: cp.master_track_name().map(str::to_string),
            feather: FeatherPointDef {
                position: fp.point().local().clone(),
                left: fp.point().left().clone(),
                right: fp.point().right().clone(),
                decoupled: fp.is_decoupled(),
            },
        })
        .collect();
    ShapeDef {
        finished: shape.is_finished(),
        knobs: shape.knobs().clone(),
        overlay_color: shape.overlay_color(),
        points,
    }
}

fn restore_item(
    state: &mut RotoState,
    parent: Option<ItemId>,
    def: &ItemDef,
    tracks: &dyn TrackRegistry,
) -> RotoResult<()> {
    if def.name.trim().is_empty() {
        return Err(RotoError::validation("snapshot item with an empty name"));
    }
    let kind = match &def.kind {
        ItemKindDef::Layer { .. } => ItemKind::layer(),
        ItemKindDef::Bezier(shape) => ItemKind::Shape(Box::new(restore_shape(shape, tracks)?)),
    };
    let id = state.tree.insert(parent, def.name.clone(), kind)?;
    let item: &mut Item = state.tree.item_mut(id)?;
    item.globally_activated = def.globally_activated;
    item.locked = def.locked;

    if let ItemKindDef::Layer { children } = &def.kind {
        for child in children {
            restore_item(state, Some(id), child, tracks)?;
        }
    }
    Ok(())
}

fn restore_shape(def: &ShapeDef, tracks: &dyn TrackRegistry) -> RotoResult<Bezier> {
    let mut points = Vec::with_capacity(def.points.len());
    let mut feather_points = Vec::with_capacity(def.points.len());
    for p in &def.points {
        let handle = p.master.as_deref().and_then(|name| match tracks.resolve(name) {
            Some(track) => Some(TrackHandle::new(&track)),
            None => {
                tracing::warn!(track = %name, "master track not found; keeping local animation");
                None
            }
        });
        points.push(ControlPoint::from_parts(
            loaded(&p.position),
            loaded(&p.left),
            loaded(&p.right),
            handle.clone(),
        ));
        feather_points.push(FeatherPoint {
            point: ControlPoint::from_parts(
                loaded(&p.feather.position),
                loaded(&p.feather.left),
                loaded(&p.feather.right),
                handle,
            ),
            decoupled: p.feather.decoupled,
        });
    }
    let mut knobs = def.knobs.clone();
    knobs.refresh_derivatives();
    Bezier::from_parts(points, feather_points, def.finished, knobs, def.overlay_color)
}

/// Persisted point with derivatives recomputed from its keyframes, so files that omit or
/// hand-edit them evaluate like curves built through the API.
fn loaded(p: &AnimatedPoint) -> AnimatedPoint {
    let mut p = p.clone();
    p.refresh_derivatives();
    p
}

impl RotoContext {
    /// Snapshot of the current state.
    pub fn snapshot(&self) -> ContextSnapshot {
        self.read(ContextSnapshot::capture)
    }

    /// Replace the state with `snapshot`. On error the context is left untouched.
    pub fn load_snapshot(
        &self,
        snapshot: &ContextSnapshot,
        tracks: &dyn TrackRegistry,
    ) -> RotoResult<()> {
        let state = snapshot.restore(tracks)?;
        self.replace_state(state);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/snapshot.rs"]
mod tests;
