use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::context::cache::{CacheStats, MaskCache, MaskKey};
use crate::context::state::RotoState;
use crate::foundation::core::{Frame, Viewport};
use crate::foundation::error::RotoResult;
use crate::render::config::RenderConfig;
use crate::render::image::MaskImage;
use crate::render::renderer::{MaskRenderer, RenderTarget, ScanlineRenderer};
use crate::render::sample::ShapeSample;
use crate::shape::bezier::{Bezier, ShapeKnob};
use crate::shape::policy::EditPolicy;
use crate::tree::item::ItemId;

/// Shared roto context: the editable state behind a read-write lock plus a single-slot memo of
/// the last rendered mask behind its own mutex.
///
/// Editing goes through [`RotoContext::edit`] (or the wrappers built on it), which runs the
/// closure under the write lock and bumps the age once. Renders hold the read lock only while
/// sampling shapes, so rasterization never blocks editors.
///
/// Locks are always taken state first, cache second.
pub struct RotoContext {
    state: RwLock<RotoState>,
    cache: Mutex<MaskCache>,
    renderer: Box<dyn MaskRenderer>,
    config: RenderConfig,
}

impl std::fmt::Debug for RotoContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotoContext")
            .field("age", &self.age())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for RotoContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RotoContext {
    /// Empty context rendering with [`ScanlineRenderer`] on the global rayon pool.
    pub fn new() -> Self {
        Self::with_renderer(Box::new(ScanlineRenderer::new()), RenderConfig::default())
    }

    /// Empty context with a renderer built from `config`.
    pub fn from_config(config: RenderConfig) -> RotoResult<Self> {
        let renderer = ScanlineRenderer::from_config(&config)?;
        Ok(Self::with_renderer(Box::new(renderer), config))
    }

    /// Empty context using a caller-supplied renderer.
    pub fn with_renderer(renderer: Box<dyn MaskRenderer>, config: RenderConfig) -> Self {
        Self {
            state: RwLock::new(RotoState::new()),
            cache: Mutex::new(MaskCache::default()),
            renderer,
            config,
        }
    }

    /// Render settings.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    fn read_state(&self) -> RwLockReadGuard<'_, RotoState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, RotoState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_cache(&self) -> MutexGuard<'_, MaskCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the state under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&RotoState) -> R) -> R {
        f(&self.read_state())
    }

    /// Run a multi-step edit atomically under the write lock.
    ///
    /// `f` works on a copy of the state; the copy replaces the state and the age is bumped once
    /// only when `f` succeeds, so a failed edit leaves nothing behind. The copy covers the whole
    /// tree, so its cost grows with the number of shapes; single-shape edits such as drags should
    /// go through [`RotoContext::edit_shape`], which copies only that shape.
    pub fn edit<R>(&self, f: impl FnOnce(&mut RotoState) -> RotoResult<R>) -> RotoResult<R> {
        let mut guard = self.write_state();
        let mut draft = guard.clone();
        let out = f(&mut draft)?;
        draft.increment_age();
        *guard = draft;
        Ok(out)
    }

    /// Run `f` under the write lock without bumping the age. For changes that cannot affect
    /// the rendered mask: flags and selection.
    pub fn update<R>(&self, f: impl FnOnce(&mut RotoState) -> R) -> R {
        f(&mut self.write_state())
    }

    /// Edit the shape `id` with the current editing flags.
    ///
    /// Atomic like [`RotoContext::edit`], but only the shape is copied.
    pub fn edit_shape<R>(
        &self,
        id: ItemId,
        f: impl FnOnce(&mut Bezier, EditPolicy) -> RotoResult<R>,
    ) -> RotoResult<R> {
        let mut guard = self.write_state();
        let policy = guard.edit_policy();
        let shape = guard.shape_mut(id)?;
        let mut draft = shape.clone();
        let out = f(&mut draft, policy)?;
        *shape = draft;
        guard.increment_age();
        Ok(out)
    }

    /// Edit counter.
    pub fn age(&self) -> u64 {
        self.read_state().age()
    }

    /// Mark the state as changed, invalidating the memoized mask.
    pub fn increment_age(&self) {
        self.write_state().increment_age();
    }

    /// Replace the whole state, e.g. after loading a snapshot. The new age is strictly greater
    /// than the current one and the memo is dropped.
    pub fn replace_state(&self, mut state: RotoState) {
        let mut guard = self.write_state();
        state.age = guard.age.wrapping_add(1);
        *guard = state;
        self.lock_cache().clear();
        tracing::debug!(age = guard.age, "context state replaced");
    }

    /// Copy of the current state.
    pub fn state_snapshot(&self) -> RotoState {
        self.read_state().clone()
    }

    /// Create a layer; see [`RotoState::create_layer`].
    pub fn create_layer(&self, parent: Option<ItemId>) -> RotoResult<ItemId> {
        self.edit(|s| s.create_layer(parent))
    }

    /// Create a shape; see [`RotoState::create_bezier`].
    pub fn create_bezier(&self, parent: Option<ItemId>) -> RotoResult<ItemId> {
        self.edit(|s| s.create_bezier(parent))
    }

    /// Remove an item and its subtree.
    pub fn remove_item(&self, id: ItemId) -> RotoResult<()> {
        self.edit(|s| s.remove_item(id))
    }

    /// Rename an item.
    pub fn rename_item(&self, id: ItemId, name: &str) -> RotoResult<()> {
        self.edit(|s| s.rename_item(id, name))
    }

    /// Lock or unlock an item and its subtree.
    pub fn set_item_locked(&self, id: ItemId, locked: bool) -> RotoResult<()> {
        self.edit(|s| s.set_item_locked(id, locked))
    }

    /// Enable or disable rendering of an item and its subtree.
    pub fn set_globally_activated(&self, id: ItemId, activated: bool) -> RotoResult<()> {
        self.edit(|s| s.set_globally_activated(id, activated))
    }

    /// Reparent or reorder an item.
    pub fn move_item(&self, id: ItemId, parent: Option<ItemId>, index: usize) -> RotoResult<()> {
        self.edit(|s| s.move_item(id, parent, index))
    }

    /// First item named `name`.
    pub fn find_item_by_name(&self, name: &str) -> Option<ItemId> {
        self.read(|s| s.find_item_by_name(name))
    }

    /// Replace the selection.
    pub fn set_selection(&self, items: &[ItemId]) -> RotoResult<()> {
        self.update(|s| s.set_selection(items))
    }

    /// Select `id` last.
    pub fn add_to_selection(&self, id: ItemId) -> RotoResult<()> {
        self.update(|s| s.add_to_selection(id))
    }

    /// Deselect `id`.
    pub fn remove_from_selection(&self, id: ItemId) -> bool {
        self.update(|s| s.remove_from_selection(id))
    }

    /// Deselect everything.
    pub fn clear_selection(&self) {
        self.update(RotoState::clear_selection);
    }

    /// Selected items, least recently selected first.
    pub fn selection(&self) -> Vec<ItemId> {
        self.read(|s| s.selection().to_vec())
    }

    /// Knob values of the most recently selected shape.
    pub fn selection_knob_values(&self, time: Frame) -> Option<Vec<(ShapeKnob, f64)>> {
        self.read(|s| s.selection_knob_values(time))
    }

    /// Write a knob on every selected shape.
    pub fn set_selection_knob(&self, kind: ShapeKnob, time: Frame, value: f64) -> RotoResult<usize> {
        self.edit(|s| s.set_selection_knob(kind, time, value))
    }

    /// Current editing flags.
    pub fn edit_policy(&self) -> EditPolicy {
        self.read(RotoState::edit_policy)
    }

    /// Whether position writes create keyframes.
    pub fn is_auto_keying_enabled(&self) -> bool {
        self.read(RotoState::is_auto_keying_enabled)
    }

    /// Toggle auto-keying.
    pub fn set_auto_keying_enabled(&self, enabled: bool) {
        self.update(|s| s.set_auto_keying_enabled(enabled));
    }

    /// Whether moves apply at every keyframe.
    pub fn is_ripple_edit_enabled(&self) -> bool {
        self.read(RotoState::is_ripple_edit_enabled)
    }

    /// Toggle ripple editing.
    pub fn set_ripple_edit_enabled(&self, enabled: bool) {
        self.update(|s| s.set_ripple_edit_enabled(enabled));
    }

    /// Whether control point moves carry their feather point.
    pub fn is_feather_link_enabled(&self) -> bool {
        self.read(RotoState::is_feather_link_enabled)
    }

    /// Toggle feather linking.
    pub fn set_feather_link_enabled(&self, enabled: bool) {
        self.update(|s| s.set_feather_link_enabled(enabled));
    }

    /// Hit/miss counters of the mask memo.
    pub fn cache_stats(&self) -> CacheStats {
        self.lock_cache().stats()
    }

    /// Drop the memoized mask.
    pub fn invalidate_cache(&self) {
        self.lock_cache().clear();
    }

    /// Mask of every renderable shape at `time`, for the full-resolution `viewport` at
    /// `mip_level`.
    ///
    /// A request matching the last one at the same age returns the memoized image without
    /// rendering. Otherwise shapes are sampled under the read lock and rasterized after it is
    /// released.
    #[tracing::instrument(skip_all, fields(time = time.0, mip = mip_level))]
    pub fn get_or_render_mask(
        &self,
        time: Frame,
        mip_level: u32,
        viewport: Viewport,
    ) -> RotoResult<Arc<MaskImage>> {
        let (key, samples) = {
            let state = self.read_state();
            let key = MaskKey {
                age: state.age(),
                time,
                mip_level,
                viewport,
            };
            if let Some(hit) = self.lock_cache().lookup(&key) {
                return Ok(hit);
            }
            let samples: Vec<ShapeSample> = state
                .renderable_shapes(time)
                .into_iter()
                .map(|shape| ShapeSample::from_shape(shape, time, mip_level, &self.config))
                .collect();
            (key, samples)
        };

        let target = RenderTarget::new(viewport, mip_level);
        let image = Arc::new(self.renderer.render(&samples, &target)?);
        self.lock_cache().store(key, Arc::clone(&image));
        Ok(image)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/context/context.rs"]
mod tests;
