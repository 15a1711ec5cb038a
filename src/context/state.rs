use std::collections::BTreeMap;

use crate::foundation::core::Frame;
use crate::foundation::error::{RotoError, RotoResult};
use crate::shape::bezier::{Bezier, ShapeKnob};
use crate::shape::policy::EditPolicy;
use crate::tree::arena::ItemTree;
use crate::tree::item::{Item, ItemId, ItemKind};

/// Everything guarded by the context lock: the item tree, selection, editing flags, per-kind
/// name counters and the edit age.
#[derive(Clone, Debug, Default)]
pub struct RotoState {
    pub(crate) tree: ItemTree,
    pub(crate) selection: Vec<ItemId>,
    pub(crate) last_inserted: Option<ItemId>,
    pub(crate) last_locked: Option<ItemId>,
    pub(crate) policy: EditPolicy,
    pub(crate) age: u64,
    pub(crate) counters: BTreeMap<String, u32>,
}

impl RotoState {
    /// Empty state with default flags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Item tree.
    pub fn tree(&self) -> &ItemTree {
        &self.tree
    }

    /// Item `id`.
    pub fn item(&self, id: ItemId) -> RotoResult<&Item> {
        self.tree.item(id)
    }

    /// Edit counter; bumped once per logical edit.
    pub fn age(&self) -> u64 {
        self.age
    }

    /// Mark the state as changed.
    pub fn increment_age(&mut self) {
        self.age = self.age.wrapping_add(1);
    }

    /// Current editing flags.
    pub fn edit_policy(&self) -> EditPolicy {
        self.policy
    }

    /// Whether position writes create keyframes.
    pub fn is_auto_keying_enabled(&self) -> bool {
        self.policy.auto_keying
    }

    /// Toggle auto-keying.
    pub fn set_auto_keying_enabled(&mut self, enabled: bool) {
        self.policy.auto_keying = enabled;
    }

    /// Whether moves apply at every keyframe.
    pub fn is_ripple_edit_enabled(&self) -> bool {
        self.policy.ripple_edit
    }

    /// Toggle ripple editing.
    pub fn set_ripple_edit_enabled(&mut self, enabled: bool) {
        self.policy.ripple_edit = enabled;
    }

    /// Whether control point moves carry their feather point.
    pub fn is_feather_link_enabled(&self) -> bool {
        self.policy.feather_link
    }

    /// Toggle feather linking.
    pub fn set_feather_link_enabled(&mut self, enabled: bool) {
        self.policy.feather_link = enabled;
    }

    /// Number of items created so far with base name `base` (`"Layer"`, `"Bezier"`).
    pub fn item_counter(&self, base: &str) -> u32 {
        self.counters.get(base).copied().unwrap_or(0)
    }

    /// All per-kind counters.
    pub fn item_counters(&self) -> &BTreeMap<String, u32> {
        &self.counters
    }

    /// Most recently created item, if it still exists.
    pub fn last_inserted_item(&self) -> Option<ItemId> {
        self.last_inserted
    }

    /// Most recently locked item, if it still exists.
    pub fn last_locked_item(&self) -> Option<ItemId> {
        self.last_locked
    }

    /// Create a layer named `Layer<n>` on top of `parent` (or of the roots).
    pub fn create_layer(&mut self, parent: Option<ItemId>) -> RotoResult<ItemId> {
        self.create_item(parent, ItemKind::layer())
    }

    /// Create an empty shape named `Bezier<n>` on top of `parent` (or of the roots).
    pub fn create_bezier(&mut self, parent: Option<ItemId>) -> RotoResult<ItemId> {
        self.create_item(parent, ItemKind::Shape(Box::default()))
    }

    fn create_item(&mut self, parent: Option<ItemId>, kind: ItemKind) -> RotoResult<ItemId> {
        if let Some(p) = parent {
            let item = self.tree.item(p)?;
            if !item.is_layer() {
                return Err(RotoError::contract(format!("item {p} is not a layer")));
            }
            ensure_unlocked(item, p)?;
        }
        let base = kind.base_name();
        let counter = self.counters.entry(base.to_string()).or_insert(0);
        *counter += 1;
        let name = format!("{base}{counter}");
        let id = self.tree.insert(parent, name, kind)?;
        self.last_inserted = Some(id);
        tracing::debug!(%id, kind = base, "item created");
        Ok(id)
    }

    /// Remove `id` and its subtree; removed ids leave the selection.
    pub fn remove_item(&mut self, id: ItemId) -> RotoResult<()> {
        ensure_unlocked(self.tree.item(id)?, id)?;
        let removed = self.tree.remove(id)?;
        self.selection.retain(|s| !removed.contains(s));
        if self.last_inserted.is_some_and(|i| removed.contains(&i)) {
            self.last_inserted = None;
        }
        if self.last_locked.is_some_and(|i| removed.contains(&i)) {
            self.last_locked = None;
        }
        tracing::debug!(%id, removed = removed.len(), "item removed");
        Ok(())
    }

    /// Rename `id`.
    pub fn rename_item(&mut self, id: ItemId, name: &str) -> RotoResult<()> {
        if name.trim().is_empty() {
            return Err(RotoError::invalid_operation("item name must not be empty"));
        }
        let item = self.tree.item_mut(id)?;
        ensure_unlocked(item, id)?;
        item.name = name.to_string();
        Ok(())
    }

    /// Lock or unlock `id` and its whole subtree.
    pub fn set_item_locked(&mut self, id: ItemId, locked: bool) -> RotoResult<()> {
        self.tree.item(id)?;
        for i in self.tree.subtree(id) {
            self.tree.item_mut(i)?.locked = locked;
        }
        if locked {
            self.last_locked = Some(id);
        }
        Ok(())
    }

    /// Enable or disable rendering of `id` and its whole subtree.
    pub fn set_globally_activated(&mut self, id: ItemId, activated: bool) -> RotoResult<()> {
        self.tree.item(id)?;
        for i in self.tree.subtree(id) {
            self.tree.item_mut(i)?.globally_activated = activated;
        }
        Ok(())
    }

    /// Move `id` under `parent` (or to the roots) at sibling position `index`.
    pub fn move_item(&mut self, id: ItemId, parent: Option<ItemId>, index: usize) -> RotoResult<()> {
        ensure_unlocked(self.tree.item(id)?, id)?;
        if let Some(p) = parent {
            ensure_unlocked(self.tree.item(p)?, p)?;
        }
        self.tree.reparent(id, parent, index)
    }

    /// First item named `name`, in tree order.
    pub fn find_item_by_name(&self, name: &str) -> Option<ItemId> {
        self.tree.find_by_name(name)
    }

    /// Shape payload of `id`.
    pub fn shape(&self, id: ItemId) -> RotoResult<&Bezier> {
        self.tree
            .item(id)?
            .as_shape()
            .ok_or_else(|| RotoError::contract(format!("item {id} is not a shape")))
    }

    /// Mutable shape payload of `id`; locked shapes are refused.
    pub fn shape_mut(&mut self, id: ItemId) -> RotoResult<&mut Bezier> {
        let item = self.tree.item_mut(id)?;
        ensure_unlocked(item, id)?;
        item.as_shape_mut()
            .ok_or_else(|| RotoError::contract(format!("item {id} is not a shape")))
    }

    /// Selected items, least recently selected first.
    pub fn selection(&self) -> &[ItemId] {
        &self.selection
    }

    /// Replace the selection. Duplicates are dropped.
    pub fn set_selection(&mut self, items: &[ItemId]) -> RotoResult<()> {
        for id in items {
            self.tree.item(*id)?;
        }
        self.selection.clear();
        for id in items {
            if !self.selection.contains(id) {
                self.selection.push(*id);
            }
        }
        Ok(())
    }

    /// Add `id` as the most recently selected item.
    pub fn add_to_selection(&mut self, id: ItemId) -> RotoResult<()> {
        self.tree.item(id)?;
        self.selection.retain(|s| *s != id);
        self.selection.push(id);
        Ok(())
    }

    /// Drop `id` from the selection. Returns `false` when it was not selected.
    pub fn remove_from_selection(&mut self, id: ItemId) -> bool {
        let before = self.selection.len();
        self.selection.retain(|s| *s != id);
        self.selection.len() != before
    }

    /// Empty the selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Knob values at `time` of the most recently selected shape.
    pub fn selection_knob_values(&self, time: Frame) -> Option<Vec<(ShapeKnob, f64)>> {
        let shape = self
            .selection
            .iter()
            .rev()
            .find_map(|id| self.tree.get(*id).and_then(Item::as_shape))?;
        Some(
            ShapeKnob::ALL
                .iter()
                .map(|k| (*k, shape.knob(*k).value_at(time)))
                .collect(),
        )
    }

    /// Write knob `kind` on every selected, unlocked shape. Returns the number of shapes written.
    ///
    /// The write keys the knob under auto-keying or when it is already animated.
    pub fn set_selection_knob(
        &mut self,
        kind: ShapeKnob,
        time: Frame,
        value: f64,
    ) -> RotoResult<usize> {
        let auto_keying = self.policy.auto_keying;
        let mut written = 0;
        for id in self.selection.clone() {
            let Some(item) = self.tree.get_mut(id) else {
                continue;
            };
            if item.locked {
                continue;
            }
            if let Some(shape) = item.as_shape_mut() {
                shape.knob_mut(kind).set_value_at_time(time, value, auto_keying)?;
                written += 1;
            }
        }
        Ok(written)
    }

    /// Shapes contributing to the mask at `time`, bottom first: finished, globally activated
    /// and activated at `time`.
    pub fn renderable_shapes(&self, time: Frame) -> Vec<&Bezier> {
        self.tree
            .iter()
            .filter(|(_, item)| item.globally_activated)
            .filter_map(|(id, item)| item.as_shape().map(|s| (id, s)))
            .filter(|(_, shape)| shape.is_finished() && shape.is_activated_at(time))
            .map(|(id, shape)| {
                if shape.has_dead_masters() {
                    tracing::warn!(%id, "shape follows a dropped track; using local positions");
                }
                shape
            })
            .collect()
    }

    pub(crate) fn validate(&self) -> RotoResult<()> {
        for (_, item) in self.tree.iter() {
            if let Some(shape) = item.as_shape() {
                shape.validate()?;
            }
        }
        Ok(())
    }
}

fn ensure_unlocked(item: &Item, id: ItemId) -> RotoResult<()> {
    if item.locked {
        return Err(RotoError::invalid_operation(format!(
            "item {id} ('{}') is locked",
            item.name
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/context/state.rs"]
mod tests;
