use crate::foundation::error::{RotoError, RotoResult};
use crate::tree::item::{Item, ItemId, ItemKind};

/// Arena-backed layer/shape tree.
///
/// Items are addressed by [`ItemId`]; removing an item frees its slot for good, so stale ids
/// resolve to `None` instead of aliasing a newer item. Sibling order is bottom first.
#[derive(Clone, Debug, Default)]
pub struct ItemTree {
    slots: Vec<Option<Item>>,
    roots: Vec<ItemId>,
}

impl ItemTree {
    /// Empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live items.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Return `true` when the tree holds no items.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Root items, bottom first.
    pub fn roots(&self) -> &[ItemId] {
        &self.roots
    }

    /// Item `id`, or `None` when it does not exist (anymore).
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Item `id`, or a contract error.
    pub fn item(&self, id: ItemId) -> RotoResult<&Item> {
        self.get(id)
            .ok_or_else(|| RotoError::contract(format!("no item {id}")))
    }

    pub(crate) fn item_mut(&mut self, id: ItemId) -> RotoResult<&mut Item> {
        self.get_mut(id)
            .ok_or_else(|| RotoError::contract(format!("no item {id}")))
    }

    /// Return `true` when `id` refers to a live item.
    pub fn contains(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    /// Children of `parent`, or the roots.
    fn siblings_mut(&mut self, parent: Option<ItemId>) -> RotoResult<&mut Vec<ItemId>> {
        match parent {
            None => Ok(&mut self.roots),
            Some(p) => match &mut self.item_mut(p)?.kind {
                ItemKind::Layer { children } => Ok(children),
                ItemKind::Shape(_) => Err(RotoError::contract(format!(
                    "item {p} is a shape and cannot hold children"
                ))),
            },
        }
    }

    /// Add an item on top of `parent` (or of the roots).
    pub(crate) fn insert(
        &mut self,
        parent: Option<ItemId>,
        name: String,
        kind: ItemKind,
    ) -> RotoResult<ItemId> {
        let id = ItemId(u32::try_from(self.slots.len()).map_err(|_| {
            RotoError::invalid_operation("item tree is full")
        })?);
        self.siblings_mut(parent)?.push(id);
        self.slots.push(Some(Item::new(name, parent, kind)));
        Ok(id)
    }

    /// Remove `id` and its whole subtree. Returns the removed ids, `id` first.
    pub(crate) fn remove(&mut self, id: ItemId) -> RotoResult<Vec<ItemId>> {
        let parent = self.item(id)?.parent;
        self.siblings_mut(parent)?.retain(|c| *c != id);
        let removed = self.subtree(id);
        for r in &removed {
            self.slots[r.index()] = None;
        }
        Ok(removed)
    }

    /// Move `id` under `parent` at sibling position `index` (clamped).
    pub(crate) fn reparent(
        &mut self,
        id: ItemId,
        parent: Option<ItemId>,
        index: usize,
    ) -> RotoResult<()> {
        let old_parent = self.item(id)?.parent;
        if let Some(p) = parent {
            if !self.item(p)?.is_layer() {
                return Err(RotoError::contract(format!("item {p} is not a layer")));
            }
            if p == id || self.is_ancestor(id, p) {
                return Err(RotoError::invalid_operation(format!(
                    "cannot move item {id} into its own subtree"
                )));
            }
        }

        self.siblings_mut(old_parent)?.retain(|c| *c != id);
        let siblings = self.siblings_mut(parent)?;
        let at = index.min(siblings.len());
        siblings.insert(at, id);
        self.item_mut(id)?.parent = parent;
        Ok(())
    }

    /// Return `true` when `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: ItemId, id: ItemId) -> bool {
        let mut cur = self.get(id).and_then(Item::parent);
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.get(p).and_then(Item::parent);
        }
        false
    }

    /// `id` and all its descendants in pre-order.
    pub fn subtree(&self, id: ItemId) -> Vec<ItemId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let Some(item) = self.get(cur) else {
                continue;
            };
            out.push(cur);
            stack.extend(item.children().iter().rev());
        }
        out
    }

    /// Every live item in pre-order, bottom-most first.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &Item)> {
        self.roots
            .iter()
            .flat_map(|r| self.subtree(*r))
            .filter_map(|id| self.get(id).map(|item| (id, item)))
    }

    /// First item named `name` in pre-order.
    pub fn find_by_name(&self, name: &str) -> Option<ItemId> {
        self.iter().find(|(_, item)| item.name == name).map(|(id, _)| id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tree/arena.rs"]
mod tests;
