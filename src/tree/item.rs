use crate::shape::bezier::Bezier;

/// Stable handle of an item in an [`crate::ItemTree`]. Ids are never reused.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ItemId(pub(crate) u32);

impl ItemId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Layer or shape payload of an [`Item`].
#[derive(Clone, Debug)]
pub enum ItemKind {
    /// Group of items; `children[0]` is the bottom-most.
    Layer {
        /// Child items, bottom first.
        children: Vec<ItemId>,
    },
    /// Bezier shape.
    Shape(Box<Bezier>),
}

impl ItemKind {
    /// Empty layer.
    pub fn layer() -> Self {
        Self::Layer {
            children: Vec::new(),
        }
    }

    /// Base name used for default item names (`Layer1`, `Bezier3`, ...).
    pub fn base_name(&self) -> &'static str {
        match self {
            Self::Layer { .. } => "Layer",
            Self::Shape(_) => "Bezier",
        }
    }
}

/// Node of the item tree.
#[derive(Clone, Debug)]
pub struct Item {
    pub(crate) name: String,
    pub(crate) parent: Option<ItemId>,
    pub(crate) globally_activated: bool,
    pub(crate) locked: bool,
    pub(crate) kind: ItemKind,
}

impl Item {
    pub(crate) fn new(name: String, parent: Option<ItemId>, kind: ItemKind) -> Self {
        Self {
            name,
            parent,
            globally_activated: true,
            locked: false,
            kind,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent layer, `None` for root items.
    pub fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    /// Whether the item takes part in rendering.
    pub fn is_globally_activated(&self) -> bool {
        self.globally_activated
    }

    /// Whether edits on the item are refused.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Payload.
    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    /// Return `true` for layers.
    pub fn is_layer(&self) -> bool {
        matches!(self.kind, ItemKind::Layer { .. })
    }

    /// Child items (bottom first); empty for shapes.
    pub fn children(&self) -> &[ItemId] {
        match &self.kind {
            ItemKind::Layer { children } => children,
            ItemKind::Shape(_) => &[],
        }
    }

    /// Shape payload.
    pub fn as_shape(&self) -> Option<&Bezier> {
        match &self.kind {
            ItemKind::Shape(b) => Some(b),
            ItemKind::Layer { .. } => None,
        }
    }

    pub(crate) fn as_shape_mut(&mut self) -> Option<&mut Bezier> {
        match &mut self.kind {
            ItemKind::Shape(b) => Some(b),
            ItemKind::Layer { .. } => None,
        }
    }
}
