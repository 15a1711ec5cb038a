/// Context-level editing flags, passed explicitly to every shape mutator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct EditPolicy {
    /// Position writes create keyframes on static points.
    pub auto_keying: bool,
    /// Moves are applied at every keyframe time of the edited point.
    pub ripple_edit: bool,
    /// Moving a control point carries its feather point along.
    pub feather_link: bool,
}

impl Default for EditPolicy {
    fn default() -> Self {
        Self {
            auto_keying: true,
            ripple_edit: false,
            feather_link: true,
        }
    }
}

impl EditPolicy {
    /// Policy that writes static values only and leaves feather points alone.
    pub fn static_edit() -> Self {
        Self {
            auto_keying: false,
            ripple_edit: false,
            feather_link: false,
        }
    }
}
