/// Convenience result type used across rotomask.
pub type RotoResult<T> = Result<T, RotoError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum RotoError {
    /// Caller passed an index or time where a point or keyframe must exist.
    #[error("contract violation: {0}")]
    Contract(String),

    /// The operation is well-formed but not allowed in the current state.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Structural invariant of a shape does not hold.
    #[error("structural invariant violated: {0}")]
    Invariant(String),

    /// Invalid user-provided or snapshot data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while editing or sampling animation curves.
    #[error("animation error: {0}")]
    Animation(String),

    /// Errors while rasterizing masks.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing snapshots.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RotoError {
    /// Build a [`RotoError::Contract`] value.
    pub fn contract(msg: impl Into<String>) -> Self {
        Self::Contract(msg.into())
    }

    /// Build a [`RotoError::InvalidOperation`] value.
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    /// Build a [`RotoError::Invariant`] value.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    /// Build a [`RotoError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RotoError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`RotoError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`RotoError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
