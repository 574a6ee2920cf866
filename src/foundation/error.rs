/// Convenience result type used across testcard.
pub type CardResult<T> = Result<T, CardError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Layout, dispatch and validation errors are always scoped to a single widget: the compositor
/// turns them into a `400` response instead of propagating them up the call stack.
#[derive(thiserror::Error, Debug)]
pub enum CardError {
    /// A box could not be resolved into a pixel placement.
    #[error("layout error: {0}")]
    Layout(String),

    /// No handler could be produced for a widget.
    #[error("dispatch error: {0}")]
    Dispatch(String),

    /// Invalid user-provided configuration or widget payload.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while encoding or saving a frame.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors in the project configuration as a whole.
    #[error("config error: {0}")]
    Config(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CardError {
    /// Build a [`CardError::Layout`] value.
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    /// Build a [`CardError::Dispatch`] value.
    pub fn dispatch(msg: impl Into<String>) -> Self {
        Self::Dispatch(msg.into())
    }

    /// Build a [`CardError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CardError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`CardError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`CardError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
