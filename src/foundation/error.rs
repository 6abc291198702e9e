/// Convenience result type used across the rendering core.
pub type RenderTextResult<T> = Result<T, RenderTextError>;

/// Error taxonomy of the rendering core.
///
/// Variants classify failures for diagnostics only; the call boundary flattens all of them into
/// an opaque [`CallError`](crate::CallError) carrying the message text.
#[derive(thiserror::Error, Debug)]
pub enum RenderTextError {
    /// Font file missing, unreadable, not a font, or backend initialization failed.
    #[error("font load error: {0}")]
    FontLoad(String),

    /// A glyph run could not be rendered (zero-size text, oversized run, backend failure).
    #[error("rasterize error: {0}")]
    Rasterize(String),

    /// A pixel buffer could not be allocated.
    #[error("allocation error: {0}")]
    Alloc(String),

    /// PNG encoding or writing failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Malformed or out-of-range call arguments.
    #[error("argument error: {0}")]
    Argument(String),
}

impl RenderTextError {
    /// Build a [`RenderTextError::FontLoad`] value.
    pub fn font_load(msg: impl Into<String>) -> Self {
        Self::FontLoad(msg.into())
    }

    /// Build a [`RenderTextError::Rasterize`] value.
    pub fn rasterize(msg: impl Into<String>) -> Self {
        Self::Rasterize(msg.into())
    }

    /// Build a [`RenderTextError::Alloc`] value.
    pub fn alloc(msg: impl Into<String>) -> Self {
        Self::Alloc(msg.into())
    }

    /// Build a [`RenderTextError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`RenderTextError::Argument`] value.
    pub fn argument(msg: impl Into<String>) -> Self {
        Self::Argument(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
