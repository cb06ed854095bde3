use crate::tree::canvas::GlyphHandle;

/// Failures local to a single tree operation.
///
/// None of these are fatal to the host: the widget logs them, drops the event
/// and leaves the tree as it was before the event arrived.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The caller broke the node contract, e.g. asked a leaf for its contents.
    #[error("contract violation: {0}")]
    ContractViolation(String),

    /// A glyph was hit that no longer belongs to a visible node.
    #[error("stale glyph reference: {0}")]
    StaleGlyph(GlyphHandle),

    /// A lazy or background content hook panicked.
    #[error("content load failed: {0}")]
    ContentLoad(String),
}

pub type Result<T, E = TreeError> = std::result::Result<T, E>;
