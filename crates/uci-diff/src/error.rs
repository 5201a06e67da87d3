//! Error types for the diff crate.

use uci_types::TreeError;

/// Errors that can occur while applying or reverting a delta.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// An option-level entry targets a section that does not exist.
    #[error("section {package}.{section} not found while patching options")]
    MissingSection { package: String, section: String },

    /// A tree operation failed (type mismatch, invalid metadata).
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),
}

/// Convenience alias for patch results.
pub type PatchResult<T> = Result<T, PatchError>;
