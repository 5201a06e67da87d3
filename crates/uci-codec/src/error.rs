use thiserror::Error;
use uci_types::TreeError;

#[derive(Debug, Error)]
pub enum CodecError {
    /// The input is not a well-formed delta document.
    #[error("parse error: {0}")]
    Parse(String),

    /// An entry's key disagrees with its `package`/`config` fields.
    #[error("{bucket} key {key:?} does not match its package/config fields")]
    KeyMismatch { bucket: &'static str, key: String },

    /// Two entries of one bucket map to the same exchange key.
    #[error("{bucket} key {key:?} collides with another entry")]
    KeyCollision { bucket: &'static str, key: String },

    /// A package or section snapshot could not be rebuilt.
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type CodecResult<T> = Result<T, CodecError>;
