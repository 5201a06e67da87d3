use thiserror::Error;

/// Errors produced by tree operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A package or section required by the operation does not exist.
    #[error("{what} not found: {name}")]
    NotFound { what: &'static str, name: String },

    /// A list operation hit a scalar option, or the other way around.
    #[error("type mismatch for option {key}: expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A reserved section field (`.type`, `.name`, `.anonymous`) was misused.
    #[error("invalid metadata {key}: {reason}")]
    InvalidMetadata { key: String, reason: String },

    /// Malformed bootstrap or export input.
    #[error("parse error: {0}")]
    Parse(String),

    /// The tree could not be written out as JSON.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl TreeError {
    pub(crate) fn package_not_found(name: &str) -> Self {
        Self::NotFound {
            what: "package",
            name: name.to_string(),
        }
    }

    pub(crate) fn section_not_found(package: &str, section: &str) -> Self {
        Self::NotFound {
            what: "section",
            name: format!("{package}.{section}"),
        }
    }
}

/// Result alias for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        assert_eq!(
            TreeError::section_not_found("dhcp", "wan").to_string(),
            "section not found: dhcp.wan"
        );
        assert_eq!(
            TreeError::Serialization("key must be a string".into()).to_string(),
            "serialization error: key must be a string"
        );
        assert_ne!(
            TreeError::Serialization("x".into()),
            TreeError::Parse("x".into())
        );
    }
}
