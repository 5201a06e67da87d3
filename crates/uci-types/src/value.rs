use std::fmt;

use serde::{Deserialize, Serialize};

/// The value held by a single option key.
///
/// UCI distinguishes `option` lines (one string) from `list` lines (an ordered
/// sequence of strings sharing a key). The two kinds never coerce into each
/// other; operations that expect one and find the other fail with
/// [`TreeError::TypeMismatch`](crate::TreeError::TypeMismatch).
///
/// In JSON a scalar is a plain string and a list is an array of strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// A single string (`option 'key' 'value'`).
    Scalar(String),
    /// An ordered list of strings (`list 'key' 'value'`, repeated).
    List(Vec<String>),
}

impl OptionValue {
    /// Build a scalar value.
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    /// Build a list value from anything yielding strings.
    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    /// Human-readable name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::List(_) => "list",
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// The scalar string, if this is a scalar.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(_) => None,
        }
    }

    /// The list elements, if this is a list.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::Scalar(_) => None,
            Self::List(items) => Some(items),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "'{s}'"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "'{item}'")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_serializes_as_string() {
        let v = OptionValue::scalar("1");
        assert_eq!(serde_json::to_value(&v).unwrap(), json!("1"));
    }

    #[test]
    fn list_serializes_as_array() {
        let v = OptionValue::list(["a", "b"]);
        assert_eq!(serde_json::to_value(&v).unwrap(), json!(["a", "b"]));
    }

    #[test]
    fn deserialize_picks_variant_from_shape() {
        let s: OptionValue = serde_json::from_value(json!("lan")).unwrap();
        assert_eq!(s, OptionValue::scalar("lan"));

        let l: OptionValue = serde_json::from_value(json!(["x"])).unwrap();
        assert_eq!(l, OptionValue::list(["x"]));
    }

    #[test]
    fn numbers_are_rejected() {
        let err = serde_json::from_value::<OptionValue>(json!(5));
        assert!(err.is_err());
    }

    #[test]
    fn accessors_match_variant() {
        let s = OptionValue::scalar("x");
        assert_eq!(s.as_scalar(), Some("x"));
        assert!(s.as_list().is_none());
        assert!(!s.is_list());
        assert_eq!(s.kind_name(), "scalar");

        let l = OptionValue::list(["x", "y"]);
        assert!(l.as_scalar().is_none());
        assert_eq!(l.as_list().map(<[String]>::len), Some(2));
        assert_eq!(l.kind_name(), "list");
    }

    #[test]
    fn display_quotes_elements() {
        assert_eq!(OptionValue::scalar("a").to_string(), "'a'");
        assert_eq!(OptionValue::list(["a", "b"]).to_string(), "['a', 'b']");
    }
}
