use std::collections::BTreeMap;

use crate::error::{TreeError, TreeResult};
use crate::value::OptionValue;

/// Reserved key exposing the section's type tag.
pub const TYPE_KEY: &str = ".type";
/// Reserved key exposing the section's identifier.
pub const NAME_KEY: &str = ".name";
/// Reserved key exposing the anonymity flag.
pub const ANONYMOUS_KEY: &str = ".anonymous";

/// Returns `true` for the three reserved metadata keys.
pub fn is_reserved_key(key: &str) -> bool {
    matches!(key, TYPE_KEY | NAME_KEY | ANONYMOUS_KEY)
}

/// Returns `true` for keys in the metadata namespace (a leading `.`).
/// No option may use such a key.
pub fn is_metadata_key(key: &str) -> bool {
    key.starts_with('.')
}

/// A typed, possibly anonymous group of options inside a package
/// (a `config` block in UCI syntax).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    /// Free-form type tag (`interface`, `dhcp`, `rule`, ...).
    pub kind: String,
    /// Unique identifier within the owning package.
    pub identifier: String,
    /// Anonymous sections render without a name.
    pub anonymous: bool,
    /// Option key to value. Keys never start with `.`.
    pub(crate) options: BTreeMap<String, OptionValue>,
}

impl Section {
    /// Create an empty section.
    pub fn new(kind: impl Into<String>, identifier: impl Into<String>, anonymous: bool) -> Self {
        Self {
            kind: kind.into(),
            identifier: identifier.into(),
            anonymous,
            options: BTreeMap::new(),
        }
    }

    /// Builder-style option insertion, replacing any previous value.
    ///
    /// # Panics
    ///
    /// Panics if `key` starts with `.`; use [`replace_option`](Self::replace_option)
    /// for keys that are not known to be valid.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        let key = key.into();
        assert!(!is_metadata_key(&key), "option key {key:?} is in the metadata namespace");
        self.options.insert(key, value.into());
        self
    }

    /// Look up an option.
    pub fn option(&self, key: &str) -> Option<&OptionValue> {
        self.options.get(key)
    }

    /// All options in key order.
    pub fn options(&self) -> &BTreeMap<String, OptionValue> {
        &self.options
    }

    /// Set a scalar option.
    ///
    /// Fails with `TypeMismatch` if the key currently holds a list.
    pub fn set_option(&mut self, key: &str, value: impl Into<String>) -> TreeResult<()> {
        check_option_key(key)?;
        if let Some(existing @ OptionValue::List(_)) = self.options.get(key) {
            return Err(TreeError::TypeMismatch {
                key: key.to_string(),
                expected: "scalar",
                found: existing.kind_name(),
            });
        }
        self.options
            .insert(key.to_string(), OptionValue::Scalar(value.into()));
        Ok(())
    }

    /// Replace an option wholesale, whatever its current kind.
    pub fn replace_option(
        &mut self,
        key: impl Into<String>,
        value: OptionValue,
    ) -> TreeResult<Option<OptionValue>> {
        let key = key.into();
        check_option_key(&key)?;
        Ok(self.options.insert(key, value))
    }

    /// Remove an option. A missing key is a no-op.
    pub fn remove_option(&mut self, key: &str) -> Option<OptionValue> {
        self.options.remove(key)
    }

    /// Append an element to a list option, creating the list if absent.
    pub fn append_list_value(&mut self, key: &str, value: impl Into<String>) -> TreeResult<()> {
        check_option_key(key)?;
        match self.options.get_mut(key) {
            Some(OptionValue::List(items)) => {
                items.push(value.into());
                Ok(())
            }
            Some(other) => Err(mismatch(key, other)),
            None => {
                self.options
                    .insert(key.to_string(), OptionValue::List(vec![value.into()]));
                Ok(())
            }
        }
    }

    /// Remove the list element at `pos`.
    ///
    /// A missing key or an out-of-range position is a no-op.
    pub fn remove_list_value_at(&mut self, key: &str, pos: usize) -> TreeResult<Option<String>> {
        match self.options.get_mut(key) {
            Some(OptionValue::List(items)) if pos < items.len() => Ok(Some(items.remove(pos))),
            Some(OptionValue::List(_)) | None => Ok(None),
            Some(other) => Err(mismatch(key, other)),
        }
    }

    /// Remove the first list element equal to `value`.
    ///
    /// A missing key or value is a no-op. Returns whether an element was removed.
    pub fn remove_list_value(&mut self, key: &str, value: &str) -> TreeResult<bool> {
        match self.options.get_mut(key) {
            Some(OptionValue::List(items)) => match items.iter().position(|v| v == value) {
                Some(pos) => {
                    items.remove(pos);
                    Ok(true)
                }
                None => Ok(false),
            },
            Some(other) => Err(mismatch(key, other)),
            None => Ok(false),
        }
    }

    /// The section as a single key/value map, with the type tag, identifier
    /// and anonymity flag exposed under the reserved keys.
    ///
    /// The anonymity flag is rendered as the scalar `"true"` or `"false"`.
    pub fn flatten(&self) -> BTreeMap<String, OptionValue> {
        let mut flat = self.options.clone();
        flat.insert(TYPE_KEY.to_string(), OptionValue::scalar(&self.kind));
        flat.insert(NAME_KEY.to_string(), OptionValue::scalar(&self.identifier));
        flat.insert(
            ANONYMOUS_KEY.to_string(),
            OptionValue::scalar(if self.anonymous { "true" } else { "false" }),
        );
        flat
    }

    /// Write one entry of a [`flatten`](Self::flatten)ed map back into the section.
    ///
    /// Reserved keys update metadata; any other `.` key is rejected and
    /// everything else replaces the option. The identifier is fixed by the owning package, so `.name` may only be
    /// set to its current value.
    pub fn set_field(&mut self, key: &str, value: OptionValue) -> TreeResult<()> {
        match key {
            TYPE_KEY => {
                self.kind = expect_scalar(key, value)?;
            }
            NAME_KEY => {
                let name = expect_scalar(key, value)?;
                if name != self.identifier {
                    return Err(TreeError::InvalidMetadata {
                        key: key.to_string(),
                        reason: format!(
                            "cannot rename section {} to {name}",
                            self.identifier
                        ),
                    });
                }
            }
            ANONYMOUS_KEY => {
                let flag = expect_scalar(key, value)?;
                self.anonymous = parse_flag(&flag).ok_or_else(|| TreeError::InvalidMetadata {
                    key: key.to_string(),
                    reason: format!("expected \"true\" or \"false\", got {flag:?}"),
                })?;
            }
            _ => {
                self.replace_option(key, value)?;
            }
        }
        Ok(())
    }

    /// Remove one entry of a flattened map from the section.
    ///
    /// Reserved keys cannot be removed; missing options are a no-op.
    pub fn remove_field(&mut self, key: &str) -> TreeResult<Option<OptionValue>> {
        if is_reserved_key(key) {
            return Err(TreeError::InvalidMetadata {
                key: key.to_string(),
                reason: "reserved field cannot be removed".to_string(),
            });
        }
        Ok(self.remove_option(key))
    }
}

/// Parse a UCI boolean flag as exported by `ubus` (`"true"`/`"false"`, `"1"`/`"0"`).
pub(crate) fn parse_flag(flag: &str) -> Option<bool> {
    match flag {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn check_option_key(key: &str) -> TreeResult<()> {
    if is_metadata_key(key) {
        return Err(TreeError::InvalidMetadata {
            key: key.to_string(),
            reason: "option keys cannot start with '.'".to_string(),
        });
    }
    Ok(())
}

fn expect_scalar(key: &str, value: OptionValue) -> TreeResult<String> {
    match value {
        OptionValue::Scalar(s) => Ok(s),
        other => Err(mismatch(key, &other)),
    }
}

fn mismatch(key: &str, found: &OptionValue) -> TreeError {
    let expected = match found {
        OptionValue::Scalar(_) => "list",
        OptionValue::List(_) => "scalar",
    };
    TreeError::TypeMismatch {
        key: key.to_string(),
        expected,
        found: found.kind_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wan() -> Section {
        Section::new("dhcp", "wan", false)
            .with_option("interface", "wan")
            .with_option("ignore", "1")
    }

    #[test]
    fn set_option_overwrites_scalar() {
        let mut s = wan();
        s.set_option("ignore", "0").unwrap();
        assert_eq!(s.option("ignore"), Some(&OptionValue::scalar("0")));
    }

    #[test]
    fn set_option_on_list_is_type_mismatch() {
        let mut s = wan().with_option("dns", OptionValue::list(["1.1.1.1"]));
        let err = s.set_option("dns", "8.8.8.8").unwrap_err();
        assert!(matches!(
            err,
            TreeError::TypeMismatch { expected: "scalar", found: "list", .. }
        ));
    }

    #[test]
    fn append_creates_and_extends_list() {
        let mut s = wan();
        s.append_list_value("dns", "a").unwrap();
        s.append_list_value("dns", "b").unwrap();
        assert_eq!(s.option("dns"), Some(&OptionValue::list(["a", "b"])));
    }

    #[test]
    fn append_to_scalar_is_type_mismatch() {
        let mut s = wan();
        let err = s.append_list_value("ignore", "2").unwrap_err();
        assert!(matches!(
            err,
            TreeError::TypeMismatch { expected: "list", found: "scalar", .. }
        ));
    }

    #[test]
    fn remove_list_value_at_handles_bounds() {
        let mut s = wan().with_option("dns", OptionValue::list(["a", "b", "c"]));
        assert_eq!(s.remove_list_value_at("dns", 1).unwrap(), Some("b".to_string()));
        assert_eq!(s.remove_list_value_at("dns", 9).unwrap(), None);
        assert_eq!(s.remove_list_value_at("missing", 0).unwrap(), None);
        assert_eq!(s.option("dns"), Some(&OptionValue::list(["a", "c"])));
        assert!(s.remove_list_value_at("ignore", 0).is_err());
    }

    #[test]
    fn remove_list_value_removes_first_match() {
        let mut s = wan().with_option("dns", OptionValue::list(["a", "b", "a"]));
        assert!(s.remove_list_value("dns", "a").unwrap());
        assert!(!s.remove_list_value("dns", "zzz").unwrap());
        assert!(!s.remove_list_value("missing", "a").unwrap());
        assert_eq!(s.option("dns"), Some(&OptionValue::list(["b", "a"])));
    }

    #[test]
    fn remove_option_is_noop_when_absent() {
        let mut s = wan();
        assert_eq!(s.remove_option("ignore"), Some(OptionValue::scalar("1")));
        assert_eq!(s.remove_option("ignore"), None);
    }

    #[test]
    fn flatten_exposes_metadata() {
        let flat = Section::new("dhcp", "cfg01", true).flatten();
        assert_eq!(flat[TYPE_KEY], OptionValue::scalar("dhcp"));
        assert_eq!(flat[NAME_KEY], OptionValue::scalar("cfg01"));
        assert_eq!(flat[ANONYMOUS_KEY], OptionValue::scalar("true"));
    }

    #[test]
    fn set_field_updates_metadata() {
        let mut s = wan();
        s.set_field(TYPE_KEY, OptionValue::scalar("host")).unwrap();
        s.set_field(ANONYMOUS_KEY, OptionValue::scalar("true")).unwrap();
        s.set_field(NAME_KEY, OptionValue::scalar("wan")).unwrap();
        assert_eq!(s.kind, "host");
        assert!(s.anonymous);
    }

    #[test]
    fn set_field_rejects_rename_and_bad_flag() {
        let mut s = wan();
        assert!(matches!(
            s.set_field(NAME_KEY, OptionValue::scalar("lan")),
            Err(TreeError::InvalidMetadata { .. })
        ));
        assert!(matches!(
            s.set_field(ANONYMOUS_KEY, OptionValue::scalar("maybe")),
            Err(TreeError::InvalidMetadata { .. })
        ));
        assert!(matches!(
            s.set_field(TYPE_KEY, OptionValue::list(["x"])),
            Err(TreeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn metadata_namespace_is_closed_to_options() {
        let mut s = wan();
        for key in [TYPE_KEY, NAME_KEY, ANONYMOUS_KEY, ".index", "."] {
            assert!(matches!(
                s.set_option(key, "evil"),
                Err(TreeError::InvalidMetadata { .. })
            ));
            assert!(matches!(
                s.append_list_value(key, "evil"),
                Err(TreeError::InvalidMetadata { .. })
            ));
            assert!(matches!(
                s.replace_option(key, OptionValue::scalar("evil")),
                Err(TreeError::InvalidMetadata { .. })
            ));
        }
        assert!(matches!(
            s.set_field(".index", OptionValue::scalar("3")),
            Err(TreeError::InvalidMetadata { .. })
        ));
        assert_eq!(s, wan());
        assert_eq!(s.flatten()[TYPE_KEY], OptionValue::scalar("dhcp"));
    }

    #[test]
    fn dotted_keys_are_fine_after_the_first_char() {
        let mut s = wan();
        s.set_option("option.6", "x").unwrap();
        s.set_option("", "empty").unwrap();
        assert_eq!(s.options().len(), 4);
    }

    #[test]
    #[should_panic(expected = "metadata namespace")]
    fn builder_rejects_metadata_key() {
        let _ = Section::new("dhcp", "wan", false).with_option(TYPE_KEY, "evil");
    }

    #[test]
    fn remove_field_protects_reserved_keys() {
        let mut s = wan();
        assert!(s.remove_field(TYPE_KEY).is_err());
        assert_eq!(s.remove_field("ignore").unwrap(), Some(OptionValue::scalar("1")));
        assert_eq!(s.remove_field("ignore").unwrap(), None);
    }
}
