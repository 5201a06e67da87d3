//! Serde shapes of the delta exchange document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uci_types::{OptionValue, PackageExport, SectionExport};

pub const NEW_PACKAGES: &str = "newpackages";
pub const OLD_PACKAGES: &str = "oldpackages";
pub const NEW_SECTIONS: &str = "newconfigs";
pub const OLD_SECTIONS: &str = "oldconfigs";
pub const NEW_OPTIONS: &str = "newOptions";
pub const OLD_OPTIONS: &str = "oldOptions";
pub const CHANGED_OPTIONS: &str = "chaOptions";

/// Separator between the parts of a composite key.
pub const KEY_SEPARATOR: char = '/';

/// The whole exchange document. All seven buckets are required.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WireDelta {
    #[serde(rename = "newpackages")]
    pub new_packages: BTreeMap<String, PackageExport>,
    #[serde(rename = "oldpackages")]
    pub old_packages: BTreeMap<String, PackageExport>,
    #[serde(rename = "newconfigs")]
    pub new_sections: BTreeMap<String, SectionEntry>,
    #[serde(rename = "oldconfigs")]
    pub old_sections: BTreeMap<String, SectionEntry>,
    #[serde(rename = "newOptions")]
    pub new_options: BTreeMap<String, OptionEntry<OptionValue>>,
    #[serde(rename = "oldOptions")]
    pub old_options: BTreeMap<String, OptionEntry<OptionValue>>,
    #[serde(rename = "chaOptions")]
    pub changed_options: BTreeMap<String, OptionEntry<(OptionValue, OptionValue)>>,
}

/// A whole section and the package holding it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionEntry {
    pub value: SectionExport,
    pub package: String,
}

/// An option-level entry. `value` is an option value, or an `[old, new]`
/// pair in `chaOptions`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionEntry<V> {
    pub value: V,
    pub package: String,
    pub config: String,
}
