//! JSON bootstrap/export shape of a tree.
//!
//! ```json
//! { "<package>": { "values": { "<section>": {
//!     ".type": "interface", ".name": "<section>", ".anonymous": false,
//!     "<option>": "value", "<list>": ["a", "b"] } } } }
//! ```
//!
//! The same shape is produced by `ubus call uci get` and is reused by the
//! delta exchange format for whole-package and whole-section snapshots.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{TreeError, TreeResult};
use crate::package::Package;
use crate::section::{is_metadata_key, parse_flag, Section};
use crate::value::OptionValue;

/// Exported form of a whole tree: package name to package export.
pub type TreeExport = BTreeMap<String, PackageExport>;

/// Exported form of a package.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageExport {
    pub values: BTreeMap<String, SectionExport>,
}

/// Exported form of a section: metadata under reserved keys, options inline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionExport {
    #[serde(rename = ".type")]
    pub kind: String,
    #[serde(rename = ".name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = ".anonymous", default, deserialize_with = "deserialize_flag")]
    pub anonymous: bool,
    /// Position hint emitted by `ubus`; not part of the model.
    #[serde(rename = ".index", default, skip_serializing)]
    pub index: Option<u64>,
    #[serde(flatten)]
    pub options: BTreeMap<String, OptionValue>,
}

impl SectionExport {
    pub fn from_section(section: &Section) -> Self {
        Self {
            kind: section.kind.clone(),
            name: Some(section.identifier.clone()),
            anonymous: section.anonymous,
            index: None,
            options: section.options.clone(),
        }
    }

    /// Build the section stored under `identifier`.
    ///
    /// A `.name` field, when present, must agree with the identifier.
    pub fn into_section(self, identifier: &str) -> TreeResult<Section> {
        if let Some(name) = &self.name {
            if name != identifier {
                return Err(TreeError::Parse(format!(
                    "section {identifier:?} carries mismatched .name {name:?}"
                )));
            }
        }
        if let Some(key) = self.options.keys().find(|k| is_metadata_key(k)) {
            return Err(TreeError::Parse(format!(
                "unknown reserved key {key:?} in section {identifier:?}"
            )));
        }
        Ok(Section {
            kind: self.kind,
            identifier: identifier.to_string(),
            anonymous: self.anonymous,
            options: self.options,
        })
    }
}

impl PackageExport {
    pub fn from_package(package: &Package) -> Self {
        Self {
            values: package
                .sections
                .iter()
                .map(|(id, section)| (id.clone(), SectionExport::from_section(section)))
                .collect(),
        }
    }

    pub fn into_package(self, name: &str) -> TreeResult<Package> {
        let mut package = Package::new(name);
        for (id, export) in self.values {
            package.insert_section(export.into_section(&id)?);
        }
        Ok(package)
    }
}

/// Accepts a JSON bool or the strings emitted by `ubus` (`"true"`, `"1"`, ...).
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Text(s) => parse_flag(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid .anonymous flag {s:?}"))),
    }
}
