use std::borrow::Cow;
use std::collections::BTreeMap;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Deserialize;
use tracing::{debug, warn};
use uci_diff::{Delta, OptionChange, OptionKey, SectionKey};
use uci_types::{PackageExport, SectionExport};

use crate::config::{CodecConfig, CollisionPolicy, KeyScheme};
use crate::error::{CodecError, CodecResult};
use crate::message::*;

/// Bytes escaped inside one part of a composite key.
const KEY_PART: &AsciiSet = &CONTROLS.add(b'%').add(KEY_SEPARATOR as u8);

/// Converts a [`Delta`] to and from the JSON exchange document.
#[derive(Clone, Debug, Default)]
pub struct DeltaCodec {
    config: CodecConfig,
}

impl DeltaCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode into a JSON value.
    pub fn encode(&self, delta: &Delta) -> CodecResult<serde_json::Value> {
        let wire = self.to_wire(delta)?;
        serde_json::to_value(&wire).map_err(|e| CodecError::Serialization(e.to_string()))
    }

    /// Encode into a JSON string, pretty-printed if configured.
    pub fn encode_to_string(&self, delta: &Delta) -> CodecResult<String> {
        let wire = self.to_wire(delta)?;
        let out = if self.config.pretty {
            serde_json::to_string_pretty(&wire)
        } else {
            serde_json::to_string(&wire)
        };
        out.map_err(|e| CodecError::Serialization(e.to_string()))
    }

    /// Decode from a JSON value. Nothing is returned unless the whole
    /// document is valid.
    pub fn decode(&self, value: &serde_json::Value) -> CodecResult<Delta> {
        let wire = WireDelta::deserialize(value).map_err(|e| CodecError::Parse(e.to_string()))?;
        self.from_wire(wire)
    }

    /// Decode from a JSON string.
    pub fn decode_str(&self, json: &str) -> CodecResult<Delta> {
        let wire: WireDelta =
            serde_json::from_str(json).map_err(|e| CodecError::Parse(e.to_string()))?;
        self.from_wire(wire)
    }

    /// Build the exchange document for `delta`.
    pub fn to_wire(&self, delta: &Delta) -> CodecResult<WireDelta> {
        let mut wire = WireDelta {
            new_packages: export_packages(&delta.new_packages),
            old_packages: export_packages(&delta.old_packages),
            ..Default::default()
        };

        self.encode_sections(NEW_SECTIONS, &delta.new_sections, &mut wire.new_sections)?;
        self.encode_sections(OLD_SECTIONS, &delta.old_sections, &mut wire.old_sections)?;
        self.encode_options(NEW_OPTIONS, &delta.new_options, &mut wire.new_options)?;
        self.encode_options(OLD_OPTIONS, &delta.old_options, &mut wire.old_options)?;

        let changed: BTreeMap<_, _> = delta
            .changed_options
            .iter()
            .map(|(key, change)| (key.clone(), (change.old.clone(), change.new.clone())))
            .collect();
        self.encode_options(CHANGED_OPTIONS, &changed, &mut wire.changed_options)?;

        debug!(stats = %delta.stats(), scheme = ?self.config.key_scheme, "encoded delta");
        Ok(wire)
    }

    /// Rebuild a delta from its exchange document.
    pub fn from_wire(&self, wire: WireDelta) -> CodecResult<Delta> {
        let mut delta = Delta::new();

        for (name, export) in wire.new_packages {
            let package = export.into_package(&name)?;
            delta.new_packages.insert(name, package);
        }
        for (name, export) in wire.old_packages {
            let package = export.into_package(&name)?;
            delta.old_packages.insert(name, package);
        }
        for (wire_key, entry) in wire.new_sections {
            let (key, section) = self.decode_section(NEW_SECTIONS, &wire_key, entry)?;
            delta.new_sections.insert(key, section);
        }
        for (wire_key, entry) in wire.old_sections {
            let (key, section) = self.decode_section(OLD_SECTIONS, &wire_key, entry)?;
            delta.old_sections.insert(key, section);
        }
        for (wire_key, entry) in wire.new_options {
            let key = self.decode_option_key(NEW_OPTIONS, &wire_key, &entry.package, &entry.config)?;
            delta.new_options.insert(key, entry.value);
        }
        for (wire_key, entry) in wire.old_options {
            let key = self.decode_option_key(OLD_OPTIONS, &wire_key, &entry.package, &entry.config)?;
            delta.old_options.insert(key, entry.value);
        }
        for (wire_key, entry) in wire.changed_options {
            let key =
                self.decode_option_key(CHANGED_OPTIONS, &wire_key, &entry.package, &entry.config)?;
            let (old, new) = entry.value;
            delta.changed_options.insert(key, OptionChange::new(old, new));
        }

        check_disjoint(&delta)?;
        debug!(stats = %delta.stats(), scheme = ?self.config.key_scheme, "decoded delta");
        Ok(delta)
    }

    // -----------------------------------------------------------------------
    // Keys
    // -----------------------------------------------------------------------

    /// Exchange key of a section entry under the configured scheme.
    ///
    /// Composite parts are percent-encoded, so names containing `/` or `%`
    /// cannot run into each other.
    pub fn section_key(&self, key: &SectionKey) -> String {
        match self.config.key_scheme {
            KeyScheme::Bare => key.section.clone(),
            KeyScheme::Composite => composite_key(&[key.package.as_str(), key.section.as_str()]),
        }
    }

    /// Exchange key of an option entry under the configured scheme.
    pub fn option_key(&self, key: &OptionKey) -> String {
        match self.config.key_scheme {
            KeyScheme::Bare => key.option.clone(),
            KeyScheme::Composite => composite_key(&[
                key.package.as_str(),
                key.section.as_str(),
                key.option.as_str(),
            ]),
        }
    }

    fn decode_section(
        &self,
        bucket: &'static str,
        wire_key: &str,
        entry: SectionEntry,
    ) -> CodecResult<(SectionKey, uci_types::Section)> {
        let identifier = match self.config.key_scheme {
            KeyScheme::Bare => wire_key.to_string(),
            KeyScheme::Composite => split_composite(wire_key, &[entry.package.as_str()])
                .ok_or_else(|| mismatch(bucket, wire_key))?,
        };
        let section = entry.value.into_section(&identifier)?;
        Ok((SectionKey::new(entry.package, identifier), section))
    }

    fn decode_option_key(
        &self,
        bucket: &'static str,
        wire_key: &str,
        package: &str,
        config: &str,
    ) -> CodecResult<OptionKey> {
        let option = match self.config.key_scheme {
            KeyScheme::Bare => wire_key.to_string(),
            KeyScheme::Composite => split_composite(wire_key, &[package, config])
                .ok_or_else(|| mismatch(bucket, wire_key))?,
        };
        Ok(OptionKey::new(package, config, option))
    }

    // -----------------------------------------------------------------------
    // Buckets
    // -----------------------------------------------------------------------

    fn encode_sections(
        &self,
        bucket: &'static str,
        sections: &BTreeMap<SectionKey, uci_types::Section>,
        out: &mut BTreeMap<String, SectionEntry>,
    ) -> CodecResult<()> {
        for (key, section) in sections {
            let entry = SectionEntry {
                value: SectionExport::from_section(section),
                package: key.package.clone(),
            };
            self.insert(bucket, out, self.section_key(key), entry)?;
        }
        Ok(())
    }

    fn encode_options<V: Clone>(
        &self,
        bucket: &'static str,
        options: &BTreeMap<OptionKey, V>,
        out: &mut BTreeMap<String, OptionEntry<V>>,
    ) -> CodecResult<()> {
        for (key, value) in options {
            let entry = OptionEntry {
                value: value.clone(),
                package: key.package.clone(),
                config: key.section.clone(),
            };
            self.insert(bucket, out, self.option_key(key), entry)?;
        }
        Ok(())
    }

    fn insert<V>(
        &self,
        bucket: &'static str,
        out: &mut BTreeMap<String, V>,
        key: String,
        entry: V,
    ) -> CodecResult<()> {
        if out.contains_key(&key) {
            match self.config.on_collision {
                CollisionPolicy::Reject => {
                    return Err(CodecError::KeyCollision { bucket, key });
                }
                CollisionPolicy::Overwrite => {
                    warn!(bucket, key = %key, "exchange key collision, earlier entry dropped");
                }
            }
        }
        out.insert(key, entry);
        Ok(())
    }
}

fn export_packages(
    packages: &BTreeMap<String, uci_types::Package>,
) -> BTreeMap<String, PackageExport> {
    packages
        .iter()
        .map(|(name, package)| (name.clone(), PackageExport::from_package(package)))
        .collect()
}

fn composite_key(parts: &[&str]) -> String {
    let mut key = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            key.push(KEY_SEPARATOR);
        }
        key.extend(utf8_percent_encode(part, KEY_PART));
    }
    key
}

/// Split a composite key whose leading parts must decode to `expected`,
/// returning the decoded last part. Parts may be empty.
fn split_composite(key: &str, expected: &[&str]) -> Option<String> {
    let mut parts = key.split(KEY_SEPARATOR);
    for want in expected {
        if decode_part(parts.next()?)? != *want {
            return None;
        }
    }
    let last = decode_part(parts.next()?)?;
    parts.next().is_none().then_some(last)
}

fn decode_part(part: &str) -> Option<String> {
    percent_decode_str(part)
        .decode_utf8()
        .ok()
        .map(Cow::into_owned)
}

fn mismatch(bucket: &'static str, key: &str) -> CodecError {
    CodecError::KeyMismatch {
        bucket,
        key: key.to_string(),
    }
}

/// A key may appear in only one bucket of each level.
fn check_disjoint(delta: &Delta) -> CodecResult<()> {
    if let Some(name) = delta
        .new_packages
        .keys()
        .find(|name| delta.old_packages.contains_key(*name))
    {
        return Err(CodecError::Parse(format!(
            "package {name} is both new and old"
        )));
    }
    if let Some(key) = delta
        .new_sections
        .keys()
        .find(|key| delta.old_sections.contains_key(*key))
    {
        return Err(CodecError::Parse(format!(
            "section {key} is both new and old"
        )));
    }
    let option_buckets = [
        (NEW_OPTIONS, delta.new_options.keys().collect::<Vec<_>>()),
        (OLD_OPTIONS, delta.old_options.keys().collect()),
        (CHANGED_OPTIONS, delta.changed_options.keys().collect()),
    ];
    let mut seen: BTreeMap<&OptionKey, &'static str> = BTreeMap::new();
    for (bucket, keys) in &option_buckets {
        for key in keys {
            if let Some(first) = seen.insert(*key, *bucket) {
                return Err(CodecError::Parse(format!(
                    "option {key} appears in both {first} and {bucket}"
                )));
            }
        }
    }
    Ok(())
}
