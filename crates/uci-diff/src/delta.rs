//! The seven-bucket structural delta between two trees.

use std::collections::BTreeMap;
use std::fmt;

use uci_types::{OptionValue, Package, Section};

/// Identifies a section within a tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionKey {
    pub package: String,
    pub section: String,
}

impl SectionKey {
    pub fn new(package: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            section: section.into(),
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.package, self.section)
    }
}

/// Identifies an option (or reserved metadata key) within a tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionKey {
    pub package: String,
    pub section: String,
    pub option: String,
}

impl OptionKey {
    pub fn new(
        package: impl Into<String>,
        section: impl Into<String>,
        option: impl Into<String>,
    ) -> Self {
        Self {
            package: package.into(),
            section: section.into(),
            option: option.into(),
        }
    }

    /// The key of the section holding this option.
    pub fn section_key(&self) -> SectionKey {
        SectionKey::new(&self.package, &self.section)
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.package, self.section, self.option)
    }
}

/// An option whose value differs between the two trees.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionChange {
    pub old: OptionValue,
    pub new: OptionValue,
}

impl OptionChange {
    pub fn new(old: OptionValue, new: OptionValue) -> Self {
        Self { old, new }
    }

    /// The same change in the opposite direction.
    pub fn flipped(&self) -> Self {
        Self {
            old: self.new.clone(),
            new: self.old.clone(),
        }
    }
}

/// Structural difference between an old and a new tree.
///
/// Each change is recorded once, at the coarsest granularity: a package or
/// section that exists on only one side appears whole in a package or
/// section bucket and contributes nothing to the option buckets. An option
/// key appears in at most one of `new_options`, `old_options` and
/// `changed_options`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Delta {
    /// Packages present only in the new tree.
    pub new_packages: BTreeMap<String, Package>,
    /// Packages present only in the old tree.
    pub old_packages: BTreeMap<String, Package>,
    /// Sections added to a package present in both trees.
    pub new_sections: BTreeMap<SectionKey, Section>,
    /// Sections removed from a package present in both trees.
    pub old_sections: BTreeMap<SectionKey, Section>,
    /// Options added to a section present in both trees.
    pub new_options: BTreeMap<OptionKey, OptionValue>,
    /// Options removed from a section present in both trees.
    pub old_options: BTreeMap<OptionKey, OptionValue>,
    /// Options whose value changed.
    pub changed_options: BTreeMap<OptionKey, OptionChange>,
}

impl Delta {
    /// Create an empty delta.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if all seven buckets are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of entries across all buckets.
    pub fn len(&self) -> usize {
        self.stats().total()
    }

    /// Per-bucket entry counts.
    pub fn stats(&self) -> DeltaStats {
        DeltaStats {
            new_packages: self.new_packages.len(),
            old_packages: self.old_packages.len(),
            new_sections: self.new_sections.len(),
            old_sections: self.old_sections.len(),
            new_options: self.new_options.len(),
            old_options: self.old_options.len(),
            changed_options: self.changed_options.len(),
        }
    }

    /// The delta that transforms the new tree back into the old one.
    ///
    /// New and old buckets swap and every changed pair is flipped, so
    /// applying the inverse is equivalent to reverting the original.
    pub fn inverse(&self) -> Self {
        Self {
            new_packages: self.old_packages.clone(),
            old_packages: self.new_packages.clone(),
            new_sections: self.old_sections.clone(),
            old_sections: self.new_sections.clone(),
            new_options: self.old_options.clone(),
            old_options: self.new_options.clone(),
            changed_options: self
                .changed_options
                .iter()
                .map(|(key, change)| (key.clone(), change.flipped()))
                .collect(),
        }
    }
}

/// Entry counts of a [`Delta`], one field per bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeltaStats {
    pub new_packages: usize,
    pub old_packages: usize,
    pub new_sections: usize,
    pub old_sections: usize,
    pub new_options: usize,
    pub old_options: usize,
    pub changed_options: usize,
}

impl DeltaStats {
    pub fn total(&self) -> usize {
        self.new_packages
            + self.old_packages
            + self.new_sections
            + self.old_sections
            + self.new_options
            + self.old_options
            + self.changed_options
    }
}

impl fmt::Display for DeltaStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "packages +{} -{}, sections +{} -{}, options +{} -{} ~{}",
            self.new_packages,
            self.old_packages,
            self.new_sections,
            self.old_sections,
            self.new_options,
            self.old_options,
            self.changed_options,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Delta {
        let mut delta = Delta::new();
        delta
            .new_packages
            .insert("firewall".into(), Package::new("firewall"));
        delta.old_sections.insert(
            SectionKey::new("dhcp", "lan"),
            Section::new("dhcp", "lan", false),
        );
        delta.new_options.insert(
            OptionKey::new("dhcp", "wan", "leasetime"),
            OptionValue::scalar("12h"),
        );
        delta.changed_options.insert(
            OptionKey::new("dhcp", "wan", "ignore"),
            OptionChange::new(OptionValue::scalar("1"), OptionValue::scalar("0")),
        );
        delta
    }

    #[test]
    fn empty_delta() {
        let delta = Delta::new();
        assert!(delta.is_empty());
        assert_eq!(delta.len(), 0);
        assert_eq!(delta.stats(), DeltaStats::default());
    }

    #[test]
    fn stats_count_each_bucket() {
        let stats = sample().stats();
        assert_eq!(stats.new_packages, 1);
        assert_eq!(stats.old_sections, 1);
        assert_eq!(stats.new_options, 1);
        assert_eq!(stats.changed_options, 1);
        assert_eq!(stats.total(), 4);
        assert_eq!(
            stats.to_string(),
            "packages +1 -0, sections +0 -1, options +1 -0 ~1"
        );
    }

    #[test]
    fn inverse_swaps_buckets_and_flips_changes() {
        let delta = sample();
        let inv = delta.inverse();
        assert_eq!(inv.old_packages, delta.new_packages);
        assert_eq!(inv.new_sections, delta.old_sections);
        assert_eq!(inv.old_options, delta.new_options);
        let change = &inv.changed_options[&OptionKey::new("dhcp", "wan", "ignore")];
        assert_eq!(change.old, OptionValue::scalar("0"));
        assert_eq!(change.new, OptionValue::scalar("1"));
        assert_eq!(inv.inverse(), delta);
    }

    #[test]
    fn keys_display_as_uci_paths() {
        assert_eq!(SectionKey::new("dhcp", "lan").to_string(), "dhcp.lan");
        let key = OptionKey::new("dhcp", "lan", "start");
        assert_eq!(key.to_string(), "dhcp.lan.start");
        assert_eq!(key.section_key(), SectionKey::new("dhcp", "lan"));
    }
}
