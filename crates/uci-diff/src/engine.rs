//! Two-pass structural diff between trees.
//!
//! Pass 1 walks the new tree: packages missing from the old tree are taken
//! whole, sections missing from a shared package are taken whole, and shared
//! sections are diffed option by option. Pass 2 walks the old tree and picks
//! up whole packages and sections that no longer exist.

use tracing::debug;
use uci_types::{Package, Section, Tree};

use crate::delta::{Delta, OptionChange, OptionKey, SectionKey};

/// Compute the delta that turns `old` into `new`.
///
/// Neither tree is modified. Bucket membership does not depend on map
/// iteration order.
pub fn diff(old: &Tree, new: &Tree) -> Delta {
    let mut delta = Delta::new();

    for (name, new_package) in &new.packages {
        match old.packages.get(name) {
            None => {
                delta.new_packages.insert(name.clone(), new_package.clone());
            }
            Some(old_package) => diff_package(&mut delta, old_package, new_package),
        }
    }

    for (name, old_package) in &old.packages {
        match new.packages.get(name) {
            None => {
                delta.old_packages.insert(name.clone(), old_package.clone());
            }
            Some(new_package) => {
                for (id, section) in &old_package.sections {
                    if !new_package.sections.contains_key(id) {
                        delta
                            .old_sections
                            .insert(SectionKey::new(name, id), section.clone());
                    }
                }
            }
        }
    }

    debug!(stats = %delta.stats(), "computed tree diff");
    delta
}

/// Record sections added to `new` and option changes of shared sections.
fn diff_package(delta: &mut Delta, old: &Package, new: &Package) {
    for (id, new_section) in &new.sections {
        match old.sections.get(id) {
            None => {
                delta
                    .new_sections
                    .insert(SectionKey::new(&new.name, id), new_section.clone());
            }
            Some(old_section) => diff_section(delta, &new.name, old_section, new_section),
        }
    }
}

/// Diff two versions of one section into the option buckets of `delta`.
///
/// Both sides are [flattened](Section::flatten) first, so changes to the
/// type tag or anonymity flag show up as ordinary option changes under the
/// reserved keys.
pub fn diff_section(delta: &mut Delta, package: &str, old: &Section, new: &Section) {
    let old_flat = old.flatten();
    let new_flat = new.flatten();

    for (key, new_value) in &new_flat {
        let option_key = OptionKey::new(package, &new.identifier, key);
        match old_flat.get(key) {
            None => {
                delta.new_options.insert(option_key, new_value.clone());
            }
            Some(old_value) if old_value != new_value => {
                delta.changed_options.insert(
                    option_key,
                    OptionChange::new(old_value.clone(), new_value.clone()),
                );
            }
            Some(_) => {}
        }
    }

    for (key, old_value) in &old_flat {
        if !new_flat.contains_key(key) {
            delta.old_options.insert(
                OptionKey::new(package, &new.identifier, key),
                old_value.clone(),
            );
        }
    }
}

/// Method-style diffing on [`Tree`].
pub trait DiffExt {
    /// Compute the delta that turns `self` into `new`.
    fn diff(&self, new: &Tree) -> Delta;
}

impl DiffExt for Tree {
    fn diff(&self, new: &Tree) -> Delta {
        diff(self, new)
    }
}
