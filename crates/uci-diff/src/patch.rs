//! Apply and revert a [`Delta`] against a tree.
//!
//! For trees `a` and `b` with `d = diff(a, b)`:
//!
//! - `apply(&d, a)` leaves `a == b`
//! - `revert(&d, b)` leaves `b == a`
//!
//! Each entry is idempotent: inserting something already present overwrites
//! it, removing something already absent does nothing. Both operations work
//! on a copy of the target and swap it in only after every entry succeeded,
//! so an error leaves the target untouched.

use tracing::{debug, trace};
use uci_types::{OptionValue, Package, Section, Tree};

use crate::delta::{Delta, OptionKey, SectionKey};
use crate::error::{PatchError, PatchResult};

/// Transform the old tree of `delta` into its new tree.
pub fn apply(delta: &Delta, tree: &mut Tree) -> PatchResult<()> {
    debug!(stats = %delta.stats(), "applying delta");
    let mut work = tree.clone();

    for package in delta.new_packages.values() {
        insert_package(&mut work, package);
    }
    for (key, section) in &delta.new_sections {
        insert_section(&mut work, key, section);
    }
    for name in delta.old_packages.keys() {
        remove_package(&mut work, name);
    }
    for key in delta.old_sections.keys() {
        remove_section(&mut work, key);
    }
    for (key, value) in &delta.new_options {
        set_option(&mut work, key, value)?;
    }
    for key in delta.old_options.keys() {
        remove_option(&mut work, key)?;
    }
    for (key, change) in &delta.changed_options {
        set_option(&mut work, key, &change.new)?;
    }

    *tree = work;
    Ok(())
}

/// Transform the new tree of `delta` back into its old tree.
pub fn revert(delta: &Delta, tree: &mut Tree) -> PatchResult<()> {
    debug!(stats = %delta.stats(), "reverting delta");
    let mut work = tree.clone();

    for name in delta.new_packages.keys() {
        remove_package(&mut work, name);
    }
    for key in delta.new_sections.keys() {
        remove_section(&mut work, key);
    }
    for package in delta.old_packages.values() {
        insert_package(&mut work, package);
    }
    for (key, section) in &delta.old_sections {
        insert_section(&mut work, key, section);
    }
    for key in delta.new_options.keys() {
        remove_option(&mut work, key)?;
    }
    for (key, value) in &delta.old_options {
        set_option(&mut work, key, value)?;
    }
    for (key, change) in &delta.changed_options {
        set_option(&mut work, key, &change.old)?;
    }

    *tree = work;
    Ok(())
}

fn insert_package(tree: &mut Tree, package: &Package) {
    trace!(package = %package.name, "insert package");
    tree.insert_package(package.clone());
}

fn remove_package(tree: &mut Tree, name: &str) {
    trace!(package = %name, "remove package");
    tree.packages.remove(name);
}

fn insert_section(tree: &mut Tree, key: &SectionKey, section: &Section) {
    trace!(section = %key, "insert section");
    let mut section = section.clone();
    section.identifier = key.section.clone();
    tree.add_package(&key.package).insert_section(section);
}

fn remove_section(tree: &mut Tree, key: &SectionKey) {
    trace!(section = %key, "remove section");
    if let Some(package) = tree.package_mut(&key.package) {
        package.sections.remove(&key.section);
    }
}

fn set_option(tree: &mut Tree, key: &OptionKey, value: &OptionValue) -> PatchResult<()> {
    trace!(option = %key, value = %value, "set option");
    let section = tree
        .section_mut(&key.package, &key.section)
        .ok_or_else(|| PatchError::MissingSection {
            package: key.package.clone(),
            section: key.section.clone(),
        })?;
    section.set_field(&key.option, value.clone())?;
    Ok(())
}

fn remove_option(tree: &mut Tree, key: &OptionKey) -> PatchResult<()> {
    trace!(option = %key, "remove option");
    if let Some(section) = tree.section_mut(&key.package, &key.section) {
        section.remove_field(&key.option)?;
    }
    Ok(())
}
