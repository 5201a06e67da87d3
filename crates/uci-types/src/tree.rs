use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{TreeError, TreeResult};
use crate::export::{PackageExport, TreeExport};
use crate::package::Package;
use crate::section::Section;

/// Root aggregate: every package of a configuration, keyed by name.
///
/// A `Tree` is a plain value. Equality is deep and structural.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    pub packages: BTreeMap<String, Package>,
}

impl Tree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the package named `name`, creating an empty one if needed.
    pub fn add_package(&mut self, name: &str) -> &mut Package {
        self.packages
            .entry(name.to_string())
            .or_insert_with(|| Package::new(name))
    }

    /// Insert a whole package, replacing any package with the same name.
    pub fn insert_package(&mut self, package: Package) -> Option<Package> {
        self.packages.insert(package.name.clone(), package)
    }

    /// Remove a package. Fails with `NotFound` if it does not exist.
    pub fn remove_package(&mut self, name: &str) -> TreeResult<Package> {
        self.packages
            .remove(name)
            .ok_or_else(|| TreeError::package_not_found(name))
    }

    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    pub fn package_mut(&mut self, name: &str) -> Option<&mut Package> {
        self.packages.get_mut(name)
    }

    /// Insert or overwrite a section in an existing package.
    ///
    /// The package must already exist (see [`add_package`](Self::add_package)).
    pub fn add_section(&mut self, package: &str, section: Section) -> TreeResult<()> {
        let pkg = self
            .packages
            .get_mut(package)
            .ok_or_else(|| TreeError::package_not_found(package))?;
        pkg.insert_section(section);
        Ok(())
    }

    /// Remove a section. Fails with `NotFound` if the package or section is absent.
    pub fn remove_section(&mut self, package: &str, section: &str) -> TreeResult<Section> {
        self.packages
            .get_mut(package)
            .ok_or_else(|| TreeError::package_not_found(package))?
            .remove_section(section)
    }

    pub fn section(&self, package: &str, section: &str) -> Option<&Section> {
        self.packages.get(package)?.section(section)
    }

    pub fn section_mut(&mut self, package: &str, section: &str) -> Option<&mut Section> {
        self.packages.get_mut(package)?.section_mut(section)
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    // -----------------------------------------------------------------------
    // JSON bootstrap / export
    // -----------------------------------------------------------------------

    /// Build a tree from its JSON export.
    pub fn from_json(json: &str) -> TreeResult<Self> {
        let export: TreeExport =
            serde_json::from_str(json).map_err(|e| TreeError::Parse(e.to_string()))?;
        Self::from_export(export)
    }

    /// Build a tree from an already-parsed JSON value.
    pub fn from_json_value(value: serde_json::Value) -> TreeResult<Self> {
        let export: TreeExport =
            serde_json::from_value(value).map_err(|e| TreeError::Parse(e.to_string()))?;
        Self::from_export(export)
    }

    fn from_export(export: TreeExport) -> TreeResult<Self> {
        let mut tree = Self::new();
        for (name, package) in export {
            tree.insert_package(package.into_package(&name)?);
        }
        Ok(tree)
    }

    /// Merge a JSON export into this tree.
    ///
    /// Packages are added if missing and sections overwrite by identifier.
    /// The input is fully parsed before anything is merged, so a parse error
    /// leaves the tree untouched.
    pub fn load_json(&mut self, json: &str) -> TreeResult<()> {
        let loaded = Self::from_json(json)?;
        let mut sections = 0usize;
        for (name, package) in loaded.packages {
            let target = self.add_package(&name);
            for section in package.sections.into_values() {
                target.insert_section(section);
                sections += 1;
            }
        }
        debug!(sections, packages = self.packages.len(), "loaded tree export");
        Ok(())
    }

    pub fn to_export(&self) -> TreeExport {
        self.packages
            .iter()
            .map(|(name, package)| (name.clone(), PackageExport::from_package(package)))
            .collect()
    }

    pub fn to_json_value(&self) -> TreeResult<serde_json::Value> {
        serde_json::to_value(self.to_export())
            .map_err(|e| TreeError::Serialization(e.to_string()))
    }

    pub fn to_json_string(&self) -> TreeResult<String> {
        serde_json::to_string(&self.to_export())
            .map_err(|e| TreeError::Serialization(e.to_string()))
    }
}
