use std::collections::BTreeMap;

use crate::error::{TreeError, TreeResult};
use crate::section::Section;

/// A named collection of sections, keyed by section identifier.
///
/// Corresponds to one file under `/etc/config/`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Package {
    /// Unique name within the tree.
    pub name: String,
    /// Section identifier to section.
    pub sections: BTreeMap<String, Section>,
}

impl Package {
    /// Create an empty package.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sections: BTreeMap::new(),
        }
    }

    /// Insert a section, replacing any section with the same identifier.
    pub fn insert_section(&mut self, section: Section) -> Option<Section> {
        self.sections.insert(section.identifier.clone(), section)
    }

    /// Builder-style [`insert_section`](Self::insert_section).
    pub fn with_section(mut self, section: Section) -> Self {
        self.insert_section(section);
        self
    }

    pub fn section(&self, identifier: &str) -> Option<&Section> {
        self.sections.get(identifier)
    }

    pub fn section_mut(&mut self, identifier: &str) -> Option<&mut Section> {
        self.sections.get_mut(identifier)
    }

    /// Remove a section. Fails with `NotFound` if it does not exist.
    pub fn remove_section(&mut self, identifier: &str) -> TreeResult<Section> {
        self.sections
            .remove(identifier)
            .ok_or_else(|| TreeError::section_not_found(&self.name, identifier))
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
