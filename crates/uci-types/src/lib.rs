//! Value model for UCI configuration trees.
//!
//! A [`Tree`] holds named [`Package`]s; a package holds [`Section`]s keyed by
//! identifier; a section holds options whose values are an [`OptionValue`]
//! (a scalar string or an ordered list of strings). Every type is a plain
//! in-memory value with deep structural equality.
//!
//! # Key Types
//!
//! - [`Tree`] -- root aggregate, JSON bootstrap/export and native rendering
//! - [`Package`] -- sections of one config file
//! - [`Section`] -- a typed, possibly anonymous `config` block
//! - [`OptionValue`] -- `Scalar` | `List`
//! - [`PackageExport`] / [`SectionExport`] -- JSON export shapes
//!
//! # Error Contracts
//!
//! Removing a package or section that does not exist fails with
//! [`TreeError::NotFound`]. Removing an option, or a list element, that does
//! not exist is a no-op. Option keys starting with `.` belong to section
//! metadata; every option mutator rejects them with
//! [`TreeError::InvalidMetadata`].

pub mod error;
pub mod export;
pub mod package;
pub mod render;
pub mod section;
pub mod tree;
pub mod value;

pub use error::{TreeError, TreeResult};
pub use export::{PackageExport, SectionExport, TreeExport};
pub use package::Package;
pub use section::{is_metadata_key, is_reserved_key, Section, ANONYMOUS_KEY, NAME_KEY, TYPE_KEY};
pub use tree::Tree;
pub use value::OptionValue;
