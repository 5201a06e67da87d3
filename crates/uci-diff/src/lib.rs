//! Structural diff engine for UCI configuration trees.
//!
//! Computes the minimal seven-bucket [`Delta`] between two trees and applies
//! or reverts it, guaranteeing that `apply(diff(a, b), a) == b` and that
//! `revert` undoes `apply`.
//!
//! # Key Types
//!
//! - [`Delta`] -- whole packages, whole sections, and option-level changes
//! - [`SectionKey`] / [`OptionKey`] -- composite bucket keys
//! - [`OptionChange`] -- `(old, new)` pair of a changed option
//! - [`diff`] / [`apply`] / [`revert`] -- the three operators

pub mod delta;
pub mod engine;
pub mod error;
pub mod patch;

pub use delta::{Delta, DeltaStats, OptionChange, OptionKey, SectionKey};
pub use engine::{diff, diff_section, DiffExt};
pub use error::{PatchError, PatchResult};
pub use patch::{apply, revert};
