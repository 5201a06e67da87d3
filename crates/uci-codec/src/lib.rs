//! Exchange format for UCI tree deltas.
//!
//! A [`Delta`](uci_diff::Delta) travels as a JSON object with exactly seven
//! buckets: `newpackages`, `oldpackages`, `newconfigs`, `oldconfigs`,
//! `newOptions`, `oldOptions` and `chaOptions`. Package and section entries
//! embed the tree export shape; option entries carry their value (an
//! `[old, new]` pair in `chaOptions`) with the owning `package` and `config`.
//!
//! # Key Schemes
//!
//! - [`KeyScheme::Composite`] (default) keys entries by `package/section` or
//!   `package/section/option` and round-trips every delta. Each part is
//!   percent-encoded (`/` as `%2F`, `%` as `%25`), so a part may be empty or
//!   contain the separator.
//! - [`KeyScheme::Bare`] keys entries by section identifier or option name,
//!   as older consumers expect. Entries sharing a name in one bucket collide;
//!   [`CollisionPolicy`] decides whether the later entry wins or encoding fails.
//!
//! Decoding is all-or-nothing: a delta is returned only when the whole
//! document parsed and validated.

pub mod codec;
pub mod config;
pub mod error;
pub mod message;

pub use codec::DeltaCodec;
pub use config::{CodecConfig, CollisionPolicy, KeyScheme};
pub use error::{CodecError, CodecResult};
pub use message::{OptionEntry, SectionEntry, WireDelta};
