use serde::{Deserialize, Serialize};

/// How bucket entries are keyed in the exchange document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyScheme {
    /// Sections keyed by identifier and options by name alone.
    ///
    /// Matches existing consumers, but two entries sharing a name in one
    /// bucket collide and only one survives encoding.
    Bare,
    /// Sections keyed `package/section`, options `package/section/option`,
    /// each part percent-encoded.
    #[default]
    Composite,
}

/// What to do when two entries of one bucket share an exchange key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Keep the later entry and log a warning.
    #[default]
    Overwrite,
    /// Fail the encoding.
    Reject,
}

/// Configuration for [`DeltaCodec`](crate::DeltaCodec).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub key_scheme: KeyScheme,
    pub on_collision: CollisionPolicy,
    /// Pretty-print when encoding to a string.
    pub pretty: bool,
}

impl CodecConfig {
    /// Bare keys with silent overwrites, as produced by older tooling.
    pub fn legacy() -> Self {
        Self {
            key_scheme: KeyScheme::Bare,
            ..Default::default()
        }
    }
}
