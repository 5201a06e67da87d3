use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use uci_codec::CodecConfig;

/// Settings read from the `--config` TOML file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Maximum tracing level (`error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: String,
    /// Exchange format settings.
    pub codec: CodecConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".into(),
            codec: CodecConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load from `path`, or use defaults when no file was given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn level(&self) -> anyhow::Result<tracing::Level> {
        self.log_level
            .parse()
            .with_context(|| format!("invalid log_level {:?}", self.log_level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use uci_codec::{CollisionPolicy, KeyScheme};

    #[test]
    fn default_config() {
        let c = CliConfig::load(None).unwrap();
        assert_eq!(c.log_level, "warn");
        assert_eq!(c.level().unwrap(), tracing::Level::WARN);
        assert_eq!(c.codec, CodecConfig::default());
    }

    #[test]
    fn load_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = \"debug\"\n\n[codec]\nkey_scheme = \"bare\"\non_collision = \"reject\"").unwrap();

        let c = CliConfig::load(Some(file.path())).unwrap();
        assert_eq!(c.level().unwrap(), tracing::Level::DEBUG);
        assert_eq!(c.codec.key_scheme, KeyScheme::Bare);
        assert_eq!(c.codec.on_collision, CollisionPolicy::Reject);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CliConfig::load(Some(dir.path().join("absent.toml").as_path())).is_err());
    }

    #[test]
    fn bad_level_is_an_error() {
        let c = CliConfig {
            log_level: "loud".into(),
            ..Default::default()
        };
        assert!(c.level().is_err());
    }
}
