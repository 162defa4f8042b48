//! asbridge Configuration
//!
//! Loads the bridge settings from a plain `key = value` text file
//! (default `config/bridge.txt`). Lines starting with `#` are comments,
//! missing keys keep their defaults and unknown keys are skipped with a
//! warning.

use asbridge_core::BridgeError;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/bridge.txt";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid value for {key} on line {line}: {value}")]
    InvalidValue {
        key: String,
        value: String,
        line: usize,
    },

    #[error("Line {0} is not a key = value pair")]
    Malformed(usize),
}

impl From<ConfigError> for BridgeError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(err) => BridgeError::Io(err),
            other => BridgeError::Config(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Settings of one bridge process
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// Resource the script runtime runs as (from "resource")
    pub resource_name: String,
    /// Write declaration files after module load (from "generatedocs")
    pub generate_docs: bool,
    /// Directory for declaration files (from "docsdir")
    pub docs_dir: PathBuf,
    /// Milliseconds between runtime ticks (from "tickinterval")
    pub tick_interval_ms: u64,
    /// Ticks to run before exiting, 0 runs until interrupted (from "ticks")
    pub ticks: u64,
    /// Default tracing filter, overridden by `RUST_LOG` (from "loglevel")
    pub log_level: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            resource_name: "main".into(),
            generate_docs: true,
            docs_dir: PathBuf::from("docs"),
            tick_interval_ms: 50,
            ticks: 0,
            log_level: "info".into(),
        }
    }
}

impl BridgeConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load from [`DEFAULT_CONFIG_PATH`], falling back to the defaults when
    /// the file does not exist
    pub fn load_default() -> Result<Self> {
        match Self::load_from_file(DEFAULT_CONFIG_PATH) {
            Err(ConfigError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_PATH);
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config = Self::default();

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = line.split_once('=').ok_or(ConfigError::Malformed(index + 1))?;
            config.parse_option(key.trim(), value.trim(), index + 1)?;
        }

        Ok(config)
    }

    fn parse_option(&mut self, key: &str, value: &str, line: usize) -> Result<()> {
        let invalid = || ConfigError::InvalidValue {
            key: key.into(),
            value: value.into(),
            line,
        };

        match key.to_ascii_lowercase().as_str() {
            "resource" => self.resource_name = value.into(),
            "generatedocs" => self.generate_docs = parse_bool(value).ok_or_else(invalid)?,
            "docsdir" => self.docs_dir = PathBuf::from(value),
            "tickinterval" => {
                self.tick_interval_ms = value
                    .parse()
                    .ok()
                    .filter(|ms| *ms > 0)
                    .ok_or_else(invalid)?;
            }
            "ticks" => self.ticks = value.parse().map_err(|_| invalid())?,
            "loglevel" => self.log_level = value.into(),
            _ => tracing::warn!("Unknown config option on line {}: {}", line, key),
        }
        Ok(())
    }

    /// Log a summary of the active settings
    pub fn display(&self) {
        tracing::info!("Resource: {}", self.resource_name);
        if self.generate_docs {
            tracing::info!("Docs: {}", self.docs_dir.display());
        } else {
            tracing::info!("Docs: disabled");
        }
        tracing::info!("Tick interval: {}ms", self.tick_interval_ms);
        match self.ticks {
            0 => tracing::info!("Ticks: unlimited"),
            n => tracing::info!("Ticks: {}", n),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.resource_name, "main");
        assert!(config.generate_docs);
        assert_eq!(config.tick_interval_ms, 50);
        assert_eq!(config.ticks, 0);
    }

    #[test]
    fn test_parse_simple_config() {
        let config_text = r#"
# bridge settings
resource = race
generatedocs = false
docsdir = out/docs
tickinterval = 20
ticks = 100
loglevel = debug
"#;
        let config = BridgeConfig::parse(config_text).unwrap();
        assert_eq!(config.resource_name, "race");
        assert!(!config.generate_docs);
        assert_eq!(config.docs_dir, PathBuf::from("out/docs"));
        assert_eq!(config.tick_interval_ms, 20);
        assert_eq!(config.ticks, 100);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config = BridgeConfig::parse("maxplayers = 50\nresource = race").unwrap();
        assert_eq!(config.resource_name, "race");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            BridgeConfig::parse("ticks = many"),
            Err(ConfigError::InvalidValue { line: 1, .. })
        ));
        assert!(matches!(
            BridgeConfig::parse("\ntickinterval = 0"),
            Err(ConfigError::InvalidValue { line: 2, .. })
        ));
        assert!(matches!(
            BridgeConfig::parse("generatedocs = maybe"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            BridgeConfig::parse("resource race"),
            Err(ConfigError::Malformed(1))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "resource = freeroam").unwrap();
        writeln!(file, "GenerateDocs = no").unwrap();

        let config = BridgeConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.resource_name, "freeroam");
        assert!(!config.generate_docs);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = BridgeConfig::load_from_file(dir.path().join("bridge.txt")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(matches!(BridgeError::from(err), BridgeError::Io(_)));
    }
}
