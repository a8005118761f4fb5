//! CLI configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::CliError;

/// CLI configuration, stored in `~/.abibind/config.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory generated bindings are written to
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    /// Runtime crate path used in generated code
    #[serde(default = "default_runtime_path")]
    pub runtime_path: String,
    /// Log filter used when neither `--log-level` nor `RUST_LOG` is set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("src/bindings")
}

fn default_runtime_path() -> String {
    abibind_gen::DEFAULT_RUNTIME_PATH.to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            runtime_path: default_runtime_path(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".abibind"))
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Load config from file; defaults when there is none
    pub fn load() -> Result<Self, CliError> {
        match Self::config_path() {
            Some(path) => Ok(Self::load_from(&path)?.unwrap_or_default()),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`; `None` if missing
    pub fn load_from(path: &Path) -> Result<Option<Self>, CliError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map(Some)
            .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let path = Self::config_path().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "Cannot determine config path")
        })?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating its directory
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;

        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.out_dir, PathBuf::from("src/bindings"));
        assert_eq!(config.runtime_path, "::abibind_runtime");
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_config_partial_file() {
        let config: Config = toml::from_str(r#"runtime_path = "crate::rt""#).unwrap();
        assert_eq!(config.runtime_path, "crate::rt");
        assert_eq!(config.out_dir, default_out_dir());
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            out_dir: PathBuf::from("gen"),
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), Some(config));
    }

    #[test]
    fn test_config_missing_or_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(Config::load_from(&path).unwrap(), None);

        std::fs::write(&path, "out_dir = [").unwrap();
        assert!(matches!(Config::load_from(&path), Err(CliError::Config(_))));
    }
}
