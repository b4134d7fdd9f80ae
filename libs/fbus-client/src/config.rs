//! Client configuration
//!
//! Layered with figment, lowest priority first:
//! 1. Built-in defaults
//! 2. `fbus.toml` / `fbus.yaml` in the working directory (or an explicit file)
//! 3. `FBUS_*` environment variables (`FBUS_LIBRARY_PATH`, `FBUS_ADAPTER`,
//!    `FBUS_PORT`, `FBUS_LOG_LEVEL`)

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::{network_address, AdapterKind};
use crate::error::{FbusError, Result};
use crate::native::DEFAULT_LIBRARY;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "FBUS_";

/// Default configuration files, merged in order
pub const DEFAULT_CONFIG_FILES: &[&str] = &["fbus.toml", "fbus.yaml"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Native library; platform default when unset
    #[serde(default)]
    pub library_path: Option<PathBuf>,

    #[serde(default)]
    pub adapter: AdapterKind,

    /// Adapter port, 1..=100
    #[serde(default = "default_port")]
    pub port: u16,

    /// Default tracing filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            library_path: None,
            adapter: AdapterKind::default(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

impl ClientConfig {
    /// Defaults, then the default files present, then the environment
    pub fn load() -> Result<Self> {
        let figment = DEFAULT_CONFIG_FILES
            .iter()
            .fold(Self::defaults(), |figment, file| {
                merge_file(figment, Path::new(file))
            });
        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Defaults, then `path`, then the environment
    ///
    /// The format follows the extension: `toml`, `yaml`/`yml` or `json`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(FbusError::Config(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }
        if file_format(path).is_none() {
            return Err(FbusError::Config(format!(
                "unsupported configuration format: {}",
                path.display()
            )));
        }

        let figment = merge_file(Self::defaults(), path).merge(Env::prefixed(ENV_PREFIX));
        Self::extract(figment)
    }

    fn defaults() -> Figment {
        Figment::from(Serialized::defaults(ClientConfig::default()))
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: ClientConfig = figment.extract()?;
        config.validate()?;
        debug!("FBUS client configuration: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        network_address(self.adapter, self.port)
            .map_err(|e| FbusError::Config(e.to_string()))?;

        if self.log_level.trim().is_empty() {
            return Err(FbusError::Config("log_level must not be empty".to_string()));
        }
        if self
            .library_path
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            return Err(FbusError::Config("library_path must not be empty".to_string()));
        }
        Ok(())
    }

    /// Configured library path or the platform default
    pub fn library_path(&self) -> PathBuf {
        self.library_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LIBRARY))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Toml,
    Yaml,
    Json,
}

fn file_format(path: &Path) -> Option<FileFormat> {
    match path.extension()?.to_str()? {
        "toml" => Some(FileFormat::Toml),
        "yaml" | "yml" => Some(FileFormat::Yaml),
        "json" => Some(FileFormat::Json),
        _ => None,
    }
}

/// Merge `path` if it has a known format; missing files contribute nothing
fn merge_file(figment: Figment, path: &Path) -> Figment {
    match file_format(path) {
        Some(FileFormat::Toml) => figment.merge(Toml::file(path)),
        Some(FileFormat::Yaml) => figment.merge(Yaml::file(path)),
        Some(FileFormat::Json) => figment.merge(Json::file(path)),
        None => figment,
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ClientConfig::default();
        config.validate().unwrap();
        assert_eq!(config.library_path(), PathBuf::from(DEFAULT_LIBRARY));
        assert_eq!(config.port, 1);
        assert_eq!(config.adapter, AdapterKind::Local);
    }

    #[test]
    fn test_validate_rejects_bad_port() {
        let config = ClientConfig {
            port: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, FbusError::Config(_)));
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_file_format() {
        assert_eq!(file_format(Path::new("a.toml")), Some(FileFormat::Toml));
        assert_eq!(file_format(Path::new("a.yml")), Some(FileFormat::Yaml));
        assert_eq!(file_format(Path::new("a.json")), Some(FileFormat::Json));
        assert_eq!(file_format(Path::new("a.ini")), None);
        assert_eq!(file_format(Path::new("fbus")), None);
    }
}
