//! Configuration management for Gono.
//!
//! Gono only reads its config; the file is written by hand. A missing file
//! means defaults, and every section may be omitted. The default location is
//! `~/.config/gono/config.toml`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("log_level must be one of: trace, debug, info, warn, error; got {0}")]
    InvalidLogLevel(String),

    #[error("registry_path must not be empty")]
    EmptyRegistryPath,

    #[error("registry_path must name a file, got {0}")]
    InvalidRegistryPath(String),
}

/// Valid log level values for tracing configuration.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// File name of the vault registry inside the home directory.
const REGISTRY_FILE_NAME: &str = ".gono_vaults.json";

/// Main configuration structure for Gono.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// Where vaults and the registry live.
    pub storage: StorageConfig,

    /// File list settings.
    pub browser: BrowserConfig,

    /// Log file settings.
    pub logging: LoggingConfig,
}

/// Vault storage configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory new vaults are created in.
    pub vault_root: PathBuf,

    /// JSON file holding the list of known vaults.
    pub registry_path: PathBuf,
}

/// File list configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct BrowserConfig {
    /// List entries whose name starts with '.'.
    pub show_hidden: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Directory for rotated log files.
    pub log_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let home = home_dir();
        Self {
            registry_path: home.join(REGISTRY_FILE_NAME),
            vault_root: home,
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self { show_hidden: true }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: default_log_dir(),
        }
    }
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gono")
        .join("config.toml")
}

/// Returns the default log directory.
fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gono")
        .join("logs")
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

impl Config {
    /// Apply environment variable overrides to the configuration.
    ///
    /// Environment variables take precedence over config file values.
    /// Supported variables:
    /// - GONO_VAULT_ROOT: Override the directory new vaults are created in
    /// - GONO_REGISTRY: Override the vault registry file
    /// - GONO_LOG_LEVEL: Override log level (trace, debug, info, warn, error)
    pub fn apply_env_overrides(&mut self) {
        if let Ok(root) = std::env::var("GONO_VAULT_ROOT") {
            if !root.is_empty() {
                tracing::info!("Overriding vault_root from environment: {}", root);
                self.storage.vault_root = PathBuf::from(root);
            }
        }

        if let Ok(registry) = std::env::var("GONO_REGISTRY") {
            if !registry.is_empty() {
                tracing::info!("Overriding registry_path from environment: {}", registry);
                self.storage.registry_path = PathBuf::from(registry);
            }
        }

        if let Ok(level) = std::env::var("GONO_LOG_LEVEL") {
            if !level.is_empty() {
                tracing::info!("Overriding log_level from environment: {}", level);
                self.logging.log_level = level;
            }
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let registry = &self.storage.registry_path;
        if registry.as_os_str().is_empty() {
            return Err(ConfigError::EmptyRegistryPath);
        }
        if registry.file_name().is_none() {
            return Err(ConfigError::InvalidRegistryPath(
                registry.display().to_string(),
            ));
        }

        let level = self.logging.log_level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.logging.log_level.clone()));
        }

        Ok(())
    }

    /// Read the config at `path`, or defaults when there is no such file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No config at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))
            }
        };

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse a config document.
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| {
            anyhow::anyhow!("Invalid TOML configuration: {}", describe_toml_error(source, &e))
        })
    }
}

/// Error message with the 1-based line it points at, when known.
fn describe_toml_error(source: &str, error: &toml::de::Error) -> String {
    let message = error.message().trim_end();
    match error.span().and_then(|span| source.get(..span.start)) {
        Some(before) => format!("{} (line {})", message, before.matches('\n').count() + 1),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn clear_env() {
        std::env::remove_var("GONO_VAULT_ROOT");
        std::env::remove_var("GONO_REGISTRY");
        std::env::remove_var("GONO_LOG_LEVEL");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.logging.log_level, "info");
        assert!(config.browser.show_hidden);
        assert_eq!(
            config.storage.registry_path.file_name().unwrap(),
            REGISTRY_FILE_NAME
        );
        assert_eq!(
            config.storage.registry_path.parent().unwrap(),
            config.storage.vault_root
        );
    }

    #[test]
    fn test_default_log_dir() {
        let config = LoggingConfig::default();
        assert!(config.log_dir.ends_with("gono/logs"));
    }

    #[test]
    fn test_from_toml_empty() {
        // Empty TOML should use all defaults
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_from_toml_partial() {
        let toml = r#"
[browser]
show_hidden = false

[logging]
log_level = "debug"
"#;
        let config = Config::from_toml(toml).unwrap();

        assert!(!config.browser.show_hidden);
        assert_eq!(config.logging.log_level, "debug");
        // Unspecified sections keep their defaults
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn test_from_toml_full() {
        let toml = r#"
[storage]
vault_root = "/srv/notes"
registry_path = "/srv/notes/registry.json"

[browser]
show_hidden = false

[logging]
log_level = "warn"
log_dir = "/var/log/gono"
"#;
        let config = Config::from_toml(toml).unwrap();

        assert_eq!(config.storage.vault_root, PathBuf::from("/srv/notes"));
        assert_eq!(
            config.storage.registry_path,
            PathBuf::from("/srv/notes/registry.json")
        );
        assert_eq!(config.logging.log_dir, PathBuf::from("/var/log/gono"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_invalid_syntax() {
        let result = Config::from_toml("[storage\nvault_root = 1");
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Invalid TOML configuration"));
    }

    #[test]
    fn test_from_toml_wrong_type() {
        let toml = r#"
[browser]
show_hidden = "yes"
"#;
        assert!(Config::from_toml(toml).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let config = Config::load("/nonexistent/gono/config.toml").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[browser]\nshow_hidden = true\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.browser.show_hidden);
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn test_parse_error_names_line() {
        let err = Config::from_toml("[storage]\nvault_root = \"/notes\"\n\n[browser]\nshow_hidden = \"yes\"\n")
            .unwrap_err()
            .to_string();
        assert!(err.contains("(line 5)"), "{err}");
    }

    #[test]
    fn test_load_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "not = [valid").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let toml = r#"
[storage]
vault_root = "/notes"
colour = "purple"

[future_section]
key = "value"
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.storage.vault_root, PathBuf::from("/notes"));
    }

    #[test]
    fn test_default_config_path() {
        let path = default_config_path();
        assert!(path.ends_with("gono/config.toml"));
    }

    #[test]
    fn test_validate_default() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = Config::default();
        config.logging.log_level = "DEBUG".to_string();
        assert!(config.validate().is_ok());

        config.logging.log_level = "loud".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidLogLevel("loud".to_string()))
        );
    }

    #[test]
    fn test_validate_registry_path() {
        let mut config = Config::default();
        config.storage.registry_path = PathBuf::new();
        assert_eq!(config.validate(), Err(ConfigError::EmptyRegistryPath));

        config.storage.registry_path = PathBuf::from("/");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRegistryPath(_))
        ));
    }

    #[test]
    #[serial]
    fn test_env_override_storage() {
        clear_env();
        std::env::set_var("GONO_VAULT_ROOT", "/data/vaults");
        std::env::set_var("GONO_REGISTRY", "/data/registry.json");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.storage.vault_root, PathBuf::from("/data/vaults"));
        assert_eq!(
            config.storage.registry_path,
            PathBuf::from("/data/registry.json")
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_override_log_level() {
        clear_env();
        std::env::set_var("GONO_LOG_LEVEL", "debug");

        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.logging.log_level, "debug");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_override_empty_does_not_override() {
        clear_env();
        std::env::set_var("GONO_VAULT_ROOT", "");
        std::env::set_var("GONO_LOG_LEVEL", "");

        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config, Config::default());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_override_unset_does_not_override() {
        clear_env();

        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config, Config::default());
    }
}
