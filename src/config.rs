//! Configuration management for hanzi-vault

use crate::crypto::PBKDF2_ITERATIONS;
use crate::error::{Error, Result};
use crate::session::DEFAULT_SELECTION_KEY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the encrypted data files
pub const DEFAULT_DATA_DIR: &str = "./data_encrypted";

/// Encrypted data location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the `*.enc` files
    pub base_dir: PathBuf,
}

/// Key derivation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdfConfig {
    /// PBKDF2 rounds; must match the tool that encrypted the files
    pub iterations: u32,
}

/// Selection persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Sled database path
    pub db_path: PathBuf,

    /// Key the selection is stored under
    #[serde(default = "default_selection_key")]
    pub key: String,
}

fn default_selection_key() -> String {
    DEFAULT_SELECTION_KEY.to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,

    pub kdf: KdfConfig,

    pub selection: SelectionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            base_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl Default for KdfConfig {
    fn default() -> Self {
        KdfConfig {
            iterations: PBKDF2_ITERATIONS,
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        let db_path = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hanzi-vault")
            .join("selection.db");

        SelectionConfig {
            db_path,
            key: default_selection_key(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data: DataConfig::default(),
            kdf: KdfConfig::default(),
            selection: SelectionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}

impl Config {
    /// Load configuration from a file (YAML or JSON), with environment
    /// variable substitution and overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let content = std::fs::read_to_string(path_ref)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let content = Self::substitute_env_vars(&content)?;

        let mut config: Config = if is_yaml(path_ref) {
            serde_yaml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse YAML config: {}", e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse JSON config: {}", e)))?
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise start from defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            return Self::load(path);
        }

        let mut config = Config::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Substitute environment variables in config content.
    /// Supports ${VAR_NAME} syntax; unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| Error::Internal(e.to_string()))?;

        let result = re.replace_all(content, |cap: &regex::Captures| {
            std::env::var(&cap[1]).unwrap_or_else(|_| cap[0].to_string())
        });

        Ok(result.into_owned())
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("HANZI_VAULT_DATA_DIR") {
            let dir = dir.trim();
            if !dir.is_empty() {
                self.data.base_dir = PathBuf::from(dir);
            }
        }

        if let Ok(iterations) = std::env::var("HANZI_VAULT_KDF_ITERATIONS") {
            if let Ok(n) = iterations.trim().parse::<u32>() {
                self.kdf.iterations = n;
            }
        }
    }

    /// Save configuration to a file (format determined by extension)
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path_ref = path.as_ref();

        let content = if is_yaml(path_ref) {
            serde_yaml::to_string(self).map_err(|e| {
                Error::Config(format!("Failed to serialize config to YAML: {}", e))
            })?
        } else {
            serde_json::to_string_pretty(self).map_err(|e| {
                Error::Config(format!("Failed to serialize config to JSON: {}", e))
            })?
        };

        if let Some(parent) = path_ref.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path_ref, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.kdf.iterations == 0 {
            return Err(Error::InvalidConfig(
                "KDF iterations must be greater than 0".to_string(),
            ));
        }

        if self.selection.key.is_empty() {
            return Err(Error::InvalidConfig(
                "Selection key must not be empty".to_string(),
            ));
        }

        if self.data.base_dir.as_os_str().is_empty() {
            return Err(Error::InvalidConfig(
                "Data directory must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
