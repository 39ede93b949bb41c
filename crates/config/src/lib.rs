#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for pkgd
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/pkgd/pkgd.toml)
//! - Environment variables
//! - CLI flags
//!
//! It also renders the toolchain's own configuration file from these
//! settings (see [`PackagerConfig::render_toolchain_config`]).

pub mod constants;
mod feeds;
mod render;

pub use feeds::{ArchitectureConfig, FeedConfig};

use pkgd_errors::{ConfigError, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Settings applied by `Packager::configure`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagerConfig {
    /// Where the generated toolchain configuration is written
    #[serde(default)]
    pub config_file: Option<PathBuf>,
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    /// Wipe the cache directory when the packager shuts down
    #[serde(default)]
    pub volatile_cache: bool,
    #[serde(default)]
    pub verbosity: u8,
    #[serde(default)]
    pub no_deps: bool,
    #[serde(default)]
    pub no_signature_check: bool,
    /// Force a full repository refresh before every install
    #[serde(default)]
    pub always_update_first: bool,
    #[serde(default = "default_lists_dir")]
    pub lists_dir: PathBuf,
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,
    #[serde(default = "default_toolchain_binary")]
    pub toolchain_binary: PathBuf,
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
    #[serde(default)]
    pub architectures: Vec<ArchitectureConfig>,
}

impl Default for PackagerConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            temp_dir: default_temp_dir(),
            cache_dir: default_cache_dir(),
            volatile_cache: false,
            verbosity: 0,
            no_deps: false,
            no_signature_check: false,
            always_update_first: false,
            lists_dir: default_lists_dir(),
            root_dir: default_root_dir(),
            toolchain_binary: default_toolchain_binary(),
            feeds: Vec::new(),
            architectures: Vec::new(),
        }
    }
}

// Default value functions for serde
fn default_temp_dir() -> PathBuf {
    PathBuf::from(constants::DEFAULT_TEMP_DIR)
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(constants::DEFAULT_CACHE_DIR)
}

fn default_lists_dir() -> PathBuf {
    PathBuf::from(constants::DEFAULT_LISTS_DIR)
}

fn default_root_dir() -> PathBuf {
    PathBuf::from(constants::DEFAULT_ROOT_DIR)
}

fn default_toolchain_binary() -> PathBuf {
    PathBuf::from(constants::DEFAULT_TOOLCHAIN_BINARY)
}

impl PackagerConfig {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir
            .join(constants::CONFIG_DIR_NAME)
            .join(constants::CONFIG_FILE_NAME))
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this structure.
    pub fn from_toml_str(contents: &str) -> Result<Self, Error> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        tracing::debug!(path = %path.display(), "loaded pkgd configuration");
        Self::from_toml_str(&contents)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Ok(dir) = std::env::var(constants::ENV_TEMP_DIR) {
            self.temp_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var(constants::ENV_CACHE_DIR) {
            self.cache_dir = PathBuf::from(dir);
        }

        if let Ok(verbosity) = std::env::var(constants::ENV_VERBOSITY) {
            self.verbosity = verbosity.parse().map_err(|_| ConfigError::InvalidValue {
                field: constants::ENV_VERBOSITY.to_string(),
                value: verbosity,
            })?;
        }

        if let Some(value) = env_flag(constants::ENV_NO_DEPS)? {
            self.no_deps = value;
        }
        if let Some(value) = env_flag(constants::ENV_NO_SIGNATURE_CHECK)? {
            self.no_signature_check = value;
        }
        if let Some(value) = env_flag(constants::ENV_ALWAYS_UPDATE_FIRST)? {
            self.always_update_first = value;
        }

        Ok(())
    }

    /// Check the settings before they are applied
    ///
    /// # Errors
    ///
    /// Returns an error if a required path is empty or two directories that
    /// must stay separate point at the same location.
    pub fn validate(&self) -> Result<(), Error> {
        for (field, path) in [
            ("temp_dir", &self.temp_dir),
            ("cache_dir", &self.cache_dir),
            ("lists_dir", &self.lists_dir),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::MissingField {
                    field: field.to_string(),
                }
                .into());
            }
        }

        // A volatile cache is wiped on shutdown; sharing it would delete the rest.
        if self.volatile_cache
            && (self.cache_dir == self.temp_dir || self.cache_dir == self.lists_dir)
        {
            return Err(ConfigError::Invalid {
                message: format!(
                    "volatile cache_dir {} must not be shared with other directories",
                    self.cache_dir.display()
                ),
            }
            .into());
        }

        if let Some(feed) = self.feeds.iter().find(|f| f.name.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "feeds.name".to_string(),
                value: feed.url.clone(),
            }
            .into());
        }

        Ok(())
    }

    /// Location of the generated toolchain configuration file
    #[must_use]
    pub fn toolchain_config_path(&self) -> PathBuf {
        self.config_file
            .clone()
            .unwrap_or_else(|| self.temp_dir.join(constants::GENERATED_CONFIG_NAME))
    }

    /// Serialize back to TOML
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, Error> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError {
                error: e.to_string(),
            })
            .map_err(Into::into)
    }
}

fn env_flag(var: &str) -> Result<Option<bool>, Error> {
    let Ok(value) = std::env::var(var) else {
        return Ok(None);
    };
    match value.as_str() {
        "true" | "1" | "yes" => Ok(Some(true)),
        "false" | "0" | "no" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidValue {
            field: var.to_string(),
            value,
        }
        .into()),
    }
}
