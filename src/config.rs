//! Configuration loading helpers.

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::constants::ARENA_BLOCK_ENTRIES;
use crate::dict::SignDict;
use crate::error::DictError;

/// Default bucket count when the configuration does not set one.
pub const DEFAULT_HASH_SIZE: u32 = 1 << 20;

/// Default initial arena capacity when the configuration does not set one.
pub const DEFAULT_INITIAL_CAPACITY: usize = ARENA_BLOCK_ENTRIES;

/// Errors returned by configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error while reading config files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// Invalid value for a key.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Raw value string.
        value: String,
    },
    /// Unknown configuration key.
    #[error("unknown config key: {0}")]
    UnknownKey(String),
}

/// Top-level configuration schema.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SigndictConfig {
    /// Dictionary configuration.
    pub dict: Option<DictConfig>,
}

impl SigndictConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Load configuration from the `SIGNDICT_CONFIG` env var (if set),
    /// then apply `SIGNDICT__dict__<field>` overrides.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let config_path = env::var("SIGNDICT_CONFIG").ok();
        let mut config = match config_path {
            Some(path) => Self::load_from_path(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment overrides in-place.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        for (key, value) in env::vars() {
            if !key.starts_with("SIGNDICT__") {
                continue;
            }
            let path = key["SIGNDICT__".len()..].to_ascii_lowercase();
            let parts: Vec<&str> = path.split("__").collect();
            let value = value.trim().to_string();

            match parts.as_slice() {
                ["dict", "hash_size"] => {
                    self.dict_mut().hash_size = Some(parse_value(&key, &value)?);
                }
                ["dict", "initial_capacity"] => {
                    self.dict_mut().initial_capacity = Some(parse_value(&key, &value)?);
                }
                _ => return Err(ConfigError::UnknownKey(key)),
            }
        }

        Ok(())
    }

    /// Create an empty dictionary using defaults plus overrides.
    pub fn create_dict(&self) -> Result<SignDict, DictError> {
        let (hash_size, capacity) = match &self.dict {
            Some(dict) => (
                dict.hash_size.unwrap_or(DEFAULT_HASH_SIZE),
                dict.initial_capacity.unwrap_or(DEFAULT_INITIAL_CAPACITY),
            ),
            None => (DEFAULT_HASH_SIZE, DEFAULT_INITIAL_CAPACITY),
        };
        SignDict::create(hash_size, capacity)
    }

    fn dict_mut(&mut self) -> &mut DictConfig {
        if self.dict.is_none() {
            self.dict = Some(DictConfig::default());
        }
        self.dict.as_mut().expect("dict config")
    }
}

/// Dictionary configuration overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DictConfig {
    /// Bucket count for new dictionaries.
    pub hash_size: Option<u32>,
    /// Initial arena capacity for new dictionaries.
    pub initial_capacity: Option<usize>,
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
