mod loader;
pub mod value;

use std::collections::HashMap;
use std::path::Path;

use crate::pipeline::DEFAULT_BODY_LIMIT;

pub use value::{ConfigValue, FromConfigValue};

/// Environment variable naming the active profile.
pub const PROFILE_ENV: &str = "BRISK_PROFILE";

/// Error type for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// The requested key was not found in the configuration.
    NotFound(String),
    /// The value could not be converted to the requested type.
    TypeMismatch { key: String, expected: &'static str },
    /// An I/O or YAML parsing error occurred while loading config files.
    Load(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(key) => write!(f, "Config key not found: {key}"),
            ConfigError::TypeMismatch { key, expected } => {
                write!(f, "Config type mismatch for '{key}': expected {expected}")
            }
            ConfigError::Load(msg) => write!(f, "Config load error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Application configuration from YAML files, `.env` files and the environment.
///
/// Resolution order (lowest to highest priority):
/// 1. `application.yaml`
/// 2. `application-{profile}.yaml`
/// 3. `.env`, then `.env.{profile}` (loaded into the process environment,
///    never overwriting variables that are already set)
/// 4. environment variables: `SERVER_ADDR` overrides `server.addr`
///
/// The profile comes from `BRISK_PROFILE`, falling back to the argument.
#[derive(Debug, Clone)]
pub struct BriskConfig {
    values: HashMap<String, ConfigValue>,
    profile: String,
}

impl BriskConfig {
    /// Load from the current working directory.
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."), profile)
    }

    /// Load YAML files from `dir`.
    pub fn load_from(dir: &Path, profile: &str) -> Result<Self, ConfigError> {
        let profile = std::env::var(PROFILE_ENV).unwrap_or_else(|_| profile.to_string());
        let mut values = HashMap::new();

        loader::merge_yaml_file(&dir.join("application.yaml"), &mut values)?;
        loader::merge_yaml_file(&dir.join(format!("application-{profile}.yaml")), &mut values)?;

        let _ = dotenvy::from_path(dir.join(".env"));
        let _ = dotenvy::from_path(dir.join(format!(".env.{profile}")));

        let mut config = BriskConfig { values, profile };
        config.overlay_env(std::env::vars());
        Ok(config)
    }

    /// Parse a YAML document (no files, no environment).
    pub fn from_yaml_str(yaml: &str, profile: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        loader::merge_yaml_str(yaml, &mut values)?;
        Ok(BriskConfig {
            values,
            profile: profile.to_string(),
        })
    }

    pub fn empty() -> Self {
        BriskConfig {
            values: HashMap::new(),
            profile: "test".to_string(),
        }
    }

    /// Apply `NAME=value` pairs with the environment naming convention.
    ///
    /// `SERVER_BODY_LIMIT` replaces both `server.body.limit` and an existing
    /// `server.body_limit`.
    pub fn overlay_env(&mut self, vars: impl IntoIterator<Item = (String, String)>) {
        for (name, raw) in vars {
            let dotted = loader::env_key(&name);
            let matching: Vec<String> = self
                .values
                .keys()
                .filter(|k| k.replace('_', ".") == dotted)
                .cloned()
                .collect();
            for key in matching {
                self.values.insert(key, ConfigValue::String(raw.clone()));
            }
            self.values.insert(dotted, ConfigValue::String(raw));
        }
    }

    pub fn set(&mut self, key: &str, value: ConfigValue) {
        self.values.insert(key.to_string(), value);
    }

    /// Typed value for a dot-separated key.
    pub fn get<V: FromConfigValue>(&self, key: &str) -> Result<V, ConfigError> {
        let value = self
            .values
            .get(key)
            .or_else(|| self.values.get(&key.replace('_', ".")))
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))?;
        V::from_config_value(value, key)
    }

    /// `None` when the key is missing; a malformed value is still an error.
    pub fn get_optional<V: FromConfigValue>(&self, key: &str) -> Result<Option<V>, ConfigError> {
        match self.get(key) {
            Ok(value) => Ok(Some(value)),
            Err(ConfigError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Typed value, or `default` when the key is missing or malformed.
    pub fn get_or<V: FromConfigValue>(&self, key: &str, default: V) -> V {
        self.get(key).unwrap_or(default)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The active profile name.
    pub fn profile(&self) -> &str {
        &self.profile
    }
}

/// Listener and request settings read from `server.*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// `server.addr`, default `0.0.0.0:3000`.
    pub addr: String,
    /// `server.body_limit` in bytes, default 2 MiB.
    pub body_limit: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:3000".to_string(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ServerSettings {
    pub fn from_config(config: &BriskConfig) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            addr: config.get_optional("server.addr")?.unwrap_or(defaults.addr),
            body_limit: config
                .get_optional("server.body_limit")?
                .unwrap_or(defaults.body_limit),
        })
    }
}
