use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::locale::{LocaleError, LocaleSet};
use crate::routing::{BypassSet, LocaleRouting, DEFAULT_BYPASS};
use crate::stores::TODO_STORAGE_KEY;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Locale(#[from] LocaleError),

    #[error("invalid bypass pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Startup configuration. Every section and field is optional.
///
/// ```toml
/// [locales]
/// supported = ["zh_CN", "en"]
/// default = "zh_CN"
///
/// [routing]
/// bypass = ["^/_next(/|$)", "^/api(/|$)"]
///
/// [storage]
/// dir = "/var/lib/app/state"
///
/// [persist]
/// todo_key = "todo-storage"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub locales: LocalesConfig,
    pub routing: RoutingConfig,
    pub storage: StorageConfig,
    pub persist: PersistConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LocalesConfig {
    pub supported: Vec<String>,
    pub default: String,
}

impl Default for LocalesConfig {
    fn default() -> Self {
        let set = LocaleSet::default();
        Self {
            supported: set.supported().to_vec(),
            default: set.fallback().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub bypass: Vec<String>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            bypass: DEFAULT_BYPASS.iter().map(|p| (*p).to_string()).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for file-backed storage. In-memory storage when unset.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PersistConfig {
    pub todo_key: String,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            todo_key: TODO_STORAGE_KEY.to_string(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.routing()?;
        Ok(config)
    }

    /// Read and validate the TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(
            "Loaded config from {:?} ({} locales)",
            path,
            config.locales.supported.len()
        );
        Ok(config)
    }

    /// Load `path`, or fall back to defaults when it is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("{err}; using defaults");
                Self::default()
            }
        }
    }

    pub fn locale_set(&self) -> Result<LocaleSet, LocaleError> {
        LocaleSet::new(self.locales.supported.iter().cloned(), self.locales.default.clone())
    }

    pub fn bypass_set(&self) -> Result<BypassSet, regex::Error> {
        BypassSet::new(&self.routing.bypass)
    }

    /// The routing decision object described by this config.
    pub fn routing(&self) -> Result<LocaleRouting, ConfigError> {
        Ok(LocaleRouting::new(self.locale_set()?, self.bypass_set()?))
    }
}
