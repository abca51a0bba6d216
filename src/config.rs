use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::lookup::Locale;
use crate::lookup_cache::{LookupCache, WorkTypeKeys};

pub const DEFAULT_CONFIG_PATH: &str = ".machete/config.toml";
pub const DEFAULT_ROCKSTAR_MINUTES: i64 = 720;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "invalid config {}: {}", path.display(), source)
            }
            ConfigError::Invalid(message) => write!(f, "invalid config: {}", message),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Invalid(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub locale: Locale,
    pub lookup_cache: LookupCacheConfig,
    pub dispatch: DispatchConfig,
    pub reports: ReportsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LookupCacheConfig {
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    pub dwc_work_type_key: String,
    pub hhh_work_type_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportsConfig {
    pub rockstar_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: Locale::En,
            lookup_cache: LookupCacheConfig::default(),
            dispatch: DispatchConfig::default(),
            reports: ReportsConfig::default(),
        }
    }
}

impl Default for LookupCacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 3600 }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        let keys = WorkTypeKeys::default();
        Self {
            dwc_work_type_key: keys.dwc,
            hhh_work_type_key: keys.hhh,
        }
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            rockstar_minutes: DEFAULT_ROCKSTAR_MINUTES,
        }
    }
}

impl Config {
    /// Reads the config file at `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::parse(&raw).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.lookup_cache.ttl_secs == 0 {
            warn!("lookup_cache.ttl_secs is 0; every lookup will hit the database");
        }
        if self.dispatch.dwc_work_type_key.trim().is_empty()
            || self.dispatch.hhh_work_type_key.trim().is_empty()
        {
            return Err(ConfigError::Invalid(
                "dispatch work type keys must not be empty".to_string(),
            ));
        }
        if self.reports.rockstar_minutes <= 0 {
            return Err(ConfigError::Invalid(
                "reports.rockstar_minutes must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn lookup_ttl(&self) -> Duration {
        Duration::from_secs(self.lookup_cache.ttl_secs)
    }

    pub fn work_type_keys(&self) -> WorkTypeKeys {
        WorkTypeKeys {
            dwc: self.dispatch.dwc_work_type_key.clone(),
            hhh: self.dispatch.hhh_work_type_key.clone(),
        }
    }

    pub fn lookup_cache(&self) -> LookupCache {
        LookupCache::new(self.lookup_ttl(), self.work_type_keys())
    }
}
