use std::{fs, path::Path, path::PathBuf, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::supabase::SupabaseConfig;
use crate::utils;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
    #[error("supabase backend needs SUPABASE_URL and SUPABASE_ANON_KEY")]
    MissingSupabase,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Supabase,
    Sqlite,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "supabase" => Ok(Backend::Supabase),
            "sqlite" => Ok(Backend::Sqlite),
            other => Err(format!("unknown backend {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub backend: Backend,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub sqlite_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            supabase_url: None,
            supabase_anon_key: None,
            sqlite_path: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Reads `path` (defaults when absent) and applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(utils::config_path);
        let mut config = read_config(&path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SUPABASE_URL") {
            self.supabase_url = Some(url);
        }
        if let Some(key) = lookup("SUPABASE_ANON_KEY") {
            self.supabase_anon_key = Some(key);
        }
        if let Some(path) = lookup("EVENTS_SQLITE_PATH") {
            self.sqlite_path = Some(PathBuf::from(path));
        }
        if let Some(value) = lookup("EVENTS_BACKEND") {
            self.backend = value.parse().map_err(|_| ConfigError::InvalidEnv {
                key: "EVENTS_BACKEND",
                value,
            })?;
        }
        if let Some(value) = lookup("EVENTS_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs =
                value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    key: "EVENTS_REQUEST_TIMEOUT_SECS",
                    value,
                })?;
        }
        Ok(())
    }

    pub fn supabase(&self) -> Result<SupabaseConfig, ConfigError> {
        let url = non_blank(self.supabase_url.as_deref()).ok_or(ConfigError::MissingSupabase)?;
        let anon_key =
            non_blank(self.supabase_anon_key.as_deref()).ok_or(ConfigError::MissingSupabase)?;
        Ok(SupabaseConfig {
            url,
            anon_key,
            timeout: Duration::from_secs(self.request_timeout_secs),
        })
    }

    pub fn sqlite_path(&self) -> PathBuf {
        self.sqlite_path
            .clone()
            .unwrap_or_else(utils::database_path)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
