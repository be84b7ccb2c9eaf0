use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{fs, path::PathBuf, time::Duration};

/// OpenWeather "current weather" endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_CACHE_TTL_SECONDS: i64 = 3600;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

pub const ENV_API_KEY: &str = "WEATHER_API_KEY";
pub const ENV_DB_PATH: &str = "DB_PATH";
pub const ENV_CACHE_TTL: &str = "CACHE_TTL_SECONDS";
pub const ENV_ENDPOINT: &str = "WEATHER_API_URL";
pub const ENV_REQUEST_TIMEOUT: &str = "WEATHER_REQUEST_TIMEOUT_SECS";

/// Optional on-disk configuration. Every key may be omitted.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// db_path = "/var/tmp/weather.db"
/// cache_ttl_seconds = 600
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub api_key: Option<String>,
    pub db_path: Option<PathBuf>,
    pub cache_ttl_seconds: Option<i64>,
    pub endpoint: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

/// Resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub db_path: PathBuf,
    pub cache_ttl_seconds: i64,
    pub endpoint: String,
    pub request_timeout: Duration,
}

impl Config {
    /// Defaults, overlaid by the config file (if any), overlaid by the environment.
    pub fn load() -> Result<Self> {
        let file = FileConfig::load()?;
        let mut cfg = Self::with_defaults(default_db_path()?);
        cfg.apply_file(file);
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_defaults(db_path: PathBuf) -> Self {
        Self {
            api_key: None,
            db_path,
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(key) = file.api_key {
            self.api_key = Some(key);
        }
        if let Some(path) = file.db_path {
            self.db_path = path;
        }
        if let Some(ttl) = file.cache_ttl_seconds {
            self.cache_ttl_seconds = ttl;
        }
        if let Some(endpoint) = file.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
    }

    /// Overlay values looked up by environment variable name. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(path) = get(ENV_DB_PATH) {
            self.db_path = PathBuf::from(path);
        }
        if let Some(ttl) = get(ENV_CACHE_TTL) {
            self.cache_ttl_seconds = ttl
                .trim()
                .parse()
                .with_context(|| whole_seconds_message(ENV_CACHE_TTL, &ttl))?;
        }
        if let Some(endpoint) = get(ENV_ENDPOINT) {
            self.endpoint = endpoint;
        }
        if let Some(secs) = get(ENV_REQUEST_TIMEOUT) {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| whole_seconds_message(ENV_REQUEST_TIMEOUT, &secs))?;
            self.request_timeout = Duration::from_secs(secs);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_ttl_seconds < 0 {
            return Err(anyhow!(
                "Cache TTL must not be negative (got {} seconds)",
                self.cache_ttl_seconds
            ));
        }
        Ok(())
    }
}

impl FileConfig {
    /// Load the config file, or return an empty one if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

fn whole_seconds_message(key: &str, value: &str) -> String {
    format!("{key} must be a whole number of seconds, got '{value}'")
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "cityweather", "cityweather")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

/// Path to the optional config file.
pub fn config_file_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

/// Where the cache database lives unless configured otherwise.
pub fn default_db_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().join("weather.db"))
}
