use std::{io, path::PathBuf};
use thiserror::Error;

/// Every failure the lookup flow can surface to the binary.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The city argument is missing or contains disallowed characters.
    #[error("{0}")]
    Usage(String),

    /// The weather API does not know the requested city.
    #[error("Unknown city '{0}'")]
    CityNotFound(String),

    /// The weather API could not be reached (connect, TLS, timeout...).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The weather API answered with something we could not turn into a record.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The local cache database is unreachable, unwritable or rejected a statement.
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The directory meant to hold the cache database could not be created.
    #[error("Storage error: cannot create {}: {source}", .path.display())]
    StorageDir { path: PathBuf, source: io::Error },

    /// A network lookup was needed but no API key is configured.
    #[error(
        "No API key configured.\n\
         Hint: set {} or add `api_key = \"...\"` to the config file.",
        crate::config::ENV_API_KEY
    )]
    MissingApiKey,

    /// The weather API rejected the request for a reason other than an unknown city.
    #[error("Weather API request failed with status {status}: {message}")]
    Api { status: u16, message: String },
}

impl WeatherError {
    /// True for failures of the local cache rather than of the input or the API.
    pub fn is_storage(&self) -> bool {
        matches!(self, WeatherError::Storage(_) | WeatherError::StorageDir { .. })
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        WeatherError::Parse(err.to_string())
    }
}
