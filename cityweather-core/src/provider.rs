use crate::{Config, WeatherError, WeatherRecord, provider::openweather::OpenWeatherFetcher};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of fresh weather records. The lookup flow only talks to this seam,
/// so tests can swap the network out.
#[async_trait]
pub trait WeatherFetcher: Send + Sync + Debug {
    /// Fetch current weather for a city name that already passed validation.
    async fn fetch(&self, city: &str) -> Result<WeatherRecord, WeatherError>;
}

/// Construct the OpenWeather fetcher described by the config.
///
/// A missing API key is not an error here; it surfaces on the first fetch.
pub fn fetcher_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherFetcher>> {
    let fetcher = OpenWeatherFetcher::new(
        config.endpoint.clone(),
        config.api_key.clone(),
        config.request_timeout,
    )?;

    Ok(Box::new(fetcher))
}
