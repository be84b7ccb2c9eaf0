use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::{WeatherError, WeatherRecord};

use super::WeatherFetcher;

/// Fetcher for the OpenWeather current weather endpoint.
///
/// The API key is only required once a request is actually made, so a cache
/// hit works without one.
#[derive(Debug, Clone)]
pub struct OpenWeatherFetcher {
    endpoint: String,
    api_key: Option<String>,
    http: Client,
}

impl OpenWeatherFetcher {
    pub fn new(
        endpoint: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint,
            api_key,
            http,
        })
    }
}

#[async_trait]
impl WeatherFetcher for OpenWeatherFetcher {
    async fn fetch(&self, city: &str) -> Result<WeatherRecord, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;
        tracing::debug!(city, endpoint = %self.endpoint, "requesting current weather");

        let res = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("q", city),
                ("appid", api_key),
                ("units", "metric"),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(WeatherError::CityNotFound(city.to_string()));
        }

        if !status.is_success() {
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        WeatherRecord::from_api_json(&body)
    }
}

/// OpenWeather error bodies look like `{"cod": "401", "message": "Invalid API key..."}`.
#[derive(Debug, Deserialize)]
struct OwError {
    message: String,
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<OwError>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| truncate_body(body))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
