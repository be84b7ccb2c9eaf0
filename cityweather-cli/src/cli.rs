use chrono::Utc;
use cityweather_core::{
    Config, Lookup, WeatherStore, fetcher_from_config, lookup_weather, render_listing,
    validate_city,
};
use clap::{CommandFactory, Parser};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "cityweather",
    version,
    about = "Show current weather for a city, cached locally",
    after_help = "Configuration: WEATHER_API_KEY, DB_PATH, CACHE_TTL_SECONDS \
                  (or the config file)."
)]
pub struct Cli {
    /// City name: ASCII letters, '!' and '-' only.
    pub city: String,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        // Reject bad input before touching config, disk or network.
        validate_city(&self.city)?;

        let config = Config::load()?;
        let fetcher = fetcher_from_config(&config)?;
        let store = WeatherStore::open(&config.db_path)?;

        let now = Utc::now().timestamp();
        let ttl = config.cache_ttl_seconds;
        let lookup = lookup_weather(&self.city, &store, fetcher.as_ref(), ttl, now).await?;

        print!("{}", render(&lookup));
        Ok(())
    }
}

/// The freshly fetched record (if any), then the whole cache.
fn render(lookup: &Lookup) -> String {
    let mut out = String::new();
    if let Some(record) = lookup.fetched() {
        out.push_str(&record.to_string());
        out.push('\n');
    }
    out.push_str(&render_listing(&lookup.listing));
    out
}

/// One-line usage string, e.g. `Usage: cityweather <CITY>`.
pub fn usage() -> String {
    Cli::command().render_usage().to_string()
}
