//! Cache-then-fetch lookup for a single city.
use crate::{WeatherError, WeatherFetcher, WeatherRecord, WeatherStore, store::SortField};

/// Where the queried city's weather came from on this run.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// A fresh row was already cached; the network was not touched.
    Cached,
    /// Fetched from the API during this run.
    Fetched(WeatherRecord),
}

/// Result of one lookup: how the city was resolved, plus the whole cache listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    pub source: Source,
    pub listing: Vec<WeatherRecord>,
}

impl Lookup {
    pub fn fetched(&self) -> Option<&WeatherRecord> {
        match &self.source {
            Source::Fetched(record) => Some(record),
            Source::Cached => None,
        }
    }
}

/// Accept only ASCII letters, `!` and `-`.
pub fn validate_city(city: &str) -> Result<&str, WeatherError> {
    if city.is_empty() {
        return Err(WeatherError::Usage("city name must not be empty".into()));
    }
    match city.chars().find(|c| !(c.is_ascii_alphabetic() || *c == '!' || *c == '-')) {
        Some(bad) => Err(WeatherError::Usage(format!(
            "invalid character {bad:?} in city name '{city}': only letters, '!' and '-' are allowed"
        ))),
        None => Ok(city),
    }
}

/// Resolve `city` through the cache, fetching and caching it on a miss.
///
/// Stale rows are purged before the lookup. Whatever the path taken, the
/// returned listing is the full cache ordered by city name.
pub async fn lookup_weather(
    city: &str,
    store: &WeatherStore,
    fetcher: &dyn WeatherFetcher,
    ttl_seconds: i64,
    now: i64,
) -> Result<Lookup, WeatherError> {
    let city = validate_city(city)?;

    store.ensure_schema()?;
    store.purge_expired(ttl_seconds, now)?;

    let source = match store.find(city)? {
        Some(_) => {
            tracing::debug!(city, "cache hit");
            Source::Cached
        }
        None => {
            tracing::debug!(city, "cache miss");
            let record = fetcher.fetch(city).await?;
            // The API may answer with a canonical name that is already cached;
            // the cached row stays authoritative and the new reading is dropped.
            if store.find(record.city())?.is_some() {
                tracing::debug!(city = record.city(), "canonical name already cached");
                Source::Cached
            } else {
                store.insert(&record)?;
                Source::Fetched(record)
            }
        }
    };

    let listing = store.list_all_ordered_by(SortField::City)?;
    Ok(Lookup { source, listing })
}
