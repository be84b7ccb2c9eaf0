//! Core library for the `cityweather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather fetcher abstraction and its OpenWeather implementation
//! - The SQLite-backed weather cache
//! - The cache-then-fetch lookup flow
//!
//! It is used by `cityweather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod lookup;
pub mod model;
pub mod provider;
pub mod store;

pub use config::{Config, FileConfig};
pub use error::WeatherError;
pub use lookup::{Lookup, Source, lookup_weather, validate_city};
pub use model::{WeatherRecord, render_listing};
pub use provider::{WeatherFetcher, fetcher_from_config};
pub use store::{SortField, WeatherStore};
