//! Binary crate for the `cityweather` command-line tool.
//!
//! This crate focuses on:
//! - Parsing the city argument
//! - Wiring configuration, cache and fetcher together
//! - Turning failures into short messages and exit codes

use cityweather_core::WeatherError;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();

    let cmd = cli::Cli::parse();
    match cmd.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "lookup failed");
            let (message, code) = report(&err);
            eprintln!("{message}");
            ExitCode::from(code)
        }
    }
}

/// Logs go to stderr so stdout only carries the weather report. `RUST_LOG` overrides the level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Map a failure to the message shown to the user and the process exit code.
fn report(err: &anyhow::Error) -> (String, u8) {
    match err.downcast_ref::<WeatherError>() {
        Some(WeatherError::Usage(reason)) => (format!("Error: {reason}\n{}", cli::usage()), 2),
        Some(WeatherError::CityNotFound(city)) => {
            (format!("Error: invalid city entered ({city})"), 3)
        }
        Some(e) if e.is_storage() => (format!("Error: weather cache unavailable: {e}"), 4),
        Some(e) => (format!("Error: {e}"), 1),
        None => (format!("Error: {err:#}"), 1),
    }
}
