//! End-to-end lookup against a mock API and a file-backed cache.

use std::time::Duration;

use cityweather_core::{
    Source, WeatherError, WeatherRecord, WeatherStore, lookup_weather,
    provider::openweather::OpenWeatherFetcher, render_listing,
};
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OBSERVED_AT: i64 = 1_700_000_000;
const TTL: i64 = 600;

fn mock_fetcher(server: &MockServer, api_key: Option<&str>) -> OpenWeatherFetcher {
    OpenWeatherFetcher::new(server.uri(), api_key.map(str::to_string), Duration::from_secs(5))
        .unwrap()
}

async fn server_with_lyon() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("q", "Lyon"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "Lyon",
            "dt": OBSERVED_AT,
            "main": {"temp": 12.5},
            "wind": {"speed": 3.2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("q", "Zzzqx"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&server)
        .await;

    server
}

#[tokio::test]
async fn second_run_within_ttl_is_served_from_disk() {
    let server = server_with_lyon().await;
    let fetcher = mock_fetcher(&server, Some("KEY"));
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("weather.db");

    {
        let store = WeatherStore::open(&db).unwrap();
        let first = lookup_weather("Lyon", &store, &fetcher, TTL, OBSERVED_AT + 10)
            .await
            .unwrap();
        assert!(matches!(first.source, Source::Fetched(_)));
    }

    // a new connection, like a new process invocation
    let store = WeatherStore::open(&db).unwrap();
    let second = lookup_weather("Lyon", &store, &fetcher, TTL, OBSERVED_AT + 20)
        .await
        .unwrap();

    assert_eq!(second.source, Source::Cached);
    let report = render_listing(&second.listing);
    assert!(report.contains("Lyon"));
    assert!(report.contains("12.5"));
    assert!(report.contains("3.2"));
    // `expect(1)` on the Lyon mock is verified when the server drops
}

#[tokio::test]
async fn unknown_city_does_not_touch_the_cache() {
    let server = server_with_lyon().await;
    let fetcher = mock_fetcher(&server, Some("KEY"));
    let store = WeatherStore::open_in_memory().unwrap();

    lookup_weather("Lyon", &store, &fetcher, TTL, OBSERVED_AT)
        .await
        .unwrap();
    let err = lookup_weather("Zzzqx", &store, &fetcher, TTL, OBSERVED_AT)
        .await
        .unwrap_err();

    assert!(matches!(err, WeatherError::CityNotFound(_)));
    assert_eq!(store.len().unwrap(), 1);
}

#[tokio::test]
async fn cache_hit_works_without_an_api_key() {
    let server = MockServer::start().await;
    let fetcher = mock_fetcher(&server, None);
    let store = WeatherStore::open_in_memory().unwrap();
    store.ensure_schema().unwrap();
    let paris = WeatherRecord::new("Paris", OBSERVED_AT, 15.0, 4.0).unwrap();
    store.insert(&paris).unwrap();

    let lookup = lookup_weather("Paris", &store, &fetcher, TTL, OBSERVED_AT + 10)
        .await
        .unwrap();

    assert_eq!(lookup.source, Source::Cached);
    assert_eq!(lookup.listing, vec![paris]);

    let err = lookup_weather("Lyon", &store, &fetcher, TTL, OBSERVED_AT + 10)
        .await
        .unwrap_err();
    assert!(matches!(err, WeatherError::MissingApiKey));
    assert_eq!(store.len().unwrap(), 1);
}
