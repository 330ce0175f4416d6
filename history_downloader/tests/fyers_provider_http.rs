use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use history_downloader::{
    history::{FetchOutcome, HistoryFetcher},
    models::{date_range::DateRange, resolution::Resolution},
    providers::{
        ProviderError, ProviderInitError,
        fyers_rest::{FyersCredentials, FyersProvider, FyersSettings},
    },
};
use httpmock::prelude::*;
use serial_test::serial;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn provider(server: &MockServer) -> FyersProvider {
    let settings = FyersSettings {
        base_url: server.base_url(),
        timeout: Duration::from_secs(5),
        ..FyersSettings::default()
    };
    FyersProvider::new(&FyersCredentials::new("APP-100", "secret-token"), &settings).unwrap()
}

#[tokio::test]
async fn windows_are_requested_with_auth_and_date_params() {
    let server = MockServer::start_async().await;
    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/data/history")
                .header("authorization", "APP-100:secret-token")
                .query_param("symbol", "NSE:SBIN-EQ")
                .query_param("resolution", "D")
                .query_param("date_format", "1")
                .query_param("cont_flag", "1")
                .query_param("range_from", "2020-01-01")
                .query_param("range_to", "2020-04-10");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"s":"ok","candles":[[1577836800,332.95,335.95,332.15,334.45,9814947]]}"#);
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/data/history")
                .query_param("range_from", "2020-04-11")
                .query_param("range_to", "2020-05-01");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"s":"ok","candles":[[1586563200,190.0,195.5,188.1,193.2,41000000]]}"#);
        })
        .await;

    let fetcher = HistoryFetcher::new(Arc::new(provider(&server)));
    let range = DateRange::new(date(2020, 1, 1), date(2020, 5, 1)).unwrap();
    let outcome = fetcher.fetch("NSE:SBIN-EQ", &range, Resolution::Day).await.unwrap();

    first.assert_async().await;
    second.assert_async().await;
    let FetchOutcome::Rows(series) = outcome else {
        panic!("expected rows");
    };
    let closes: Vec<f64> = series.candles.iter().map(|c| c.close).collect();
    assert_eq!(closes, [334.45, 193.2]);
}

#[tokio::test]
async fn no_data_is_an_empty_outcome() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/data/history");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"s":"no_data","candles":[],"message":""}"#);
        })
        .await;

    let fetcher = HistoryFetcher::new(Arc::new(provider(&server)));
    let day = date(2020, 1, 1);
    let range = DateRange::new(day, day).unwrap();
    let outcome = fetcher.fetch("NSE:SBIN-EQ", &range, Resolution::Day).await.unwrap();
    assert_eq!(outcome, FetchOutcome::Empty);
}

#[tokio::test]
async fn api_error_body_is_surfaced() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/data/history");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"s":"error","code":-300,"message":"Invalid symbol provided"}"#);
        })
        .await;

    let fetcher = HistoryFetcher::new(Arc::new(provider(&server)));
    let day = date(2020, 1, 1);
    let range = DateRange::new(day, day).unwrap();
    let err = fetcher
        .fetch("NSE:NOPE-EQ", &range, Resolution::Day)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid symbol provided"));
}

#[tokio::test]
async fn http_failure_status_is_an_api_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/data/history");
            then.status(401)
                .header("content-type", "application/json")
                .body(r#"{"s":"error","code":-16,"message":"Could not authenticate the user"}"#);
        })
        .await;

    let fetcher = HistoryFetcher::new(Arc::new(provider(&server)));
    let day = date(2020, 1, 1);
    let range = DateRange::new(day, day).unwrap();
    let err = fetcher
        .fetch("NSE:SBIN-EQ", &range, Resolution::Day)
        .await
        .unwrap_err();

    let history_downloader::history::FetchError::Window { source, .. } = err;
    match source {
        ProviderError::Api { code, message } => {
            assert_eq!(code, Some(-16));
            assert_eq!(message, "Could not authenticate the user");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
#[serial]
fn missing_credentials_fail_before_any_request() {
    unsafe {
        std::env::remove_var("FYERS_CLIENT_ID");
        std::env::set_var("FYERS_ACCESS_TOKEN", "token");
    }
    let err = FyersProvider::from_env(&FyersSettings::default())
        .err()
        .expect("missing client id must fail");
    assert!(matches!(err, ProviderInitError::MissingEnvVar(_)));
    assert!(err.to_string().contains("FYERS_CLIENT_ID"));

    unsafe { std::env::remove_var("FYERS_ACCESS_TOKEN") };
}
