//! HTTP API tests
//!
//! Run the real route table against a small in-memory dataset.

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{web, App};
use serde_json::Value;
use std::io::Write;

use crime_dashboard::data::model::{CrimeDataset, CrimeRecord, Month};
use crime_dashboard::error::LoadError;
use crime_dashboard::server;
use crime_dashboard::state::AppState;

// =============================================================================
// Test Setup
// =============================================================================

fn month(s: &str) -> Month {
    s.parse().expect("valid month")
}

/// Totals: Leeds 001A 5, York 001A 3, Leeds 002B 2, Cardiff 001A 1.
/// Rates: Leeds 002B 20, Leeds 001A 5, Cardiff 001A 2, York 001A none.
fn sample_dataset() -> CrimeDataset {
    let mut records = Vec::new();
    let leeds_a = |crime: &str| {
        CrimeRecord::new(month("2025-01"), "Leeds 001A", crime)
            .with_coordinates(53.80, -1.55)
            .with_population_density(1000.0)
    };
    records.extend((0..3).map(|_| leeds_a("Burglary")));
    records.extend((0..2).map(|_| leeds_a("Drugs")));
    records.extend((0..2).map(|_| {
        CrimeRecord::new(month("2025-02"), "Leeds 002B", "Burglary")
            .with_coordinates(53.82, -1.53)
            .with_population_density(100.0)
    }));
    records.extend((0..3).map(|_| {
        CrimeRecord::new(month("2025-03"), "York 001A", "Drugs").with_coordinates(53.96, -1.08)
    }));
    records.push(
        CrimeRecord::new(month("2025-01"), "Cardiff 001A", "Burglary")
            .with_population_density(500.0),
    );
    CrimeDataset::from_records(records)
}

async fn get_json(uri: &str) -> (StatusCode, Value) {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(AppState::from_dataset(sample_dataset())))
            .configure(server::routes),
    )
    .await;
    let resp = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

fn bar_locations(body: &Value) -> Vec<&str> {
    body["results"]
        .as_array()
        .expect("results array")
        .iter()
        .map(|r| r["location"].as_str().expect("location string"))
        .collect()
}

// =============================================================================
// Health and options
// =============================================================================

#[actix_web::test]
async fn test_health_reports_record_count() {
    let (status, body) = get_json("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["records"], 11);
}

#[actix_web::test]
async fn test_options_lists_dropdown_values() {
    let (status, body) = get_json("/api/options").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["crime_types"][0], "All Crimes");
    assert_eq!(
        body["months"],
        serde_json::json!(["2025-01", "2025-02", "2025-03"])
    );
    assert_eq!(
        body["common_locations"],
        serde_json::json!(["Cardiff", "Leeds", "York"])
    );
    assert_eq!(body["lsoa_names"].as_array().map(Vec::len), Some(4));
}

// =============================================================================
// Bar chart
// =============================================================================

#[actix_web::test]
async fn test_bar_top_and_bottom_totals() {
    let (status, body) = get_json("/api/bar?n=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bar_locations(&body), vec!["Leeds 001A", "York 001A"]);
    assert_eq!(body["results"][0]["count"], 5);

    let (_, body) = get_json("/api/bar?n=2&rank=bottom").await;
    assert_eq!(bar_locations(&body), vec!["Cardiff 001A", "Leeds 002B"]);
}

#[actix_web::test]
async fn test_bar_defaults_show_every_location_under_ten() {
    let (_, body) = get_json("/api/bar").await;
    assert_eq!(bar_locations(&body).len(), 4);
    let title = body["figure"]["layout"]["title"]["text"]
        .as_str()
        .expect("title text");
    assert!(title.contains("All Months"), "title was {title}");
}

#[actix_web::test]
async fn test_bar_normalised_skips_locations_without_population() {
    let (_, body) = get_json("/api/bar?metric=normalised").await;
    assert_eq!(
        bar_locations(&body),
        vec!["Leeds 002B", "Leeds 001A", "Cardiff 001A"]
    );
    let rate = body["results"][0]["rate"].as_f64().expect("rate");
    assert!((rate - 20.0).abs() < 1e-9);
}

#[actix_web::test]
async fn test_bar_combined_locations() {
    let (_, body) = get_json("/api/bar?location=common").await;
    assert_eq!(bar_locations(&body), vec!["Leeds", "York", "Cardiff"]);
    assert_eq!(body["results"][0]["count"], 7);
}

#[actix_web::test]
async fn test_bar_crime_and_month_filters() {
    let (_, body) = get_json("/api/bar?crime=Drugs").await;
    assert_eq!(bar_locations(&body), vec!["York 001A", "Leeds 001A"]);

    let (_, body) = get_json("/api/bar?crime=Drugs&crime=Burglary&month=2025-02").await;
    assert_eq!(bar_locations(&body), vec!["Leeds 002B"]);

    let (_, body) = get_json("/api/bar?from=2025-02&to=2025-03").await;
    assert_eq!(bar_locations(&body), vec!["York 001A", "Leeds 002B"]);
}

#[actix_web::test]
async fn test_bar_empty_selection_gives_empty_figure() {
    let (status, body) = get_json("/api/bar?month=2024-12").await;
    assert_eq!(status, StatusCode::OK);
    assert!(bar_locations(&body).is_empty());
    assert_eq!(body["figure"]["data"][0]["y"], serde_json::json!([]));
}

#[actix_web::test]
async fn test_bar_rejects_bad_parameters() {
    for uri in [
        "/api/bar?n=0",
        "/api/bar?n=101",
        "/api/bar?n=ten",
        "/api/bar?rank=sideways",
        "/api/bar?metric=per-capita",
        "/api/bar?month=2025-13",
        "/api/bar?month=2025-%2B1",
        "/api/bar?from=%2B025-01",
        "/api/bar?from=2025-03&to=2025-01",
    ] {
        let (status, body) = get_json(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
}

// =============================================================================
// Time series
// =============================================================================

#[actix_web::test]
async fn test_timeseries_falls_back_to_first_location() {
    let (status, body) = get_json("/api/timeseries").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selected"], serde_json::json!(["Cardiff 001A"]));
    assert_eq!(body["location_options"].as_array().map(Vec::len), Some(4));
    assert_eq!(body["figure"]["data"].as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn test_timeseries_common_location_counts_per_month() {
    let (_, body) = get_json("/api/timeseries?location=common&loc=Leeds").await;
    assert_eq!(body["selected"], serde_json::json!(["Leeds"]));
    let trace = &body["figure"]["data"][0];
    assert_eq!(trace["x"], serde_json::json!(["2025-01", "2025-02"]));
    assert_eq!(trace["y"], serde_json::json!([5, 2]));
}

#[actix_web::test]
async fn test_timeseries_one_series_per_crime_type() {
    let (_, body) =
        get_json("/api/timeseries?loc=Leeds%20001A&crime=Burglary&crime=Drugs").await;
    assert_eq!(body["figure"]["data"].as_array().map(Vec::len), Some(2));
}

// =============================================================================
// Map
// =============================================================================

#[actix_web::test]
async fn test_map_places_located_selections_only() {
    let (status, body) = get_json("/api/map?loc=Leeds&loc=Cardiff&loc=York").await;
    assert_eq!(status, StatusCode::OK);
    let markers = body["markers"].as_array().expect("markers");
    let names: Vec<&str> = markers
        .iter()
        .map(|m| m["location"].as_str().expect("location"))
        .collect();
    assert_eq!(names, vec!["Leeds", "York"]);
    assert_ne!(markers[0]["color"], markers[1]["color"]);
    assert_eq!(body["legend"].as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn test_map_without_selection_is_empty() {
    let (_, body) = get_json("/api/map").await;
    assert_eq!(body["markers"], serde_json::json!([]));
    assert_eq!(body["center"], serde_json::json!([53.5, -1.5]));
}

// =============================================================================
// Page and startup
// =============================================================================

#[actix_web::test]
async fn test_index_serves_dashboard_page() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(AppState::from_dataset(CrimeDataset::default())))
            .configure(server::routes),
    )
    .await;
    let resp = test::call_service(&app, TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let html = String::from_utf8_lossy(&body);
    assert!(html.contains(
        "UK Crime Data Explorer (England, Wales &amp; Northern Ireland, Jan–Mar 2025)"
    ));
    assert!(html.contains(&format!(
        "Built by Sean Wujiw · crime-dashboard {}",
        env!("CARGO_PKG_VERSION")
    )));
    assert!(!html.contains("%DASHBOARD_VERSION%"));
    // Marker labels go through text nodes.
    assert!(html.contains(".bindPopup(textLabel(m.location))"));
    assert!(html.contains(".bindTooltip(textLabel(m.location))"));
}

/// `main` calls `AppState::load` before `server::run`, so this error ends the
/// process before anything binds.
#[test]
fn test_load_of_missing_data_file_is_not_found() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let err = AppState::load(&dir.path().join("crime_data_merged.csv")).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LoadError>(),
        Some(LoadError::NotFound(_))
    ));
}

#[actix_web::test]
async fn test_loaded_csv_is_served() {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("Failed to create temp file");
    writeln!(
        file,
        "Crime ID,Month,LSOA code,LSOA name,Crime type,Latitude,Longitude,Population Density (people per km^2)"
    )
    .unwrap();
    writeln!(file, "a1,2025-01,E01000001,Leeds 001A,Burglary,53.8,-1.55,1000").unwrap();
    writeln!(file, ",2025-01,E01000002,York 001A,Anti-social behaviour,53.9,-1.08,2000").unwrap();
    file.flush().unwrap();

    let state = AppState::load(file.path()).expect("load sample CSV");
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(server::routes),
    )
    .await;
    let resp = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["records"], 2);
    assert!(body["source"].as_str().is_some_and(|s| s.ends_with(".csv")));
}
