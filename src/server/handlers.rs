use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use serde_json::json;

use super::params::{self, Pairs};
use crate::data::aggregate::{locate, rank_locations, time_series};
use crate::data::model::{Month, ALL_CRIMES};
use crate::error::QueryError;
use crate::state::AppState;
use crate::views::{bar::bar_figure, map::map_view, timeseries::line_figure};

/// Raw query pairs, so repeated keys survive extraction.
pub type QueryPairs = web::Query<Vec<(String, String)>>;

fn pairs(query: &QueryPairs) -> &Pairs {
    query.as_slice()
}

pub async fn health(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "records": state.dataset.len(),
        "source": state.source.display().to_string(),
    }))
}

#[derive(Debug, Serialize)]
struct DashboardOptions<'a> {
    records: usize,
    months: &'a [Month],
    /// "All Crimes" first, then the crime types of the dataset.
    crime_types: Vec<&'a str>,
    lsoa_names: &'a [String],
    common_locations: &'a [String],
}

/// Values for every dropdown on the page.
pub async fn options(state: web::Data<AppState>) -> impl Responder {
    let ds = &state.dataset;
    let crime_types = std::iter::once(ALL_CRIMES)
        .chain(ds.crime_types.iter().map(String::as_str))
        .collect();

    HttpResponse::Ok().json(DashboardOptions {
        records: ds.len(),
        months: &ds.months,
        crime_types,
        lsoa_names: &ds.lsoa_names,
        common_locations: &ds.common_locations,
    })
}

/// Top/bottom N locations.
pub async fn bar(
    state: web::Data<AppState>,
    query: QueryPairs,
) -> Result<HttpResponse, QueryError> {
    let rank = params::rank_query(pairs(&query))?;
    let results = rank_locations(&state.dataset, &rank);
    log::debug!("bar query {rank:?} → {} locations", results.len());

    Ok(HttpResponse::Ok().json(json!({
        "figure": bar_figure(&results, &rank),
        "results": results,
    })))
}

/// Monthly counts for the selected locations.
pub async fn timeseries(
    state: web::Data<AppState>,
    query: QueryPairs,
) -> Result<HttpResponse, QueryError> {
    let ts_query = params::time_series_query(pairs(&query))?;
    let ts = time_series(&state.dataset, &ts_query);
    log::debug!(
        "time series for {:?} → {} series",
        ts.selected,
        ts.series.len()
    );

    Ok(HttpResponse::Ok().json(json!({
        "figure": line_figure(&ts),
        "location_options": ts.location_options,
        "selected": ts.selected,
    })))
}

/// Markers for the selected common locations.
pub async fn map(state: web::Data<AppState>, query: QueryPairs) -> impl Responder {
    let selected = params::locations(pairs(&query));
    let points = locate(&state.dataset, &selected);
    log::debug!("map: {} of {} locations placed", points.len(), selected.len());

    HttpResponse::Ok().json(map_view(&points))
}
