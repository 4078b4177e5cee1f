//! Query-string parsing for the API endpoints.
//!
//! Multi-selects arrive as repeated keys (`crime=Burglary&crime=Robbery`), so
//! handlers extract the raw pairs and the functions here turn them into typed
//! queries.

use std::str::FromStr;

use crate::data::aggregate::{RankQuery, TimeSeriesQuery, DEFAULT_LIMIT};
use crate::data::filter::{CrimeFilter, CrimeSelection, MonthRange};
use crate::data::model::Month;
use crate::error::QueryError;

/// Upper bound for `n`.
pub const MAX_LIMIT: usize = 100;

pub type Pairs = [(String, String)];

fn values<'a>(pairs: &'a Pairs, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    pairs
        .iter()
        .filter(move |(k, _)| k == key)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
}

/// Last non-empty value of a key.
fn last<'a>(pairs: &'a Pairs, key: &'a str) -> Option<&'a str> {
    values(pairs, key).last()
}

fn parse_enum<T: FromStr>(pairs: &Pairs, param: &'static str) -> Result<Option<T>, QueryError> {
    last(pairs, param)
        .map(|v| {
            v.parse().map_err(|_| QueryError::InvalidValue {
                param,
                value: v.to_string(),
            })
        })
        .transpose()
}

/// `all` is the same as leaving the month out.
fn parse_month(pairs: &Pairs, param: &'static str) -> Result<Option<Month>, QueryError> {
    match last(pairs, param) {
        None => Ok(None),
        Some(v) if v.eq_ignore_ascii_case("all") => Ok(None),
        Some(v) => v.parse().map(Some).map_err(|_| QueryError::InvalidMonth {
            param,
            value: v.to_string(),
        }),
    }
}

/// `month` selects a single month and takes precedence over `from`/`to`.
fn month_range(pairs: &Pairs) -> Result<MonthRange, QueryError> {
    if last(pairs, "month").is_some() {
        return Ok(parse_month(pairs, "month")?.map_or_else(MonthRange::all, MonthRange::single));
    }
    let range = MonthRange {
        from: parse_month(pairs, "from")?,
        to: parse_month(pairs, "to")?,
    };
    if let (Some(from), Some(to)) = (range.from, range.to) {
        if from > to {
            return Err(QueryError::InvertedRange {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
    }
    Ok(range)
}

fn crime_selection(pairs: &Pairs) -> CrimeSelection {
    CrimeSelection::from_selected(values(pairs, "crime"))
}

/// Selected locations in request order, without duplicates.
pub fn locations(pairs: &Pairs) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for loc in values(pairs, "loc") {
        if !out.iter().any(|l| l == loc) {
            out.push(loc.to_string());
        }
    }
    out
}

/// Parameters of `/api/bar`.
pub fn rank_query(pairs: &Pairs) -> Result<RankQuery, QueryError> {
    let limit = match last(pairs, "n") {
        None => DEFAULT_LIMIT,
        Some(v) => v.parse::<usize>().map_err(|_| QueryError::InvalidValue {
            param: "n",
            value: v.to_string(),
        })?,
    };
    if limit == 0 || limit > MAX_LIMIT {
        return Err(QueryError::LimitOutOfRange {
            got: limit,
            max: MAX_LIMIT,
        });
    }

    Ok(RankQuery {
        location_type: parse_enum(pairs, "location")?.unwrap_or_default(),
        filter: CrimeFilter {
            months: month_range(pairs)?,
            crimes: crime_selection(pairs),
        },
        rank: parse_enum(pairs, "rank")?.unwrap_or_default(),
        limit,
        metric: parse_enum(pairs, "metric")?.unwrap_or_default(),
    })
}

/// Parameters of `/api/timeseries`.
pub fn time_series_query(pairs: &Pairs) -> Result<TimeSeriesQuery, QueryError> {
    Ok(TimeSeriesQuery {
        location_type: parse_enum(pairs, "location")?.unwrap_or_default(),
        locations: locations(pairs),
        crimes: crime_selection(pairs),
    })
}
