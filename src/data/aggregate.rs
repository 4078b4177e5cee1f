use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use serde::Serialize;

use super::filter::{filtered, CrimeFilter, CrimeSelection, LocationType};
use super::model::{CrimeDataset, Month, ALL_CRIMES};

/// The normalised rate is expressed per 1,000 people (per km² of density).
pub const RATE_SCALE: f64 = 1000.0;

/// Default number of bars.
pub const DEFAULT_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// Ranking query (bar chart)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    #[default]
    Top,
    Bottom,
}

impl FromStr for Rank {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" | "highest" => Ok(Rank::Top),
            "bottom" | "lowest" => Ok(Rank::Bottom),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Raw crime counts.
    #[default]
    Total,
    /// Count divided by population density, see [`RATE_SCALE`].
    Normalised,
}

impl FromStr for Metric {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "total" | "count" => Ok(Metric::Total),
            "normalised" | "normalized" | "rate" => Ok(Metric::Normalised),
            _ => Err(()),
        }
    }
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Total => "Total Crimes",
            Metric::Normalised => "Crime Rate (per 1,000 people per km^2)",
        }
    }
}

/// Everything the bar chart controls select.
#[derive(Debug, Clone, PartialEq)]
pub struct RankQuery {
    pub location_type: LocationType,
    pub filter: CrimeFilter,
    pub rank: Rank,
    pub limit: usize,
    pub metric: Metric,
}

impl Default for RankQuery {
    fn default() -> Self {
        Self {
            location_type: LocationType::default(),
            filter: CrimeFilter::default(),
            rank: Rank::default(),
            limit: DEFAULT_LIMIT,
            metric: Metric::default(),
        }
    }
}

/// One bar: a location and its aggregate figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedLocation {
    pub location: String,
    pub count: u64,
    /// Mean population density over the location's matching rows.
    pub population: Option<f64>,
    /// `count / population * RATE_SCALE`; `None` without a usable population.
    pub rate: Option<f64>,
}

impl RankedLocation {
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Total => Some(self.count as f64),
            Metric::Normalised => self.rate,
        }
    }
}

#[derive(Default)]
struct GroupAcc {
    count: u64,
    density_sum: f64,
    density_n: usize,
}

/// Group matching rows by location, rank them and keep the first `limit`.
///
/// Ordering is descending for [`Rank::Top`] and ascending for
/// [`Rank::Bottom`]; equal values fall back to the location name so the
/// output is deterministic.  Under [`Metric::Normalised`] locations without a
/// rate are left out.
pub fn rank_locations(dataset: &CrimeDataset, query: &RankQuery) -> Vec<RankedLocation> {
    let mut groups: HashMap<&str, GroupAcc> = HashMap::new();

    for rec in filtered(dataset, &query.filter) {
        let acc = groups.entry(query.location_type.key(rec)).or_default();
        acc.count += 1;
        if let Some(d) = rec.population_density {
            acc.density_sum += d;
            acc.density_n += 1;
        }
    }

    let mut ranked: Vec<(f64, RankedLocation)> = groups
        .into_iter()
        .filter_map(|(location, acc)| {
            let population = (acc.density_n > 0).then(|| acc.density_sum / acc.density_n as f64);
            let rate = population
                .filter(|p| *p > 0.0)
                .map(|p| acc.count as f64 / p * RATE_SCALE);
            let entry = RankedLocation {
                location: location.to_string(),
                count: acc.count,
                population,
                rate,
            };
            Some((entry.value(query.metric)?, entry))
        })
        .collect();

    ranked.sort_by(|(va, a), (vb, b)| {
        rank_order(query.rank, *va, *vb).then_with(|| a.location.cmp(&b.location))
    });
    ranked.truncate(query.limit);

    ranked.into_iter().map(|(_, entry)| entry).collect()
}

// ---------------------------------------------------------------------------
// Time series query
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeriesQuery {
    pub location_type: LocationType,
    pub locations: Vec<String>,
    pub crimes: CrimeSelection,
}

/// What a series' colour is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKey {
    Location,
    CrimeType,
}

/// Monthly counts for one (location, crime type) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub location: String,
    pub crime_type: String,
    /// Sorted by month.
    pub points: Vec<(Month, u64)>,
}

impl Series {
    pub fn key(&self, key: SeriesKey) -> &str {
        match key {
            SeriesKey::Location => &self.location,
            SeriesKey::CrimeType => &self.crime_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub series: Vec<Series>,
    pub color_by: SeriesKey,
    /// All locations of the requested granularity, for the dropdown.
    pub location_options: Vec<String>,
    /// The selection actually plotted, after fallback.
    pub selected: Vec<String>,
}

/// Monthly crime counts for the selected locations.
///
/// An empty selection, or one naming a location that does not exist at the
/// requested granularity, falls back to the first available location.
pub fn time_series(dataset: &CrimeDataset, query: &TimeSeriesQuery) -> TimeSeries {
    let options = query.location_type.options(dataset);

    let valid = !query.locations.is_empty()
        && query
            .locations
            .iter()
            .all(|loc| options.binary_search(loc).is_ok());
    let selected: Vec<String> = if valid {
        query.locations.clone()
    } else {
        options.first().cloned().into_iter().collect()
    };

    // (location, crime type) → month → count
    let mut grouped: BTreeMap<(&str, &str), BTreeMap<Month, u64>> = BTreeMap::new();
    for rec in &dataset.records {
        let location = query.location_type.key(rec);
        if !selected.iter().any(|s| s == location) || !query.crimes.matches(&rec.crime_type) {
            continue;
        }
        let crime_type = if query.crimes.is_all() {
            ALL_CRIMES
        } else {
            rec.crime_type.as_str()
        };
        *grouped
            .entry((location, crime_type))
            .or_default()
            .entry(rec.month)
            .or_default() += 1;
    }

    let color_by = match &query.crimes {
        CrimeSelection::Only(set) if set.len() > 1 => SeriesKey::CrimeType,
        _ => SeriesKey::Location,
    };

    let series = grouped
        .into_iter()
        .map(|((location, crime_type), months)| Series {
            location: location.to_string(),
            crime_type: crime_type.to_string(),
            points: months.into_iter().collect(),
        })
        .collect();

    TimeSeries {
        series,
        color_by,
        location_options: options.to_vec(),
        selected,
    }
}

// ---------------------------------------------------------------------------
// Map lookup
// ---------------------------------------------------------------------------

/// A selected common location with its mean coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatedPoint {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Position in the user's selection, drives the palette colour.
    pub selection_index: usize,
}

/// Resolve selected common locations to coordinates, keeping selection order.
/// Locations without coordinates are skipped.
pub fn locate(dataset: &CrimeDataset, selected: &[String]) -> Vec<LocatedPoint> {
    selected
        .iter()
        .enumerate()
        .filter_map(|(i, loc)| {
            let &(latitude, longitude) = dataset.coordinates.get(loc)?;
            Some(LocatedPoint {
                location: loc.clone(),
                latitude,
                longitude,
                selection_index: i,
            })
        })
        .collect()
}

/// Ordering of two metric values under a rank direction.
pub fn rank_order(rank: Rank, a: f64, b: f64) -> Ordering {
    match rank {
        Rank::Top => b.total_cmp(&a),
        Rank::Bottom => a.total_cmp(&b),
    }
}
