use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Column names of the merged crime table
// ---------------------------------------------------------------------------

pub mod columns {
    pub const CRIME_ID: &str = "Crime ID";
    pub const MONTH: &str = "Month";
    pub const LSOA_CODE: &str = "LSOA code";
    pub const LSOA_NAME: &str = "LSOA name";
    pub const CRIME_TYPE: &str = "Crime type";
    pub const LATITUDE: &str = "Latitude";
    pub const LONGITUDE: &str = "Longitude";
    pub const POPULATION_DENSITY: &str = "Population Density (people per km^2)";
}

/// Label used by the UI for "no crime type filter".
pub const ALL_CRIMES: &str = "All Crimes";

// ---------------------------------------------------------------------------
// Month – a calendar month, the time resolution of the source data
// ---------------------------------------------------------------------------

/// A `YYYY-MM` month.  Field order makes the derived `Ord` chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a month (expected YYYY-MM)")]
pub struct ParseMonthError(pub String);

impl Month {
    pub fn new(year: i32, month: u8) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }
}

impl FromStr for Month {
    type Err = ParseMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMonthError(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(err)?;
        let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if year.len() != 4 || !(1..=2).contains(&month.len()) || !digits(year) || !digits(month) {
            return Err(err());
        }
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u8 = month.parse().map_err(|_| err())?;
        Month::new(year, month).ok_or_else(err)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Common Location – LSOA name without its trailing area code
// ---------------------------------------------------------------------------

static LSOA_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s\d+[A-Z]*$").expect("static regex"));

/// `"Leeds 001A"` → `"Leeds"`.  Names without a code are returned unchanged.
pub fn common_location_name(lsoa_name: &str) -> String {
    LSOA_SUFFIX.replace(lsoa_name, "").into_owned()
}

// ---------------------------------------------------------------------------
// CrimeRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single reported crime.
#[derive(Debug, Clone, PartialEq)]
pub struct CrimeRecord {
    pub crime_id: Option<String>,
    pub month: Month,
    pub lsoa_code: Option<String>,
    pub lsoa_name: String,
    /// Derived from `lsoa_name` at construction.
    pub common_location: String,
    pub crime_type: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// People per km², used as the denominator of the normalised rate.
    pub population_density: Option<f64>,
}

impl CrimeRecord {
    pub fn new(month: Month, lsoa_name: impl Into<String>, crime_type: impl Into<String>) -> Self {
        let lsoa_name = lsoa_name.into();
        Self {
            crime_id: None,
            month,
            lsoa_code: None,
            common_location: common_location_name(&lsoa_name),
            lsoa_name,
            crime_type: crime_type.into(),
            latitude: None,
            longitude: None,
            population_density: None,
        }
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn with_population_density(mut self, density: f64) -> Self {
        self.population_density = Some(density);
        self
    }

    /// Both coordinates, if the row has them.
    pub fn position(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

// ---------------------------------------------------------------------------
// CrimeDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The loaded table plus the indexes the dropdowns and the map need.
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct CrimeDataset {
    pub records: Vec<CrimeRecord>,
    pub months: Vec<Month>,
    pub crime_types: Vec<String>,
    pub lsoa_names: Vec<String>,
    pub common_locations: Vec<String>,
    /// Mean (latitude, longitude) per common location.
    pub coordinates: BTreeMap<String, (f64, f64)>,
}

impl CrimeDataset {
    pub fn from_records(records: Vec<CrimeRecord>) -> Self {
        let mut months = BTreeSet::new();
        let mut crime_types = BTreeSet::new();
        let mut lsoa_names = BTreeSet::new();
        let mut common_locations = BTreeSet::new();
        // location → (lat sum, lon sum, n)
        let mut coord_sums: BTreeMap<&str, (f64, f64, usize)> = BTreeMap::new();

        for rec in &records {
            months.insert(rec.month);
            crime_types.insert(rec.crime_type.clone());
            lsoa_names.insert(rec.lsoa_name.clone());
            common_locations.insert(rec.common_location.clone());
            if let Some((lat, lon)) = rec.position() {
                let entry = coord_sums
                    .entry(rec.common_location.as_str())
                    .or_insert((0.0, 0.0, 0));
                entry.0 += lat;
                entry.1 += lon;
                entry.2 += 1;
            }
        }

        let coordinates = coord_sums
            .into_iter()
            .map(|(loc, (lat, lon, n))| (loc.to_string(), (lat / n as f64, lon / n as f64)))
            .collect();

        CrimeDataset {
            months: months.into_iter().collect(),
            crime_types: crime_types.into_iter().collect(),
            lsoa_names: lsoa_names.into_iter().collect(),
            common_locations: common_locations.into_iter().collect(),
            coordinates,
            records,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
