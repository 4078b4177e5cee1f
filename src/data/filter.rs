use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::model::{CrimeDataset, CrimeRecord, Month, ALL_CRIMES};

// ---------------------------------------------------------------------------
// Location granularity
// ---------------------------------------------------------------------------

/// Which column rows are grouped by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    #[default]
    Lsoa,
    /// LSOAs combined by their common location name.
    Common,
}

impl LocationType {
    /// The grouping key of a record.
    pub fn key<'a>(&self, record: &'a CrimeRecord) -> &'a str {
        match self {
            LocationType::Lsoa => &record.lsoa_name,
            LocationType::Common => &record.common_location,
        }
    }

    /// Sorted unique locations of this granularity.
    pub fn options<'a>(&self, dataset: &'a CrimeDataset) -> &'a [String] {
        match self {
            LocationType::Lsoa => &dataset.lsoa_names,
            LocationType::Common => &dataset.common_locations,
        }
    }

    /// Axis label for charts.
    pub fn label(&self) -> &'static str {
        match self {
            LocationType::Lsoa => "LSOA name",
            LocationType::Common => "Common Location",
        }
    }
}

impl FromStr for LocationType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lsoa" => Ok(LocationType::Lsoa),
            "common" | "combine" => Ok(LocationType::Common),
            _ => Err(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter predicates
// ---------------------------------------------------------------------------

/// Crime types a query is restricted to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CrimeSelection {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl CrimeSelection {
    /// Interpret a UI multi-select.  An empty selection, or one containing
    /// "All Crimes", means no restriction.
    pub fn from_selected<I, S>(selected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = selected.into_iter().map(Into::into).collect();
        if set.is_empty() || set.contains(ALL_CRIMES) {
            CrimeSelection::All
        } else {
            CrimeSelection::Only(set)
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, CrimeSelection::All)
    }

    pub fn matches(&self, crime_type: &str) -> bool {
        match self {
            CrimeSelection::All => true,
            CrimeSelection::Only(set) => set.contains(crime_type),
        }
    }
}

/// Inclusive month range.  A missing bound is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthRange {
    pub from: Option<Month>,
    pub to: Option<Month>,
}

impl MonthRange {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn single(month: Month) -> Self {
        Self {
            from: Some(month),
            to: Some(month),
        }
    }

    pub fn is_all(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn contains(&self, month: Month) -> bool {
        self.from.map_or(true, |f| month >= f) && self.to.map_or(true, |t| month <= t)
    }
}

impl fmt::Display for MonthRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.from, self.to) {
            (None, None) => write!(f, "All Months"),
            (Some(a), Some(b)) if a == b => write!(f, "{a}"),
            (Some(a), Some(b)) => write!(f, "{a} to {b}"),
            (Some(a), None) => write!(f, "from {a}"),
            (None, Some(b)) => write!(f, "up to {b}"),
        }
    }
}

/// Row predicate shared by every view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrimeFilter {
    pub months: MonthRange,
    pub crimes: CrimeSelection,
}

impl CrimeFilter {
    pub fn matches(&self, record: &CrimeRecord) -> bool {
        self.months.contains(record.month) && self.crimes.matches(&record.crime_type)
    }
}

/// Iterate the records that pass the filter, borrowing from the dataset.
pub fn filtered<'a>(
    dataset: &'a CrimeDataset,
    filter: &'a CrimeFilter,
) -> impl Iterator<Item = &'a CrimeRecord> + 'a {
    dataset.records.iter().filter(move |rec| filter.matches(rec))
}
