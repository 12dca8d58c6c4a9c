//! Shared domain types.
//!
//! These types are kept small and serializable so a presentation layer can
//! consume them directly (JSON, tables, charts) without touching the dataset.

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const LOCATION: &str = "location";
pub const ISO_CODE: &str = "iso_code";
pub const CONTINENT: &str = "continent";
pub const DATE: &str = "date";
pub const POPULATION: &str = "population";

/// Columns that identify a row rather than measure something.
pub const IDENTITY_COLUMNS: [&str; 4] = [ISO_CODE, CONTINENT, LOCATION, DATE];

/// One cleaned source row: a location on a date plus its metric values.
///
/// `values` is positional against the owning dataset's schema; `None` is a
/// missing cell, which is never the same thing as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub location: String,
    pub iso_code: String,
    pub continent: String,
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
}

impl Record {
    pub fn value(&self, idx: usize) -> Option<f64> {
        self.values.get(idx).copied().flatten()
    }
}

/// A single point of a per-location time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(date: NaiveDate, value: Option<f64>) -> Self {
        Self { date, value }
    }
}

/// Inclusive date window. An open bound matches everything on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }

    /// True when the bounds are inverted, so no date can match.
    pub fn is_empty(&self) -> bool {
        matches!((self.start, self.end), (Some(s), Some(e)) if s > e)
    }
}

/// Temporal cadence of a derived series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    #[default]
    Daily,
    /// Periods end on Sunday.
    Weekly,
    /// Periods end on the last day of the month.
    Monthly,
}

/// Normalization basis for a metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Basis {
    #[default]
    Absolute,
    PerMillion,
    PerHundred,
}

impl Basis {
    /// Column holding `metric` in this basis, following the source's naming.
    pub fn column_name(self, metric: &str) -> String {
        match self {
            Basis::Absolute => metric.to_string(),
            Basis::PerMillion => format!("{metric}_per_million"),
            Basis::PerHundred => format!("{metric}_per_hundred"),
        }
    }

    pub fn scale(self) -> Option<f64> {
        match self {
            Basis::Absolute => None,
            Basis::PerMillion => Some(1_000_000.0),
            Basis::PerHundred => Some(100.0),
        }
    }
}

/// Which locations a ranking considers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RankMode {
    /// Real countries only; every aggregate is excluded.
    #[default]
    Countries,
    /// Continent rollups only.
    Continents,
}

/// How a raw per-location series is turned into a derived one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeriveOptions {
    pub cadence: Cadence,
    /// Trailing rolling-mean window in periods; 1 disables smoothing.
    pub window: usize,
}

impl Default for DeriveOptions {
    fn default() -> Self {
        Self {
            cadence: Cadence::Daily,
            window: DEFAULT_WINDOW,
        }
    }
}

pub const DEFAULT_WINDOW: usize = 7;

/// A location's metric after reindexing, resampling and smoothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSeries {
    pub location: String,
    pub metric: String,
    pub cadence: Cadence,
    pub window: usize,
    pub points: Vec<Observation>,
}

/// One row of a ranking view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    pub location: String,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let range = DateRange::new(Some(d(2021, 1, 1)), Some(d(2021, 1, 31)));
        assert!(range.contains(d(2021, 1, 1)));
        assert!(range.contains(d(2021, 1, 31)));
        assert!(!range.contains(d(2021, 2, 1)));
        assert!(DateRange::all().contains(d(1999, 12, 31)));
    }

    #[test]
    fn inverted_range_is_empty() {
        let range = DateRange::new(Some(d(2021, 2, 1)), Some(d(2021, 1, 1)));
        assert!(range.is_empty());
        assert!(!range.contains(d(2021, 1, 15)));
    }

    #[test]
    fn basis_column_names_follow_source_convention() {
        assert_eq!(Basis::Absolute.column_name("total_cases"), "total_cases");
        assert_eq!(Basis::PerMillion.column_name("total_cases"), "total_cases_per_million");
        assert_eq!(Basis::PerHundred.column_name("people_vaccinated"), "people_vaccinated_per_hundred");
    }
}
