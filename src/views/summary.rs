//! Headline figures: the global summary and per-country profiles.

use chrono::NaiveDate;
use serde::Serialize;

use crate::data::Dataset;
use crate::domain::{DateRange, Record};

pub const TOTAL_CASES: &str = "total_cases";
pub const TOTAL_DEATHS: &str = "total_deaths";
pub const TOTAL_VACCINATIONS: &str = "total_vaccinations";

/// Metrics shown on a country profile, in display order.
pub const PROFILE_METRICS: [&str; 7] = [
    TOTAL_CASES,
    TOTAL_DEATHS,
    TOTAL_VACCINATIONS,
    "people_fully_vaccinated_per_hundred",
    "total_cases_per_million",
    "total_deaths_per_million",
    "population",
];

/// Country-level totals over a date window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalSummary {
    /// Last date with any country record inside the window.
    pub as_of: Option<NaiveDate>,
    /// Countries with at least one record inside the window.
    pub countries: usize,
    pub total_cases: Option<f64>,
    pub total_deaths: Option<f64>,
    pub total_vaccinations: Option<f64>,
}

/// Sum each country's latest reported cumulative figures within `range`.
///
/// Aggregates are excluded so rollups are not double counted. A total is
/// missing when no country reports the metric in the window.
pub fn global_summary(dataset: &Dataset, range: DateRange) -> GlobalSummary {
    let columns = [TOTAL_CASES, TOTAL_DEATHS, TOTAL_VACCINATIONS].map(|m| dataset.schema().index_of(m));
    let mut totals: [Option<f64>; 3] = [None; 3];
    let mut countries = 0;
    let mut as_of = None;

    for location in dataset.locations().filter(|l| !dataset.is_aggregate(l)) {
        let rows: Vec<&Record> = dataset
            .records_for(location)
            .iter()
            .filter(|r| range.contains(r.date))
            .collect();
        let Some(last) = rows.last() else { continue };

        countries += 1;
        as_of = as_of.max(Some(last.date));

        for (total, column) in totals.iter_mut().zip(columns) {
            if let Some(value) = column.and_then(|idx| last_value(&rows, idx)) {
                *total = Some(total.unwrap_or(0.0) + value);
            }
        }
    }

    let [total_cases, total_deaths, total_vaccinations] = totals;
    GlobalSummary {
        as_of,
        countries,
        total_cases,
        total_deaths,
        total_vaccinations,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricValue {
    pub metric: String,
    pub value: Option<f64>,
}

/// Latest known state of a single location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryProfile {
    pub location: String,
    pub iso_code: String,
    pub continent: String,
    pub last_date: NaiveDate,
    pub is_aggregate: bool,
    pub metrics: Vec<MetricValue>,
}

/// Profile of `location`: its last record date and the last reported value of
/// each headline metric. `None` for an unknown location.
pub fn country_profile(dataset: &Dataset, location: &str) -> Option<CountryProfile> {
    let records = dataset.records_for(location);
    let last = records.last()?;
    let rows: Vec<&Record> = records.iter().collect();

    let metrics = PROFILE_METRICS
        .iter()
        .map(|metric| MetricValue {
            metric: metric.to_string(),
            value: dataset
                .schema()
                .index_of(metric)
                .and_then(|idx| last_value(&rows, idx)),
        })
        .collect();

    Some(CountryProfile {
        location: last.location.clone(),
        iso_code: last.iso_code.clone(),
        continent: last.continent.clone(),
        last_date: last.date,
        is_aggregate: dataset.is_aggregate(location),
        metrics,
    })
}

fn last_value(rows: &[&Record], idx: usize) -> Option<f64> {
    rows.iter().rev().find_map(|r| r.value(idx))
}
