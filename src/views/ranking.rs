//! Top-N rankings at a single date.

use chrono::NaiveDate;

use crate::data::{Dataset, is_continent};
use crate::domain::{RankEntry, RankMode};
use crate::error::PipelineError;

pub const DEFAULT_TOP_N: usize = 10;

/// Rank locations by `metric` on exactly `at_date`.
///
/// Locations without a value on that date are left out. Ordering is by value
/// descending, ties broken by location name ascending so the output is stable.
/// `RankMode::Countries` never returns an aggregate; `RankMode::Continents`
/// ranks only the continent rollups.
pub fn top_n(
    dataset: &Dataset,
    metric: &str,
    n: usize,
    at_date: NaiveDate,
    mode: RankMode,
) -> Result<Vec<RankEntry>, PipelineError> {
    let idx = dataset.metric_index(metric)?;

    let mut entries: Vec<RankEntry> = dataset
        .locations()
        .filter(|location| admits(dataset, location, mode))
        .filter_map(|location| {
            dataset.value_at(location, idx, at_date).map(|value| RankEntry {
                location: location.to_string(),
                value,
            })
        })
        .collect();

    entries.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.location.cmp(&b.location)));
    entries.truncate(n);
    Ok(entries)
}

/// Latest date any location admitted by `mode` has a record for.
pub fn latest_date(dataset: &Dataset, mode: RankMode) -> Option<NaiveDate> {
    dataset
        .locations()
        .filter(|location| admits(dataset, location, mode))
        .filter_map(|location| dataset.records_for(location).last().map(|r| r.date))
        .max()
}

fn admits(dataset: &Dataset, location: &str, mode: RankMode) -> bool {
    match mode {
        RankMode::Countries => !dataset.is_aggregate(location),
        RankMode::Continents => is_continent(location),
    }
}
