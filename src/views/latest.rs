//! Last reported value per country, whatever the date.
//!
//! Sparse columns (vaccinations above all) are reported on different days in
//! every country, so ranking them on one calendar date leaves most countries
//! out. This view takes each country's last non-missing value instead.

use chrono::NaiveDate;
use serde::Serialize;

use crate::data::Dataset;
use crate::error::PipelineError;
use crate::views::MetricValue;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestValue {
    pub location: String,
    pub iso_code: String,
    pub continent: String,
    /// Date `value` was reported on.
    pub date: NaiveDate,
    pub value: f64,
    /// Last reported value of each extra column, in request order.
    pub extras: Vec<MetricValue>,
}

/// Each country's last non-missing `metric`, joined with the last
/// non-missing value of every `extras` column.
///
/// Countries that never report `metric` are left out, as are those missing
/// any extra when `complete_only` is set. Sorted by value descending, then
/// location ascending. Aggregates are never included.
pub fn latest_values(
    dataset: &Dataset,
    metric: &str,
    extras: &[String],
    complete_only: bool,
) -> Result<Vec<LatestValue>, PipelineError> {
    let idx = dataset.metric_index(metric)?;
    let extra_idx = extras
        .iter()
        .map(|name| dataset.metric_index(name).map(|i| (name, i)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = Vec::new();
    for location in dataset.locations().filter(|l| !dataset.is_aggregate(l)) {
        let records = dataset.records_for(location);
        let Some((date, value)) = records.iter().rev().find_map(|r| r.value(idx).map(|v| (r.date, v))) else {
            continue;
        };

        let extras: Vec<MetricValue> = extra_idx
            .iter()
            .map(|&(name, i)| MetricValue {
                metric: name.clone(),
                value: records.iter().rev().find_map(|r| r.value(i)),
            })
            .collect();
        if complete_only && extras.iter().any(|e| e.value.is_none()) {
            continue;
        }

        // Identity fields come from the country's most recent row.
        let Some(last) = records.last() else { continue };
        rows.push(LatestValue {
            location: location.to_string(),
            iso_code: last.iso_code.clone(),
            continent: last.continent.clone(),
            date,
            value,
            extras,
        });
    }

    rows.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.location.cmp(&b.location)));
    Ok(rows)
}
