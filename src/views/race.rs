//! Bar-race frames: a top-N ranking per period.
//!
//! Each country's series is forward-filled first, so a country that skips a
//! reporting day keeps its bar instead of dropping out of the frame.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::data::Dataset;
use crate::domain::{Cadence, DateRange, MetricKind, RankEntry};
use crate::error::PipelineError;
use crate::series::period_end;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceFrame {
    /// Last day of the period (Sunday for weekly frames).
    pub period_end: NaiveDate,
    pub entries: Vec<RankEntry>,
}

/// Top `n` countries by `metric` for every period in `range`.
///
/// Per country: values are forward-filled across its own records (values
/// before `range` can carry into it), then collapsed per period. Cumulative
/// metrics take the period maximum; anything else takes the mean. A country
/// with no value yet is absent from a frame, never ranked as zero. Entries are
/// ordered by value descending, then location ascending. Aggregates are never
/// included.
pub fn race_frames(
    dataset: &Dataset,
    metric: &str,
    n: usize,
    range: DateRange,
    cadence: Cadence,
) -> Result<Vec<RaceFrame>, PipelineError> {
    let idx = dataset.metric_index(metric)?;
    let cumulative = MetricKind::classify(metric) == MetricKind::Cumulative;

    let mut periods: BTreeMap<NaiveDate, Vec<RankEntry>> = BTreeMap::new();
    for location in dataset.locations().filter(|l| !dataset.is_aggregate(l)) {
        let filled: Vec<(NaiveDate, Option<f64>)> = dataset
            .records_for(location)
            .iter()
            .scan(None, |carried: &mut Option<f64>, r| {
                *carried = r.value(idx).or(*carried);
                Some((r.date, *carried))
            })
            .filter(|(date, _)| range.contains(*date))
            .map(|(date, value)| (period_end(date, cadence), value))
            .collect();

        for chunk in filled.chunk_by(|a, b| a.0 == b.0) {
            let values: Vec<f64> = chunk.iter().filter_map(|(_, v)| *v).collect();
            if let Some(value) = collapse(&values, cumulative) {
                periods.entry(chunk[0].0).or_default().push(RankEntry {
                    location: location.to_string(),
                    value,
                });
            }
        }
    }

    Ok(periods
        .into_iter()
        .map(|(period_end, mut entries)| {
            entries.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.location.cmp(&b.location)));
            entries.truncate(n);
            RaceFrame { period_end, entries }
        })
        .collect())
}

fn collapse(values: &[f64], cumulative: bool) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    if cumulative {
        Some(values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::{LoadOptions, load_reader};

    // 2021-01-04 is a Monday; the first week ends 2021-01-10.
    const CSV: &str = "\
iso_code,location,date,total_cases,new_cases
ESP,Spain,2021-01-04,10,10
ESP,Spain,2021-01-05,,
ESP,Spain,2021-01-11,,
ITA,Italy,2021-01-04,,
ITA,Italy,2021-01-06,30,6
ITA,Italy,2021-01-12,40,2
PER,Peru,2021-01-12,5,5
OWID_WRL,World,2021-01-04,1000,100
";

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, day).unwrap()
    }

    fn ds() -> Dataset {
        load_reader(CSV.as_bytes(), &LoadOptions::default()).unwrap().dataset
    }

    fn frame(frames: &[RaceFrame], end: NaiveDate) -> Vec<(&str, f64)> {
        frames
            .iter()
            .find(|f| f.period_end == end)
            .map(|f| f.entries.iter().map(|e| (e.location.as_str(), e.value)).collect())
            .unwrap_or_default()
    }

    #[test]
    fn weekly_frames_forward_fill_and_skip_aggregates() {
        let frames = race_frames(&ds(), "total_cases", 10, DateRange::all(), Cadence::Weekly).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frame(&frames, d(10)), [("Italy", 30.0), ("Spain", 10.0)]);
        // Spain reports nothing in the second week but keeps its carried total.
        assert_eq!(frame(&frames, d(17)), [("Italy", 40.0), ("Spain", 10.0), ("Peru", 5.0)]);
    }

    #[test]
    fn frames_are_truncated_to_n() {
        let frames = race_frames(&ds(), "total_cases", 1, DateRange::all(), Cadence::Weekly).unwrap();
        assert_eq!(frame(&frames, d(17)), [("Italy", 40.0)]);
    }

    #[test]
    fn non_cumulative_metrics_average_the_period() {
        let frames = race_frames(&ds(), "new_cases", 10, DateRange::all(), Cadence::Weekly).unwrap();
        // Spain: 10 on Monday, carried to Tuesday.
        assert_eq!(frame(&frames, d(10)), [("Spain", 10.0), ("Italy", 6.0)]);
    }

    #[test]
    fn values_before_the_range_carry_into_it() {
        let range = DateRange::new(Some(d(11)), None);
        let frames = race_frames(&ds(), "total_cases", 10, range, Cadence::Weekly).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frame(&frames, d(17))[1], ("Spain", 10.0));
    }

    #[test]
    fn unknown_metric_is_an_error() {
        assert!(race_frames(&ds(), "bogus", 10, DateRange::all(), Cadence::Weekly).is_err());
    }
}
