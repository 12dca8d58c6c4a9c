//! Temporal resampling to weekly or monthly cadence.
//!
//! Periods are labelled by their last day (Sunday for weeks, month end for
//! months). How a period's values collapse depends on the metric kind:
//! cumulative → last value, incremental → sum, level → mean. Missing values
//! are ignored; a period with no values at all is missing.

use chrono::{Datelike, Days, NaiveDate};

use crate::domain::{Cadence, MetricKind, Observation};

/// Resample a date-ordered series. `Cadence::Daily` returns the input unchanged.
///
/// Empty periods between observed ones are emitted as missing so the output
/// stays on a regular cadence.
pub fn resample(series: &[Observation], kind: MetricKind, cadence: Cadence) -> Vec<Observation> {
    if cadence == Cadence::Daily {
        return series.to_vec();
    }

    let mut out: Vec<Observation> = Vec::new();
    let mut bucket: Vec<Option<f64>> = Vec::new();
    let mut current: Option<NaiveDate> = None;

    for obs in series {
        let end = period_end(obs.date, cadence);
        if current != Some(end) {
            if let Some(prev) = current {
                out.push(Observation::new(prev, collapse(kind, &bucket)));
                bucket.clear();

                let mut gap = next_period_end(prev, cadence);
                while gap < end {
                    out.push(Observation::new(gap, None));
                    gap = next_period_end(gap, cadence);
                }
            }
            current = Some(end);
        }
        bucket.push(obs.value);
    }

    if let Some(end) = current {
        out.push(Observation::new(end, collapse(kind, &bucket)));
    }

    out
}

/// Last day of the period containing `date`.
pub fn period_end(date: NaiveDate, cadence: Cadence) -> NaiveDate {
    match cadence {
        Cadence::Daily => date,
        Cadence::Weekly => {
            let to_sunday = 6 - date.weekday().num_days_from_monday();
            date.checked_add_days(Days::new(u64::from(to_sunday))).unwrap_or(date)
        }
        Cadence::Monthly => {
            let (year, month) = if date.month() == 12 {
                (date.year() + 1, 1)
            } else {
                (date.year(), date.month() + 1)
            };
            NaiveDate::from_ymd_opt(year, month, 1)
                .and_then(|first| first.pred_opt())
                .unwrap_or(date)
        }
    }
}

fn next_period_end(end: NaiveDate, cadence: Cadence) -> NaiveDate {
    match end.succ_opt() {
        Some(next) => period_end(next, cadence),
        None => NaiveDate::MAX,
    }
}

fn collapse(kind: MetricKind, values: &[Option<f64>]) -> Option<f64> {
    match kind {
        MetricKind::Cumulative => values.iter().rev().find_map(|v| *v),
        MetricKind::Incremental => {
            let present: Vec<f64> = values.iter().filter_map(|v| *v).collect();
            (!present.is_empty()).then(|| present.iter().sum())
        }
        MetricKind::Level => {
            let present: Vec<f64> = values.iter().filter_map(|v| *v).collect();
            (!present.is_empty()).then(|| present.iter().sum::<f64>() / present.len() as f64)
        }
    }
}
