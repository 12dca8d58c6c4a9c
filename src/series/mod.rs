//! Per-location series transforms.
//!
//! - daily reindexing (`reindex_daily`)
//! - per-capita normalization (`normalize`)
//! - trailing rolling mean (`rolling`)
//! - weekly/monthly resampling (`resample`)
//!
//! `derive` chains them into the derived series the views hand out. Every
//! function here works on one location at a time; nothing spans locations.

pub mod normalize;
pub mod resample;
pub mod rolling;

pub use normalize::{normalize, normalized_value};
pub use resample::{period_end, resample};
pub use rolling::rolling_average;

use crate::data::Dataset;
use crate::domain::{DateRange, DeriveOptions, DerivedSeries, MetricKind, Observation};
use crate::error::PipelineError;

/// Fill calendar gaps in a date-ordered series with missing points.
pub fn reindex_daily(series: &[Observation]) -> Vec<Observation> {
    let mut out: Vec<Observation> = Vec::with_capacity(series.len());
    for obs in series {
        if let Some(last) = out.last().map(|o| o.date) {
            let mut next = last.succ_opt();
            while let Some(day) = next.filter(|d| *d < obs.date) {
                out.push(Observation::new(day, None));
                next = day.succ_opt();
            }
        }
        out.push(*obs);
    }
    out
}

/// Build the derived series of `metric` for one location.
///
/// Records inside `range` are reindexed to a daily calendar, resampled to
/// `options.cadence` according to the metric's kind, then smoothed with a
/// trailing rolling mean over `options.window` periods. An unknown location
/// yields an empty series; an unknown metric is an error.
pub fn derive(
    dataset: &Dataset,
    location: &str,
    metric: &str,
    range: DateRange,
    options: DeriveOptions,
) -> Result<DerivedSeries, PipelineError> {
    let raw = dataset.series(location, metric, range)?;
    let daily = reindex_daily(&raw);
    let resampled = resample(&daily, MetricKind::classify(metric), options.cadence);
    let points = rolling_average(&resampled, options.window);

    Ok(DerivedSeries {
        location: location.to_string(),
        metric: metric.to_string(),
        cadence: options.cadence,
        window: options.window.max(1),
        points,
    })
}
