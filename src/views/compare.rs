//! Multi-location comparison view.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::data::Dataset;
use crate::domain::{DateRange, DeriveOptions, DerivedSeries};
use crate::error::PipelineError;
use crate::series::derive;

/// Most locations a single comparison will chart.
pub const MAX_COMPARED: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OmissionReason {
    /// The location does not appear in the dataset.
    UnknownLocation,
    /// More than `MAX_COMPARED` locations were requested.
    OverLimit,
}

/// A requested location left out of the result, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Omission {
    pub location: String,
    pub reason: OmissionReason,
}

impl fmt::Display for Omission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            OmissionReason::UnknownLocation => write!(f, "'{}' is not in the dataset", self.location),
            OmissionReason::OverLimit => write!(
                f,
                "'{}' skipped: at most {MAX_COMPARED} locations can be compared",
                self.location
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub metric: String,
    pub series: BTreeMap<String, DerivedSeries>,
    pub omitted: Vec<Omission>,
}

/// Derived series of `metric` for each requested location.
///
/// Unknown locations do not fail the view: they are reported in `omitted` and
/// the others proceed. Repeated names are compared once.
pub fn compare(
    dataset: &Dataset,
    locations: &[String],
    metric: &str,
    range: DateRange,
    options: DeriveOptions,
) -> Result<Comparison, PipelineError> {
    dataset.metric_index(metric)?;

    let mut seen = BTreeSet::new();
    let mut series = BTreeMap::new();
    let mut omitted = Vec::new();

    for location in locations {
        let location = location.trim();
        if !seen.insert(location) {
            continue;
        }

        let reason = if !dataset.contains_location(location) {
            Some(OmissionReason::UnknownLocation)
        } else if series.len() >= MAX_COMPARED {
            Some(OmissionReason::OverLimit)
        } else {
            None
        };

        if let Some(reason) = reason {
            let omission = Omission {
                location: location.to_string(),
                reason,
            };
            warn!(%omission, "location omitted from comparison");
            omitted.push(omission);
            continue;
        }

        series.insert(location.to_string(), derive(dataset, location, metric, range, options)?);
    }

    Ok(Comparison {
        metric: metric.to_string(),
        series,
        omitted,
    })
}
