//! Metric classification.
//!
//! Resampling has to know whether a column is a running total or a per-day
//! delta: summing a cumulative column over a week is meaningless.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Running total (`total_cases`, `people_vaccinated`, ...). Resamples to the last value.
    Cumulative,
    /// Per-day delta (`new_cases`, `new_deaths_smoothed`, ...). Resamples to the sum.
    Incremental,
    /// Rates, indices, static attributes and trailing-window totals
    /// (`weekly_*`, `biweekly_*`). Resamples to the mean.
    Level,
}

impl MetricKind {
    pub fn classify(metric: &str) -> Self {
        let name = metric.trim().to_ascii_lowercase();

        // Already a 7/14-day total on every date; summing them over a period multiplies the count.
        const TRAILING_TOTAL_PREFIXES: [&str; 2] = ["weekly_", "biweekly_"];
        const INCREMENTAL_PREFIXES: [&str; 1] = ["new_"];
        const CUMULATIVE_PREFIXES: [&str; 4] = [
            "total_",
            "people_vaccinated",
            "people_fully_vaccinated",
            "people_unvaccinated",
        ];

        if TRAILING_TOTAL_PREFIXES.iter().any(|p| name.starts_with(p)) {
            return MetricKind::Level;
        }
        if INCREMENTAL_PREFIXES.iter().any(|p| name.starts_with(p)) {
            return MetricKind::Incremental;
        }
        if CUMULATIVE_PREFIXES.iter().any(|p| name.starts_with(p)) || name.contains("_cumulative") {
            return MetricKind::Cumulative;
        }
        MetricKind::Level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_source_columns() {
        assert_eq!(MetricKind::classify("total_cases"), MetricKind::Cumulative);
        assert_eq!(MetricKind::classify("total_vaccinations_per_hundred"), MetricKind::Cumulative);
        assert_eq!(MetricKind::classify("people_fully_vaccinated"), MetricKind::Cumulative);
        assert_eq!(MetricKind::classify("excess_mortality_cumulative_absolute"), MetricKind::Cumulative);

        assert_eq!(MetricKind::classify("new_cases"), MetricKind::Incremental);
        assert_eq!(MetricKind::classify("new_deaths_smoothed_per_million"), MetricKind::Incremental);

        assert_eq!(MetricKind::classify("population"), MetricKind::Level);
        assert_eq!(MetricKind::classify("reproduction_rate"), MetricKind::Level);
        assert_eq!(MetricKind::classify("stringency_index"), MetricKind::Level);
    }

    #[test]
    fn trailing_window_totals_are_levels() {
        assert_eq!(MetricKind::classify("weekly_hosp_admissions"), MetricKind::Level);
        assert_eq!(MetricKind::classify("weekly_cases_per_million"), MetricKind::Level);
        assert_eq!(MetricKind::classify("biweekly_deaths"), MetricKind::Level);
    }
}
