//! Trailing rolling mean.

use crate::domain::Observation;

/// Trailing rolling mean with a minimum of one observation per window.
///
/// Each output point is the mean of the non-missing values among the point
/// itself and its `window - 1` predecessors, so the head of the series is
/// averaged over whatever is available instead of being left empty. A window
/// with no values at all stays missing. Output length always equals input
/// length; `window == 0` behaves like `1`.
pub fn rolling_average(series: &[Observation], window: usize) -> Vec<Observation> {
    let window = window.max(1);

    series
        .iter()
        .enumerate()
        .map(|(i, obs)| {
            let start = (i + 1).saturating_sub(window);
            let (sum, count) = series[start..=i]
                .iter()
                .filter_map(|o| o.value)
                .fold((0.0_f64, 0usize), |(sum, count), v| (sum + v, count + 1));
            let value = (count > 0).then(|| sum / count as f64);
            Observation::new(obs.date, value)
        })
        .collect()
}
