//! Per-capita normalization.

use std::borrow::Cow;

use crate::data::Dataset;
use crate::domain::{Basis, POPULATION};
use crate::error::PipelineError;

/// Scale one value by population. Missing input, or a population that is
/// absent, zero or non-finite, yields missing rather than ∞/NaN.
pub fn normalized_value(value: Option<f64>, population: Option<f64>, basis: Basis) -> Option<f64> {
    let value = value?;
    let Some(scale) = basis.scale() else {
        return Some(value);
    };
    let population = population.filter(|p| p.is_finite() && *p > 0.0)?;
    let out = value * scale / population;
    out.is_finite().then_some(out)
}

/// Make sure `metric` is available in `basis`.
///
/// If the source already publishes the normalized column (for example
/// `total_cases_per_million`) the dataset is returned untouched. Otherwise a
/// new dataset with the computed column appended is returned; the column is
/// named `basis.column_name(metric)`.
pub fn normalize<'a>(dataset: &'a Dataset, metric: &str, basis: Basis) -> Result<Cow<'a, Dataset>, PipelineError> {
    let target = basis.column_name(metric);
    if dataset.schema().contains(&target) {
        return Ok(Cow::Borrowed(dataset));
    }

    let metric_idx = dataset.metric_index(metric)?;
    let population_idx = dataset.schema().index_of(POPULATION);

    let values = dataset
        .records()
        .iter()
        .map(|r| {
            let population = population_idx.and_then(|i| r.value(i));
            normalized_value(r.value(metric_idx), population, basis)
        })
        .collect();

    tracing::debug!(column = %target, "derived normalized column");
    Ok(Cow::Owned(dataset.with_column(&target, values)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Schema;
    use crate::domain::Record;
    use chrono::NaiveDate;

    fn dataset(columns: &[&str], rows: &[(&str, Vec<Option<f64>>)]) -> Dataset {
        let date = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
        let records = rows
            .iter()
            .map(|(location, values)| Record {
                location: location.to_string(),
                iso_code: String::new(),
                continent: String::new(),
                date,
                values: values.clone(),
            })
            .collect();
        Dataset::from_records(Schema::new(columns.iter().copied()), records).0
    }

    fn column(ds: &Dataset, name: &str, location: &str) -> Option<f64> {
        let idx = ds.metric_index(name).unwrap();
        ds.records_for(location)[0].value(idx)
    }

    #[test]
    fn testland_per_million() {
        let ds = dataset(&["total_cases", "population"], &[("Testland", vec![Some(50_000.0), Some(1_000_000.0)])]);
        let out = normalize(&ds, "total_cases", Basis::PerMillion).unwrap();
        assert_eq!(column(&out, "total_cases_per_million", "Testland"), Some(50_000.0));
    }

    #[test]
    fn per_hundred_scale() {
        let ds = dataset(&["people_vaccinated", "population"], &[("A", vec![Some(25.0), Some(200.0)])]);
        let out = normalize(&ds, "people_vaccinated", Basis::PerHundred).unwrap();
        assert_eq!(column(&out, "people_vaccinated_per_hundred", "A"), Some(12.5));
    }

    #[test]
    fn source_column_is_used_directly() {
        let ds = dataset(
            &["total_cases", "population", "total_cases_per_million"],
            &[("A", vec![Some(10.0), Some(1_000_000.0), Some(99.0)])],
        );
        let out = normalize(&ds, "total_cases", Basis::PerMillion).unwrap();
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(column(&out, "total_cases_per_million", "A"), Some(99.0));
    }

    #[test]
    fn zero_or_missing_population_propagates_missing() {
        let ds = dataset(
            &["total_cases", "population"],
            &[
                ("A", vec![Some(10.0), Some(0.0)]),
                ("B", vec![Some(10.0), None]),
                ("C", vec![None, Some(100.0)]),
            ],
        );
        let out = normalize(&ds, "total_cases", Basis::PerMillion).unwrap();
        for loc in ["A", "B", "C"] {
            assert_eq!(column(&out, "total_cases_per_million", loc), None, "{loc}");
        }
    }

    #[test]
    fn absent_population_column_yields_missing() {
        let ds = dataset(&["total_cases"], &[("A", vec![Some(10.0)])]);
        let out = normalize(&ds, "total_cases", Basis::PerHundred).unwrap();
        assert_eq!(column(&out, "total_cases_per_hundred", "A"), None);
    }

    #[test]
    fn absolute_is_a_no_op() {
        let ds = dataset(&["total_cases"], &[("A", vec![Some(10.0)])]);
        let out = normalize(&ds, "total_cases", Basis::Absolute).unwrap();
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn unknown_metric_is_an_error() {
        let ds = dataset(&["total_cases"], &[("A", vec![Some(10.0)])]);
        assert!(normalize(&ds, "new_tests", Basis::PerMillion).is_err());
    }

    #[test]
    fn zero_is_a_value_not_missing() {
        assert_eq!(normalized_value(Some(0.0), Some(50.0), Basis::PerHundred), Some(0.0));
    }
}
