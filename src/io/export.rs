//! Export a (filtered) dataset to CSV.
//!
//! The export reproduces exactly the rows of the dataset it is given, in
//! order, and exactly the requested columns, in the requested order. Callers
//! carve the row subset with `Dataset::filter` first.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::data::Dataset;
use crate::domain::{CONTINENT, DATE, IDENTITY_COLUMNS, ISO_CODE, LOCATION, Record};
use crate::error::PipelineError;

#[derive(Debug, Clone, Copy)]
enum Column {
    Location,
    IsoCode,
    Continent,
    Date,
    Metric(usize),
}

impl Column {
    fn render(self, record: &Record) -> String {
        match self {
            Column::Location => record.location.clone(),
            Column::IsoCode => record.iso_code.clone(),
            Column::Continent => record.continent.clone(),
            Column::Date => record.date.format("%Y-%m-%d").to_string(),
            // Shortest representation that round-trips; missing stays empty.
            Column::Metric(idx) => record.value(idx).map(|v| v.to_string()).unwrap_or_default(),
        }
    }
}

/// Write `dataset` as CSV with the given columns. An empty column list means
/// every column: identity columns first, then metrics in schema order.
///
/// Returns the number of data rows written.
pub fn export_csv<W: Write>(writer: W, dataset: &Dataset, columns: &[String]) -> Result<usize, PipelineError> {
    let names: Vec<String> = if columns.is_empty() {
        IDENTITY_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(dataset.schema().columns().iter().cloned())
            .collect()
    } else {
        // Same normalization ingest applies to header names.
        columns.iter().map(|c| c.trim().to_ascii_lowercase()).collect()
    };

    let resolved = names
        .iter()
        .map(|name| resolve(dataset, name))
        .collect::<Result<Vec<Column>, PipelineError>>()?;

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&names)?;

    for record in dataset.records() {
        wtr.write_record(resolved.iter().map(|c| c.render(record)))?;
    }
    wtr.flush().map_err(csv::Error::from)?;

    Ok(dataset.len())
}

/// Write the export to a file at `path`.
pub fn export_path(path: &Path, dataset: &Dataset, columns: &[String]) -> Result<usize, PipelineError> {
    let file = File::create(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = export_csv(file, dataset, columns)?;
    tracing::info!(path = %path.display(), rows, "export written");
    Ok(rows)
}

fn resolve(dataset: &Dataset, name: &str) -> Result<Column, PipelineError> {
    Ok(match name {
        LOCATION => Column::Location,
        ISO_CODE => Column::IsoCode,
        CONTINENT => Column::Continent,
        DATE => Column::Date,
        metric => Column::Metric(dataset.metric_index(metric)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Filter;
    use crate::domain::DateRange;
    use crate::io::ingest::{LoadOptions, load_reader};
    use chrono::NaiveDate;

    const SOURCE: &str = "iso_code,continent,location,date,total_cases,new_cases\n\
        ESP,Europe,Spain,2021-01-01,100,10\n\
        ESP,Europe,Spain,2021-01-02,112.5,\n\
        ITA,Europe,Italy,2021-01-01,50,5\n";

    fn export(dataset: &Dataset, columns: &[&str]) -> String {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let mut buf = Vec::new();
        export_csv(&mut buf, dataset, &columns).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn columns_follow_requested_order() {
        let ds = load_reader(SOURCE.as_bytes(), &LoadOptions::default()).unwrap().dataset;
        let out = export(&ds, &["new_cases", "date", "location"]);
        assert_eq!(
            out,
            "new_cases,date,location\n5,2021-01-01,Italy\n10,2021-01-01,Spain\n,2021-01-02,Spain\n"
        );
    }

    #[test]
    fn filtered_subset_is_reproduced_exactly() {
        let ds = load_reader(SOURCE.as_bytes(), &LoadOptions::default()).unwrap().dataset;
        let day = NaiveDate::from_ymd_opt(2021, 1, 2).unwrap();
        let subset = ds.filter(&Filter {
            locations: ["Spain".to_string()].into_iter().collect(),
            range: DateRange::new(Some(day), Some(day)),
            ..Filter::default()
        });
        assert_eq!(export(&subset, &["location", "total_cases"]), "location,total_cases\nSpain,112.5\n");
    }

    #[test]
    fn column_names_match_case_insensitively() {
        let ds = load_reader(SOURCE.as_bytes(), &LoadOptions::default()).unwrap().dataset;
        let out = export(&ds, &[" Location", "Total_Cases "]);
        assert_eq!(out.lines().next(), Some("location,total_cases"));
        assert_eq!(out.lines().nth(1), Some("Italy,50"));
    }

    #[test]
    fn empty_selection_exports_every_column() {
        let ds = load_reader(SOURCE.as_bytes(), &LoadOptions::default()).unwrap().dataset;
        let out = export(&ds, &[]);
        let header = out.lines().next().unwrap();
        assert_eq!(header, "iso_code,continent,location,date,total_cases,new_cases");
        assert_eq!(out.lines().count(), 4);
    }

    #[test]
    fn unknown_column_is_rejected() {
        let ds = load_reader(SOURCE.as_bytes(), &LoadOptions::default()).unwrap().dataset;
        let mut buf = Vec::new();
        let err = export_csv(&mut buf, &ds, &["bogus".to_string()]).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownColumn { ref column } if column == "bogus"));
        assert!(buf.is_empty());
    }
}
