//! CSV ingest and cleaning.
//!
//! This module turns the raw per-location-per-day CSV into a `Dataset`.
//!
//! Design goals:
//! - **Strict schema** for the identity columns (`date`, `location`)
//! - **Row-level tolerance** (drop rows with bad dates, but report what happened)
//! - **Lenient metrics** (a non-numeric cell is missing, never an error, never zero)
//! - **Deterministic behavior** (stable sort, last-write-wins deduplication)

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::data::{Dataset, Schema};
use crate::domain::{CONTINENT, DATE, IDENTITY_COLUMNS, ISO_CODE, LOCATION, Record};
use crate::error::PipelineError;

/// Share of data rows allowed to carry an unparseable date before the load is rejected.
pub const DEFAULT_MAX_BAD_DATE_RATIO: f64 = 0.01;

/// Only the first few row errors are kept verbatim; the counters cover the rest.
const MAX_ROW_ERRORS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOptions {
    pub max_bad_date_ratio: f64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_bad_date_ratio: DEFAULT_MAX_BAD_DATE_RATIO,
        }
    }
}

/// Where the CSV bytes come from. Fetching them is somebody else's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl Source {
    pub fn load(&self, options: &LoadOptions) -> Result<Loaded, PipelineError> {
        match self {
            Source::Path(path) => load_path(path, options),
            Source::Bytes(bytes) => load_reader(bytes.as_slice(), options),
        }
    }
}

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub line: usize,
    pub location: Option<String>,
    pub message: String,
}

/// What happened while cleaning the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub malformed_rows: usize,
    pub empty_locations: usize,
    pub bad_dates: usize,
    pub duplicates_replaced: usize,
    pub row_errors: Vec<RowError>,
}

impl LoadReport {
    fn push_error(&mut self, line: usize, location: Option<&str>, message: impl Into<String>) {
        if self.row_errors.len() < MAX_ROW_ERRORS {
            self.row_errors.push(RowError {
                line,
                location: location.map(str::to_string),
                message: message.into(),
            });
        }
    }
}

/// Ingest output: the cleaned dataset plus the cleaning report.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub dataset: Dataset,
    pub report: LoadReport,
}

pub fn load_path(path: &Path, options: &LoadOptions) -> Result<Loaded, PipelineError> {
    let file = File::open(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "reading source CSV");
    load_reader(file, options)
}

/// Parse, validate and clean a CSV stream into a `Dataset`.
pub fn load_reader<R: Read>(input: R, options: &LoadOptions) -> Result<Loaded, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let header_map = build_header_map(&headers);

    let date_col = required_column(&header_map, DATE)?;
    let location_col = required_column(&header_map, LOCATION)?;
    let iso_col = header_map.get(ISO_CODE).copied();
    let continent_col = header_map.get(CONTINENT).copied();

    // Every non-identity column is a metric, kept in source order.
    let mut schema = Schema::default();
    let mut metric_cols: Vec<(usize, usize)> = Vec::new();
    for (pos, name) in headers.iter().enumerate() {
        let name = normalize_header_name(name);
        if name.is_empty() || IDENTITY_COLUMNS.contains(&name.as_str()) {
            continue;
        }
        let slot = schema.push(name);
        metric_cols.push((pos, slot));
    }

    let mut report = LoadReport::default();
    let mut raw = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header and lines are 1-based.
        let line = idx + 2;
        report.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                report.malformed_rows += 1;
                report.push_error(line, None, format!("CSV parse error: {e}"));
                continue;
            }
        };

        let Some(location) = get_field(&record, Some(location_col)) else {
            report.empty_locations += 1;
            report.push_error(line, None, "Missing `location` value.");
            continue;
        };

        let date = match get_field(&record, Some(date_col)).map(parse_date) {
            Some(Ok(date)) => date,
            Some(Err(message)) => {
                report.bad_dates += 1;
                report.push_error(line, Some(location), message);
                continue;
            }
            None => {
                report.bad_dates += 1;
                report.push_error(line, Some(location), "Missing `date` value.");
                continue;
            }
        };

        let mut values = vec![None; schema.len()];
        for &(pos, slot) in &metric_cols {
            values[slot] = parse_opt_f64(get_field(&record, Some(pos)));
        }

        raw.push(Record {
            location: location.to_string(),
            iso_code: get_field(&record, iso_col).unwrap_or_default().to_string(),
            continent: get_field(&record, continent_col).unwrap_or_default().to_string(),
            date,
            values,
        });
    }

    check_date_tolerance(&report, options)?;

    let (dataset, duplicates_replaced) = Dataset::from_records(schema, raw);
    report.duplicates_replaced = duplicates_replaced;
    report.rows_kept = dataset.len();

    if report.bad_dates > 0 {
        warn!(bad_dates = report.bad_dates, "dropped rows with unparseable dates");
    }
    if report.duplicates_replaced > 0 {
        debug!(duplicates = report.duplicates_replaced, "replaced duplicate (location, date) rows");
    }
    info!(
        rows_read = report.rows_read,
        rows_kept = report.rows_kept,
        metrics = dataset.schema().len(),
        locations = dataset.locations().count(),
        "dataset loaded"
    );

    Ok(Loaded { dataset, report })
}

fn check_date_tolerance(report: &LoadReport, options: &LoadOptions) -> Result<(), PipelineError> {
    let dated_rows = report.rows_read - report.malformed_rows - report.empty_locations;
    if report.bad_dates == 0 || dated_rows == 0 {
        return Ok(());
    }

    let ratio = options.max_bad_date_ratio.max(0.0);
    let whole_column_bad = report.bad_dates == dated_rows;
    if whole_column_bad || report.bad_dates as f64 > ratio * dated_rows as f64 {
        return Err(PipelineError::Parse {
            bad: report.bad_dates,
            total: dated_rows,
            tolerance: ratio * 100.0,
        });
    }
    Ok(())
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn required_column(header_map: &HashMap<String, usize>, name: &str) -> Result<usize, PipelineError> {
    header_map
        .get(name)
        .copied()
        .ok_or_else(|| PipelineError::MissingColumn {
            column: name.to_string(),
        })
}

fn get_field(record: &StringRecord, idx: Option<usize>) -> Option<&str> {
    record.get(idx?).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // The source publishes ISO dates; the other two forms show up when the
    // file has been round-tripped through a spreadsheet.
    const FMTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!("Invalid date '{s}'. Expected YYYY-MM-DD."))
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let v = s?.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
