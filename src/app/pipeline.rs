//! Shared "load -> view" logic behind the `owid` subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV load -> cleaning report -> cached view (or filtered export)
//!
//! `app` can then focus on presentation (tables vs JSON).

use std::collections::BTreeSet;
use std::io::Write;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::cli::{Cli, CompareArgs, ExportArgs, LatestArgs, RaceArgs, TopArgs};
use crate::data::{self, Filter};
use crate::domain::{Basis, DateRange, DeriveOptions, RankEntry, RankMode};
use crate::error::AppError;
use crate::io::export::{export_csv, export_path};
use crate::io::ingest::{LoadOptions, LoadReport, Source};
use crate::series::normalize;
use crate::store::Explorer;
use crate::views::{self, Comparison, CountryProfile, GlobalSummary, LatestValue, RaceFrame};

/// A ranking plus the parameters it was computed for.
#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    /// Column actually ranked (`total_cases_per_million` for `--basis per-million`).
    pub metric: String,
    pub basis: Basis,
    pub mode: RankMode,
    /// `None` when no admitted location has any record.
    pub at_date: Option<NaiveDate>,
    pub entries: Vec<RankEntry>,
}

pub fn load_options(cli: &Cli) -> Result<LoadOptions, AppError> {
    let ratio = cli.max_bad_dates;
    if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
        return Err(AppError::new(
            2,
            format!("--max-bad-dates must be between 0 and 1 (got {ratio})"),
        ));
    }
    Ok(LoadOptions {
        max_bad_date_ratio: ratio,
    })
}

/// Load the source CSV named on the command line.
pub fn open(cli: &Cli) -> Result<(Explorer, LoadReport), AppError> {
    let options = load_options(cli)?;
    let source = Source::Path(cli.data.clone());
    let (explorer, report) = Explorer::open(&source, options)?;
    Ok((explorer, report))
}

pub fn summary(explorer: &Explorer, range: DateRange) -> Arc<GlobalSummary> {
    explorer.views().summary(&explorer.handle(), range)
}

/// Countries, or the continent rollups when `continents` is set.
pub fn locations(explorer: &Explorer, continents: bool) -> BTreeSet<String> {
    let handle = explorer.handle();
    if continents {
        handle.continents()
    } else {
        data::countries(&handle)
    }
}

pub fn ranking(explorer: &Explorer, args: &TopArgs) -> Result<Ranking, AppError> {
    let handle = explorer.handle();
    let mode = if args.continents {
        RankMode::Continents
    } else {
        RankMode::Countries
    };

    let metric = args.basis.column_name(&args.metric);

    let Some(at_date) = args.date.or_else(|| views::latest_date(&handle, mode)) else {
        // Nothing to rank is an empty result, but the metric must still exist.
        normalize(&handle, &args.metric, args.basis)?;
        return Ok(Ranking {
            metric,
            basis: args.basis,
            mode,
            at_date: None,
            entries: Vec::new(),
        });
    };

    let entries = explorer
        .views()
        .top_n(&handle, &args.metric, args.basis, args.n, at_date, mode)?;

    Ok(Ranking {
        metric,
        basis: args.basis,
        mode,
        at_date: Some(at_date),
        entries: entries.as_ref().clone(),
    })
}

/// Countries ranked by their last reported value of `args.metric`.
pub fn latest(explorer: &Explorer, args: &LatestArgs) -> Result<Vec<LatestValue>, AppError> {
    let handle = explorer.handle();
    let dataset = normalize(&handle, &args.metric, args.basis)?;
    let mut rows = views::latest_values(
        &dataset,
        &args.basis.column_name(&args.metric),
        &args.extras,
        args.complete,
    )?;
    if args.n > 0 {
        rows.truncate(args.n);
    }
    Ok(rows)
}

pub fn race(explorer: &Explorer, args: &RaceArgs) -> Result<Vec<RaceFrame>, AppError> {
    let handle = explorer.handle();
    let dataset = normalize(&handle, &args.metric, args.basis)?;
    let frames = views::race_frames(
        &dataset,
        &args.basis.column_name(&args.metric),
        args.n,
        args.range.range(),
        args.cadence,
    )?;
    Ok(frames)
}

pub fn comparison(explorer: &Explorer, args: &CompareArgs) -> Result<Arc<Comparison>, AppError> {
    let options = DeriveOptions {
        cadence: args.cadence,
        window: args.window,
    };
    let comparison = explorer.views().compare(
        &explorer.handle(),
        &args.locations,
        &args.metric,
        args.basis,
        args.range.range(),
        options,
    )?;
    Ok(comparison)
}

pub fn profile(explorer: &Explorer, location: &str) -> Result<CountryProfile, AppError> {
    views::country_profile(&explorer.handle(), location)
        .ok_or_else(|| AppError::new(2, format!("unknown location: '{location}'")))
}

/// Filter the dataset per `args` and write it to `--out`, or to `stdout`.
///
/// Returns the number of rows written.
pub fn export(explorer: &Explorer, args: &ExportArgs, stdout: impl Write) -> Result<usize, AppError> {
    let filter = Filter {
        locations: args.locations.iter().cloned().collect(),
        region: args.region,
        range: args.range.range(),
        countries_only: args.countries_only,
    };
    let subset = explorer.handle().filter(&filter);

    let rows = match &args.out {
        Some(path) => export_path(path, &subset, &args.columns)?,
        None => export_csv(stdout, &subset, &args.columns)?,
    };
    Ok(rows)
}
