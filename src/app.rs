//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs the log subscriber
//! - loads and cleans the source CSV
//! - prints the requested view (table or JSON) or writes an export

use std::io::{self, Write};

use clap::Parser;
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::AppError;
use crate::report;

pub mod pipeline;

/// Entry point for the `owid` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` must be read before parsing so `OWID_DATA` can come from it.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!(?cli, "parsed arguments");

    let (explorer, load) = pipeline::open(&cli)?;
    let handle = explorer.handle();
    match handle.date_bounds() {
        Some((first, last)) => info!(path = %cli.data.display(), %first, %last, "source opened"),
        None => warn!(path = %cli.data.display(), "source has no usable rows"),
    }
    let dropped = load.bad_dates + load.empty_locations + load.malformed_rows;
    if dropped > 0 {
        warn!(dropped, "some rows were dropped while cleaning");
    }
    if cli.verbose > 0 {
        eprint!("{}", report::format_load_report(&load));
    }

    match &cli.command {
        Command::Summary(args) => {
            let summary = pipeline::summary(&explorer, args.range());
            print!("{}", report::format_summary(&summary));
        }
        Command::Countries(args) => {
            for name in pipeline::locations(&explorer, args.continents) {
                println!("{name}");
            }
        }
        Command::Top(args) => {
            let ranking = pipeline::ranking(&explorer, args)?;
            if args.json {
                print_json(&ranking)?;
            } else {
                print!(
                    "{}",
                    report::format_ranking(&ranking.metric, ranking.at_date, &ranking.entries)
                );
            }
        }
        Command::Latest(args) => {
            let rows = pipeline::latest(&explorer, args)?;
            if args.json {
                print_json(&rows)?;
            } else {
                print!("{}", report::format_latest(&args.basis.column_name(&args.metric), &rows));
            }
        }
        Command::Race(args) => {
            let frames = pipeline::race(&explorer, args)?;
            if args.json {
                print_json(&frames)?;
            } else {
                print!("{}", report::format_race(&args.basis.column_name(&args.metric), &frames));
            }
        }
        Command::Compare(args) => {
            let comparison = pipeline::comparison(&explorer, args)?;
            if args.json {
                print_json(comparison.as_ref())?;
            } else {
                print!("{}", report::format_comparison(&comparison));
            }
        }
        Command::Profile(args) => {
            let profile = pipeline::profile(&explorer, &args.location)?;
            print!("{}", report::format_profile(&profile));
        }
        Command::Export(args) => {
            let rows = pipeline::export(&explorer, args, io::stdout().lock())?;
            if let Some(path) = &args.out {
                eprintln!("Wrote {rows} rows to {}", path.display());
            }
        }
    }

    Ok(())
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `-v` flags pick the level. Logs go to
/// stderr so table, JSON and CSV output on stdout stays clean.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .try_init();
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)
        .map_err(|e| AppError::new(1, format!("Failed to write JSON: {e}")))?;
    writeln!(out).map_err(|e| AppError::new(1, format!("Failed to write output: {e}")))?;
    Ok(())
}
