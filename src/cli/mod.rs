//! Command-line parsing for the dataset explorer.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! pipeline: every subcommand maps onto one view in `views` or onto the export.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::data::Region;
use crate::domain::{Basis, Cadence, DEFAULT_WINDOW, DateRange};
use crate::io::ingest::DEFAULT_MAX_BAD_DATE_RATIO;
use crate::views::DEFAULT_TOP_N;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "owid", version, about = "Aggregate and explore the OWID COVID-19 dataset")]
pub struct Cli {
    /// Path to the source CSV (`owid-covid-data.csv`).
    #[arg(long, env = "OWID_DATA", global = true, default_value = "owid-covid-data.csv")]
    pub data: PathBuf,

    /// Share of rows with unparseable dates tolerated before the load fails.
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_BAD_DATE_RATIO)]
    pub max_bad_dates: f64,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Country-level totals (cases, deaths, vaccinations) over a date window.
    Summary(RangeArgs),
    /// List countries (or continent rollups) present in the dataset.
    Countries(CountriesArgs),
    /// Rank locations by a metric on one date.
    Top(TopArgs),
    /// Rank countries by their last reported value, whatever its date.
    Latest(LatestArgs),
    /// Top-N countries per period, forward-filled (bar-race frames).
    Race(RaceArgs),
    /// Compare up to five locations over time.
    Compare(CompareArgs),
    /// Latest headline figures for one location.
    Profile(ProfileArgs),
    /// Export a filtered subset as CSV.
    Export(ExportArgs),
}

/// Inclusive date window shared by several subcommands.
#[derive(Debug, Args, Clone, Default)]
pub struct RangeArgs {
    /// First date (YYYY-MM-DD).
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last date (YYYY-MM-DD).
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl RangeArgs {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.from, self.to)
    }
}

#[derive(Debug, Args, Clone)]
pub struct CountriesArgs {
    /// List continent rollups instead of countries.
    #[arg(long)]
    pub continents: bool,
}

#[derive(Debug, Args, Clone)]
pub struct TopArgs {
    /// Metric column to rank by.
    #[arg(short, long, default_value = "total_cases_per_million")]
    pub metric: String,

    /// Normalization applied to the metric.
    #[arg(long, value_enum, default_value_t = Basis::Absolute)]
    pub basis: Basis,

    /// Number of locations to show.
    #[arg(short, default_value_t = DEFAULT_TOP_N)]
    pub n: usize,

    /// Ranking date (defaults to the latest date in the dataset).
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Rank continent rollups instead of countries.
    #[arg(long)]
    pub continents: bool,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct LatestArgs {
    /// Metric column to rank by.
    #[arg(short, long, default_value = "people_fully_vaccinated_per_hundred")]
    pub metric: String,

    #[arg(long, value_enum, default_value_t = Basis::Absolute)]
    pub basis: Basis,

    /// Extra columns to join, comma-separated (e.g. `gdp_per_capita,human_development_index`).
    #[arg(long = "with", value_delimiter = ',')]
    pub extras: Vec<String>,

    /// Keep only countries reporting every extra column.
    #[arg(long)]
    pub complete: bool,

    /// Number of countries to show (0 shows all).
    #[arg(short, default_value_t = DEFAULT_TOP_N)]
    pub n: usize,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct RaceArgs {
    #[arg(short, long, default_value = "total_cases")]
    pub metric: String,

    #[arg(long, value_enum, default_value_t = Basis::Absolute)]
    pub basis: Basis,

    /// Countries per frame.
    #[arg(short, default_value_t = DEFAULT_TOP_N)]
    pub n: usize,

    #[arg(long, value_enum, default_value_t = Cadence::Weekly)]
    pub cadence: Cadence,

    #[command(flatten)]
    pub range: RangeArgs,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct CompareArgs {
    /// Location to compare (repeatable, at most five).
    #[arg(short, long = "location", required = true)]
    pub locations: Vec<String>,

    /// Metric column to compare.
    #[arg(short, long, default_value = "new_cases")]
    pub metric: String,

    #[arg(long, value_enum, default_value_t = Basis::Absolute)]
    pub basis: Basis,

    #[arg(long, value_enum, default_value_t = Cadence::Daily)]
    pub cadence: Cadence,

    /// Trailing rolling-mean window in periods (1 disables smoothing).
    #[arg(long, default_value_t = DEFAULT_WINDOW)]
    pub window: usize,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ProfileArgs {
    /// Location name as it appears in the dataset.
    pub location: String,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    /// Comma-separated column list, in output order (default: every column).
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Restrict to these locations (repeatable).
    #[arg(short, long = "location")]
    pub locations: Vec<String>,

    /// Restrict to a named region.
    #[arg(long, value_enum)]
    pub region: Option<Region>,

    /// Drop aggregate rows (World, continents, income groups).
    #[arg(long)]
    pub countries_only: bool,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Output file (stdout when omitted).
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_accepts_repeated_locations_and_defaults() {
        let cli = Cli::try_parse_from([
            "owid", "compare", "-l", "Spain", "-l", "Italy", "--cadence", "weekly", "--from", "2021-01-01",
        ])
        .unwrap();
        let Command::Compare(args) = cli.command else {
            panic!("expected compare");
        };
        assert_eq!(args.locations, vec!["Spain".to_string(), "Italy".to_string()]);
        assert_eq!(args.cadence, Cadence::Weekly);
        assert_eq!(args.window, DEFAULT_WINDOW);
        assert_eq!(args.range.from, NaiveDate::from_ymd_opt(2021, 1, 1));
        assert_eq!(args.range.to, None);
    }

    #[test]
    fn export_splits_columns_on_commas() {
        let cli = Cli::try_parse_from([
            "owid", "--data", "x.csv", "export", "--columns", "date,location,new_cases", "--region", "europe",
        ])
        .unwrap();
        assert_eq!(cli.data, PathBuf::from("x.csv"));
        let Command::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.columns, vec!["date", "location", "new_cases"]);
        assert_eq!(args.region, Some(Region::Europe));
    }

    #[test]
    fn latest_splits_extras_and_race_defaults_to_weekly() {
        let cli = Cli::try_parse_from(["owid", "latest", "--with", "gdp_per_capita,human_development_index", "--complete"])
            .unwrap();
        let Command::Latest(args) = cli.command else {
            panic!("expected latest");
        };
        assert_eq!(args.metric, "people_fully_vaccinated_per_hundred");
        assert_eq!(args.extras, vec!["gdp_per_capita", "human_development_index"]);
        assert!(args.complete);

        let cli = Cli::try_parse_from(["owid", "race", "-n", "3"]).unwrap();
        let Command::Race(args) = cli.command else {
            panic!("expected race");
        };
        assert_eq!(args.cadence, Cadence::Weekly);
        assert_eq!(args.n, 3);
    }

    #[test]
    fn top_parses_basis() {
        let cli = Cli::try_parse_from(["owid", "top", "-m", "total_cases", "--basis", "per-million", "-n", "5"]).unwrap();
        let Command::Top(args) = cli.command else {
            panic!("expected top");
        };
        assert_eq!(args.basis, Basis::PerMillion);
        assert_eq!(args.n, 5);
    }
}
