//! Reporting utilities: terminal tables for the views and the load report.

mod format;

pub use format::{
    format_comparison, format_latest, format_load_report, format_profile, format_race, format_ranking, format_summary,
};
