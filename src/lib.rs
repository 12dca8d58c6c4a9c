//! `owid-explorer` library crate.
//!
//! Loads the OWID COVID-19 per-location-per-day CSV, cleans it, and derives
//! views from it: per-capita normalization, rolling smoothing, weekly/monthly
//! resampling, rankings, comparisons and summaries.
//!
//! The binary (`owid`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the views are reusable by other front-ends (a web dashboard, notebooks)

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
pub mod series;
pub mod store;
pub mod views;
