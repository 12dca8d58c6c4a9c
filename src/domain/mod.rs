//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - cleaned source rows (`Record`) and series points (`Observation`)
//! - view parameters (`DateRange`, `Cadence`, `Basis`, `RankMode`, `DeriveOptions`)
//! - view outputs (`DerivedSeries`, `RankEntry`)
//! - metric classification for resampling (`MetricKind`)

pub mod metric;
pub mod types;

pub use metric::*;
pub use types::*;
