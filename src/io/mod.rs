//! Input/output helpers.
//!
//! - CSV ingest + cleaning (`ingest`)
//! - CSV export of filtered subsets (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
