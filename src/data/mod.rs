//! The cleaned dataset and the country/aggregate partitioning over it.

pub mod dataset;
pub mod regions;

use std::collections::BTreeSet;

pub use dataset::{Dataset, Filter, Schema};
pub use regions::{Region, is_continent, is_country};

/// Every real country present in `dataset`.
pub fn countries(dataset: &Dataset) -> BTreeSet<String> {
    dataset.countries()
}
