//! Derived views consumed by presentation layers.
//!
//! Every view is a pure function of a borrowed `Dataset` and its parameters.
//! Memoization lives in `store::cache`, never in here.

pub mod compare;
pub mod latest;
pub mod race;
pub mod ranking;
pub mod summary;

pub use compare::{Comparison, MAX_COMPARED, Omission, OmissionReason, compare};
pub use latest::{LatestValue, latest_values};
pub use race::{RaceFrame, race_frames};
pub use ranking::{DEFAULT_TOP_N, latest_date, top_n};
pub use summary::{CountryProfile, GlobalSummary, MetricValue, country_profile, global_summary};
