//! Country vs aggregate classification.
//!
//! The source table mixes real countries with rollups ("World", continents,
//! income groups, the EU). Rollups must never leak into per-country rankings
//! or comparisons, so every country-level view goes through this module.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Continent rollups that appear as `location` values.
pub const CONTINENTS: [&str; 6] = [
    "Africa",
    "Asia",
    "Europe",
    "North America",
    "Oceania",
    "South America",
];

/// Non-continent rollups that appear as `location` values.
pub const OTHER_AGGREGATES: [&str; 15] = [
    "World",
    "World excl. China",
    "World excl. China and South Korea",
    "World excl. China, South Korea, Japan and Singapore",
    "European Union",
    "European Union (27)",
    "International",
    "High income",
    "Upper middle income",
    "Lower middle income",
    "Low income",
    "High-income countries",
    "Upper-middle-income countries",
    "Lower-middle-income countries",
    "Low-income countries",
];

/// Aggregate iso codes in the source all share this prefix (`OWID_WRL`, `OWID_EUN`, ...).
pub const AGGREGATE_ISO_PREFIX: &str = "OWID_";

/// True for a real country, false for any rollup in the fixed exclusion set.
pub fn is_country(location: &str) -> bool {
    let location = location.trim();
    !is_continent(location) && !OTHER_AGGREGATES.contains(&location)
}

pub fn is_continent(location: &str) -> bool {
    CONTINENTS.contains(&location.trim())
}

pub fn is_aggregate_iso(iso_code: &str) -> bool {
    iso_code.trim().starts_with(AGGREGATE_ISO_PREFIX)
}

/// Named groups of countries used to scope a filtered subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Europe,
}

const EUROPE: [&str; 45] = [
    "Albania",
    "Andorra",
    "Austria",
    "Belarus",
    "Belgium",
    "Bosnia and Herzegovina",
    "Bulgaria",
    "Croatia",
    "Cyprus",
    "Czechia",
    "Denmark",
    "Estonia",
    "Finland",
    "France",
    "Germany",
    "Greece",
    "Hungary",
    "Iceland",
    "Ireland",
    "Italy",
    "Kosovo",
    "Latvia",
    "Lithuania",
    "Luxembourg",
    "Malta",
    "Moldova",
    "Monaco",
    "Montenegro",
    "Netherlands",
    "North Macedonia",
    "Norway",
    "Poland",
    "Portugal",
    "Romania",
    "Russia",
    "San Marino",
    "Serbia",
    "Slovakia",
    "Slovenia",
    "Spain",
    "Sweden",
    "Switzerland",
    "Ukraine",
    "United Kingdom",
    "Vatican",
];

impl Region {
    pub fn members(self) -> &'static [&'static str] {
        match self {
            Region::Europe => &EUROPE,
        }
    }

    pub fn contains(self, location: &str) -> bool {
        self.members().contains(&location.trim())
    }
}
