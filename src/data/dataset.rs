//! The in-memory dataset: cleaned records partitioned by location.
//!
//! A `Dataset` is immutable once built. Every view borrows it; every transform
//! that needs a different shape (filtering, an added normalized column)
//! returns a new `Dataset`.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Range;

use chrono::NaiveDate;

use crate::data::regions::{self, Region};
use crate::domain::{DateRange, Observation, Record};
use crate::error::PipelineError;

/// Metric column names in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl Schema {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut schema = Self::default();
        for column in columns {
            schema.push(column.into());
        }
        schema
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Append a column, returning its index. Re-adding a name returns the existing slot.
    pub(crate) fn push(&mut self, name: String) -> usize {
        if let Some(&idx) = self.index.get(&name) {
            return idx;
        }
        let idx = self.columns.len();
        self.index.insert(name.clone(), idx);
        self.columns.push(name);
        idx
    }
}

/// Row selection used to carve filtered subsets (for views and exports).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    /// Explicit location names; empty means every location.
    pub locations: BTreeSet<String>,
    pub region: Option<Region>,
    pub range: DateRange,
    /// Drop every aggregate location.
    pub countries_only: bool,
}

impl Filter {
    fn matches(&self, dataset: &Dataset, record: &Record) -> bool {
        self.range.contains(record.date)
            && (self.locations.is_empty() || self.locations.contains(&record.location))
            && self.region.is_none_or(|r| r.contains(&record.location))
            && !(self.countries_only && dataset.is_aggregate(&record.location))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    schema: Schema,
    /// Sorted by `(location, date)`, no duplicate keys.
    records: Vec<Record>,
    partitions: BTreeMap<String, Range<usize>>,
    /// Locations whose rows carry an `OWID_*` iso code.
    aggregate_codes: BTreeSet<String>,
}

impl Dataset {
    /// Sort and deduplicate raw records into a dataset.
    ///
    /// Duplicate `(location, date)` keys keep the record that appeared last in
    /// `records`. Returns the dataset and the number of records replaced.
    pub fn from_records(schema: Schema, mut records: Vec<Record>) -> (Self, usize) {
        for record in &mut records {
            record.values.resize(schema.len(), None);
        }

        // Stable sort: duplicates stay in source order so the last one wins below.
        records.sort_by(|a, b| a.location.cmp(&b.location).then(a.date.cmp(&b.date)));

        let before = records.len();
        let mut deduped: Vec<Record> = Vec::with_capacity(before);
        for record in records {
            match deduped.last_mut() {
                Some(prev) if prev.location == record.location && prev.date == record.date => *prev = record,
                _ => deduped.push(record),
            }
        }
        let replaced = before - deduped.len();

        (Self::from_sorted(schema, deduped), replaced)
    }

    fn from_sorted(schema: Schema, records: Vec<Record>) -> Self {
        let mut partitions = BTreeMap::new();
        let mut start = 0;
        for i in 1..=records.len() {
            if i == records.len() || records[i].location != records[start].location {
                partitions.insert(records[start].location.clone(), start..i);
                start = i;
            }
        }

        let aggregate_codes = records
            .iter()
            .filter(|r| regions::is_aggregate_iso(&r.iso_code))
            .map(|r| r.location.clone())
            .collect();

        Self {
            schema,
            records,
            partitions,
            aggregate_codes,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Location names in ascending order.
    pub fn locations(&self) -> impl Iterator<Item = &str> + '_ {
        self.partitions.keys().map(String::as_str)
    }

    pub fn contains_location(&self, location: &str) -> bool {
        self.partitions.contains_key(location)
    }

    /// Records of one location in date order (empty for unknown locations).
    pub fn records_for(&self, location: &str) -> &[Record] {
        match self.partitions.get(location) {
            Some(range) => &self.records[range.clone()],
            None => &[],
        }
    }

    pub fn metric_index(&self, metric: &str) -> Result<usize, PipelineError> {
        self.schema
            .index_of(metric)
            .ok_or_else(|| PipelineError::unknown_column(metric))
    }

    /// Raw observations of `metric` for one location inside `range`.
    pub fn series(&self, location: &str, metric: &str, range: DateRange) -> Result<Vec<Observation>, PipelineError> {
        let idx = self.metric_index(metric)?;
        Ok(self
            .records_for(location)
            .iter()
            .filter(|r| range.contains(r.date))
            .map(|r| Observation::new(r.date, r.value(idx)))
            .collect())
    }

    /// Value of the metric at column `idx` for `location` on exactly `date`.
    pub fn value_at(&self, location: &str, idx: usize, date: NaiveDate) -> Option<f64> {
        let records = self.records_for(location);
        records
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .and_then(|i| records[i].value(idx))
    }

    /// True for rollups: named aggregates or locations coded `OWID_*`.
    pub fn is_aggregate(&self, location: &str) -> bool {
        !regions::is_country(location) || self.aggregate_codes.contains(location)
    }

    pub fn countries(&self) -> BTreeSet<String> {
        self.locations()
            .filter(|l| !self.is_aggregate(l))
            .map(str::to_string)
            .collect()
    }

    pub fn continents(&self) -> BTreeSet<String> {
        self.locations()
            .filter(|l| regions::is_continent(l))
            .map(str::to_string)
            .collect()
    }

    /// Earliest and latest date across all records.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some((min, max))
    }

    /// New dataset holding only the rows `filter` selects, order and schema preserved.
    pub fn filter(&self, filter: &Filter) -> Dataset {
        if filter.range.is_empty() {
            return Self::from_sorted(self.schema.clone(), Vec::new());
        }
        let records = self
            .records
            .iter()
            .filter(|r| filter.matches(self, r))
            .cloned()
            .collect();
        Self::from_sorted(self.schema.clone(), records)
    }

    /// New dataset with column `name` set from `values` (aligned with `records()`).
    pub(crate) fn with_column(&self, name: &str, values: Vec<Option<f64>>) -> Dataset {
        let mut schema = self.schema.clone();
        let idx = schema.push(name.to_string());
        let width = schema.len();

        let records = self
            .records
            .iter()
            .zip(values)
            .map(|(record, value)| {
                let mut record = record.clone();
                record.values.resize(width, None);
                record.values[idx] = value;
                record
            })
            .collect();

        Self {
            schema,
            records,
            partitions: self.partitions.clone(),
            aggregate_codes: self.aggregate_codes.clone(),
        }
    }
}
