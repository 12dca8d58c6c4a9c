//! Memoized views.
//!
//! Uses `moka::sync::Cache`, one cache per view. Keys carry the dataset
//! generation next to the view parameters, so a result computed against an
//! old handle can never be served for a newer one. `Explorer::reload` also
//! calls `invalidate_all` to free the stale entries.

use std::convert::Infallible;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use moka::sync::Cache;
use serde::Serialize;

use crate::domain::{Basis, DateRange, DeriveOptions, RankEntry, RankMode};
use crate::error::PipelineError;
use crate::series::normalize;
use crate::store::DatasetHandle;
use crate::views::{self, Comparison, GlobalSummary};

/// Maximum entries per view cache.
const MAX_ENTRIES: u64 = 512;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RankingKey {
    generation: u64,
    metric: String,
    basis: Basis,
    n: usize,
    at_date: NaiveDate,
    mode: RankMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CompareKey {
    generation: u64,
    locations: Vec<String>,
    metric: String,
    basis: Basis,
    range: DateRange,
    options: DeriveOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SummaryKey {
    generation: u64,
    range: DateRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

pub struct ViewCache {
    rankings: Cache<RankingKey, Arc<Vec<RankEntry>>>,
    comparisons: Cache<CompareKey, Arc<Comparison>>,
    summaries: Cache<SummaryKey, Arc<GlobalSummary>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for ViewCache {
    fn default() -> Self {
        Self::new(MAX_ENTRIES)
    }
}

impl ViewCache {
    pub fn new(max_entries: u64) -> Self {
        Self {
            rankings: Cache::new(max_entries),
            comparisons: Cache::new(max_entries),
            summaries: Cache::new(max_entries),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// `views::top_n` over `metric` expressed in `basis`.
    pub fn top_n(
        &self,
        handle: &DatasetHandle,
        metric: &str,
        basis: Basis,
        n: usize,
        at_date: NaiveDate,
        mode: RankMode,
    ) -> Result<Arc<Vec<RankEntry>>, PipelineError> {
        let key = RankingKey {
            generation: handle.generation(),
            metric: metric.to_string(),
            basis,
            n,
            at_date,
            mode,
        };
        self.lookup(&self.rankings, key, || {
            let dataset = normalize(handle.dataset(), metric, basis)?;
            views::top_n(&dataset, &basis.column_name(metric), n, at_date, mode)
        })
    }

    /// `views::compare` over `metric` expressed in `basis`.
    pub fn compare(
        &self,
        handle: &DatasetHandle,
        locations: &[String],
        metric: &str,
        basis: Basis,
        range: DateRange,
        options: DeriveOptions,
    ) -> Result<Arc<Comparison>, PipelineError> {
        let key = CompareKey {
            generation: handle.generation(),
            locations: locations.to_vec(),
            metric: metric.to_string(),
            basis,
            range,
            options,
        };
        self.lookup(&self.comparisons, key, || {
            let dataset = normalize(handle.dataset(), metric, basis)?;
            views::compare(&dataset, locations, &basis.column_name(metric), range, options)
        })
    }

    pub fn summary(&self, handle: &DatasetHandle, range: DateRange) -> Arc<GlobalSummary> {
        let key = SummaryKey {
            generation: handle.generation(),
            range,
        };
        let Ok(summary) = self.lookup::<_, _, Infallible>(&self.summaries, key, || {
            Ok(views::global_summary(handle.dataset(), range))
        });
        summary
    }

    pub fn invalidate_all(&self) {
        self.rankings.invalidate_all();
        self.comparisons.invalidate_all();
        self.summaries.invalidate_all();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn lookup<K, V, E>(
        &self,
        cache: &Cache<K, Arc<V>>,
        key: K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Send + Sync + 'static,
    {
        if let Some(hit) = cache.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = Arc::new(compute()?);
        cache.insert(key, Arc::clone(&value));
        Ok(value)
    }
}
