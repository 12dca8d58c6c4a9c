//! Shared dataset handle with atomic reload.
//!
//! There is no global "current dataset". Callers hold a `DatasetHandle`
//! (an `Arc<Dataset>` plus the generation it was loaded as) for the whole of a
//! request. `reload` parses the new source first and only then swaps the
//! handle, so readers in flight keep the dataset they started with and a
//! failed reload leaves the current one in place.

pub mod cache;

use std::ops::Deref;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::data::Dataset;
use crate::error::PipelineError;
use crate::io::ingest::{LoadOptions, LoadReport, Source};

pub use cache::{CacheStats, ViewCache};

/// Immutable, cheaply clonable reference to one loaded dataset.
#[derive(Debug, Clone)]
pub struct DatasetHandle {
    dataset: Arc<Dataset>,
    generation: u64,
}

impl DatasetHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

impl Deref for DatasetHandle {
    type Target = Dataset;

    fn deref(&self) -> &Dataset {
        &self.dataset
    }
}

pub struct DatasetStore {
    current: RwLock<DatasetHandle>,
    options: LoadOptions,
}

impl DatasetStore {
    pub fn new(dataset: Dataset, options: LoadOptions) -> Self {
        Self {
            current: RwLock::new(DatasetHandle {
                dataset: Arc::new(dataset),
                generation: 0,
            }),
            options,
        }
    }

    pub fn open(source: &Source, options: LoadOptions) -> Result<(Self, LoadReport), PipelineError> {
        let loaded = source.load(&options)?;
        Ok((Self::new(loaded.dataset, options), loaded.report))
    }

    pub fn current(&self) -> DatasetHandle {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Swap in `dataset` and return its handle.
    pub fn replace(&self, dataset: Dataset) -> DatasetHandle {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let handle = DatasetHandle {
            dataset: Arc::new(dataset),
            generation: guard.generation + 1,
        };
        *guard = handle.clone();
        info!(generation = handle.generation, rows = handle.len(), "dataset swapped");
        handle
    }

    /// Load `source` and swap it in. On error the current dataset stays.
    pub fn reload(&self, source: &Source) -> Result<(DatasetHandle, LoadReport), PipelineError> {
        let loaded = source.load(&self.options)?;
        Ok((self.replace(loaded.dataset), loaded.report))
    }
}

/// The store plus its view cache, reloaded together.
pub struct Explorer {
    store: DatasetStore,
    views: ViewCache,
}

impl Explorer {
    pub fn new(store: DatasetStore, views: ViewCache) -> Self {
        Self { store, views }
    }

    pub fn open(source: &Source, options: LoadOptions) -> Result<(Self, LoadReport), PipelineError> {
        let (store, report) = DatasetStore::open(source, options)?;
        Ok((Self::new(store, ViewCache::default()), report))
    }

    pub fn handle(&self) -> DatasetHandle {
        self.store.current()
    }

    pub fn views(&self) -> &ViewCache {
        &self.views
    }

    /// Reload the source, then drop every memoized view of older generations.
    pub fn reload(&self, source: &Source) -> Result<(DatasetHandle, LoadReport), PipelineError> {
        let reloaded = self.store.reload(source)?;
        self.views.invalidate_all();
        Ok(reloaded)
    }
}
