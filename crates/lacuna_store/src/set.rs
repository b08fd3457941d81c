//! A fixed set of store instances sharing one initial geometry.

use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::report::ReportIter;
use crate::store::SparseStore;
use std::sync::Arc;

/// A multi-instance deployment: `N` independent stores created from one
/// configuration.
///
/// Stores in a set share nothing but their initial geometry; each has its
/// own access guard and may be reconfigured independently. The set is the
/// unit the occupancy report enumerates.
#[derive(Debug)]
pub struct StoreSet {
    stores: Vec<Arc<SparseStore>>,
}

impl StoreSet {
    /// Default number of stores in a set.
    pub const DEFAULT_COUNT: usize = 4;

    /// Creates `count` empty stores with the given geometry.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::InvalidArgument`] if the geometry is
    /// invalid; no store is created in that case.
    pub fn new(count: usize, config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        let mut stores = Vec::with_capacity(count);
        for _ in 0..count {
            stores.push(Arc::new(SparseStore::new(config)?));
        }
        Ok(Self { stores })
    }

    /// Returns the number of stores in the set.
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    /// Returns `true` if the set holds no stores.
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Returns the store at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Arc<SparseStore>> {
        self.stores.get(index)
    }

    /// Iterates over the stores in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<SparseStore>> {
        self.stores.iter()
    }

    /// Opens one reporting pass over the set.
    ///
    /// Each call starts a fresh pass; see [`ReportIter`].
    pub fn report(&self) -> ReportIter<'_> {
        ReportIter::new(self)
    }
}
