//! Store geometry configuration.

use crate::error::{StoreError, StoreResult};

/// Geometry of a sparse store: how bytes map onto segments and blocks.
///
/// `quantum` is the size in bytes of one block, `qset` the number of block
/// slots per segment. One segment therefore addresses
/// `quantum * qset` contiguous bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Bytes per block.
    pub quantum: usize,

    /// Block slots per segment.
    pub qset: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            quantum: 4000, // just under a page, leaving header room
            qset: 1000,
        }
    }
}

impl StoreConfig {
    /// Creates a configuration with default geometry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the block size in bytes.
    #[must_use]
    pub const fn quantum(mut self, bytes: usize) -> Self {
        self.quantum = bytes;
        self
    }

    /// Sets the number of block slots per segment.
    #[must_use]
    pub const fn qset(mut self, slots: usize) -> Self {
        self.qset = slots;
        self
    }

    /// Returns the number of bytes one segment addresses.
    ///
    /// Saturates at `u64::MAX` for geometries whose product would wrap;
    /// [`StoreConfig::validate`] rejects those before a store is built, so
    /// addressing arithmetic never sees a wrapped item size.
    #[must_use]
    pub const fn item_size(&self) -> u64 {
        match (self.quantum as u64).checked_mul(self.qset as u64) {
            Some(size) => size,
            None => u64::MAX,
        }
    }

    /// Validates the geometry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidArgument`] if `quantum` or `qset` is
    /// zero, or if `quantum * qset` overflows `u64`. Called before any
    /// mutation so a bad reconfigure never touches store state.
    pub fn validate(&self) -> StoreResult<()> {
        if self.quantum == 0 {
            return Err(StoreError::invalid_argument("quantum must be non-zero"));
        }
        if self.qset == 0 {
            return Err(StoreError::invalid_argument("qset must be non-zero"));
        }
        if (self.quantum as u64).checked_mul(self.qset as u64).is_none() {
            return Err(StoreError::invalid_argument("quantum * qset overflows u64"));
        }
        Ok(())
    }
}
