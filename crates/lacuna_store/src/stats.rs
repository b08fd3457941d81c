//! Store diagnostics counters.
//!
//! Counters live outside the access guard on purpose: diagnostics must
//! never contend with I/O, so everything here is a relaxed atomic. The
//! open-handle gauge is the only piece of store state mutated without
//! holding the guard.

use std::sync::atomic::{AtomicU64, Ordering};

/// Diagnostics counters for one store.
///
/// All counters are atomic and can be read while operations are in
/// progress. Values are monotonically increasing except the
/// `open_handles` gauge.
#[derive(Debug, Default)]
pub struct StoreStats {
    /// Total read operations (including zero-length hole/EOF reads).
    reads: AtomicU64,
    /// Total write operations.
    writes: AtomicU64,
    /// Total bytes returned by reads.
    bytes_read: AtomicU64,
    /// Total bytes committed by writes.
    bytes_written: AtomicU64,
    /// Total trims.
    trims: AtomicU64,
    /// Total reconfigurations.
    reconfigures: AtomicU64,
    /// Total `try_` calls rejected because the guard was held.
    busy_rejections: AtomicU64,
    /// Currently-open handles (gauge).
    open_handles: AtomicU64,
}

impl StoreStats {
    /// Creates a zeroed stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    // === Increment methods (internal use) ===

    /// Records a read operation and the bytes it returned.
    pub(crate) fn record_read(&self, bytes: u64) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Records a write operation and the bytes it committed.
    pub(crate) fn record_write(&self, bytes: u64) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Records a trim.
    pub(crate) fn record_trim(&self) {
        self.trims.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a reconfiguration.
    pub(crate) fn record_reconfigure(&self) {
        self.reconfigures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a rejected `try_` acquisition.
    pub(crate) fn record_busy(&self) {
        self.busy_rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a handle opening.
    pub(crate) fn record_open(&self) {
        self.open_handles.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a handle closing.
    pub(crate) fn record_release(&self) {
        self.open_handles.fetch_sub(1, Ordering::Relaxed);
    }

    // === Getter methods (public API) ===

    /// Returns the total number of read operations.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Returns the total number of write operations.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Returns the total bytes returned by reads.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.load(Ordering::Relaxed)
    }

    /// Returns the total bytes committed by writes.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Returns the total number of trims.
    pub fn trims(&self) -> u64 {
        self.trims.load(Ordering::Relaxed)
    }

    /// Returns the total number of reconfigurations.
    pub fn reconfigures(&self) -> u64 {
        self.reconfigures.load(Ordering::Relaxed)
    }

    /// Returns how many `try_` calls were rejected with busy.
    ///
    /// A high count means reporting is racing heavy I/O.
    pub fn busy_rejections(&self) -> u64 {
        self.busy_rejections.load(Ordering::Relaxed)
    }

    /// Returns the number of currently-open handles.
    pub fn open_handles(&self) -> u64 {
        self.open_handles.load(Ordering::Relaxed)
    }

    /// Returns a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            reads: self.reads(),
            writes: self.writes(),
            bytes_read: self.bytes_read(),
            bytes_written: self.bytes_written(),
            trims: self.trims(),
            reconfigures: self.reconfigures(),
            busy_rejections: self.busy_rejections(),
            open_handles: self.open_handles(),
        }
    }
}

/// A point-in-time snapshot of store statistics.
///
/// Unlike [`StoreStats`], a plain struct that can be compared or passed
/// across threads without atomics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Total read operations.
    pub reads: u64,
    /// Total write operations.
    pub writes: u64,
    /// Total bytes returned by reads.
    pub bytes_read: u64,
    /// Total bytes committed by writes.
    pub bytes_written: u64,
    /// Total trims.
    pub trims: u64,
    /// Total reconfigurations.
    pub reconfigures: u64,
    /// Total busy rejections on the `try_` surface.
    pub busy_rejections: u64,
    /// Currently-open handles.
    pub open_handles: u64,
}
