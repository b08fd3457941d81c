//! # Lacuna Store
//!
//! A sparse, dynamically-growing in-memory byte store addressed by a
//! two-level block index.
//!
//! A [`SparseStore`] exposes an arbitrarily large, randomly-addressable
//! byte stream while only allocating memory for the ranges actually
//! written. Bytes live in fixed-size blocks ("quanta") hanging off a
//! singly linked list of segments, each holding `qset` block slots;
//! segments, slot arrays and blocks all come into existence lazily on
//! first write. Never-written regions are holes and read back as
//! end-of-data, never as an error.
//!
//! This crate provides:
//! - [`SparseStore`]: read/write/trim/reconfigure over the segment chain,
//!   serialized through a per-store access guard with a blocking and a
//!   non-blocking (`try_`) surface
//! - [`Handle`]: a cursor-based byte stream implementing the std `io`
//!   traits
//! - [`StoreSet`] and [`ReportIter`]: multi-instance deployments and a
//!   non-blocking occupancy report
//! - [`StoreStats`]: diagnostics counters kept outside the guard
//!
//! ## Example
//!
//! ```rust
//! use lacuna_store::{SparseStore, StoreConfig};
//!
//! let store = SparseStore::new(StoreConfig::new().quantum(4).qset(2)).unwrap();
//!
//! store.write(0, b"ABCD").unwrap();
//! store.write(4, b"EFGH").unwrap();
//! assert_eq!(store.read(4, 4).unwrap(), b"EFGH");
//!
//! // A write far past the end allocates only the block it touches.
//! store.write(4_000, b"tail").unwrap();
//! assert_eq!(store.len(), 4_004);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod handle;
mod report;
mod segment;
mod set;
mod stats;
mod store;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use handle::{Handle, OpenMode};
pub use report::{ReportIter, SegmentSnapshot, StoreRecord, StoreSnapshot};
pub use set::StoreSet;
pub use stats::{StatsSnapshot, StoreStats};
pub use store::SparseStore;

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
