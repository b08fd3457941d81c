//! Store fixtures and whole-range I/O helpers.
//!
//! The engine's single-call contract stops at block boundaries; tests that
//! care about whole ranges rather than the streaming contract use these
//! helpers to loop for them.

use lacuna_store::{SparseStore, StoreConfig};

/// A store with an 8-byte item: quantum 4, qset 2.
///
/// Small enough that multi-segment behaviour shows up within a few bytes.
#[must_use]
pub fn tiny_store() -> SparseStore {
    SparseStore::new(StoreConfig::new().quantum(4).qset(2)).expect("valid geometry")
}

/// A store with the given geometry; panics on invalid geometry.
#[must_use]
pub fn store_with(quantum: usize, qset: usize) -> SparseStore {
    SparseStore::new(StoreConfig::new().quantum(quantum).qset(qset)).expect("valid geometry")
}

/// Writes all of `data` at `offset`, looping over block boundaries.
///
/// # Panics
///
/// Panics if the store reports an error or stops making progress.
pub fn write_all(store: &SparseStore, mut offset: u64, mut data: &[u8]) {
    while !data.is_empty() {
        let written = store.write(offset, data).expect("write failed");
        assert!(written > 0, "write made no progress at offset {offset}");
        offset += written as u64;
        data = &data[written..];
    }
}

/// Reads up to `len` bytes at `offset`, looping over block boundaries.
///
/// Stops early at end-of-data or a hole, so the result may be shorter
/// than `len`.
#[must_use]
pub fn read_all(store: &SparseStore, mut offset: u64, mut len: usize) -> Vec<u8> {
    let mut out = Vec::new();
    while len > 0 {
        let chunk = store.read(offset, len).expect("read failed");
        if chunk.is_empty() {
            break;
        }
        offset += chunk.len() as u64;
        len -= chunk.len();
        out.extend_from_slice(&chunk);
    }
    out
}
