//! CLI command implementations.

pub mod exercise;
pub mod report;

use lacuna_store::{Handle, OpenMode, StoreConfig, StoreSet};
use std::io::{Seek, SeekFrom, Write};
use std::sync::Arc;
use tracing::debug;

/// Builds a store set and applies the scripted workload to every store:
/// `writes` payloads of `payload` bytes, each `stride` bytes past the end
/// of the previous one.
pub fn run_workload(
    stores: usize,
    config: StoreConfig,
    writes: usize,
    payload: usize,
    stride: u64,
) -> Result<StoreSet, Box<dyn std::error::Error>> {
    let set = StoreSet::new(stores, config)?;
    let data = vec![0xA5u8; payload];

    for (index, store) in set.iter().enumerate() {
        let mut handle = Handle::open(Arc::clone(store), OpenMode::ReadWrite);
        for _ in 0..writes {
            if stride > 0 {
                handle.seek(SeekFrom::Current(stride as i64))?;
            }
            handle.write_all(&data)?;
        }
        debug!(index, size = store.len(), "workload applied");
    }

    Ok(set)
}
