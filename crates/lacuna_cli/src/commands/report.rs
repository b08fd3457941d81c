//! Report command implementation.

use lacuna_store::StoreConfig;
use tracing::info;

/// Runs the report command: applies the workload and renders the
/// occupancy report for the whole set.
pub fn run(
    stores: usize,
    config: StoreConfig,
    writes: usize,
    payload: usize,
    stride: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(stores, writes, payload, stride, "building report");
    let set = super::run_workload(stores, config, writes, payload, stride)?;

    for record in set.report() {
        print!("{record}");
    }

    Ok(())
}
