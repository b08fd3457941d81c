//! Exercise command implementation.

use lacuna_store::StoreConfig;
use tracing::info;

/// Runs the exercise command: applies the workload and prints a stats
/// snapshot per store.
pub fn run(
    stores: usize,
    config: StoreConfig,
    writes: usize,
    payload: usize,
    stride: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(stores, writes, payload, stride, "starting exercise");
    let set = super::run_workload(stores, config, writes, payload, stride)?;

    for (index, store) in set.iter().enumerate() {
        let snap = store.stats().snapshot();
        println!("store {index}: size {}", store.len());
        println!("  writes          {}", snap.writes);
        println!("  bytes written   {}", snap.bytes_written);
        println!("  reads           {}", snap.reads);
        println!("  bytes read      {}", snap.bytes_read);
        println!("  trims           {}", snap.trims);
        println!("  busy rejections {}", snap.busy_rejections);
    }

    Ok(())
}
