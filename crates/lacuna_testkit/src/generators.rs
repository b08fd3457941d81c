//! Property-based test generators using proptest.
//!
//! Provides strategies for generating store geometries, offsets and
//! payloads that keep the engine's invariants exercisable.

use lacuna_store::StoreConfig;
use proptest::prelude::*;

/// Strategy for generating small but varied geometries.
///
/// Quanta and qsets stay small so a few kilobytes of writes span many
/// segments.
pub fn geometry_strategy() -> impl Strategy<Value = StoreConfig> {
    (1usize..=16, 1usize..=8)
        .prop_map(|(quantum, qset)| StoreConfig::new().quantum(quantum).qset(qset))
}

/// Strategy for generating write offsets, biased towards the origin where
/// segment 0 edge cases live.
pub fn offset_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![
        4 => 0u64..64,
        1 => 0u64..100_000,
    ]
}

/// Strategy for generating non-empty payloads.
pub fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..256)
}
