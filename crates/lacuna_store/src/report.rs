//! Occupancy reporting over a store set.
//!
//! The report is a restartable, position-indexed pass: one record per
//! store, each listing the populated segments and their allocated block
//! slots. Every step tries the store's access guard without blocking; if a
//! mutator holds it the step yields a busy record instead of waiting.
//! Reporting favours liveness over completeness and never disturbs I/O.

use crate::set::StoreSet;
use std::fmt;
use tracing::debug;

/// Occupancy of one segment: which block slots are allocated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentSnapshot {
    /// Position of the segment along the chain.
    pub index: usize,
    /// Indices of the allocated block slots, in order.
    pub blocks: Vec<usize>,
}

/// Point-in-time occupancy of one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshot {
    /// Bytes per block of the live chain.
    pub quantum: usize,
    /// Block slots per segment of the live chain.
    pub qset: usize,
    /// The store's advertised length.
    pub logical_size: u64,
    /// Populated segments; segments with no allocated blocks are omitted.
    pub segments: Vec<SegmentSnapshot>,
}

/// One step of a reporting pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreRecord {
    /// The store's occupancy at the time of the step.
    Snapshot {
        /// Index of the store within the set.
        index: usize,
        /// The captured occupancy.
        snapshot: StoreSnapshot,
    },
    /// The store's guard was held; the record is omitted from this pass.
    Busy {
        /// Index of the store within the set.
        index: usize,
    },
}

impl fmt::Display for StoreRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreRecord::Busy { index } => writeln!(f, "store {index}: busy"),
            StoreRecord::Snapshot { index, snapshot } => {
                writeln!(
                    f,
                    "store {index}: quantum {}, qset {}, size {}",
                    snapshot.quantum, snapshot.qset, snapshot.logical_size
                )?;
                for segment in &snapshot.segments {
                    writeln!(
                        f,
                        "  segment {}: {} block(s)",
                        segment.index,
                        segment.blocks.len()
                    )?;
                    for block in &segment.blocks {
                        writeln!(f, "    block {block}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// A single reporting pass over a [`StoreSet`].
///
/// Finite: one record per store, in index order. Restart by opening a new
/// pass with [`StoreSet::report`], or jump with [`ReportIter::skip_to`].
#[derive(Debug)]
pub struct ReportIter<'a> {
    set: &'a StoreSet,
    position: usize,
}

impl<'a> ReportIter<'a> {
    pub(crate) fn new(set: &'a StoreSet) -> Self {
        Self { set, position: 0 }
    }

    /// Returns the index the next step will report.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves the pass to `position`, for position-based restart.
    pub fn skip_to(&mut self, position: usize) {
        self.position = position;
    }
}

impl Iterator for ReportIter<'_> {
    type Item = StoreRecord;

    fn next(&mut self) -> Option<StoreRecord> {
        let index = self.position;
        let store = self.set.get(index)?;
        self.position += 1;

        match store.try_snapshot() {
            Ok(snapshot) => Some(StoreRecord::Snapshot { index, snapshot }),
            Err(_) => {
                debug!(index, "store busy during report");
                Some(StoreRecord::Busy { index })
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.set.len().saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;

    fn small_set() -> StoreSet {
        StoreSet::new(2, StoreConfig::new().quantum(4).qset(2)).unwrap()
    }

    #[test]
    fn reports_occupancy_per_store() {
        let set = small_set();
        set.get(0).unwrap().write(0, b"ABCD").unwrap();
        set.get(0).unwrap().write(10, b"XY").unwrap();

        let records: Vec<_> = set.report().collect();
        assert_eq!(records.len(), 2);

        let StoreRecord::Snapshot { index, snapshot } = &records[0] else {
            panic!("expected snapshot, got {:?}", records[0]);
        };
        assert_eq!(*index, 0);
        assert_eq!(snapshot.logical_size, 12);
        assert_eq!(
            snapshot.segments,
            vec![
                SegmentSnapshot {
                    index: 0,
                    blocks: vec![0]
                },
                SegmentSnapshot {
                    index: 1,
                    blocks: vec![0]
                },
            ]
        );

        let StoreRecord::Snapshot { snapshot, .. } = &records[1] else {
            panic!("expected snapshot, got {:?}", records[1]);
        };
        assert!(snapshot.segments.is_empty());
    }

    #[test]
    fn busy_store_yields_busy_record() {
        let set = small_set();
        let guard = set.get(1).unwrap().hold_guard_for_test();

        let records: Vec<_> = set.report().collect();
        assert!(matches!(records[0], StoreRecord::Snapshot { index: 0, .. }));
        assert_eq!(records[1], StoreRecord::Busy { index: 1 });

        // The pass completed despite the contention.
        assert_eq!(records.len(), 2);
        drop(guard);
    }

    #[test]
    fn pass_is_restartable() {
        let set = small_set();
        set.get(1).unwrap().write(0, b"Z").unwrap();

        let first: Vec<_> = set.report().collect();
        let second: Vec<_> = set.report().collect();
        assert_eq!(first, second);

        let mut resumed = set.report();
        resumed.skip_to(1);
        assert_eq!(resumed.position(), 1);
        let records: Vec<_> = resumed.collect();
        assert_eq!(records.len(), 1);
        assert!(matches!(records[0], StoreRecord::Snapshot { index: 1, .. }));
    }

    #[test]
    fn render_text() {
        let set = small_set();
        set.get(0).unwrap().write(0, b"ABCD").unwrap();

        let record = set.report().next().unwrap();
        let text = record.to_string();
        assert!(text.starts_with("store 0: quantum 4, qset 2, size 4"));
        assert!(text.contains("segment 0: 1 block(s)"));
        assert!(text.contains("    block 0"));
    }
}
