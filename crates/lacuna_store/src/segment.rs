//! Segment chain: the two-level block index.
//!
//! A store's bytes live in fixed-size blocks ("quanta") hanging off a singly
//! linked list of segments. Each segment owns an optional array of `qset`
//! block slots; both the array and the blocks themselves are allocated the
//! first time a write touches them, so a store only pays for the byte ranges
//! actually written.

use std::collections::TryReserveError;

/// A lazily-allocated block of `quantum` bytes.
pub(crate) type Block = Box<[u8]>;

/// Marker for a failed slot-array or block allocation.
///
/// Carries no context of its own; the store maps it to
/// [`crate::StoreError::AllocationFailed`] with the offset and length of the
/// operation that needed the memory.
#[derive(Debug)]
pub(crate) struct AllocError;

impl From<TryReserveError> for AllocError {
    fn from(_: TryReserveError) -> Self {
        AllocError
    }
}

/// One node in the segment chain.
///
/// Owns its successor exclusively; the first segment is owned by the store.
pub(crate) struct Segment {
    /// Block slots, absent until a write reaches this segment.
    slots: Option<Vec<Option<Block>>>,
    /// The next segment in the chain.
    pub(crate) next: Option<Box<Segment>>,
}

impl Segment {
    /// Creates an empty segment: no slot array, no successor.
    pub(crate) fn boxed() -> Box<Segment> {
        Box::new(Segment {
            slots: None,
            next: None,
        })
    }

    /// Returns the block at `index`, if it has been allocated.
    pub(crate) fn block(&self, index: usize) -> Option<&[u8]> {
        self.slots
            .as_ref()
            .and_then(|slots| slots.get(index))
            .and_then(|slot| slot.as_deref())
    }

    /// Returns the block at `index`, allocating the slot array and the
    /// block itself as needed.
    pub(crate) fn block_mut(
        &mut self,
        index: usize,
        quantum: usize,
        qset: usize,
    ) -> Result<&mut [u8], AllocError> {
        let slots = self.slots.get_or_insert_with(Vec::new);
        if slots.is_empty() {
            slots.try_reserve_exact(qset)?;
            slots.resize_with(qset, || None);
        }

        // Invariant: locate() keeps index < qset, and qset is validated
        // non-zero, so the array is never left empty once created.
        let slot = &mut slots[index];
        if slot.is_none() {
            *slot = Some(zeroed_block(quantum)?);
        }
        slot.as_deref_mut().ok_or(AllocError)
    }

    /// Indices of the allocated blocks in this segment, in order.
    pub(crate) fn allocated_slots(&self) -> Vec<usize> {
        self.slots
            .as_ref()
            .map(|slots| {
                slots
                    .iter()
                    .enumerate()
                    .filter_map(|(i, slot)| slot.is_some().then_some(i))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Drop for Segment {
    // Unlink the chain iteratively so a long store doesn't recurse
    // through Box drops.
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(mut segment) = next {
            next = segment.next.take();
        }
    }
}

/// Allocates a zero-initialised block of `quantum` bytes.
fn zeroed_block(quantum: usize) -> Result<Block, AllocError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(quantum)?;
    buf.resize(quantum, 0);
    Ok(buf.into_boxed_slice())
}
