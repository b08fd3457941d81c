//! Byte-stream handles over a sparse store.
//!
//! A [`Handle`] owns a cursor and an open mode and exposes the store
//! through the std [`io::Read`], [`io::Write`] and [`io::Seek`] traits.
//! Each trait call makes exactly one engine call and advances the cursor
//! by the returned count, so short reads and writes at block boundaries
//! are normal; callers loop (or use `read_exact`/`write_all`) for more.

use crate::error::StoreError;
use crate::store::SparseStore;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::Arc;

/// Access mode of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Reads only; writes are rejected.
    ReadOnly,
    /// Writes only; reads are rejected. Opening trims the store
    /// (truncate-on-write-only-open).
    WriteOnly,
    /// Reads and writes.
    ReadWrite,
}

/// An open byte-stream over a shared [`SparseStore`].
///
/// Holding a handle bumps the store's open-handle gauge; dropping it
/// releases the count. Multiple handles over the same store are fine:
/// the store serializes their operations through its access guard.
///
/// # Example
///
/// ```rust
/// use lacuna_store::{Handle, OpenMode, SparseStore, StoreConfig};
/// use std::io::{Read, Seek, SeekFrom, Write};
/// use std::sync::Arc;
///
/// let store = Arc::new(SparseStore::new(StoreConfig::new().quantum(4).qset(2)).unwrap());
///
/// let mut writer = Handle::open(Arc::clone(&store), OpenMode::ReadWrite);
/// writer.write_all(b"ABCDEFGH").unwrap();
///
/// let mut reader = Handle::open(store, OpenMode::ReadOnly);
/// reader.seek(SeekFrom::Start(4)).unwrap();
/// let mut buf = [0u8; 4];
/// reader.read_exact(&mut buf).unwrap();
/// assert_eq!(&buf, b"EFGH");
/// ```
#[derive(Debug)]
pub struct Handle {
    store: Arc<SparseStore>,
    position: u64,
    mode: OpenMode,
}

impl Handle {
    /// Opens a handle at position zero.
    ///
    /// A [`OpenMode::WriteOnly`] open trims the store first, matching
    /// truncate-on-write-only-open semantics.
    pub fn open(store: Arc<SparseStore>, mode: OpenMode) -> Self {
        if mode == OpenMode::WriteOnly {
            store.trim();
        }
        store.stats().record_open();
        Self {
            store,
            position: 0,
            mode,
        }
    }

    /// Returns the current cursor position.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Returns the handle's open mode.
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<SparseStore> {
        &self.store
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        self.store.stats().record_release();
    }
}

fn to_io(err: StoreError) -> io::Error {
    let kind = match err {
        StoreError::Busy => io::ErrorKind::WouldBlock,
        StoreError::AllocationFailed { .. } => io::ErrorKind::OutOfMemory,
        StoreError::InvalidArgument { .. } | StoreError::SeekOutOfRange { .. } => {
            io::ErrorKind::InvalidInput
        }
    };
    io::Error::new(kind, err)
}

impl Read for Handle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.mode == OpenMode::WriteOnly {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "handle is write-only",
            ));
        }

        let data = self.store.read(self.position, buf.len()).map_err(to_io)?;
        buf[..data.len()].copy_from_slice(&data);
        self.position += data.len() as u64;
        Ok(data.len())
    }
}

impl Write for Handle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.mode == OpenMode::ReadOnly {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "handle is read-only",
            ));
        }

        let written = self.store.write(self.position, buf).map_err(to_io)?;
        self.position += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        // Nothing buffered: every write already hit the store.
        Ok(())
    }
}

impl Seek for Handle {
    /// Repositions the cursor with `SET`/`CUR`/`END` arithmetic against
    /// the store's logical size.
    ///
    /// Seeking past the end is allowed (a later write leaves a hole);
    /// resolving to a negative position is an error and leaves the cursor
    /// unchanged.
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let resolved = match pos {
            SeekFrom::Start(offset) => i64::try_from(offset)
                .map_err(|_| to_io(StoreError::SeekOutOfRange { position: i64::MAX }))?,
            SeekFrom::Current(delta) => (self.position as i64)
                .checked_add(delta)
                .ok_or(StoreError::SeekOutOfRange { position: i64::MAX })
                .map_err(to_io)?,
            SeekFrom::End(delta) => (self.store.len() as i64)
                .checked_add(delta)
                .ok_or(StoreError::SeekOutOfRange { position: i64::MAX })
                .map_err(to_io)?,
        };

        if resolved < 0 {
            return Err(to_io(StoreError::SeekOutOfRange { position: resolved }));
        }

        self.position = resolved as u64;
        Ok(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;

    fn small_store() -> Arc<SparseStore> {
        Arc::new(SparseStore::new(StoreConfig::new().quantum(4).qset(2)).unwrap())
    }

    #[test]
    fn write_then_read_through_handles() {
        let store = small_store();

        let mut writer = Handle::open(Arc::clone(&store), OpenMode::ReadWrite);
        writer.write_all(b"ABCDEFGH").unwrap();
        assert_eq!(writer.position(), 8);

        let mut reader = Handle::open(store, OpenMode::ReadOnly);
        let mut buf = vec![0u8; 8];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(buf, b"ABCDEFGH");
    }

    #[test]
    fn write_only_open_truncates() {
        let store = small_store();
        store.write(0, b"ABCD").unwrap();
        assert_eq!(store.len(), 4);

        let _writer = Handle::open(Arc::clone(&store), OpenMode::WriteOnly);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn read_only_rejects_writes() {
        let mut handle = Handle::open(small_store(), OpenMode::ReadOnly);
        let err = handle.write(b"AB").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn write_only_rejects_reads() {
        let mut handle = Handle::open(small_store(), OpenMode::WriteOnly);
        let mut buf = [0u8; 4];
        let err = handle.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn seek_arithmetic() {
        let store = small_store();
        store.write(0, b"ABCD").unwrap();
        store.write(4, b"EFGH").unwrap();

        let mut handle = Handle::open(store, OpenMode::ReadOnly);
        assert_eq!(handle.seek(SeekFrom::End(-3)).unwrap(), 5);
        assert_eq!(handle.seek(SeekFrom::Current(2)).unwrap(), 7);
        assert_eq!(handle.seek(SeekFrom::Start(1)).unwrap(), 1);

        // Past the end is fine; a write there would leave a hole.
        assert_eq!(handle.seek(SeekFrom::End(100)).unwrap(), 108);
    }

    #[test]
    fn seek_before_start_fails() {
        let mut handle = Handle::open(small_store(), OpenMode::ReadOnly);
        handle.seek(SeekFrom::Start(2)).unwrap();

        let err = handle.seek(SeekFrom::Current(-5)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        // Cursor unchanged after the failed seek.
        assert_eq!(handle.position(), 2);
    }

    #[test]
    fn read_stops_at_hole() {
        let store = small_store();
        store.write(10, b"XY").unwrap();

        // Segment 0 was never allocated: end-of-data from the start.
        let mut handle = Handle::open(store, OpenMode::ReadOnly);
        let mut buf = [0u8; 4];
        assert_eq!(handle.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn open_handle_gauge_tracks_lifetimes() {
        let store = small_store();
        assert_eq!(store.stats().open_handles(), 0);

        let reader = Handle::open(Arc::clone(&store), OpenMode::ReadOnly);
        let writer = Handle::open(Arc::clone(&store), OpenMode::ReadWrite);
        assert_eq!(store.stats().open_handles(), 2);

        drop(reader);
        assert_eq!(store.stats().open_handles(), 1);
        drop(writer);
        assert_eq!(store.stats().open_handles(), 0);
    }

    #[test]
    fn cursor_advances_by_short_counts() {
        let store = small_store();
        let mut handle = Handle::open(store, OpenMode::ReadWrite);

        // First write starts mid-block and clamps at the boundary.
        handle.seek(SeekFrom::Start(2)).unwrap();
        assert_eq!(handle.write(b"abcdef").unwrap(), 2);
        assert_eq!(handle.position(), 4);
    }
}
