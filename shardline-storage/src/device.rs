//! Storage device trait
//!
//! Defines the narrow contract the data path needs from a disk: positioned
//! reads of a named volume/path, plus append and delete for the write path.

use std::io;

/// End-of-stream signalling that accompanies a device read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// The buffer was filled; more data may follow.
    More,
    /// Clean end of stream.
    Eof,
    /// The stream ended part-way through the requested range.
    UnexpectedEof,
}

impl ReadStatus {
    /// Either end-of-stream signal
    pub fn is_eof(&self) -> bool {
        matches!(self, ReadStatus::Eof | ReadStatus::UnexpectedEof)
    }
}

/// Result of one device read.
///
/// `bytes_read` may be non-zero alongside an end-of-stream status when the
/// final chunk of the file is shorter than the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceRead {
    pub bytes_read: usize,
    pub status: ReadStatus,
}

impl DeviceRead {
    pub fn more(bytes_read: usize) -> Self {
        Self {
            bytes_read,
            status: ReadStatus::More,
        }
    }

    pub fn eof(bytes_read: usize) -> Self {
        Self {
            bytes_read,
            status: ReadStatus::Eof,
        }
    }

    pub fn unexpected_eof(bytes_read: usize) -> Self {
        Self {
            bytes_read,
            status: ReadStatus::UnexpectedEof,
        }
    }

    /// Classify a fill of `buf_len` bytes that stopped at `bytes_read`.
    pub(crate) fn from_fill(bytes_read: usize, buf_len: usize) -> Self {
        if bytes_read == buf_len && buf_len > 0 {
            Self::more(bytes_read)
        } else if bytes_read == 0 {
            Self::eof(0)
        } else {
            Self::unexpected_eof(bytes_read)
        }
    }
}

/// Storage device used by the data path.
///
/// Implementations must be safe to share across threads; concurrent reads
/// of the same file must be supported for callers that fan out.
pub trait StorageDevice: Send + Sync {
    /// Read from `volume/path` at `offset` into `buf`.
    ///
    /// Any error other than the two end-of-stream statuses is returned as
    /// `Err` and is fatal to the caller.
    fn read_file(
        &self,
        volume: &str,
        path: &str,
        offset: u64,
        buf: &mut [u8],
    ) -> io::Result<DeviceRead>;

    /// Append `data` to `volume/path`, creating it if needed.
    fn append_file(&self, volume: &str, path: &str, data: &[u8]) -> io::Result<()>;

    /// Remove `volume/path`. A file that does not exist is not an error.
    fn delete_file(&self, volume: &str, path: &str) -> io::Result<()>;
}

impl<T: StorageDevice + ?Sized> StorageDevice for &T {
    fn read_file(
        &self,
        volume: &str,
        path: &str,
        offset: u64,
        buf: &mut [u8],
    ) -> io::Result<DeviceRead> {
        (**self).read_file(volume, path, offset, buf)
    }

    fn append_file(&self, volume: &str, path: &str, data: &[u8]) -> io::Result<()> {
        (**self).append_file(volume, path, data)
    }

    fn delete_file(&self, volume: &str, path: &str) -> io::Result<()> {
        (**self).delete_file(volume, path)
    }
}

impl<T: StorageDevice + ?Sized> StorageDevice for std::sync::Arc<T> {
    fn read_file(
        &self,
        volume: &str,
        path: &str,
        offset: u64,
        buf: &mut [u8],
    ) -> io::Result<DeviceRead> {
        (**self).read_file(volume, path, offset, buf)
    }

    fn append_file(&self, volume: &str, path: &str, data: &[u8]) -> io::Result<()> {
        (**self).append_file(volume, path, data)
    }

    fn delete_file(&self, volume: &str, path: &str) -> io::Result<()> {
        (**self).delete_file(volume, path)
    }
}
