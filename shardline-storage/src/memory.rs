//! In-memory storage device
//!
//! Used for testing and development. Not persistent.

use crate::device::{DeviceRead, StorageDevice};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

/// Operation counters for a device
#[derive(Debug, Clone, Default)]
pub struct DeviceStats {
    /// Number of files stored
    pub file_count: u64,

    /// Total bytes stored
    pub bytes_used: u64,

    /// Number of read calls
    pub reads: u64,

    /// Number of append calls
    pub appends: u64,
}

/// In-memory storage device
pub struct MemoryDevice {
    /// File contents keyed by (volume, path)
    files: RwLock<HashMap<(String, String), Vec<u8>>>,

    /// Operation counters
    reads: AtomicU64,
    appends: AtomicU64,
}

impl MemoryDevice {
    /// Create a new in-memory device
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            reads: AtomicU64::new(0),
            appends: AtomicU64::new(0),
        }
    }

    /// Replace the contents of a file
    pub fn put_file(&self, volume: &str, path: &str, data: impl Into<Vec<u8>>) {
        self.files
            .write()
            .insert((volume.to_string(), path.to_string()), data.into());
    }

    /// Snapshot of a file's contents
    pub fn file(&self, volume: &str, path: &str) -> Option<Vec<u8>> {
        self.files
            .read()
            .get(&(volume.to_string(), path.to_string()))
            .cloned()
    }

    /// Remove a file, returning whether it existed
    pub fn remove_file(&self, volume: &str, path: &str) -> bool {
        self.files
            .write()
            .remove(&(volume.to_string(), path.to_string()))
            .is_some()
    }

    /// Current statistics
    pub fn stats(&self) -> DeviceStats {
        let files = self.files.read();
        DeviceStats {
            file_count: files.len() as u64,
            bytes_used: files.values().map(|f| f.len() as u64).sum(),
            reads: self.reads.load(Ordering::Relaxed),
            appends: self.appends.load(Ordering::Relaxed),
        }
    }
}

impl Default for MemoryDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageDevice for MemoryDevice {
    fn read_file(
        &self,
        volume: &str,
        path: &str,
        offset: u64,
        buf: &mut [u8],
    ) -> io::Result<DeviceRead> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let files = self.files.read();
        let data = files
            .get(&(volume.to_string(), path.to_string()))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("file not found: {}/{}", volume, path),
                )
            })?;

        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(DeviceRead::from_fill(n, buf.len()))
    }

    fn append_file(&self, volume: &str, path: &str, data: &[u8]) -> io::Result<()> {
        self.files
            .write()
            .entry((volume.to_string(), path.to_string()))
            .or_default()
            .extend_from_slice(data);
        self.appends.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn delete_file(&self, volume: &str, path: &str) -> io::Result<()> {
        self.remove_file(volume, path);
        Ok(())
    }
}
