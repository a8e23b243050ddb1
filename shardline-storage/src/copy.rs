//! Device stream copier
//!
//! Streams bytes from a storage device into a sink through a fixed-size
//! staging buffer. Two flavours exist:
//! - [`StreamCopier::copy_buffer`] copies until the device signals end of
//!   stream, treating both end-of-stream statuses as success.
//! - [`StreamCopier::copy_at_most`] copies up to `length` bytes and stops
//!   quietly if the device runs dry first. Callers that need the full length
//!   must compare the returned count, or use [`StreamCopier::copy_exact`].
//!
//! In both cases the read offset advances by what the sink accepted.

use crate::device::{DeviceRead, StorageDevice};
use shardline_core::sink::write_chunk;
use shardline_core::{Result, ShardlineError, READ_BUFFER_SIZE};
use std::io::{self, Write};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Staging-buffer configuration for device copies
#[derive(Debug, Clone)]
pub struct StreamCopier {
    buffer_size: usize,
    cancel: Option<CancellationToken>,
}

impl Default for StreamCopier {
    fn default() -> Self {
        Self::new(READ_BUFFER_SIZE)
    }
}

impl StreamCopier {
    /// Copier staging through `buffer_size` bytes
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size,
            cancel: None,
        }
    }

    /// Check `token` between buffer-sized chunks
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Staging buffer capacity
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Copy the whole of `volume/path` into `writer`, allocating the staging buffer.
    pub fn copy_to_end<W, D>(&self, writer: &mut W, device: &D, volume: &str, path: &str) -> Result<u64>
    where
        W: Write + ?Sized,
        D: StorageDevice + ?Sized,
    {
        if self.buffer_size == 0 {
            return Err(ShardlineError::InvalidBuffer);
        }
        let mut buf = vec![0u8; self.buffer_size];
        self.copy_buffer(writer, device, volume, path, &mut buf)
    }

    /// Copy `volume/path` from offset 0 into `writer` until end of stream,
    /// staging through `buf`.
    ///
    /// Returns the number of bytes copied. An empty `buf` is rejected before
    /// any I/O.
    pub fn copy_buffer<W, D>(
        &self,
        writer: &mut W,
        device: &D,
        volume: &str,
        path: &str,
        buf: &mut [u8],
    ) -> Result<u64>
    where
        W: Write + ?Sized,
        D: StorageDevice + ?Sized,
    {
        if buf.is_empty() {
            return Err(ShardlineError::InvalidBuffer);
        }

        let mut offset = 0u64;
        loop {
            self.check_cancelled()?;

            let read = read_chunk(device, volume, path, offset, buf)?;
            if read.bytes_read > 0 {
                let n = write_chunk(writer, &buf[..read.bytes_read])?;
                offset += n as u64;
            }
            if read.status.is_eof() {
                break;
            }
            if read.bytes_read == 0 {
                return Err(stalled(volume, path));
            }
        }

        trace!(volume, path, bytes = offset, "Copied device stream to end");
        Ok(offset)
    }

    /// Copy up to `length` bytes of `volume/path` starting at `offset`.
    ///
    /// End of stream before `length` bytes is NOT an error: the copy stops
    /// and the short count is returned. This is the only truncating copy in
    /// the crate; prefer [`StreamCopier::copy_exact`] unless a short result
    /// is acceptable.
    pub fn copy_at_most<W, D>(
        &self,
        writer: &mut W,
        device: &D,
        volume: &str,
        path: &str,
        offset: u64,
        length: u64,
    ) -> Result<u64>
    where
        W: Write + ?Sized,
        D: StorageDevice + ?Sized,
    {
        if self.buffer_size == 0 {
            return Err(ShardlineError::InvalidBuffer);
        }
        if length == 0 {
            return Ok(0);
        }

        let capacity = usize::try_from(length)
            .unwrap_or(usize::MAX)
            .min(self.buffer_size);
        let mut buf = vec![0u8; capacity];

        let mut offset = offset;
        let mut remaining = length;
        let mut written = 0u64;

        while remaining > 0 {
            self.check_cancelled()?;

            let want = usize::try_from(remaining).unwrap_or(usize::MAX).min(capacity);
            let read = read_chunk(device, volume, path, offset, &mut buf[..want])?;
            if read.bytes_read > 0 {
                let n = write_chunk(writer, &buf[..read.bytes_read])? as u64;
                remaining -= n;
                offset += n;
                written += n;
            }
            if read.status.is_eof() {
                break;
            }
            if read.bytes_read == 0 {
                return Err(stalled(volume, path));
            }
        }

        Ok(written)
    }

    /// Copy exactly `length` bytes, failing with
    /// [`ShardlineError::InsufficientData`] if the device runs dry.
    pub fn copy_exact<W, D>(
        &self,
        writer: &mut W,
        device: &D,
        volume: &str,
        path: &str,
        offset: u64,
        length: u64,
    ) -> Result<u64>
    where
        W: Write + ?Sized,
        D: StorageDevice + ?Sized,
    {
        let written = self.copy_at_most(writer, device, volume, path, offset, length)?;
        if written < length {
            return Err(ShardlineError::InsufficientData {
                available: written,
                requested: length,
            });
        }
        Ok(written)
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(ShardlineError::Cancelled),
            _ => Ok(()),
        }
    }
}

/// One device read, with the device's count checked against the buffer.
fn read_chunk<D: StorageDevice + ?Sized>(
    device: &D,
    volume: &str,
    path: &str,
    offset: u64,
    buf: &mut [u8],
) -> Result<DeviceRead> {
    let read = device
        .read_file(volume, path, offset, buf)
        .map_err(|source| device_error(volume, path, source))?;
    if read.bytes_read > buf.len() {
        return Err(device_error(
            volume,
            path,
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "device reported {} bytes for a {} byte buffer",
                    read.bytes_read,
                    buf.len()
                ),
            ),
        ));
    }
    Ok(read)
}

fn device_error(volume: &str, path: &str, source: io::Error) -> ShardlineError {
    ShardlineError::DeviceRead {
        volume: volume.to_string(),
        path: path.to_string(),
        source,
    }
}

fn stalled(volume: &str, path: &str) -> ShardlineError {
    device_error(
        volume,
        path,
        io::Error::new(io::ErrorKind::Other, "device returned no data without end of stream"),
    )
}

/// Copy `volume/path` until end of stream through `buf`.
pub fn copy_buffer<W, D>(writer: &mut W, device: &D, volume: &str, path: &str, buf: &mut [u8]) -> Result<u64>
where
    W: Write + ?Sized,
    D: StorageDevice + ?Sized,
{
    StreamCopier::default().copy_buffer(writer, device, volume, path, buf)
}

/// Best-effort copy of up to `length` bytes; see [`StreamCopier::copy_at_most`].
pub fn copy_at_most<W, D>(
    writer: &mut W,
    device: &D,
    volume: &str,
    path: &str,
    offset: u64,
    length: u64,
) -> Result<u64>
where
    W: Write + ?Sized,
    D: StorageDevice + ?Sized,
{
    StreamCopier::default().copy_at_most(writer, device, volume, path, offset, length)
}

/// Copy exactly `length` bytes; see [`StreamCopier::copy_exact`].
pub fn copy_exact<W, D>(
    writer: &mut W,
    device: &D,
    volume: &str,
    path: &str,
    offset: u64,
    length: u64,
) -> Result<u64>
where
    W: Write + ?Sized,
    D: StorageDevice + ?Sized,
{
    StreamCopier::default().copy_exact(writer, device, volume, path, offset, length)
}
