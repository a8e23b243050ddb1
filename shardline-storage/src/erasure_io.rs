//! Erasure-coded object I/O
//!
//! Lays an object out as a sequence of encoded blocks, one shard stream per
//! device, and serves arbitrary byte ranges back out of it:
//!
//! ```text
//! object:   | block 0 (block_size) | block 1 | ... | last block (short) |
//! device i: | shard i of block 0   | shard i of block 1 | ...           |
//! ```

use crate::copy::StreamCopier;
use crate::device::StorageDevice;
use crate::digest::hash_sums;
use rayon::prelude::*;
use shardline_core::{
    block_info, block_len_at, encoded_block_len, new_hash_accumulators, write_data_blocks,
    Checksum, ErasureCoder, HashAlgorithm, Result, ShardlineError,
};
use std::io::{Read, Write};
use tracing::{debug, info, warn};

/// Outcome of writing an object
#[derive(Debug, Clone)]
pub struct CreateSummary {
    /// Logical object size in bytes
    pub size: u64,
    /// Digest of the shard stream written to each device, by device index
    pub checksums: Vec<Checksum>,
}

/// One erasure-coded object spread across a fixed set of devices
pub struct ErasureObject {
    volume: String,
    path: String,
    block_size: u64,
    coder: ErasureCoder,
    copier: StreamCopier,
}

impl ErasureObject {
    /// Describe the object at `volume/path` encoded with `coder` in blocks of `block_size`
    pub fn new(
        volume: impl Into<String>,
        path: impl Into<String>,
        coder: ErasureCoder,
        block_size: u64,
    ) -> Result<Self> {
        if block_size == 0 {
            return Err(ShardlineError::Configuration(
                "block_size must be > 0".to_string(),
            ));
        }
        Ok(Self {
            volume: volume.into(),
            path: path.into(),
            block_size,
            coder,
            copier: StreamCopier::default(),
        })
    }

    /// Use `copier` for shard reads (buffer size, cancellation)
    pub fn with_copier(mut self, copier: StreamCopier) -> Self {
        self.copier = copier;
        self
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    pub fn coder(&self) -> &ErasureCoder {
        &self.coder
    }

    /// Encode everything `reader` yields and append shard `i` of each block to `devices[i]`.
    ///
    /// Any existing shard file at the object's path is removed first, so
    /// re-creating a key replaces the previous object.
    pub fn create<D, R>(&self, devices: &[D], reader: &mut R) -> Result<CreateSummary>
    where
        D: StorageDevice,
        R: Read + ?Sized,
    {
        self.check_device_count(devices.len())?;

        for (index, device) in devices.iter().enumerate() {
            device
                .delete_file(&self.volume, &self.path)
                .inspect_err(|e| warn!(device = index, error = %e, "Shard delete failed"))?;
        }

        let mut accumulators = new_hash_accumulators(devices.len());
        let mut block: Vec<u8> = Vec::new();
        let mut size = 0u64;
        let mut blocks = 0u64;

        loop {
            block.clear();
            let n = (&mut *reader).take(self.block_size).read_to_end(&mut block)? as u64;
            if n == 0 && blocks > 0 {
                break;
            }

            let shards = self.coder.encode_block(&block)?;
            for (index, (shard, device)) in shards.iter().zip(devices).enumerate() {
                device
                    .append_file(&self.volume, &self.path, shard)
                    .inspect_err(|e| warn!(device = index, error = %e, "Shard append failed"))?;
                accumulators[index].update(shard);
            }

            size += n;
            blocks += 1;
            debug!(block = blocks - 1, bytes = n, "Encoded block");

            if n < self.block_size {
                break;
            }
        }

        let checksums: Vec<Checksum> = accumulators.into_iter().map(|a| a.finalize()).collect();
        info!(
            volume = %self.volume,
            path = %self.path,
            size,
            blocks,
            "Created erasure-coded object"
        );
        Ok(CreateSummary { size, checksums })
    }

    /// Write bytes `[offset, offset + length)` of an object of `total_size` bytes to `writer`.
    ///
    /// `devices[i]` is `None` when device `i` is unavailable. Data shards are
    /// read first; parity is only fetched when a data shard is missing.
    pub fn read_range<W, D>(
        &self,
        writer: &mut W,
        devices: &[Option<D>],
        offset: u64,
        length: u64,
        total_size: u64,
    ) -> Result<u64>
    where
        W: Write + ?Sized,
        D: StorageDevice,
    {
        match offset.checked_add(length) {
            Some(end) if end <= total_size => {}
            _ => {
                return Err(ShardlineError::InvalidRange {
                    offset,
                    length,
                    size: total_size,
                })
            }
        }
        self.check_device_count(devices.len())?;
        if length == 0 {
            return Ok(0);
        }

        let data_shards = self.coder.config().data_shards;
        let full_shard_len = encoded_block_len(self.block_size, data_shards);
        let info = block_info(offset, length, self.block_size);
        debug!(
            start_block = info.start_block,
            end_block = info.end_block,
            bytes_to_skip = info.bytes_to_skip,
            "Reading object range"
        );

        let mut block = info.start_block;
        let mut skip = info.bytes_to_skip;
        let mut remaining = length;
        let mut written = 0u64;

        while remaining > 0 {
            let block_len = block_len_at(block, self.block_size, total_size);
            let shard_len = encoded_block_len(block_len, data_shards);
            let shard_offset = block * full_shard_len;

            let shards = self.read_block(devices, shard_offset, shard_len)?;
            let data: Vec<&Vec<u8>> = shards.iter().take(data_shards).flatten().collect();

            let out_size = remaining.min(block_len - skip);
            let n = write_data_blocks(writer, &data, data_shards, skip, out_size)?;

            remaining -= n;
            written += n;
            skip = 0;
            block += 1;
        }

        info!(
            volume = %self.volume,
            path = %self.path,
            offset,
            length,
            "Read erasure-coded range"
        );
        Ok(written)
    }

    /// Re-hash every device's shard stream and compare with `checksums`.
    pub fn verify_checksums<D: StorageDevice>(&self, devices: &[D], checksums: &[Checksum]) -> Result<()> {
        if devices.len() != checksums.len() {
            return Err(ShardlineError::Configuration(format!(
                "{} devices but {} checksums",
                devices.len(),
                checksums.len()
            )));
        }
        let algorithm = checksums
            .first()
            .map(Checksum::algorithm)
            .unwrap_or_else(HashAlgorithm::default);

        let sums = hash_sums(devices, &self.volume, &self.path, algorithm);
        for (index, (sum, expected)) in sums.into_iter().zip(checksums).enumerate() {
            if &sum? != expected {
                warn!(device = index, "Shard checksum mismatch");
                return Err(ShardlineError::HashVerificationFailed { index });
            }
        }
        Ok(())
    }

    /// Fetch one encoded block's shards, reconstructing missing data shards.
    fn read_block<D: StorageDevice>(
        &self,
        devices: &[Option<D>],
        shard_offset: u64,
        shard_len: u64,
    ) -> Result<Vec<Option<Vec<u8>>>> {
        let data_shards = self.coder.config().data_shards;

        let mut shards: Vec<Option<Vec<u8>>> = devices
            .par_iter()
            .take(data_shards)
            .enumerate()
            .map(|(index, device)| self.read_shard(index, device.as_ref(), shard_offset, shard_len))
            .collect::<Result<_>>()?;

        if shards.iter().all(Option::is_some) {
            shards.resize(devices.len(), None);
            return Ok(shards);
        }

        let parity: Vec<Option<Vec<u8>>> = devices
            .par_iter()
            .enumerate()
            .skip(data_shards)
            .map(|(index, device)| self.read_shard(index, device.as_ref(), shard_offset, shard_len))
            .collect::<Result<_>>()?;
        shards.extend(parity);

        debug!(
            available = shards.iter().filter(|s| s.is_some()).count(),
            "Reconstructing block from parity"
        );
        self.coder.reconstruct_data(&mut shards)?;
        Ok(shards)
    }

    /// Read one shard. A failing device yields `Ok(None)`; cancellation and
    /// sink errors are returned.
    fn read_shard<D: StorageDevice>(
        &self,
        index: usize,
        device: Option<&D>,
        offset: u64,
        length: u64,
    ) -> Result<Option<Vec<u8>>> {
        let Some(device) = device else {
            return Ok(None);
        };
        let mut shard = Vec::with_capacity(usize::try_from(length).unwrap_or(0));
        match self
            .copier
            .copy_exact(&mut shard, device, &self.volume, &self.path, offset, length)
        {
            Ok(_) => Ok(Some(shard)),
            Err(e @ (ShardlineError::DeviceRead { .. } | ShardlineError::InsufficientData { .. })) => {
                warn!(device = index, offset, error = %e, "Shard read failed");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn check_device_count(&self, count: usize) -> Result<()> {
        let expected = self.coder.config().total_shards();
        if count != expected {
            return Err(ShardlineError::Configuration(format!(
                "expected {} devices, got {}",
                expected, count
            )));
        }
        Ok(())
    }
}
