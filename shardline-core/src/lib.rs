//! Shardline Core Library
//!
//! Data-path primitives for an erasure-coded object store.
//! This crate provides:
//! - Block geometry for range-addressed reads over encoded blocks
//! - The shard assembler that extracts a byte window from decoded data shards
//! - Per-device hash accumulators (BLAKE2b-512 by default, BLAKE3 on request)
//! - A Reed-Solomon adapter producing and reconstructing encoded blocks
//! - Common error handling

pub mod assembler;
pub mod erasure;
pub mod error;
pub mod geometry;
pub mod hash;
pub mod sink;

pub use assembler::write_data_blocks;
pub use erasure::{ErasureConfig, ErasureCoder};
pub use error::{Result, ShardlineError};
pub use geometry::{block_info, block_len_at, data_block_len, encoded_block_len, BlockInfo};
pub use hash::{
    new_hash_accumulator, new_hash_accumulators, Checksum, HashAccumulator, HashAlgorithm,
};

/// Default erasure layout used when nothing else is configured.
///
/// Override at runtime via SHARDLINE_DATA_SHARDS / SHARDLINE_PARITY_SHARDS env vars.
pub const DATA_SHARDS: usize = 8;
pub const PARITY_SHARDS: usize = 4;
pub const TOTAL_SHARDS: usize = DATA_SHARDS + PARITY_SHARDS;

/// Staging buffer size for device stream copies (128 KiB).
pub const READ_BUFFER_SIZE: usize = 128 * 1024;

/// Logical bytes per encoded block (10 MiB).
pub const DEFAULT_BLOCK_SIZE: u64 = 10 * 1024 * 1024;

/// Read erasure layout from environment, falling back to compile-time defaults.
/// Returns (data_shards, parity_shards, block_size).
pub fn erasure_config_from_env() -> (usize, usize, u64) {
    let data = std::env::var("SHARDLINE_DATA_SHARDS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(DATA_SHARDS);
    let parity = std::env::var("SHARDLINE_PARITY_SHARDS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(PARITY_SHARDS);
    let block_size = std::env::var("SHARDLINE_BLOCK_SIZE")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_BLOCK_SIZE);
    (data, parity, block_size)
}
