//! Error types for Shardline
//!
//! Provides a unified error type for the data path.

use thiserror::Error;

/// Result type alias for Shardline operations
pub type Result<T> = std::result::Result<T, ShardlineError>;

/// Unified error type for Shardline
#[derive(Error, Debug)]
pub enum ShardlineError {
    // ===== Erasure Coding Errors =====
    #[error("Erasure coding error: {0}")]
    ErasureCoding(String),

    #[error("Insufficient shards: have {available}, need {required}")]
    InsufficientShards { available: usize, required: usize },

    #[error("Insufficient data: have {available} bytes, need {requested}")]
    InsufficientData { available: u64, requested: u64 },

    #[error("Shard size mismatch: expected {expected}, got {actual}")]
    ShardSizeMismatch { expected: usize, actual: usize },

    // ===== Integrity Errors =====
    #[error("Hash verification failed for shard {index}")]
    HashVerificationFailed { index: usize },

    #[error("Invalid checksum: {0}")]
    InvalidChecksum(String),

    // ===== Stream Errors =====
    #[error("Short write: sink accepted {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error("Device read failed for {volume}/{path}: {source}")]
    DeviceRead {
        volume: String,
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid staging buffer: capacity must be non-zero")]
    InvalidBuffer,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid range: offset {offset} + length {length} exceeds object size {size}")]
    InvalidRange { offset: u64, length: u64, size: u64 },

    // ===== I/O Errors =====
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ===== Configuration Errors =====
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reed_solomon_erasure::Error> for ShardlineError {
    fn from(err: reed_solomon_erasure::Error) -> Self {
        ShardlineError::ErasureCoding(err.to_string())
    }
}
