//! Shardline Storage
//!
//! Device-facing half of the data path:
//! - `StorageDevice` trait for pluggable disks
//! - `MemoryDevice` for testing and `FileDevice` for directory-backed disks
//! - Bounded and unbounded device stream copies
//! - Whole-file digests, per device or fanned out across devices
//! - Erasure-coded object create and range read

pub mod copy;
pub mod device;
pub mod digest;
pub mod erasure_io;
pub mod file;
pub mod memory;

pub use copy::{copy_at_most, copy_buffer, copy_exact, StreamCopier};
pub use device::{DeviceRead, ReadStatus, StorageDevice};
pub use digest::{hash_sum, hash_sums};
pub use erasure_io::{CreateSummary, ErasureObject};
pub use file::FileDevice;
pub use memory::{DeviceStats, MemoryDevice};
