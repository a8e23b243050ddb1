//! End-to-end tests for the erasure data path on directory-backed disks
//!
//! Tests the complete pipeline: bytes → encode → shard files → digest → range read
//!
//! Run with: cargo test --test end_to_end

use shardline_core::erasure::{ErasureCoder, ErasureConfig};
use shardline_core::{new_hash_accumulator, HashAlgorithm, ShardlineError};
use shardline_storage::{hash_sum, ErasureObject, FileDevice, StorageDevice};
use tempfile::TempDir;

/// Generate test data of specified size
fn generate_file(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8 ^ (i / 256) as u8).collect()
}

fn open_disks(root: &TempDir, count: usize) -> Vec<FileDevice> {
    (0..count)
        .map(|i| FileDevice::open(root.path().join(format!("disk{}", i))).unwrap())
        .collect()
}

fn object(data: usize, parity: usize, block_size: u64) -> ErasureObject {
    let coder = ErasureCoder::with_config(ErasureConfig::new(data, parity).unwrap()).unwrap();
    ErasureObject::new("bucket", "photos/cat.jpg/part.1", coder, block_size).unwrap()
}

#[test]
fn test_file_pipeline_full_and_partial_reads() {
    let root = TempDir::new().unwrap();
    let disks = open_disks(&root, 6);
    let obj = object(4, 2, 64 * 1024);
    let data = generate_file(1024 * 1024 + 333);

    let summary = obj.create(&disks, &mut data.as_slice()).unwrap();
    assert_eq!(summary.size, data.len() as u64);

    let online: Vec<Option<&FileDevice>> = disks.iter().map(Some).collect();

    let mut out: Vec<u8> = Vec::new();
    obj.read_range(&mut out, &online, 0, data.len() as u64, summary.size)
        .unwrap();
    assert_eq!(out, data);

    // Range spanning three blocks with a skip into the first
    let (offset, length) = (64 * 1024 - 7, 128 * 1024 + 20);
    let mut out: Vec<u8> = Vec::new();
    obj.read_range(&mut out, &online, offset, length, summary.size)
        .unwrap();
    assert_eq!(out, data[offset as usize..(offset + length) as usize].to_vec());
}

#[test]
fn test_file_pipeline_survives_lost_disks() {
    let root = TempDir::new().unwrap();
    let disks = open_disks(&root, 6);
    let obj = object(4, 2, 32 * 1024);
    let data = generate_file(200_000);
    let summary = obj.create(&disks, &mut data.as_slice()).unwrap();

    // Wipe one disk and take another offline
    std::fs::remove_dir_all(disks[0].root().join("bucket")).unwrap();
    let mut online: Vec<Option<&FileDevice>> = disks.iter().map(Some).collect();
    online[2] = None;

    let mut out: Vec<u8> = Vec::new();
    obj.read_range(&mut out, &online, 1000, 150_000, summary.size)
        .unwrap();
    assert_eq!(out, data[1000..151_000].to_vec());

    online[5] = None;
    let err = obj
        .read_range(&mut Vec::<u8>::new(), &online, 0, 10, summary.size)
        .unwrap_err();
    assert!(matches!(err, ShardlineError::InsufficientShards { .. }));
}

#[test]
fn test_shard_digests_match_create_checksums() {
    let root = TempDir::new().unwrap();
    let disks = open_disks(&root, 3);
    let obj = object(2, 1, 10_000);
    let data = generate_file(55_555);
    let summary = obj.create(&disks, &mut data.as_slice()).unwrap();

    for (disk, expected) in disks.iter().zip(&summary.checksums) {
        assert_eq!(expected.algorithm(), HashAlgorithm::Blake2b512);
        let sum = hash_sum(disk, "bucket", "photos/cat.jpg/part.1", new_hash_accumulator("")).unwrap();
        assert_eq!(&sum, expected);
    }
    obj.verify_checksums(&disks, &summary.checksums).unwrap();

    // Appending stray bytes to a shard file breaks verification
    disks[1]
        .append_file("bucket", "photos/cat.jpg/part.1", b"junk")
        .unwrap();
    let err = obj.verify_checksums(&disks, &summary.checksums).unwrap_err();
    assert!(matches!(err, ShardlineError::HashVerificationFailed { index: 1 }));
}
