//! CLI Commands

pub mod digest;
pub mod get;
pub mod put;
pub mod verify;

use anyhow::{bail, Result};
use shardline_core::{ErasureCoder, ErasureConfig, HashAlgorithm};
use shardline_storage::{ErasureObject, FileDevice};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::warn;

/// Settings resolved from config file and flags, shared by object commands
#[derive(Debug, Clone)]
pub struct DiskContext {
    pub disks: Vec<PathBuf>,
    pub volume: String,
    pub erasure: ErasureConfig,
    pub block_size: u64,
    pub algorithm: HashAlgorithm,
}

impl DiskContext {
    /// Check that the disk list matches the erasure layout
    pub fn validate(&self) -> Result<()> {
        if self.disks.is_empty() {
            bail!("No disks configured; pass --disks or set [storage] disks in the config file");
        }
        if self.disks.len() != self.erasure.total_shards() {
            bail!(
                "{} disks configured but layout {}+{} needs {}",
                self.disks.len(),
                self.erasure.data_shards,
                self.erasure.parity_shards,
                self.erasure.total_shards()
            );
        }
        Ok(())
    }

    /// Object handle for `key`
    pub fn object(&self, key: &str) -> Result<ErasureObject> {
        let coder = ErasureCoder::with_config(self.erasure)?;
        Ok(ErasureObject::new(self.volume.clone(), key, coder, self.block_size)?)
    }

    /// Open every disk; all roots must already exist
    pub fn existing_disks(&self) -> Result<Vec<FileDevice>> {
        let missing: Vec<String> = self
            .disks
            .iter()
            .enumerate()
            .filter(|(_, path)| !path.is_dir())
            .map(|(index, path)| format!("disk{} ({})", index, path.display()))
            .collect();
        if !missing.is_empty() {
            bail!("Disk directories not found: {}", missing.join(", "));
        }
        Ok(self
            .disks
            .iter()
            .map(FileDevice::open)
            .collect::<io::Result<Vec<_>>>()?)
    }

    /// Disks whose root exists; the rest are treated as offline
    pub fn online_disks(&self) -> Vec<Option<FileDevice>> {
        self.disks
            .iter()
            .enumerate()
            .map(|(index, path)| {
                if !path.is_dir() {
                    warn!(disk = index, path = %path.display(), "Disk offline");
                    return None;
                }
                FileDevice::open(path).ok()
            })
            .collect()
    }
}

/// Sink for terminal and file output that never reports a short write
pub struct BlockingSink<W: Write>(pub W);

impl<W: Write> Write for BlockingSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::digest::DiskDigest;
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn context(root: &TempDir, count: usize) -> DiskContext {
        DiskContext {
            disks: (0..count).map(|i| root.path().join(format!("d{}", i))).collect(),
            volume: "default".to_string(),
            erasure: ErasureConfig::new(2, 1).unwrap(),
            block_size: 1024,
            algorithm: HashAlgorithm::default(),
        }
    }

    #[test]
    fn test_validate_disk_count() {
        let root = TempDir::new().unwrap();
        assert!(context(&root, 3).validate().is_ok());
        assert!(context(&root, 4).validate().is_err());
        assert!(context(&root, 0).validate().is_err());
    }

    fn create_disks(ctx: &DiskContext) {
        for disk in &ctx.disks {
            fs::create_dir_all(disk).unwrap();
        }
    }

    fn sample(len: u32) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    fn store(root: &TempDir, ctx: &DiskContext, data: &[u8]) {
        let input = root.path().join("input.bin");
        fs::write(&input, data).unwrap();
        put::run(
            ctx,
            put::PutConfig {
                file: input,
                key: "obj".to_string(),
            },
        )
        .unwrap();
    }

    fn hex_sums(ctx: &DiskContext) -> Vec<String> {
        digest::disk_digests(ctx, "obj")
            .unwrap()
            .iter()
            .map(|d| match d {
                DiskDigest::Sum(sum) => sum.to_hex(),
                other => panic!("unexpected digest {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_put_get_digest_verify() {
        let root = TempDir::new().unwrap();
        let ctx = context(&root, 3);
        create_disks(&ctx);
        let data = sample(3000);
        store(&root, &ctx, &data);

        // No length given: read to the end of the object
        let output = root.path().join("tail.bin");
        get::run(
            &ctx,
            get::GetConfig {
                key: "obj".to_string(),
                size: 3000,
                offset: 1000,
                length: None,
                output: Some(output.clone()),
            },
        )
        .unwrap();
        assert_eq!(fs::read(&output).unwrap(), data[1000..].to_vec());

        let sums = hex_sums(&ctx);
        assert_eq!(sums.len(), 3);
        verify::run(
            &ctx,
            verify::VerifyConfig {
                key: "obj".to_string(),
                checksums: sums.clone(),
            },
        )
        .unwrap();

        let shard = ctx.disks[1].join("default").join("obj");
        let mut bytes = fs::read(&shard).unwrap();
        bytes[0] ^= 0xFF;
        fs::write(&shard, bytes).unwrap();
        let result = verify::run(
            &ctx,
            verify::VerifyConfig {
                key: "obj".to_string(),
                checksums: sums,
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_put_twice_replaces_object() {
        let root = TempDir::new().unwrap();
        let ctx = context(&root, 3);
        create_disks(&ctx);
        store(&root, &ctx, &[b'A'; 500]);
        store(&root, &ctx, &[b'B'; 500]);

        let output = root.path().join("out.bin");
        get::run(
            &ctx,
            get::GetConfig {
                key: "obj".to_string(),
                size: 500,
                offset: 0,
                length: None,
                output: Some(output.clone()),
            },
        )
        .unwrap();
        assert_eq!(fs::read(&output).unwrap(), vec![b'B'; 500]);
    }

    #[test]
    fn test_digest_keeps_disk_order_with_offline_disk() {
        let root = TempDir::new().unwrap();
        let ctx = context(&root, 3);
        create_disks(&ctx);
        store(&root, &ctx, &sample(2000));
        let healthy = hex_sums(&ctx);

        fs::remove_dir_all(&ctx.disks[1]).unwrap();
        let digests = digest::disk_digests(&ctx, "obj").unwrap();

        assert!(matches!(digests[1], DiskDigest::Offline));
        for index in [0, 2] {
            match &digests[index] {
                DiskDigest::Sum(sum) => assert_eq!(sum.to_hex(), healthy[index]),
                other => panic!("disk{} unexpected {:?}", index, other),
            }
        }
    }

    #[test]
    fn test_verify_reports_offline_disk() {
        let root = TempDir::new().unwrap();
        let ctx = context(&root, 3);
        create_disks(&ctx);
        store(&root, &ctx, &sample(2000));
        let sums = hex_sums(&ctx);

        fs::remove_dir_all(&ctx.disks[2]).unwrap();
        verify::run(
            &ctx,
            verify::VerifyConfig {
                key: "obj".to_string(),
                checksums: sums,
            },
        )
        .unwrap();
        // Verifying must not recreate the missing disk
        assert!(!ctx.disks[2].exists());
    }

    #[test]
    fn test_put_requires_existing_disks() {
        let root = TempDir::new().unwrap();
        let ctx = context(&root, 3);
        fs::create_dir_all(&ctx.disks[0]).unwrap();

        let input = root.path().join("input.bin");
        fs::write(&input, b"payload").unwrap();
        let result = put::run(
            &ctx,
            put::PutConfig {
                file: input,
                key: "obj".to_string(),
            },
        );

        assert!(result.is_err());
        assert!(!ctx.disks[1].exists());
        assert!(!ctx.disks[2].exists());
    }

    #[test]
    fn test_online_disks() {
        let root = TempDir::new().unwrap();
        let ctx = context(&root, 3);
        std::fs::create_dir_all(&ctx.disks[0]).unwrap();
        std::fs::create_dir_all(&ctx.disks[2]).unwrap();

        let online = ctx.online_disks();
        assert!(online[0].is_some());
        assert!(online[1].is_none());
        assert!(online[2].is_some());
    }
}
