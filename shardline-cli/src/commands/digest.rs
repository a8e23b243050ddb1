//! Digest Command
//!
//! Hashes each disk's shard file for an object.

use super::DiskContext;
use crate::symbols;
use anyhow::{bail, Result};
use console::style;
use shardline_core::Checksum;
use shardline_storage::hash_sums;

/// Digest configuration
pub struct DigestConfig {
    pub key: String,
}

/// Digest outcome for one disk
#[derive(Debug)]
pub enum DiskDigest {
    Offline,
    Failed(String),
    Sum(Checksum),
}

/// Hash the shard file on every online disk, one entry per disk in disk order
pub fn disk_digests(ctx: &DiskContext, key: &str) -> Result<Vec<DiskDigest>> {
    let disks = ctx.online_disks();
    let present: Vec<_> = disks.iter().flatten().collect();
    if present.is_empty() {
        bail!("No disks online");
    }

    let mut sums = hash_sums(&present, &ctx.volume, key, ctx.algorithm).into_iter();
    Ok(disks
        .iter()
        .map(|disk| match (disk, disk.as_ref().and_then(|_| sums.next())) {
            (None, _) => DiskDigest::Offline,
            (Some(_), Some(Ok(sum))) => DiskDigest::Sum(sum),
            (Some(_), Some(Err(e))) => DiskDigest::Failed(e.to_string()),
            (Some(_), None) => DiskDigest::Failed("no digest computed".to_string()),
        })
        .collect())
}

/// Run digest command
pub fn run(ctx: &DiskContext, config: DigestConfig) -> Result<()> {
    for (index, digest) in disk_digests(ctx, &config.key)?.iter().enumerate() {
        match digest {
            DiskDigest::Offline => println!("  disk{:<3} {} offline", index, style(symbols::CROSS).red()),
            DiskDigest::Failed(e) => println!("  disk{:<3} {} {}", index, style(symbols::CROSS).red(), e),
            DiskDigest::Sum(sum) => println!("  disk{:<3} {}:{}", index, style(sum.algorithm()).dim(), sum),
        }
    }
    Ok(())
}
