//! Verify Command
//!
//! Checks every online disk's shard file against the checksums printed by
//! `put`. Offline disks are reported and skipped.

use super::digest::{disk_digests, DiskDigest};
use super::DiskContext;
use crate::symbols;
use anyhow::{bail, Context, Result};
use console::style;
use shardline_core::Checksum;

/// Verify configuration
pub struct VerifyConfig {
    pub key: String,
    /// Hex checksums in disk order
    pub checksums: Vec<String>,
}

/// Run verify command
pub fn run(ctx: &DiskContext, config: VerifyConfig) -> Result<()> {
    ctx.validate()?;
    if config.checksums.len() != ctx.disks.len() {
        bail!(
            "{} checksums given for {} disks",
            config.checksums.len(),
            ctx.disks.len()
        );
    }

    let expected = config
        .checksums
        .iter()
        .enumerate()
        .map(|(index, hex)| {
            Checksum::from_hex(ctx.algorithm, hex)
                .with_context(|| format!("Invalid checksum for disk{}", index))
        })
        .collect::<Result<Vec<_>>>()?;

    let digests = disk_digests(ctx, &config.key)?;
    let mut matched = 0;
    let mut failed = Vec::new();

    for (index, (digest, expected)) in digests.iter().zip(&expected).enumerate() {
        match digest {
            DiskDigest::Offline => {
                println!("  disk{:<3} {} offline", index, style("!").yellow());
            }
            DiskDigest::Sum(sum) if sum == expected => {
                matched += 1;
                println!("  disk{:<3} {}", index, style(symbols::CHECK).green());
            }
            DiskDigest::Sum(sum) => {
                failed.push(index);
                println!("  disk{:<3} {} mismatch ({})", index, style(symbols::CROSS).red(), sum);
            }
            DiskDigest::Failed(e) => {
                failed.push(index);
                println!("  disk{:<3} {} {}", index, style(symbols::CROSS).red(), e);
            }
        }
    }

    if !failed.is_empty() {
        bail!("Shard verification failed on disks {:?}", failed);
    }

    println!(
        "{} {} of {} shard files match",
        style(symbols::CHECK).green(),
        matched,
        digests.len()
    );
    Ok(())
}
