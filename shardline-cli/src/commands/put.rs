//! Put Command
//!
//! Encodes a local file across the configured disks.

use super::DiskContext;
use crate::symbols;
use anyhow::{Context, Result};
use console::style;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

/// Put configuration
pub struct PutConfig {
    pub file: PathBuf,
    pub key: String,
}

/// Run put command
pub fn run(ctx: &DiskContext, config: PutConfig) -> Result<()> {
    ctx.validate()?;
    let disks = ctx.existing_disks()?;
    let object = ctx.object(&config.key)?;

    let file = File::open(&config.file)
        .with_context(|| format!("Failed to open {}", config.file.display()))?;
    let summary = object.create(&disks, &mut BufReader::new(file))?;

    println!(
        "{} Stored {} ({} bytes) as {}/{}",
        style(symbols::CHECK).green(),
        config.file.display(),
        summary.size,
        ctx.volume,
        config.key
    );
    for (index, checksum) in summary.checksums.iter().enumerate() {
        println!(
            "  disk{:<3} {}:{}",
            index,
            style(checksum.algorithm()).dim(),
            checksum
        );
    }
    Ok(())
}
