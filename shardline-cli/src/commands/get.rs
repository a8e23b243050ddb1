//! Get Command
//!
//! Reads a byte range of an object back from the disks.

use super::{BlockingSink, DiskContext};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

/// Get configuration
pub struct GetConfig {
    pub key: String,
    /// Object size as reported by `put`
    pub size: u64,
    pub offset: u64,
    /// Defaults to the rest of the object
    pub length: Option<u64>,
    /// Defaults to stdout
    pub output: Option<PathBuf>,
}

/// Run get command
pub fn run(ctx: &DiskContext, config: GetConfig) -> Result<()> {
    ctx.validate()?;
    let object = ctx.object(&config.key)?;
    let disks = ctx.online_disks();
    let length = config
        .length
        .unwrap_or_else(|| config.size.saturating_sub(config.offset));

    let written = match &config.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut sink = BlockingSink(io::BufWriter::new(file));
            let n = object.read_range(&mut sink, &disks, config.offset, length, config.size)?;
            sink.flush()?;
            n
        }
        None => {
            let mut sink = BlockingSink(io::stdout().lock());
            let n = object.read_range(&mut sink, &disks, config.offset, length, config.size)?;
            sink.flush()?;
            n
        }
    };

    info!(key = %config.key, bytes = written, "Range written");
    Ok(())
}
