//! Shard assembler
//!
//! Extracts a logical byte window from the data shards of one decoded
//! encoded block. Parity shards are never looked at.

use crate::error::{Result, ShardlineError};
use crate::geometry::data_block_len;
use crate::sink::write_chunk;
use std::io::Write;

/// Write `out_size` bytes of data-shard content to `dst`, starting
/// `out_offset` bytes into the concatenation of the first `data_blocks`
/// shards.
///
/// Returns the number of bytes written, which equals `out_size` on success.
///
/// # Errors
/// - [`ShardlineError::InsufficientShards`] if fewer than `data_blocks` shards are given
/// - [`ShardlineError::InsufficientData`] if the data shards cannot cover the
///   whole window `out_offset..out_offset + out_size`. This is stricter than
///   only requiring `out_size` bytes of data: a window running past the end
///   is rejected rather than written short.
/// - [`ShardlineError::ShortWrite`] / [`ShardlineError::Io`] from the sink
pub fn write_data_blocks<W, S>(
    dst: &mut W,
    blocks: &[S],
    data_blocks: usize,
    out_offset: u64,
    out_size: u64,
) -> Result<u64>
where
    W: Write + ?Sized,
    S: AsRef<[u8]>,
{
    if blocks.len() < data_blocks {
        return Err(ShardlineError::InsufficientShards {
            available: blocks.len(),
            required: data_blocks,
        });
    }

    let available = data_block_len(blocks, data_blocks);
    if available < out_size || available - out_size < out_offset {
        return Err(ShardlineError::InsufficientData {
            available,
            requested: out_offset.saturating_add(out_size),
        });
    }

    let mut skip = out_offset;
    let mut remaining = out_size;
    let mut total_written = 0u64;

    for block in &blocks[..data_blocks] {
        let block = block.as_ref();
        let block_len = block.len() as u64;

        if skip >= block_len {
            skip -= block_len;
            continue;
        }

        // skip < block_len, so the index fits in usize
        let block = &block[skip as usize..];
        skip = 0;

        if (block.len() as u64) < remaining {
            let n = write_chunk(dst, block)? as u64;
            remaining -= n;
            total_written += n;
            continue;
        }

        // remaining <= block.len() here
        let n = write_chunk(dst, &block[..remaining as usize])? as u64;
        total_written += n;
        break;
    }

    Ok(total_written)
}
