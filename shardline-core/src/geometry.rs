//! Block geometry
//!
//! Integer arithmetic mapping a logical byte range onto fixed-size encoded
//! blocks, and sizing the per-shard capacity of a block.

/// Block coordinates for a logical read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    /// Block containing `offset`.
    pub start_block: u64,
    /// `length / block_size`. A loop hint only: it is not `offset + length`
    /// based, so callers must track the remaining length themselves.
    pub end_block: u64,
    /// Bytes to skip inside `start_block` to reach `offset`.
    pub bytes_to_skip: u64,
}

/// Find start/end block and bytes to skip for a given offset, length and block size.
///
/// `block_size` must be non-zero; guarding against zero is the caller's job.
pub fn block_info(offset: u64, length: u64, block_size: u64) -> BlockInfo {
    debug_assert!(block_size > 0, "block_size must be > 0");
    BlockInfo {
        start_block: offset / block_size,
        end_block: length / block_size,
        bytes_to_skip: offset % block_size,
    }
}

/// Per-shard length needed for `data_blocks` shards to hold `input_len` bytes.
///
/// `data_blocks` must be at least 1.
pub fn encoded_block_len(input_len: u64, data_blocks: usize) -> u64 {
    debug_assert!(data_blocks > 0, "data_blocks must be >= 1");
    input_len.div_ceil(data_blocks as u64)
}

/// Total bytes held by the first `data_blocks` shards.
pub fn data_block_len<S: AsRef<[u8]>>(blocks: &[S], data_blocks: usize) -> u64 {
    blocks
        .iter()
        .take(data_blocks)
        .map(|b| b.as_ref().len() as u64)
        .sum()
}

/// Logical length of block `block` in an object of `total_size` bytes.
///
/// Every block is `block_size` long except the last, which holds the
/// remainder. Blocks past the end have length zero.
pub fn block_len_at(block: u64, block_size: u64, total_size: u64) -> u64 {
    debug_assert!(block_size > 0, "block_size must be > 0");
    let start = block.saturating_mul(block_size);
    total_size.saturating_sub(start).min(block_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_block_info_basic() {
        let info = block_info(25, 100, 10);
        assert_eq!(
            info,
            BlockInfo {
                start_block: 2,
                end_block: 10,
                bytes_to_skip: 5,
            }
        );
    }

    #[test]
    fn test_end_block_ignores_offset() {
        // end_block is derived from the length alone
        let info = block_info(95, 10, 10);
        assert_eq!(info.start_block, 9);
        assert_eq!(info.end_block, 1);
    }

    #[test]
    fn test_encoded_block_len() {
        assert_eq!(encoded_block_len(0, 4), 0);
        assert_eq!(encoded_block_len(1, 4), 1);
        assert_eq!(encoded_block_len(16, 4), 4);
        assert_eq!(encoded_block_len(17, 4), 5);
        assert_eq!(encoded_block_len(10 * 1024 * 1024, 8), 1_310_720);
    }

    #[test]
    fn test_data_block_len_ignores_parity() {
        let blocks = vec![vec![0u8; 10], vec![0u8; 10], vec![0u8; 7], vec![0u8; 99]];
        assert_eq!(data_block_len(&blocks, 3), 27);
        assert_eq!(data_block_len(&blocks, 10), 126);
    }

    #[test]
    fn test_block_len_at() {
        assert_eq!(block_len_at(0, 10, 25), 10);
        assert_eq!(block_len_at(2, 10, 25), 5);
        assert_eq!(block_len_at(3, 10, 25), 0);
        assert_eq!(block_len_at(0, 10, 0), 0);
    }

    proptest! {
        #[test]
        fn prop_block_info_decomposes_offset(
            offset in 0u64..u64::MAX / 2,
            length in 0u64..1 << 40,
            block_size in 1u64..1 << 30,
        ) {
            let info = block_info(offset, length, block_size);
            prop_assert_eq!(offset, info.start_block * block_size + info.bytes_to_skip);
            prop_assert!(info.bytes_to_skip < block_size);
        }

        #[test]
        fn prop_encoded_block_len_is_minimal(
            input_len in 0u64..1 << 40,
            data_blocks in 1usize..64,
        ) {
            let len = encoded_block_len(input_len, data_blocks);
            prop_assert!(len * data_blocks as u64 >= input_len);
            if len > 0 {
                prop_assert!((len - 1) * (data_blocks as u64) < input_len);
            }
        }
    }
}
