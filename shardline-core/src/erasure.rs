//! Reed-Solomon erasure coding
//!
//! Turns one logical block into `data + parity` shards of
//! `encoded_block_len(block, data)` bytes each, and rebuilds missing data
//! shards from any `data` survivors.

use crate::error::{Result, ShardlineError};
use crate::geometry::encoded_block_len;
use crate::{DATA_SHARDS, PARITY_SHARDS};
use reed_solomon_erasure::galois_8::ReedSolomon;

/// Erasure coding configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErasureConfig {
    /// Number of data shards
    pub data_shards: usize,
    /// Number of parity shards
    pub parity_shards: usize,
}

impl Default for ErasureConfig {
    fn default() -> Self {
        Self {
            data_shards: DATA_SHARDS,
            parity_shards: PARITY_SHARDS,
        }
    }
}

impl ErasureConfig {
    /// Create a new erasure config
    pub fn new(data_shards: usize, parity_shards: usize) -> Result<Self> {
        if data_shards == 0 {
            return Err(ShardlineError::Configuration(
                "data_shards must be > 0".to_string(),
            ));
        }
        if parity_shards == 0 {
            return Err(ShardlineError::Configuration(
                "parity_shards must be > 0".to_string(),
            ));
        }
        Ok(Self {
            data_shards,
            parity_shards,
        })
    }

    /// Total number of shards
    pub fn total_shards(&self) -> usize {
        self.data_shards + self.parity_shards
    }

    /// Maximum number of lost shards that can be tolerated
    pub fn max_failures(&self) -> usize {
        self.parity_shards
    }
}

/// Reed-Solomon encoder/decoder for encoded blocks
pub struct ErasureCoder {
    config: ErasureConfig,
    codec: ReedSolomon,
}

impl ErasureCoder {
    /// Create a coder with the default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ErasureConfig::default())
    }

    /// Create a coder with a custom configuration
    pub fn with_config(config: ErasureConfig) -> Result<Self> {
        let codec = ReedSolomon::new(config.data_shards, config.parity_shards)?;
        Ok(Self { config, codec })
    }

    /// Get the erasure configuration
    pub fn config(&self) -> &ErasureConfig {
        &self.config
    }

    /// Encode one block into data + parity shards.
    ///
    /// The block is zero-padded so that every shard is
    /// `encoded_block_len(block.len(), data_shards)` bytes long.
    pub fn encode_block(&self, block: &[u8]) -> Result<Vec<Vec<u8>>> {
        let shard_size = encoded_block_len(block.len() as u64, self.config.data_shards) as usize;
        let total = self.config.total_shards();
        if shard_size == 0 {
            return Ok(vec![Vec::new(); total]);
        }

        let mut shards: Vec<Vec<u8>> = Vec::with_capacity(total);
        for chunk in block.chunks(shard_size) {
            let mut shard = chunk.to_vec();
            shard.resize(shard_size, 0);
            shards.push(shard);
        }
        // Short blocks can leave trailing data shards fully padded
        while shards.len() < total {
            shards.push(vec![0u8; shard_size]);
        }

        self.codec.encode(&mut shards)?;
        Ok(shards)
    }

    /// Rebuild missing data shards in place.
    ///
    /// Requires at least `data_shards` present entries. Parity shards that
    /// are missing stay `None`.
    pub fn reconstruct_data(&self, shards: &mut [Option<Vec<u8>>]) -> Result<()> {
        let total = self.config.total_shards();
        if shards.len() != total {
            return Err(ShardlineError::ShardSizeMismatch {
                expected: total,
                actual: shards.len(),
            });
        }

        let available = shards.iter().filter(|s| s.is_some()).count();
        if available < self.config.data_shards {
            return Err(ShardlineError::InsufficientShards {
                available,
                required: self.config.data_shards,
            });
        }

        if shards[..self.config.data_shards].iter().all(Option::is_some) {
            return Ok(());
        }

        self.codec.reconstruct_data(shards)?;
        Ok(())
    }

    /// Check that the parity shards match the data shards
    pub fn verify(&self, shards: &[Vec<u8>]) -> Result<bool> {
        if shards.len() != self.config.total_shards() {
            return Ok(false);
        }

        let expected_size = shards.first().map(|s| s.len()).unwrap_or(0);
        if !shards.iter().all(|s| s.len() == expected_size) {
            return Ok(false);
        }
        if expected_size == 0 {
            return Ok(true);
        }

        Ok(self.codec.verify(shards)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::write_data_blocks;

    fn decode_all(coder: &ErasureCoder, shards: Vec<Option<Vec<u8>>>, size: usize) -> Vec<u8> {
        let mut shards = shards;
        coder.reconstruct_data(&mut shards).unwrap();
        let data: Vec<Vec<u8>> = shards
            .into_iter()
            .take(coder.config().data_shards)
            .map(|s| s.unwrap())
            .collect();
        let mut out: Vec<u8> = Vec::new();
        write_data_blocks(&mut out, &data, coder.config().data_shards, 0, size as u64).unwrap();
        out
    }

    #[test]
    fn test_erasure_config() {
        let config = ErasureConfig::default();
        assert_eq!(config.data_shards, 8);
        assert_eq!(config.parity_shards, 4);
        assert_eq!(config.total_shards(), 12);
        assert_eq!(config.max_failures(), 4);

        assert!(ErasureConfig::new(0, 2).is_err());
        assert!(ErasureConfig::new(2, 0).is_err());
    }

    #[test]
    fn test_encode_shard_sizes() {
        let coder = ErasureCoder::with_config(ErasureConfig::new(4, 2).unwrap()).unwrap();
        let shards = coder.encode_block(b"seventeen bytes!!").unwrap();

        assert_eq!(shards.len(), 6);
        assert!(shards.iter().all(|s| s.len() == 5));
        assert!(coder.verify(&shards).unwrap());
    }

    #[test]
    fn test_encode_tiny_block_pads_trailing_shards() {
        let coder = ErasureCoder::with_config(ErasureConfig::new(4, 2).unwrap()).unwrap();
        let shards = coder.encode_block(b"ab").unwrap();

        assert_eq!(shards.len(), 6);
        assert_eq!(shards[0], b"a");
        assert_eq!(shards[1], b"b");
        assert_eq!(shards[2], vec![0]);
        assert_eq!(shards[3], vec![0]);
    }

    #[test]
    fn test_encode_empty_block() {
        let coder = ErasureCoder::new().unwrap();
        let shards = coder.encode_block(&[]).unwrap();
        assert_eq!(shards.len(), 12);
        assert!(shards.iter().all(Vec::is_empty));
    }

    #[test]
    fn test_reconstruct_with_missing_shards() {
        let coder = ErasureCoder::new().unwrap();
        let original: Vec<u8> = (0..100_000u32).map(|i| (i % 253) as u8).collect();
        let shards = coder.encode_block(&original).unwrap();

        let mut opts: Vec<Option<Vec<u8>>> = shards.into_iter().map(Some).collect();
        opts[0] = None;
        opts[3] = None;
        opts[7] = None;
        opts[11] = None;

        assert_eq!(decode_all(&coder, opts, original.len()), original);
    }

    #[test]
    fn test_too_many_missing_shards() {
        let coder = ErasureCoder::new().unwrap();
        let shards = coder.encode_block(b"test data").unwrap();

        let mut opts: Vec<Option<Vec<u8>>> = shards.into_iter().map(Some).collect();
        for shard in opts.iter_mut().take(5) {
            *shard = None;
        }

        let result = coder.reconstruct_data(&mut opts);
        assert!(matches!(
            result,
            Err(ShardlineError::InsufficientShards {
                available: 7,
                required: 8
            })
        ));
    }

    #[test]
    fn test_verify_detects_corruption() {
        let coder = ErasureCoder::new().unwrap();
        let mut shards = coder.encode_block(b"verify test payload").unwrap();
        assert!(coder.verify(&shards).unwrap());

        shards[0][0] ^= 0xFF;
        assert!(!coder.verify(&shards).unwrap());
    }
}
