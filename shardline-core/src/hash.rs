//! Integrity hashing for shard streams
//!
//! Provides:
//! - A factory for per-device hash accumulators, keyed by algorithm name
//! - BLAKE2b-512 as the default algorithm (BLAKE3 available by name)
//! - `Checksum`, the finalized digest with hex conversions

use crate::error::{Result, ShardlineError};
use blake2::{Blake2b512, Digest};
use std::fmt;
use std::io;

/// Hash algorithms understood by the accumulator factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    /// BLAKE2b with a 512-bit digest
    #[default]
    Blake2b512,
    /// BLAKE3 with a 256-bit digest
    Blake3,
}

impl HashAlgorithm {
    /// Resolve an algorithm name. Unknown or empty names resolve to the
    /// default, never to an error.
    pub fn from_name(name: &str) -> Self {
        match name {
            "blake2b" => HashAlgorithm::Blake2b512,
            "blake3" => HashAlgorithm::Blake3,
            // Add new hashes here.
            _ => HashAlgorithm::default(),
        }
    }

    /// Canonical name of the algorithm
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Blake2b512 => "blake2b",
            HashAlgorithm::Blake3 => "blake3",
        }
    }

    /// Digest length in bytes
    pub fn digest_len(&self) -> usize {
        match self {
            HashAlgorithm::Blake2b512 => 64,
            HashAlgorithm::Blake3 => blake3::OUT_LEN,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Running hash over every byte read from one device.
///
/// Implements [`io::Write`] so it can be used directly as a copy sink.
#[derive(Clone)]
pub enum HashAccumulator {
    Blake2b512(Blake2b512),
    Blake3(Box<blake3::Hasher>),
}

impl HashAccumulator {
    /// Create an empty accumulator for `algorithm`
    pub fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Blake2b512 => HashAccumulator::Blake2b512(Blake2b512::new()),
            HashAlgorithm::Blake3 => HashAccumulator::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    /// Algorithm this accumulator computes
    pub fn algorithm(&self) -> HashAlgorithm {
        match self {
            HashAccumulator::Blake2b512(_) => HashAlgorithm::Blake2b512,
            HashAccumulator::Blake3(_) => HashAlgorithm::Blake3,
        }
    }

    /// Feed bytes into the running hash
    pub fn update(&mut self, data: &[u8]) {
        match self {
            HashAccumulator::Blake2b512(h) => Digest::update(h, data),
            HashAccumulator::Blake3(h) => {
                h.update(data);
            }
        }
    }

    /// Consume the accumulator and return its digest
    pub fn finalize(self) -> Checksum {
        match self {
            HashAccumulator::Blake2b512(h) => Checksum {
                algorithm: HashAlgorithm::Blake2b512,
                bytes: h.finalize().to_vec(),
            },
            HashAccumulator::Blake3(h) => Checksum {
                algorithm: HashAlgorithm::Blake3,
                bytes: h.finalize().as_bytes().to_vec(),
            },
        }
    }
}

impl Default for HashAccumulator {
    fn default() -> Self {
        Self::new(HashAlgorithm::default())
    }
}

impl fmt::Debug for HashAccumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashAccumulator({})", self.algorithm())
    }
}

impl io::Write for HashAccumulator {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// New accumulator for the named algorithm. Always succeeds: names that are
/// not recognized get the default algorithm.
pub fn new_hash_accumulator(algorithm: &str) -> HashAccumulator {
    HashAccumulator::new(HashAlgorithm::from_name(algorithm))
}

/// One default accumulator per device, index = device index.
pub fn new_hash_accumulators(count: usize) -> Vec<HashAccumulator> {
    (0..count).map(|_| HashAccumulator::default()).collect()
}

/// A finalized digest
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Checksum {
    algorithm: HashAlgorithm,
    bytes: Vec<u8>,
}

impl Checksum {
    /// Hash `data` in one shot
    pub fn compute(algorithm: HashAlgorithm, data: &[u8]) -> Self {
        let mut acc = HashAccumulator::new(algorithm);
        acc.update(data);
        acc.finalize()
    }

    /// Parse from a hex string
    pub fn from_hex(algorithm: HashAlgorithm, hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| ShardlineError::InvalidChecksum(format!("bad hex: {}", e)))?;
        if bytes.len() != algorithm.digest_len() {
            return Err(ShardlineError::InvalidChecksum(format!(
                "{} checksum length: expected {}, got {}",
                algorithm,
                algorithm.digest_len(),
                bytes.len()
            )));
        }
        Ok(Self { algorithm, bytes })
    }

    /// Algorithm that produced this digest
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Get the raw digest bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Verify that data matches this digest
    pub fn verify(&self, data: &[u8]) -> bool {
        Self::compute(self.algorithm, data) == *self
    }
}

impl fmt::Debug for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checksum({}:{})", self.algorithm, &self.to_hex()[..16])
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const BLAKE2B_512_EMPTY: &str = "786a02f742015903c6c6fd852552d272912f4740e15847618a86e217f71f5419\
                                     d25e1031afee585313896444934eb04b903a685b1448b755d56f701afe9be2ce";
    const BLAKE3_EMPTY: &str = "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262";

    #[test]
    fn test_default_is_blake2b_512() {
        let acc = new_hash_accumulator("blake2b");
        assert_eq!(acc.algorithm(), HashAlgorithm::Blake2b512);
        let sum = acc.finalize();
        assert_eq!(sum.as_bytes().len(), 64);
        assert_eq!(sum.to_hex(), BLAKE2B_512_EMPTY);
    }

    #[test]
    fn test_unknown_algorithm_falls_back() {
        for name in ["", "md5", "BLAKE2B", "sha256"] {
            let mut unknown = new_hash_accumulator(name);
            let mut explicit = new_hash_accumulator("blake2b");
            unknown.write_all(b"shard bytes").unwrap();
            explicit.write_all(b"shard bytes").unwrap();
            assert_eq!(unknown.finalize(), explicit.finalize(), "name {:?}", name);
        }
    }

    #[test]
    fn test_blake3_by_name() {
        let acc = new_hash_accumulator("blake3");
        assert_eq!(acc.algorithm(), HashAlgorithm::Blake3);
        assert_eq!(acc.finalize().to_hex(), BLAKE3_EMPTY);
    }

    #[test]
    fn test_accumulator_set_independent() {
        let mut set = new_hash_accumulators(3);
        assert_eq!(set.len(), 3);
        set[1].update(b"only device one");

        let sums: Vec<Checksum> = set.into_iter().map(HashAccumulator::finalize).collect();
        assert_eq!(sums[0], sums[2]);
        assert_ne!(sums[0], sums[1]);
        assert!(sums.iter().all(|s| s.algorithm() == HashAlgorithm::Blake2b512));
    }

    #[test]
    fn test_incremental_matches_one_shot() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 256) as u8).collect();
        let mut acc = HashAccumulator::default();
        for chunk in data.chunks(333) {
            acc.write_all(chunk).unwrap();
        }
        let sum = acc.finalize();
        assert_eq!(sum, Checksum::compute(HashAlgorithm::Blake2b512, &data));
        assert!(sum.verify(&data));
        assert!(!sum.verify(b"wrong data"));
    }

    #[test]
    fn test_checksum_hex_roundtrip() {
        let sum = Checksum::compute(HashAlgorithm::Blake3, b"hello");
        let parsed = Checksum::from_hex(HashAlgorithm::Blake3, &sum.to_hex()).unwrap();
        assert_eq!(sum, parsed);

        assert!(matches!(
            Checksum::from_hex(HashAlgorithm::Blake2b512, &sum.to_hex()),
            Err(ShardlineError::InvalidChecksum(_))
        ));
        assert!(matches!(
            Checksum::from_hex(HashAlgorithm::Blake3, "zz"),
            Err(ShardlineError::InvalidChecksum(_))
        ));
    }
}
