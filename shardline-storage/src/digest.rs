//! Digest computation over device-resident files

use crate::copy::StreamCopier;
use crate::device::StorageDevice;
use rayon::prelude::*;
use shardline_core::{Checksum, HashAccumulator, HashAlgorithm, Result, READ_BUFFER_SIZE};
use tracing::debug;

/// Hash the entire contents of `volume/path` through `accumulator`.
///
/// The accumulator is consumed; on failure no partial digest escapes.
pub fn hash_sum<D: StorageDevice + ?Sized>(
    device: &D,
    volume: &str,
    path: &str,
    mut accumulator: HashAccumulator,
) -> Result<Checksum> {
    // Staging buffer of 128KiB for the copy.
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    let bytes = StreamCopier::default().copy_buffer(&mut accumulator, device, volume, path, &mut buf)?;

    let sum = accumulator.finalize();
    debug!(volume, path, bytes, checksum = %sum, "Computed file digest");
    Ok(sum)
}

/// Hash `volume/path` on every device in parallel, one accumulator per device.
///
/// `result[i]` belongs to `devices[i]`; a failure on one device does not
/// affect the others.
pub fn hash_sums<D: StorageDevice>(
    devices: &[D],
    volume: &str,
    path: &str,
    algorithm: HashAlgorithm,
) -> Vec<Result<Checksum>> {
    devices
        .par_iter()
        .map(|device| hash_sum(device, volume, path, HashAccumulator::new(algorithm)))
        .collect()
}
