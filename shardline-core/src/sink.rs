//! Sink writes
//!
//! Every sink in the data path is a [`std::io::Write`]. A chunk is handed to
//! the sink in one `write` call and anything short of the full chunk is a
//! [`ShardlineError::ShortWrite`].

use crate::error::{Result, ShardlineError};
use std::io::{ErrorKind, Write};

/// Hand `buf` to `dst` in a single write, failing on a short write.
///
/// Returns the number of bytes accepted, which always equals `buf.len()`.
pub fn write_chunk<W: Write + ?Sized>(dst: &mut W, buf: &[u8]) -> Result<usize> {
    if buf.is_empty() {
        return Ok(0);
    }
    let written = loop {
        match dst.write(buf) {
            Ok(n) => break n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    };
    if written != buf.len() {
        return Err(ShardlineError::ShortWrite {
            written,
            expected: buf.len(),
        });
    }
    Ok(written)
}


#[cfg(test)]
mod tests {
    use super::testing::ChokedWriter;
    use super::*;

    #[test]
    fn test_full_write() {
        let mut out: Vec<u8> = Vec::new();
        assert_eq!(write_chunk(&mut out, b"hello").unwrap(), 5);
        assert_eq!(out, b"hello");
    }

    #[test]
    fn test_short_write_is_fatal() {
        let mut out = ChokedWriter {
            limit: 3,
            data: Vec::new(),
        };
        let err = write_chunk(&mut out, b"hello").unwrap_err();
        assert!(matches!(
            err,
            ShardlineError::ShortWrite {
                written: 3,
                expected: 5
            }
        ));
    }

    #[test]
    fn test_empty_chunk_skips_sink() {
        let mut out = ChokedWriter {
            limit: 0,
            data: Vec::new(),
        };
        assert_eq!(write_chunk(&mut out, &[]).unwrap(), 0);
    }
}
