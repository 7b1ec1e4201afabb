//! # Streaming Input
//!
//! Feeds a byte stream into a digest state one bounded chunk at a time.

use std::io::{self, Read};

use crate::crypto::DigestSink;

/// Default read buffer: 64 KB
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Read `reader` to end of stream, feeding every chunk into `sink`
///
/// Memory use is bounded by `chunk_size` regardless of input length.
/// A `chunk_size` of zero is treated as one. Returns the number of bytes fed.
pub fn pump<R, S>(mut reader: R, sink: &mut S, chunk_size: usize) -> io::Result<u64>
where
    R: Read,
    S: DigestSink + ?Sized,
{
    let mut buffer = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => return Ok(total),
            Ok(n) => {
                sink.update(&buffer[..n]);
                total += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
