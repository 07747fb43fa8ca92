//! Content hashes shared by both container formats
//!
//! Whole-blob checksums and schema fingerprints use 32-bit MurmurHash3 with a
//! zero seed. Per-file checksums in a package are CRC-32.

use std::io::Cursor;

/// 32-bit MurmurHash3 (x86 variant, seed 0) of `data`
pub fn murmur3_32(data: &[u8]) -> u32 {
    // Reading a slice cannot fail
    murmur3::murmur3_32(&mut Cursor::new(data), 0).unwrap_or_default()
}

/// CRC-32 (IEEE) of `data`
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}
