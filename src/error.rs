//! Error types for unpfs

use thiserror::Error;

/// Main error type for unpfs operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid magic: expected {expected:#010x}, found {found:#010x}")]
    InvalidMagic { expected: u32, found: u32 },

    #[error("Unsupported {format} version: {version:#010x}")]
    UnsupportedVersion { format: &'static str, version: u32 },

    #[error("Unsupported {format} pointer width: {width}")]
    UnsupportedPointerWidth { format: &'static str, width: u32 },

    #[error("Corrupt data: {0}")]
    CorruptData(String),

    #[error("Read of {len} bytes at offset {offset} exceeds buffer size {size}")]
    OutOfRange { offset: u64, len: u64, size: u64 },

    #[error("Checksum mismatch for {name}: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch {
        name: String,
        expected: u32,
        actual: u32,
    },

    #[error("Unsupported compression method: {0}")]
    UnsupportedCompression(u32),

    #[error("Decompression error: {0}")]
    Decompression(String),

    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    #[error("A prototype database is already active on this thread")]
    DatabaseAlreadyActive,
}

/// Result type alias for unpfs operations
pub type Result<T> = std::result::Result<T, Error>;
