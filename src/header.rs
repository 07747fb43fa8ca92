//! Container header shared by PFS indexes and BWDB databases

use tracing::debug;

use crate::cursor::BinaryReader;
use crate::error::{Error, Result};
use crate::hash::murmur3_32;

/// Recognised (magic, version, pointer width) tuple for one container format
#[derive(Debug, Clone, Copy)]
pub struct FormatSpec {
    pub name: &'static str,
    pub magic: u32,
    pub version: u32,
    pub pointer_width: u32,
}

/// `ISFP` package index
pub const PFS_FORMAT: FormatSpec = FormatSpec {
    name: "PFS",
    magic: 0x5046_5349,
    version: 0x0200_0000,
    pointer_width: 64,
};

/// `BWDB` prototype database
pub const BWDB_FORMAT: FormatSpec = FormatSpec {
    name: "BWDB",
    magic: 0x4244_5742,
    version: 0x0101_0000,
    pointer_width: 64,
};

/// Decoded 16-byte container header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub magic: u32,
    pub version: u32,
    /// Murmur3 of every byte after the header
    pub checksum: u32,
    pub pointer_width: u32,
}

impl ContainerHeader {
    pub const SIZE: u64 = 16;

    /// Parse and validate the header against `format`.
    ///
    /// With `validate` set, the stored checksum is recomputed over the rest of
    /// the blob and a mismatch is reported as [`Error::CorruptData`].
    pub fn parse(data: &[u8], format: &FormatSpec, validate: bool) -> Result<Self> {
        let reader = BinaryReader::new(data);
        let header = ContainerHeader {
            magic: reader.read_at(0)?,
            version: reader.read_at(4)?,
            checksum: reader.read_at(8)?,
            pointer_width: reader.read_at(12)?,
        };

        if header.magic != format.magic {
            return Err(Error::InvalidMagic {
                expected: format.magic,
                found: header.magic,
            });
        }
        if header.version != format.version {
            return Err(Error::UnsupportedVersion {
                format: format.name,
                version: header.version,
            });
        }
        if header.pointer_width != format.pointer_width {
            return Err(Error::UnsupportedPointerWidth {
                format: format.name,
                width: header.pointer_width,
            });
        }

        if validate {
            let actual = murmur3_32(&data[Self::SIZE as usize..]);
            if actual != header.checksum {
                return Err(Error::CorruptData(format!(
                    "{} checksum mismatch: header says {:#010x}, content hashes to {:#010x}",
                    format.name, header.checksum, actual
                )));
            }
            debug!("{} checksum {:#010x} verified", format.name, actual);
        }

        Ok(header)
    }
}
