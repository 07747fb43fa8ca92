//! PFS index (`.idx`) parsing
//!
//! Layout after the 16-byte container header, all relative pointers taken from
//! the start of the body (offset 0x10):
//!
//! ```text
//! 0x00 node_count u32 | file_count u32 | package_count u32 | reserved u32
//! 0x10 nodes_ptr i64  | files_ptr i64  | packages_ptr i64
//! ```

use tracing::debug;

use crate::cursor::{relative, BinaryReader};
use crate::error::Result;
use crate::header::{ContainerHeader, PFS_FORMAT};
use crate::path_tree::{PathNode, PathTable};

/// Id of the implicit root every top-level filename node hangs from
pub const PFS_ROOT_ID: u64 = 0xDBB1_A1D1_B108_B927;

const BODY_OFFSET: u64 = ContainerHeader::SIZE;

const BODY_NODE_COUNT: u64 = 0x00;
const BODY_FILE_COUNT: u64 = 0x04;
const BODY_PACKAGE_COUNT: u64 = 0x08;
const BODY_NODES_PTR: u64 = 0x10;
const BODY_FILES_PTR: u64 = 0x18;
const BODY_PACKAGES_PTR: u64 = 0x20;

const NODE_SIZE: u64 = 32;
const NODE_ID: u64 = 0;
const NODE_PARENT: u64 = 8;
const NODE_NAME_LEN: u64 = 16;
const NODE_NAME_PTR: u64 = 24;

const PACKAGE_SIZE: u64 = 24;
const PACKAGE_NAME_LEN: u64 = 0;
const PACKAGE_NAME_PTR: u64 = 8;
const PACKAGE_ID: u64 = 16;

/// Compression methods used for package entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    /// Stored as-is
    Store,
    /// Raw DEFLATE stream (no zlib header)
    Deflate,
    /// Unknown/unsupported method
    Unknown(u32),
}

impl From<u32> for CompressionMethod {
    fn from(value: u32) -> Self {
        match value {
            0 => CompressionMethod::Store,
            5 => CompressionMethod::Deflate,
            other => CompressionMethod::Unknown(other),
        }
    }
}

impl CompressionMethod {
    pub fn to_u32(self) -> u32 {
        match self {
            CompressionMethod::Store => 0,
            CompressionMethod::Deflate => 5,
            CompressionMethod::Unknown(other) => other,
        }
    }
}

/// One file-info entry: where a file's bytes live and how they are stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path hash, equal to the id of the file's filename node
    pub id: u64,
    pub package_id: u64,
    /// Byte offset of the data inside the package
    pub offset: u64,
    pub compression: CompressionMethod,
    pub flags: u32,
    pub compressed_size: u32,
    /// CRC-32 of the uncompressed bytes
    pub crc32: u32,
    pub uncompressed_size: u32,
}

impl FileRecord {
    pub const RECORD_SIZE: u64 = 48;

    fn read(reader: &BinaryReader, at: u64) -> Result<Self> {
        Ok(FileRecord {
            id: reader.read_at(at)?,
            package_id: reader.read_at(at + 8)?,
            offset: reader.read_at(at + 16)?,
            compression: CompressionMethod::from(reader.read_at::<u32>(at + 24)?),
            flags: reader.read_at(at + 28)?,
            compressed_size: reader.read_at(at + 32)?,
            crc32: reader.read_at(at + 36)?,
            uncompressed_size: reader.read_at(at + 40)?,
        })
    }
}

/// A package file named by the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    pub id: u64,
    /// File name relative to the package directory
    pub name: String,
}

/// Parsed contents of one index file
#[derive(Debug, Clone)]
pub struct ArchiveIndex {
    pub header: ContainerHeader,
    paths: PathTable,
    /// Sorted by id (stable, duplicates kept)
    files: Vec<FileRecord>,
    packages: Vec<PackageEntry>,
}

impl ArchiveIndex {
    /// Parse an index blob.
    ///
    /// With `validate` set, the header checksum is checked against the body
    /// before anything else is decoded.
    pub fn parse(data: &[u8], validate: bool) -> Result<Self> {
        let header = ContainerHeader::parse(data, &PFS_FORMAT, validate)?;
        let reader = BinaryReader::new(data);

        let node_count: u32 = reader.read_at(BODY_OFFSET + BODY_NODE_COUNT)?;
        let file_count: u32 = reader.read_at(BODY_OFFSET + BODY_FILE_COUNT)?;
        let package_count: u32 = reader.read_at(BODY_OFFSET + BODY_PACKAGE_COUNT)?;
        let nodes_offset = relative(BODY_OFFSET, reader.read_at(BODY_OFFSET + BODY_NODES_PTR)?)?;
        let files_offset = relative(BODY_OFFSET, reader.read_at(BODY_OFFSET + BODY_FILES_PTR)?)?;
        let packages_offset =
            relative(BODY_OFFSET, reader.read_at(BODY_OFFSET + BODY_PACKAGES_PTR)?)?;

        debug!(
            "PFS index: {} nodes at {:#x}, {} files at {:#x}, {} packages at {:#x}",
            node_count, nodes_offset, file_count, files_offset, package_count, packages_offset
        );

        let nodes = Self::read_nodes(&reader, nodes_offset, node_count)?;
        let paths = PathTable::build(&nodes, &[(PFS_ROOT_ID, "")]);

        // Check the whole span before reserving for a declared count.
        reader.bytes_at(files_offset, file_count as u64 * FileRecord::RECORD_SIZE)?;
        let mut files = Vec::with_capacity(file_count as usize);
        for i in 0..file_count as u64 {
            files.push(FileRecord::read(&reader, files_offset + i * FileRecord::RECORD_SIZE)?);
        }
        files.sort_by_key(|f| f.id);

        let packages = Self::read_packages(&reader, packages_offset, package_count)?;

        Ok(ArchiveIndex {
            header,
            paths,
            files,
            packages,
        })
    }

    fn read_nodes(reader: &BinaryReader, offset: u64, count: u32) -> Result<Vec<PathNode>> {
        reader.bytes_at(offset, count as u64 * NODE_SIZE)?;
        let mut nodes = Vec::with_capacity(count as usize);
        for i in 0..count as u64 {
            let at = offset + i * NODE_SIZE;
            let name_len: u64 = reader.read_at(at + NODE_NAME_LEN)?;
            let name_at = relative(at, reader.read_at(at + NODE_NAME_PTR)?)?;
            nodes.push(PathNode {
                id: reader.read_at(at + NODE_ID)?,
                parent_id: reader.read_at(at + NODE_PARENT)?,
                name: reader.read_string_at(name_at, name_len)?,
            });
        }
        Ok(nodes)
    }

    fn read_packages(reader: &BinaryReader, offset: u64, count: u32) -> Result<Vec<PackageEntry>> {
        reader.bytes_at(offset, count as u64 * PACKAGE_SIZE)?;
        let mut packages = Vec::with_capacity(count as usize);
        for i in 0..count as u64 {
            let at = offset + i * PACKAGE_SIZE;
            let name_len: u64 = reader.read_at(at + PACKAGE_NAME_LEN)?;
            let name_at = relative(at, reader.read_at(at + PACKAGE_NAME_PTR)?)?;
            packages.push(PackageEntry {
                id: reader.read_at(at + PACKAGE_ID)?,
                name: reader.read_string_at(name_at, name_len)?,
            });
        }
        Ok(packages)
    }

    /// Binary search for a file record by id
    pub fn find_file(&self, id: u64) -> Option<&FileRecord> {
        let idx = self.files.partition_point(|f| f.id < id);
        self.files.get(idx).filter(|f| f.id == id)
    }

    /// File record for a path inside the archive
    pub fn find_path(&self, path: &str) -> Option<&FileRecord> {
        self.get_id(path).and_then(|id| self.find_file(id))
    }

    /// Id of a path, accepting `\` separators and a leading `/`
    pub fn get_id(&self, path: &str) -> Option<u64> {
        self.paths.id_of(&normalize_path(path))
    }

    /// Full path for an id, if its filename node resolved
    pub fn get_path(&self, id: u64) -> Option<&str> {
        self.paths.get(id)
    }

    /// All file records, sorted by id
    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn packages(&self) -> &[PackageEntry] {
        &self.packages
    }

    pub fn paths(&self) -> &PathTable {
        &self.paths
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// Normalize path to forward slashes without a leading separator
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches('/').to_string()
}
