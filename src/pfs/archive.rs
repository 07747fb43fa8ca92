//! Package store: serves file contents out of the `.pkg` files an index names

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use flate2::{Decompress, FlushDecompress, Status};
use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::hash::crc32;
use crate::pfs::index::{normalize_path, ArchiveIndex, CompressionMethod, FileRecord};

/// Options controlling how an archive is opened
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenOptions {
    /// Verify the index checksum on open and each file's CRC-32 on read
    pub validate: bool,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

struct Package<R> {
    name: String,
    reader: R,
}

/// A parsed index together with its open package streams.
///
/// Reads seek the shared package stream, so `open_file` takes `&mut self`;
/// callers that want parallel reads open one archive per thread.
pub struct PfsArchive<R = BufReader<File>> {
    index: ArchiveIndex,
    packages: HashMap<u64, Package<R>>,
    validate: bool,
}

impl PfsArchive<BufReader<File>> {
    /// Open an index file and the packages it names under `package_dir`
    ///
    /// # Example
    /// ```no_run
    /// use unpfs::pfs::{OpenOptions, PfsArchive};
    /// let mut archive = PfsArchive::open("idx/system_data.idx", "res_packages", OpenOptions::new())?;
    /// let bytes = archive.open_file("content/assets.bin")?;
    /// # Ok::<(), unpfs::Error>(())
    /// ```
    pub fn open<P: AsRef<Path>, D: AsRef<Path>>(
        index_path: P,
        package_dir: D,
        options: OpenOptions,
    ) -> Result<Self> {
        let data = fs::read(index_path)?;
        Self::from_bytes(&data, package_dir, options)
    }

    /// Parse index bytes and open the named packages.
    ///
    /// A package file that does not exist is skipped; files stored in it
    /// become unreadable rather than failing the whole archive.
    pub fn from_bytes<D: AsRef<Path>>(
        index_data: &[u8],
        package_dir: D,
        options: OpenOptions,
    ) -> Result<Self> {
        let index = ArchiveIndex::parse(index_data, options.validate)?;
        let package_dir = package_dir.as_ref();

        let mut streams = Vec::with_capacity(index.packages().len());
        for package in index.packages() {
            let path = package_dir.join(&package.name);
            match File::open(&path) {
                Ok(file) => streams.push((package.id, BufReader::new(file))),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!("package {} not found, its files will be unavailable", path.display());
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(Self::with_streams(index, streams, options))
    }
}

impl<R: Read + Seek> PfsArchive<R> {
    /// Build an archive from already opened package streams keyed by package id
    pub fn with_streams<I>(index: ArchiveIndex, streams: I, options: OpenOptions) -> Self
    where
        I: IntoIterator<Item = (u64, R)>,
    {
        let names: HashMap<u64, &str> = index
            .packages()
            .iter()
            .map(|p| (p.id, p.name.as_str()))
            .collect();
        let packages = streams
            .into_iter()
            .map(|(id, reader)| {
                let name = names
                    .get(&id)
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| format!("{:016x}", id));
                (id, Package { name, reader })
            })
            .collect();

        PfsArchive {
            index,
            packages,
            validate: options.validate,
        }
    }

    pub fn index(&self) -> &ArchiveIndex {
        &self.index
    }

    /// Binary search for a file record by id
    pub fn find_file(&self, id: u64) -> Option<&FileRecord> {
        self.index.find_file(id)
    }

    /// Names of the packages that were found and opened
    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.packages.values().map(|p| p.name.as_str())
    }

    /// Read a file by its path inside the archive.
    ///
    /// Returns `Ok(None)` when the path or its package is unknown; returns an
    /// error when the file's bytes cannot be decoded or fail validation.
    pub fn open_file(&mut self, path: &str) -> Result<Option<Vec<u8>>> {
        let Some(id) = self.index.get_id(path) else {
            warn!("path not found in index: {}", normalize_path(path));
            return Ok(None);
        };
        self.open_file_by_id(id)
    }

    /// Read a file by path, treating an unknown path or missing package as an error
    ///
    /// # Arguments
    /// * `path` - The file path within the archive
    ///
    /// # Returns
    /// The decompressed file contents
    pub fn extract(&mut self, path: &str) -> Result<Vec<u8>> {
        self.open_file(path)?
            .ok_or_else(|| Error::EntryNotFound(normalize_path(path)))
    }

    /// Read a file by id
    pub fn open_file_by_id(&mut self, id: u64) -> Result<Option<Vec<u8>>> {
        let Some(record) = self.index.find_file(id).cloned() else {
            warn!("file {:016x} not found in index", id);
            return Ok(None);
        };
        self.read_record(&record)
    }

    /// Read the bytes described by `record`
    pub fn read_record(&mut self, record: &FileRecord) -> Result<Option<Vec<u8>>> {
        let name = self
            .index
            .get_path(record.id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{:016x}", record.id));

        let Some(package) = self.packages.get_mut(&record.package_id) else {
            warn!("package {:016x} for {} is not available", record.package_id, name);
            return Ok(None);
        };

        trace!(
            "reading {} from {} at {:#x} ({} bytes)",
            name, package.name, record.offset, record.compressed_size
        );

        package.reader.seek(SeekFrom::Start(record.offset))?;
        let data = match record.compression {
            CompressionMethod::Store => {
                let mut data = vec![0u8; record.uncompressed_size as usize];
                package.reader.read_exact(&mut data)?;
                data
            }
            CompressionMethod::Deflate => {
                let mut compressed = vec![0u8; record.compressed_size as usize];
                package.reader.read_exact(&mut compressed)?;
                inflate(&compressed, record.uncompressed_size as usize)?
            }
            CompressionMethod::Unknown(method) => {
                return Err(Error::UnsupportedCompression(method));
            }
        };

        if self.validate {
            let actual = crc32(&data);
            if actual != record.crc32 {
                return Err(Error::ChecksumMismatch {
                    name,
                    expected: record.crc32,
                    actual,
                });
            }
        }

        Ok(Some(data))
    }
}

/// Inflate a raw DEFLATE stream that must end after exactly `size` bytes
fn inflate(data: &[u8], size: usize) -> Result<Vec<u8>> {
    // One spare byte so a stream longer than declared shows up as a length mismatch
    let mut decompressed = Vec::with_capacity(size + 1);
    let status = Decompress::new(false)
        .decompress_vec(data, &mut decompressed, FlushDecompress::Finish)
        .map_err(|e| Error::Decompression(format!("Deflate error: {}", e)))?;
    if !matches!(status, Status::StreamEnd) || decompressed.len() != size {
        return Err(Error::Decompression(format!(
            "Deflate stream gave {} bytes, expected {}",
            decompressed.len(),
            size
        )));
    }
    Ok(decompressed)
}
