//! All index files of an installation, read against one package directory

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::pfs::archive::{OpenOptions, PfsArchive};
use crate::pfs::index::FileRecord;

/// A set of archives searched in index file-name order
pub struct ArchiveSet {
    archives: Vec<(String, PfsArchive<BufReader<File>>)>,
}

impl ArchiveSet {
    /// Open every `*.idx` file in `index_dir`
    pub fn open_dir<P: AsRef<Path>, D: AsRef<Path>>(
        index_dir: P,
        package_dir: D,
        options: OpenOptions,
    ) -> Result<Self> {
        let mut index_files = Vec::new();
        for entry in fs::read_dir(index_dir)? {
            let path = entry?.path();
            let is_index = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("idx"));
            if path.is_file() && is_index {
                index_files.push(path);
            }
        }
        index_files.sort();

        let mut archives = Vec::with_capacity(index_files.len());
        for path in index_files {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let archive = PfsArchive::open(&path, package_dir.as_ref(), options)?;
            debug!("loaded {} with {} files", name, archive.index().file_count());
            archives.push((name, archive));
        }

        Ok(ArchiveSet { archives })
    }

    /// Index file names, in search order
    pub fn index_names(&self) -> impl Iterator<Item = &str> {
        self.archives.iter().map(|(name, _)| name.as_str())
    }

    pub fn archives(&self) -> impl Iterator<Item = &PfsArchive<BufReader<File>>> {
        self.archives.iter().map(|(_, archive)| archive)
    }

    pub fn len(&self) -> usize {
        self.archives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }

    /// First record for `path` across all indexes
    pub fn find_path(&self, path: &str) -> Option<&FileRecord> {
        self.archives
            .iter()
            .find_map(|(_, archive)| archive.index().find_path(path))
    }

    /// Every resolved file path with its record
    pub fn files(&self) -> impl Iterator<Item = (&str, &FileRecord)> {
        self.archives.iter().flat_map(|(_, archive)| {
            let index = archive.index();
            index
                .files()
                .iter()
                .filter_map(move |record| index.get_path(record.id).map(|path| (path, record)))
        })
    }

    /// Read `path` from the first index that lists it
    pub fn open_file(&mut self, path: &str) -> Result<Option<Vec<u8>>> {
        for (_, archive) in self.archives.iter_mut() {
            if let Some(id) = archive.index().get_id(path) {
                if archive.find_file(id).is_some() {
                    return archive.open_file_by_id(id);
                }
            }
        }
        debug!("{} not found in any index", path);
        Ok(None)
    }
}
