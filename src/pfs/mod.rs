//! PFS package index and package store
//!
//! An installation ships a set of `.idx` index files and the `.pkg` package
//! files they describe. Each index holds:
//! - A filename section: `(id, parent, name)` nodes forming the path tree
//! - A file-info section: where each file lives and how it is compressed
//! - A package section: the package file names the data lives in
//!
//! ## Example
//!
//! ```rust,no_run
//! use unpfs::pfs::{ArchiveSet, OpenOptions};
//!
//! let mut set = ArchiveSet::open_dir("bin/idx", "res_packages", OpenOptions::new().validate(true))?;
//! if let Some(bytes) = set.open_file("content/assets.bin")? {
//!     println!("{} bytes", bytes.len());
//! }
//! # Ok::<(), unpfs::Error>(())
//! ```

mod archive;
mod index;
mod set;
pub mod utils;

pub use archive::{OpenOptions, PfsArchive};
pub use index::{normalize_path, ArchiveIndex, CompressionMethod, FileRecord, PackageEntry, PFS_ROOT_ID};
pub use set::ArchiveSet;
