//! # unpfs
//!
//! A Rust library for reading PFS package installations and the BWDB
//! prototype database stored inside them.
//!
//! ## Overview
//!
//! An installation is a set of `.idx` index files describing files packed
//! into `.pkg` package files. This library provides:
//!
//! - Parsing `.idx` indexes and resolving file ids to full paths
//! - Reading stored and raw-DEFLATE files out of the packages
//! - Optional Murmur3 header and CRC-32 file validation
//! - Decoding the prototype database (`assets.bin`) into typed records
//! - Resolving resource paths and ids to prototype records
//!
//! ## Example - Reading files
//!
//! ```rust,no_run
//! use unpfs::pfs::{OpenOptions, PfsArchive};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut archive = PfsArchive::open("bin/idx/misc.idx", "res_packages", OpenOptions::new())?;
//!
//!     // List all files
//!     for (id, path) in archive.index().paths().iter() {
//!         println!("{:016x} {}", id, path);
//!     }
//!
//!     // Read a specific file
//!     let data = archive.open_file("content/gameplay/settings.xml")?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Example - Prototype database
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use unpfs::bwdb::{LoadOptions, PrototypeDatabase};
//!
//! fn main() -> anyhow::Result<()> {
//!     let db = Arc::new(PrototypeDatabase::open("assets.bin", LoadOptions::new().validate(true))?);
//!     let _active = db.activate()?;
//!
//!     if let Some(record) = db.resolve_path("content/ship.model") {
//!         println!("{}", record.type_name());
//!     }
//!     Ok(())
//! }
//! ```

pub mod bwdb;
pub mod cursor;
pub mod error;
pub mod hash;
pub mod header;
pub mod path_tree;
pub mod pfs;
pub mod utils;

pub use bwdb::{PrototypeDatabase, ResourceId, StringId};
pub use error::{Error, Result};
pub use header::ContainerHeader;
pub use pfs::{ArchiveIndex, ArchiveSet, PfsArchive};
pub use utils::{create_glob_matcher, format_size, matches_filter};
