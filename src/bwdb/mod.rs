//! BWDB prototype database
//!
//! The prototype database (`assets.bin`) stores every engine prototype in
//! typed tables and maps resource paths to them:
//! - A string dictionary: 32-bit hash -> interned string
//! - A path section: `(id, parent, name)` nodes forming the resource tree
//! - A resource dictionary: 64-bit path id -> packed table/record reference
//! - The record tables, one per prototype type
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use unpfs::bwdb::{LoadOptions, PrototypeDatabase};
//!
//! let db = Arc::new(PrototypeDatabase::open("assets.bin", LoadOptions::new())?);
//! let _active = db.activate()?;
//! if let Some(model) = db.resolve_path("content/ship.model").and_then(|r| r.as_model()) {
//!     // Ids print as text while the database is active
//!     println!("visual: {}", model.visual);
//! }
//! # Ok::<(), unpfs::Error>(())
//! ```

mod context;
mod database;
mod dictionary;
mod ids;
pub mod records;
mod reference;
pub mod registry;
pub mod schema;
pub mod utils;

pub use context::{activate, is_active, ActiveDatabase};
pub use database::{
    normalize_resource_path, LoadOptions, PrototypeDatabase, Table, TableStatus, BWDB_ROOT_ID,
};
pub use dictionary::DictionarySection;
pub use ids::{ResourceId, StringId};
pub use records::Record;
pub use reference::PrototypeReference;
