//! Hash handles that resolve to text through a prototype database
//!
//! A handle carries only its hash. Text comes from whichever database is
//! active on the current thread (see [`crate::bwdb::activate`]) or from an
//! explicitly passed database; when neither knows the hash, the hash itself
//! is printed as fixed-width hex. Equality and hashing look at the hash only.

use std::fmt;

use crate::bwdb::context::with_active;
use crate::bwdb::PrototypeDatabase;
use crate::cursor::ReadValue;

/// 32-bit hash of a string in the database string table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct StringId(pub u32);

impl StringId {
    pub const fn new(hash: u32) -> Self {
        StringId(hash)
    }

    pub const fn hash(self) -> u32 {
        self.0
    }

    /// Text through the active database, or the hex hash
    pub fn resolve(self) -> String {
        with_active(|db| match db {
            Some(db) => db.get_string(self.0),
            None => format!("{:08x}", self.0),
        })
    }

    pub fn resolve_with(self, db: &PrototypeDatabase) -> String {
        db.get_string(self.0)
    }
}

impl fmt::Display for StringId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resolve())
    }
}

impl ReadValue for StringId {
    const SIZE: usize = 4;

    fn from_le(bytes: &[u8]) -> Self {
        StringId(<u32 as ReadValue>::from_le(bytes))
    }
}

/// 64-bit path id of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ResourceId(pub u64);

impl ResourceId {
    pub const fn new(hash: u64) -> Self {
        ResourceId(hash)
    }

    pub const fn hash(self) -> u64 {
        self.0
    }

    /// `0` and `u64::MAX` mark an empty reference
    pub const fn is_null(self) -> bool {
        self.0 == 0 || self.0 == u64::MAX
    }

    /// Path through the active database, or the hex hash
    pub fn resolve(self) -> String {
        with_active(|db| match db {
            Some(db) => db.get_path(self.0),
            None => format!("{:016x}", self.0),
        })
    }

    pub fn resolve_with(self, db: &PrototypeDatabase) -> String {
        db.get_path(self.0)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resolve())
    }
}

impl ReadValue for ResourceId {
    const SIZE: usize = 8;

    fn from_le(bytes: &[u8]) -> Self {
        ResourceId(<u64 as ReadValue>::from_le(bytes))
    }
}
