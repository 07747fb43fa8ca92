//! Parallel key/value array sections
//!
//! ```text
//! 0x00 capacity u32 | reserved u32
//! 0x08 keys_ptr i64          (relative to the section start)
//! 0x10 values_ptr i64        (relative to the section start)
//! ```
//!
//! Each key slot is the key followed by a 32-bit bucket word; only slots with
//! the high bit of the bucket word set hold a live entry.

use crate::cursor::{relative, BinaryReader, ReadValue};
use crate::error::Result;

const LIVE_BIT: u32 = 0x8000_0000;

#[derive(Debug, Clone, Copy)]
pub struct DictionarySection {
    pub capacity: u32,
    pub keys_offset: u64,
    pub values_offset: u64,
}

impl DictionarySection {
    pub const SIZE: u64 = 24;

    pub fn read(reader: &BinaryReader, at: u64) -> Result<Self> {
        Ok(DictionarySection {
            capacity: reader.read_at(at)?,
            keys_offset: relative(at, reader.read_at(at + 8)?)?,
            values_offset: relative(at, reader.read_at(at + 16)?)?,
        })
    }

    /// Decode every live `(key, value)` pair.
    ///
    /// Key slots are `key_stride` bytes apart with the bucket word right after
    /// the key; values are packed back to back.
    pub fn live_entries<K: ReadValue, V: ReadValue>(
        &self,
        reader: &BinaryReader,
        key_stride: u64,
    ) -> Result<Vec<(K, V)>> {
        let mut entries = Vec::new();
        for i in 0..self.capacity as u64 {
            let key_at = self.keys_offset + i * key_stride;
            let bucket: u32 = reader.read_at(key_at + K::SIZE as u64)?;
            if bucket & LIVE_BIT == 0 {
                continue;
            }
            let key = reader.read_at(key_at)?;
            let value = reader.read_at(self.values_offset + i * V::SIZE as u64)?;
            entries.push((key, value));
        }
        Ok(entries)
    }
}
