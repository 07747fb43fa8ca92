//! Packed `(state, table, record)` prototype reference

/// Location of a record inside the table list, packed into 32 bits:
/// bits 0..2 state, bits 2..8 table index, bits 8..32 record index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrototypeReference(u32);

const STATE_BITS: u32 = 2;
const TABLE_BITS: u32 = 6;
const TABLE_SHIFT: u32 = STATE_BITS;
const RECORD_SHIFT: u32 = STATE_BITS + TABLE_BITS;

impl PrototypeReference {
    pub const MAX_STATE: u8 = (1 << STATE_BITS) - 1;
    pub const MAX_TABLE_INDEX: u8 = (1 << TABLE_BITS) - 1;
    pub const MAX_RECORD_INDEX: u32 = (1 << (32 - RECORD_SHIFT)) - 1;

    pub const fn from_raw(raw: u32) -> Self {
        PrototypeReference(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Pack the three fields; `None` if any does not fit its bit width
    pub fn new(state: u8, table_index: u8, record_index: u32) -> Option<Self> {
        if state > Self::MAX_STATE
            || table_index > Self::MAX_TABLE_INDEX
            || record_index > Self::MAX_RECORD_INDEX
        {
            return None;
        }
        Some(PrototypeReference(
            state as u32 | (table_index as u32) << TABLE_SHIFT | record_index << RECORD_SHIFT,
        ))
    }

    pub const fn state(self) -> u8 {
        (self.0 & Self::MAX_STATE as u32) as u8
    }

    pub const fn table_index(self) -> usize {
        ((self.0 >> TABLE_SHIFT) & Self::MAX_TABLE_INDEX as u32) as usize
    }

    pub const fn record_index(self) -> usize {
        (self.0 >> RECORD_SHIFT) as usize
    }

    /// Only state 0 may be dereferenced
    pub const fn is_valid(self) -> bool {
        self.state() == 0
    }
}
