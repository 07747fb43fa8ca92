//! Bounds-checked little-endian reads over an in-memory buffer
//!
//! Every structure in both container formats is decoded through
//! [`BinaryReader`]. Reads never clamp: anything that would run past the end of
//! the buffer fails with [`Error::OutOfRange`].

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// Fixed-size value that can be decoded from little-endian bytes
pub trait ReadValue: Sized {
    const SIZE: usize;

    fn from_le(bytes: &[u8]) -> Self;
}

impl ReadValue for u8 {
    const SIZE: usize = 1;

    fn from_le(bytes: &[u8]) -> Self {
        bytes[0]
    }
}

impl ReadValue for u16 {
    const SIZE: usize = 2;

    fn from_le(bytes: &[u8]) -> Self {
        LittleEndian::read_u16(bytes)
    }
}

impl ReadValue for u32 {
    const SIZE: usize = 4;

    fn from_le(bytes: &[u8]) -> Self {
        LittleEndian::read_u32(bytes)
    }
}

impl ReadValue for u64 {
    const SIZE: usize = 8;

    fn from_le(bytes: &[u8]) -> Self {
        LittleEndian::read_u64(bytes)
    }
}

impl ReadValue for i32 {
    const SIZE: usize = 4;

    fn from_le(bytes: &[u8]) -> Self {
        LittleEndian::read_i32(bytes)
    }
}

impl ReadValue for i64 {
    const SIZE: usize = 8;

    fn from_le(bytes: &[u8]) -> Self {
        LittleEndian::read_i64(bytes)
    }
}

impl ReadValue for f32 {
    const SIZE: usize = 4;

    fn from_le(bytes: &[u8]) -> Self {
        LittleEndian::read_f32(bytes)
    }
}

impl<T: ReadValue + Copy + Default, const N: usize> ReadValue for [T; N] {
    const SIZE: usize = T::SIZE * N;

    fn from_le(bytes: &[u8]) -> Self {
        let mut out = [T::default(); N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = T::from_le(&bytes[i * T::SIZE..]);
        }
        out
    }
}

/// Cursor over a borrowed byte buffer
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: u64,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        BinaryReader { data, pos: 0 }
    }

    /// Total buffer length
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Move to an absolute offset. Seeking exactly to the end is allowed.
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        if offset > self.len() {
            return Err(Error::OutOfRange {
                offset,
                len: 0,
                size: self.len(),
            });
        }
        self.pos = offset;
        Ok(())
    }

    /// Borrow `len` bytes starting at `offset`
    pub fn bytes_at(&self, offset: u64, len: u64) -> Result<&'a [u8]> {
        let end = offset.checked_add(len).filter(|&end| end <= self.len());
        match end {
            Some(end) => Ok(&self.data[offset as usize..end as usize]),
            None => Err(Error::OutOfRange {
                offset,
                len,
                size: self.len(),
            }),
        }
    }

    pub fn read_at<T: ReadValue>(&self, offset: u64) -> Result<T> {
        let bytes = self.bytes_at(offset, T::SIZE as u64)?;
        Ok(T::from_le(bytes))
    }

    /// Read at the current position and advance past the value
    pub fn read<T: ReadValue>(&mut self) -> Result<T> {
        let value = self.read_at(self.pos)?;
        self.pos += T::SIZE as u64;
        Ok(value)
    }

    pub fn read_bytes(&mut self, len: u64) -> Result<&'a [u8]> {
        let bytes = self.bytes_at(self.pos, len)?;
        self.pos += len;
        Ok(bytes)
    }

    /// Read `count` consecutive values starting at `offset`
    pub fn read_array_at<T: ReadValue>(&self, offset: u64, count: u64) -> Result<Vec<T>> {
        let total = count
            .checked_mul(T::SIZE as u64)
            .ok_or_else(|| Error::CorruptData(format!("array of {} elements overflows", count)))?;
        let bytes = self.bytes_at(offset, total)?;
        Ok(bytes.chunks_exact(T::SIZE).map(T::from_le).collect())
    }

    /// Read an explicitly sized text run. Trailing NUL bytes are dropped.
    pub fn read_string_at(&self, offset: u64, len: u64) -> Result<String> {
        let bytes = self.bytes_at(offset, len)?;
        let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    /// Read a NUL-terminated string. A missing terminator is an error.
    pub fn read_cstring_at(&self, offset: u64) -> Result<String> {
        let tail = self.bytes_at(offset, self.len().saturating_sub(offset))?;
        let end = tail.iter().position(|&b| b == 0).ok_or(Error::OutOfRange {
            offset,
            len: tail.len() as u64 + 1,
            size: self.len(),
        })?;
        Ok(String::from_utf8_lossy(&tail[..end]).into_owned())
    }
}

/// Apply a signed relative pointer to a base offset
pub fn relative(base: u64, ptr: i64) -> Result<u64> {
    base.checked_add_signed(ptr).ok_or_else(|| {
        Error::CorruptData(format!(
            "relative pointer {} from offset {:#x} leaves the buffer",
            ptr, base
        ))
    })
}
