//! Schema fingerprints for record layouts
//!
//! Each record type describes its on-disk fields into a [`SchemaWriter`]. The
//! type name followed by that description is hashed with Murmur3; a database
//! table stores the same hash for the layout it was written with. A mismatch
//! only means the compiled layout may be stale. It never stops decoding.

use std::fmt::Write;

use crate::hash::murmur3_32;

/// Field layout callback
pub type DescribeFn = fn(&mut SchemaWriter);

/// Primitive field kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    U8,
    U16,
    U32,
    I32,
    U64,
    F32,
    StringId,
    ResourceId,
}

impl FieldKind {
    fn tag(self) -> &'static str {
        match self {
            FieldKind::U8 => "u8",
            FieldKind::U16 => "u16",
            FieldKind::U32 => "u32",
            FieldKind::I32 => "i32",
            FieldKind::U64 => "u64",
            FieldKind::F32 => "f32",
            FieldKind::StringId => "sid",
            FieldKind::ResourceId => "rid",
        }
    }

    pub fn size(self) -> usize {
        match self {
            FieldKind::U8 => 1,
            FieldKind::U16 => 2,
            FieldKind::U32 | FieldKind::I32 | FieldKind::F32 | FieldKind::StringId => 4,
            FieldKind::U64 | FieldKind::ResourceId => 8,
        }
    }
}

/// Accumulates `kind:size:name;` tokens
#[derive(Debug, Default)]
pub struct SchemaWriter {
    out: String,
}

impl SchemaWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&mut self, kind: FieldKind, name: &str) -> &mut Self {
        let _ = write!(self.out, "{}:{}:{};", kind.tag(), kind.size(), name);
        self
    }

    /// Inline fixed-length array, e.g. a `[f32; 3]` position
    pub fn fixed(&mut self, kind: FieldKind, count: usize, name: &str) -> &mut Self {
        let _ = write!(
            self.out,
            "{}[{}]:{}:{};",
            kind.tag(),
            count,
            kind.size() * count,
            name
        );
        self
    }

    pub fn padding(&mut self, size: usize) -> &mut Self {
        let _ = write!(self.out, "pad:{};", size);
        self
    }

    /// Relative `{count, ptr}` array whose elements are described by `element`
    pub fn array(&mut self, name: &str, element_size: usize, element: DescribeFn) -> &mut Self {
        let _ = write!(self.out, "count:8:{};ptr<{}>{{", name, element_size);
        element(self);
        let _ = write!(self.out, "}}:8:{};", name);
        self
    }

    /// Relative array of a single primitive kind
    pub fn array_of(&mut self, kind: FieldKind, name: &str) -> &mut Self {
        let _ = write!(self.out, "count:8:{};ptr<{}>:8:{};", name, kind.tag(), name);
        self
    }

    /// Structure embedded by value
    pub fn nested(&mut self, name: &str, size: usize, inner: DescribeFn) -> &mut Self {
        let _ = write!(self.out, "struct{{");
        inner(self);
        let _ = write!(self.out, "}}:{}:{};", size, name);
        self
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Full fingerprint text: type name followed by its field description
pub fn schema_text(type_name: &str, describe: DescribeFn) -> String {
    let mut writer = SchemaWriter::new();
    describe(&mut writer);
    format!("{}{}", type_name, writer.finish())
}

/// Murmur3 of [`schema_text`]
pub fn schema_hash(type_name: &str, describe: DescribeFn) -> u32 {
    murmur3_32(schema_text(type_name, describe).as_bytes())
}
