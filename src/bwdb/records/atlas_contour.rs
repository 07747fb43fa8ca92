//! `AtlasContourPrototype`: outline of one region in a texture atlas

use crate::bwdb::records::read_values;
use crate::bwdb::schema::{FieldKind, SchemaWriter};
use crate::cursor::BinaryReader;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct AtlasContourPrototype {
    /// Closed polygon in normalized atlas UV space
    pub contour: Vec<[f32; 2]>,
    pub region_index: u32,
}

impl AtlasContourPrototype {
    pub const TYPE_NAME: &'static str = "AtlasContourPrototype";
    pub const SIZE: u64 = 24;

    const CONTOUR: u64 = 0;
    const REGION_INDEX: u64 = 16;

    pub fn read(reader: &BinaryReader, at: u64) -> Result<Self> {
        Ok(AtlasContourPrototype {
            contour: read_values(reader, at + Self::CONTOUR)?,
            region_index: reader.read_at(at + Self::REGION_INDEX)?,
        })
    }

    pub fn describe(w: &mut SchemaWriter) {
        w.array("contour", 8, |w| {
            w.fixed(FieldKind::F32, 2, "uv");
        })
        .field(FieldKind::U32, "regionIndex")
        .padding(4);
    }
}
