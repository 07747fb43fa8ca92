//! `ModelPrototype`: a visual plus animations and dye variants

use crate::bwdb::ids::{ResourceId, StringId};
use crate::bwdb::records::{read_array, read_values};
use crate::bwdb::schema::{FieldKind, SchemaWriter};
use crate::cursor::BinaryReader;
use crate::error::Result;

/// Camouflage/dye override: replaces one matter with one of several tints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dye {
    pub matter: StringId,
    pub replaces: StringId,
    pub tints: Vec<StringId>,
}

impl Dye {
    pub const SIZE: u64 = 24;

    pub fn read(reader: &BinaryReader, at: u64) -> Result<Self> {
        Ok(Dye {
            matter: reader.read_at(at)?,
            replaces: reader.read_at(at + 4)?,
            tints: read_values(reader, at + 8)?,
        })
    }

    pub fn describe(w: &mut SchemaWriter) {
        w.field(FieldKind::StringId, "matter")
            .field(FieldKind::StringId, "replaces")
            .array_of(FieldKind::StringId, "tints");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPrototype {
    pub visual: ResourceId,
    pub animations: Vec<ResourceId>,
    pub dyes: Vec<Dye>,
}

impl ModelPrototype {
    pub const TYPE_NAME: &'static str = "ModelPrototype";
    pub const SIZE: u64 = 40;

    const VISUAL: u64 = 0;
    const ANIMATIONS: u64 = 8;
    const DYES: u64 = 24;

    pub fn read(reader: &BinaryReader, at: u64) -> Result<Self> {
        Ok(ModelPrototype {
            visual: reader.read_at(at + Self::VISUAL)?,
            animations: read_values(reader, at + Self::ANIMATIONS)?,
            dyes: read_array(reader, at + Self::DYES, Dye::SIZE, Dye::read)?,
        })
    }

    pub fn describe(w: &mut SchemaWriter) {
        w.field(FieldKind::ResourceId, "visualResource")
            .array_of(FieldKind::ResourceId, "animations")
            .array("dyes", Dye::SIZE as usize, Dye::describe);
    }
}
