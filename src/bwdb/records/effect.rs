//! Particle effect prototypes

use crate::bwdb::ids::{ResourceId, StringId};
use crate::bwdb::records::{read_array, read_values, FloatConstant};
use crate::bwdb::schema::{FieldKind, SchemaWriter};
use crate::cursor::BinaryReader;
use crate::error::Result;

/// Effect graphs. Registered so the table is recognised, but the record
/// layout is not mapped yet and the table loads empty.
pub struct EffectPrototype;

impl EffectPrototype {
    pub const TYPE_NAME: &'static str = "EffectPrototype";

    // TODO: map the emitter graph layout and give EffectPrototype a decoder.
    /// Describes no fields, so the expected schema hash is just the hash of
    /// the type name. Loading never compares it while the table is skipped.
    pub fn describe(_w: &mut SchemaWriter) {}
}

/// Effect with a set of overridden scalar parameters
#[derive(Debug, Clone, PartialEq)]
pub struct EffectPresetPrototype {
    pub effect: ResourceId,
    pub parameters: Vec<FloatConstant>,
}

impl EffectPresetPrototype {
    pub const TYPE_NAME: &'static str = "EffectPresetPrototype";
    pub const SIZE: u64 = 24;

    const EFFECT: u64 = 0;
    const PARAMETERS: u64 = 8;

    pub fn read(reader: &BinaryReader, at: u64) -> Result<Self> {
        Ok(EffectPresetPrototype {
            effect: reader.read_at(at + Self::EFFECT)?,
            parameters: read_array(
                reader,
                at + Self::PARAMETERS,
                FloatConstant::SIZE,
                FloatConstant::read,
            )?,
        })
    }

    pub fn describe(w: &mut SchemaWriter) {
        w.field(FieldKind::ResourceId, "effect").array(
            "parameters",
            FloatConstant::SIZE as usize,
            FloatConstant::describe,
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectMetadataPrototype {
    pub name: StringId,
    pub flags: u32,
    pub tags: Vec<StringId>,
}

impl EffectMetadataPrototype {
    pub const TYPE_NAME: &'static str = "EffectMetadataPrototype";
    pub const SIZE: u64 = 24;

    const NAME: u64 = 0;
    const FLAGS: u64 = 4;
    const TAGS: u64 = 8;

    pub fn read(reader: &BinaryReader, at: u64) -> Result<Self> {
        Ok(EffectMetadataPrototype {
            name: reader.read_at(at + Self::NAME)?,
            flags: reader.read_at(at + Self::FLAGS)?,
            tags: read_values(reader, at + Self::TAGS)?,
        })
    }

    pub fn describe(w: &mut SchemaWriter) {
        w.field(FieldKind::StringId, "name")
            .field(FieldKind::U32, "flags")
            .array_of(FieldKind::StringId, "tags");
    }
}
