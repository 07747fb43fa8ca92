//! `MaterialPrototype`: shader binding plus texture and constant tables

use crate::bwdb::ids::{ResourceId, StringId};
use crate::bwdb::records::{read_array, ARRAY_HEADER_SIZE};
use crate::bwdb::schema::{FieldKind, SchemaWriter};
use crate::cursor::BinaryReader;
use crate::error::Result;

/// Texture bound to a named shader slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureSlot {
    pub name: StringId,
    pub texture: ResourceId,
}

impl TextureSlot {
    pub const SIZE: u64 = 16;

    const NAME: u64 = 0;
    const TEXTURE: u64 = 8;

    pub fn read(reader: &BinaryReader, at: u64) -> Result<Self> {
        Ok(TextureSlot {
            name: reader.read_at(at + Self::NAME)?,
            texture: reader.read_at(at + Self::TEXTURE)?,
        })
    }

    pub fn describe(w: &mut SchemaWriter) {
        w.field(FieldKind::StringId, "name")
            .padding(4)
            .field(FieldKind::ResourceId, "texture");
    }
}

/// Named scalar shader constant
#[derive(Debug, Clone, PartialEq)]
pub struct FloatConstant {
    pub name: StringId,
    pub value: f32,
}

impl FloatConstant {
    pub const SIZE: u64 = 8;

    pub fn read(reader: &BinaryReader, at: u64) -> Result<Self> {
        Ok(FloatConstant {
            name: reader.read_at(at)?,
            value: reader.read_at(at + 4)?,
        })
    }

    pub fn describe(w: &mut SchemaWriter) {
        w.field(FieldKind::StringId, "name").field(FieldKind::F32, "value");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialPrototype {
    pub name: StringId,
    pub flags: u32,
    /// Effect (`.fx`) the material renders with
    pub shader: ResourceId,
    pub textures: Vec<TextureSlot>,
    pub constants: Vec<FloatConstant>,
    pub collision_flags: u32,
    pub sort_order: i32,
}

impl MaterialPrototype {
    pub const TYPE_NAME: &'static str = "MaterialPrototype";
    pub const SIZE: u64 = 56;

    const NAME: u64 = 0;
    const FLAGS: u64 = 4;
    const SHADER: u64 = 8;
    const TEXTURES: u64 = 16;
    const CONSTANTS: u64 = Self::TEXTURES + ARRAY_HEADER_SIZE;
    const COLLISION_FLAGS: u64 = 48;
    const SORT_ORDER: u64 = 52;

    pub fn read(reader: &BinaryReader, at: u64) -> Result<Self> {
        Ok(MaterialPrototype {
            name: reader.read_at(at + Self::NAME)?,
            flags: reader.read_at(at + Self::FLAGS)?,
            shader: reader.read_at(at + Self::SHADER)?,
            textures: read_array(reader, at + Self::TEXTURES, TextureSlot::SIZE, TextureSlot::read)?,
            constants: read_array(
                reader,
                at + Self::CONSTANTS,
                FloatConstant::SIZE,
                FloatConstant::read,
            )?,
            collision_flags: reader.read_at(at + Self::COLLISION_FLAGS)?,
            sort_order: reader.read_at(at + Self::SORT_ORDER)?,
        })
    }

    pub fn describe(w: &mut SchemaWriter) {
        w.field(FieldKind::StringId, "name")
            .field(FieldKind::U32, "flags")
            .field(FieldKind::ResourceId, "shader")
            .array("textures", TextureSlot::SIZE as usize, TextureSlot::describe)
            .array("constants", FloatConstant::SIZE as usize, FloatConstant::describe)
            .field(FieldKind::U32, "collisionFlags")
            .field(FieldKind::I32, "sortOrder");
    }

    /// First texture bound to the slot with this name hash
    pub fn texture(&self, slot: StringId) -> Option<ResourceId> {
        self.textures
            .iter()
            .find(|t| t.name == slot)
            .map(|t| t.texture)
    }
}
