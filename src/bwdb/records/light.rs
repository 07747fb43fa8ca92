//! `PointLightPrototype`

use crate::bwdb::ids::StringId;
use crate::bwdb::schema::{FieldKind, SchemaWriter};
use crate::cursor::BinaryReader;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct PointLightPrototype {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub intensity: f32,
    pub casts_shadows: bool,
    /// Skeleton node the light is attached to
    pub node_name: StringId,
}

impl PointLightPrototype {
    pub const TYPE_NAME: &'static str = "PointLightPrototype";
    pub const SIZE: u64 = 48;

    const POSITION: u64 = 0;
    const COLOR: u64 = 12;
    const INNER_RADIUS: u64 = 24;
    const OUTER_RADIUS: u64 = 28;
    const INTENSITY: u64 = 32;
    const CASTS_SHADOWS: u64 = 36;
    const NODE_NAME: u64 = 40;

    pub fn read(reader: &BinaryReader, at: u64) -> Result<Self> {
        Ok(PointLightPrototype {
            position: reader.read_at(at + Self::POSITION)?,
            color: reader.read_at(at + Self::COLOR)?,
            inner_radius: reader.read_at(at + Self::INNER_RADIUS)?,
            outer_radius: reader.read_at(at + Self::OUTER_RADIUS)?,
            intensity: reader.read_at(at + Self::INTENSITY)?,
            casts_shadows: reader.read_at::<u8>(at + Self::CASTS_SHADOWS)? != 0,
            node_name: reader.read_at(at + Self::NODE_NAME)?,
        })
    }

    pub fn describe(w: &mut SchemaWriter) {
        w.fixed(FieldKind::F32, 3, "position")
            .fixed(FieldKind::F32, 3, "color")
            .field(FieldKind::F32, "attenuationInner")
            .field(FieldKind::F32, "attenuationOuter")
            .field(FieldKind::F32, "intensity")
            .field(FieldKind::U8, "castsShadows")
            .padding(3)
            .field(FieldKind::StringId, "nodeName")
            .padding(4);
    }
}
