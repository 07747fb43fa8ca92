//! Fixed-layout prototype records
//!
//! Every record type decodes field by field from named offsets and describes
//! the same fields for its schema fingerprint. Arrays inside records are
//! `{count u64, ptr i64}` headers whose pointer is relative to the header.

mod atlas_contour;
mod effect;
mod light;
mod material;
mod model;
mod velocity_field;
mod visual;

pub use atlas_contour::AtlasContourPrototype;
pub use effect::{EffectMetadataPrototype, EffectPresetPrototype, EffectPrototype};
pub use light::PointLightPrototype;
pub use material::{FloatConstant, MaterialPrototype, TextureSlot};
pub use model::{Dye, ModelPrototype};
pub use velocity_field::VelocityFieldPrototype;
pub use visual::{Lod, RenderSet, SkeletonNode, SkeletonPrototype, VisualPrototype};

use crate::cursor::{relative, BinaryReader, ReadValue};
use crate::error::{Error, Result};

/// Size of an in-record `{count, ptr}` array header
pub(crate) const ARRAY_HEADER_SIZE: u64 = 16;

/// A decoded record of any registered type
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Material(MaterialPrototype),
    Visual(VisualPrototype),
    Model(ModelPrototype),
    PointLight(PointLightPrototype),
    VelocityField(VelocityFieldPrototype),
    AtlasContour(AtlasContourPrototype),
    EffectPreset(EffectPresetPrototype),
    EffectMetadata(EffectMetadataPrototype),
}

impl Record {
    /// Type name the record's table id is hashed from
    pub fn type_name(&self) -> &'static str {
        match self {
            Record::Material(_) => MaterialPrototype::TYPE_NAME,
            Record::Visual(_) => VisualPrototype::TYPE_NAME,
            Record::Model(_) => ModelPrototype::TYPE_NAME,
            Record::PointLight(_) => PointLightPrototype::TYPE_NAME,
            Record::VelocityField(_) => VelocityFieldPrototype::TYPE_NAME,
            Record::AtlasContour(_) => AtlasContourPrototype::TYPE_NAME,
            Record::EffectPreset(_) => EffectPresetPrototype::TYPE_NAME,
            Record::EffectMetadata(_) => EffectMetadataPrototype::TYPE_NAME,
        }
    }

    pub fn as_material(&self) -> Option<&MaterialPrototype> {
        match self {
            Record::Material(material) => Some(material),
            _ => None,
        }
    }

    pub fn as_visual(&self) -> Option<&VisualPrototype> {
        match self {
            Record::Visual(visual) => Some(visual),
            _ => None,
        }
    }

    pub fn as_model(&self) -> Option<&ModelPrototype> {
        match self {
            Record::Model(model) => Some(model),
            _ => None,
        }
    }
}

/// Read a relative array whose elements are `stride` bytes apart
pub(crate) fn read_array<T, F>(reader: &BinaryReader, at: u64, stride: u64, read: F) -> Result<Vec<T>>
where
    F: Fn(&BinaryReader, u64) -> Result<T>,
{
    let count: u64 = reader.read_at(at)?;
    let base = relative(at, reader.read_at(at + 8)?)?;
    let total = count
        .checked_mul(stride)
        .ok_or_else(|| Error::CorruptData(format!("array of {} elements overflows", count)))?;
    // Check the whole span before allocating for `count` elements.
    reader.bytes_at(base, total)?;
    (0..count).map(|i| read(reader, base + i * stride)).collect()
}

/// Read a relative array of plain values
pub(crate) fn read_values<T: ReadValue>(reader: &BinaryReader, at: u64) -> Result<Vec<T>> {
    read_array(reader, at, T::SIZE as u64, |r, offset| r.read_at(offset))
}
