//! Table id -> record layout registry
//!
//! A table's id is the Murmur3 hash of its record type name. Each entry knows
//! the record stride, how to decode one record and how to describe the
//! layout for the schema fingerprint. A stride of zero marks a type that is
//! recognised but has no decoder yet.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::bwdb::records::*;
use crate::bwdb::schema::{schema_hash, DescribeFn};
use crate::cursor::BinaryReader;
use crate::error::Result;
use crate::hash::murmur3_32;

/// Decode one record starting at the given offset
pub type DecodeFn = fn(&BinaryReader, u64) -> Result<Record>;

/// Static description of one record table type
pub struct TableDescriptor {
    pub type_name: &'static str,
    /// Bytes per record; zero when the layout is not implemented
    pub stride: u64,
    pub decode: Option<DecodeFn>,
    pub describe: DescribeFn,
    expected_hash: OnceLock<u32>,
}

impl TableDescriptor {
    const fn new(
        type_name: &'static str,
        stride: u64,
        decode: Option<DecodeFn>,
        describe: DescribeFn,
    ) -> Self {
        TableDescriptor {
            type_name,
            stride,
            decode,
            describe,
            expected_hash: OnceLock::new(),
        }
    }

    /// Table id: Murmur3 of the type name
    pub fn id(&self) -> u32 {
        murmur3_32(self.type_name.as_bytes())
    }

    /// Schema hash of the compiled layout, computed on first use
    pub fn expected_schema_hash(&self) -> u32 {
        *self
            .expected_hash
            .get_or_init(|| schema_hash(self.type_name, self.describe))
    }

    pub fn is_implemented(&self) -> bool {
        self.stride != 0 && self.decode.is_some()
    }
}

static REGISTRY: [TableDescriptor; 9] = [
    TableDescriptor::new(
        MaterialPrototype::TYPE_NAME,
        MaterialPrototype::SIZE,
        Some(decode_material),
        MaterialPrototype::describe,
    ),
    TableDescriptor::new(
        VisualPrototype::TYPE_NAME,
        VisualPrototype::SIZE,
        Some(decode_visual),
        VisualPrototype::describe,
    ),
    TableDescriptor::new(
        ModelPrototype::TYPE_NAME,
        ModelPrototype::SIZE,
        Some(decode_model),
        ModelPrototype::describe,
    ),
    TableDescriptor::new(
        PointLightPrototype::TYPE_NAME,
        PointLightPrototype::SIZE,
        Some(decode_point_light),
        PointLightPrototype::describe,
    ),
    TableDescriptor::new(
        VelocityFieldPrototype::TYPE_NAME,
        VelocityFieldPrototype::SIZE,
        Some(decode_velocity_field),
        VelocityFieldPrototype::describe,
    ),
    TableDescriptor::new(
        AtlasContourPrototype::TYPE_NAME,
        AtlasContourPrototype::SIZE,
        Some(decode_atlas_contour),
        AtlasContourPrototype::describe,
    ),
    TableDescriptor::new(EffectPrototype::TYPE_NAME, 0, None, EffectPrototype::describe),
    TableDescriptor::new(
        EffectPresetPrototype::TYPE_NAME,
        EffectPresetPrototype::SIZE,
        Some(decode_effect_preset),
        EffectPresetPrototype::describe,
    ),
    TableDescriptor::new(
        EffectMetadataPrototype::TYPE_NAME,
        EffectMetadataPrototype::SIZE,
        Some(decode_effect_metadata),
        EffectMetadataPrototype::describe,
    ),
];

fn decode_material(reader: &BinaryReader, at: u64) -> Result<Record> {
    MaterialPrototype::read(reader, at).map(Record::Material)
}

fn decode_visual(reader: &BinaryReader, at: u64) -> Result<Record> {
    VisualPrototype::read(reader, at).map(Record::Visual)
}

fn decode_model(reader: &BinaryReader, at: u64) -> Result<Record> {
    ModelPrototype::read(reader, at).map(Record::Model)
}

fn decode_point_light(reader: &BinaryReader, at: u64) -> Result<Record> {
    PointLightPrototype::read(reader, at).map(Record::PointLight)
}

fn decode_velocity_field(reader: &BinaryReader, at: u64) -> Result<Record> {
    VelocityFieldPrototype::read(reader, at).map(Record::VelocityField)
}

fn decode_atlas_contour(reader: &BinaryReader, at: u64) -> Result<Record> {
    AtlasContourPrototype::read(reader, at).map(Record::AtlasContour)
}

fn decode_effect_preset(reader: &BinaryReader, at: u64) -> Result<Record> {
    EffectPresetPrototype::read(reader, at).map(Record::EffectPreset)
}

fn decode_effect_metadata(reader: &BinaryReader, at: u64) -> Result<Record> {
    EffectMetadataPrototype::read(reader, at).map(Record::EffectMetadata)
}

fn by_id() -> &'static HashMap<u32, &'static TableDescriptor> {
    static BY_ID: OnceLock<HashMap<u32, &'static TableDescriptor>> = OnceLock::new();
    BY_ID.get_or_init(|| REGISTRY.iter().map(|d| (d.id(), d)).collect())
}

/// Descriptor for a table id, if the type is known
pub fn lookup(id: u32) -> Option<&'static TableDescriptor> {
    by_id().get(&id).copied()
}

/// Descriptor for a type name
pub fn lookup_name(type_name: &str) -> Option<&'static TableDescriptor> {
    REGISTRY.iter().find(|d| d.type_name == type_name)
}

/// All registered table types
pub fn descriptors() -> &'static [TableDescriptor] {
    &REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_eq!(by_id().len(), REGISTRY.len());
    }

    #[test]
    fn test_lookup_round_trip() {
        for descriptor in descriptors() {
            let found = lookup(descriptor.id()).unwrap();
            assert_eq!(found.type_name, descriptor.type_name);
        }
    }

    #[test]
    fn test_effect_is_registered_but_unimplemented() {
        let effect = lookup_name("EffectPrototype").unwrap();
        assert!(!effect.is_implemented());
        assert!(lookup_name("MaterialPrototype").unwrap().is_implemented());
        assert_eq!(effect.expected_schema_hash(), murmur3_32(b"EffectPrototype"));
    }

    #[test]
    fn test_expected_hash_is_cached_and_stable() {
        let visual = lookup_name("VisualPrototype").unwrap();
        let first = visual.expected_schema_hash();
        assert_eq!(first, visual.expected_schema_hash());
        assert_eq!(first, schema_hash("VisualPrototype", VisualPrototype::describe));
    }

    #[test]
    fn test_strides_match_decoders() {
        let strides: Vec<(&str, u64)> = descriptors().iter().map(|d| (d.type_name, d.stride)).collect();
        assert!(strides.contains(&("MaterialPrototype", 56)));
        assert!(strides.contains(&("VisualPrototype", 80)));
        assert!(strides.contains(&("EffectPrototype", 0)));
    }
}
