//! `VisualPrototype`: skeleton, render sets and LODs of a mesh

use crate::bwdb::ids::{ResourceId, StringId};
use crate::bwdb::records::{read_array, read_values};
use crate::bwdb::schema::{FieldKind, SchemaWriter};
use crate::cursor::BinaryReader;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonNode {
    pub name: StringId,
    /// Index into the owning skeleton's node list; `u16::MAX` for the root
    pub parent_index: u16,
    /// Row-major 4x4 local transform
    pub transform: [f32; 16],
}

impl SkeletonNode {
    pub const SIZE: u64 = 72;
    pub const NO_PARENT: u16 = u16::MAX;

    pub fn read(reader: &BinaryReader, at: u64) -> Result<Self> {
        Ok(SkeletonNode {
            name: reader.read_at(at)?,
            parent_index: reader.read_at(at + 4)?,
            transform: reader.read_at(at + 8)?,
        })
    }

    pub fn describe(w: &mut SchemaWriter) {
        w.field(FieldKind::StringId, "name")
            .field(FieldKind::U16, "parentIndex")
            .padding(2)
            .fixed(FieldKind::F32, 16, "transform");
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkeletonPrototype {
    pub nodes: Vec<SkeletonNode>,
}

impl SkeletonPrototype {
    pub const SIZE: u64 = 16;

    pub fn read(reader: &BinaryReader, at: u64) -> Result<Self> {
        Ok(SkeletonPrototype {
            nodes: read_array(reader, at, SkeletonNode::SIZE, SkeletonNode::read)?,
        })
    }

    pub fn describe(w: &mut SchemaWriter) {
        w.array("nodes", SkeletonNode::SIZE as usize, SkeletonNode::describe);
    }

    /// Node names from `index` up to the root
    pub fn chain(&self, mut index: usize) -> Vec<StringId> {
        let mut names = Vec::new();
        while let Some(node) = self.nodes.get(index) {
            names.push(node.name);
            if node.parent_index == SkeletonNode::NO_PARENT || names.len() > self.nodes.len() {
                break;
            }
            index = node.parent_index as usize;
        }
        names
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lod {
    /// Camera distance up to which this LOD is used
    pub extent: f32,
    pub casts_shadow: bool,
    pub render_sets: Vec<StringId>,
}

impl Lod {
    pub const SIZE: u64 = 24;

    pub fn read(reader: &BinaryReader, at: u64) -> Result<Self> {
        Ok(Lod {
            extent: reader.read_at(at)?,
            casts_shadow: reader.read_at::<u8>(at + 4)? != 0,
            render_sets: read_values(reader, at + 8)?,
        })
    }

    pub fn describe(w: &mut SchemaWriter) {
        w.field(FieldKind::F32, "extent")
            .field(FieldKind::U8, "castsShadow")
            .padding(3)
            .array_of(FieldKind::StringId, "renderSetNames");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSet {
    pub name: StringId,
    pub material_name: StringId,
    pub vertices_name: StringId,
    pub indices_name: StringId,
    pub material: ResourceId,
    pub flags: u32,
}

impl RenderSet {
    pub const SIZE: u64 = 32;

    pub fn read(reader: &BinaryReader, at: u64) -> Result<Self> {
        Ok(RenderSet {
            name: reader.read_at(at)?,
            material_name: reader.read_at(at + 4)?,
            vertices_name: reader.read_at(at + 8)?,
            indices_name: reader.read_at(at + 12)?,
            material: reader.read_at(at + 16)?,
            flags: reader.read_at(at + 24)?,
        })
    }

    pub fn describe(w: &mut SchemaWriter) {
        w.field(FieldKind::StringId, "name")
            .field(FieldKind::StringId, "materialName")
            .field(FieldKind::StringId, "verticesName")
            .field(FieldKind::StringId, "indicesName")
            .field(FieldKind::ResourceId, "materialResource")
            .field(FieldKind::U32, "flags")
            .padding(4);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualPrototype {
    pub skeleton: SkeletonPrototype,
    /// Merged geometry file holding vertex and index buffers
    pub geometry: ResourceId,
    pub lods: Vec<Lod>,
    pub render_sets: Vec<RenderSet>,
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
}

impl VisualPrototype {
    pub const TYPE_NAME: &'static str = "VisualPrototype";
    pub const SIZE: u64 = 80;

    const SKELETON: u64 = 0;
    const GEOMETRY: u64 = 16;
    const LODS: u64 = 24;
    const RENDER_SETS: u64 = 40;
    const BOUNDS_MIN: u64 = 56;
    const BOUNDS_MAX: u64 = 68;

    pub fn read(reader: &BinaryReader, at: u64) -> Result<Self> {
        Ok(VisualPrototype {
            skeleton: SkeletonPrototype::read(reader, at + Self::SKELETON)?,
            geometry: reader.read_at(at + Self::GEOMETRY)?,
            lods: read_array(reader, at + Self::LODS, Lod::SIZE, Lod::read)?,
            render_sets: read_array(reader, at + Self::RENDER_SETS, RenderSet::SIZE, RenderSet::read)?,
            bounds_min: reader.read_at(at + Self::BOUNDS_MIN)?,
            bounds_max: reader.read_at(at + Self::BOUNDS_MAX)?,
        })
    }

    pub fn describe(w: &mut SchemaWriter) {
        w.nested("skeleton", SkeletonPrototype::SIZE as usize, SkeletonPrototype::describe)
            .field(FieldKind::ResourceId, "mergedGeometryPath")
            .array("lods", Lod::SIZE as usize, Lod::describe)
            .array("renderSets", RenderSet::SIZE as usize, RenderSet::describe)
            .fixed(FieldKind::F32, 3, "boundingBoxMin")
            .fixed(FieldKind::F32, 3, "boundingBoxMax");
    }

    pub fn render_set(&self, name: StringId) -> Option<&RenderSet> {
        self.render_sets.iter().find(|set| set.name == name)
    }
}
