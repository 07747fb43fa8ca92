//! `VelocityFieldPrototype`: a regular 3D grid of velocity samples

use crate::bwdb::records::read_values;
use crate::bwdb::schema::{FieldKind, SchemaWriter};
use crate::cursor::BinaryReader;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct VelocityFieldPrototype {
    pub dimensions: [u32; 3],
    pub scale: f32,
    /// `x + y * dx + z * dx * dy` ordered samples
    pub samples: Vec<[f32; 3]>,
}

impl VelocityFieldPrototype {
    pub const TYPE_NAME: &'static str = "VelocityFieldPrototype";
    pub const SIZE: u64 = 32;

    const DIMENSIONS: u64 = 0;
    const SCALE: u64 = 12;
    const SAMPLES: u64 = 16;

    pub fn read(reader: &BinaryReader, at: u64) -> Result<Self> {
        let dimensions: [u32; 3] = reader.read_at(at + Self::DIMENSIONS)?;
        let samples: Vec<[f32; 3]> = read_values(reader, at + Self::SAMPLES)?;

        let expected = dimensions.iter().map(|&d| d as u64).product::<u64>();
        if expected != samples.len() as u64 {
            return Err(Error::CorruptData(format!(
                "velocity field {:?} expects {} samples, found {}",
                dimensions,
                expected,
                samples.len()
            )));
        }

        Ok(VelocityFieldPrototype {
            dimensions,
            scale: reader.read_at(at + Self::SCALE)?,
            samples,
        })
    }

    pub fn describe(w: &mut SchemaWriter) {
        w.fixed(FieldKind::U32, 3, "dimensions")
            .field(FieldKind::F32, "scale")
            .array("samples", 12, |w| {
                w.fixed(FieldKind::F32, 3, "velocity");
            });
    }

    /// Sample at grid coordinates, if inside the grid
    pub fn sample(&self, x: u32, y: u32, z: u32) -> Option<[f32; 3]> {
        let [dx, dy, dz] = self.dimensions;
        if x >= dx || y >= dy || z >= dz {
            return None;
        }
        let index = x as usize + y as usize * dx as usize + z as usize * dx as usize * dy as usize;
        self.samples.get(index).copied()
    }
}
