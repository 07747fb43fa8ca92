//! Builders for synthetic `.idx`, `.pkg` and `assets.bin` blobs

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::write::DeflateEncoder;
use flate2::Compression;

use unpfs::hash::{crc32, murmur3_32};
use unpfs::pfs::PFS_ROOT_ID;

pub const PFS_MAGIC: u32 = 0x5046_5349;
pub const PFS_VERSION: u32 = 0x0200_0000;
pub const BWDB_MAGIC: u32 = 0x4244_5742;
pub const BWDB_VERSION: u32 = 0x0101_0000;
pub const BWDB_ROOT_ID: u64 = 0x2E3E_5F4C_4F9C_2A55;

/// Write the 16-byte header over `data[..16]` with a matching checksum
pub fn seal(data: &mut [u8], magic: u32, version: u32) {
    let checksum = murmur3_32(&data[16..]);
    data[0..4].copy_from_slice(&magic.to_le_bytes());
    data[4..8].copy_from_slice(&version.to_le_bytes());
    data[8..12].copy_from_slice(&checksum.to_le_bytes());
    data[12..16].copy_from_slice(&64u32.to_le_bytes());
}

fn patch_i64(data: &mut [u8], at: usize, value: i64) {
    data[at..at + 8].copy_from_slice(&value.to_le_bytes());
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Where one file ended up inside its package
#[derive(Debug, Clone)]
pub struct PlacedFile {
    pub path: String,
    pub id: u64,
    pub package_id: u64,
    pub offset: u64,
    pub method: u32,
    pub compressed_size: u32,
    pub crc32: u32,
    pub uncompressed_size: u32,
}

/// An installation: one index plus the packages it describes
pub struct InstallBuilder {
    nodes: Vec<(u64, u64, String)>,
    node_ids: HashMap<String, u64>,
    next_id: u64,
    packages: Vec<(u64, String, Vec<u8>)>,
    pub files: Vec<PlacedFile>,
}

impl InstallBuilder {
    pub fn new() -> Self {
        InstallBuilder {
            nodes: Vec::new(),
            node_ids: HashMap::new(),
            next_id: 0x1000,
            packages: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn package(mut self, id: u64, name: &str) -> Self {
        self.packages.push((id, name.to_string(), Vec::new()));
        self
    }

    fn node_for(&mut self, path: &str) -> u64 {
        if let Some(&id) = self.node_ids.get(path) {
            return id;
        }
        let (parent, name) = match path.rsplit_once('/') {
            Some((parent, name)) => (self.node_for(parent), name),
            None => (PFS_ROOT_ID, path),
        };
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.push((id, parent, name.to_string()));
        self.node_ids.insert(path.to_string(), id);
        id
    }

    /// Stored file
    pub fn store(self, package_id: u64, path: &str, data: &[u8]) -> Self {
        self.add(package_id, path, data, 0)
    }

    /// Raw-DEFLATE file
    pub fn deflate(self, package_id: u64, path: &str, data: &[u8]) -> Self {
        self.add(package_id, path, data, 5)
    }

    pub fn add(mut self, package_id: u64, path: &str, data: &[u8], method: u32) -> Self {
        let id = self.node_for(path);
        let payload = match method {
            5 => deflate(data),
            _ => data.to_vec(),
        };
        let package = self
            .packages
            .iter_mut()
            .find(|(pid, _, _)| *pid == package_id)
            .map(|(_, _, bytes)| bytes);
        let offset = match package {
            Some(bytes) => {
                let offset = bytes.len() as u64;
                bytes.extend_from_slice(&payload);
                offset
            }
            None => 0,
        };
        self.files.push(PlacedFile {
            path: path.to_string(),
            id,
            package_id,
            offset,
            method,
            compressed_size: payload.len() as u32,
            crc32: crc32(data),
            uncompressed_size: data.len() as u32,
        });
        self
    }

    /// A file record whose package is not declared by the index
    pub fn orphan_file(mut self, package_id: u64, path: &str, data: &[u8]) -> Self {
        let id = self.node_for(path);
        self.files.push(PlacedFile {
            path: path.to_string(),
            id,
            package_id,
            offset: 0,
            method: 0,
            compressed_size: data.len() as u32,
            crc32: crc32(data),
            uncompressed_size: data.len() as u32,
        });
        self
    }

    pub fn file(&self, path: &str) -> &PlacedFile {
        self.files.iter().find(|f| f.path == path).unwrap()
    }

    pub fn package_bytes(&self, package_id: u64) -> &[u8] {
        self.packages
            .iter()
            .find(|(id, _, _)| *id == package_id)
            .map(|(_, _, bytes)| bytes.as_slice())
            .unwrap()
    }

    /// Serialize the index
    pub fn index_bytes(&self) -> Vec<u8> {
        const BODY: usize = 16;
        const BODY_HEADER: usize = 40;
        let nodes_at = BODY + BODY_HEADER;
        let files_at = nodes_at + self.nodes.len() * 32;
        let packages_at = files_at + self.files.len() * 48;
        let names_at = packages_at + self.packages.len() * 24;

        let mut out = vec![0u8; 16];
        out.write_u32::<LittleEndian>(self.nodes.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(self.files.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(self.packages.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(0).unwrap();
        out.write_i64::<LittleEndian>((nodes_at - BODY) as i64).unwrap();
        out.write_i64::<LittleEndian>((files_at - BODY) as i64).unwrap();
        out.write_i64::<LittleEndian>((packages_at - BODY) as i64).unwrap();

        let mut names = Vec::new();
        for (i, (id, parent, name)) in self.nodes.iter().enumerate() {
            let node_at = nodes_at + i * 32;
            let name_at = names_at + names.len();
            out.write_u64::<LittleEndian>(*id).unwrap();
            out.write_u64::<LittleEndian>(*parent).unwrap();
            // Names carry a trailing NUL counted in the length
            out.write_u64::<LittleEndian>(name.len() as u64 + 1).unwrap();
            out.write_i64::<LittleEndian>((name_at - node_at) as i64).unwrap();
            names.extend_from_slice(name.as_bytes());
            names.push(0);
        }

        for file in &self.files {
            out.write_u64::<LittleEndian>(file.id).unwrap();
            out.write_u64::<LittleEndian>(file.package_id).unwrap();
            out.write_u64::<LittleEndian>(file.offset).unwrap();
            out.write_u32::<LittleEndian>(file.method).unwrap();
            out.write_u32::<LittleEndian>(0).unwrap();
            out.write_u32::<LittleEndian>(file.compressed_size).unwrap();
            out.write_u32::<LittleEndian>(file.crc32).unwrap();
            out.write_u32::<LittleEndian>(file.uncompressed_size).unwrap();
            out.write_u32::<LittleEndian>(0).unwrap();
        }

        for (i, (id, name, _)) in self.packages.iter().enumerate() {
            let entry_at = packages_at + i * 24;
            let name_at = names_at + names.len();
            out.write_u64::<LittleEndian>(name.len() as u64).unwrap();
            out.write_i64::<LittleEndian>((name_at - entry_at) as i64).unwrap();
            out.write_u64::<LittleEndian>(*id).unwrap();
            names.extend_from_slice(name.as_bytes());
        }

        assert_eq!(out.len(), names_at);
        out.extend_from_slice(&names);
        seal(&mut out, PFS_MAGIC, PFS_VERSION);
        out
    }

    /// Write `<dir>/idx/<index_name>` and every package under `<dir>/packages`
    pub fn write_to(&self, dir: &Path, index_name: &str) {
        let idx_dir = dir.join("idx");
        let pkg_dir = dir.join("packages");
        fs::create_dir_all(&idx_dir).unwrap();
        fs::create_dir_all(&pkg_dir).unwrap();
        fs::write(idx_dir.join(index_name), self.index_bytes()).unwrap();
        for (_, name, bytes) in &self.packages {
            fs::write(pkg_dir.join(name), bytes).unwrap();
        }
    }
}

/// One table of the prototype database
pub struct TableSpec {
    pub id: u32,
    pub schema_hash: u32,
    pub record_count: u64,
    /// Records back to back, followed by whatever their arrays point at
    pub payload: Vec<u8>,
}

/// A prototype database blob
#[derive(Default)]
pub struct DbBuilder {
    strings: Vec<(u32, String)>,
    dead_strings: Vec<u32>,
    paths: Vec<(u64, u64, String)>,
    resources: Vec<(u64, u32)>,
    dead_resources: Vec<(u64, u32)>,
    tables: Vec<TableSpec>,
}

impl DbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn string(mut self, id: u32, text: &str) -> Self {
        self.strings.push((id, text.to_string()));
        self
    }

    /// A string slot without the live bit
    pub fn dead_string(mut self, id: u32) -> Self {
        self.dead_strings.push(id);
        self
    }

    pub fn path(mut self, id: u64, parent: u64, name: &str) -> Self {
        self.paths.push((id, parent, name.to_string()));
        self
    }

    pub fn resource(mut self, id: u64, reference: u32) -> Self {
        self.resources.push((id, reference));
        self
    }

    /// A resource slot without the live bit
    pub fn dead_resource(mut self, id: u64, reference: u32) -> Self {
        self.dead_resources.push((id, reference));
        self
    }

    pub fn table(mut self, table: TableSpec) -> Self {
        self.tables.push(table);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        const STRINGS: usize = 0x10;
        const PATHS: usize = 0x38;
        const RESOURCES: usize = 0x48;
        const TABLES: usize = 0x60;
        const DATA: usize = 0x70;
        const LIVE: u32 = 0x8000_0000;

        let mut out = vec![0u8; DATA];

        // Strings: keys, values, blob
        let string_slots: Vec<(u32, u32, Option<&str>)> = self
            .strings
            .iter()
            .map(|(id, text)| (*id, LIVE | 1, Some(text.as_str())))
            .chain(self.dead_strings.iter().map(|id| (*id, 1, None)))
            .collect();
        let keys_at = out.len();
        for (id, bucket, _) in &string_slots {
            out.write_u32::<LittleEndian>(*id).unwrap();
            out.write_u32::<LittleEndian>(*bucket).unwrap();
        }
        let values_at = out.len();
        let mut blob = Vec::new();
        for (_, _, text) in &string_slots {
            out.write_u32::<LittleEndian>(blob.len() as u32).unwrap();
            blob.extend_from_slice(text.unwrap_or("").as_bytes());
            blob.push(0);
        }
        let blob_at = out.len();
        out.extend_from_slice(&blob);
        out[STRINGS..STRINGS + 4].copy_from_slice(&(string_slots.len() as u32).to_le_bytes());
        patch_i64(&mut out, STRINGS + 8, (keys_at - STRINGS) as i64);
        patch_i64(&mut out, STRINGS + 16, (values_at - STRINGS) as i64);
        out[STRINGS + 24..STRINGS + 32].copy_from_slice(&(blob.len() as u64).to_le_bytes());
        patch_i64(&mut out, STRINGS + 32, (blob_at - STRINGS) as i64);

        // Paths: entries, then names
        let entries_at = out.len();
        let names_at = entries_at + self.paths.len() * 32;
        let mut names = Vec::new();
        for (i, (id, parent, name)) in self.paths.iter().enumerate() {
            let entry_at = entries_at + i * 32;
            out.write_u64::<LittleEndian>(*id).unwrap();
            out.write_u64::<LittleEndian>(*parent).unwrap();
            out.write_u32::<LittleEndian>(name.len() as u32).unwrap();
            out.write_u32::<LittleEndian>(0).unwrap();
            out.write_i64::<LittleEndian>((names_at + names.len() - entry_at) as i64).unwrap();
            names.extend_from_slice(name.as_bytes());
        }
        out.extend_from_slice(&names);
        out[PATHS..PATHS + 8].copy_from_slice(&(self.paths.len() as u64).to_le_bytes());
        patch_i64(&mut out, PATHS + 8, (entries_at - PATHS) as i64);

        // Resources: keys, values
        let resource_slots: Vec<(u64, u32, u32)> = self
            .resources
            .iter()
            .map(|(id, reference)| (*id, LIVE | 2, *reference))
            .chain(self.dead_resources.iter().map(|(id, reference)| (*id, 2, *reference)))
            .collect();
        let keys_at = out.len();
        for (id, bucket, _) in &resource_slots {
            out.write_u64::<LittleEndian>(*id).unwrap();
            out.write_u32::<LittleEndian>(*bucket).unwrap();
            out.write_u32::<LittleEndian>(0).unwrap();
        }
        let values_at = out.len();
        for (_, _, reference) in &resource_slots {
            out.write_u32::<LittleEndian>(*reference).unwrap();
        }
        out[RESOURCES..RESOURCES + 4].copy_from_slice(&(resource_slots.len() as u32).to_le_bytes());
        patch_i64(&mut out, RESOURCES + 8, (keys_at - RESOURCES) as i64);
        patch_i64(&mut out, RESOURCES + 16, (values_at - RESOURCES) as i64);

        // Tables: headers, then payloads
        let headers_at = out.len();
        let mut payload_at = headers_at + self.tables.len() * 24;
        for (i, table) in self.tables.iter().enumerate() {
            let header_at = headers_at + i * 24;
            out.write_u32::<LittleEndian>(table.id).unwrap();
            out.write_u32::<LittleEndian>(table.schema_hash).unwrap();
            out.write_u64::<LittleEndian>(table.record_count).unwrap();
            out.write_i64::<LittleEndian>((payload_at - header_at) as i64).unwrap();
            payload_at += table.payload.len();
        }
        for table in &self.tables {
            out.extend_from_slice(&table.payload);
        }
        out[TABLES..TABLES + 8].copy_from_slice(&(self.tables.len() as u64).to_le_bytes());
        patch_i64(&mut out, TABLES + 8, (headers_at - TABLES) as i64);

        seal(&mut out, BWDB_MAGIC, BWDB_VERSION);
        out
    }
}

/// Pack `state`, `table` and `record` into a reference word
pub fn reference(state: u32, table: u32, record: u32) -> u32 {
    state | (table << 2) | (record << 8)
}

/// Records of one type laid out back to back with their array data after them
pub struct PayloadBuilder {
    stride: usize,
    records: Vec<Vec<u8>>,
    /// (record index, offset in record of the array header, element bytes, count)
    arrays: Vec<(usize, usize, Vec<u8>, u64)>,
}

impl PayloadBuilder {
    pub fn new(stride: usize) -> Self {
        PayloadBuilder {
            stride,
            records: Vec::new(),
            arrays: Vec::new(),
        }
    }

    /// Append a record; returns its index
    pub fn record(&mut self, bytes: Vec<u8>) -> usize {
        assert_eq!(bytes.len(), self.stride);
        self.records.push(bytes);
        self.records.len() - 1
    }

    /// Point the array header at `offset` in record `index` at `elements`
    pub fn array(&mut self, index: usize, offset: usize, elements: Vec<u8>, count: u64) {
        self.arrays.push((index, offset, elements, count));
    }

    pub fn count(&self) -> u64 {
        self.records.len() as u64
    }

    pub fn build(mut self) -> Vec<u8> {
        let mut tail = Vec::new();
        let records_len = self.records.len() * self.stride;
        for (index, offset, elements, count) in &self.arrays {
            let header_at = index * self.stride + offset;
            let data_at = records_len + tail.len();
            let record = &mut self.records[*index];
            record[*offset..*offset + 8].copy_from_slice(&count.to_le_bytes());
            record[*offset + 8..*offset + 16]
                .copy_from_slice(&((data_at - header_at) as i64).to_le_bytes());
            tail.extend_from_slice(elements);
        }
        let mut out: Vec<u8> = self.records.concat();
        out.extend_from_slice(&tail);
        out
    }
}

/// A 40-byte `ModelPrototype` pointing at `visual` with empty arrays
pub fn model_record(visual: u64) -> Vec<u8> {
    let mut bytes = vec![0u8; 40];
    bytes[0..8].copy_from_slice(&visual.to_le_bytes());
    bytes
}

/// A 48-byte `PointLightPrototype`
pub fn point_light_record(intensity: f32, node_name: u32) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(48);
    for v in [1.0f32, 2.0, 3.0, 1.0, 0.5, 0.25, 0.5, 4.0, intensity] {
        bytes.write_f32::<LittleEndian>(v).unwrap();
    }
    bytes.write_u8(1).unwrap();
    bytes.extend_from_slice(&[0u8; 3]);
    bytes.write_u32::<LittleEndian>(node_name).unwrap();
    bytes.write_u32::<LittleEndian>(0).unwrap();
    assert_eq!(bytes.len(), 48);
    bytes
}
