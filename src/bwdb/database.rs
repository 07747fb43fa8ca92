//! Prototype database (`assets.bin`) reader

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::bwdb::context::{activate, ActiveDatabase};
use crate::bwdb::dictionary::DictionarySection;
use crate::bwdb::ids::ResourceId;
use crate::bwdb::records::Record;
use crate::bwdb::reference::PrototypeReference;
use crate::bwdb::registry::{self, TableDescriptor};
use crate::cursor::{relative, BinaryReader};
use crate::error::Result;
use crate::header::{ContainerHeader, BWDB_FORMAT};
use crate::path_tree::{PathNode, PathTable};

/// Id of the implicit `res` root of the path section
pub const BWDB_ROOT_ID: u64 = 0x2E3E_5F4C_4F9C_2A55;
const ROOT_NAME: &str = "res";

const STRINGS_SECTION: u64 = 0x10;
const STRINGS_BLOB_LEN: u64 = STRINGS_SECTION + DictionarySection::SIZE;
const STRINGS_BLOB_PTR: u64 = STRINGS_BLOB_LEN + 8;
const PATHS_SECTION: u64 = 0x38;
const RESOURCES_SECTION: u64 = 0x48;
const TABLES_SECTION: u64 = 0x60;

const STRING_KEY_STRIDE: u64 = 8;
const RESOURCE_KEY_STRIDE: u64 = 16;

const PATH_ENTRY_SIZE: u64 = 32;
const PATH_ID: u64 = 0;
const PATH_PARENT: u64 = 8;
const PATH_NAME_LEN: u64 = 16;
const PATH_NAME_PTR: u64 = 24;

const TABLE_HEADER_SIZE: u64 = 24;
const TABLE_ID: u64 = 0;
const TABLE_SCHEMA_HASH: u64 = 4;
const TABLE_RECORD_COUNT: u64 = 8;
const TABLE_PAYLOAD_PTR: u64 = 16;

/// Options controlling how a database is loaded
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Verify the header checksum against the whole blob
    pub validate: bool,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

/// Why a table holds no records, or that it decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    Decoded,
    /// Id not in the registry
    Unregistered,
    /// Registered type without a decoder
    Unimplemented,
    /// A record failed to decode; the table was left empty
    DecodeFailed(String),
}

/// One table of records of a single type
#[derive(Debug, Clone)]
pub struct Table {
    pub id: u32,
    /// Type name, when the id is registered
    pub type_name: Option<&'static str>,
    /// Schema hash stored in the database
    pub schema_hash: u32,
    /// Schema hash of the compiled layout, when the id is registered
    pub expected_schema_hash: Option<u32>,
    /// Record count stored in the table header
    pub declared_count: u64,
    pub status: TableStatus,
    records: Vec<Record>,
}

impl Table {
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stored hash differs from the compiled layout's
    pub fn schema_mismatch(&self) -> bool {
        self.expected_schema_hash
            .is_some_and(|expected| expected != self.schema_hash)
    }
}

/// Decoded prototype database
pub struct PrototypeDatabase {
    pub header: ContainerHeader,
    strings: HashMap<u32, String>,
    paths: PathTable,
    resources: HashMap<u64, PrototypeReference>,
    tables: Vec<Table>,
}

impl PrototypeDatabase {
    /// Load a database file from disk
    pub fn open<P: AsRef<Path>>(path: P, options: LoadOptions) -> Result<Self> {
        let data = fs::read(path)?;
        Self::parse(&data, options)
    }

    /// Parse a database blob.
    ///
    /// Header problems and (with validation) checksum mismatches fail the
    /// whole parse. Tables that cannot be decoded load empty instead.
    pub fn parse(data: &[u8], options: LoadOptions) -> Result<Self> {
        let header = ContainerHeader::parse(data, &BWDB_FORMAT, options.validate)?;
        let reader = BinaryReader::new(data);

        let strings = Self::read_strings(&reader)?;
        let paths = Self::read_paths(&reader)?;
        let resources = Self::read_resources(&reader)?;
        let tables = Self::read_tables(&reader)?;

        debug!(
            "BWDB: {} strings, {} paths, {} resources, {} tables",
            strings.len(),
            paths.len(),
            resources.len(),
            tables.len()
        );

        Ok(PrototypeDatabase {
            header,
            strings,
            paths,
            resources,
            tables,
        })
    }

    fn read_strings(reader: &BinaryReader) -> Result<HashMap<u32, String>> {
        let dict = DictionarySection::read(reader, STRINGS_SECTION)?;
        let blob_len: u64 = reader.read_at(STRINGS_BLOB_LEN)?;
        let blob_offset = relative(STRINGS_SECTION, reader.read_at(STRINGS_BLOB_PTR)?)?;
        let blob = BinaryReader::new(reader.bytes_at(blob_offset, blob_len)?);

        let entries: Vec<(u32, u32)> = dict.live_entries(reader, STRING_KEY_STRIDE)?;
        let mut strings = HashMap::with_capacity(entries.len());
        for (key, offset) in entries {
            strings.insert(key, blob.read_cstring_at(offset as u64)?);
        }
        Ok(strings)
    }

    fn read_paths(reader: &BinaryReader) -> Result<PathTable> {
        let count: u64 = reader.read_at(PATHS_SECTION)?;
        let entries_offset = relative(PATHS_SECTION, reader.read_at(PATHS_SECTION + 8)?)?;
        reader.bytes_at(entries_offset, count.saturating_mul(PATH_ENTRY_SIZE))?;

        let mut nodes = Vec::with_capacity(count as usize);
        for i in 0..count {
            let at = entries_offset + i * PATH_ENTRY_SIZE;
            let name_len: u32 = reader.read_at(at + PATH_NAME_LEN)?;
            let name_at = relative(at, reader.read_at(at + PATH_NAME_PTR)?)?;
            nodes.push(PathNode {
                id: reader.read_at(at + PATH_ID)?,
                parent_id: reader.read_at(at + PATH_PARENT)?,
                name: reader.read_string_at(name_at, name_len as u64)?,
            });
        }

        Ok(PathTable::build(&nodes, &[(BWDB_ROOT_ID, ROOT_NAME)]))
    }

    fn read_resources(reader: &BinaryReader) -> Result<HashMap<u64, PrototypeReference>> {
        let dict = DictionarySection::read(reader, RESOURCES_SECTION)?;
        let entries: Vec<(u64, u32)> = dict.live_entries(reader, RESOURCE_KEY_STRIDE)?;

        let mut resources = HashMap::with_capacity(entries.len());
        for (id, raw) in entries {
            let reference = PrototypeReference::from_raw(raw);
            if !reference.is_valid() {
                trace!("skipping resource {:016x} with reference state {}", id, reference.state());
                continue;
            }
            resources.insert(id, reference);
        }
        Ok(resources)
    }

    fn read_tables(reader: &BinaryReader) -> Result<Vec<Table>> {
        let count: u64 = reader.read_at(TABLES_SECTION)?;
        let headers_offset = relative(TABLES_SECTION, reader.read_at(TABLES_SECTION + 8)?)?;
        reader.bytes_at(headers_offset, count.saturating_mul(TABLE_HEADER_SIZE))?;

        let mut tables = Vec::with_capacity(count as usize);
        for i in 0..count {
            let at = headers_offset + i * TABLE_HEADER_SIZE;
            let id: u32 = reader.read_at(at + TABLE_ID)?;
            let schema_hash: u32 = reader.read_at(at + TABLE_SCHEMA_HASH)?;
            let record_count: u64 = reader.read_at(at + TABLE_RECORD_COUNT)?;
            let payload = relative(at, reader.read_at(at + TABLE_PAYLOAD_PTR)?)?;
            tables.push(Self::decode_table(reader, id, schema_hash, record_count, payload));
        }
        Ok(tables)
    }

    fn decode_table(
        reader: &BinaryReader,
        id: u32,
        schema_hash: u32,
        record_count: u64,
        payload: u64,
    ) -> Table {
        let mut table = Table {
            id,
            type_name: None,
            schema_hash,
            expected_schema_hash: None,
            declared_count: record_count,
            status: TableStatus::Unregistered,
            records: Vec::new(),
        };

        let Some(descriptor) = registry::lookup(id) else {
            warn!("table {:08x} is not registered, skipping {} records", id, record_count);
            return table;
        };
        table.type_name = Some(descriptor.type_name);

        let (Some(decode), true) = (descriptor.decode, descriptor.stride != 0) else {
            warn!(
                "no decoder for {} yet, skipping {} records",
                descriptor.type_name, record_count
            );
            table.status = TableStatus::Unimplemented;
            return table;
        };

        let expected = descriptor.expected_schema_hash();
        table.expected_schema_hash = Some(expected);
        if expected != schema_hash {
            warn!(
                "{} schema hash {:08x} differs from compiled layout {:08x}, decoding anyway",
                descriptor.type_name, schema_hash, expected
            );
        }

        match Self::decode_records(reader, descriptor, decode, record_count, payload) {
            Ok(records) => {
                table.records = records;
                table.status = TableStatus::Decoded;
            }
            Err(e) => {
                warn!("failed to decode {} table: {}", descriptor.type_name, e);
                table.status = TableStatus::DecodeFailed(e.to_string());
            }
        }
        table
    }

    fn decode_records(
        reader: &BinaryReader,
        descriptor: &TableDescriptor,
        decode: registry::DecodeFn,
        record_count: u64,
        payload: u64,
    ) -> Result<Vec<Record>> {
        reader.bytes_at(payload, record_count.saturating_mul(descriptor.stride))?;
        (0..record_count)
            .map(|i| decode(reader, payload + i * descriptor.stride))
            .collect()
    }

    /// Resolve a resource path such as `content/gameplay/ship.model`.
    ///
    /// Matching ignores case; leading `/` and `.` are dropped and the `res/`
    /// root is added when missing.
    pub fn resolve_path(&self, path: &str) -> Option<&Record> {
        let Some(id) = self.get_id(path) else {
            warn!("path not found in database: {}", path);
            return None;
        };
        self.resolve_id(id)
    }

    /// Resolve a raw resource id
    pub fn resolve_id(&self, id: u64) -> Option<&Record> {
        if id == 0 || id == u64::MAX {
            return None;
        }
        match self.resources.get(&id) {
            Some(&reference) => self.resolve_reference(reference),
            None => {
                warn!("no prototype for resource {}", self.get_path(id));
                None
            }
        }
    }

    pub fn resolve(&self, id: ResourceId) -> Option<&Record> {
        self.resolve_id(id.hash())
    }

    /// Resolve a packed table/record reference
    pub fn resolve_reference(&self, reference: PrototypeReference) -> Option<&Record> {
        if !reference.is_valid() {
            warn!("prototype reference {:08x} has state {}", reference.raw(), reference.state());
            return None;
        }
        let Some(table) = self.tables.get(reference.table_index()) else {
            warn!(
                "table index {} out of range ({} tables)",
                reference.table_index(),
                self.tables.len()
            );
            return None;
        };
        let record = table.records.get(reference.record_index());
        if record.is_none() {
            warn!(
                "record index {} out of range for table {:08x} ({} records, {:?})",
                reference.record_index(),
                table.id,
                table.records.len(),
                table.status
            );
        }
        record
    }

    /// Path of `id`, or the id as 16 hex digits
    pub fn get_path(&self, id: u64) -> String {
        match self.paths.get(id) {
            Some(path) => path.to_string(),
            None => format!("{:016x}", id),
        }
    }

    /// Text of string `id`, or the id as 8 hex digits
    pub fn get_string(&self, id: u32) -> String {
        match self.strings.get(&id) {
            Some(text) => text.clone(),
            None => format!("{:08x}", id),
        }
    }

    /// Id of a resource path, with the same normalization as [`Self::resolve_path`]
    pub fn get_id(&self, path: &str) -> Option<u64> {
        self.paths.id_of_ignore_case(&normalize_resource_path(path))
    }

    pub fn paths(&self) -> &PathTable {
        &self.paths
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn string_count(&self) -> usize {
        self.strings.len()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Ids with a prototype, with their packed references
    pub fn resources(&self) -> impl Iterator<Item = (u64, PrototypeReference)> + '_ {
        self.resources.iter().map(|(&id, &reference)| (id, reference))
    }

    /// Registered tables whose stored schema hash differs from the compiled one
    pub fn compatibility_report(&self) -> Vec<&Table> {
        self.tables.iter().filter(|t| t.schema_mismatch()).collect()
    }

    /// Make this database the one [`StringId`](crate::bwdb::StringId) and
    /// [`ResourceId`] resolve through on the current thread.
    pub fn activate(self: &Arc<Self>) -> Result<ActiveDatabase> {
        activate(Arc::clone(self))
    }
}

/// `./Content\\ship.model` -> `res/Content/ship.model`
pub fn normalize_resource_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let path = path.trim_start_matches(['/', '.']);
    let has_root = path
        .get(..ROOT_NAME.len() + 1)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("res/"));
    if has_root {
        path.to_string()
    } else {
        format!("{}/{}", ROOT_NAME, path)
    }
}
