//! Prototype database helpers used by the command line tool

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::bwdb::{LoadOptions, PrototypeDatabase, Record, TableStatus};
use crate::pfs::{ArchiveSet, OpenOptions};
use crate::utils::format_size;

/// Default location of the prototype database inside the packages
pub const DEFAULT_ASSETS_PATH: &str = "content/assets.bin";

/// Read and parse the database stored at `assets_path` in the installation
pub fn load_database(
    index_dir: &Path,
    package_dir: &Path,
    assets_path: &str,
    validate: bool,
) -> Result<PrototypeDatabase> {
    let mut set = ArchiveSet::open_dir(index_dir, package_dir, OpenOptions::new().validate(validate))
        .with_context(|| format!("Failed to open indexes in {}", index_dir.display()))?;
    load_from_set(&mut set, assets_path, validate)
}

/// Read and parse the database stored at `assets_path` in an open archive set
pub fn load_from_set(set: &mut ArchiveSet, assets_path: &str, validate: bool) -> Result<PrototypeDatabase> {
    let Some(data) = set
        .open_file(assets_path)
        .with_context(|| format!("Failed to read {}", assets_path))?
    else {
        bail!("{} not found in any index or its package is missing", assets_path);
    };

    PrototypeDatabase::parse(&data, LoadOptions::new().validate(validate))
        .with_context(|| format!("Failed to parse {} ({})", assets_path, format_size(data.len() as u64)))
}

/// Print the sections and tables of a database
pub fn show_db_info(db: &PrototypeDatabase) {
    println!("Database Information:");
    println!("  Checksum: {:#010x}", db.header.checksum);
    println!("  Strings: {}", db.string_count());
    println!("  Paths: {}", db.paths().len());
    println!("  Resources: {}", db.resource_count());
    println!();
    println!("Tables ({}):", db.tables().len());

    for table in db.tables() {
        let name = table.type_name.unwrap_or("<unregistered>");
        let status = match &table.status {
            TableStatus::Decoded => format!("{} records", table.len()),
            TableStatus::Unregistered => "not registered".to_string(),
            TableStatus::Unimplemented => "no decoder".to_string(),
            TableStatus::DecodeFailed(reason) => format!("decode failed: {}", reason),
        };
        println!(
            "  {:08x} {:<28} {:>8} declared  {}",
            table.id, name, table.declared_count, status
        );
    }

    let mismatched = db.compatibility_report();
    if !mismatched.is_empty() {
        println!();
        println!("Schema mismatches ({}):", mismatched.len());
        for table in mismatched {
            println!(
                "  {:<28} stored {:08x}, expected {:08x}",
                table.type_name.unwrap_or("?"),
                table.schema_hash,
                table.expected_schema_hash.unwrap_or_default()
            );
        }
    }
}

/// Resolve `resource` and print its record with ids shown as text
pub fn show_resource(db: PrototypeDatabase, resource: &str) -> Result<()> {
    let db = Arc::new(db);
    let _active = db.activate()?;

    let Some(id) = db.get_id(resource) else {
        bail!("{} is not a known resource path", resource);
    };
    let Some(record) = db.resolve_id(id) else {
        bail!("{} has no prototype", resource);
    };

    println!("{} ({:016x})", db.get_path(id), id);
    print_record(record);
    Ok(())
}

fn print_record(record: &Record) {
    println!("  type: {}", record.type_name());
    match record {
        Record::Material(m) => {
            println!("  name: {}", m.name);
            println!("  shader: {}", m.shader);
            for slot in &m.textures {
                println!("  texture {}: {}", slot.name, slot.texture);
            }
            for constant in &m.constants {
                println!("  constant {}: {}", constant.name, constant.value);
            }
        }
        Record::Visual(v) => {
            println!("  skeleton nodes: {}", v.skeleton.nodes.len());
            println!("  geometry: {}", v.geometry);
            println!("  lods: {}", v.lods.len());
            for set in &v.render_sets {
                println!("  render set {}: {}", set.name, set.material);
            }
        }
        Record::Model(m) => {
            println!("  visual: {}", m.visual);
            for animation in &m.animations {
                println!("  animation: {}", animation);
            }
            for dye in &m.dyes {
                println!("  dye {} -> {}", dye.replaces, dye.matter);
            }
        }
        other => println!("  {:#?}", other),
    }
}
