//! PFS utility functions
//!
//! Listing, extraction and summary helpers used by the command line tool.

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

use crate::pfs::{ArchiveIndex, ArchiveSet, CompressionMethod, OpenOptions};
use crate::utils::{create_glob_matcher, format_size, matches_filter};

/// List files across all indexes in `index_dir` with optional filtering
pub fn list_files(index_dir: &Path, package_dir: &Path, filter: Option<&str>) -> Result<()> {
    println!("Opening {}...", index_dir.display());

    let set = ArchiveSet::open_dir(index_dir, package_dir, OpenOptions::new())
        .with_context(|| format!("Failed to open indexes in {}", index_dir.display()))?;

    let matcher = filter.map(create_glob_matcher).transpose()?;

    let mut count = 0u64;
    let mut total_size = 0u64;
    let mut compressed_size = 0u64;

    let mut files: Vec<_> = set
        .files()
        .filter(|(path, _)| matches_filter(path, matcher.as_ref()))
        .collect();
    files.sort_by(|a, b| a.0.cmp(b.0));

    for (path, record) in files {
        let method = match record.compression {
            CompressionMethod::Store => "Store".to_string(),
            CompressionMethod::Deflate => "Deflate".to_string(),
            CompressionMethod::Unknown(m) => format!("Method {}", m),
        };

        println!(
            "{:>10} {:>10} {:>9} {}",
            format_size(record.uncompressed_size as u64),
            format_size(record.compressed_size as u64),
            method,
            path
        );

        count += 1;
        total_size += record.uncompressed_size as u64;
        compressed_size += record.compressed_size as u64;
    }

    println!();
    println!(
        "Total: {} files, {} ({} compressed)",
        count,
        format_size(total_size),
        format_size(compressed_size)
    );

    Ok(())
}

/// Extract matching files from all indexes into `output`
pub fn extract_files(
    index_dir: &Path,
    package_dir: &Path,
    filter: Option<&str>,
    output: &Path,
    validate: bool,
) -> Result<()> {
    println!("Opening {}...", index_dir.display());

    let mut set = ArchiveSet::open_dir(index_dir, package_dir, OpenOptions::new().validate(validate))
        .with_context(|| format!("Failed to open indexes in {}", index_dir.display()))?;

    let matcher = filter.map(create_glob_matcher).transpose()?;

    let mut paths: Vec<String> = set
        .files()
        .map(|(path, _)| path)
        .filter(|path| matches_filter(path, matcher.as_ref()))
        .map(str::to_string)
        .collect();
    paths.sort();
    paths.dedup();

    if paths.is_empty() {
        println!("No files match the filter");
        return Ok(());
    }

    println!("Extracting {} files...", paths.len());

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
    )?);

    let mut extracted = 0u64;
    let mut skipped = 0u64;
    let mut failed = 0u64;

    for path in &paths {
        pb.set_message(path.clone());

        match extract_single_file(&mut set, path, output) {
            Ok(true) => extracted += 1,
            Ok(false) => skipped += 1,
            Err(e) => {
                pb.println(format!("Error extracting {}: {}", path, e));
                failed += 1;
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");

    println!();
    println!("Extracted: {} files", extracted);
    if skipped > 0 {
        println!("Unavailable (missing package): {} files", skipped);
    }
    if failed > 0 {
        println!("Failed: {} files", failed);
    }

    Ok(())
}

/// Extract one file; `Ok(false)` when its package is not present.
///
/// Paths that would land outside `output` are refused before anything is read.
pub fn extract_single_file(set: &mut ArchiveSet, path: &str, output: &Path) -> Result<bool> {
    let Some(output_path) = contained_path(output, path) else {
        warn!("refusing to extract {}: path leaves the output directory", path);
        bail!("Unsafe path in index: {}", path);
    };

    let Some(data) = set.open_file(path)? else {
        return Ok(false);
    };

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output_path, &data)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    Ok(true)
}

/// `output` joined with `path`, if every component of `path` is a plain name
fn contained_path(output: &Path, path: &str) -> Option<PathBuf> {
    let relative = Path::new(path);
    let plain = relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)));
    if !plain || relative.as_os_str().is_empty() {
        return None;
    }
    Some(output.join(relative))
}

/// Show information about a single index file
pub fn show_info(index_path: &Path, validate: bool) -> Result<()> {
    println!("Opening {}...", index_path.display());

    let data = fs::read(index_path)
        .with_context(|| format!("Failed to read {}", index_path.display()))?;
    let index = ArchiveIndex::parse(&data, validate)
        .with_context(|| format!("Failed to parse {}", index_path.display()))?;

    let mut total_size = 0u64;
    let mut compressed_size = 0u64;
    let mut store_count = 0u64;
    let mut deflate_count = 0u64;
    let mut unknown_count = 0u64;

    for record in index.files() {
        total_size += record.uncompressed_size as u64;
        compressed_size += record.compressed_size as u64;

        match record.compression {
            CompressionMethod::Store => store_count += 1,
            CompressionMethod::Deflate => deflate_count += 1,
            CompressionMethod::Unknown(_) => unknown_count += 1,
        }
    }

    let ratio = if total_size > 0 {
        (compressed_size as f64 / total_size as f64) * 100.0
    } else {
        0.0
    };

    println!();
    println!("Index Information:");
    println!("  File: {}", index_path.display());
    println!("  Checksum: {:#010x}", index.header.checksum);
    println!("  Path nodes: {}", index.paths().len());
    println!("  Total files: {}", index.file_count());
    println!("  Total size: {}", format_size(total_size));
    println!("  Compressed size: {} ({:.1}%)", format_size(compressed_size), ratio);
    println!();
    println!("Compression methods:");
    println!("  Store: {}", store_count);
    println!("  Deflate: {}", deflate_count);
    if unknown_count > 0 {
        println!("  Unknown: {}", unknown_count);
    }
    println!();
    println!("Packages ({}):", index.packages().len());
    for package in index.packages() {
        println!("  {:016x} {}", package.id, package.name);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contained_path() {
        let out = Path::new("out");
        assert_eq!(contained_path(out, "a/b.txt"), Some(out.join("a/b.txt")));
        assert_eq!(contained_path(out, "../escaped.txt"), None);
        assert_eq!(contained_path(out, "a/../../escaped.txt"), None);
        assert_eq!(contained_path(out, "/etc/passwd"), None);
        assert_eq!(contained_path(out, "./a.txt"), None);
        assert_eq!(contained_path(out, ""), None);
    }
}
