//! PFS index and package reading, end to end through real files

mod common;

use std::fs;

use common::InstallBuilder;
use proptest::prelude::*;
use tempfile::TempDir;
use unpfs::pfs::utils::extract_single_file;
use unpfs::pfs::{ArchiveIndex, ArchiveSet, OpenOptions, PfsArchive};
use unpfs::Error;

const PKG: u64 = 0x51;
const OTHER_PKG: u64 = 0x52;

fn sample_install() -> InstallBuilder {
    InstallBuilder::new()
        .package(PKG, "data.pkg")
        .store(PKG, "a.txt", b"top level file")
        .deflate(PKG, "a/b.txt", &b"nested and compressed ".repeat(32))
        .store(PKG, "a/b/c.txt", b"deepest file")
}

fn open(dir: &TempDir, validate: bool) -> PfsArchive {
    PfsArchive::open(
        dir.path().join("idx/main.idx"),
        dir.path().join("packages"),
        OpenOptions::new().validate(validate),
    )
    .unwrap()
}

#[test]
fn test_reads_nested_paths() {
    let dir = TempDir::new().unwrap();
    let install = sample_install();
    install.write_to(dir.path(), "main.idx");

    let mut archive = open(&dir, true);
    assert_eq!(archive.index().file_count(), 3);

    assert_eq!(archive.open_file("a.txt").unwrap().unwrap(), b"top level file");
    assert_eq!(
        archive.open_file("a/b.txt").unwrap().unwrap(),
        b"nested and compressed ".repeat(32)
    );
    assert_eq!(archive.open_file("a/b/c.txt").unwrap().unwrap(), b"deepest file");

    // Backslashes and a leading separator are accepted
    assert_eq!(archive.open_file("\\a\\b\\c.txt").unwrap().unwrap(), b"deepest file");
}

#[test]
fn test_path_id_round_trip() {
    let dir = TempDir::new().unwrap();
    let install = sample_install();
    install.write_to(dir.path(), "main.idx");
    let archive = open(&dir, false);
    let index = archive.index();

    for file in &install.files {
        assert_eq!(index.get_path(file.id), Some(file.path.as_str()));
        assert_eq!(index.get_id(&file.path), Some(file.id));
        assert_eq!(index.find_path(&file.path).unwrap().offset, file.offset);
    }
    // Directory nodes resolve too
    assert!(index.get_id("a/b").is_some());
    assert!(index.find_path("a/b").is_none());
}

#[test]
fn test_unknown_path_is_none() {
    let dir = TempDir::new().unwrap();
    sample_install().write_to(dir.path(), "main.idx");
    let mut archive = open(&dir, true);

    assert!(archive.open_file("a/missing.txt").unwrap().is_none());
    assert!(archive.open_file_by_id(0xDEAD).unwrap().is_none());
    assert!(matches!(
        archive.extract("a/missing.txt"),
        Err(Error::EntryNotFound(path)) if path == "a/missing.txt"
    ));
    assert_eq!(archive.extract("a.txt").unwrap(), b"top level file");
}

#[test]
fn test_corrupt_package_byte_fails_only_that_file() {
    let dir = TempDir::new().unwrap();
    let install = sample_install();
    install.write_to(dir.path(), "main.idx");

    let target = install.file("a/b/c.txt");
    let mut package = install.package_bytes(PKG).to_vec();
    package[target.offset as usize + 2] ^= 0x40;
    fs::write(dir.path().join("packages/data.pkg"), &package).unwrap();

    let mut archive = open(&dir, true);
    assert!(matches!(
        archive.open_file("a/b/c.txt"),
        Err(Error::ChecksumMismatch { .. })
    ));
    assert!(archive.open_file("a.txt").unwrap().is_some());
    assert!(archive.open_file("a/b.txt").unwrap().is_some());

    // Without validation the altered bytes come back as stored
    let mut archive = open(&dir, false);
    let data = archive.open_file("a/b/c.txt").unwrap().unwrap();
    assert_ne!(data, b"deepest file");
    assert_eq!(data.len(), b"deepest file".len());
}

#[test]
fn test_corrupt_index_fails_only_with_validation() {
    let install = sample_install();
    let mut data = install.index_bytes();
    let last = data.len() - 1;
    data[last] ^= 0x01;

    assert!(matches!(
        ArchiveIndex::parse(&data, true),
        Err(Error::CorruptData(_))
    ));
    assert!(ArchiveIndex::parse(&data, false).is_ok());
}

#[test]
fn test_header_rejections() {
    let data = sample_install().index_bytes();

    let mut bad_magic = data.clone();
    bad_magic[0] = b'X';
    assert!(matches!(
        ArchiveIndex::parse(&bad_magic, false),
        Err(Error::InvalidMagic { .. })
    ));

    let mut bad_version = data.clone();
    bad_version[4..8].copy_from_slice(&0x0300_0000u32.to_le_bytes());
    assert!(matches!(
        ArchiveIndex::parse(&bad_version, false),
        Err(Error::UnsupportedVersion { .. })
    ));

    let mut bad_width = data.clone();
    bad_width[12..16].copy_from_slice(&32u32.to_le_bytes());
    assert!(matches!(
        ArchiveIndex::parse(&bad_width, false),
        Err(Error::UnsupportedPointerWidth { width: 32, .. })
    ));

    assert!(matches!(
        ArchiveIndex::parse(&data[..10], false),
        Err(Error::OutOfRange { .. })
    ));
}

#[test]
fn test_oversized_counts_are_out_of_range() {
    let data = sample_install().index_bytes();

    // node, file and package counts
    for at in [16usize, 20, 24] {
        let mut patched = data.clone();
        patched[at..at + 4].copy_from_slice(&u32::MAX.to_le_bytes());
        common::seal(&mut patched, common::PFS_MAGIC, common::PFS_VERSION);

        assert!(
            matches!(
                ArchiveIndex::parse(&patched, true),
                Err(Error::OutOfRange { .. })
            ),
            "count at {} was not rejected",
            at
        );
    }
}

#[test]
fn test_extract_refuses_paths_outside_output() {
    let dir = TempDir::new().unwrap();
    sample_install()
        .store(PKG, "../escaped.txt", b"should stay inside")
        .write_to(dir.path(), "main.idx");

    let mut set = ArchiveSet::open_dir(
        dir.path().join("idx"),
        dir.path().join("packages"),
        OpenOptions::new().validate(true),
    )
    .unwrap();
    assert!(set.find_path("../escaped.txt").is_some());

    let output = dir.path().join("out");
    assert!(extract_single_file(&mut set, "../escaped.txt", &output).is_err());
    assert!(!dir.path().join("escaped.txt").exists());

    assert!(extract_single_file(&mut set, "a/b/c.txt", &output).unwrap());
    assert_eq!(fs::read(output.join("a/b/c.txt")).unwrap(), b"deepest file");
}

#[test]
fn test_missing_package_is_skipped() {
    let dir = TempDir::new().unwrap();
    let install = InstallBuilder::new()
        .package(PKG, "present.pkg")
        .package(OTHER_PKG, "absent.pkg")
        .store(PKG, "here.txt", b"here")
        .store(OTHER_PKG, "gone.txt", b"gone");
    install.write_to(dir.path(), "main.idx");
    fs::remove_file(dir.path().join("packages/absent.pkg")).unwrap();

    let mut archive = open(&dir, true);
    let names: Vec<&str> = archive.package_names().collect();
    assert_eq!(names, vec!["present.pkg"]);

    assert_eq!(archive.open_file("here.txt").unwrap().unwrap(), b"here");
    assert!(archive.open_file("gone.txt").unwrap().is_none());
}

#[test]
fn test_undeclared_package_is_none() {
    let dir = TempDir::new().unwrap();
    let install = sample_install().orphan_file(0x99, "lost.txt", b"lost");
    install.write_to(dir.path(), "main.idx");

    let mut archive = open(&dir, true);
    assert!(archive.open_file("lost.txt").unwrap().is_none());
    assert!(archive.open_file("a.txt").unwrap().is_some());
}

#[test]
fn test_unsupported_compression() {
    let dir = TempDir::new().unwrap();
    let install = InstallBuilder::new()
        .package(PKG, "data.pkg")
        .add(PKG, "odd.bin", b"odd", 8);
    install.write_to(dir.path(), "main.idx");

    let mut archive = open(&dir, false);
    assert!(matches!(
        archive.open_file("odd.bin"),
        Err(Error::UnsupportedCompression(8))
    ));
}

#[test]
fn test_archive_set_first_index_wins() {
    let dir = TempDir::new().unwrap();
    InstallBuilder::new()
        .package(PKG, "first.pkg")
        .store(PKG, "shared.txt", b"from first")
        .store(PKG, "only_first.txt", b"1")
        .write_to(dir.path(), "a_first.idx");
    InstallBuilder::new()
        .package(OTHER_PKG, "second.pkg")
        .store(OTHER_PKG, "shared.txt", b"from second")
        .store(OTHER_PKG, "only_second.txt", b"2")
        .write_to(dir.path(), "b_second.idx");
    fs::write(dir.path().join("idx/notes.txt"), b"not an index").unwrap();

    let mut set = ArchiveSet::open_dir(
        dir.path().join("idx"),
        dir.path().join("packages"),
        OpenOptions::new().validate(true),
    )
    .unwrap();

    let names: Vec<&str> = set.index_names().collect();
    assert_eq!(names, vec!["a_first.idx", "b_second.idx"]);
    assert_eq!(set.files().count(), 4);

    assert_eq!(set.open_file("shared.txt").unwrap().unwrap(), b"from first");
    assert_eq!(set.open_file("only_second.txt").unwrap().unwrap(), b"2");
    assert!(set.open_file("nowhere.txt").unwrap().is_none());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn any_flipped_index_byte_fails_validation(position in 16usize..200, bit in 0u8..8) {
        let mut data = sample_install().index_bytes();
        let position = 16 + position % (data.len() - 16);
        data[position] ^= 1 << bit;
        prop_assert!(ArchiveIndex::parse(&data, true).is_err());
    }

    #[test]
    fn any_flipped_package_byte_fails_only_that_file(
        target in 0usize..3,
        position in any::<usize>(),
        bit in 0u8..8,
    ) {
        let dir = TempDir::new().unwrap();
        let install = sample_install();
        install.write_to(dir.path(), "main.idx");

        let placed = install.files[target].clone();
        let mut package = install.package_bytes(PKG).to_vec();
        let at = placed.offset as usize + position % placed.compressed_size as usize;
        package[at] ^= 1 << bit;
        fs::write(dir.path().join("packages/data.pkg"), &package).unwrap();

        let mut archive = open(&dir, true);
        let original = contents(&placed.path);
        match archive.open_file(&placed.path) {
            Err(Error::ChecksumMismatch { .. }) | Err(Error::Decompression(_)) => {}
            // A deflate stream may end in padding bits the decoder never reads
            Ok(Some(data)) if placed.method == 5 => prop_assert_eq!(data, original),
            other => prop_assert!(false, "{} read as {:?}", placed.path, other.map(|d| d.map(|d| d.len()))),
        }

        for sibling in install.files.iter().filter(|f| f.path != placed.path) {
            let data = archive.open_file(&sibling.path).unwrap();
            prop_assert_eq!(data, Some(contents(&sibling.path)));
        }
    }
}

fn contents(path: &str) -> Vec<u8> {
    match path {
        "a.txt" => b"top level file".to_vec(),
        "a/b.txt" => b"nested and compressed ".repeat(32),
        "a/b/c.txt" => b"deepest file".to_vec(),
        _ => panic!("{} is not part of the sample install", path),
    }
}
