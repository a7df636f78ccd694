// tests/disk_tests.rs
#![cfg(feature = "fs")]

use std::fs;

use fname_lang::context::disk::{DiskError, DiskFile};
use fname_lang::{Context, HashAlgorithm, ImageSize, evaluate, parse};
use tempfile::tempdir;

#[test]
fn test_names_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Report Final.TXT");
    fs::write(&path, "abc").unwrap();

    let file = DiskFile::open(&path).unwrap();
    let formula = parse("[camelize:{file:baseName}].{file:format}").unwrap();
    assert_eq!(evaluate(&formula, &file).unwrap(), "ReportFinal.txt");
    assert_eq!(
        file.directory().as_deref(),
        Some(dir.path().to_string_lossy().as_ref())
    );
    assert!(file.modified().is_some());
}

#[test]
fn test_content_hashes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("abc.bin");
    fs::write(&path, "abc").unwrap();
    let file = DiskFile::open(&path).unwrap();

    let expected = [
        (HashAlgorithm::Md5, "900150983cd24fb0d6963f7d28e17f72"),
        (HashAlgorithm::Sha1, "a9993e364706816aba3e25717850c26c9cd0d89d"),
        (
            HashAlgorithm::Sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
        ),
        (
            HashAlgorithm::Sha512,
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
             2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f",
        ),
    ];
    for (algorithm, hex) in expected {
        let hash = file.hash(algorithm).unwrap();
        assert_eq!(hash.len(), algorithm.hex_len());
        assert_eq!(hash, hex);
    }
}

#[test]
fn test_hash_is_cached() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.bin");
    fs::write(&path, "abc").unwrap();
    let file = DiskFile::open(&path).unwrap();

    let first = file.hash(HashAlgorithm::Md5);
    fs::write(&path, "changed").unwrap();
    assert_eq!(file.hash(HashAlgorithm::Md5), first);
}

#[test]
fn test_image_dimensions() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pixel.png");
    image::RgbImage::new(3, 2).save(&path).unwrap();

    let file = DiskFile::open(&path).unwrap();
    assert_eq!(file.image_size(), Some(ImageSize { width: 3, height: 2 }));
    let formula = parse("{image:size}_{image:size:width:###}").unwrap();
    assert_eq!(evaluate(&formula, &file).unwrap(), "3x2_003");
}

#[test]
fn test_non_image_has_no_size() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "not an image").unwrap();

    let file = DiskFile::open(&path).unwrap();
    assert_eq!(file.image_size(), None);
    assert!(evaluate(&parse("{image:size}").unwrap(), &file).is_err());
}

#[test]
fn test_counter_on_disk_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.txt");
    fs::write(&path, "").unwrap();

    let file = DiskFile::open(&path).unwrap().with_counter(4, 3);
    assert_eq!(evaluate(&parse("{counter}").unwrap(), &file).unwrap(), "004");
}

#[test]
fn test_open_errors() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        DiskFile::open(dir.path().join("missing")),
        Err(DiskError::Io { .. })
    ));
    assert!(matches!(
        DiskFile::open(dir.path()),
        Err(DiskError::NotAFile(_))
    ));
}
