use super::{DocumentStore, FsStore};
use crate::error::{Error, Missing};
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_process_rewrites_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "one\ntwo").unwrap();

    let written = FsStore
        .process(file.path(), |text| Ok(text.replace("two", "three")))
        .unwrap();

    assert_eq!(written, "one\nthree");
    assert_eq!(fs::read_to_string(file.path()).unwrap(), "one\nthree");
}

#[test]
fn test_failed_mutation_leaves_file_alone() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "keep me").unwrap();

    let result = FsStore.process(file.path(), |_| {
        Err(Error::NotFound(Missing::Group("Stats".to_string())))
    });

    assert!(matches!(result, Err(Error::NotFound(_))));
    assert_eq!(FsStore.read(file.path()).unwrap(), "keep me");
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = FsStore.read(&dir.path().join("absent.md"));
    assert!(matches!(result, Err(Error::Io(_))));
}
