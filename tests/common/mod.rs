//! Shared helpers for integration tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use nbs::object_store::MemObjectStore;
use nbs::{FsTablePersister, MemTable, RemoteTablePersister, TableSet};
use tempfile::TempDir;

pub fn setup_temp_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().to_path_buf();
    (temp_dir, path)
}

/// MemTable holding one chunk per string
pub fn memtable_with(chunks: &[&str]) -> MemTable {
    let mt = MemTable::new();
    for chunk in chunks {
        mt.add(chunk.as_bytes().to_vec());
    }
    mt
}

/// Empty table set on a fresh temp directory
pub fn fs_table_set() -> (TempDir, Arc<FsTablePersister>, TableSet) {
    let (temp, path) = setup_temp_dir();
    let persister = Arc::new(FsTablePersister::new(path).unwrap());
    let ts = TableSet::new(persister.clone());
    (temp, persister, ts)
}

/// Empty table set on a fresh in-memory object store
pub fn remote_table_set() -> (Arc<MemObjectStore>, TableSet) {
    let store = Arc::new(MemObjectStore::new());
    let persister = Arc::new(RemoteTablePersister::new(store.clone()));
    (store, TableSet::new(persister))
}

/// Names of the files in `dir`, sorted
pub fn file_names(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
