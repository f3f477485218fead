//! Tests for chunk sources
//!
//! These tests verify:
//! - Local mmap reader: lookups, close/unmap, reads after close
//! - Remote reader: one suffix-range GET on open, inclusive ranges per chunk
//! - Remote reader: content-length mismatches are fatal
//! - Zero-length chunks

mod common;

use std::sync::Arc;

use bytes::Bytes;
use common::{memtable_with, setup_temp_dir};
use nbs::object_store::{ByteRange, MemObjectStore, ObjectStore, RangeResponse};
use nbs::source::{MmapTableReader, RemoteTableReader};
use nbs::table::{tail_size, FOOTER_SIZE};
use nbs::{
    ChunkSource, ContentAddress, FsTablePersister, Haver, MemTable, NbsError, NoChunks,
    RemoteTablePersister, TablePersister, TableSpec,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn fs_table(chunks: &[&str]) -> (tempfile::TempDir, FsTablePersister, TableSpec) {
    let (temp, path) = setup_temp_dir();
    let persister = FsTablePersister::new(&path).unwrap();
    let spec = persister.compact(&memtable_with(chunks), &NoChunks).unwrap();
    (temp, persister, spec)
}

fn remote_table(chunks: &[&str]) -> (Arc<MemObjectStore>, TableSpec) {
    let store = Arc::new(MemObjectStore::new());
    let persister = RemoteTablePersister::new(store.clone());
    let spec = persister.compact(&memtable_with(chunks), &NoChunks).unwrap();
    (store, spec)
}

/// Store that serves ranges from an inner store but lies about lengths
struct ShortReads {
    inner: MemObjectStore,
    /// Bytes to drop from every body
    trim_body: usize,
    /// Value added to every declared content length
    declared_delta: u64,
}

impl ObjectStore for ShortReads {
    fn get_range(&self, key: &str, range: ByteRange) -> nbs::Result<RangeResponse> {
        let mut resp = self.inner.get_range(key, range)?;
        let keep = resp.body.len().saturating_sub(self.trim_body);
        resp.body = resp.body.slice(..keep);
        resp.content_length += self.declared_delta;
        Ok(resp)
    }

    fn put(&self, key: &str, data: &[u8]) -> nbs::Result<()> {
        self.inner.put(key, data)
    }
}

// =============================================================================
// Mmap Reader Tests
// =============================================================================

#[test]
fn test_mmap_reader_lookups() {
    let (_temp, persister, spec) = fs_table(&["apple", "banana", "cherry"]);

    let reader = MmapTableReader::open(persister.dir(), spec.name, spec.chunk_count).unwrap();

    assert_eq!(reader.hash(), spec.name);
    assert_eq!(reader.count(), 3);
    for chunk in ["apple", "banana", "cherry"] {
        let addr = ContentAddress::of(chunk.as_bytes());
        assert!(reader.has(&addr));
        assert_eq!(reader.get(&addr).unwrap().unwrap(), Bytes::from(chunk));
    }
    let missing = ContentAddress::of(b"durian");
    assert!(!reader.has(&missing));
    assert!(reader.get(&missing).unwrap().is_none());
}

#[test]
fn test_mmap_reader_addresses_are_sorted() {
    let (_temp, persister, spec) = fs_table(&["q", "w", "e", "r", "t", "y"]);
    let reader = MmapTableReader::open(persister.dir(), spec.name, spec.chunk_count).unwrap();

    let addrs: Vec<ContentAddress> = reader.addresses().collect();
    let mut sorted = addrs.clone();
    sorted.sort();

    assert_eq!(addrs.len(), 6);
    assert_eq!(addrs, sorted);
}

#[test]
fn test_mmap_get_after_close_fails() {
    let (_temp, persister, spec) = fs_table(&["x"]);
    let reader = MmapTableReader::open(persister.dir(), spec.name, spec.chunk_count).unwrap();
    let addr = ContentAddress::of(b"x");

    reader.close().unwrap();

    assert!(matches!(reader.get(&addr), Err(NbsError::SourceClosed(name)) if name == spec.name));
    // The index outlives the mapping
    assert!(reader.has(&addr));
}

#[test]
fn test_mmap_double_close_is_noop() {
    let (_temp, persister, spec) = fs_table(&["x"]);
    let reader = MmapTableReader::open(persister.dir(), spec.name, spec.chunk_count).unwrap();

    reader.close().unwrap();
    reader.close().unwrap();
}

#[test]
fn test_mmap_rejects_tiny_file() {
    let (_temp, path) = setup_temp_dir();
    let name = ContentAddress::of(b"bogus");
    std::fs::write(path.join(name.to_hex()), vec![0u8; FOOTER_SIZE as usize - 1]).unwrap();

    let result = MmapTableReader::open(&path, name, 0);

    assert!(matches!(result, Err(NbsError::CorruptTable(_))));
}

#[test]
fn test_zero_length_chunk() {
    let mt = MemTable::new();
    let empty = mt.add(Vec::new());
    let full = mt.add(&b"payload"[..]);

    let (_temp, path) = setup_temp_dir();
    let persister = FsTablePersister::new(&path).unwrap();
    let spec = persister.compact(&mt, &NoChunks).unwrap();
    let local = persister.open(spec.name, spec.chunk_count).unwrap();

    let store = Arc::new(MemObjectStore::new());
    let remote_persister = RemoteTablePersister::new(store.clone());
    remote_persister.compact(&mt, &NoChunks).unwrap();
    let remote = remote_persister.open(spec.name, spec.chunk_count).unwrap();

    for source in [local, remote] {
        assert_eq!(source.get(&empty).unwrap().unwrap().len(), 0);
        assert_eq!(&source.get(&full).unwrap().unwrap()[..], b"payload");
    }
}

// =============================================================================
// Remote Reader Tests
// =============================================================================

#[test]
fn test_remote_open_issues_one_suffix_range() {
    let (store, spec) = remote_table(&["a", "b", "c"]);

    let reader = RemoteTableReader::open(store.clone(), spec.name, spec.chunk_count).unwrap();

    assert_eq!(reader.count(), 3);
    assert_eq!(
        store.requested_ranges(),
        vec![format!("bytes=-{}", tail_size(3))]
    );
}

#[test]
fn test_remote_has_does_not_fetch() {
    let (store, spec) = remote_table(&["a", "b"]);
    let reader = RemoteTableReader::open(store.clone(), spec.name, spec.chunk_count).unwrap();

    assert!(reader.has(&ContentAddress::of(b"a")));
    assert!(!reader.has(&ContentAddress::of(b"z")));

    assert_eq!(store.requested_ranges().len(), 1);
}

#[test]
fn test_remote_get_uses_inclusive_range() {
    // Data region is address-ordered; find where our 100-byte chunk lands
    let big = "z".repeat(100);
    let (store, spec) = remote_table(&["a", big.as_str()]);
    let reader = RemoteTableReader::open(store.clone(), spec.name, spec.chunk_count).unwrap();

    let big_addr = ContentAddress::of(big.as_bytes());
    let offset: u64 = if ContentAddress::of(b"a") < big_addr { 1 } else { 0 };

    let data = reader.get(&big_addr).unwrap().unwrap();

    assert_eq!(data.len(), 100);
    let ranges = store.requested_ranges();
    assert_eq!(ranges.len(), 2);
    assert_eq!(ranges[1], format!("bytes={}-{}", offset, offset + 99));
}

#[test]
fn test_remote_range_100_to_199() {
    assert_eq!(ByteRange::at(100, 100).unwrap().to_string(), "bytes=100-199");
}

#[test]
fn test_remote_get_missing_is_none_without_fetch() {
    let (store, spec) = remote_table(&["a"]);
    let reader = RemoteTableReader::open(store.clone(), spec.name, spec.chunk_count).unwrap();

    assert!(reader.get(&ContentAddress::of(b"nope")).unwrap().is_none());
    assert_eq!(store.requested_ranges().len(), 1);
}

#[test]
fn test_remote_short_body_is_fatal() {
    let (mem, spec) = remote_table(&["abcdef"]);
    let bytes = mem.object(&spec.name.to_hex()).unwrap();
    let store = Arc::new(ShortReads {
        inner: MemObjectStore::new(),
        trim_body: 0,
        declared_delta: 0,
    });
    store.put(&spec.name.to_hex(), &bytes).unwrap();

    // Honest store: opens and reads fine
    let reader = RemoteTableReader::open(store.clone(), spec.name, 1).unwrap();
    assert!(reader.get(&ContentAddress::of(b"abcdef")).unwrap().is_some());

    let lying = Arc::new(ShortReads {
        inner: MemObjectStore::new(),
        trim_body: 1,
        declared_delta: 0,
    });
    lying.put(&spec.name.to_hex(), &bytes).unwrap();
    let err = RemoteTableReader::open(lying, spec.name, 1).err().unwrap();
    assert!(matches!(
        err,
        NbsError::ContentLengthMismatch { expected, actual, .. } if actual == expected - 1
    ));
}

#[test]
fn test_remote_declared_length_mismatch_is_fatal() {
    let (mem, spec) = remote_table(&["abcdef"]);
    let bytes = mem.object(&spec.name.to_hex()).unwrap();
    let store = Arc::new(ShortReads {
        inner: MemObjectStore::new(),
        trim_body: 0,
        declared_delta: 1,
    });
    store.put(&spec.name.to_hex(), &bytes).unwrap();

    let err = RemoteTableReader::open(store, spec.name, 1).err().unwrap();

    assert!(err.is_integrity());
    assert!(matches!(err, NbsError::ContentLengthMismatch { .. }));
}

#[test]
fn test_remote_missing_object() {
    let store = Arc::new(MemObjectStore::new());

    let err = RemoteTableReader::open(store, ContentAddress::of(b"absent"), 1)
        .err()
        .unwrap();

    assert!(matches!(err, NbsError::ObjectNotFound(_)));
}

#[test]
fn test_remote_close_is_noop() {
    let (store, spec) = remote_table(&["a"]);
    let reader = RemoteTableReader::open(store, spec.name, spec.chunk_count).unwrap();

    reader.close().unwrap();

    assert!(reader.get(&ContentAddress::of(b"a")).unwrap().is_some());
}
