//! MemTable implementation
//!
//! BTreeMap-based write buffer with RwLock for concurrency.

use std::collections::BTreeMap;

use bytes::Bytes;
use parking_lot::RwLock;

use crate::addr::ContentAddress;
use crate::error::Result;
use crate::source::Haver;
use crate::table::TableBuilder;

/// In-memory buffer of chunks awaiting compaction
#[derive(Default)]
pub struct MemTable {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    chunks: BTreeMap<ContentAddress, Bytes>,
    /// Sum of payload sizes in bytes
    size: usize,
}

impl MemTable {
    /// Create a new empty MemTable
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chunk and return its address
    ///
    /// Adding the same content twice stores it once.
    pub fn add(&self, data: impl Into<Bytes>) -> ContentAddress {
        let data = data.into();
        let addr = ContentAddress::of(&data);
        let mut inner = self.inner.write();
        if !inner.chunks.contains_key(&addr) {
            inner.size += data.len();
            inner.chunks.insert(addr, data);
        }
        addr
    }

    /// Get a buffered chunk by address
    pub fn get(&self, addr: &ContentAddress) -> Option<Bytes> {
        self.inner.read().chunks.get(addr).cloned()
    }

    /// Number of buffered chunks
    pub fn count(&self) -> usize {
        self.inner.read().chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().chunks.is_empty()
    }

    /// Approximate size in bytes
    pub fn size(&self) -> usize {
        self.inner.read().size
    }

    /// Check if should flush (size > limit)
    pub fn should_flush(&self, size_limit: usize) -> bool {
        self.size() > size_limit
    }

    /// Serialize buffered chunks into a table image
    ///
    /// Chunks `haver` already reports as present are skipped. Returns the
    /// table name, its bytes, and how many chunks were written; the name is
    /// a function of the written chunks only.
    ///
    /// The lock is released before `haver` is consulted, so `haver` may be
    /// this memtable or anything that reads it.
    pub fn write(&self, haver: &dyn Haver) -> Result<(ContentAddress, Vec<u8>, u32)> {
        let snapshot: Vec<(ContentAddress, Bytes)> = {
            let inner = self.inner.read();
            inner
                .chunks
                .iter()
                .map(|(addr, data)| (*addr, data.clone()))
                .collect()
        };

        let mut builder = TableBuilder::new();
        for (addr, data) in &snapshot {
            if haver.has(addr) {
                continue;
            }
            builder.add(*addr, data)?;
        }
        Ok(builder.finish())
    }

    /// Clear all entries (after successful flush)
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.chunks.clear();
        inner.size = 0;
    }
}

impl Haver for MemTable {
    fn has(&self, addr: &ContentAddress) -> bool {
        self.inner.read().chunks.contains_key(addr)
    }
}
