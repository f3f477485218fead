//! Table Reader
//!
//! Answers `has`/`get` for one table against any random-access byte source.
//! Both backends share this; only the `ReadAt` impl differs.

use bytes::Bytes;

use crate::addr::ContentAddress;
use crate::error::Result;

use super::{IndexEntry, TableIndex};

/// Random-access byte source holding a whole table
pub trait ReadAt: Send + Sync {
    /// Read exactly `len` bytes starting at `offset`
    fn read_at(&self, offset: u64, len: u32) -> Result<Bytes>;
}

/// Reader for one table: parsed index + byte source
pub struct TableReader<R> {
    name: ContentAddress,
    index: TableIndex,
    source: R,
}

impl<R: ReadAt> TableReader<R> {
    /// Build a reader from a table's tail
    ///
    /// Fails with `ChunkCountMismatch` if the footer disagrees with
    /// `expected_count`.
    pub fn new(name: ContentAddress, tail: &[u8], expected_count: u32, source: R) -> Result<Self> {
        let index = TableIndex::parse(name, tail, expected_count)?;
        Ok(Self {
            name,
            index,
            source,
        })
    }

    /// Name of the table
    pub fn name(&self) -> ContentAddress {
        self.name
    }

    /// Number of chunks
    pub fn count(&self) -> u32 {
        self.index.count()
    }

    /// O(log n) membership check; never touches the byte source
    pub fn has(&self, addr: &ContentAddress) -> bool {
        self.index.lookup(addr).is_some()
    }

    /// Read one chunk with a single bounded read
    ///
    /// Returns `Ok(None)` if the table does not hold `addr`.
    pub fn get(&self, addr: &ContentAddress) -> Result<Option<Bytes>> {
        match self.index.lookup(addr) {
            Some(entry) => self.read_entry(entry).map(Some),
            None => Ok(None),
        }
    }

    /// Chunk addresses in index order
    pub fn addresses(&self) -> impl Iterator<Item = ContentAddress> + '_ {
        self.index.entries().iter().map(|e| e.addr)
    }

    pub fn index(&self) -> &TableIndex {
        &self.index
    }

    pub fn source(&self) -> &R {
        &self.source
    }

    fn read_entry(&self, entry: &IndexEntry) -> Result<Bytes> {
        self.source.read_at(entry.offset, entry.length)
    }
}
