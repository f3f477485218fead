//! Table Builder
//!
//! Serializes address-sorted chunks into a complete table image.

use crate::addr::ContentAddress;
use crate::error::{NbsError, Result};

use super::{index_size, IndexEntry, FOOTER_SIZE, MAGIC, VERSION};

/// Builder for table images from address-sorted chunks
pub struct TableBuilder {
    /// Data region followed, after `finish()`, by index and footer
    buf: Vec<u8>,
    /// One record per chunk, in the order added
    index: Vec<IndexEntry>,
    /// Hashes the sequence of chunk addresses into the table name
    name_hasher: blake3::Hasher,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            index: Vec::new(),
            name_hasher: blake3::Hasher::new(),
        }
    }

    /// Add a chunk (must be called in strictly ascending address order)
    pub fn add(&mut self, addr: ContentAddress, data: &[u8]) -> Result<()> {
        if let Some(last) = self.index.last() {
            if last.addr >= addr {
                return Err(NbsError::CorruptTable(format!(
                    "chunk {} added out of order after {}",
                    addr, last.addr
                )));
            }
        }
        let length = u32::try_from(data.len()).map_err(|_| {
            NbsError::CorruptTable(format!("chunk {} is {} bytes, too large", addr, data.len()))
        })?;

        self.index.push(IndexEntry {
            addr,
            offset: self.buf.len() as u64,
            length,
        });
        self.buf.extend_from_slice(data);
        self.name_hasher.update(addr.as_bytes());
        Ok(())
    }

    /// Number of chunks added so far
    pub fn chunk_count(&self) -> u32 {
        self.index.len() as u32
    }

    /// Finish building: append index and footer
    ///
    /// Returns the table name, its bytes, and its chunk count.
    pub fn finish(self) -> (ContentAddress, Vec<u8>, u32) {
        let TableBuilder {
            mut buf,
            index,
            name_hasher,
        } = self;

        let chunk_count = index.len() as u32;
        let data_len = buf.len() as u64;
        buf.reserve((index_size(chunk_count) + FOOTER_SIZE) as usize);

        // Index region: [addr(20)][offset(8)][length(4)]
        let index_start = buf.len();
        for entry in &index {
            buf.extend_from_slice(entry.addr.as_bytes());
            buf.extend_from_slice(&entry.offset.to_le_bytes());
            buf.extend_from_slice(&entry.length.to_le_bytes());
        }
        let index_crc = crc32fast::hash(&buf[index_start..]);

        // Footer
        buf.extend_from_slice(&chunk_count.to_le_bytes());
        buf.extend_from_slice(&data_len.to_le_bytes());
        buf.extend_from_slice(&index_crc.to_le_bytes());
        buf.extend_from_slice(&VERSION.to_le_bytes());
        buf.extend_from_slice(MAGIC);

        let name = ContentAddress::from_hash(&name_hasher.finalize());
        (name, buf, chunk_count)
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}
