//! Table Index
//!
//! Parses and validates a table's tail (index region + footer).

use crate::addr::{ContentAddress, ADDR_SIZE};
use crate::error::{NbsError, Result};

use super::{index_size, tail_size, FOOTER_SIZE, INDEX_ENTRY_SIZE, MAGIC, VERSION};

/// Location of one chunk inside the data region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub addr: ContentAddress,
    /// Byte offset from the start of the table
    pub offset: u64,
    pub length: u32,
}

/// Parsed, validated index of one table
#[derive(Debug, Clone)]
pub struct TableIndex {
    /// Sorted by address, strictly ascending
    entries: Vec<IndexEntry>,
    /// Length of the data region
    data_len: u64,
}

impl TableIndex {
    /// Parse a table tail
    ///
    /// `tail` must be exactly `tail_size(expected_count)` bytes taken from the
    /// end of the table named `table`. The footer's chunk count must match
    /// `expected_count`; anything else means the object is not what its name
    /// claims.
    pub fn parse(table: ContentAddress, tail: &[u8], expected_count: u32) -> Result<Self> {
        if (tail.len() as u64) < FOOTER_SIZE {
            return Err(NbsError::CorruptTable(format!(
                "{}: tail is {} bytes, shorter than the footer",
                table,
                tail.len()
            )));
        }

        // Footer: [count(4)][data_len(8)][crc(4)][version(2)][magic(6)]
        let footer = &tail[tail.len() - FOOTER_SIZE as usize..];
        if &footer[18..24] != MAGIC {
            return Err(NbsError::CorruptTable(format!(
                "{}: bad magic {:?}",
                table,
                &footer[18..24]
            )));
        }
        let version = u16::from_le_bytes([footer[16], footer[17]]);
        if version != VERSION {
            return Err(NbsError::CorruptTable(format!(
                "{}: unsupported table version {}",
                table, version
            )));
        }

        let chunk_count = read_u32(&footer[0..4]);
        if chunk_count != expected_count {
            return Err(NbsError::ChunkCountMismatch {
                table,
                expected: expected_count,
                actual: chunk_count,
            });
        }
        if tail.len() as u64 != tail_size(chunk_count) {
            return Err(NbsError::CorruptTable(format!(
                "{}: tail is {} bytes, expected {}",
                table,
                tail.len(),
                tail_size(chunk_count)
            )));
        }

        let data_len = read_u64(&footer[4..12]);
        let index_crc = read_u32(&footer[12..16]);

        let index = &tail[..index_size(chunk_count) as usize];
        if crc32fast::hash(index) != index_crc {
            return Err(NbsError::CorruptTable(format!(
                "{}: index checksum mismatch",
                table
            )));
        }

        let mut entries: Vec<IndexEntry> = Vec::with_capacity(chunk_count as usize);
        for record in index.chunks_exact(INDEX_ENTRY_SIZE as usize) {
            let entry = IndexEntry {
                addr: ContentAddress::from_slice(&record[..ADDR_SIZE])?,
                offset: read_u64(&record[ADDR_SIZE..ADDR_SIZE + 8]),
                length: read_u32(&record[ADDR_SIZE + 8..ADDR_SIZE + 12]),
            };

            if let Some(prev) = entries.last() {
                if prev.addr >= entry.addr {
                    return Err(NbsError::CorruptTable(format!(
                        "{}: index not sorted at {}",
                        table, entry.addr
                    )));
                }
            }
            let end = entry.offset.checked_add(entry.length as u64);
            if end.map_or(true, |end| end > data_len) {
                return Err(NbsError::CorruptTable(format!(
                    "{}: chunk {} extends past the data region",
                    table, entry.addr
                )));
            }
            entries.push(entry);
        }

        Ok(Self { entries, data_len })
    }

    /// Number of chunks
    pub fn count(&self) -> u32 {
        self.entries.len() as u32
    }

    /// Length of the data region in bytes
    pub fn data_len(&self) -> u64 {
        self.data_len
    }

    /// Binary search for a chunk
    pub fn lookup(&self, addr: &ContentAddress) -> Option<&IndexEntry> {
        self.entries
            .binary_search_by(|probe| probe.addr.cmp(addr))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// All entries in address order
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }
}

fn read_u32(b: &[u8]) -> u32 {
    let mut arr = [0u8; 4];
    arr.copy_from_slice(b);
    u32::from_le_bytes(arr)
}

fn read_u64(b: &[u8]) -> u64 {
    let mut arr = [0u8; 8];
    arr.copy_from_slice(b);
    u64::from_le_bytes(arr)
}
