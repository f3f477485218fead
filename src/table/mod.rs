//! Table Module
//!
//! Immutable on-disk (or in-bucket) tables of content-addressed chunks.
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Data Region (variable)                                   │
//! │   chunk payloads, concatenated in address order          │
//! ├──────────────────────────────────────────────────────────┤
//! │ Index Region (chunk_count * 32 bytes)                    │
//! │   [Address (20)][Offset: u64 (8)][Length: u32 (4)]       │
//! │   ... one record per chunk, sorted by address ...        │
//! ├──────────────────────────────────────────────────────────┤
//! │ Footer (24 bytes)                                        │
//! │   ChunkCount: u32 (4) | DataLen: u64 (8)                 │
//! │   IndexCRC: u32 (4) | Version: u16 (2) | Magic "NBSTBL"  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The index and footer together form the table's *tail*. Its size depends
//! only on the chunk count, so a reader that knows the count can fetch the
//! whole tail in a single read from the end of the table.

mod builder;
mod index;
mod reader;

pub use builder::TableBuilder;
pub use index::{IndexEntry, TableIndex};
pub use reader::{ReadAt, TableReader};

use crate::addr::ADDR_SIZE;

// =============================================================================
// Shared Constants (used by builder and index)
// =============================================================================

/// Magic bytes closing every table
pub(crate) const MAGIC: &[u8; 6] = b"NBSTBL";

/// Current table format version
pub(crate) const VERSION: u16 = 1;

/// Index record size: Address (20) + Offset (8) + Length (4) = 32 bytes
pub const INDEX_ENTRY_SIZE: u64 = ADDR_SIZE as u64 + 8 + 4;

/// Footer size: ChunkCount (4) + DataLen (8) + IndexCRC (4) + Version (2) + Magic (6)
pub const FOOTER_SIZE: u64 = 24;

/// Size of the index region for a table of `chunk_count` chunks
pub const fn index_size(chunk_count: u32) -> u64 {
    chunk_count as u64 * INDEX_ENTRY_SIZE
}

/// Size of the index region plus footer
pub const fn tail_size(chunk_count: u32) -> u64 {
    index_size(chunk_count) + FOOTER_SIZE
}
