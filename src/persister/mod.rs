//! Table Persisters
//!
//! Turn a write buffer into a durable table and reopen tables by name.
//!
//! ## Responsibilities
//! - Serialize a `MemTable`, skipping chunks the store already has
//! - Publish the result atomically under its content-derived name
//! - Reopen published tables, revalidating their chunk count
//!
//! Table names derive from content, so a retried `compact` of the same buffer
//! writes the same name and bytes again; a write that succeeded but whose
//! acknowledgement was lost is harmless.

mod fs;
mod remote;

use std::sync::Arc;

use crate::addr::ContentAddress;
use crate::error::Result;
use crate::memtable::MemTable;
use crate::source::{ChunkSource, Haver};
use crate::table_spec::TableSpec;

pub use self::fs::FsTablePersister;
pub use remote::RemoteTablePersister;

/// Backend that writes and opens tables
pub trait TablePersister: Send + Sync {
    /// Persist the chunks of `mt` that `haver` does not already have
    ///
    /// A returned spec with `chunk_count == 0` means nothing was written and
    /// no table exists under that name.
    fn compact(&self, mt: &MemTable, haver: &dyn Haver) -> Result<TableSpec>;

    /// Open a previously persisted table
    fn open(&self, name: ContentAddress, chunk_count: u32) -> Result<Arc<dyn ChunkSource>>;
}
