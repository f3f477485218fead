//! Chunk Sources
//!
//! An opened table bound to the backend its bytes live in.
//!
//! ## Backends
//! - `MmapTableReader`: a table file in a local directory, memory-mapped
//! - `RemoteTableReader`: a table object in a bucket, read with HTTP byte ranges
//!
//! Both parse the table tail once on open and keep only the index in memory;
//! chunk payloads are fetched on demand, one bounded read per `get`.

mod mmap;
mod remote;

use bytes::Bytes;

use crate::addr::ContentAddress;
use crate::error::Result;

pub use mmap::MmapTableReader;
pub use remote::RemoteTableReader;

/// Anything that can say whether it already holds a chunk
pub trait Haver {
    fn has(&self, addr: &ContentAddress) -> bool;
}

/// A `Haver` that has nothing; compacting against it writes every chunk
#[derive(Debug, Clone, Copy, Default)]
pub struct NoChunks;

impl Haver for NoChunks {
    fn has(&self, _addr: &ContentAddress) -> bool {
        false
    }
}

/// An opened, immutable, content-addressed table
///
/// `close` releases backend resources. Calling it again is a no-op; reading
/// after close fails with `SourceClosed` where the backend holds resources.
pub trait ChunkSource: Haver + Send + Sync {
    /// Name of the table itself (not of any chunk in it)
    fn hash(&self) -> ContentAddress;

    /// Number of chunks in the table
    fn count(&self) -> u32;

    /// Read one chunk; `Ok(None)` if this table does not hold it
    fn get(&self, addr: &ContentAddress) -> Result<Option<Bytes>>;

    fn close(&self) -> Result<()>;
}
