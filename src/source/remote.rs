//! Remote table reader over ranged GETs

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::addr::ContentAddress;
use crate::error::{NbsError, Result};
use crate::object_store::{ByteRange, ObjectStore};
use crate::table::{tail_size, ReadAt, TableReader};

use super::{ChunkSource, Haver};

/// A table object read with HTTP byte ranges
pub struct RemoteTableReader {
    reader: TableReader<RemoteObject>,
}

struct RemoteObject {
    store: Arc<dyn ObjectStore>,
    key: String,
}

impl RemoteTableReader {
    /// Open table `name`, fetching its tail with a single suffix-range GET
    pub fn open(store: Arc<dyn ObjectStore>, name: ContentAddress, chunk_count: u32) -> Result<Self> {
        let object = RemoteObject {
            store,
            key: name.to_hex(),
        };
        let size = tail_size(chunk_count);
        let tail = object.read_range(ByteRange::Suffix(size))?;
        debug!(table = %name, chunks = chunk_count, tail_bytes = size, "opened remote table");

        let reader = TableReader::new(name, &tail, chunk_count, object)?;
        Ok(Self { reader })
    }

    /// Chunk addresses in index order
    pub fn addresses(&self) -> impl Iterator<Item = ContentAddress> + '_ {
        self.reader.addresses()
    }
}

impl RemoteObject {
    /// GET `range`; the declared and actual body length must both equal the
    /// requested length
    fn read_range(&self, range: ByteRange) -> Result<Bytes> {
        let expected = range.len();
        let resp = self.store.get_range(&self.key, range)?;
        let actual = if resp.content_length != expected {
            resp.content_length
        } else {
            resp.body.len() as u64
        };
        if actual != expected {
            return Err(NbsError::ContentLengthMismatch {
                key: self.key.clone(),
                expected,
                actual,
            });
        }
        Ok(resp.body)
    }
}

impl ReadAt for RemoteObject {
    fn read_at(&self, offset: u64, len: u32) -> Result<Bytes> {
        if len == 0 {
            return Ok(Bytes::new());
        }
        let range = ByteRange::at(offset, len as u64).ok_or_else(|| {
            NbsError::CorruptTable(format!("{}: read at {} overflows", self.key, offset))
        })?;
        self.read_range(range)
    }
}

impl Haver for RemoteTableReader {
    fn has(&self, addr: &ContentAddress) -> bool {
        self.reader.has(addr)
    }
}

impl ChunkSource for RemoteTableReader {
    fn hash(&self) -> ContentAddress {
        self.reader.name()
    }

    fn count(&self) -> u32 {
        self.reader.count()
    }

    fn get(&self, addr: &ContentAddress) -> Result<Option<Bytes>> {
        self.reader.get(addr)
    }

    /// Nothing is held locally
    fn close(&self) -> Result<()> {
        Ok(())
    }
}
