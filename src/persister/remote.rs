//! Object-store persister: one whole-object PUT per table

use std::sync::Arc;

use tracing::{debug, info};

use crate::addr::ContentAddress;
use crate::error::Result;
use crate::memtable::MemTable;
use crate::object_store::ObjectStore;
use crate::source::{ChunkSource, Haver, RemoteTableReader};
use crate::table_spec::TableSpec;

use super::TablePersister;

/// Persists tables as objects keyed by their hex address
///
/// Relies on the store making a completed PUT visible atomically.
#[derive(Clone)]
pub struct RemoteTablePersister {
    store: Arc<dyn ObjectStore>,
}

impl RemoteTablePersister {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }
}

impl TablePersister for RemoteTablePersister {
    fn compact(&self, mt: &MemTable, haver: &dyn Haver) -> Result<TableSpec> {
        let (name, data, chunk_count) = mt.write(haver)?;
        if chunk_count == 0 {
            debug!("compaction found no new chunks, nothing uploaded");
            return Ok(TableSpec::new(name, 0));
        }

        self.store.put(&name.to_hex(), &data)?;
        info!(table = %name, chunks = chunk_count, bytes = data.len(), "uploaded table");
        Ok(TableSpec::new(name, chunk_count))
    }

    fn open(&self, name: ContentAddress, chunk_count: u32) -> Result<Arc<dyn ChunkSource>> {
        let reader = RemoteTableReader::open(Arc::clone(&self.store), name, chunk_count)?;
        Ok(Arc::new(reader))
    }
}
