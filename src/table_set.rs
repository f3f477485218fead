//! Table Set
//!
//! Immutable collection of opened tables plus the persister that made them.
//!
//! ## Concurrency
//! A `TableSet` value never changes. `prepend` and `union` build a new value
//! that shares the unchanged sources (through `Arc`) with the old one, so a
//! reader holding an older set keeps a consistent view without locking.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::addr::ContentAddress;
use crate::config::{Backend, Config};
use crate::error::{NbsError, Result};
use crate::memtable::MemTable;
use crate::persister::{FsTablePersister, TablePersister};
use crate::source::{ChunkSource, Haver};
use crate::table_spec::TableSpec;

/// Ordered set of chunk sources, most recently added first
#[derive(Clone)]
pub struct TableSet {
    sources: Vec<Arc<dyn ChunkSource>>,
    persister: Arc<dyn TablePersister>,
}

impl TableSet {
    /// An empty set bound to `persister`
    pub fn new(persister: Arc<dyn TablePersister>) -> Self {
        Self {
            sources: Vec::new(),
            persister,
        }
    }

    /// Open the tables named by `specs` (e.g. as read from a manifest)
    pub fn open(persister: Arc<dyn TablePersister>, specs: &[TableSpec]) -> Result<Self> {
        Self::new(persister).union(specs)
    }

    /// An empty set on the backend `config` selects
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let persister: Arc<dyn TablePersister> = match &config.backend {
            Backend::Local { dir } => Arc::new(FsTablePersister::new(dir.clone())?),
            Backend::Remote { endpoint, bucket } => {
                remote_persister(endpoint, bucket, Duration::from_secs(config.http_timeout_secs))?
            }
        };
        Ok(Self::new(persister))
    }

    /// Flush `mt` into a new table and return a set with that table first
    ///
    /// Chunks any table in `self` already holds are not written again. If
    /// nothing new remains, no table is created and the result is an
    /// unchanged copy of `self`.
    pub fn prepend(&self, mt: &MemTable) -> Result<Self> {
        let spec = self.persister.compact(mt, self)?;
        if spec.chunk_count == 0 {
            return Ok(self.clone());
        }

        let source = self.persister.open(spec.name, spec.chunk_count)?;
        let mut sources = Vec::with_capacity(self.sources.len() + 1);
        sources.push(source);
        sources.extend(self.sources.iter().cloned());
        debug!(table = %spec.name, chunks = spec.chunk_count, tables = sources.len(), "prepended table");

        Ok(Self {
            sources,
            persister: Arc::clone(&self.persister),
        })
    }

    /// Flush `mt` with [`prepend`](Self::prepend) once it holds more than
    /// `size_limit` bytes, then clear it
    ///
    /// Below the limit this is an unchanged copy of `self`. The caller must
    /// be the only writer to `mt`; chunks added between the flush and the
    /// clear would be dropped.
    pub fn flush_if_full(&self, mt: &MemTable, size_limit: usize) -> Result<Self> {
        if !mt.should_flush(size_limit) {
            return Ok(self.clone());
        }
        let next = self.prepend(mt)?;
        mt.clear();
        Ok(next)
    }

    /// A set holding every table in `self` plus those in `specs` not yet held
    ///
    /// New tables are appended after the existing ones, in `specs` order.
    pub fn union(&self, specs: &[TableSpec]) -> Result<Self> {
        let mut known: HashSet<ContentAddress> = self.sources.iter().map(|s| s.hash()).collect();
        let mut sources = self.sources.clone();

        for spec in specs {
            if known.insert(spec.name) {
                sources.push(self.persister.open(spec.name, spec.chunk_count)?);
            }
        }
        if sources.len() > self.sources.len() {
            debug!(added = sources.len() - self.sources.len(), tables = sources.len(), "unioned tables");
        }

        Ok(Self {
            sources,
            persister: Arc::clone(&self.persister),
        })
    }

    /// (name, count) for every table, in set order
    pub fn to_specs(&self) -> Vec<TableSpec> {
        self.sources
            .iter()
            .map(|s| TableSpec::new(s.hash(), s.count()))
            .collect()
    }

    /// Read a chunk from whichever table holds it
    pub fn get(&self, addr: &ContentAddress) -> Result<Option<Bytes>> {
        for source in &self.sources {
            if source.has(addr) {
                return source.get(addr);
            }
        }
        Ok(None)
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Total chunks across all tables
    pub fn chunk_count(&self) -> u64 {
        self.sources.iter().map(|s| s.count() as u64).sum()
    }

    /// The tables, most recently added first
    pub fn sources(&self) -> &[Arc<dyn ChunkSource>] {
        &self.sources
    }

    /// Close every table
    ///
    /// Sources are shared with any set this one was derived from or produced,
    /// so those sets must not be read afterwards. A failing close does not
    /// stop the rest; all failures are returned together.
    pub fn close(&self) -> Result<()> {
        let mut errors = Vec::new();
        for source in &self.sources {
            if let Err(e) = source.close() {
                warn!(table = %source.hash(), error = %e, "failed to close table");
                errors.push(e);
            }
        }
        match NbsError::collect(errors) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Haver for TableSet {
    fn has(&self, addr: &ContentAddress) -> bool {
        self.sources.iter().any(|s| s.has(addr))
    }
}

impl fmt::Debug for TableSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableSet")
            .field("tables", &self.to_specs())
            .finish()
    }
}

#[cfg(feature = "http")]
fn remote_persister(endpoint: &str, bucket: &str, timeout: Duration) -> Result<Arc<dyn TablePersister>> {
    use crate::object_store::HttpObjectStore;
    use crate::persister::RemoteTablePersister;

    let store = HttpObjectStore::new(endpoint, bucket, timeout)?;
    Ok(Arc::new(RemoteTablePersister::new(Arc::new(store))))
}

#[cfg(not(feature = "http"))]
fn remote_persister(_endpoint: &str, _bucket: &str, _timeout: Duration) -> Result<Arc<dyn TablePersister>> {
    Err(NbsError::Config(
        "remote backend requires the `http` feature".to_string(),
    ))
}
