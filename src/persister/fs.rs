//! Filesystem persister: temp file + atomic rename

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::addr::ContentAddress;
use crate::error::Result;
use crate::memtable::MemTable;
use crate::source::{ChunkSource, Haver, MmapTableReader};
use crate::table_spec::TableSpec;

use super::TablePersister;

/// Persists tables as files in one directory
///
/// Each table is a file named by its hex address. Tables are written under
/// a `nbs_table_` temp name and renamed into place, so no reader ever sees a
/// partial table under its final name.
#[derive(Debug, Clone)]
pub struct FsTablePersister {
    dir: PathBuf,
}

impl FsTablePersister {
    /// Prefix of in-flight temp files
    pub const TEMP_PREFIX: &'static str = "nbs_table_";

    /// Use `dir` for tables, creating it if it doesn't exist
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory holding the tables
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Final path of table `name`
    pub fn table_path(&self, name: &ContentAddress) -> PathBuf {
        self.dir.join(name.to_hex())
    }
}

impl TablePersister for FsTablePersister {
    fn compact(&self, mt: &MemTable, haver: &dyn Haver) -> Result<TableSpec> {
        let (name, data, chunk_count) = mt.write(haver)?;
        if chunk_count == 0 {
            debug!("compaction found no new chunks, nothing written");
            return Ok(TableSpec::new(name, 0));
        }

        // On any error below `temp` is dropped, which removes the file.
        let mut temp = tempfile::Builder::new()
            .prefix(Self::TEMP_PREFIX)
            .tempfile_in(&self.dir)?;
        temp.write_all(&data)?;
        temp.as_file().sync_all()?;

        let path = self.table_path(&name);
        temp.persist(&path).map_err(|e| e.error)?;
        sync_dir(&self.dir)?;

        info!(table = %name, chunks = chunk_count, bytes = data.len(), "wrote table file");
        Ok(TableSpec::new(name, chunk_count))
    }

    fn open(&self, name: ContentAddress, chunk_count: u32) -> Result<Arc<dyn ChunkSource>> {
        Ok(Arc::new(MmapTableReader::open(&self.dir, name, chunk_count)?))
    }
}

/// Flush the directory entry so a completed rename survives a crash
#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    fs::File::open(dir)?.sync_all()?;
    Ok(())
}

/// Directories can't be opened for syncing here; the rename is as durable as
/// the platform makes it
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}
