//! Memory-mapped local table reader

use std::fs::File;
use std::path::Path;

use bytes::Bytes;
use memmap2::Mmap;
use parking_lot::RwLock;
use tracing::debug;

use crate::addr::ContentAddress;
use crate::error::{NbsError, Result};
use crate::table::{tail_size, ReadAt, TableReader, FOOTER_SIZE};

use super::{ChunkSource, Haver};

/// A table file opened by memory-mapping it
pub struct MmapTableReader {
    reader: TableReader<MappedFile>,
}

/// The mapping; `None` once closed
struct MappedFile {
    name: ContentAddress,
    map: RwLock<Option<Mmap>>,
}

impl MmapTableReader {
    /// Open `<dir>/<name>` and validate it holds `chunk_count` chunks
    pub fn open(dir: &Path, name: ContentAddress, chunk_count: u32) -> Result<Self> {
        let path = dir.join(name.to_hex());
        let file = File::open(&path)?;
        let file_len = file.metadata()?.len();
        if file_len < FOOTER_SIZE {
            return Err(NbsError::CorruptTable(format!(
                "{}: file is {} bytes, shorter than the footer",
                name, file_len
            )));
        }

        // SAFETY: table files are never modified once renamed into place.
        let map = unsafe { Mmap::map(&file)? };

        // If the file is shorter than the expected tail, hand over the whole
        // file so the footer count check reports the real mismatch.
        let tail_start = file_len.saturating_sub(tail_size(chunk_count)) as usize;
        let source = MappedFile {
            name,
            map: RwLock::new(None),
        };
        let reader = TableReader::new(name, &map[tail_start..], chunk_count, source)?;

        let expected_len = reader.index().data_len() + tail_size(chunk_count);
        if expected_len != file_len {
            return Err(NbsError::CorruptTable(format!(
                "{}: file is {} bytes, footer implies {}",
                name, file_len, expected_len
            )));
        }

        *reader.source().map.write() = Some(map);
        debug!(table = %name, chunks = chunk_count, bytes = file_len, "mapped table");
        Ok(Self { reader })
    }

    /// Chunk addresses in index order
    pub fn addresses(&self) -> impl Iterator<Item = ContentAddress> + '_ {
        self.reader.addresses()
    }
}

impl ReadAt for MappedFile {
    fn read_at(&self, offset: u64, len: u32) -> Result<Bytes> {
        let guard = self.map.read();
        let map = guard.as_ref().ok_or(NbsError::SourceClosed(self.name))?;
        let start = offset as usize;
        let end = start + len as usize;
        if end > map.len() {
            return Err(NbsError::CorruptTable(format!(
                "{}: read {}..{} past end of file",
                self.name, start, end
            )));
        }
        Ok(Bytes::copy_from_slice(&map[start..end]))
    }
}

impl Haver for MmapTableReader {
    fn has(&self, addr: &ContentAddress) -> bool {
        self.reader.has(addr)
    }
}

impl ChunkSource for MmapTableReader {
    fn hash(&self) -> ContentAddress {
        self.reader.name()
    }

    fn count(&self) -> u32 {
        self.reader.count()
    }

    fn get(&self, addr: &ContentAddress) -> Result<Option<Bytes>> {
        self.reader.get(addr)
    }

    fn close(&self) -> Result<()> {
        if self.reader.source().map.write().take().is_some() {
            debug!(table = %self.reader.name(), "unmapped table");
        }
        Ok(())
    }
}
