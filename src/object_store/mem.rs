//! In-process object store

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use tracing::trace;

use crate::error::{NbsError, Result};

use super::{ByteRange, ObjectStore, RangeResponse};

/// Object store kept in memory
///
/// Serves ranges the way an HTTP server does and records every range header
/// it was asked for, so callers can check what went over the "wire".
#[derive(Default)]
pub struct MemObjectStore {
    objects: RwLock<HashMap<String, Bytes>>,
    ranges: Mutex<Vec<String>>,
    puts: Mutex<usize>,
}

impl MemObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whole object, if present
    pub fn object(&self, key: &str) -> Option<Bytes> {
        self.objects.read().get(key).cloned()
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// Range headers served so far, oldest first
    pub fn requested_ranges(&self) -> Vec<String> {
        self.ranges.lock().clone()
    }

    /// Number of PUTs received
    pub fn put_count(&self) -> usize {
        *self.puts.lock()
    }
}

impl ObjectStore for MemObjectStore {
    fn get_range(&self, key: &str, range: ByteRange) -> Result<RangeResponse> {
        self.ranges.lock().push(range.to_string());
        trace!(key, range = %range, "mem get");

        let object = self
            .object(key)
            .ok_or_else(|| NbsError::ObjectNotFound(key.to_string()))?;
        let span = range.resolve(object.len() as u64).ok_or(NbsError::HttpStatus {
            key: key.to_string(),
            status: 416,
        })?;
        let body = object.slice(span.start as usize..span.end as usize);
        Ok(RangeResponse {
            content_length: body.len() as u64,
            body,
        })
    }

    fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        trace!(key, bytes = data.len(), "mem put");
        *self.puts.lock() += 1;
        self.objects
            .write()
            .insert(key.to_string(), Bytes::copy_from_slice(data));
        Ok(())
    }
}
