//! Object Store Module
//!
//! The narrow remote-storage seam used by the remote backend: ranged GETs
//! and whole-object PUTs against one bucket.
//!
//! ## Implementations
//! - `HttpObjectStore`: S3-style HTTP endpoint (feature `http`)
//! - `MemObjectStore`: in-process store with the same range semantics

#[cfg(feature = "http")]
mod http;
mod mem;

use std::fmt;

use bytes::Bytes;

use crate::error::Result;

#[cfg(feature = "http")]
pub use self::http::HttpObjectStore;
pub use mem::MemObjectStore;

/// Unit prefix of HTTP byte-range headers
pub const RANGE_UNIT: &str = "bytes";

/// An HTTP byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// The last `n` bytes of the object (`bytes=-n`)
    Suffix(u64),
    /// Bytes `start..=end`; HTTP ranges are inclusive at both ends
    Inclusive { start: u64, end: u64 },
}

impl ByteRange {
    /// Range covering `len` bytes from `offset`
    ///
    /// `None` if `len` is zero or the range would run past `u64::MAX`; HTTP
    /// has no way to ask for an empty inclusive range.
    pub fn at(offset: u64, len: u64) -> Option<Self> {
        let end = offset.checked_add(len.checked_sub(1)?)?;
        Some(ByteRange::Inclusive { start: offset, end })
    }

    /// Number of bytes the range asks for; zero if `end < start`
    pub fn len(&self) -> u64 {
        match *self {
            ByteRange::Suffix(n) => n,
            ByteRange::Inclusive { start, end } => {
                end.checked_sub(start).map_or(0, |d| d.saturating_add(1))
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve against an object of `size` bytes, clamping like a server does
    ///
    /// Returns `None` for an unsatisfiable range.
    pub fn resolve(&self, size: u64) -> Option<std::ops::Range<u64>> {
        match *self {
            ByteRange::Suffix(n) => Some(size.saturating_sub(n)..size),
            ByteRange::Inclusive { start, end } if start <= end && start < size => {
                Some(start..end.saturating_add(1).min(size))
            }
            ByteRange::Inclusive { .. } => None,
        }
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ByteRange::Suffix(n) => write!(f, "{}=-{}", RANGE_UNIT, n),
            ByteRange::Inclusive { start, end } => write!(f, "{}={}-{}", RANGE_UNIT, start, end),
        }
    }
}

/// Body of a ranged GET plus the length the server declared for it
#[derive(Debug, Clone)]
pub struct RangeResponse {
    pub content_length: u64,
    pub body: Bytes,
}

/// A bucket of immutable objects addressed by string keys
pub trait ObjectStore: Send + Sync {
    /// Ranged GET of `key`
    fn get_range(&self, key: &str, range: ByteRange) -> Result<RangeResponse>;

    /// Whole-object PUT of `data` under `key`
    fn put(&self, key: &str, data: &[u8]) -> Result<()>;
}
