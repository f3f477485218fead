//! Content addresses
//!
//! A `ContentAddress` names both chunks and tables. It is the first
//! `ADDR_SIZE` bytes of the BLAKE3 hash of the content, so equal content
//! always gets the same address. The lowercase hex form is the stable key
//! used for file names and object keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{NbsError, Result};

/// Length of a content address in bytes
pub const ADDR_SIZE: usize = 20;

/// Fixed-length content hash identifying a chunk or a table
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentAddress([u8; ADDR_SIZE]);

impl ContentAddress {
    /// Compute the address of some content
    pub fn of(data: &[u8]) -> Self {
        Self::from_hash(&blake3::hash(data))
    }

    /// Truncate a finished BLAKE3 hash to an address
    pub(crate) fn from_hash(hash: &blake3::Hash) -> Self {
        let mut out = [0u8; ADDR_SIZE];
        out.copy_from_slice(&hash.as_bytes()[..ADDR_SIZE]);
        Self(out)
    }

    /// Wrap raw address bytes
    pub const fn from_bytes(bytes: [u8; ADDR_SIZE]) -> Self {
        Self(bytes)
    }

    /// Build an address from a slice that must be exactly `ADDR_SIZE` long
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; ADDR_SIZE] = bytes.try_into().map_err(|_| {
            NbsError::InvalidAddress(format!(
                "expected {} bytes, got {}",
                ADDR_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// The raw address bytes
    pub fn as_bytes(&self) -> &[u8; ADDR_SIZE] {
        &self.0
    }

    /// Hex encoding; this is the name tables are stored under
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentAddress({})", &self.to_hex()[..8])
    }
}

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ContentAddress {
    type Err = NbsError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|e| NbsError::InvalidAddress(format!("{}: {}", s, e)))?;
        Self::from_slice(&bytes)
    }
}
