//! Table specs
//!
//! A `TableSpec` references a persisted table without opening it. Lists of
//! specs are what a manifest records to describe a table set.

use serde::{Deserialize, Serialize};

use crate::addr::ContentAddress;
use crate::error::Result;

/// (name, chunk count) pair identifying a persisted table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableSpec {
    /// Table name, derived from its content
    pub name: ContentAddress,
    /// Number of chunks in the table
    pub chunk_count: u32,
}

impl TableSpec {
    pub fn new(name: ContentAddress, chunk_count: u32) -> Self {
        Self { name, chunk_count }
    }
}

/// Encode an ordered list of specs for exchange with a manifest
pub fn encode_specs(specs: &[TableSpec]) -> Result<Vec<u8>> {
    Ok(bincode::serialize(specs)?)
}

/// Decode a list produced by [`encode_specs`]
pub fn decode_specs(bytes: &[u8]) -> Result<Vec<TableSpec>> {
    Ok(bincode::deserialize(bytes)?)
}
