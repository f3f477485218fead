//! # nbs
//!
//! Persistent chunk-table storage for a content-addressed block store:
//! - Immutable tables of content-addressed chunks with a sorted index
//! - Local (mmap) and remote (HTTP byte-range) table readers
//! - Persisters that flush a write buffer into a deduplicated table
//! - Copy-on-write table sets safe to share across threads
//!
//! ## Architecture Overview
//!
//! ```text
//!   ┌─────────────┐   prepend / union   ┌─────────────┐
//!   │  MemTable   │────────────────────▶│  TableSet   │  (immutable values)
//!   │  (buffer)   │                     └──────┬──────┘
//!   └─────────────┘                            │
//!                                              ▼
//!                                   ┌─────────────────────┐
//!                                   │   TablePersister    │
//!                                   │  compact  /  open   │
//!                                   └──────────┬──────────┘
//!                          ┌───────────────────┴───────────────────┐
//!                          ▼                                       ▼
//!                 ┌─────────────────┐                     ┌─────────────────┐
//!                 │ FsTablePersister│                     │RemoteTable-     │
//!                 │ temp + rename   │                     │Persister (PUT)  │
//!                 └────────┬────────┘                     └────────┬────────┘
//!                          ▼                                       ▼
//!                 ┌─────────────────┐                     ┌─────────────────┐
//!                 │ MmapTableReader │                     │RemoteTableReader│
//!                 └────────┬────────┘                     └────────┬────────┘
//!                          └──────────── TableReader ──────────────┘
//!                                    (index + footer)
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod addr;
pub mod table_spec;
pub mod table;
pub mod memtable;
pub mod object_store;
pub mod source;
pub mod persister;
pub mod table_set;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{NbsError, Result};
pub use config::{Backend, Config};
pub use addr::ContentAddress;
pub use table_spec::{decode_specs, encode_specs, TableSpec};
pub use memtable::MemTable;
pub use source::{ChunkSource, Haver, NoChunks};
pub use persister::{FsTablePersister, RemoteTablePersister, TablePersister};
pub use table_set::TableSet;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of nbs
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
