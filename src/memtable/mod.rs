//! MemTable Module
//!
//! In-memory write buffer for chunks that are not yet persisted.
//!
//! ## Responsibilities
//! - Accept chunks and key them by content address
//! - Answer membership queries for not-yet-flushed chunks
//! - Track size for flush triggers
//! - Serialize into a table image, skipping chunks a `Haver` already has
//!
//! ## Data Structure Choice
//! BTreeMap wrapped in a parking_lot RwLock: address order is exactly the
//! order the table builder needs, so `write` is a single in-order pass.

mod table;

pub use table::MemTable;
