//! Error types for nbs
//!
//! Provides a unified error type for all operations.
//!
//! Every failure at this layer is fatal to the operation that hit it: nothing
//! here retries. Callers that want a retry policy re-run the whole higher
//! level operation (e.g. a flush).

use thiserror::Error;

use crate::addr::ContentAddress;

/// Result type alias using NbsError
pub type Result<T> = std::result::Result<T, NbsError>;

/// Unified error type for nbs operations
#[derive(Debug, Error)]
pub enum NbsError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Object store returned status {status} for {key}")]
    HttpStatus { key: String, status: u16 },

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    // -------------------------------------------------------------------------
    // Integrity Errors
    // -------------------------------------------------------------------------
    #[error("Table {table} declares {actual} chunks, expected {expected}")]
    ChunkCountMismatch {
        table: ContentAddress,
        expected: u32,
        actual: u32,
    },

    #[error("Content length mismatch for {key}: requested {expected} bytes, got {actual}")]
    ContentLengthMismatch {
        key: String,
        expected: u64,
        actual: u64,
    },

    #[error("Corrupt table: {0}")]
    CorruptTable(String),

    // -------------------------------------------------------------------------
    // Usage Errors
    // -------------------------------------------------------------------------
    #[error("Chunk source {0} is closed")]
    SourceClosed(ContentAddress),

    #[error("Invalid content address: {0}")]
    InvalidAddress(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Aggregated Errors
    // -------------------------------------------------------------------------
    #[error("{} storage errors: {:?}", .0.len(), .0)]
    Multiple(Vec<NbsError>),
}

impl NbsError {
    /// True if the error means a stored object is not what its name claims.
    pub fn is_integrity(&self) -> bool {
        matches!(
            self,
            NbsError::ChunkCountMismatch { .. }
                | NbsError::ContentLengthMismatch { .. }
                | NbsError::CorruptTable(_)
        )
    }

    /// Fold a list of errors into one; `None` if the list is empty.
    pub(crate) fn collect(mut errors: Vec<NbsError>) -> Option<NbsError> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(NbsError::Multiple(errors)),
        }
    }
}

impl From<bincode::Error> for NbsError {
    fn from(e: bincode::Error) -> Self {
        NbsError::Serialization(e.to_string())
    }
}
