//! Error types for page indexing and highlight reconstruction.
//!
//! This module defines all error types that can occur while segmenting page
//! layouts, persisting page metadata and resolving query highlights.

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during indexing or highlight resolution.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No persisted metadata exists for the requested document page
    #[error("Page data not found: document '{document}', page {page}")]
    PageDataNotFound {
        /// Document identifier
        document: String,
        /// Page number (0-indexed)
        page: u32,
    },

    /// Layout tree violates an invariant (e.g. non-positive page width)
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// Degenerate or non-finite rectangle
    #[error("Invalid box: {0}")]
    InvalidBox(String),

    /// Store directory name that no document id encodes to
    #[error("Invalid document directory: {0}")]
    InvalidDocumentId(String),

    /// Failure reported by the external retrieval client
    #[error("Retrieval service error: {0}")]
    Retrieval(String),

    /// A single page failed during batch ingestion
    #[error("Failed to ingest page {page} of '{document}': {reason}")]
    Ingest {
        /// Document identifier
        document: String,
        /// Page number (0-indexed)
        page: u32,
        /// Reason for the failure
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns true for the recoverable "no data for this page" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::PageDataNotFound { .. })
    }
}
