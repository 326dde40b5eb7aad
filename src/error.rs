//! Error types for the ipdb reader
//!
//! Every fallible operation returns [`IpdbError`]. The variants mirror the
//! ways a lookup can fail: a broken database file, a closed reader, an
//! address that is not in the dataset, or bad caller input.

use thiserror::Error;

/// Result type alias for ipdb operations
pub type Result<T> = std::result::Result<T, IpdbError>;

/// Main error type for ipdb operations
#[derive(Error, Debug)]
pub enum IpdbError {
    /// The database file is truncated or structurally inconsistent
    #[error("invalid database file: {0}")]
    InvalidFile(String),

    /// The JSON metadata header could not be decoded
    #[error("failed to parse metadata: {0}")]
    InvalidMetadata(#[source] serde_json::Error),

    /// I/O error while opening, mapping or reading the file
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The reader has been closed
    #[error("reader is closed")]
    Closed,

    /// The trie walk ended without reaching a record
    #[error("record not found")]
    NotFound,

    /// The address string is neither IPv4 nor IPv6
    #[error("invalid IP address: {0}")]
    InvalidIp(String),

    /// The language is not declared in the metadata
    #[error("unsupported language: {0}")]
    NoLanguage(String),
}

impl IpdbError {
    pub(crate) fn invalid_file(msg: impl Into<String>) -> Self {
        IpdbError::InvalidFile(msg.into())
    }

    /// Whether this error only means the address is absent from the dataset.
    pub fn is_not_found(&self) -> bool {
        matches!(self, IpdbError::NotFound)
    }
}
