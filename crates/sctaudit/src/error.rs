//! Error types for sctaudit

use std::io;

/// Result type alias for sctaudit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building inputs for the auditing cache.
///
/// None of these escape [`SctAuditingCache::maybe_enqueue_report`]; the
/// enqueue path degrades instead of failing.
///
/// [`SctAuditingCache::maybe_enqueue_report`]: crate::SctAuditingCache::maybe_enqueue_report
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Certificate at the given chain position has no DER bytes
    #[error("Certificate {0} in chain is empty")]
    EmptyCertificate(usize),

    /// Variable-length SCT field does not fit its 16-bit length prefix
    #[error("SCT {field} too long: {len} bytes (max 65535)")]
    FieldTooLong {
        /// Field name
        field: &'static str,
        /// Actual length
        len: usize,
    },

    /// Digest string is not 64 hex characters
    #[error("Invalid digest: {0}")]
    InvalidDigest(String),

    /// PEM input could not be read
    #[error("PEM error: {0}")]
    Pem(#[from] io::Error),
}
