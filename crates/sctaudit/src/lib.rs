//! # sctaudit
//!
//! Deduplicating, randomly sampled cache deciding which Certificate
//! Transparency SCT sets get reported to an audit collector.
//!
//! ## Architecture
//! - **Digest**: SHA-256 over the RFC 6962 encoding of each SCT, in order
//! - **LRU**: AHash map plus index-linked list, O(1) lookup and eviction
//! - **Sampling**: one draw per newly cached SCT set, never on dedup hits
//!
//! ```no_run
//! use sctaudit::{CertificateChain, ConnectionEndpoint, SctAuditingCache};
//!
//! let mut cache = SctAuditingCache::new(1024);
//! let endpoint = ConnectionEndpoint::new("example.com", 443);
//! cache.maybe_enqueue_report(
//!     true,
//!     0.0001,
//!     &endpoint,
//!     &CertificateChain::default(),
//!     &[],
//!     |digest| println!("report {digest}"),
//! );
//! ```

#![warn(missing_docs)]

mod cache;
mod chain;
mod config;
mod digest;
mod error;
mod lru;
mod report;
mod sct;
mod stats;

pub use cache::{EnqueueOutcome, SctAuditingCache};
pub use chain::{CertificateChain, ConnectionEndpoint};
pub use config::{AuditConfig, DEFAULT_CACHE_CAPACITY};
pub use digest::SctDigest;
pub use error::{Error, Result};
pub use report::AuditReport;
pub use sct::{
    DigitallySigned, HashAlgorithm, SctAndStatus, SctOrigin, SctVerifyStatus, SctVersion,
    SignatureAlgorithm, SignedCertificateTimestamp,
};
pub use stats::AuditStats;
