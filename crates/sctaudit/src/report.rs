//! Audit report record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chain::ConnectionEndpoint;
use crate::sct::SctAndStatus;

/// Everything known about one newly observed SCT set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    /// When the set was first observed
    pub time_seen: DateTime<Utc>,
    /// Where it was first observed; not part of the cache key
    pub connection_endpoint: ConnectionEndpoint,
    /// PEM certificates, leaf first; empty if encoding failed
    pub certificate_chain: Vec<String>,
    /// SCTs in the order they were presented
    pub sct_entries: Vec<SctAndStatus>,
}
