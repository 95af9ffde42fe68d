//! Auditing configuration

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default number of distinct SCT sets remembered
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Auditing knobs resolved by the host
///
/// `enabled` and `sampling_rate` are what the host passes to each
/// [`maybe_enqueue_report`](crate::SctAuditingCache::maybe_enqueue_report)
/// call; only `cache_capacity` is consumed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Whether auditing runs at all
    pub enabled: bool,
    /// Probability in `[0, 1]` that a new SCT set is reported
    pub sampling_rate: f64,
    /// Maximum distinct SCT sets held
    pub cache_capacity: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sampling_rate: 0.0,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl AuditConfig {
    /// Reject zero capacity and out-of-range sampling rates
    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            return Err(Error::InvalidConfig(
                "cache_capacity must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.sampling_rate) {
            return Err(Error::InvalidConfig(format!(
                "sampling_rate must be within [0, 1], got {}",
                self.sampling_rate
            )));
        }
        Ok(())
    }
}
