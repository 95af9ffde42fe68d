//! SctAuditingCache: deduplicating, sampled LRU of audit reports

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::chain::{CertificateChain, ConnectionEndpoint};
use crate::config::AuditConfig;
use crate::digest::SctDigest;
use crate::error::Result;
use crate::lru::LruCache;
use crate::report::AuditReport;
use crate::sct::SctAndStatus;
use crate::stats::AuditStats;

/// What [`SctAuditingCache::maybe_enqueue_report`] did with a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Auditing was off; nothing was touched
    Disabled,
    /// SCT set already cached; recency refreshed only
    Deduplicated,
    /// New SCT set cached, not selected by sampling
    Cached,
    /// New SCT set cached and handed to the notify callback
    Sampled,
}

/// Fixed-capacity cache of audit reports keyed by SCT-list digest
///
/// Not internally synchronized. Hosts sharing one instance across threads
/// wrap it in their own lock.
pub struct SctAuditingCache {
    /// Reports keyed by SCT digest
    cache: LruCache<SctDigest, AuditReport>,

    /// Sampling source
    rng: StdRng,

    /// Activity counters
    stats: AuditStats,
}

impl SctAuditingCache {
    /// Create a cache holding up to `capacity` distinct SCT sets
    ///
    /// # Panics
    /// If `capacity` is 0. Use [`SctAuditingCache::from_config`] to get an
    /// error instead.
    pub fn new(capacity: usize) -> Self {
        Self::with_rng(capacity, StdRng::from_os_rng())
    }

    /// Create a cache with a caller-supplied sampling RNG
    pub fn with_rng(capacity: usize, rng: StdRng) -> Self {
        Self {
            cache: LruCache::new(capacity),
            rng,
            stats: AuditStats::new(),
        }
    }

    /// Validate `config` and create a cache sized from it
    pub fn from_config(config: &AuditConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.cache_capacity))
    }

    /// Record an SCT set seen on a connection, maybe reporting it
    ///
    /// # Arguments
    /// * `auditing_enabled` - When false the call does nothing at all
    /// * `sampling_rate` - Chance in `[0, 1]` that a new SCT set is reported
    /// * `endpoint` - Host and port the SCTs were served on
    /// * `chain` - Verified chain; sent empty if it fails to PEM-encode
    /// * `entries` - SCTs with their verification status, in served order
    /// * `notify` - Called with the hex digest iff a new set is sampled
    ///
    /// # Returns
    /// * `EnqueueOutcome` - Which path was taken
    pub fn maybe_enqueue_report<F>(
        &mut self,
        auditing_enabled: bool,
        sampling_rate: f64,
        endpoint: &ConnectionEndpoint,
        chain: &CertificateChain,
        entries: &[SctAndStatus],
        notify: F,
    ) -> EnqueueOutcome
    where
        F: FnOnce(String),
    {
        if !auditing_enabled {
            self.stats.record_skipped_disabled();
            return EnqueueOutcome::Disabled;
        }

        let digest = SctDigest::of(entries);

        if self.cache.get(&digest).is_some() {
            self.stats.record_dedup_hit();
            debug!("SCT set {} already cached, seen again on {}", digest, endpoint);
            return EnqueueOutcome::Deduplicated;
        }

        let certificate_chain = match chain.to_pem_chain() {
            Ok(pems) => pems,
            Err(e) => {
                self.stats.record_chain_encode_failure();
                warn!("Reporting SCT set {} with empty chain: {}", digest, e);
                Vec::new()
            }
        };

        let report = AuditReport {
            time_seen: Utc::now(),
            connection_endpoint: endpoint.clone(),
            certificate_chain,
            sct_entries: entries.to_vec(),
        };

        self.stats.record_new_subject();
        if self.cache.put(digest, report).is_some() {
            self.stats.record_eviction();
        }

        // Uniform on (0, 1], so a rate of 0 never fires and 1 always does
        let r = 1.0 - self.rng.random::<f64>();
        if r > sampling_rate {
            debug!("SCT set {} from {} cached, not sampled", digest, endpoint);
            return EnqueueOutcome::Cached;
        }

        self.stats.record_sampled();
        debug!("SCT set {} from {} sampled for reporting", digest, endpoint);
        notify(digest.to_hex());
        EnqueueOutcome::Sampled
    }

    /// Drop every cached report
    ///
    /// Fires no notifications. Statistics are kept.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.stats.record_clear();
    }

    /// Look up a report without refreshing its recency
    pub fn peek_report(&self, digest: &SctDigest) -> Option<&AuditReport> {
        self.cache.peek(digest)
    }

    /// Iterate reports from most to least recently seen, without
    /// refreshing recency
    pub fn iter(&self) -> impl Iterator<Item = (&SctDigest, &AuditReport)> + '_ {
        self.cache.iter()
    }

    /// Number of cached SCT sets
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Maximum number of cached SCT sets
    pub fn capacity(&self) -> usize {
        self.cache.capacity()
    }

    /// Activity counters
    pub fn stats(&self) -> &AuditStats {
        &self.stats
    }
}
