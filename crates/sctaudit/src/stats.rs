//! Audit statistics tracking
//!
//! Counters are diagnostic only; nothing in the cache reads them back.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for auditing cache activity
#[derive(Debug, Default)]
pub struct AuditStats {
    new_subjects: AtomicU64,
    dedup_hits: AtomicU64,
    evictions: AtomicU64,
    reports_sampled: AtomicU64,
    skipped_disabled: AtomicU64,
    chain_encode_failures: AtomicU64,
    clears: AtomicU64,
}

impl AuditStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a previously unseen SCT set
    pub fn record_new_subject(&self) {
        self.new_subjects.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a deduplicated SCT set
    pub fn record_dedup_hit(&self) {
        self.dedup_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an LRU eviction
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a report selected by sampling
    pub fn record_sampled(&self) {
        self.reports_sampled.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a call made while auditing was off
    pub fn record_skipped_disabled(&self) {
        self.skipped_disabled.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a chain that fell back to empty
    pub fn record_chain_encode_failure(&self) {
        self.chain_encode_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache clear
    pub fn record_clear(&self) {
        self.clears.fetch_add(1, Ordering::Relaxed);
    }

    /// Total new subjects (cache misses)
    pub fn new_subjects(&self) -> u64 {
        self.new_subjects.load(Ordering::Relaxed)
    }

    /// Total dedup hits
    pub fn dedup_hits(&self) -> u64 {
        self.dedup_hits.load(Ordering::Relaxed)
    }

    /// Total evictions
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Total reports handed to the sink
    pub fn reports_sampled(&self) -> u64 {
        self.reports_sampled.load(Ordering::Relaxed)
    }

    /// Total no-op calls with auditing off
    pub fn skipped_disabled(&self) -> u64 {
        self.skipped_disabled.load(Ordering::Relaxed)
    }

    /// Total chain encode fallbacks
    pub fn chain_encode_failures(&self) -> u64 {
        self.chain_encode_failures.load(Ordering::Relaxed)
    }

    /// Total cache clears
    pub fn clears(&self) -> u64 {
        self.clears.load(Ordering::Relaxed)
    }

    /// Fraction of audited calls that were deduplicated (0.0 to 1.0)
    pub fn dedup_ratio(&self) -> f64 {
        let hits = self.dedup_hits();
        let total = hits + self.new_subjects();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    /// Reset all statistics
    pub fn reset(&self) {
        self.new_subjects.store(0, Ordering::Relaxed);
        self.dedup_hits.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
        self.reports_sampled.store(0, Ordering::Relaxed);
        self.skipped_disabled.store(0, Ordering::Relaxed);
        self.chain_encode_failures.store(0, Ordering::Relaxed);
        self.clears.store(0, Ordering::Relaxed);
    }
}
