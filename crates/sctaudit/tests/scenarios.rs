//! End-to-end behaviour of the auditing cache through its public API

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sctaudit::{
    CertificateChain, ConnectionEndpoint, DigitallySigned, HashAlgorithm, SctAndStatus,
    SctAuditingCache, SctOrigin, SctVerifyStatus, SctVersion, SignatureAlgorithm,
    SignedCertificateTimestamp,
};
use sha2::{Digest, Sha256};

fn sct(seed: u8) -> SignedCertificateTimestamp {
    SignedCertificateTimestamp::new(
        SctVersion::V1,
        [seed; 32],
        1_700_000_000_000 + seed as u64,
        Vec::new(),
        DigitallySigned {
            hash_algorithm: HashAlgorithm::Sha256,
            signature_algorithm: SignatureAlgorithm::Ecdsa,
            signature: vec![0x30, seed],
        },
        SctOrigin::TlsExtension,
    )
    .unwrap()
}

fn sct_set(seeds: &[u8]) -> Vec<SctAndStatus> {
    seeds
        .iter()
        .map(|&s| SctAndStatus::new(sct(s), SctVerifyStatus::Ok))
        .collect()
}

fn expected_hex(entries: &[SctAndStatus]) -> String {
    let mut concat = Vec::new();
    for entry in entries {
        concat.extend(entry.sct.serialize());
    }
    hex::encode(Sha256::digest(&concat))
}

struct Harness {
    cache: SctAuditingCache,
    notified: Vec<String>,
}

impl Harness {
    fn new(capacity: usize) -> Self {
        Self {
            cache: SctAuditingCache::with_rng(capacity, StdRng::seed_from_u64(42)),
            notified: Vec::new(),
        }
    }

    fn enqueue(&mut self, enabled: bool, rate: f64, host: &str, entries: &[SctAndStatus]) {
        let notified = &mut self.notified;
        self.cache.maybe_enqueue_report(
            enabled,
            rate,
            &ConnectionEndpoint::new(host, 443),
            &CertificateChain::default(),
            entries,
            |hex| notified.push(hex),
        );
    }

    fn hosts(&self) -> Vec<String> {
        let mut hosts: Vec<String> = self
            .cache
            .iter()
            .map(|(_, report)| report.connection_endpoint.host.clone())
            .collect();
        hosts.sort();
        hosts
    }
}

#[test]
fn test_first_sighting_notifies_with_digest() {
    let mut h = Harness::new(10);
    let s1 = sct_set(&[1, 2, 3]);

    h.enqueue(true, 1.0, "example.com", &s1);

    assert_eq!(h.cache.len(), 1);
    assert_eq!(h.notified, vec![expected_hex(&s1)]);
}

#[test]
fn test_repeat_sighting_is_deduplicated() {
    let mut h = Harness::new(10);
    let s1 = sct_set(&[1, 2, 3]);

    h.enqueue(true, 1.0, "example.com", &s1);
    h.enqueue(true, 1.0, "example.org", &s1);

    assert_eq!(h.cache.len(), 1);
    assert_eq!(h.notified.len(), 1);
}

#[test]
fn test_capacity_two_evicts_oldest() {
    let mut h = Harness::new(2);

    h.enqueue(true, 1.0, "a.example", &sct_set(&[1]));
    h.enqueue(true, 1.0, "b.example", &sct_set(&[2]));
    assert_eq!(h.cache.len(), 2);

    h.enqueue(true, 1.0, "c.example", &sct_set(&[3]));

    assert_eq!(h.cache.len(), 2);
    assert_eq!(h.hosts(), vec!["b.example", "c.example"]);
}

#[test]
fn test_dedup_hit_refreshes_recency() {
    let mut h = Harness::new(2);
    let a = sct_set(&[1]);

    h.enqueue(true, 1.0, "a.example", &a);
    h.enqueue(true, 1.0, "b.example", &sct_set(&[2]));
    h.enqueue(true, 1.0, "a-again.example", &a);
    h.enqueue(true, 1.0, "c.example", &sct_set(&[3]));

    assert_eq!(h.hosts(), vec!["a.example", "c.example"]);
    assert_eq!(h.notified.len(), 3);
}

#[test]
fn test_disabled_leaves_cache_empty() {
    let mut h = Harness::new(10);

    h.enqueue(false, 1.0, "example.com", &sct_set(&[1]));

    assert_eq!(h.cache.len(), 0);
    assert!(h.notified.is_empty());
}

#[test]
fn test_empty_sct_list_is_a_subject() {
    let mut h = Harness::new(10);

    h.enqueue(true, 1.0, "example.com", &[]);

    assert_eq!(h.cache.len(), 1);
    assert_eq!(
        h.notified,
        vec!["e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"]
    );
}

#[test]
fn test_clear_cache_fires_nothing() {
    let mut h = Harness::new(10);
    for seed in 0..5 {
        h.enqueue(true, 1.0, "example.com", &sct_set(&[seed]));
    }
    assert_eq!(h.cache.len(), 5);
    let before = h.notified.len();

    h.cache.clear_cache();

    assert_eq!(h.cache.len(), 0);
    assert_eq!(h.notified.len(), before);
}

#[test]
fn test_reordered_scts_are_distinct() {
    let mut h = Harness::new(10);

    h.enqueue(true, 1.0, "example.com", &sct_set(&[1, 2]));
    h.enqueue(true, 1.0, "example.com", &sct_set(&[2, 1]));

    assert_eq!(h.cache.len(), 2);
    assert_eq!(h.notified.len(), 2);
}

#[test]
fn test_capacity_one_churn() {
    let mut h = Harness::new(1);

    for seed in 0..20 {
        h.enqueue(true, 1.0, "example.com", &sct_set(&[seed % 3]));
        assert_eq!(h.cache.len(), 1);
    }
    // Every call evicts the previous set, so every call is new
    assert_eq!(h.notified.len(), 20);
}

#[test]
fn test_iteration_does_not_touch_recency() {
    let mut h = Harness::new(2);

    h.enqueue(true, 0.0, "a.example", &sct_set(&[1]));
    h.enqueue(true, 0.0, "b.example", &sct_set(&[2]));
    assert_eq!(h.cache.iter().count(), 2);
    h.enqueue(true, 0.0, "c.example", &sct_set(&[3]));

    assert_eq!(h.hosts(), vec!["b.example", "c.example"]);
}

proptest! {
    #[test]
    fn prop_size_never_exceeds_capacity(
        capacity in 1usize..8,
        calls in prop::collection::vec((any::<bool>(), prop::collection::vec(0u8..12, 0..4)), 0..64),
    ) {
        let mut h = Harness::new(capacity);
        for (enabled, seeds) in &calls {
            h.enqueue(*enabled, 0.5, "example.com", &sct_set(seeds));
            prop_assert!(h.cache.len() <= capacity);
        }
    }

    #[test]
    fn prop_repeat_grows_by_at_most_one(
        prefill in prop::collection::vec(prop::collection::vec(0u8..8, 0..3), 0..6),
        seeds in prop::collection::vec(0u8..8, 0..4),
    ) {
        let mut h = Harness::new(16);
        for p in &prefill {
            h.enqueue(true, 1.0, "prefill.example", &sct_set(p));
        }
        let before = h.cache.len();
        let notified_before = h.notified.len();

        h.enqueue(true, 1.0, "one.example", &sct_set(&seeds));
        h.enqueue(true, 1.0, "two.example", &sct_set(&seeds));

        prop_assert!(h.cache.len() <= before + 1);
        prop_assert!(h.notified.len() <= notified_before + 1);
    }

    #[test]
    fn prop_full_rate_notifies_once_per_distinct_set(
        sets in prop::collection::vec(prop::collection::vec(0u8..6, 0..3), 1..32),
    ) {
        let mut h = Harness::new(64);
        for s in &sets {
            h.enqueue(true, 1.0, "example.com", &sct_set(s));
        }

        let mut distinct = sets.clone();
        distinct.sort();
        distinct.dedup();
        prop_assert_eq!(h.notified.len(), distinct.len());
        prop_assert_eq!(h.cache.len(), distinct.len());
    }

    #[test]
    fn prop_zero_rate_never_notifies(
        sets in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..3), 0..32),
    ) {
        let mut h = Harness::new(8);
        for s in &sets {
            h.enqueue(true, 0.0, "example.com", &sct_set(s));
        }
        prop_assert!(h.notified.is_empty());
    }
}
