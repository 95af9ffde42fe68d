//! Feeds input records through the auditing cache

use anyhow::Result;
use parking_lot::Mutex;
use sctaudit::{EnqueueOutcome, SctAuditingCache, SctDigest};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info, warn};

use crate::ingest::{parse_line, InputRecord, Observation};
use crate::reporter::{run_reporter, SampledReport};

/// Per-call auditing parameters, resolved once at startup
#[derive(Debug, Clone, Copy)]
pub struct AuditPolicy {
    /// Whether observations are audited at all
    pub enabled: bool,
    /// Chance in `[0, 1]` that a new SCT set is reported
    pub sampling_rate: f64,
}

/// Counts for one run over an input stream
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Input lines read, including blank and malformed ones
    pub lines: u64,
    /// Lines skipped as undecodable or unparsable
    pub malformed: u64,
    /// Observation records run through the cache
    pub observations: u64,
    /// Clear records applied
    pub clears: u64,
    /// Reports the sink wrote out
    pub reports_written: u64,
}

/// Owns the shared cache handle and the report channel
pub struct Pipeline {
    cache: Arc<Mutex<SctAuditingCache>>,
    policy: AuditPolicy,
    reports: UnboundedSender<SampledReport>,
}

impl Pipeline {
    /// Wrap a shared cache and the reporter's sender
    pub fn new(
        cache: Arc<Mutex<SctAuditingCache>>,
        policy: AuditPolicy,
        reports: UnboundedSender<SampledReport>,
    ) -> Self {
        Self {
            cache,
            policy,
            reports,
        }
    }

    /// Run one observation through the cache, forwarding a sampled report
    pub fn observe(&self, obs: &Observation) -> EnqueueOutcome {
        let endpoint = obs.endpoint();
        let chain = obs.chain();

        let mut sampled = None;
        let mut cache = self.cache.lock();
        let outcome = cache.maybe_enqueue_report(
            self.policy.enabled,
            self.policy.sampling_rate,
            &endpoint,
            &chain,
            &obs.scts,
            |digest| sampled = Some(digest),
        );

        let Some(digest) = sampled else {
            return outcome;
        };

        let report = digest
            .parse::<SctDigest>()
            .ok()
            .and_then(|d| cache.peek_report(&d).cloned());
        drop(cache);

        match report {
            Some(report) => {
                if self.reports.send(SampledReport { digest, report }).is_err() {
                    warn!("Report sink closed, dropping report for {}", endpoint);
                }
            }
            None => warn!("Sampled report {} vanished before send", digest),
        }

        outcome
    }

    /// Empty the shared cache
    pub fn clear(&self) {
        self.cache.lock().clear_cache();
        info!("SCT auditing cache cleared");
    }
}

/// Process every line of `input`, writing sampled reports to `output`
///
/// The reporter is drained before returning, even if reading fails.
pub async fn run<R, W>(
    cache: Arc<Mutex<SctAuditingCache>>,
    policy: AuditPolicy,
    input: R,
    output: W,
) -> Result<RunSummary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let reporter = tokio::spawn(run_reporter(rx, output));
    let pipeline = Pipeline::new(cache, policy, tx);

    let mut summary = RunSummary::default();
    let read = read_records(&pipeline, input, &mut summary).await;

    // Closing the channel lets the reporter drain and exit
    drop(pipeline);
    let written = reporter.await?;

    read?;
    summary.reports_written = written?;
    Ok(summary)
}

async fn read_records<R>(pipeline: &Pipeline, mut input: R, summary: &mut RunSummary) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }
        summary.lines += 1;

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(e) => {
                summary.malformed += 1;
                warn!("Skipping line {}: not UTF-8: {}", summary.lines, e);
                continue;
            }
        };

        match parse_line(line) {
            Ok(Some(InputRecord::Observation(obs))) => {
                summary.observations += 1;
                let outcome = pipeline.observe(&obs);
                debug!("{}:{} -> {:?}", obs.host, obs.port, outcome);
            }
            Ok(Some(InputRecord::Clear)) => {
                summary.clears += 1;
                pipeline.clear();
            }
            Ok(None) => {}
            Err(e) => {
                summary.malformed += 1;
                warn!("Skipping line {}: {:#}", summary.lines, e);
            }
        }
    }
}
