//! SCT Audit Daemon - reads observed SCT sets, writes sampled audit reports

mod ingest;
mod pipeline;
mod reporter;

use anyhow::{Context, Result};
use clap::Parser;
use parking_lot::Mutex;
use sctaudit::{AuditConfig, SctAuditingCache};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tracing::info;

use crate::pipeline::AuditPolicy;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Observation input (JSON lines); stdin if omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Report output (JSON lines); stdout if omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file holding an AuditConfig
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cache capacity (distinct SCT sets)
    #[arg(short, long)]
    capacity: Option<usize>,

    /// Probability that a new SCT set is reported
    #[arg(short, long)]
    sampling_rate: Option<f64>,

    /// Run every observation as a no-op
    #[arg(long)]
    disable_auditing: bool,
}

impl Args {
    /// Config file (or enabled defaults) with CLI overrides applied
    fn resolve_config(&self) -> Result<AuditConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => AuditConfig {
                enabled: true,
                ..Default::default()
            },
        };

        if let Some(capacity) = self.capacity {
            config.cache_capacity = capacity;
        }
        if let Some(rate) = self.sampling_rate {
            config.sampling_rate = rate;
        }
        if self.disable_auditing {
            config.enabled = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<AuditConfig> {
    let text = std::fs::read_to_string(path)
        .context(format!("Failed to read config file: {:?}", path))?;
    serde_json::from_str(&text).context(format!("Failed to parse config file: {:?}", path))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let config = args.resolve_config()?;

    info!("Starting SCT Audit Daemon v{}", env!("CARGO_PKG_VERSION"));
    info!("Auditing enabled: {}", config.enabled);
    info!("Sampling rate: {}", config.sampling_rate);
    info!("Cache capacity: {}", config.cache_capacity);

    let cache = Arc::new(Mutex::new(SctAuditingCache::from_config(&config)?));
    let policy = AuditPolicy {
        enabled: config.enabled,
        sampling_rate: config.sampling_rate,
    };

    let input: Box<dyn AsyncBufRead + Unpin + Send> = match &args.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .context(format!("Failed to open input file: {:?}", path))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let output: Box<dyn AsyncWrite + Unpin + Send> = match &args.output {
        Some(path) => {
            let file = tokio::fs::File::create(path)
                .await
                .context(format!("Failed to create output file: {:?}", path))?;
            Box::new(file)
        }
        None => Box::new(tokio::io::stdout()),
    };

    let summary = pipeline::run(Arc::clone(&cache), policy, input, output).await?;

    let cache = cache.lock();
    let stats = cache.stats();
    info!(
        "Processed {} lines ({} observations, {} clears, {} malformed)",
        summary.lines, summary.observations, summary.clears, summary.malformed
    );
    info!(
        "New SCT sets: {}, deduplicated: {} ({:.1}%), evicted: {}",
        stats.new_subjects(),
        stats.dedup_hits(),
        stats.dedup_ratio() * 100.0,
        stats.evictions()
    );
    info!(
        "Reports sampled: {}, written: {}, cached now: {}",
        stats.reports_sampled(),
        summary.reports_written,
        cache.len()
    );

    Ok(())
}
