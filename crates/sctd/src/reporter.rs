//! Report sink
//!
//! Drains sampled reports from a channel and writes them as JSON lines.
//! Delivery is fire-and-forget: a failed write is logged and the report
//! dropped.

use anyhow::Result;
use sctaudit::AuditReport;
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error};

/// A report selected by sampling, keyed by its hex digest
#[derive(Debug, Clone, Serialize)]
pub struct SampledReport {
    pub digest: String,
    pub report: AuditReport,
}

/// Write every received report until the channel closes
///
/// # Returns
/// * `Result<u64>` - Number of reports written
pub async fn run_reporter<W>(mut rx: UnboundedReceiver<SampledReport>, output: W) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut writer = BufWriter::new(output);
    let mut written = 0u64;

    while let Some(sampled) = rx.recv().await {
        let mut line = match serde_json::to_vec(&sampled) {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to encode report {}: {}", sampled.digest, e);
                continue;
            }
        };
        line.push(b'\n');

        if let Err(e) = writer.write_all(&line).await {
            error!("Failed to write report {}: {}", sampled.digest, e);
            continue;
        }
        debug!("Wrote report {}", sampled.digest);
        written += 1;
    }

    writer.flush().await?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sctaudit::ConnectionEndpoint;
    use tokio::sync::mpsc;

    fn sampled(digest: &str) -> SampledReport {
        SampledReport {
            digest: digest.to_string(),
            report: AuditReport {
                time_seen: Utc::now(),
                connection_endpoint: ConnectionEndpoint::new("example.com", 443),
                certificate_chain: Vec::new(),
                sct_entries: Vec::new(),
            },
        }
    }

    #[tokio::test]
    async fn test_reporter_writes_json_lines() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(sampled("aa")).unwrap();
        tx.send(sampled("bb")).unwrap();
        drop(tx);

        let mut out = Vec::new();
        let written = run_reporter(rx, &mut out).await.unwrap();

        assert_eq!(written, 2);
        let lines: Vec<serde_json::Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["digest"], "aa");
        assert_eq!(lines[1]["report"]["connection_endpoint"]["host"], "example.com");
    }

    #[tokio::test]
    async fn test_reporter_empty_channel() {
        let (tx, rx) = mpsc::unbounded_channel::<SampledReport>();
        drop(tx);

        let mut out = Vec::new();
        assert_eq!(run_reporter(rx, &mut out).await.unwrap(), 0);
        assert!(out.is_empty());
    }
}
