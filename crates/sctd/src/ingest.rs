//! Observation input records
//!
//! One JSON document per line, tagged by `type`:
//!
//! ```text
//! {"type":"observation","host":"example.com","port":443,"chain_pem":"...","scts":[...]}
//! {"type":"clear"}
//! ```

use anyhow::{Context, Result};
use sctaudit::{CertificateChain, ConnectionEndpoint, SctAndStatus};
use serde::Deserialize;
use std::io::Cursor;
use tracing::warn;

/// A parsed input line
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputRecord {
    /// SCTs seen on a completed TLS handshake
    Observation(Observation),
    /// Forget every cached SCT set
    Clear,
}

/// SCTs and chain observed on one connection
#[derive(Debug, Deserialize)]
pub struct Observation {
    /// Server hostname or IP literal
    pub host: String,
    /// Server TCP port
    pub port: u16,
    /// Concatenated PEM certificates, leaf first
    #[serde(default)]
    pub chain_pem: Option<String>,
    /// SCTs with verification status, in served order
    #[serde(default)]
    pub scts: Vec<SctAndStatus>,
}

impl Observation {
    /// Host and port as an endpoint
    pub fn endpoint(&self) -> ConnectionEndpoint {
        ConnectionEndpoint::new(self.host.clone(), self.port)
    }

    /// Parse the PEM chain, falling back to an empty chain
    pub fn chain(&self) -> CertificateChain {
        let Some(pem) = &self.chain_pem else {
            return CertificateChain::default();
        };

        match CertificateChain::from_pem(&mut Cursor::new(pem.as_bytes())) {
            Ok(chain) => chain,
            Err(e) => {
                warn!("Unreadable chain for {}:{}: {}", self.host, self.port, e);
                CertificateChain::default()
            }
        }
    }
}

/// Parse one input line; blank lines and `#` comments yield `None`
pub fn parse_line(line: &str) -> Result<Option<InputRecord>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let record = serde_json::from_str(line).context("Invalid input record")?;
    Ok(Some(record))
}
