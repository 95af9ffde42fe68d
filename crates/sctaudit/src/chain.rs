//! Connection endpoints and certificate chains

use std::fmt;
use std::io::BufRead;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rustls_pki_types::CertificateDer;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const PEM_LINE_WIDTH: usize = 64;

/// Remote host and port a set of SCTs was observed on
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionEndpoint {
    /// Hostname or IP literal
    pub host: String,
    /// TCP port
    pub port: u16,
}

impl ConnectionEndpoint {
    /// Create an endpoint
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ConnectionEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Validated leaf-to-root certificate chain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateChain {
    certs: Vec<CertificateDer<'static>>,
}

impl CertificateChain {
    /// Wrap DER certificates, leaf first
    pub fn from_der(certs: Vec<CertificateDer<'static>>) -> Self {
        Self { certs }
    }

    /// Read every `CERTIFICATE` block from PEM input
    pub fn from_pem<R: BufRead>(reader: &mut R) -> Result<Self> {
        let certs = rustls_pemfile::certs(reader).collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { certs })
    }

    /// Certificates, leaf first
    pub fn certs(&self) -> &[CertificateDer<'static>] {
        &self.certs
    }

    /// Number of certificates
    pub fn len(&self) -> usize {
        self.certs.len()
    }

    /// Check if the chain is empty
    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    /// PEM-encode every certificate in chain order
    ///
    /// Fails if any certificate has no DER content.
    pub fn to_pem_chain(&self) -> Result<Vec<String>> {
        self.certs
            .iter()
            .enumerate()
            .map(|(i, cert)| {
                if cert.is_empty() {
                    Err(Error::EmptyCertificate(i))
                } else {
                    Ok(encode_pem(cert))
                }
            })
            .collect()
    }
}

fn encode_pem(der: &[u8]) -> String {
    let b64 = STANDARD.encode(der);
    let mut out = String::with_capacity(b64.len() + b64.len() / PEM_LINE_WIDTH + 64);
    out.push_str("-----BEGIN CERTIFICATE-----\n");
    // base64 output is ASCII, so byte chunks are valid str boundaries
    for line in b64.as_bytes().chunks(PEM_LINE_WIDTH) {
        out.push_str(std::str::from_utf8(line).unwrap_or_default());
        out.push('\n');
    }
    out.push_str("-----END CERTIFICATE-----\n");
    out
}
