//! Signed Certificate Timestamps and their canonical wire encoding
//!
//! The encoding follows RFC 6962 section 3.2. It is the byte string the
//! audit digest is computed over, so it must stay stable.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest field that fits behind a 16-bit length prefix
const MAX_OPAQUE_LEN: usize = u16::MAX as usize;

/// SCT structure version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SctVersion {
    /// v1 (RFC 6962)
    V1 = 0,
}

/// TLS HashAlgorithm registry value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// None
    None = 0,
    /// MD5
    Md5 = 1,
    /// SHA1
    Sha1 = 2,
    /// SHA224
    Sha224 = 3,
    /// SHA256
    Sha256 = 4,
    /// SHA384
    Sha384 = 5,
    /// SHA512
    Sha512 = 6,
}

/// TLS SignatureAlgorithm registry value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureAlgorithm {
    /// Anonymous
    Anonymous = 0,
    /// RSA
    Rsa = 1,
    /// DSA
    Dsa = 2,
    /// ECDSA
    Ecdsa = 3,
}

/// Where the SCT was delivered. Not part of the wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SctOrigin {
    /// Embedded in the leaf certificate
    Embedded,
    /// TLS `signed_certificate_timestamp` extension
    TlsExtension,
    /// Stapled OCSP response
    Ocsp,
}

/// Result of upstream SCT verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SctVerifyStatus {
    /// Signature verified against a known log
    Ok,
    /// Issued by a log we don't know
    LogUnknown,
    /// Known log, bad signature
    InvalidSignature,
    /// Timestamp in the future
    InvalidTimestamp,
}

/// `DigitallySigned` struct from RFC 5246
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DigitallySigned {
    /// Hash half of the signature scheme
    pub hash_algorithm: HashAlgorithm,
    /// Signature half of the signature scheme
    pub signature_algorithm: SignatureAlgorithm,
    /// Raw signature bytes
    #[serde(with = "hex")]
    pub signature: Vec<u8>,
}

/// A Signed Certificate Timestamp issued by a CT log
///
/// Fields are private so that every value is encodable: the variable-length
/// fields are checked once, at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SctFields")]
pub struct SignedCertificateTimestamp {
    version: SctVersion,
    #[serde(with = "hex")]
    log_id: [u8; 32],
    timestamp: u64,
    #[serde(with = "hex")]
    extensions: Vec<u8>,
    signature: DigitallySigned,
    origin: SctOrigin,
}

#[derive(Deserialize)]
struct SctFields {
    version: SctVersion,
    #[serde(with = "hex")]
    log_id: [u8; 32],
    timestamp: u64,
    #[serde(with = "hex", default)]
    extensions: Vec<u8>,
    signature: DigitallySigned,
    origin: SctOrigin,
}

impl TryFrom<SctFields> for SignedCertificateTimestamp {
    type Error = Error;

    fn try_from(f: SctFields) -> Result<Self> {
        Self::new(
            f.version,
            f.log_id,
            f.timestamp,
            f.extensions,
            f.signature,
            f.origin,
        )
    }
}

impl SignedCertificateTimestamp {
    /// Build an SCT, rejecting fields too long to encode
    ///
    /// # Arguments
    /// * `log_id` - SHA-256 of the log's public key
    /// * `timestamp` - Milliseconds since the Unix epoch
    pub fn new(
        version: SctVersion,
        log_id: [u8; 32],
        timestamp: u64,
        extensions: Vec<u8>,
        signature: DigitallySigned,
        origin: SctOrigin,
    ) -> Result<Self> {
        check_len("extensions", &extensions)?;
        check_len("signature", &signature.signature)?;

        Ok(Self {
            version,
            log_id,
            timestamp,
            extensions,
            signature,
            origin,
        })
    }

    /// Structure version
    pub fn version(&self) -> SctVersion {
        self.version
    }

    /// Issuing log ID
    pub fn log_id(&self) -> &[u8; 32] {
        &self.log_id
    }

    /// Issuance time, ms since epoch
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Opaque CT extensions
    pub fn extensions(&self) -> &[u8] {
        &self.extensions
    }

    /// Log signature
    pub fn signature(&self) -> &DigitallySigned {
        &self.signature
    }

    /// Delivery channel
    pub fn origin(&self) -> SctOrigin {
        self.origin
    }

    /// Encode to RFC 6962 wire format
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            1 + 32 + 8 + 2 + self.extensions.len() + 2 + 2 + self.signature.signature.len(),
        );
        self.serialize_into(&mut out);
        out
    }

    /// Append the wire encoding to `out`
    pub fn serialize_into(&self, out: &mut Vec<u8>) {
        out.push(self.version as u8);
        out.extend_from_slice(&self.log_id);
        out.extend_from_slice(&self.timestamp.to_be_bytes());
        write_opaque16(out, &self.extensions);
        out.push(self.signature.hash_algorithm as u8);
        out.push(self.signature.signature_algorithm as u8);
        write_opaque16(out, &self.signature.signature);
    }
}

/// An SCT together with its verification result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SctAndStatus {
    /// The timestamp
    pub sct: SignedCertificateTimestamp,
    /// Upstream verification result
    pub status: SctVerifyStatus,
}

impl SctAndStatus {
    /// Pair an SCT with its status
    pub fn new(sct: SignedCertificateTimestamp, status: SctVerifyStatus) -> Self {
        Self { sct, status }
    }
}

fn check_len(field: &'static str, bytes: &[u8]) -> Result<()> {
    if bytes.len() > MAX_OPAQUE_LEN {
        return Err(Error::FieldTooLong {
            field,
            len: bytes.len(),
        });
    }
    Ok(())
}

fn write_opaque16(out: &mut Vec<u8>, bytes: &[u8]) {
    // Length checked at construction
    out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
    out.extend_from_slice(bytes);
}
