//! Cache key: SHA-256 over the serialized SCT list

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Error;
use crate::sct::SctAndStatus;

/// 256-bit identity of an SCT list
///
/// Two lists map to the same digest iff their serialized SCTs are
/// byte-identical in the same order. Verification status is not hashed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SctDigest(#[serde(with = "hex")] [u8; 32]);

impl SctDigest {
    /// Digest an ordered SCT list
    pub fn of(entries: &[SctAndStatus]) -> Self {
        let mut hasher = Sha256::new();
        let mut buf = Vec::new();
        for entry in entries {
            buf.clear();
            entry.sct.serialize_into(&mut buf);
            hasher.update(&buf);
        }
        Self(hasher.finalize().into())
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex form, as handed to report sinks
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for SctDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for SctDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SctDigest({})", self.to_hex())
    }
}

impl FromStr for SctDigest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| Error::InvalidDigest(e.to_string()))?;
        Ok(Self(bytes))
    }
}
