use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use pgstore_types::object::DIGEST_LEN;
use pgstore_types::ObjectId;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

/// A deterministic, infallible digest function producing object identities.
pub trait Digester: Send + Sync {
    /// Digest raw bytes.
    fn digest(&self, data: &[u8]) -> ObjectId;

    /// The algorithm this digester implements.
    fn algorithm(&self) -> DigestAlgorithm;

    /// Verify that data produces the expected object ID.
    fn verify(&self, data: &[u8], expected: &ObjectId) -> bool {
        self.digest(data) == *expected
    }
}

/// BLAKE3 digester (the default).
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3Digester;

impl Digester for Blake3Digester {
    fn digest(&self, data: &[u8]) -> ObjectId {
        ObjectId::from_hash(*blake3::hash(data).as_bytes())
    }

    fn algorithm(&self) -> DigestAlgorithm {
        DigestAlgorithm::Blake3
    }
}

/// SHA-256 digester, for peers that exchange SHA-256 identities.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Digester;

impl Digester for Sha256Digester {
    fn digest(&self, data: &[u8]) -> ObjectId {
        let mut hash = [0u8; DIGEST_LEN];
        hash.copy_from_slice(&Sha256::digest(data));
        ObjectId::from_hash(hash)
    }

    fn algorithm(&self) -> DigestAlgorithm {
        DigestAlgorithm::Sha256
    }
}

/// Selector for the digest provider, as it appears in configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Blake3,
    Sha256,
}

impl DigestAlgorithm {
    /// Build a shareable digester for this algorithm.
    pub fn digester(self) -> Arc<dyn Digester> {
        match self {
            Self::Blake3 => Arc::new(Blake3Digester),
            Self::Sha256 => Arc::new(Sha256Digester),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blake3 => "blake3",
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blake3" => Ok(Self::Blake3),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            other => Err(DigestError::UnknownAlgorithm(other.to_owned())),
        }
    }
}

/// Errors from digest selection.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DigestError {
    #[error("unknown digest algorithm: {0}")]
    UnknownAlgorithm(String),
}
