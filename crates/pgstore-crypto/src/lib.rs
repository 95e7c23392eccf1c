//! Digest providers for PGStore.
//!
//! Object identities are plain digests of payload bytes. This crate wraps the
//! established hash implementations behind the [`Digester`] trait so the
//! object codec can treat the hash function as a black box.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod digest;

pub use digest::{Blake3Digester, DigestAlgorithm, DigestError, Digester, Sha256Digester};
