//! Foundation types for PGStore.
//!
//! Every other PGStore crate depends on `pgstore-types` for the identifiers
//! that tie content-addressed objects together.
//!
//! # Key Types
//!
//! - [`ObjectId`]: fixed-size digest of an object's raw payload
//! - [`DigestRef`]: weak textual reference to another object's identity

pub mod error;
pub mod object;
pub mod reference;

pub use error::TypeError;
pub use object::ObjectId;
pub use reference::DigestRef;
