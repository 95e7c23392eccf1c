//! Content-addressed objects for PGStore.
//!
//! Domain entities are serialized into self-describing records whose identity
//! is the digest of their payload, and groups of independently produced
//! records are collected into multi-section bundles for transfer.
//!
//! # Object Types
//!
//! - [`Commit`] -- tree + parent references with authorship and a message
//! - [`Tree`] -- ordered listing of named references to blobs and subtrees
//! - blob -- opaque bytes, returned verbatim on decode
//!
//! Raw transfer objects ([`ObjectManager::encode_raw`]) carry no header at
//! all; their framing belongs to the transport.
//!
//! # Design Rules
//!
//! 1. Identity is the digest of the raw payload, never of the header.
//! 2. Records are self-delimiting by declared length; trailing bytes belong
//!    to whatever follows.
//! 3. Encode and decode are atomic: a complete value or an error.
//! 4. Section failures are stored in the bundle, not propagated.

pub mod commit;
pub mod error;
pub mod manager;
pub mod object;
pub mod section;
pub mod tree;

pub use commit::Commit;
pub use error::{ObjectError, ObjectResult};
pub use manager::ObjectManager;
pub use object::{Object, ObjectInfo, ObjectInstance, ObjectType, RECORD_SENTINEL};
pub use section::{MultiSectionsObject, SectionError, SectionObject};
pub use tree::{EntryKind, Tree, TreeEntry};
