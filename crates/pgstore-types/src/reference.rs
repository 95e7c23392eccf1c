use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::object::ObjectId;

/// Weak, textual reference to another object's identity.
///
/// Commits and trees point at other objects through a `DigestRef`. The
/// reference records a relation only: nothing guarantees the target exists
/// when the referring object is decoded, and the text is not required to be a
/// well-formed digest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DigestRef(String);

impl DigestRef {
    /// Create a reference from any string.
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// The reference text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the reference is empty (no target recorded).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Interpret the reference as a full hex-encoded [`ObjectId`].
    pub fn to_object_id(&self) -> Result<ObjectId, TypeError> {
        ObjectId::from_hex(&self.0)
    }
}

impl fmt::Display for DigestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ObjectId> for DigestRef {
    fn from(id: ObjectId) -> Self {
        Self(id.to_hex())
    }
}

impl From<&ObjectId> for DigestRef {
    fn from(id: &ObjectId) -> Self {
        Self(id.to_hex())
    }
}

impl From<&str> for DigestRef {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for DigestRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}
