use std::fmt;
use std::str::FromStr;

use pgstore_types::ObjectId;
use serde::{Deserialize, Serialize};

use crate::commit::Commit;
use crate::error::ObjectError;
use crate::tree::Tree;

/// Separates the ASCII record header from the opaque payload.
///
/// `0xFF` never occurs in an ASCII header, so the first occurrence always
/// ends the header no matter what the payload contains.
pub const RECORD_SENTINEL: u8 = 0xFF;

/// The typed objects a record header may declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Commit,
    Tree,
    Blob,
}

impl ObjectType {
    /// The tag written into record headers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Tree => "tree",
            Self::Blob => "blob",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = ObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "commit" => Ok(Self::Commit),
            "tree" => Ok(Self::Tree),
            "blob" => Ok(Self::Blob),
            other => Err(ObjectError::UnsupportedType(other.to_owned())),
        }
    }
}

/// An immutable content-addressed object.
///
/// `id` is always the digest of the raw payload. `content` holds the full
/// record (header, sentinel, payload) for typed objects, or the bare bytes
/// for raw transfer objects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Object {
    id: ObjectId,
    content: Vec<u8>,
}

impl Object {
    /// Assemble an object from an identity and its encoded bytes.
    ///
    /// Prefer [`ObjectManager`](crate::ObjectManager), which derives the
    /// identity; this is for objects whose identity is already known.
    pub fn new(id: ObjectId, content: Vec<u8>) -> Self {
        Self { id, content }
    }

    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    /// The encoded bytes.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn into_content(self) -> Vec<u8> {
        self.content
    }

    /// Size of the encoded bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// The decoded shape of an object's payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObjectInstance {
    Commit(Commit),
    Tree(Tree),
    Blob(Vec<u8>),
}

impl ObjectInstance {
    /// The object type this instance was decoded as.
    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::Commit(_) => ObjectType::Commit,
            Self::Tree(_) => ObjectType::Tree,
            Self::Blob(_) => ObjectType::Blob,
        }
    }
}

/// Read-only view produced by decoding an [`Object`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectInfo {
    object: Object,
    instance: ObjectInstance,
}

impl ObjectInfo {
    pub(crate) fn new(object: Object, instance: ObjectInstance) -> Self {
        Self { object, instance }
    }

    /// The object that was decoded.
    pub fn object(&self) -> &Object {
        &self.object
    }

    /// The type declared in the record header.
    pub fn object_type(&self) -> ObjectType {
        self.instance.object_type()
    }

    pub fn instance(&self) -> &ObjectInstance {
        &self.instance
    }

    pub fn into_instance(self) -> ObjectInstance {
        self.instance
    }

    pub fn as_commit(&self) -> Option<&Commit> {
        match &self.instance {
            ObjectInstance::Commit(commit) => Some(commit),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match &self.instance {
            ObjectInstance::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match &self.instance {
            ObjectInstance::Blob(data) => Some(data),
            _ => None,
        }
    }
}
