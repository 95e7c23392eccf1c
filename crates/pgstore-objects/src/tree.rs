use std::fmt;
use std::str::FromStr;

use pgstore_types::DigestRef;
use serde::{Deserialize, Serialize};

use crate::error::{ObjectError, ObjectResult};

/// What a tree entry points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = ObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blob" => Ok(Self::Blob),
            "tree" => Ok(Self::Tree),
            other => Err(ObjectError::Format(format!("unknown tree entry kind {other:?}"))),
        }
    }
}

/// A single named entry in a tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub kind: EntryKind,
    /// Identity of the referenced object.
    pub identity: DigestRef,
    pub name: String,
}

impl TreeEntry {
    pub fn new(kind: EntryKind, identity: impl Into<DigestRef>, name: impl Into<String>) -> Self {
        Self {
            kind,
            identity: identity.into(),
            name: name.into(),
        }
    }

    fn validate(&self) -> ObjectResult<()> {
        let invalid = |reason: &str| ObjectError::InvalidTreeEntry {
            name: self.name.clone(),
            reason: reason.to_owned(),
        };
        if self.identity.is_empty() {
            return Err(invalid("identity is empty"));
        }
        if self.identity.as_str().chars().any(char::is_whitespace) {
            return Err(invalid("identity contains whitespace"));
        }
        if self.name.contains('\n') {
            return Err(invalid("name contains a newline"));
        }
        Ok(())
    }
}

/// Ordered listing of named entries.
///
/// Unlike a filesystem directory, entry order is part of the value: it is
/// the listing order and is preserved exactly through encoding.
///
/// Encoded as one `<kind> <identity> <name>\n` line per entry. A tree with no
/// entries encodes to no bytes, which the object codec refuses to store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        Self { entries }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Append an entry at the end of the listing.
    pub fn push(&mut self, entry: TreeEntry) {
        self.entries.push(entry);
    }

    /// First entry with the given name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn serialize(&self) -> ObjectResult<Vec<u8>> {
        let mut out = String::new();
        for entry in &self.entries {
            entry.validate()?;
            out.push_str(&format!("{} {} {}\n", entry.kind, entry.identity, entry.name));
        }
        Ok(out.into_bytes())
    }

    pub fn deserialize(data: &[u8]) -> ObjectResult<Self> {
        let text = std::str::from_utf8(data)
            .map_err(|e| ObjectError::Format(format!("tree is not valid UTF-8: {e}")))?;
        let entries = text
            .split_terminator('\n')
            .map(parse_entry)
            .collect::<ObjectResult<Vec<_>>>()?;
        Ok(Self { entries })
    }
}

fn parse_entry(line: &str) -> ObjectResult<TreeEntry> {
    let mut fields = line.splitn(3, ' ');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(kind), Some(identity), Some(name)) if !identity.is_empty() => {
            Ok(TreeEntry::new(kind.parse()?, identity, name))
        }
        _ => Err(ObjectError::Format(format!("malformed tree entry {line:?}"))),
    }
}
