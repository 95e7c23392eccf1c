use chrono::{DateTime, SecondsFormat, Utc};
use pgstore_types::DigestRef;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ObjectError, ObjectResult};

const TREE_PREFIX: &str = "tree ";
const PARENT_PREFIX: &str = "parent ";
const AUTHOR_PREFIX: &str = "author ";
const COMMITTER_PREFIX: &str = "committer ";

/// A commit: a snapshot of a tree plus its parent and authorship.
///
/// Text form, one field per line:
///
/// ```text
/// tree <ref>
/// parent <ref>
/// author <rfc3339> <identity>
/// committer <rfc3339> <identity>
/// <message>
/// ```
///
/// Only the final line of the text is read back as the message. A message
/// that spans several lines loses everything but its last line on decode,
/// and a message line that starts with a field prefix is read as that field.
///
/// The tree and parent refs and both identities must fit on one line;
/// [`serialize`](Self::serialize) rejects them otherwise.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub tree: DigestRef,
    pub parent: DigestRef,
    pub author: String,
    pub author_time: DateTime<Utc>,
    pub committer: String,
    pub committer_time: DateTime<Utc>,
    pub message: String,
}

impl Commit {
    pub fn new(tree: impl Into<DigestRef>, parent: impl Into<DigestRef>) -> Self {
        Self {
            tree: tree.into(),
            parent: parent.into(),
            ..Self::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>, time: DateTime<Utc>) -> Self {
        self.author = author.into();
        self.author_time = time;
        self
    }

    pub fn with_committer(mut self, committer: impl Into<String>, time: DateTime<Utc>) -> Self {
        self.committer = committer.into();
        self.committer_time = time;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Serialize to the line-oriented text form.
    ///
    /// Fails with [`ObjectError::InvalidCommitField`] when a single-line field
    /// contains a line break.
    pub fn serialize(&self) -> ObjectResult<Vec<u8>> {
        self.validate()?;
        let mut out = String::with_capacity(160 + self.message.len());
        out.push_str(&format!("{TREE_PREFIX}{}\n", self.tree));
        out.push_str(&format!("{PARENT_PREFIX}{}\n", self.parent));
        out.push_str(&format!(
            "{AUTHOR_PREFIX}{} {}\n",
            format_time(&self.author_time),
            self.author
        ));
        out.push_str(&format!(
            "{COMMITTER_PREFIX}{} {}\n",
            format_time(&self.committer_time),
            self.committer
        ));
        out.push_str(&self.message);
        Ok(out.into_bytes())
    }

    fn validate(&self) -> ObjectResult<()> {
        let fields = [
            ("tree", self.tree.as_str()),
            ("parent", self.parent.as_str()),
            ("author", self.author.as_str()),
            ("committer", self.committer.as_str()),
        ];
        for (field, value) in fields {
            if value.contains(['\n', '\r']) {
                return Err(ObjectError::InvalidCommitField {
                    field,
                    reason: "contains a line break".into(),
                });
            }
        }
        Ok(())
    }

    /// Parse the text form.
    ///
    /// Prefixed lines are recognized anywhere in the input. Fields whose line
    /// is missing keep their default value. A signature line never fails: an
    /// unparsable timestamp reads as the UNIX epoch, and a line without an
    /// identity reads as an empty identity at the epoch.
    pub fn deserialize(data: &[u8]) -> ObjectResult<Self> {
        let text = std::str::from_utf8(data)
            .map_err(|e| ObjectError::Format(format!("commit is not valid UTF-8: {e}")))?;
        let lines: Vec<&str> = text.split('\n').collect();
        let last = lines.len() - 1;

        let mut commit = Self::default();
        for (i, line) in lines.iter().enumerate() {
            if let Some(rest) = line.strip_prefix(TREE_PREFIX) {
                commit.tree = DigestRef::from(rest);
            } else if let Some(rest) = line.strip_prefix(PARENT_PREFIX) {
                commit.parent = DigestRef::from(rest);
            } else if let Some(rest) = line.strip_prefix(AUTHOR_PREFIX) {
                let (time, identity) = parse_signature("author", rest);
                commit.author = identity;
                commit.author_time = time;
            } else if let Some(rest) = line.strip_prefix(COMMITTER_PREFIX) {
                let (time, identity) = parse_signature("committer", rest);
                commit.committer = identity;
                commit.committer_time = time;
            } else if i == last {
                commit.message = (*line).to_owned();
            }
        }
        Ok(commit)
    }
}

fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Split `<rfc3339> <identity>` into its parts.
fn parse_signature(field: &str, rest: &str) -> (DateTime<Utc>, String) {
    let Some((stamp, identity)) = rest.split_once(' ') else {
        debug!(field, line = rest, "signature without identity");
        return (DateTime::default(), String::new());
    };
    let time = match DateTime::parse_from_rfc3339(stamp) {
        Ok(time) => time.with_timezone(&Utc),
        Err(e) => {
            debug!(field, stamp, error = %e, "unparsable signature timestamp");
            DateTime::default()
        }
    };
    (time, identity.to_owned())
}
