use std::sync::Arc;

use pgstore_crypto::{DigestAlgorithm, Digester};
use tracing::{debug, warn};

use crate::commit::Commit;
use crate::error::{ObjectError, ObjectResult};
use crate::object::{Object, ObjectInfo, ObjectInstance, ObjectType, RECORD_SENTINEL};
use crate::tree::Tree;

/// Encodes entities into content-addressed records and decodes them back.
///
/// Record layout:
///
/// ```text
/// <type> SP <decimal length> 0xFF <payload>
/// ```
///
/// The identity of a record is the digest of `<payload>` alone. Records are
/// self-delimiting: bytes past the declared length are not part of the record.
#[derive(Clone)]
pub struct ObjectManager {
    digester: Arc<dyn Digester>,
}

impl Default for ObjectManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ObjectManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectManager")
            .field("digest", &self.digester.algorithm())
            .finish()
    }
}

impl ObjectManager {
    /// Manager using the default BLAKE3 digest.
    pub fn new() -> Self {
        Self::with_algorithm(DigestAlgorithm::default())
    }

    pub fn with_algorithm(algorithm: DigestAlgorithm) -> Self {
        Self::with_digester(algorithm.digester())
    }

    pub fn with_digester(digester: Arc<dyn Digester>) -> Self {
        Self { digester }
    }

    pub fn digester(&self) -> &dyn Digester {
        self.digester.as_ref()
    }

    /// Frame `content` as a typed record.
    pub fn encode(&self, object_type: ObjectType, content: &[u8]) -> ObjectResult<Object> {
        if content.is_empty() {
            return Err(ObjectError::EmptyContent { kind: object_type });
        }
        let header = format!("{} {}", object_type, content.len());
        let mut record = Vec::with_capacity(header.len() + 1 + content.len());
        record.extend_from_slice(header.as_bytes());
        record.push(RECORD_SENTINEL);
        record.extend_from_slice(content);

        let id = self.digester.digest(content);
        debug!(id = %id.short_hex(), %object_type, size = content.len(), "encoded object");
        Ok(Object::new(id, record))
    }

    /// Wrap bytes as an unframed object whose framing is supplied elsewhere.
    ///
    /// Raw objects carry no header and cannot be passed to [`decode`](Self::decode).
    pub fn encode_raw(&self, data: &[u8]) -> Object {
        Object::new(self.digester.digest(data), data.to_vec())
    }

    pub fn create_commit_object(&self, commit: &Commit) -> ObjectResult<Object> {
        self.encode(ObjectType::Commit, &commit.serialize()?)
    }

    /// Fails with [`ObjectError::EmptyContent`] for a tree without entries.
    pub fn create_tree_object(&self, tree: &Tree) -> ObjectResult<Object> {
        self.encode(ObjectType::Tree, &tree.serialize()?)
    }

    pub fn create_blob_object(&self, data: &[u8]) -> ObjectResult<Object> {
        self.encode(ObjectType::Blob, data)
    }

    /// Decode a typed record into its entity.
    pub fn decode(&self, object: &Object) -> ObjectResult<ObjectInfo> {
        let record = parse_record(object.content())?;
        let object_type: ObjectType = record.tag.parse().map_err(|e| {
            warn!(id = %object.id().short_hex(), tag = record.tag, "unsupported object type");
            e
        })?;
        let instance = match object_type {
            ObjectType::Commit => ObjectInstance::Commit(Commit::deserialize(record.payload)?),
            ObjectType::Tree => ObjectInstance::Tree(Tree::deserialize(record.payload)?),
            ObjectType::Blob => ObjectInstance::Blob(record.payload.to_vec()),
        };
        Ok(ObjectInfo::new(object.clone(), instance))
    }

    /// Rebuild an object from a record received from a peer.
    ///
    /// Only the framing is checked; the identity is recomputed from the
    /// payload and bytes past the declared length are dropped.
    pub fn read_object(&self, bytes: &[u8]) -> ObjectResult<Object> {
        let record = parse_record(bytes)?;
        let id = self.digester.digest(record.payload);
        Ok(Object::new(id, bytes[..record.len].to_vec()))
    }

    /// Split a buffer of back-to-back records into objects.
    pub fn read_records(&self, bytes: &[u8]) -> ObjectResult<Vec<Object>> {
        let mut objects = Vec::new();
        let mut offset = 0;
        while offset < bytes.len() {
            let object = self.read_object(&bytes[offset..]).map_err(|e| match e {
                ObjectError::Format(reason) => {
                    ObjectError::Format(format!("record at offset {offset}: {reason}"))
                }
                other => other,
            })?;
            offset += object.len();
            objects.push(object);
        }
        debug!(count = objects.len(), size = bytes.len(), "split concatenated records");
        Ok(objects)
    }
}

/// A parsed record header and the payload slice it delimits.
struct Record<'a> {
    tag: &'a str,
    payload: &'a [u8],
    /// Total record length (header + sentinel + payload).
    len: usize,
}

fn parse_record(bytes: &[u8]) -> ObjectResult<Record<'_>> {
    let sentinel = bytes
        .iter()
        .position(|&b| b == RECORD_SENTINEL)
        .ok_or_else(|| ObjectError::Format("no header separator found".into()))?;
    let header = std::str::from_utf8(&bytes[..sentinel])
        .map_err(|_| ObjectError::Format("header is not ASCII".into()))?;
    let (tag, length) = header
        .split_once(' ')
        .ok_or_else(|| ObjectError::Format(format!("malformed header {header:?}")))?;
    let declared: usize = length
        .parse()
        .map_err(|e| ObjectError::Format(format!("invalid length {length:?}: {e}")))?;

    let start = sentinel + 1;
    let available = bytes.len() - start;
    if available < declared {
        return Err(ObjectError::Format(format!(
            "content length mismatch: expected {declared}, got {available}"
        )));
    }
    let end = start + declared;
    Ok(Record {
        tag,
        payload: &bytes[start..end],
        len: end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pgstore_crypto::{Blake3Digester, Sha256Digester};
    use proptest::prelude::*;

    use crate::tree::{EntryKind, TreeEntry};

    fn manager() -> ObjectManager {
        ObjectManager::new()
    }

    fn record(header: &str, payload: &[u8]) -> Vec<u8> {
        let mut out = header.as_bytes().to_vec();
        out.push(RECORD_SENTINEL);
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn blob_roundtrip() {
        let m = manager();
        let obj = m.create_blob_object(b"hello").unwrap();
        assert_eq!(obj.content(), record("blob 5", b"hello").as_slice());

        let info = m.decode(&obj).unwrap();
        assert_eq!(info.object_type(), ObjectType::Blob);
        assert_eq!(info.as_blob(), Some(&b"hello"[..]));
        assert_eq!(info.object(), &obj);
    }

    #[test]
    fn empty_blob_is_rejected() {
        let err = manager().create_blob_object(b"").unwrap_err();
        assert!(matches!(err, ObjectError::EmptyContent { kind: ObjectType::Blob }));
    }

    #[test]
    fn empty_tree_is_rejected() {
        let err = manager().create_tree_object(&Tree::empty()).unwrap_err();
        assert!(matches!(err, ObjectError::EmptyContent { kind: ObjectType::Tree }));
    }

    #[test]
    fn identity_ignores_header() {
        let m = manager();
        let obj = m.create_blob_object(b"payload").unwrap();
        assert_eq!(*obj.id(), Blake3Digester.digest(b"payload"));
        assert_eq!(obj.id(), m.encode_raw(b"payload").id());
    }

    #[test]
    fn same_content_different_type_collides() {
        let m = manager();
        let content = b"tree abc name\n";
        let blob = m.encode(ObjectType::Blob, content).unwrap();
        let tree = m.encode(ObjectType::Tree, content).unwrap();
        assert_eq!(blob.id(), tree.id());
        assert_ne!(blob.content(), tree.content());
        assert_eq!(m.decode(&tree).unwrap().object_type(), ObjectType::Tree);
    }

    #[test]
    fn commit_roundtrip() {
        let m = manager();
        let at = Utc.timestamp_opt(1_628_704_800, 0).unwrap();
        let commit = Commit::new("3b18e17a0e8664d3dffab99ebf6d730ddc6e8649", "a1b2c3d4")
            .with_author("Nicola Gallo", at)
            .with_committer("Nicola Gallo", at)
            .with_message("Initial commit");
        let obj = m.create_commit_object(&commit).unwrap();
        let info = m.decode(&obj).unwrap();
        assert_eq!(info.object_type(), ObjectType::Commit);
        assert_eq!(info.as_commit(), Some(&commit));
    }

    #[test]
    fn encoded_commit_always_decodes() {
        let m = manager();
        let at = Utc.timestamp_opt(1_628_704_800, 0).unwrap();
        let commit = Commit::new("t", "p")
            .with_author("alice", at)
            .with_committer("alice", at)
            .with_message("author of this fix is bob");
        let obj = m.create_commit_object(&commit).unwrap();
        let decoded = m.decode(&obj).unwrap().as_commit().cloned().unwrap();
        assert_eq!(decoded.tree.as_str(), "t");
        assert_eq!(decoded.committer, "alice");
    }

    #[test]
    fn commit_with_multi_line_ref_is_not_encoded() {
        let commit = Commit::new("t\nparent forged", "p");
        let err = manager().create_commit_object(&commit).unwrap_err();
        assert!(matches!(err, ObjectError::InvalidCommitField { field: "tree", .. }));
    }

    #[test]
    fn tree_roundtrip() {
        let m = manager();
        let tree = Tree::new(vec![
            TreeEntry::new(EntryKind::Blob, "6eb715b0", "name1"),
            TreeEntry::new(EntryKind::Tree, "a7fdb337", "name3"),
        ]);
        let obj = m.create_tree_object(&tree).unwrap();
        let info = m.decode(&obj).unwrap();
        assert_eq!(info.as_tree(), Some(&tree));
    }

    #[test]
    fn missing_sentinel_is_format_error() {
        let obj = Object::new(Blake3Digester.digest(b""), b"xx 12\0some content".to_vec());
        let err = manager().decode(&obj).unwrap_err();
        assert!(err.to_string().contains("no header separator found"));
        assert!(matches!(err, ObjectError::Format(_)));
    }

    #[test]
    fn empty_record_is_format_error() {
        let obj = Object::new(Blake3Digester.digest(b""), Vec::new());
        assert!(matches!(manager().decode(&obj).unwrap_err(), ObjectError::Format(_)));
    }

    #[test]
    fn unknown_type_is_unsupported() {
        let obj = Object::new(Blake3Digester.digest(b""), record("xx 12", b"some content"));
        let err = manager().decode(&obj).unwrap_err();
        assert!(matches!(err, ObjectError::UnsupportedType(ref t) if t == "xx"));
    }

    #[test]
    fn header_without_space_is_format_error() {
        let obj = Object::new(Blake3Digester.digest(b""), record("blob5", b"hello"));
        assert!(matches!(manager().decode(&obj).unwrap_err(), ObjectError::Format(_)));
    }

    #[test]
    fn bad_lengths_are_format_errors() {
        let m = manager();
        for header in ["blob -1", "blob five", "blob 5 5", "blob "] {
            let obj = Object::new(Blake3Digester.digest(b""), record(header, b"hello"));
            assert!(
                matches!(m.decode(&obj).unwrap_err(), ObjectError::Format(_)),
                "header {header:?}"
            );
        }
    }

    #[test]
    fn truncated_payload_is_format_error() {
        let obj = Object::new(Blake3Digester.digest(b""), record("blob 10", b"short"));
        let err = manager().decode(&obj).unwrap_err();
        assert!(err.to_string().contains("expected 10, got 5"));
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let mut bytes = record("blob 5", b"hello");
        bytes.extend_from_slice(b"garbage after record");
        let obj = Object::new(Blake3Digester.digest(b"hello"), bytes);
        let info = manager().decode(&obj).unwrap();
        assert_eq!(info.as_blob(), Some(&b"hello"[..]));
    }

    #[test]
    fn payload_may_contain_sentinel() {
        let m = manager();
        let data = [RECORD_SENTINEL, 0, RECORD_SENTINEL];
        let obj = m.create_blob_object(&data).unwrap();
        assert_eq!(m.decode(&obj).unwrap().as_blob(), Some(&data[..]));
    }

    #[test]
    fn read_object_recomputes_identity_and_trims() {
        let m = manager();
        let original = m.create_blob_object(b"hello").unwrap();
        let mut wire = original.content().to_vec();
        wire.extend_from_slice(b"next record");
        let received = m.read_object(&wire).unwrap();
        assert_eq!(received, original);
    }

    #[test]
    fn read_records_walks_concatenated_records() {
        let m = manager();
        let a = m.create_blob_object(b"first").unwrap();
        let b = m
            .create_tree_object(&Tree::new(vec![TreeEntry::new(EntryKind::Blob, "abc", "f")]))
            .unwrap();
        let c = m.create_blob_object(&[RECORD_SENTINEL; 3]).unwrap();
        let mut wire = Vec::new();
        for obj in [&a, &b, &c] {
            wire.extend_from_slice(obj.content());
        }
        let objects = m.read_records(&wire).unwrap();
        assert_eq!(objects, vec![a, b, c]);
    }

    #[test]
    fn read_records_reports_offset_of_bad_record() {
        let m = manager();
        let mut wire = m.create_blob_object(b"ok").unwrap().into_content();
        let bad_at = wire.len();
        wire.extend_from_slice(&record("blob 9", b"cut"));
        let err = m.read_records(&wire).unwrap_err();
        assert!(err.to_string().contains(&format!("offset {bad_at}")));
    }

    #[test]
    fn read_records_of_nothing_is_empty() {
        assert!(manager().read_records(&[]).unwrap().is_empty());
    }

    #[test]
    fn digest_provider_is_pluggable() {
        let m = ObjectManager::with_algorithm(DigestAlgorithm::Sha256);
        let obj = m.create_blob_object(b"hello").unwrap();
        assert_eq!(*obj.id(), Sha256Digester.digest(b"hello"));
        assert_eq!(m.digester().algorithm(), DigestAlgorithm::Sha256);
    }

    proptest! {
        #[test]
        fn raw_identity_is_digest(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            let m = manager();
            let a = m.encode_raw(&data);
            let b = m.encode_raw(&data);
            prop_assert_eq!(*a.id(), Blake3Digester.digest(&data));
            prop_assert_eq!(a.content(), data.as_slice());
            prop_assert_eq!(a, b);
        }

        #[test]
        fn blob_decode_inverts_encode(data in proptest::collection::vec(any::<u8>(), 1..256)) {
            let m = manager();
            let obj = m.create_blob_object(&data).unwrap();
            let info = m.decode(&obj).unwrap();
            prop_assert_eq!(info.as_blob(), Some(data.as_slice()));
        }
    }
}
