use crate::object::ObjectType;

/// Errors from object encoding and decoding.
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    /// Typed content must not be empty.
    #[error("{kind} content is empty")]
    EmptyContent { kind: ObjectType },

    /// The record or its payload is malformed.
    #[error("invalid object format: {0}")]
    Format(String),

    /// The record header declares a type this codec does not know.
    #[error("unsupported object type: {0}")]
    UnsupportedType(String),

    /// A tree entry cannot be encoded reversibly.
    #[error("invalid tree entry {name:?}: {reason}")]
    InvalidTreeEntry { name: String, reason: String },

    /// A commit field cannot be encoded reversibly.
    #[error("invalid commit field {field}: {reason}")]
    InvalidCommitField { field: &'static str, reason: String },

    /// A section was added with neither an object nor an error.
    #[error("section object is nil and carries no error")]
    NilObject,
}

/// Result alias for object operations.
pub type ObjectResult<T> = Result<T, ObjectError>;
