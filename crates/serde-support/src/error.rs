//! Errors raised while converting between typed values and the node IR.

use thiserror::Error;

use crate::primitive::PrimitiveKind;

/// Failure converting a node into a typed value (or the reverse).
///
/// These never describe malformed wire bytes; the wire codecs report those
/// through their own error type and wrap this one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    /// A field held a node shape that the target type cannot accept.
    #[error("field '{field}' expected {expected}, found {found}")]
    ShapeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A scalar could not be converted into the requested Rust type.
    #[error("cannot read {kind} value: {message}")]
    InvalidScalar { kind: PrimitiveKind, message: String },

    /// A choice node named a variant the target enum does not declare.
    #[error("'{variant}' is not a variant of choice field '{field}'")]
    UnknownVariant { field: &'static str, variant: String },

    /// A resource node carried a type the target resource set does not contain.
    #[error("resource type '{0}' is not part of this resource set")]
    UnknownResourceType(String),

    /// A mandatory field was absent.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
}
