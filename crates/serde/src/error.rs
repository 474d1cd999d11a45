use fhirwire_support::NodeError;
use thiserror::Error;

/// Error types for FHIR serialization and deserialization.
#[derive(Debug, Error)]
pub enum SerdeError {
    /// More than one variant of a choice field was present.
    #[error("choice field '{field}' has both '{first}' and '{second}'")]
    ConflictingVariant {
        field: String,
        first: String,
        second: String,
    },

    /// The discriminator names a type the registry does not hold.
    #[error("unknown resource type '{0}'")]
    UnknownResourceType(String),

    /// A JSON resource object without a `resourceType` key.
    #[error("resource is missing 'resourceType'")]
    MissingResourceType,

    /// The XML root (or a nested redeclaration) is not in the FHIR namespace.
    #[error("expected XML namespace '{expected}', found '{found}'")]
    NamespaceMismatch { expected: String, found: String },

    /// An XML attribute that the element does not define.
    #[error("unexpected attribute '{attribute}' on <{element}>")]
    UnexpectedAttribute { element: String, attribute: String },

    /// A key or element that the type does not define, under the strict policy.
    #[error("unknown field '{field}' in {type_name}")]
    UnknownField { type_name: String, field: String },

    /// Well-formed wire data whose shape does not fit the field.
    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// JSON serialization or deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML serialization or deserialization error
    #[cfg(feature = "xml")]
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// IO error during serialization/deserialization
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A decoded node did not convert into the typed model.
    #[error(transparent)]
    Node(NodeError),
}

impl SerdeError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        SerdeError::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<NodeError> for SerdeError {
    fn from(err: NodeError) -> Self {
        match err {
            NodeError::UnknownResourceType(tag) => SerdeError::UnknownResourceType(tag),
            other => SerdeError::Node(other),
        }
    }
}

/// Result type alias for FHIR serialization operations
pub type Result<T> = std::result::Result<T, SerdeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_unknown_type_maps_to_codec_error() {
        let err = SerdeError::from(NodeError::UnknownResourceType("Encounter".to_string()));
        assert!(matches!(err, SerdeError::UnknownResourceType(tag) if tag == "Encounter"));

        let err = SerdeError::from(NodeError::MissingField("url"));
        assert_eq!(err.to_string(), "missing required field 'url'");
    }

    #[test]
    fn test_display() {
        let err = SerdeError::ConflictingVariant {
            field: "deceased".to_string(),
            first: "deceasedBoolean".to_string(),
            second: "deceasedDateTime".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "choice field 'deceased' has both 'deceasedBoolean' and 'deceasedDateTime'"
        );
    }
}
