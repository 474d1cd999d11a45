//! Utility functions and constants for XML serialization/deserialization.

/// FHIR namespace URI.
///
/// The root resource element must declare it as the default namespace.
pub const FHIR_NAMESPACE: &str = "http://hl7.org/fhir";

/// Child element carrying a primitive's extensions.
pub const EXTENSION_ELEMENT: &str = "extension";

/// Checks if a qualified name carries a namespace prefix (`f:Patient`).
pub fn is_prefixed(name: &[u8]) -> bool {
    name.contains(&b':')
}

/// `xmlns` or `xmlns:prefix`.
pub fn is_namespace_declaration(key: &[u8]) -> bool {
    key == b"xmlns" || key.starts_with(b"xmlns:")
}

pub fn name_to_string(name: &[u8]) -> String {
    String::from_utf8_lossy(name).into_owned()
}

/// True for text made only of XML whitespace.
pub fn is_whitespace(text: &[u8]) -> bool {
    text.iter().all(|b| matches!(b, b' ' | b'\n' | b'\r' | b'\t'))
}
