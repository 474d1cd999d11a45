//! # fhirwire serialization
//!
//! JSON and XML codecs for the FHIR resources of `fhirwire-models`.
//!
//! ## Features
//!
//! - **JSON Support**: primitives merged with their `_field` shadow objects,
//!   null-padded parallel arrays, `fieldNameType` choice keys and `resourceType`
//!   dispatch through an explicit [`Registry`](fhirwire_support::Registry).
//! - **XML Support** (feature `xml`, on by default): the FHIR XML form with
//!   `id`/`value` attributes, `<extension>` children, wrapped nested resources
//!   and raw XHTML narrative.
//! - **Unknown fields**: [`UnknownFieldPolicy`] decides whether an undefined key
//!   or element is an error or skipped.
//!
//! ## Architecture
//!
//! Neither codec knows any resource type. Typed values convert to a wire-neutral
//! node tree, and each codec walks that tree alongside the static descriptor
//! tables of the model types:
//!
//! - **JSON Layer**: `serde_json::Value` ↔ node tree
//! - **XML Layer**: quick-xml events ↔ node tree
//!
//! ## FHIR JSON ↔ XML Mapping
//!
//! | JSON Pattern | XML Pattern |
//! |--------------|-------------|
//! | `{"active": true}` | `<active value="true"/>` |
//! | `{"birthDate": "1974-12-25", "_birthDate": {"id": "123"}}` | `<birthDate id="123" value="1974-12-25"/>` |
//! | `{"given": ["John", "Doe"]}` | `<given value="John"/><given value="Doe"/>` |
//! | `{"given": ["A", null], "_given": [null, {"id": "123"}]}` | `<given value="A"/><given id="123"/>` |
//! | `{"deceasedBoolean": true}` | `<deceasedBoolean value="true"/>` |
//!
//! ## Examples
//!
//! ```
//! use fhirwire_models::{Patient, Resource};
//! use fhirwire_serde::{from_json_str, to_json_string};
//!
//! let registry = Resource::registry();
//! let json = r#"{"resourceType":"Patient","birthDate":"1974-12-25","_birthDate":{"id":"bd1"}}"#;
//!
//! let resource = from_json_str(&registry, json)?;
//! let patient = resource.as_patient().expect("a patient");
//! let birth_date = patient.birth_date.as_ref().expect("a birth date");
//! assert_eq!(birth_date.value.as_deref(), Some("1974-12-25"));
//! assert_eq!(birth_date.id.as_deref(), Some("bd1"));
//!
//! assert_eq!(to_json_string(&resource)?, json);
//! # Ok::<(), fhirwire_serde::SerdeError>(())
//! ```

pub mod codec;
pub mod error;
mod fields;
pub mod json;
pub mod options;

#[cfg(feature = "xml")]
pub mod xml;

// Re-export common types and functions
pub use codec::FhirCodec;
pub use error::{Result, SerdeError};
pub use options::{CodecOptions, UnknownFieldPolicy};

// Re-export JSON functions at top level for convenience
pub use json::{
    from_json_slice, from_json_str, from_json_value, resource_list_from_json_slice,
    resource_list_from_json_str,
    resource_list_from_ndjson_str, to_json_string, to_json_string_pretty, to_json_value,
    to_json_vec, to_ndjson_string,
};

#[cfg(feature = "xml")]
pub use xml::{from_xml_reader, from_xml_slice, from_xml_str, to_xml_string, to_xml_vec, to_xml_writer};
