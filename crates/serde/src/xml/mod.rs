//! FHIR XML codec.
//!
//! Both directions go through the same node tree as the JSON codec: the decoder
//! reads quick-xml events against the type's descriptor table, the encoder walks
//! the table and writes events. A document converted JSON → XML → JSON keeps
//! every value, id and extension.
//!
//! ## Mapping
//!
//! | JSON | XML |
//! |------|-----|
//! | `"active": true` | `<active value="true"/>` |
//! | `"birthDate": "1980-03-01", "_birthDate": {"id": "b"}` | `<birthDate id="b" value="1980-03-01"/>` |
//! | `"_birthDate": {"extension": [{"url": "u", ...}]}` | `<birthDate><extension url="u">...</extension></birthDate>` |
//! | `"given": ["Ann", "Lee"]` | `<given value="Ann"/><given value="Lee"/>` |
//! | `"given": ["Ann", null], "_given": [null, {"id": "x"}]` | `<given value="Ann"/><given id="x"/>` |
//! | `"deceasedBoolean": false` | `<deceasedBoolean value="false"/>` |
//! | `"code": {"text": "Glucose"}` | `<code><text value="Glucose"/></code>` |
//!
//! Repeated fields become sibling elements in list order. Metadata a JSON
//! shadow array carries by index travels inline on the matching element.
//!
//! ## Special Attributes
//!
//! - `value` on primitive elements
//! - `id` on primitive elements (the JSON `_field.id`) and on datatype elements
//! - `url` on `<extension>`
//!
//! Every other attribute is rejected with
//! [`SerdeError::UnexpectedAttribute`](crate::SerdeError::UnexpectedAttribute),
//! whatever the unknown-field policy.
//!
//! ## Nested Resources
//!
//! `contained` and `Bundle.entry.resource` wrap the resource element in an
//! element named after the field:
//!
//! ```xml
//! <contained>
//!   <Patient>
//!     <id value="p1"/>
//!   </Patient>
//! </contained>
//! ```
//!
//! ## Namespace Handling
//!
//! - The root resource element must declare `http://hl7.org/fhir` as its default
//!   namespace; a prefixed root or another namespace is a
//!   [`SerdeError::NamespaceMismatch`](crate::SerdeError::NamespaceMismatch)
//! - Narrative `<div>` elements keep their XHTML namespace and are copied as raw markup
//!
//! ## Examples
//!
//! ```
//! use fhirwire_models::{Patient, Resource};
//! use fhirwire_serde::xml::{from_xml_str, to_xml_string};
//!
//! let patient = Patient {
//!     id: Some("example".to_string().into()),
//!     active: Some(true.into()),
//!     ..Default::default()
//! };
//! let xml = to_xml_string(&patient)?;
//!
//! let decoded = from_xml_str(&Patient::registry(), &xml)?;
//! assert_eq!(decoded, patient);
//!
//! // The full catalog decodes the same document
//! let resource = from_xml_str(&Resource::registry(), &xml)?;
//! assert_eq!(resource.as_patient(), Some(&patient));
//! # Ok::<(), fhirwire_serde::SerdeError>(())
//! ```

pub mod de;
pub mod ser;
mod utils;

pub use utils::FHIR_NAMESPACE;

pub use ser::{to_xml_string, to_xml_vec, to_xml_writer};
pub use de::{from_xml_reader, from_xml_slice, from_xml_str};
