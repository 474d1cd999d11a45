//! FHIR primitive types. Every one of them is the same cell, [`Element`],
//! over a different Rust value type; the descriptor tables decide the wire kind.

use fhirwire_support::Element;

use crate::datatypes::Extension;

pub type Boolean = Element<bool, Extension>;
pub type Integer = Element<i32, Extension>;
pub type UnsignedInt = Element<u32, Extension>;
pub type PositiveInt = Element<u32, Extension>;
pub type Decimal = Element<rust_decimal::Decimal, Extension>;
pub type FhirString = Element<String, Extension>;
pub type Code = Element<String, Extension>;
pub type Id = Element<String, Extension>;
pub type Uri = Element<String, Extension>;
pub type Url = Element<String, Extension>;
pub type Canonical = Element<String, Extension>;
pub type Date = Element<String, Extension>;
pub type DateTime = Element<String, Extension>;
pub type Instant = Element<String, Extension>;
pub type Markdown = Element<String, Extension>;
pub type Xhtml = Element<String, Extension>;
