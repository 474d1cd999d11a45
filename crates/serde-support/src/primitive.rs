//! Primitive kinds and their wire-neutral scalar representation.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::NodeError;

/// The FHIR primitive data types understood by the codecs.
///
/// The kind only matters when reading wire data: it decides which JSON shape
/// is accepted and how an XML `value` attribute is parsed. Once decoded every
/// primitive is a [`Scalar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrimitiveKind {
    Boolean,
    Integer,
    PositiveInt,
    UnsignedInt,
    Decimal,
    String,
    Code,
    Id,
    Uri,
    Url,
    Canonical,
    Date,
    DateTime,
    Instant,
    Time,
    Markdown,
    Base64Binary,
    /// Narrative XHTML. Carried as literal markup in both formats.
    Xhtml,
}

/// How a primitive kind is represented as a JSON scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Bool,
    Integer,
    Number,
    String,
}

impl PrimitiveKind {
    /// FHIR type name, e.g. `dateTime`.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::PositiveInt => "positiveInt",
            PrimitiveKind::UnsignedInt => "unsignedInt",
            PrimitiveKind::Decimal => "decimal",
            PrimitiveKind::String => "string",
            PrimitiveKind::Code => "code",
            PrimitiveKind::Id => "id",
            PrimitiveKind::Uri => "uri",
            PrimitiveKind::Url => "url",
            PrimitiveKind::Canonical => "canonical",
            PrimitiveKind::Date => "date",
            PrimitiveKind::DateTime => "dateTime",
            PrimitiveKind::Instant => "instant",
            PrimitiveKind::Time => "time",
            PrimitiveKind::Markdown => "markdown",
            PrimitiveKind::Base64Binary => "base64Binary",
            PrimitiveKind::Xhtml => "xhtml",
        }
    }

    pub fn json_shape(&self) -> JsonShape {
        match self {
            PrimitiveKind::Boolean => JsonShape::Bool,
            PrimitiveKind::Integer | PrimitiveKind::PositiveInt | PrimitiveKind::UnsignedInt => {
                JsonShape::Integer
            }
            PrimitiveKind::Decimal => JsonShape::Number,
            _ => JsonShape::String,
        }
    }

    /// Parses the lexical form used by XML `value` attributes.
    pub fn parse_lexical(&self, text: &str) -> Result<Scalar, NodeError> {
        match self.json_shape() {
            JsonShape::Bool => match text {
                "true" => Ok(Scalar::Boolean(true)),
                "false" => Ok(Scalar::Boolean(false)),
                other => Err(self.invalid(format!("'{}' is not true or false", other))),
            },
            JsonShape::Integer => text
                .parse::<i64>()
                .map(Scalar::Integer)
                .map_err(|e| self.invalid(format!("'{}': {}", text, e))),
            JsonShape::Number => parse_decimal(text)
                .map(Scalar::Decimal)
                .map_err(|message| self.invalid(message)),
            JsonShape::String => Ok(Scalar::Text(text.to_string())),
        }
    }

    fn invalid(&self, message: String) -> NodeError {
        NodeError::InvalidScalar {
            kind: *self,
            message,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a decimal literal, keeping its scale (`1.50` stays `1.50`).
pub fn parse_decimal(text: &str) -> Result<Decimal, String> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|e| format!("'{}': {}", text, e))
}

/// A decoded primitive value, independent of the wire format it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Boolean(bool),
    Integer(i64),
    Decimal(Decimal),
    Text(String),
}

impl Scalar {
    /// Lexical form as written into an XML `value` attribute.
    pub fn to_lexical(&self) -> String {
        match self {
            Scalar::Boolean(b) => b.to_string(),
            Scalar::Integer(i) => i.to_string(),
            Scalar::Decimal(d) => d.to_string(),
            Scalar::Text(s) => s.clone(),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Scalar::Boolean(_) => "boolean",
            Scalar::Integer(_) => "integer",
            Scalar::Decimal(_) => "decimal",
            Scalar::Text(_) => "text",
        }
    }
}

/// Rust types that can sit inside a primitive cell.
pub trait PrimitiveValue: Sized {
    const KIND: PrimitiveKind;

    fn to_scalar(&self) -> Scalar;

    fn from_scalar(scalar: Scalar) -> Result<Self, NodeError>;
}

fn mismatch(kind: PrimitiveKind, scalar: &Scalar) -> NodeError {
    NodeError::InvalidScalar {
        kind,
        message: format!("found a {} scalar", scalar.describe()),
    }
}

impl PrimitiveValue for bool {
    const KIND: PrimitiveKind = PrimitiveKind::Boolean;

    fn to_scalar(&self) -> Scalar {
        Scalar::Boolean(*self)
    }

    fn from_scalar(scalar: Scalar) -> Result<Self, NodeError> {
        match scalar {
            Scalar::Boolean(b) => Ok(b),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

impl PrimitiveValue for i32 {
    const KIND: PrimitiveKind = PrimitiveKind::Integer;

    fn to_scalar(&self) -> Scalar {
        Scalar::Integer(i64::from(*self))
    }

    fn from_scalar(scalar: Scalar) -> Result<Self, NodeError> {
        match scalar {
            Scalar::Integer(i) => i32::try_from(i).map_err(|_| NodeError::InvalidScalar {
                kind: Self::KIND,
                message: format!("{} is out of range", i),
            }),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

impl PrimitiveValue for u32 {
    const KIND: PrimitiveKind = PrimitiveKind::UnsignedInt;

    fn to_scalar(&self) -> Scalar {
        Scalar::Integer(i64::from(*self))
    }

    fn from_scalar(scalar: Scalar) -> Result<Self, NodeError> {
        match scalar {
            Scalar::Integer(i) => u32::try_from(i).map_err(|_| NodeError::InvalidScalar {
                kind: Self::KIND,
                message: format!("{} is out of range", i),
            }),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

impl PrimitiveValue for Decimal {
    const KIND: PrimitiveKind = PrimitiveKind::Decimal;

    fn to_scalar(&self) -> Scalar {
        Scalar::Decimal(*self)
    }

    fn from_scalar(scalar: Scalar) -> Result<Self, NodeError> {
        match scalar {
            Scalar::Decimal(d) => Ok(d),
            Scalar::Integer(i) => Ok(Decimal::from(i)),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

impl PrimitiveValue for String {
    const KIND: PrimitiveKind = PrimitiveKind::String;

    fn to_scalar(&self) -> Scalar {
        Scalar::Text(self.clone())
    }

    fn from_scalar(scalar: Scalar) -> Result<Self, NodeError> {
        match scalar {
            Scalar::Text(s) => Ok(s),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}
