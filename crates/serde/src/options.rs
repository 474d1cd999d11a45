//! Codec configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SerdeError};

/// What decoding does with a JSON key or XML child element the type does not define.
///
/// Unrecognized XML attributes are always rejected, whatever the policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    /// Fail with [`SerdeError::UnknownField`].
    Strict,
    /// Skip the field and log it at debug level.
    #[default]
    Lenient,
}

impl fmt::Display for UnknownFieldPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnknownFieldPolicy::Strict => write!(f, "strict"),
            UnknownFieldPolicy::Lenient => write!(f, "lenient"),
        }
    }
}

impl FromStr for UnknownFieldPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(UnknownFieldPolicy::Strict),
            "lenient" => Ok(UnknownFieldPolicy::Lenient),
            _ => Err(format!(
                "Invalid unknown-field policy: {}. Valid values are: strict, lenient",
                s
            )),
        }
    }
}

/// Options shared by the JSON and XML codecs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    pub unknown_fields: UnknownFieldPolicy,
    /// Indent JSON and XML output.
    pub pretty: bool,
}

impl CodecOptions {
    pub fn strict() -> Self {
        Self {
            unknown_fields: UnknownFieldPolicy::Strict,
            ..Self::default()
        }
    }

    pub fn with_unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.unknown_fields = policy;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Applies the unknown-field policy to one field of `type_name`.
    pub(crate) fn unknown_field(&self, type_name: &str, field: &str) -> Result<()> {
        match self.unknown_fields {
            UnknownFieldPolicy::Strict => Err(SerdeError::UnknownField {
                type_name: type_name.to_string(),
                field: field.to_string(),
            }),
            UnknownFieldPolicy::Lenient => {
                tracing::debug!(type_name, field, "skipping unknown field");
                Ok(())
            }
        }
    }
}
