//! A registry plus options, bundled for repeated use.

use std::fmt;
use std::sync::Arc;

use fhirwire_support::{Registry, ResourceSet};
use serde_json::Value;

use crate::error::Result;
use crate::json::{self, JsonDecoder};
use crate::options::CodecOptions;

/// Encodes and decodes resources of one resource set with fixed options.
///
/// The registry is shared, so a codec is cheap to clone and can be handed to
/// several threads.
///
/// ```
/// use fhirwire_models::Resource;
/// use fhirwire_serde::{CodecOptions, FhirCodec, SerdeError};
///
/// let codec = FhirCodec::with_options(Resource::registry(), CodecOptions::strict());
/// let err = codec
///     .from_json_str(r#"{"resourceType": "Patient", "nickname": "Bob"}"#)
///     .unwrap_err();
/// assert!(matches!(err, SerdeError::UnknownField { .. }));
/// ```
pub struct FhirCodec<R> {
    registry: Arc<Registry<R>>,
    options: CodecOptions,
}

impl<R: ResourceSet> FhirCodec<R> {
    pub fn new(registry: Registry<R>) -> Self {
        Self::with_options(registry, CodecOptions::default())
    }

    pub fn with_options(registry: Registry<R>, options: CodecOptions) -> Self {
        Self::from_shared(Arc::new(registry), options)
    }

    pub fn from_shared(registry: Arc<Registry<R>>, options: CodecOptions) -> Self {
        Self { registry, options }
    }

    pub fn registry(&self) -> &Registry<R> {
        &self.registry
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    // --- JSON ----------------------------------------------------------------

    pub fn from_json_str(&self, s: &str) -> Result<R> {
        self.from_json_value(serde_json::from_str(s)?)
    }

    pub fn from_json_slice(&self, v: &[u8]) -> Result<R> {
        self.from_json_value(serde_json::from_slice(v)?)
    }

    pub fn from_json_value(&self, value: Value) -> Result<R> {
        JsonDecoder::new(&self.registry, &self.options).resource(value)
    }

    pub fn to_json_value(&self, resource: &R) -> Result<Value> {
        json::to_json_value(resource)
    }

    /// Serializes to a JSON string, indented when the options ask for it.
    pub fn to_json_string(&self, resource: &R) -> Result<String> {
        let value = self.to_json_value(resource)?;
        if self.options.pretty {
            Ok(serde_json::to_string_pretty(&value)?)
        } else {
            Ok(serde_json::to_string(&value)?)
        }
    }

    pub fn to_json_vec(&self, resource: &R) -> Result<Vec<u8>> {
        Ok(self.to_json_string(resource)?.into_bytes())
    }

    /// A JSON array of resources.
    pub fn resource_list_from_json_str(&self, s: &str) -> Result<Vec<R>> {
        json::decode_list(&self.registry, &self.options, serde_json::from_str(s)?)
    }

    pub fn resource_list_from_json_slice(&self, v: &[u8]) -> Result<Vec<R>> {
        json::decode_list(&self.registry, &self.options, serde_json::from_slice(v)?)
    }

    /// Newline-delimited JSON; blank lines are ignored.
    pub fn resource_list_from_ndjson_str(&self, s: &str) -> Result<Vec<R>> {
        json::decode_ndjson(&self.registry, &self.options, s)
    }

    /// One compact JSON document per line. Ignores the `pretty` option.
    pub fn to_ndjson_string(&self, resources: &[R]) -> Result<String> {
        json::to_ndjson_string(resources)
    }
}

#[cfg(feature = "xml")]
impl<R: ResourceSet> FhirCodec<R> {
    pub fn from_xml_str(&self, xml: &str) -> Result<R> {
        self.from_xml_reader(xml.as_bytes())
    }

    pub fn from_xml_slice(&self, xml: &[u8]) -> Result<R> {
        self.from_xml_reader(xml)
    }

    pub fn from_xml_reader<B: std::io::BufRead>(&self, reader: B) -> Result<R> {
        crate::xml::de::XmlDecoder::new(&self.registry, &self.options, reader).document()
    }

    pub fn to_xml_writer<W: std::io::Write>(&self, resource: &R, writer: W) -> Result<()> {
        crate::xml::ser::XmlEncoder::for_set::<R>(writer, self.options.pretty)
            .document(&resource.to_resource_node())
    }

    pub fn to_xml_vec(&self, resource: &R) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.to_xml_writer(resource, &mut buffer)?;
        Ok(buffer)
    }

    pub fn to_xml_string(&self, resource: &R) -> Result<String> {
        let buffer = self.to_xml_vec(resource)?;
        String::from_utf8(buffer)
            .map_err(|e| crate::SerdeError::invalid("document", e.to_string()))
    }

    /// Re-encodes a JSON document as XML without building typed values.
    ///
    /// Every nested resource type must still be in the registry.
    pub fn json_to_xml(&self, json: &str) -> Result<String> {
        let value: Value = serde_json::from_str(json)?;
        let node = JsonDecoder::new(&self.registry, &self.options).resource_node(value)?;
        let mut buffer = Vec::new();
        crate::xml::ser::XmlEncoder::for_set::<R>(&mut buffer, self.options.pretty)
            .document(&node)?;
        String::from_utf8(buffer)
            .map_err(|e| crate::SerdeError::invalid("document", e.to_string()))
    }

    /// Re-encodes an XML document as JSON without building typed values.
    pub fn xml_to_json(&self, xml: &str) -> Result<String> {
        let node = crate::xml::de::XmlDecoder::new(&self.registry, &self.options, xml.as_bytes())
            .document_node()?;
        let value = json::JsonEncoder::for_set::<R>().resource(&node)?;
        if self.options.pretty {
            Ok(serde_json::to_string_pretty(&value)?)
        } else {
            Ok(serde_json::to_string(&value)?)
        }
    }
}

impl<R> Clone for FhirCodec<R> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            options: self.options,
        }
    }
}

impl<R> fmt::Debug for FhirCodec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FhirCodec")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhirwire_models::{Patient, Resource};

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_codec_is_shareable() {
        assert_send_sync::<FhirCodec<Resource>>();
        assert_send_sync::<FhirCodec<Patient>>();
    }

    #[test]
    fn test_clone_shares_registry() {
        let codec = FhirCodec::new(Resource::registry());
        let clone = codec.clone();
        assert!(std::ptr::eq(codec.registry(), clone.registry()));
        assert_eq!(clone.options(), &CodecOptions::default());
    }

    #[test]
    fn test_pretty_json_option() -> Result<()> {
        let patient = Patient {
            id: Some("p1".to_string().into()),
            ..Default::default()
        };
        let options = CodecOptions::default().with_pretty(true);
        let codec = FhirCodec::with_options(Patient::registry(), options);
        let json = codec.to_json_string(&patient)?;
        assert_eq!(json, "{\n  \"resourceType\": \"Patient\",\n  \"id\": \"p1\"\n}");
        Ok(())
    }
}
