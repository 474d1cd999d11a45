//! XML deserialization: quick-xml events → node tree → typed resource.
//!
//! The reader keeps whitespace text so narrative XHTML is copied through
//! verbatim; everywhere else whitespace between elements is skipped.

use std::io::BufRead;

use fhirwire_support::{
    CellNode, ChoiceNode, ElementNode, FhirElement, FieldKind, FieldValue, PrimitiveKind,
    Registry, ResourceEntry, ResourceNode, ResourceSet, Scalar, TypeDescriptor, VariantKind,
    VariantValue,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Result, SerdeError};
use crate::fields::ChoiceTracker;
use crate::options::CodecOptions;
use crate::xml::utils::{self, EXTENSION_ELEMENT, FHIR_NAMESPACE};

/// Deserialize a FHIR resource from an XML string.
///
/// # Examples
///
/// ```
/// use fhirwire_models::Resource;
/// use fhirwire_serde::xml::from_xml_str;
/// use fhirwire_support::ResourceSet;
///
/// let xml = r#"<Patient xmlns="http://hl7.org/fhir">
///   <id value="example"/>
/// </Patient>"#;
/// let resource = from_xml_str(&Resource::registry(), xml)?;
/// assert_eq!(resource.resource_id(), Some("example"));
/// # Ok::<(), fhirwire_serde::SerdeError>(())
/// ```
pub fn from_xml_str<R: ResourceSet>(registry: &Registry<R>, xml: &str) -> Result<R> {
    from_xml_reader(registry, xml.as_bytes())
}

/// Deserialize a FHIR resource from XML bytes.
pub fn from_xml_slice<R: ResourceSet>(registry: &Registry<R>, xml: &[u8]) -> Result<R> {
    from_xml_reader(registry, xml)
}

/// Deserialize a FHIR resource from an XML reader.
pub fn from_xml_reader<R: ResourceSet, B: BufRead>(registry: &Registry<R>, reader: B) -> Result<R> {
    XmlDecoder::new(registry, &CodecOptions::default(), reader).document()
}

/// XML decoder reading quick-xml events against the descriptor tables.
pub(crate) struct XmlDecoder<'a, R, B: BufRead> {
    reader: Reader<B>,
    /// Buffer for reading events
    buf: Vec<u8>,
    registry: &'a Registry<R>,
    options: &'a CodecOptions,
    extension: &'static TypeDescriptor,
}

impl<'a, R: ResourceSet, B: BufRead> XmlDecoder<'a, R, B> {
    pub(crate) fn new(registry: &'a Registry<R>, options: &'a CodecOptions, input: B) -> Self {
        let mut reader = Reader::from_reader(input);
        reader.config_mut().trim_text(false);
        Self {
            reader,
            buf: Vec::new(),
            registry,
            options,
            extension: <R::Extension as FhirElement>::descriptor(),
        }
    }

    /// Decodes the whole document into the typed resource set.
    pub(crate) fn document(mut self) -> Result<R> {
        let (entry, node) = self.root()?;
        Ok(entry.decode(node)?)
    }

    /// Decodes the whole document without leaving the node tree.
    pub(crate) fn document_node(mut self) -> Result<ResourceNode> {
        let (entry, node) = self.root()?;
        Ok(ResourceNode::new(entry.descriptor(), node))
    }

    fn root(&mut self) -> Result<(&'a ResourceEntry<R>, ElementNode)> {
        let (start, empty) = match self.next_event()? {
            Event::Start(start) => (start, false),
            Event::Empty(start) => (start, true),
            other => return Err(unexpected("document", &other)),
        };
        self.check_root_namespace(&start)?;

        let name = utils::name_to_string(start.name().as_ref());
        let registry = self.registry;
        let Some(entry) = registry.get(&name) else {
            return Err(SerdeError::UnknownResourceType(name));
        };
        let node = self.element(entry.descriptor(), &start, empty)?;

        match self.next_event()? {
            Event::Eof => Ok((entry, node)),
            other => Err(unexpected("document", &other)),
        }
    }

    /// The root must be unprefixed and declare the FHIR default namespace.
    fn check_root_namespace(&self, start: &BytesStart<'_>) -> Result<()> {
        let name = start.name();
        if utils::is_prefixed(name.as_ref()) {
            return Err(SerdeError::NamespaceMismatch {
                expected: FHIR_NAMESPACE.to_string(),
                found: format!("prefixed root <{}>", utils::name_to_string(name.as_ref())),
            });
        }
        let decoder = self.reader.decoder();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            if attr.key.as_ref() == b"xmlns" {
                let value = attr
                    .decode_and_unescape_value(decoder)
                    .map_err(quick_xml::Error::from)?;
                if value == FHIR_NAMESPACE {
                    return Ok(());
                }
                return Err(SerdeError::NamespaceMismatch {
                    expected: FHIR_NAMESPACE.to_string(),
                    found: value.into_owned(),
                });
            }
        }
        Err(SerdeError::NamespaceMismatch {
            expected: FHIR_NAMESPACE.to_string(),
            found: String::new(),
        })
    }

    fn read_event(&mut self) -> Result<Event<'static>> {
        self.buf.clear();
        let event = self.reader.read_event_into(&mut self.buf)?;
        Ok(event.into_owned())
    }

    /// Next structural event: skips the declaration, comments, processing
    /// instructions and whitespace text.
    fn next_event(&mut self) -> Result<Event<'static>> {
        loop {
            match self.read_event()? {
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
                Event::Text(text) if utils::is_whitespace(&text) => {}
                event => return Ok(event),
            }
        }
    }

    /// Attributes other than namespace declarations. A default namespace
    /// other than FHIR's and any prefixed attribute are rejected here.
    fn attributes(&self, start: &BytesStart<'_>, tag: &str) -> Result<Vec<(String, String)>> {
        let decoder = self.reader.decoder();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = attr.key.as_ref();
            if utils::is_namespace_declaration(key) {
                if key == b"xmlns" {
                    let value = attr
                        .decode_and_unescape_value(decoder)
                        .map_err(quick_xml::Error::from)?;
                    if value != FHIR_NAMESPACE {
                        return Err(SerdeError::NamespaceMismatch {
                            expected: FHIR_NAMESPACE.to_string(),
                            found: value.into_owned(),
                        });
                    }
                }
                continue;
            }
            let name = utils::name_to_string(key);
            if utils::is_prefixed(key) {
                return Err(SerdeError::UnexpectedAttribute {
                    element: tag.to_string(),
                    attribute: name,
                });
            }
            let value = attr
                .decode_and_unescape_value(decoder)
                .map_err(quick_xml::Error::from)?;
            attributes.push((name, value.into_owned()));
        }
        Ok(attributes)
    }

    fn element(
        &mut self,
        descriptor: &'static TypeDescriptor,
        start: &BytesStart<'_>,
        empty: bool,
    ) -> Result<ElementNode> {
        let tag = utils::name_to_string(start.name().as_ref());
        let mut node = ElementNode::new();
        for (key, value) in self.attributes(start, &tag)? {
            match descriptor.field(&key) {
                Some(field) if matches!(field.kind, FieldKind::Attribute) => {
                    node.insert(field.name, FieldValue::Attribute(value));
                }
                _ => {
                    return Err(SerdeError::UnexpectedAttribute {
                        element: tag,
                        attribute: key,
                    });
                }
            }
        }
        if empty {
            return Ok(node);
        }

        let mut choices = ChoiceTracker::default();
        loop {
            match self.next_event()? {
                Event::Start(child) => {
                    self.child(descriptor, &mut node, &mut choices, &child, false)?
                }
                Event::Empty(child) => self.child(descriptor, &mut node, &mut choices, &child, true)?,
                Event::End(_) => return Ok(node),
                other => return Err(unexpected(&tag, &other)),
            }
        }
    }

    fn child(
        &mut self,
        descriptor: &'static TypeDescriptor,
        node: &mut ElementNode,
        choices: &mut ChoiceTracker,
        start: &BytesStart<'_>,
        empty: bool,
    ) -> Result<()> {
        let raw_name = start.name();
        let tag = utils::name_to_string(raw_name.as_ref());
        let resolved = if utils::is_prefixed(raw_name.as_ref()) {
            None
        } else {
            descriptor.resolve(&tag)
        };
        let Some((field, variant)) = resolved else {
            self.options.unknown_field(descriptor.name, &tag)?;
            return self.skip(empty);
        };

        let value = if let Some(variant) = variant {
            choices.record(field, variant)?;
            let value = match variant.kind {
                VariantKind::Primitive(kind) => {
                    let cell = self.cell(kind, &tag, start, empty)?;
                    if cell.is_empty() {
                        return Ok(());
                    }
                    VariantValue::Primitive(cell)
                }
                VariantKind::Composite(child) => {
                    VariantValue::Composite(self.element(child(), start, empty)?)
                }
            };
            FieldValue::Choice(ChoiceNode {
                variant: variant.suffix,
                value,
            })
        } else {
            match field.kind {
                FieldKind::Primitive(kind) => {
                    let cell = self.cell(kind, &tag, start, empty)?;
                    // an empty list entry keeps its slot, as a JSON `null` does
                    if cell.is_empty() && !field.repeated {
                        return Ok(());
                    }
                    FieldValue::Primitive(cell)
                }
                FieldKind::Composite(child) => {
                    FieldValue::Composite(self.element(child(), start, empty)?)
                }
                FieldKind::Resource => FieldValue::Resource(self.wrapped_resource(&tag, start, empty)?),
                FieldKind::Attribute => {
                    return Err(SerdeError::invalid(tag, "expected an XML attribute, found an element"));
                }
                FieldKind::Choice(_) => {
                    return Err(SerdeError::invalid(tag, "choice element without a type suffix"));
                }
            }
        };

        if field.repeated {
            append(node, field.name, value);
        } else if node.contains(field.name) {
            return Err(SerdeError::invalid(tag, "repeated element for a single-valued field"));
        } else {
            node.insert(field.name, value);
        }
        Ok(())
    }

    /// A primitive element: `id` and `value` attributes plus `<extension>` children.
    fn cell(
        &mut self,
        kind: PrimitiveKind,
        tag: &str,
        start: &BytesStart<'_>,
        empty: bool,
    ) -> Result<CellNode> {
        if kind == PrimitiveKind::Xhtml {
            let markup = self.raw_element(tag, start, empty)?;
            return Ok(CellNode {
                value: Some(Scalar::Text(markup)),
                ..Default::default()
            });
        }

        let mut cell = CellNode::default();
        for (key, value) in self.attributes(start, tag)? {
            match key.as_str() {
                "id" => cell.id = Some(value),
                "value" => {
                    let scalar = kind
                        .parse_lexical(&value)
                        .map_err(|e| SerdeError::invalid(tag, e.to_string()))?;
                    cell.value = Some(scalar);
                }
                _ => {
                    return Err(SerdeError::UnexpectedAttribute {
                        element: tag.to_string(),
                        attribute: key,
                    });
                }
            }
        }
        if empty {
            return Ok(cell);
        }

        let extension = self.extension;
        loop {
            let (child, child_empty) = match self.next_event()? {
                Event::Start(child) => (child, false),
                Event::Empty(child) => (child, true),
                Event::End(_) => return Ok(cell),
                other => return Err(unexpected(tag, &other)),
            };
            if child.name().as_ref() == EXTENSION_ELEMENT.as_bytes() {
                cell.extension.push(self.element(extension, &child, child_empty)?);
            } else {
                let name = utils::name_to_string(child.name().as_ref());
                self.options.unknown_field(kind.as_str(), &name)?;
                self.skip(child_empty)?;
            }
        }
    }

    /// `<contained><Patient>…</Patient></contained>`: the wrapper holds exactly
    /// one resource element, resolved through the registry's nested table.
    fn wrapped_resource(
        &mut self,
        tag: &str,
        start: &BytesStart<'_>,
        empty: bool,
    ) -> Result<ResourceNode> {
        if let Some((attribute, _)) = self.attributes(start, tag)?.into_iter().next() {
            return Err(SerdeError::UnexpectedAttribute {
                element: tag.to_string(),
                attribute,
            });
        }
        if empty {
            return Err(SerdeError::invalid(tag, "missing the resource element"));
        }

        let (inner, inner_empty) = match self.next_event()? {
            Event::Start(inner) => (inner, false),
            Event::Empty(inner) => (inner, true),
            Event::End(_) => return Err(SerdeError::invalid(tag, "missing the resource element")),
            other => return Err(unexpected(tag, &other)),
        };
        let name = utils::name_to_string(inner.name().as_ref());
        let Some(descriptor) = self.registry.nested(&name) else {
            return Err(SerdeError::UnknownResourceType(name));
        };
        let node = self.element(descriptor, &inner, inner_empty)?;

        match self.next_event()? {
            Event::End(_) => Ok(ResourceNode::new(descriptor, node)),
            other => Err(unexpected(tag, &other)),
        }
    }

    /// Copies an element and everything inside it back out as markup.
    fn raw_element(&mut self, tag: &str, start: &BytesStart<'_>, empty: bool) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        if empty {
            writer.write_event(Event::Empty(start.borrow()))?;
        } else {
            writer.write_event(Event::Start(start.borrow()))?;
            let mut depth = 1usize;
            while depth > 0 {
                let event = self.read_event()?;
                match &event {
                    Event::Start(_) => depth += 1,
                    Event::End(_) => depth -= 1,
                    Event::Eof => {
                        return Err(SerdeError::invalid(tag, "unexpected end of document"));
                    }
                    _ => {}
                }
                writer.write_event(event)?;
            }
        }
        String::from_utf8(writer.into_inner()).map_err(|e| SerdeError::invalid(tag, e.to_string()))
    }

    /// Skips the element just opened, including all of its content.
    fn skip(&mut self, empty: bool) -> Result<()> {
        if empty {
            return Ok(());
        }
        let mut depth = 1usize;
        while depth > 0 {
            match self.read_event()? {
                Event::Start(_) => depth += 1,
                Event::End(_) => depth -= 1,
                Event::Eof => {
                    return Err(SerdeError::invalid("document", "unexpected end of document"));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Adds one occurrence of a repeated element to its list.
fn append(node: &mut ElementNode, name: &'static str, value: FieldValue) {
    let merged = match (node.remove(name), value) {
        (Some(FieldValue::Primitives(mut cells)), FieldValue::Primitive(cell)) => {
            cells.push(cell);
            FieldValue::Primitives(cells)
        }
        (Some(FieldValue::Composites(mut children)), FieldValue::Composite(child)) => {
            children.push(child);
            FieldValue::Composites(children)
        }
        (Some(FieldValue::Resources(mut resources)), FieldValue::Resource(resource)) => {
            resources.push(resource);
            FieldValue::Resources(resources)
        }
        (_, FieldValue::Primitive(cell)) => FieldValue::Primitives(vec![cell]),
        (_, FieldValue::Composite(child)) => FieldValue::Composites(vec![child]),
        (_, FieldValue::Resource(resource)) => FieldValue::Resources(vec![resource]),
        (_, other) => other,
    };
    node.insert(name, merged);
}

fn unexpected(context: &str, event: &Event<'_>) -> SerdeError {
    let found = match event {
        Event::Start(start) | Event::Empty(start) => {
            format!("element <{}>", utils::name_to_string(start.name().as_ref()))
        }
        Event::End(end) => format!("closing </{}>", utils::name_to_string(end.name().as_ref())),
        Event::Text(_) | Event::CData(_) | Event::GeneralRef(_) => "text content".to_string(),
        Event::Eof => "end of document".to_string(),
        _ => "markup".to_string(),
    };
    SerdeError::invalid(context, format!("unexpected {}", found))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_builds_lists_in_order() {
        let mut node = ElementNode::new();
        append(
            &mut node,
            "given",
            FieldValue::Primitive(CellNode {
                value: Some(Scalar::Text("A".to_string())),
                ..Default::default()
            }),
        );
        append(
            &mut node,
            "given",
            FieldValue::Primitive(CellNode::metadata(Some("g2".to_string()), Vec::new())),
        );

        match node.get("given") {
            Some(FieldValue::Primitives(cells)) => {
                assert_eq!(cells.len(), 2);
                assert_eq!(cells[0].value, Some(Scalar::Text("A".to_string())));
                assert_eq!(cells[1].id.as_deref(), Some("g2"));
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_unexpected_names_the_event() {
        let err = unexpected("Patient", &Event::Eof);
        assert_eq!(
            err.to_string(),
            "invalid value for 'Patient': unexpected end of document"
        );
    }
}
