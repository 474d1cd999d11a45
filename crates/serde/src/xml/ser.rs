//! XML serialization: typed resource → node tree → quick-xml events.
//!
//! Fields are written in descriptor order. Primitive cells become
//! `<name id=".." value="..">` with their extensions as children, choice
//! fields use the suffixed element name, and nested resources are wrapped in
//! an element named after the field.

use std::io::Write;

use fhirwire_support::{
    CellNode, ElementNode, FhirElement, FieldValue, PrimitiveKind, ResourceNode, ResourceSet,
    Scalar, TypeDescriptor, VariantValue,
};
use quick_xml::Writer;
use quick_xml::events::{BytesStart, BytesText, Event};

use crate::error::{Result, SerdeError};
use crate::fields;
use crate::xml::utils::{EXTENSION_ELEMENT, FHIR_NAMESPACE};

/// Serialize a FHIR resource to an XML string.
///
/// # Examples
///
/// ```
/// use fhirwire_models::{Patient, primitives::Date};
/// use fhirwire_serde::xml::to_xml_string;
///
/// let patient = Patient {
///     birth_date: Some(Date::new("1974-12-25".to_string())),
///     ..Default::default()
/// };
/// let xml = to_xml_string(&patient)?;
/// assert_eq!(
///     xml,
///     r#"<Patient xmlns="http://hl7.org/fhir"><birthDate value="1974-12-25"/></Patient>"#
/// );
/// # Ok::<(), fhirwire_serde::SerdeError>(())
/// ```
pub fn to_xml_string<R: ResourceSet>(resource: &R) -> Result<String> {
    let buffer = to_xml_vec(resource)?;
    String::from_utf8(buffer).map_err(|e| SerdeError::invalid("document", e.to_string()))
}

/// Serialize a FHIR resource to an XML byte vector.
pub fn to_xml_vec<R: ResourceSet>(resource: &R) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    to_xml_writer(resource, &mut buffer)?;
    Ok(buffer)
}

/// Serialize a FHIR resource to an XML writer.
pub fn to_xml_writer<R: ResourceSet, W: Write>(resource: &R, writer: W) -> Result<()> {
    XmlEncoder::for_set::<R>(writer, false).document(&resource.to_resource_node())
}

/// Writes node trees as FHIR XML.
pub(crate) struct XmlEncoder<W: Write> {
    writer: Writer<W>,
    extension: &'static TypeDescriptor,
}

impl<W: Write> XmlEncoder<W> {
    pub(crate) fn for_set<R: ResourceSet>(output: W, pretty: bool) -> Self {
        Self::new(<R::Extension as FhirElement>::descriptor(), output, pretty)
    }

    pub(crate) fn new(extension: &'static TypeDescriptor, output: W, pretty: bool) -> Self {
        let writer = if pretty {
            Writer::new_with_indent(output, b' ', 2)
        } else {
            Writer::new(output)
        };
        Self { writer, extension }
    }

    /// Writes `resource` as the root element, declaring the FHIR namespace.
    pub(crate) fn document(mut self, resource: &ResourceNode) -> Result<()> {
        let mut start = BytesStart::new(resource.resource_type());
        start.push_attribute(("xmlns", FHIR_NAMESPACE));
        self.element(start, resource.descriptor, &resource.node)
    }

    fn element(
        &mut self,
        mut start: BytesStart<'_>,
        descriptor: &'static TypeDescriptor,
        node: &ElementNode,
    ) -> Result<()> {
        let mut has_children = false;
        for field in descriptor.fields {
            match node.get(field.name) {
                Some(FieldValue::Attribute(value)) => {
                    start.push_attribute((field.name, value.as_str()));
                }
                Some(value) if value.has_content() => has_children = true,
                Some(_) => {}
                None => {}
            }
        }

        if !has_children {
            self.writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        let end = start.to_end().into_owned();
        self.writer.write_event(Event::Start(start))?;
        self.children(descriptor, node)?;
        self.writer.write_event(Event::End(end))?;
        Ok(())
    }

    fn children(&mut self, descriptor: &'static TypeDescriptor, node: &ElementNode) -> Result<()> {
        for field in descriptor.fields {
            let Some(value) = node.get(field.name).filter(|value| value.has_content()) else {
                continue;
            };
            match value {
                FieldValue::Attribute(_) => {}
                FieldValue::Primitive(cell) => {
                    let xhtml = field.primitive_kind() == Some(PrimitiveKind::Xhtml);
                    self.cell(field.name, xhtml, cell)?;
                }
                FieldValue::Primitives(cells) => {
                    for cell in cells {
                        self.cell(field.name, false, cell)?;
                    }
                }
                FieldValue::Composite(child) => {
                    let descriptor = fields::composite(field)?;
                    self.element(BytesStart::new(field.name), descriptor, child)?;
                }
                FieldValue::Composites(children) => {
                    let descriptor = fields::composite(field)?;
                    for child in children.iter().filter(|child| child.has_content()) {
                        self.element(BytesStart::new(field.name), descriptor, child)?;
                    }
                }
                FieldValue::Choice(choice) => {
                    let variant = fields::variant(field, choice.variant)?;
                    let name = field.variant_key(variant);
                    match &choice.value {
                        VariantValue::Primitive(cell) => self.cell(&name, false, cell)?,
                        VariantValue::Composite(child) => {
                            let descriptor = variant
                                .composite()
                                .ok_or_else(|| fields::not_described(&name, "an element"))?;
                            self.element(BytesStart::new(name.as_str()), descriptor, child)?;
                        }
                    }
                }
                FieldValue::Resource(resource) => self.wrapped_resource(field.name, resource)?,
                FieldValue::Resources(resources) => {
                    for resource in resources {
                        self.wrapped_resource(field.name, resource)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// `<name id=".." value="..">` plus one `<extension>` child per extension.
    /// Narrative XHTML is written through unchanged.
    fn cell(&mut self, name: &str, xhtml: bool, cell: &CellNode) -> Result<()> {
        if xhtml {
            if let Some(Scalar::Text(markup)) = &cell.value {
                self.writer
                    .write_event(Event::Text(BytesText::from_escaped(markup.as_str())))?;
                return Ok(());
            }
        }

        let mut start = BytesStart::new(name);
        if let Some(id) = &cell.id {
            start.push_attribute(("id", id.as_str()));
        }
        let lexical = cell.value.as_ref().map(Scalar::to_lexical);
        if let Some(value) = &lexical {
            start.push_attribute(("value", value.as_str()));
        }

        if cell.extension.is_empty() {
            self.writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        let end = start.to_end().into_owned();
        self.writer.write_event(Event::Start(start))?;
        let extension = self.extension;
        for item in &cell.extension {
            self.element(BytesStart::new(EXTENSION_ELEMENT), extension, item)?;
        }
        self.writer.write_event(Event::End(end))?;
        Ok(())
    }

    /// `<contained><Patient>…</Patient></contained>`
    fn wrapped_resource(&mut self, name: &str, resource: &ResourceNode) -> Result<()> {
        let wrapper = BytesStart::new(name);
        let end = wrapper.to_end().into_owned();
        self.writer.write_event(Event::Start(wrapper))?;
        self.element(
            BytesStart::new(resource.resource_type()),
            resource.descriptor,
            &resource.node,
        )?;
        self.writer.write_event(Event::End(end))?;
        Ok(())
    }
}
