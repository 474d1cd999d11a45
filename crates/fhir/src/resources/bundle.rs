use fhirwire_support::{
    ElementNode, FhirElement, FhirResource, FieldDescriptor, NodeError, PrimitiveKind,
    TypeDescriptor,
};

use crate::datatypes::Extension;
use crate::primitives::{Code, Id, UnsignedInt, Uri};
use crate::resources::Resource;

/// [Bundle](https://hl7.org/fhir/bundle.html)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bundle {
    pub id: Option<Id>,
    pub type_: Option<Code>,
    pub total: Option<UnsignedInt>,
    pub entry: Vec<BundleEntry>,
}

/// `Bundle.entry`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BundleEntry {
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub full_url: Option<Uri>,
    pub resource: Option<Resource>,
}

pub static BUNDLE: TypeDescriptor = TypeDescriptor {
    name: "Bundle",
    fields: &[
        FieldDescriptor::primitive("id", PrimitiveKind::Id),
        FieldDescriptor::primitive("type", PrimitiveKind::Code),
        FieldDescriptor::primitive("total", PrimitiveKind::UnsignedInt),
        FieldDescriptor::elements("entry", BundleEntry::descriptor),
    ],
};

pub static BUNDLE_ENTRY: TypeDescriptor = TypeDescriptor {
    name: "BundleEntry",
    fields: &[
        FieldDescriptor::attribute("id"),
        FieldDescriptor::elements("extension", Extension::descriptor),
        FieldDescriptor::primitive("fullUrl", PrimitiveKind::Uri),
        FieldDescriptor::resource("resource"),
    ],
};

impl FhirElement for Bundle {
    fn descriptor() -> &'static TypeDescriptor {
        &BUNDLE
    }

    fn to_node(&self) -> ElementNode {
        let mut node = ElementNode::new();
        node.push_primitive("id", &self.id);
        node.push_primitive("type", &self.type_);
        node.push_primitive("total", &self.total);
        node.push_elements("entry", &self.entry);
        node
    }

    fn from_node(mut node: ElementNode) -> Result<Self, NodeError> {
        Ok(Self {
            id: node.take_primitive("id")?,
            type_: node.take_primitive("type")?,
            total: node.take_primitive("total")?,
            entry: node.take_elements("entry")?,
        })
    }
}

impl FhirResource for Bundle {
    const RESOURCE_TYPE: &'static str = "Bundle";
}

impl FhirElement for BundleEntry {
    fn descriptor() -> &'static TypeDescriptor {
        &BUNDLE_ENTRY
    }

    fn to_node(&self) -> ElementNode {
        let mut node = ElementNode::new();
        node.push_attribute("id", &self.id);
        node.push_elements("extension", &self.extension);
        node.push_primitive("fullUrl", &self.full_url);
        node.push_resource("resource", &self.resource);
        node
    }

    fn from_node(mut node: ElementNode) -> Result<Self, NodeError> {
        Ok(Self {
            id: node.take_attribute("id")?,
            extension: node.take_elements("extension")?,
            full_url: node.take_primitive("fullUrl")?,
            resource: node.take_resource("resource")?,
        })
    }
}
