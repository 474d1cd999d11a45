//! General-purpose FHIR datatypes.

use fhirwire_support::{
    ChoiceNode, ChoiceVariant, ElementNode, FhirChoice, FhirElement, FieldDescriptor,
    NodeError, PrimitiveKind, TypeDescriptor,
};

use crate::primitives::{Boolean, Code, Date, DateTime, Decimal, FhirString, Integer, Uri, Xhtml};

/// [Extension](https://hl7.org/fhir/extensibility.html#Extension)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extension {
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub url: String,
    pub value: Option<ExtensionValue>,
}

impl Extension {
    pub fn new(url: impl Into<String>, value: ExtensionValue) -> Self {
        Self {
            url: url.into(),
            value: Some(value),
            ..Default::default()
        }
    }
}

/// `Extension.value[x]`
#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionValue {
    Boolean(Boolean),
    Integer(Integer),
    Decimal(Decimal),
    String(FhirString),
    Code(Code),
    Uri(Uri),
    Date(Date),
    DateTime(DateTime),
    Coding(Coding),
    CodeableConcept(CodeableConcept),
    Quantity(Quantity),
    Period(Period),
    Reference(Reference),
    Identifier(Identifier),
}

static EXTENSION_VALUE_VARIANTS: [ChoiceVariant; 14] = [
    ChoiceVariant::primitive("Boolean", PrimitiveKind::Boolean),
    ChoiceVariant::primitive("Integer", PrimitiveKind::Integer),
    ChoiceVariant::primitive("Decimal", PrimitiveKind::Decimal),
    ChoiceVariant::primitive("String", PrimitiveKind::String),
    ChoiceVariant::primitive("Code", PrimitiveKind::Code),
    ChoiceVariant::primitive("Uri", PrimitiveKind::Uri),
    ChoiceVariant::primitive("Date", PrimitiveKind::Date),
    ChoiceVariant::primitive("DateTime", PrimitiveKind::DateTime),
    ChoiceVariant::element("Coding", Coding::descriptor),
    ChoiceVariant::element("CodeableConcept", CodeableConcept::descriptor),
    ChoiceVariant::element("Quantity", Quantity::descriptor),
    ChoiceVariant::element("Period", Period::descriptor),
    ChoiceVariant::element("Reference", Reference::descriptor),
    ChoiceVariant::element("Identifier", Identifier::descriptor),
];

pub static EXTENSION: TypeDescriptor = TypeDescriptor {
    name: "Extension",
    fields: &[
        FieldDescriptor::attribute("id"),
        FieldDescriptor::elements("extension", Extension::descriptor),
        FieldDescriptor::attribute("url"),
        FieldDescriptor::choice("value", &EXTENSION_VALUE_VARIANTS),
    ],
};

impl FhirElement for Extension {
    fn descriptor() -> &'static TypeDescriptor {
        &EXTENSION
    }

    fn to_node(&self) -> ElementNode {
        let mut node = ElementNode::new();
        node.push_attribute("id", &self.id);
        node.push_elements("extension", &self.extension);
        node.push_attribute("url", &Some(self.url.clone()));
        node.push_choice("value", &self.value);
        node
    }

    fn from_node(mut node: ElementNode) -> Result<Self, NodeError> {
        Ok(Self {
            id: node.take_attribute("id")?,
            extension: node.take_elements("extension")?,
            url: node
                .take_attribute("url")?
                .ok_or(NodeError::MissingField("url"))?,
            value: node.take_choice("value")?,
        })
    }
}

impl FhirChoice for ExtensionValue {
    fn to_choice(&self) -> ChoiceNode {
        match self {
            ExtensionValue::Boolean(v) => ChoiceNode::primitive("Boolean", v),
            ExtensionValue::Integer(v) => ChoiceNode::primitive("Integer", v),
            ExtensionValue::Decimal(v) => ChoiceNode::primitive("Decimal", v),
            ExtensionValue::String(v) => ChoiceNode::primitive("String", v),
            ExtensionValue::Code(v) => ChoiceNode::primitive("Code", v),
            ExtensionValue::Uri(v) => ChoiceNode::primitive("Uri", v),
            ExtensionValue::Date(v) => ChoiceNode::primitive("Date", v),
            ExtensionValue::DateTime(v) => ChoiceNode::primitive("DateTime", v),
            ExtensionValue::Coding(v) => ChoiceNode::element("Coding", v),
            ExtensionValue::CodeableConcept(v) => ChoiceNode::element("CodeableConcept", v),
            ExtensionValue::Quantity(v) => ChoiceNode::element("Quantity", v),
            ExtensionValue::Period(v) => ChoiceNode::element("Period", v),
            ExtensionValue::Reference(v) => ChoiceNode::element("Reference", v),
            ExtensionValue::Identifier(v) => ChoiceNode::element("Identifier", v),
        }
    }

    fn from_choice(choice: ChoiceNode) -> Result<Self, NodeError> {
        let variant = choice.variant;
        match variant {
            "Boolean" => choice.into_primitive().map(ExtensionValue::Boolean),
            "Integer" => choice.into_primitive().map(ExtensionValue::Integer),
            "Decimal" => choice.into_primitive().map(ExtensionValue::Decimal),
            "String" => choice.into_primitive().map(ExtensionValue::String),
            "Code" => choice.into_primitive().map(ExtensionValue::Code),
            "Uri" => choice.into_primitive().map(ExtensionValue::Uri),
            "Date" => choice.into_primitive().map(ExtensionValue::Date),
            "DateTime" => choice.into_primitive().map(ExtensionValue::DateTime),
            "Coding" => choice.into_element().map(ExtensionValue::Coding),
            "CodeableConcept" => choice.into_element().map(ExtensionValue::CodeableConcept),
            "Quantity" => choice.into_element().map(ExtensionValue::Quantity),
            "Period" => choice.into_element().map(ExtensionValue::Period),
            "Reference" => choice.into_element().map(ExtensionValue::Reference),
            "Identifier" => choice.into_element().map(ExtensionValue::Identifier),
            other => Err(NodeError::UnknownVariant {
                field: "value",
                variant: other.to_string(),
            }),
        }
    }
}

/// [Coding](https://hl7.org/fhir/datatypes.html#Coding)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coding {
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub system: Option<Uri>,
    pub version: Option<FhirString>,
    pub code: Option<Code>,
    pub display: Option<FhirString>,
    pub user_selected: Option<Boolean>,
}

pub static CODING: TypeDescriptor = TypeDescriptor {
    name: "Coding",
    fields: &[
        FieldDescriptor::attribute("id"),
        FieldDescriptor::elements("extension", Extension::descriptor),
        FieldDescriptor::primitive("system", PrimitiveKind::Uri),
        FieldDescriptor::primitive("version", PrimitiveKind::String),
        FieldDescriptor::primitive("code", PrimitiveKind::Code),
        FieldDescriptor::primitive("display", PrimitiveKind::String),
        FieldDescriptor::primitive("userSelected", PrimitiveKind::Boolean),
    ],
};

impl FhirElement for Coding {
    fn descriptor() -> &'static TypeDescriptor {
        &CODING
    }

    fn to_node(&self) -> ElementNode {
        let mut node = ElementNode::new();
        node.push_attribute("id", &self.id);
        node.push_elements("extension", &self.extension);
        node.push_primitive("system", &self.system);
        node.push_primitive("version", &self.version);
        node.push_primitive("code", &self.code);
        node.push_primitive("display", &self.display);
        node.push_primitive("userSelected", &self.user_selected);
        node
    }

    fn from_node(mut node: ElementNode) -> Result<Self, NodeError> {
        Ok(Self {
            id: node.take_attribute("id")?,
            extension: node.take_elements("extension")?,
            system: node.take_primitive("system")?,
            version: node.take_primitive("version")?,
            code: node.take_primitive("code")?,
            display: node.take_primitive("display")?,
            user_selected: node.take_primitive("userSelected")?,
        })
    }
}

/// [CodeableConcept](https://hl7.org/fhir/datatypes.html#CodeableConcept)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeableConcept {
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub coding: Vec<Coding>,
    pub text: Option<FhirString>,
}

pub static CODEABLE_CONCEPT: TypeDescriptor = TypeDescriptor {
    name: "CodeableConcept",
    fields: &[
        FieldDescriptor::attribute("id"),
        FieldDescriptor::elements("extension", Extension::descriptor),
        FieldDescriptor::elements("coding", Coding::descriptor),
        FieldDescriptor::primitive("text", PrimitiveKind::String),
    ],
};

impl FhirElement for CodeableConcept {
    fn descriptor() -> &'static TypeDescriptor {
        &CODEABLE_CONCEPT
    }

    fn to_node(&self) -> ElementNode {
        let mut node = ElementNode::new();
        node.push_attribute("id", &self.id);
        node.push_elements("extension", &self.extension);
        node.push_elements("coding", &self.coding);
        node.push_primitive("text", &self.text);
        node
    }

    fn from_node(mut node: ElementNode) -> Result<Self, NodeError> {
        Ok(Self {
            id: node.take_attribute("id")?,
            extension: node.take_elements("extension")?,
            coding: node.take_elements("coding")?,
            text: node.take_primitive("text")?,
        })
    }
}

/// [Quantity](https://hl7.org/fhir/datatypes.html#Quantity)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Quantity {
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub value: Option<Decimal>,
    pub comparator: Option<Code>,
    pub unit: Option<FhirString>,
    pub system: Option<Uri>,
    pub code: Option<Code>,
}

pub static QUANTITY: TypeDescriptor = TypeDescriptor {
    name: "Quantity",
    fields: &[
        FieldDescriptor::attribute("id"),
        FieldDescriptor::elements("extension", Extension::descriptor),
        FieldDescriptor::primitive("value", PrimitiveKind::Decimal),
        FieldDescriptor::primitive("comparator", PrimitiveKind::Code),
        FieldDescriptor::primitive("unit", PrimitiveKind::String),
        FieldDescriptor::primitive("system", PrimitiveKind::Uri),
        FieldDescriptor::primitive("code", PrimitiveKind::Code),
    ],
};

impl FhirElement for Quantity {
    fn descriptor() -> &'static TypeDescriptor {
        &QUANTITY
    }

    fn to_node(&self) -> ElementNode {
        let mut node = ElementNode::new();
        node.push_attribute("id", &self.id);
        node.push_elements("extension", &self.extension);
        node.push_primitive("value", &self.value);
        node.push_primitive("comparator", &self.comparator);
        node.push_primitive("unit", &self.unit);
        node.push_primitive("system", &self.system);
        node.push_primitive("code", &self.code);
        node
    }

    fn from_node(mut node: ElementNode) -> Result<Self, NodeError> {
        Ok(Self {
            id: node.take_attribute("id")?,
            extension: node.take_elements("extension")?,
            value: node.take_primitive("value")?,
            comparator: node.take_primitive("comparator")?,
            unit: node.take_primitive("unit")?,
            system: node.take_primitive("system")?,
            code: node.take_primitive("code")?,
        })
    }
}

/// [Period](https://hl7.org/fhir/datatypes.html#Period)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Period {
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub start: Option<DateTime>,
    pub end: Option<DateTime>,
}

pub static PERIOD: TypeDescriptor = TypeDescriptor {
    name: "Period",
    fields: &[
        FieldDescriptor::attribute("id"),
        FieldDescriptor::elements("extension", Extension::descriptor),
        FieldDescriptor::primitive("start", PrimitiveKind::DateTime),
        FieldDescriptor::primitive("end", PrimitiveKind::DateTime),
    ],
};

impl FhirElement for Period {
    fn descriptor() -> &'static TypeDescriptor {
        &PERIOD
    }

    fn to_node(&self) -> ElementNode {
        let mut node = ElementNode::new();
        node.push_attribute("id", &self.id);
        node.push_elements("extension", &self.extension);
        node.push_primitive("start", &self.start);
        node.push_primitive("end", &self.end);
        node
    }

    fn from_node(mut node: ElementNode) -> Result<Self, NodeError> {
        Ok(Self {
            id: node.take_attribute("id")?,
            extension: node.take_elements("extension")?,
            start: node.take_primitive("start")?,
            end: node.take_primitive("end")?,
        })
    }
}

/// [Reference](https://hl7.org/fhir/references.html#Reference)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reference {
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub reference: Option<FhirString>,
    pub type_: Option<Uri>,
    pub display: Option<FhirString>,
}

pub static REFERENCE: TypeDescriptor = TypeDescriptor {
    name: "Reference",
    fields: &[
        FieldDescriptor::attribute("id"),
        FieldDescriptor::elements("extension", Extension::descriptor),
        FieldDescriptor::primitive("reference", PrimitiveKind::String),
        FieldDescriptor::primitive("type", PrimitiveKind::Uri),
        FieldDescriptor::primitive("display", PrimitiveKind::String),
    ],
};

impl FhirElement for Reference {
    fn descriptor() -> &'static TypeDescriptor {
        &REFERENCE
    }

    fn to_node(&self) -> ElementNode {
        let mut node = ElementNode::new();
        node.push_attribute("id", &self.id);
        node.push_elements("extension", &self.extension);
        node.push_primitive("reference", &self.reference);
        node.push_primitive("type", &self.type_);
        node.push_primitive("display", &self.display);
        node
    }

    fn from_node(mut node: ElementNode) -> Result<Self, NodeError> {
        Ok(Self {
            id: node.take_attribute("id")?,
            extension: node.take_elements("extension")?,
            reference: node.take_primitive("reference")?,
            type_: node.take_primitive("type")?,
            display: node.take_primitive("display")?,
        })
    }
}

/// [Identifier](https://hl7.org/fhir/datatypes.html#Identifier)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Identifier {
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub use_: Option<Code>,
    pub type_: Option<CodeableConcept>,
    pub system: Option<Uri>,
    pub value: Option<FhirString>,
    pub period: Option<Period>,
}

pub static IDENTIFIER: TypeDescriptor = TypeDescriptor {
    name: "Identifier",
    fields: &[
        FieldDescriptor::attribute("id"),
        FieldDescriptor::elements("extension", Extension::descriptor),
        FieldDescriptor::primitive("use", PrimitiveKind::Code),
        FieldDescriptor::element("type", CodeableConcept::descriptor),
        FieldDescriptor::primitive("system", PrimitiveKind::Uri),
        FieldDescriptor::primitive("value", PrimitiveKind::String),
        FieldDescriptor::element("period", Period::descriptor),
    ],
};

impl FhirElement for Identifier {
    fn descriptor() -> &'static TypeDescriptor {
        &IDENTIFIER
    }

    fn to_node(&self) -> ElementNode {
        let mut node = ElementNode::new();
        node.push_attribute("id", &self.id);
        node.push_elements("extension", &self.extension);
        node.push_primitive("use", &self.use_);
        node.push_element("type", &self.type_);
        node.push_primitive("system", &self.system);
        node.push_primitive("value", &self.value);
        node.push_element("period", &self.period);
        node
    }

    fn from_node(mut node: ElementNode) -> Result<Self, NodeError> {
        Ok(Self {
            id: node.take_attribute("id")?,
            extension: node.take_elements("extension")?,
            use_: node.take_primitive("use")?,
            type_: node.take_element("type")?,
            system: node.take_primitive("system")?,
            value: node.take_primitive("value")?,
            period: node.take_element("period")?,
        })
    }
}

/// [HumanName](https://hl7.org/fhir/datatypes.html#HumanName)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HumanName {
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub use_: Option<Code>,
    pub text: Option<FhirString>,
    pub family: Option<FhirString>,
    pub given: Vec<FhirString>,
    pub prefix: Vec<FhirString>,
    pub suffix: Vec<FhirString>,
    pub period: Option<Period>,
}

pub static HUMAN_NAME: TypeDescriptor = TypeDescriptor {
    name: "HumanName",
    fields: &[
        FieldDescriptor::attribute("id"),
        FieldDescriptor::elements("extension", Extension::descriptor),
        FieldDescriptor::primitive("use", PrimitiveKind::Code),
        FieldDescriptor::primitive("text", PrimitiveKind::String),
        FieldDescriptor::primitive("family", PrimitiveKind::String),
        FieldDescriptor::primitives("given", PrimitiveKind::String),
        FieldDescriptor::primitives("prefix", PrimitiveKind::String),
        FieldDescriptor::primitives("suffix", PrimitiveKind::String),
        FieldDescriptor::element("period", Period::descriptor),
    ],
};

impl FhirElement for HumanName {
    fn descriptor() -> &'static TypeDescriptor {
        &HUMAN_NAME
    }

    fn to_node(&self) -> ElementNode {
        let mut node = ElementNode::new();
        node.push_attribute("id", &self.id);
        node.push_elements("extension", &self.extension);
        node.push_primitive("use", &self.use_);
        node.push_primitive("text", &self.text);
        node.push_primitive("family", &self.family);
        node.push_primitives("given", &self.given);
        node.push_primitives("prefix", &self.prefix);
        node.push_primitives("suffix", &self.suffix);
        node.push_element("period", &self.period);
        node
    }

    fn from_node(mut node: ElementNode) -> Result<Self, NodeError> {
        Ok(Self {
            id: node.take_attribute("id")?,
            extension: node.take_elements("extension")?,
            use_: node.take_primitive("use")?,
            text: node.take_primitive("text")?,
            family: node.take_primitive("family")?,
            given: node.take_primitives("given")?,
            prefix: node.take_primitives("prefix")?,
            suffix: node.take_primitives("suffix")?,
            period: node.take_element("period")?,
        })
    }
}

/// [Narrative](https://hl7.org/fhir/narrative.html#Narrative)
///
/// `div` holds the complete XHTML fragment, including the outer `<div>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Narrative {
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub status: Option<Code>,
    pub div: Option<Xhtml>,
}

pub static NARRATIVE: TypeDescriptor = TypeDescriptor {
    name: "Narrative",
    fields: &[
        FieldDescriptor::attribute("id"),
        FieldDescriptor::elements("extension", Extension::descriptor),
        FieldDescriptor::primitive("status", PrimitiveKind::Code),
        FieldDescriptor::primitive("div", PrimitiveKind::Xhtml),
    ],
};

impl FhirElement for Narrative {
    fn descriptor() -> &'static TypeDescriptor {
        &NARRATIVE
    }

    fn to_node(&self) -> ElementNode {
        let mut node = ElementNode::new();
        node.push_attribute("id", &self.id);
        node.push_elements("extension", &self.extension);
        node.push_primitive("status", &self.status);
        node.push_primitive("div", &self.div);
        node
    }

    fn from_node(mut node: ElementNode) -> Result<Self, NodeError> {
        Ok(Self {
            id: node.take_attribute("id")?,
            extension: node.take_elements("extension")?,
            status: node.take_primitive("status")?,
            div: node.take_primitive("div")?,
        })
    }
}
