use fhirwire_support::{
    ChoiceNode, ChoiceVariant, ElementNode, FhirChoice, FhirElement, FhirResource,
    FieldDescriptor, NodeError, PrimitiveKind, TypeDescriptor,
};

use crate::datatypes::{
    CodeableConcept, Extension, Identifier, Narrative, Period, Quantity, Reference,
};
use crate::primitives::{Boolean, Code, DateTime, FhirString, Id, Instant, Integer};
use crate::resources::Resource;

/// [Observation](https://hl7.org/fhir/observation.html)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observation {
    pub id: Option<Id>,
    pub text: Option<Narrative>,
    pub contained: Vec<Resource>,
    pub extension: Vec<Extension>,
    pub identifier: Vec<Identifier>,
    pub status: Option<Code>,
    pub category: Vec<CodeableConcept>,
    pub code: Option<CodeableConcept>,
    pub subject: Option<Reference>,
    pub effective: Option<ObservationEffective>,
    pub issued: Option<Instant>,
    pub value: Option<ObservationValue>,
}

/// `Observation.effective[x]`
#[derive(Debug, Clone, PartialEq)]
pub enum ObservationEffective {
    DateTime(DateTime),
    Period(Period),
    Instant(Instant),
}

/// `Observation.value[x]`
#[derive(Debug, Clone, PartialEq)]
pub enum ObservationValue {
    Quantity(Quantity),
    CodeableConcept(CodeableConcept),
    String(FhirString),
    Boolean(Boolean),
    Integer(Integer),
    DateTime(DateTime),
    Period(Period),
}

static EFFECTIVE_VARIANTS: [ChoiceVariant; 3] = [
    ChoiceVariant::primitive("DateTime", PrimitiveKind::DateTime),
    ChoiceVariant::element("Period", Period::descriptor),
    ChoiceVariant::primitive("Instant", PrimitiveKind::Instant),
];

static VALUE_VARIANTS: [ChoiceVariant; 7] = [
    ChoiceVariant::element("Quantity", Quantity::descriptor),
    ChoiceVariant::element("CodeableConcept", CodeableConcept::descriptor),
    ChoiceVariant::primitive("String", PrimitiveKind::String),
    ChoiceVariant::primitive("Boolean", PrimitiveKind::Boolean),
    ChoiceVariant::primitive("Integer", PrimitiveKind::Integer),
    ChoiceVariant::primitive("DateTime", PrimitiveKind::DateTime),
    ChoiceVariant::element("Period", Period::descriptor),
];

pub static OBSERVATION: TypeDescriptor = TypeDescriptor {
    name: "Observation",
    fields: &[
        FieldDescriptor::primitive("id", PrimitiveKind::Id),
        FieldDescriptor::element("text", Narrative::descriptor),
        FieldDescriptor::resources("contained"),
        FieldDescriptor::elements("extension", Extension::descriptor),
        FieldDescriptor::elements("identifier", Identifier::descriptor),
        FieldDescriptor::primitive("status", PrimitiveKind::Code),
        FieldDescriptor::elements("category", CodeableConcept::descriptor),
        FieldDescriptor::element("code", CodeableConcept::descriptor),
        FieldDescriptor::element("subject", Reference::descriptor),
        FieldDescriptor::choice("effective", &EFFECTIVE_VARIANTS),
        FieldDescriptor::primitive("issued", PrimitiveKind::Instant),
        FieldDescriptor::choice("value", &VALUE_VARIANTS),
    ],
};

impl FhirElement for Observation {
    fn descriptor() -> &'static TypeDescriptor {
        &OBSERVATION
    }

    fn to_node(&self) -> ElementNode {
        let mut node = ElementNode::new();
        node.push_primitive("id", &self.id);
        node.push_element("text", &self.text);
        node.push_resources("contained", &self.contained);
        node.push_elements("extension", &self.extension);
        node.push_elements("identifier", &self.identifier);
        node.push_primitive("status", &self.status);
        node.push_elements("category", &self.category);
        node.push_element("code", &self.code);
        node.push_element("subject", &self.subject);
        node.push_choice("effective", &self.effective);
        node.push_primitive("issued", &self.issued);
        node.push_choice("value", &self.value);
        node
    }

    fn from_node(mut node: ElementNode) -> Result<Self, NodeError> {
        Ok(Self {
            id: node.take_primitive("id")?,
            text: node.take_element("text")?,
            contained: node.take_resources("contained")?,
            extension: node.take_elements("extension")?,
            identifier: node.take_elements("identifier")?,
            status: node.take_primitive("status")?,
            category: node.take_elements("category")?,
            code: node.take_element("code")?,
            subject: node.take_element("subject")?,
            effective: node.take_choice("effective")?,
            issued: node.take_primitive("issued")?,
            value: node.take_choice("value")?,
        })
    }
}

impl FhirResource for Observation {
    const RESOURCE_TYPE: &'static str = "Observation";
}

impl FhirChoice for ObservationEffective {
    fn to_choice(&self) -> ChoiceNode {
        match self {
            ObservationEffective::DateTime(v) => ChoiceNode::primitive("DateTime", v),
            ObservationEffective::Period(v) => ChoiceNode::element("Period", v),
            ObservationEffective::Instant(v) => ChoiceNode::primitive("Instant", v),
        }
    }

    fn from_choice(choice: ChoiceNode) -> Result<Self, NodeError> {
        let variant = choice.variant;
        match variant {
            "DateTime" => choice.into_primitive().map(ObservationEffective::DateTime),
            "Period" => choice.into_element().map(ObservationEffective::Period),
            "Instant" => choice.into_primitive().map(ObservationEffective::Instant),
            other => Err(NodeError::UnknownVariant {
                field: "effective",
                variant: other.to_string(),
            }),
        }
    }
}

impl FhirChoice for ObservationValue {
    fn to_choice(&self) -> ChoiceNode {
        match self {
            ObservationValue::Quantity(v) => ChoiceNode::element("Quantity", v),
            ObservationValue::CodeableConcept(v) => ChoiceNode::element("CodeableConcept", v),
            ObservationValue::String(v) => ChoiceNode::primitive("String", v),
            ObservationValue::Boolean(v) => ChoiceNode::primitive("Boolean", v),
            ObservationValue::Integer(v) => ChoiceNode::primitive("Integer", v),
            ObservationValue::DateTime(v) => ChoiceNode::primitive("DateTime", v),
            ObservationValue::Period(v) => ChoiceNode::element("Period", v),
        }
    }

    fn from_choice(choice: ChoiceNode) -> Result<Self, NodeError> {
        let variant = choice.variant;
        match variant {
            "Quantity" => choice.into_element().map(ObservationValue::Quantity),
            "CodeableConcept" => choice.into_element().map(ObservationValue::CodeableConcept),
            "String" => choice.into_primitive().map(ObservationValue::String),
            "Boolean" => choice.into_primitive().map(ObservationValue::Boolean),
            "Integer" => choice.into_primitive().map(ObservationValue::Integer),
            "DateTime" => choice.into_primitive().map(ObservationValue::DateTime),
            "Period" => choice.into_element().map(ObservationValue::Period),
            other => Err(NodeError::UnknownVariant {
                field: "value",
                variant: other.to_string(),
            }),
        }
    }
}
