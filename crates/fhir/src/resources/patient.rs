use fhirwire_support::{
    ChoiceNode, ChoiceVariant, ElementNode, FhirChoice, FhirElement, FhirResource,
    FieldDescriptor, NodeError, PrimitiveKind, TypeDescriptor,
};

use crate::datatypes::{Extension, HumanName, Identifier, Narrative};
use crate::primitives::{Boolean, Code, Date, DateTime, Id, Integer};
use crate::resources::Resource;

/// [Patient](https://hl7.org/fhir/patient.html)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patient {
    pub id: Option<Id>,
    pub text: Option<Narrative>,
    pub contained: Vec<Resource>,
    pub extension: Vec<Extension>,
    pub identifier: Vec<Identifier>,
    pub active: Option<Boolean>,
    pub name: Vec<HumanName>,
    pub gender: Option<Code>,
    pub birth_date: Option<Date>,
    pub deceased: Option<PatientDeceased>,
    pub multiple_birth: Option<PatientMultipleBirth>,
}

/// `Patient.deceased[x]`
#[derive(Debug, Clone, PartialEq)]
pub enum PatientDeceased {
    Boolean(Boolean),
    DateTime(DateTime),
}

/// `Patient.multipleBirth[x]`
#[derive(Debug, Clone, PartialEq)]
pub enum PatientMultipleBirth {
    Boolean(Boolean),
    Integer(Integer),
}

static DECEASED_VARIANTS: [ChoiceVariant; 2] = [
    ChoiceVariant::primitive("Boolean", PrimitiveKind::Boolean),
    ChoiceVariant::primitive("DateTime", PrimitiveKind::DateTime),
];

static MULTIPLE_BIRTH_VARIANTS: [ChoiceVariant; 2] = [
    ChoiceVariant::primitive("Boolean", PrimitiveKind::Boolean),
    ChoiceVariant::primitive("Integer", PrimitiveKind::Integer),
];

pub static PATIENT: TypeDescriptor = TypeDescriptor {
    name: "Patient",
    fields: &[
        FieldDescriptor::primitive("id", PrimitiveKind::Id),
        FieldDescriptor::element("text", Narrative::descriptor),
        FieldDescriptor::resources("contained"),
        FieldDescriptor::elements("extension", Extension::descriptor),
        FieldDescriptor::elements("identifier", Identifier::descriptor),
        FieldDescriptor::primitive("active", PrimitiveKind::Boolean),
        FieldDescriptor::elements("name", HumanName::descriptor),
        FieldDescriptor::primitive("gender", PrimitiveKind::Code),
        FieldDescriptor::primitive("birthDate", PrimitiveKind::Date),
        FieldDescriptor::choice("deceased", &DECEASED_VARIANTS),
        FieldDescriptor::choice("multipleBirth", &MULTIPLE_BIRTH_VARIANTS),
    ],
};

impl FhirElement for Patient {
    fn descriptor() -> &'static TypeDescriptor {
        &PATIENT
    }

    fn to_node(&self) -> ElementNode {
        let mut node = ElementNode::new();
        node.push_primitive("id", &self.id);
        node.push_element("text", &self.text);
        node.push_resources("contained", &self.contained);
        node.push_elements("extension", &self.extension);
        node.push_elements("identifier", &self.identifier);
        node.push_primitive("active", &self.active);
        node.push_elements("name", &self.name);
        node.push_primitive("gender", &self.gender);
        node.push_primitive("birthDate", &self.birth_date);
        node.push_choice("deceased", &self.deceased);
        node.push_choice("multipleBirth", &self.multiple_birth);
        node
    }

    fn from_node(mut node: ElementNode) -> Result<Self, NodeError> {
        Ok(Self {
            id: node.take_primitive("id")?,
            text: node.take_element("text")?,
            contained: node.take_resources("contained")?,
            extension: node.take_elements("extension")?,
            identifier: node.take_elements("identifier")?,
            active: node.take_primitive("active")?,
            name: node.take_elements("name")?,
            gender: node.take_primitive("gender")?,
            birth_date: node.take_primitive("birthDate")?,
            deceased: node.take_choice("deceased")?,
            multiple_birth: node.take_choice("multipleBirth")?,
        })
    }
}

impl FhirResource for Patient {
    const RESOURCE_TYPE: &'static str = "Patient";
}

impl FhirChoice for PatientDeceased {
    fn to_choice(&self) -> ChoiceNode {
        match self {
            PatientDeceased::Boolean(v) => ChoiceNode::primitive("Boolean", v),
            PatientDeceased::DateTime(v) => ChoiceNode::primitive("DateTime", v),
        }
    }

    fn from_choice(choice: ChoiceNode) -> Result<Self, NodeError> {
        let variant = choice.variant;
        match variant {
            "Boolean" => choice.into_primitive().map(PatientDeceased::Boolean),
            "DateTime" => choice.into_primitive().map(PatientDeceased::DateTime),
            other => Err(NodeError::UnknownVariant {
                field: "deceased",
                variant: other.to_string(),
            }),
        }
    }
}

impl FhirChoice for PatientMultipleBirth {
    fn to_choice(&self) -> ChoiceNode {
        match self {
            PatientMultipleBirth::Boolean(v) => ChoiceNode::primitive("Boolean", v),
            PatientMultipleBirth::Integer(v) => ChoiceNode::primitive("Integer", v),
        }
    }

    fn from_choice(choice: ChoiceNode) -> Result<Self, NodeError> {
        let variant = choice.variant;
        match variant {
            "Boolean" => choice.into_primitive().map(PatientMultipleBirth::Boolean),
            "Integer" => choice.into_primitive().map(PatientMultipleBirth::Integer),
            other => Err(NodeError::UnknownVariant {
                field: "multipleBirth",
                variant: other.to_string(),
            }),
        }
    }
}
