//! Traits implemented by the model catalog.

use crate::descriptor::TypeDescriptor;
use crate::error::NodeError;
use crate::node::{ChoiceNode, ElementNode, ResourceNode};

/// A complex FHIR type (datatype, backbone element or resource body).
pub trait FhirElement: Sized {
    fn descriptor() -> &'static TypeDescriptor;

    fn to_node(&self) -> ElementNode;

    fn from_node(node: ElementNode) -> Result<Self, NodeError>;
}

/// A closed set of alternatives for one `field[x]`.
pub trait FhirChoice: Sized {
    fn to_choice(&self) -> ChoiceNode;

    fn from_choice(choice: ChoiceNode) -> Result<Self, NodeError>;
}

/// A concrete resource type.
pub trait FhirResource: FhirElement {
    const RESOURCE_TYPE: &'static str;
}

/// A closed set of resource types that can appear behind a discriminator.
///
/// Implemented by the catalog's `Resource` sum type and by every concrete
/// resource as a one-member set.
pub trait ResourceSet: Sized {
    /// Extension type carried by the primitive cells of this catalog.
    type Extension: FhirElement;

    fn resource_type(&self) -> &'static str;

    /// Logical id, projected from the decoded `id` field.
    fn resource_id(&self) -> Option<&str>;

    fn to_resource_node(&self) -> ResourceNode;

    fn from_resource_node(node: ResourceNode) -> Result<Self, NodeError>;
}
