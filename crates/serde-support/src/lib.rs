//! Shared building blocks for the fhirwire codecs and model catalog.
//!
//! - [`Element`]: the primitive cell (value + id + extensions)
//! - [`ElementNode`] and friends: the wire-neutral node tree
//! - [`TypeDescriptor`]: static per-type field tables driving the codecs
//! - [`Registry`]: discriminator → decoder lookup for polymorphic resources
//! - [`IdAndExtensionHelper`]: the JSON `_field` shadow object

pub mod descriptor;
pub mod element;
pub mod error;
pub mod node;
pub mod primitive;
pub mod registry;
pub mod shadow;
pub mod traits;

pub use descriptor::{
    ChoiceVariant, DescriptorFn, FieldDescriptor, FieldKind, TypeDescriptor, VariantKind,
};
pub use element::Element;
pub use error::NodeError;
pub use node::{CellNode, ChoiceNode, ElementNode, FieldValue, ResourceNode, VariantValue};
pub use primitive::{JsonShape, PrimitiveKind, PrimitiveValue, Scalar};
pub use registry::{Registry, RegistryBuilder, ResourceEntry};
pub use shadow::{IdAndExtensionHelper, IdAndExtensionOwned};
pub use traits::{FhirChoice, FhirElement, FhirResource, ResourceSet};
