//! Resources and the [`Resource`] sum type used for polymorphic fields.

mod bundle;
mod observation;
mod patient;

pub use bundle::{BUNDLE, BUNDLE_ENTRY, Bundle, BundleEntry};
pub use observation::{OBSERVATION, Observation, ObservationEffective, ObservationValue};
pub use patient::{PATIENT, Patient, PatientDeceased, PatientMultipleBirth};

use fhirwire_support::{
    FhirResource, NodeError, Registry, RegistryBuilder, ResourceNode, ResourceSet,
};

use crate::datatypes::Extension;

/// Any resource of this catalog.
///
/// Variants are boxed so the enum stays pointer-sized; `contained` lists
/// nest resources inside resources.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Bundle(Box<Bundle>),
    Observation(Box<Observation>),
    Patient(Box<Patient>),
}

impl Resource {
    /// A registry holding every resource type of the catalog.
    pub fn registry() -> Registry<Resource> {
        Registry::builder()
            .register::<Bundle>()
            .register::<Observation>()
            .register::<Patient>()
            .build()
    }

    pub fn as_patient(&self) -> Option<&Patient> {
        match self {
            Resource::Patient(patient) => Some(patient),
            _ => None,
        }
    }

    pub fn as_observation(&self) -> Option<&Observation> {
        match self {
            Resource::Observation(observation) => Some(observation),
            _ => None,
        }
    }

    pub fn as_bundle(&self) -> Option<&Bundle> {
        match self {
            Resource::Bundle(bundle) => Some(bundle),
            _ => None,
        }
    }

    /// Resources held in `contained`; bundles have none.
    pub fn contained(&self) -> &[Resource] {
        match self {
            Resource::Bundle(_) => &[],
            Resource::Observation(observation) => &observation.contained,
            Resource::Patient(patient) => &patient.contained,
        }
    }
}

impl From<Bundle> for Resource {
    fn from(bundle: Bundle) -> Self {
        Resource::Bundle(Box::new(bundle))
    }
}

impl From<Observation> for Resource {
    fn from(observation: Observation) -> Self {
        Resource::Observation(Box::new(observation))
    }
}

impl From<Patient> for Resource {
    fn from(patient: Patient) -> Self {
        Resource::Patient(Box::new(patient))
    }
}

impl ResourceSet for Resource {
    type Extension = Extension;

    fn resource_type(&self) -> &'static str {
        match self {
            Resource::Bundle(r) => r.resource_type(),
            Resource::Observation(r) => r.resource_type(),
            Resource::Patient(r) => r.resource_type(),
        }
    }

    fn resource_id(&self) -> Option<&str> {
        match self {
            Resource::Bundle(r) => r.resource_id(),
            Resource::Observation(r) => r.resource_id(),
            Resource::Patient(r) => r.resource_id(),
        }
    }

    fn to_resource_node(&self) -> ResourceNode {
        match self {
            Resource::Bundle(r) => ResourceNode::from_resource(r.as_ref()),
            Resource::Observation(r) => ResourceNode::from_resource(r.as_ref()),
            Resource::Patient(r) => ResourceNode::from_resource(r.as_ref()),
        }
    }

    fn from_resource_node(node: ResourceNode) -> Result<Self, NodeError> {
        match node.resource_type() {
            "Bundle" => node.into_resource::<Bundle>().map(Resource::from),
            "Observation" => node.into_resource::<Observation>().map(Resource::from),
            "Patient" => node.into_resource::<Patient>().map(Resource::from),
            other => Err(NodeError::UnknownResourceType(other.to_string())),
        }
    }
}

/// Every concrete resource is also a one-member resource set, so a
/// `Registry<Patient>` decodes straight into `Patient`.
macro_rules! single_resource_set {
    ($($ty:ident),* $(,)?) => {$(
        impl ResourceSet for $ty {
            type Extension = Extension;

            fn resource_type(&self) -> &'static str {
                <$ty as FhirResource>::RESOURCE_TYPE
            }

            fn resource_id(&self) -> Option<&str> {
                self.id.as_ref().and_then(|id| id.value.as_deref())
            }

            fn to_resource_node(&self) -> ResourceNode {
                ResourceNode::from_resource(self)
            }

            fn from_resource_node(node: ResourceNode) -> Result<Self, NodeError> {
                node.into_resource()
            }
        }
    )*};
}

single_resource_set!(Bundle, Observation, Patient);

/// Nested resources are typed as [`Resource`], so a single-type registry
/// still accepts the whole catalog under `contained` and `Bundle.entry`.
fn with_nested_catalog<R: ResourceSet>(builder: RegistryBuilder<R>) -> RegistryBuilder<R> {
    builder
        .allow_nested::<Bundle>()
        .allow_nested::<Observation>()
        .allow_nested::<Patient>()
}

impl Patient {
    pub fn registry() -> Registry<Patient> {
        with_nested_catalog(Registry::builder().register::<Patient>()).build()
    }
}

impl Observation {
    pub fn registry() -> Registry<Observation> {
        with_nested_catalog(Registry::builder().register::<Observation>()).build()
    }
}

impl Bundle {
    pub fn registry() -> Registry<Bundle> {
        with_nested_catalog(Registry::builder().register::<Bundle>()).build()
    }
}
