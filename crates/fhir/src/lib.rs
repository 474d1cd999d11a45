//! # fhirwire models
//!
//! A small FHIR type catalog. Each type is plain data plus a static
//! [`TypeDescriptor`](fhirwire_support::TypeDescriptor) and a node conversion;
//! the JSON and XML rules live in `fhirwire-serde`, not here.
//!
//! - [`primitives`]: the primitive cell aliases (`Boolean`, `Date`, ...)
//! - [`datatypes`]: `Extension`, `Coding`, `HumanName`, `Narrative`, ...
//! - [`resources`]: `Patient`, `Observation`, `Bundle` and the [`Resource`] sum type
//!
//! ```
//! use fhirwire_models::{Patient, PatientDeceased, Resource};
//! use fhirwire_support::ResourceSet;
//!
//! let patient = Patient {
//!     id: Some("example".to_string().into()),
//!     deceased: Some(PatientDeceased::Boolean(true.into())),
//!     ..Default::default()
//! };
//! let resource = Resource::from(patient);
//! assert_eq!(resource.resource_type(), "Patient");
//! assert_eq!(resource.resource_id(), Some("example"));
//! ```

pub mod datatypes;
pub mod primitives;
pub mod resources;

pub use datatypes::{
    CodeableConcept, Coding, Extension, ExtensionValue, HumanName, Identifier, Narrative,
    Period, Quantity, Reference,
};
pub use resources::{
    Bundle, BundleEntry, Observation, ObservationEffective, ObservationValue, Patient,
    PatientDeceased, PatientMultipleBirth, Resource,
};

#[cfg(test)]
mod tests {
    use super::*;
    use fhirwire_support::{
        FhirChoice, FhirElement, FieldKind, FieldValue, ResourceSet, TypeDescriptor,
        VariantValue,
    };

    fn variant_suffixes(descriptor: &TypeDescriptor, field: &str) -> Vec<&'static str> {
        match descriptor.field(field).map(|f| f.kind) {
            Some(FieldKind::Choice(variants)) => variants.iter().map(|v| v.suffix).collect(),
            _ => panic!("{} is not a choice field", field),
        }
    }

    #[test]
    fn test_choice_tables_match_enums() {
        assert_eq!(
            variant_suffixes(Patient::descriptor(), "deceased"),
            vec!["Boolean", "DateTime"]
        );
        assert_eq!(
            variant_suffixes(Patient::descriptor(), "multipleBirth"),
            vec!["Boolean", "Integer"]
        );
        assert_eq!(
            variant_suffixes(Observation::descriptor(), "effective"),
            vec!["DateTime", "Period", "Instant"]
        );
        assert_eq!(variant_suffixes(Observation::descriptor(), "value").len(), 7);
        assert_eq!(variant_suffixes(Extension::descriptor(), "value").len(), 14);
    }

    #[test]
    fn test_choice_node_uses_declared_suffix() {
        let value = ObservationValue::Quantity(Quantity::default());
        let choice = value.to_choice();
        assert_eq!(choice.variant, "Quantity");
        assert!(matches!(choice.value, VariantValue::Composite(_)));
        assert_eq!(ObservationValue::from_choice(choice).unwrap(), value);
    }

    #[test]
    fn test_node_round_trip_keeps_value_absent_cell() {
        let patient = Patient {
            birth_date: Some(primitives::Date::absent(vec![Extension::new(
                "http://hl7.org/fhir/StructureDefinition/data-absent-reason",
                ExtensionValue::Code("unknown".to_string().into()),
            )])),
            ..Default::default()
        };
        let node = patient.to_node();
        match node.get("birthDate") {
            Some(FieldValue::Primitive(cell)) => {
                assert!(cell.value.is_none());
                assert_eq!(cell.extension.len(), 1);
            }
            other => panic!("unexpected birthDate node: {:?}", other),
        }
        assert_eq!(Patient::from_node(node).unwrap(), patient);
    }

    #[test]
    fn test_extension_requires_url() {
        let mut node = Extension::new("http://example.org/x", ExtensionValue::Boolean(true.into()))
            .to_node();
        node.remove("url");
        assert!(Extension::from_node(node).is_err());
    }

    #[test]
    fn test_resource_projections() {
        let mut patient = Patient {
            id: Some("p1".to_string().into()),
            ..Default::default()
        };
        patient.contained.push(Resource::from(Observation::default()));
        let resource = Resource::from(patient);

        assert_eq!(resource.resource_type(), "Patient");
        assert_eq!(resource.resource_id(), Some("p1"));
        assert_eq!(resource.contained().len(), 1);
        assert_eq!(resource.contained()[0].resource_type(), "Observation");
        assert_eq!(resource.contained()[0].resource_id(), None);
        assert!(resource.as_patient().is_some());
        assert!(resource.as_observation().is_none());
    }

    #[test]
    fn test_resource_node_rejects_other_type() {
        let node = Resource::from(Observation::default()).to_resource_node();
        let err = Patient::from_resource_node(node).unwrap_err();
        assert_eq!(
            err,
            fhirwire_support::NodeError::UnknownResourceType("Observation".to_string())
        );
    }

    #[test]
    fn test_registries() {
        let registry = Resource::registry();
        assert_eq!(
            registry.resource_types(),
            vec!["Bundle", "Observation", "Patient"]
        );
        assert_eq!(
            registry.get("Patient").map(|entry| entry.descriptor().name),
            Some("Patient")
        );
        assert!(registry.get("Encounter").is_none());

        let patients = Patient::registry();
        assert_eq!(patients.len(), 1);
        assert!(patients.contains("Patient"));
        assert!(!patients.contains("Observation"));
    }
}
