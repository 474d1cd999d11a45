//! JSON codec behaviour against the model catalog: shadow merging, parallel
//! arrays, choice keys, resource dispatch and the unknown-field policy.

use fhirwire_models::{
    Bundle, CodeableConcept, Extension, ExtensionValue, HumanName, Identifier, Observation,
    ObservationValue, Patient, PatientDeceased, Resource,
};
use fhirwire_support::{Registry, ResourceSet};
use fhirwire_serde::{
    CodecOptions, FhirCodec, Result, SerdeError, from_json_str, resource_list_from_json_slice,
    resource_list_from_json_str,
    resource_list_from_ndjson_str, to_json_string, to_json_value, to_ndjson_string,
};
use rust_decimal_macros::dec;
use serde_json::{Value, json};

fn read_patient(json: &str) -> Result<Patient> {
    from_json_str(&Patient::registry(), json)
}

fn assert_conflict(err: SerdeError, field: &str, first: &str, second: &str) {
    match err {
        SerdeError::ConflictingVariant {
            field: f,
            first: a,
            second: b,
        } => {
            assert_eq!(f, field);
            assert_eq!(a, first);
            assert_eq!(b, second);
        }
        other => panic!("expected a conflicting variant, got {:?}", other),
    }
}

// =============================================================================
// Primitive cells and shadow objects
// =============================================================================

#[test]
fn test_primitive_with_shadow_round_trip() -> Result<()> {
    let json = concat!(
        r#"{"resourceType":"Patient","birthDate":"1974-12-25","#,
        r#""_birthDate":{"id":"bd1","extension":[{"url":"http://example.org/ext","valueString":"approx"}]}}"#
    );

    let patient = read_patient(json)?;
    let birth_date = patient.birth_date.as_ref().expect("birth date");
    assert_eq!(birth_date.value.as_deref(), Some("1974-12-25"));
    assert_eq!(birth_date.id.as_deref(), Some("bd1"));
    assert_eq!(birth_date.extension.len(), 1);
    assert_eq!(birth_date.extension[0].url, "http://example.org/ext");
    match &birth_date.extension[0].value {
        Some(ExtensionValue::String(s)) => assert_eq!(s.value.as_deref(), Some("approx")),
        other => panic!("unexpected extension value: {:?}", other),
    }

    assert_eq!(to_json_string(&patient)?, json);
    Ok(())
}

#[test]
fn test_value_absent_cell_keeps_extensions() -> Result<()> {
    let json = concat!(
        r#"{"resourceType":"Patient","_birthDate":{"extension":[{"url":"#,
        r#""http://hl7.org/fhir/StructureDefinition/data-absent-reason","valueCode":"unknown"}]}}"#
    );

    let patient = read_patient(json)?;
    let birth_date = patient.birth_date.as_ref().expect("birth date");
    assert!(birth_date.value.is_none());
    assert_eq!(birth_date.extension.len(), 1);

    let out = to_json_value(&patient)?;
    assert!(out.get("birthDate").is_none());
    assert_eq!(out, serde_json::from_str::<Value>(json)?);
    Ok(())
}

#[test]
fn test_plain_value_writes_no_shadow() -> Result<()> {
    let patient = Patient {
        active: Some(true.into()),
        ..Default::default()
    };
    assert_eq!(
        to_json_string(&patient)?,
        r#"{"resourceType":"Patient","active":true}"#
    );
    Ok(())
}

#[test]
fn test_shadow_only_sets_metadata() -> Result<()> {
    let patient = read_patient(r#"{"resourceType":"Patient","_active":{"id":"a1"}}"#)?;
    let active = patient.active.as_ref().expect("active");
    assert_eq!(active.id.as_deref(), Some("a1"));
    assert!(active.value.is_none());
    Ok(())
}

#[test]
fn test_wrong_scalar_shape() {
    let err = read_patient(r#"{"resourceType":"Patient","active":"yes"}"#).unwrap_err();
    match err {
        SerdeError::InvalidValue { field, .. } => assert_eq!(field, "active"),
        other => panic!("expected an invalid value, got {:?}", other),
    }
}

#[test]
fn test_shadow_must_be_an_object() {
    let err = read_patient(r#"{"resourceType":"Patient","active":true,"_active":"a1"}"#).unwrap_err();
    match err {
        SerdeError::InvalidValue { field, .. } => assert_eq!(field, "_active"),
        other => panic!("expected an invalid value, got {:?}", other),
    }
}

// =============================================================================
// Parallel arrays
// =============================================================================

#[test]
fn test_parallel_arrays_align_by_index() -> Result<()> {
    let json = json!({
        "resourceType": "Patient",
        "name": [{
            "given": ["Alice", null, "Carol"],
            "_given": [null, {"id": "g2"}, null]
        }]
    });

    let patient = read_patient(&json.to_string())?;
    let given = &patient.name[0].given;
    assert_eq!(given.len(), 3);
    assert_eq!(given[0].value.as_deref(), Some("Alice"));
    assert!(given[0].id.is_none());
    assert!(given[1].value.is_none());
    assert_eq!(given[1].id.as_deref(), Some("g2"));
    assert_eq!(given[2].value.as_deref(), Some("Carol"));

    assert_eq!(to_json_value(&patient)?, json);
    Ok(())
}

#[test]
fn test_longer_shadow_array_extends_list() -> Result<()> {
    let json = json!({
        "resourceType": "Patient",
        "name": [{"given": ["A"], "_given": [null, {"id": "g2"}]}]
    });

    let patient = read_patient(&json.to_string())?;
    assert_eq!(patient.name[0].given.len(), 2);

    assert_eq!(
        to_json_value(&patient)?,
        json!({
            "resourceType": "Patient",
            "name": [{"given": ["A", null], "_given": [null, {"id": "g2"}]}]
        })
    );
    Ok(())
}

#[test]
fn test_metadata_only_list_omits_value_array() -> Result<()> {
    let json = json!({
        "resourceType": "Patient",
        "name": [{"_given": [{"id": "g1"}, {"id": "g2"}]}]
    });

    let patient = read_patient(&json.to_string())?;
    let out = to_json_value(&patient)?;
    assert!(out["name"][0].get("given").is_none());
    assert_eq!(out, json);
    Ok(())
}

// =============================================================================
// Choice fields
// =============================================================================

#[test]
fn test_choice_key_names_variant() -> Result<()> {
    let patient = read_patient(r#"{"resourceType":"Patient","deceasedBoolean":true}"#)?;
    assert_eq!(patient.deceased, Some(PatientDeceased::Boolean(true.into())));

    let patient = read_patient(r#"{"resourceType":"Patient","deceasedDateTime":"2015-02-07"}"#)?;
    match &patient.deceased {
        Some(PatientDeceased::DateTime(dt)) => assert_eq!(dt.value.as_deref(), Some("2015-02-07")),
        other => panic!("unexpected deceased: {:?}", other),
    }
    assert_eq!(
        to_json_string(&patient)?,
        r#"{"resourceType":"Patient","deceasedDateTime":"2015-02-07"}"#
    );

    let patient = read_patient(r#"{"resourceType":"Patient"}"#)?;
    assert_eq!(patient.deceased, None);
    Ok(())
}

#[test]
fn test_bare_choice_name_is_unknown() {
    let codec = FhirCodec::with_options(Patient::registry(), CodecOptions::strict());
    let err = codec
        .from_json_str(r#"{"resourceType":"Patient","deceased":true}"#)
        .unwrap_err();
    assert!(matches!(err, SerdeError::UnknownField { .. }));
}

#[test]
fn test_conflicting_variants_are_rejected() {
    let cases = [
        (
            r#"{"resourceType":"Patient","deceasedBoolean":true,"deceasedDateTime":"2015"}"#,
            "deceased",
            "deceasedBoolean",
            "deceasedDateTime",
        ),
        (
            r#"{"resourceType":"Patient","multipleBirthInteger":2,"multipleBirthBoolean":true}"#,
            "multipleBirth",
            "multipleBirthInteger",
            "multipleBirthBoolean",
        ),
        (
            r#"{"resourceType":"Observation","effectiveDateTime":"2020","effectivePeriod":{"start":"2020"}}"#,
            "effective",
            "effectiveDateTime",
            "effectivePeriod",
        ),
        (
            r#"{"resourceType":"Observation","valueQuantity":{"value":1},"valueString":"one"}"#,
            "value",
            "valueQuantity",
            "valueString",
        ),
        (
            r#"{"resourceType":"Patient","extension":[{"url":"http://example.org/x","valueString":"a","valueCode":"b"}]}"#,
            "value",
            "valueString",
            "valueCode",
        ),
    ];

    let registry = Resource::registry();
    for (json, field, first, second) in cases {
        let err = from_json_str(&registry, json).unwrap_err();
        assert_conflict(err, field, first, second);
    }
}

#[test]
fn test_shadow_of_other_variant_conflicts() {
    let err = read_patient(r#"{"resourceType":"Patient","deceasedBoolean":true,"_deceasedDateTime":{"id":"d"}}"#)
        .unwrap_err();
    assert_conflict(err, "deceased", "deceasedBoolean", "deceasedDateTime");
}

#[test]
fn test_choice_value_with_shadow() -> Result<()> {
    let json = r#"{"resourceType":"Patient","deceasedBoolean":false,"_deceasedBoolean":{"id":"d1"}}"#;
    let patient = read_patient(json)?;
    match &patient.deceased {
        Some(PatientDeceased::Boolean(b)) => {
            assert_eq!(b.value, Some(false));
            assert_eq!(b.id.as_deref(), Some("d1"));
        }
        other => panic!("unexpected deceased: {:?}", other),
    }
    assert_eq!(to_json_string(&patient)?, json);
    Ok(())
}

// =============================================================================
// Decimals
// =============================================================================

#[test]
fn test_decimal_keeps_scale() -> Result<()> {
    let json = r#"{"resourceType":"Observation","valueQuantity":{"value":1.50,"unit":"mg"}}"#;
    let observation: Observation = from_json_str(&Observation::registry(), json)?;

    let quantity = match &observation.value {
        Some(ObservationValue::Quantity(quantity)) => quantity,
        other => panic!("unexpected value: {:?}", other),
    };
    let value = quantity.value.as_ref().and_then(|v| v.value).expect("value");
    assert_eq!(value, dec!(1.5));
    assert_eq!(value.scale(), 2);

    assert_eq!(to_json_string(&observation)?, json);
    Ok(())
}

#[test]
fn test_integer_out_of_range() {
    let err = read_patient(r#"{"resourceType":"Patient","multipleBirthInteger":1.5}"#).unwrap_err();
    assert!(matches!(err, SerdeError::InvalidValue { .. }));
}

// =============================================================================
// Resource dispatch
// =============================================================================

#[test]
fn test_dispatch_on_resource_type() -> Result<()> {
    let registry = Resource::registry();
    let resource = from_json_str(&registry, r#"{"resourceType":"Observation","status":"final"}"#)?;
    assert_eq!(
        resource
            .as_observation()
            .and_then(|o| o.status.as_ref())
            .and_then(|s| s.value.as_deref()),
        Some("final")
    );
    Ok(())
}

#[test]
fn test_resource_type_may_come_last() -> Result<()> {
    let patient = read_patient(r#"{"id":"p1","resourceType":"Patient"}"#)?;
    assert_eq!(patient.id.and_then(|id| id.value).as_deref(), Some("p1"));
    Ok(())
}

#[test]
fn test_unknown_resource_type() {
    let registry = Resource::registry();
    let err = from_json_str(&registry, r#"{"resourceType":"Unicorn"}"#).unwrap_err();
    assert!(matches!(err, SerdeError::UnknownResourceType(ref tag) if tag == "Unicorn"));

    let err = from_json_str(
        &registry,
        r#"{"resourceType":"Patient","contained":[{"resourceType":"Unicorn"}]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, SerdeError::UnknownResourceType(ref tag) if tag == "Unicorn"));
}

#[test]
fn test_missing_resource_type() {
    let registry = Resource::registry();
    let err = from_json_str(&registry, r#"{"id":"p1"}"#).unwrap_err();
    assert!(matches!(err, SerdeError::MissingResourceType));

    let err = from_json_str(&registry, r#"{"resourceType":"Patient","contained":[{"id":"x"}]}"#)
        .unwrap_err();
    assert!(matches!(err, SerdeError::MissingResourceType));
}

#[test]
fn test_single_resource_registry() -> Result<()> {
    let registry = Patient::registry();
    let err = from_json_str(&registry, r#"{"resourceType":"Observation"}"#).unwrap_err();
    assert!(matches!(err, SerdeError::UnknownResourceType(ref tag) if tag == "Observation"));

    // only the root is restricted; nested resources come from the whole catalog
    let patient = from_json_str(
        &registry,
        r#"{"resourceType":"Patient","contained":[{"resourceType":"Observation","id":"o1"},{"resourceType":"Patient","id":"inner"}]}"#,
    )?;
    assert_eq!(patient.contained.len(), 2);
    assert!(patient.contained[0].as_observation().is_some());
    assert_eq!(patient.contained[1].resource_id(), Some("inner"));

    let err = from_json_str(
        &registry,
        r#"{"resourceType":"Patient","contained":[{"resourceType":"Unicorn"}]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, SerdeError::UnknownResourceType(ref tag) if tag == "Unicorn"));
    Ok(())
}

#[test]
fn test_subset_registry_restricts_nested_resources() -> Result<()> {
    let json = r#"{"resourceType":"Patient","contained":[{"resourceType":"Observation"}]}"#;

    let patients_only = Registry::<Resource>::builder().register::<Patient>().build();
    let err = from_json_str(&patients_only, json).unwrap_err();
    assert!(matches!(err, SerdeError::UnknownResourceType(ref tag) if tag == "Observation"));

    let with_nested = Registry::<Resource>::builder()
        .register::<Patient>()
        .allow_nested::<Observation>()
        .build();
    let resource = from_json_str(&with_nested, json)?;
    assert_eq!(resource.contained().len(), 1);

    let err = from_json_str(&with_nested, r#"{"resourceType":"Observation"}"#).unwrap_err();
    assert!(matches!(err, SerdeError::UnknownResourceType(ref tag) if tag == "Observation"));
    Ok(())
}

#[test]
fn test_contained_round_trip() -> Result<()> {
    let json = json!({
        "resourceType": "Patient",
        "id": "p1",
        "contained": [
            {"resourceType": "Observation", "id": "o1", "status": "final"},
            {"resourceType": "Patient", "id": "p2", "active": false}
        ],
        "active": true
    });

    let resource = from_json_str(&Resource::registry(), &json.to_string())?;
    let contained = resource.contained();
    assert_eq!(contained.len(), 2);
    assert!(contained[0].as_observation().is_some());
    assert!(contained[1].as_patient().is_some());

    assert_eq!(to_json_value(&resource)?, json);
    Ok(())
}

#[test]
fn test_bundle_entries_dispatch() -> Result<()> {
    let json = json!({
        "resourceType": "Bundle",
        "type": "collection",
        "total": 2,
        "entry": [
            {"fullUrl": "urn:uuid:1", "resource": {"resourceType": "Patient", "id": "p1"}},
            {"fullUrl": "urn:uuid:2", "resource": {"resourceType": "Observation", "id": "o1"}}
        ]
    });

    let bundle: Bundle = from_json_str(&Bundle::registry(), &json.to_string())?;
    assert_eq!(bundle.total.as_ref().and_then(|t| t.value), Some(2));
    assert_eq!(bundle.entry.len(), 2);
    assert!(
        bundle.entry[0]
            .resource
            .as_ref()
            .and_then(Resource::as_patient)
            .is_some()
    );
    assert!(
        bundle.entry[1]
            .resource
            .as_ref()
            .and_then(Resource::as_observation)
            .is_some()
    );

    assert_eq!(to_json_value(&bundle)?, json);
    Ok(())
}

// =============================================================================
// Unknown-field policy
// =============================================================================

#[test]
fn test_lenient_skips_unknown_fields() -> Result<()> {
    let patient = read_patient(r#"{"resourceType":"Patient","nickname":"Bob","active":true}"#)?;
    assert_eq!(patient.active, Some(true.into()));
    Ok(())
}

#[test]
fn test_keys_are_read_in_document_order() {
    let codec = FhirCodec::with_options(Resource::registry(), CodecOptions::strict());
    let err = codec
        .from_json_str(r#"{"resourceType":"Patient","alpha":1,"active":true,"omega":2}"#)
        .unwrap_err();
    assert!(matches!(err, SerdeError::UnknownField { ref field, .. } if field == "alpha"));

    let err = read_patient(
        r#"{"resourceType":"Patient","multipleBirthInteger":2,"active":true,"gender":"male","multipleBirthBoolean":true}"#,
    )
    .unwrap_err();
    assert_conflict(err, "multipleBirth", "multipleBirthInteger", "multipleBirthBoolean");
}

#[test]
fn test_strict_rejects_unknown_fields() {
    let codec = FhirCodec::with_options(Resource::registry(), CodecOptions::strict());

    let err = codec
        .from_json_str(r#"{"resourceType":"Patient","nickname":"Bob"}"#)
        .unwrap_err();
    match err {
        SerdeError::UnknownField { type_name, field } => {
            assert_eq!(type_name, "Patient");
            assert_eq!(field, "nickname");
        }
        other => panic!("expected an unknown field, got {:?}", other),
    }

    let err = codec
        .from_json_str(r#"{"resourceType":"Patient","name":[{"middle":"X"}]}"#)
        .unwrap_err();
    assert!(matches!(err, SerdeError::UnknownField { ref type_name, .. } if type_name == "HumanName"));

    let err = codec
        .from_json_str(r#"{"resourceType":"Patient","_active":{"note":"x"}}"#)
        .unwrap_err();
    assert!(matches!(err, SerdeError::UnknownField { ref field, .. } if field == "note"));
}

// =============================================================================
// Resource lists
// =============================================================================

#[test]
fn test_json_array_list() -> Result<()> {
    let registry = Resource::registry();
    let resources = resource_list_from_json_str(
        &registry,
        r#"[{"resourceType":"Patient","id":"p1"},{"resourceType":"Observation","id":"o1"}]"#,
    )?;
    let types: Vec<_> = resources.iter().map(|r| r.resource_type()).collect();
    assert_eq!(types, vec!["Patient", "Observation"]);

    let err = resource_list_from_json_str(&registry, r#"{"resourceType":"Patient"}"#).unwrap_err();
    assert!(matches!(err, SerdeError::InvalidValue { .. }));

    let from_bytes = resource_list_from_json_slice(&registry, br#"[{"resourceType":"Bundle"}]"#)?;
    assert_eq!(from_bytes[0].resource_type(), "Bundle");
    Ok(())
}

#[test]
fn test_ndjson_round_trip() -> Result<()> {
    let ndjson = "{\"resourceType\":\"Patient\",\"id\":\"p1\"}\n\n{\"resourceType\":\"Observation\",\"id\":\"o1\"}\n";
    let registry = Resource::registry();
    let resources = resource_list_from_ndjson_str(&registry, ndjson)?;
    assert_eq!(resources.len(), 2);

    assert_eq!(
        to_ndjson_string(&resources)?,
        "{\"resourceType\":\"Patient\",\"id\":\"p1\"}\n{\"resourceType\":\"Observation\",\"id\":\"o1\"}\n"
    );
    Ok(())
}

#[test]
fn test_ndjson_reports_bad_line() {
    let registry = Resource::registry();
    let err = resource_list_from_ndjson_str(
        &registry,
        "{\"resourceType\":\"Patient\"}\n{\"resourceType\":\"Unicorn\"}\n",
    )
    .unwrap_err();
    assert!(matches!(err, SerdeError::UnknownResourceType(_)));
}

// =============================================================================
// Typed construction
// =============================================================================

#[test]
fn test_nested_extensions_serialize() -> Result<()> {
    let mut outer = Extension::new(
        "http://example.org/outer",
        ExtensionValue::Code("x".to_string().into()),
    );
    outer.extension.push(Extension::new(
        "http://example.org/inner",
        ExtensionValue::Boolean(true.into()),
    ));
    let patient = Patient {
        extension: vec![outer],
        ..Default::default()
    };

    assert_eq!(
        to_json_value(&patient)?,
        json!({
            "resourceType": "Patient",
            "extension": [{
                "extension": [{"url": "http://example.org/inner", "valueBoolean": true}],
                "url": "http://example.org/outer",
                "valueCode": "x"
            }]
        })
    );
    Ok(())
}

#[test]
fn test_empty_composites_are_not_written() -> Result<()> {
    let patient = Patient {
        name: vec![
            HumanName::default(),
            HumanName {
                family: Some("Lee".to_string().into()),
                ..Default::default()
            },
        ],
        identifier: vec![Identifier {
            type_: Some(CodeableConcept::default()),
            ..Default::default()
        }],
        ..Default::default()
    };
    assert_eq!(
        to_json_string(&patient)?,
        r#"{"resourceType":"Patient","name":[{"family":"Lee"}]}"#
    );

    let empty = Patient {
        name: vec![HumanName::default()],
        ..Default::default()
    };
    assert_eq!(to_json_string(&empty)?, r#"{"resourceType":"Patient"}"#);
    Ok(())
}
