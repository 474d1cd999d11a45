use std::fs;
use std::path::PathBuf;

use clap::Parser;
use fhirwire_cli::{CliConfig, run};
use fhirwire_models::Resource;
use fhirwire_serde::FhirCodec;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../serde/tests/data")
        .join(name)
}

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("fhirwire-cli-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

fn run_args(args: &[&str]) -> anyhow::Result<()> {
    let config = CliConfig::try_parse_from(args).unwrap();
    config.validate().unwrap();
    run(&config)
}

#[test]
fn test_convert_json_file_to_xml_file() {
    let input = fixture("json/patient-example.json");
    let output = scratch("patient-from-json.xml");

    run_args(&[
        "fhirwire",
        "convert",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ])
    .unwrap();

    let xml = fs::read_to_string(&output).unwrap();
    assert!(xml.starts_with("<Patient xmlns=\"http://hl7.org/fhir\">"));
    assert!(xml.ends_with("</Patient>\n"));

    let codec = FhirCodec::new(Resource::registry());
    let from_xml = codec.from_xml_str(xml.trim_end()).unwrap();
    let from_json = codec
        .from_json_str(&fs::read_to_string(&input).unwrap())
        .unwrap();
    assert_eq!(
        codec.to_json_value(&from_xml).unwrap(),
        codec.to_json_value(&from_json).unwrap()
    );
}

#[test]
fn test_convert_xml_file_to_pretty_json() {
    let input = fixture("xml/observation-example.xml");
    let output = scratch("observation-from-xml.json");

    run_args(&[
        "fhirwire",
        "--pretty",
        "convert",
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ])
    .unwrap();

    let json = fs::read_to_string(&output).unwrap();
    assert!(json.starts_with("{\n  \"resourceType\": \"Observation\""));
    let codec = FhirCodec::new(Resource::registry());
    assert_eq!(
        codec.from_json_str(&json).unwrap(),
        codec
            .from_xml_str(&fs::read_to_string(&input).unwrap())
            .unwrap()
    );
}

#[test]
fn test_strict_convert_reports_unknown_field() {
    let input = scratch("unknown-field.json");
    fs::write(&input, r#"{"resourceType":"Patient","nickname":"Bob"}"#).unwrap();
    let output = scratch("unknown-field.xml");

    let error = run_args(&[
        "fhirwire",
        "--unknown-fields",
        "strict",
        "convert",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ])
    .unwrap_err();
    assert!(error.to_string().contains("nickname"));
}

#[test]
fn test_missing_input_file() {
    let error = run_args(&["fhirwire", "inspect", "/nonexistent/fhirwire.json"]).unwrap_err();
    assert!(error.to_string().contains("reading"));
}
