//! The `convert` and `inspect` subcommands.

use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, bail};
use fhirwire_models::Resource;
use fhirwire_serde::FhirCodec;
use fhirwire_support::ResourceSet;
use tracing::{debug, info};

use crate::config::{CliConfig, Command, Format};

/// Runs the configured subcommand.
pub fn run(config: &CliConfig) -> anyhow::Result<()> {
    let codec = FhirCodec::with_options(Resource::registry(), config.codec_options());

    match &config.command {
        Command::Convert {
            input,
            output,
            from,
            to,
        } => {
            let text = read_input(input.as_deref())?;
            let from = match from {
                Some(format) => *format,
                None => detect_format(input.as_deref(), &text)?,
            };
            let to = to.unwrap_or_else(|| from.other());
            info!(?from, ?to, "converting resource");

            let mut converted = convert(&codec, &text, from, to)?;
            converted.push('\n');
            write_output(output.as_deref(), &converted)
        }
        Command::Inspect {
            input,
            from,
            ndjson,
        } => {
            let text = read_input(input.as_deref())?;
            let summaries = if *ndjson {
                inspect_ndjson(&codec, &text)?
            } else {
                let from = match from {
                    Some(format) => *format,
                    None => detect_format(input.as_deref(), &text)?,
                };
                inspect(&codec, &text, from)?
            };

            let mut out = String::new();
            for summary in &summaries {
                out.push_str(&summary.to_string());
                out.push('\n');
            }
            write_output(None, &out)
        }
    }
}

/// Guesses the format from the file extension, then from the first
/// non-whitespace character.
pub fn detect_format(path: Option<&Path>, text: &str) -> anyhow::Result<Format> {
    let by_extension = path
        .and_then(Path::extension)
        .and_then(|ext| ext.to_str())
        .and_then(|ext| match ext.to_ascii_lowercase().as_str() {
            "json" | "ndjson" => Some(Format::Json),
            "xml" => Some(Format::Xml),
            _ => None,
        });
    if let Some(format) = by_extension {
        debug!(?format, "format from file extension");
        return Ok(format);
    }

    match text.trim_start().chars().next() {
        Some('<') => Ok(Format::Xml),
        Some('{') | Some('[') => Ok(Format::Json),
        Some(other) => bail!("cannot detect input format from leading '{}'; use --from", other),
        None => bail!("input is empty"),
    }
}

/// Converts one document. Same-format conversion re-encodes it canonically.
pub fn convert(
    codec: &FhirCodec<Resource>,
    text: &str,
    from: Format,
    to: Format,
) -> anyhow::Result<String> {
    let converted = match (from, to) {
        (Format::Json, Format::Xml) => codec.json_to_xml(text)?,
        (Format::Xml, Format::Json) => codec.xml_to_json(text)?,
        (Format::Json, Format::Json) => codec.to_json_string(&codec.from_json_str(text)?)?,
        (Format::Xml, Format::Xml) => codec.to_xml_string(&codec.from_xml_str(text)?)?,
    };
    Ok(converted)
}

/// One line of `inspect` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub resource_type: &'static str,
    pub id: Option<String>,
    pub contained: usize,
}

impl Summary {
    pub fn of(resource: &Resource) -> Self {
        Self {
            resource_type: resource.resource_type(),
            id: resource.resource_id().map(str::to_string),
            contained: resource.contained().len(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}/{}", self.resource_type, id)?,
            None => write!(f, "{} (no id)", self.resource_type)?,
        }
        write!(f, " contained={}", self.contained)
    }
}

/// Summaries of a single resource or, for a JSON array, of each element.
pub fn inspect(
    codec: &FhirCodec<Resource>,
    text: &str,
    from: Format,
) -> anyhow::Result<Vec<Summary>> {
    let resources = match from {
        Format::Xml => vec![codec.from_xml_str(text)?],
        Format::Json if text.trim_start().starts_with('[') => {
            codec.resource_list_from_json_str(text)?
        }
        Format::Json => vec![codec.from_json_str(text)?],
    };
    Ok(resources.iter().map(Summary::of).collect())
}

pub fn inspect_ndjson(codec: &FhirCodec<Resource>, text: &str) -> anyhow::Result<Vec<Summary>> {
    let resources = codec.resource_list_from_ndjson_str(text)?;
    Ok(resources.iter().map(Summary::of).collect())
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("reading standard input")?;
            Ok(text)
        }
    }
}

fn write_output(path: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("writing {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhirwire_serde::CodecOptions;
    use std::path::PathBuf;

    fn codec() -> FhirCodec<Resource> {
        FhirCodec::new(Resource::registry())
    }

    #[test]
    fn test_detect_format() {
        let json = PathBuf::from("patient.JSON");
        let json = json.as_path();
        assert_eq!(detect_format(Some(json), "<x/>").unwrap(), Format::Json);
        assert_eq!(detect_format(None, "  \n<Patient/>").unwrap(), Format::Xml);
        assert_eq!(detect_format(None, "[{}]").unwrap(), Format::Json);
        assert!(detect_format(None, "resourceType").is_err());
        assert!(detect_format(None, "   ").is_err());
    }

    #[test]
    fn test_convert_both_ways() {
        let json = r#"{"resourceType":"Patient","id":"p1","active":true}"#;
        let xml = convert(&codec(), json, Format::Json, Format::Xml).unwrap();
        assert_eq!(
            xml,
            r#"<Patient xmlns="http://hl7.org/fhir"><id value="p1"/><active value="true"/></Patient>"#
        );
        assert_eq!(convert(&codec(), &xml, Format::Xml, Format::Json).unwrap(), json);
    }

    #[test]
    fn test_same_format_is_canonical() {
        let json = r#"{"active":true,"id":"p1","resourceType":"Patient"}"#;
        assert_eq!(
            convert(&codec(), json, Format::Json, Format::Json).unwrap(),
            r#"{"resourceType":"Patient","id":"p1","active":true}"#
        );
    }

    #[test]
    fn test_strict_convert_fails_on_unknown_field() {
        let codec = FhirCodec::with_options(Resource::registry(), CodecOptions::strict());
        let json = r#"{"resourceType":"Patient","nickname":"Bob"}"#;
        assert!(convert(&codec, json, Format::Json, Format::Xml).is_err());
    }

    #[test]
    fn test_inspect_summaries() {
        let json = r#"{"resourceType":"Patient","id":"p1","contained":[{"resourceType":"Observation"}]}"#;
        let summaries = inspect(&codec(), json, Format::Json).unwrap();
        assert_eq!(
            summaries,
            vec![Summary {
                resource_type: "Patient",
                id: Some("p1".to_string()),
                contained: 1,
            }]
        );
        assert_eq!(summaries[0].to_string(), "Patient/p1 contained=1");

        let list = r#"[{"resourceType":"Observation"},{"resourceType":"Bundle","id":"b1"}]"#;
        let lines: Vec<_> = inspect(&codec(), list, Format::Json)
            .unwrap()
            .iter()
            .map(Summary::to_string)
            .collect();
        assert_eq!(lines, vec!["Observation (no id) contained=0", "Bundle/b1 contained=0"]);
    }

    #[test]
    fn test_inspect_ndjson() {
        let ndjson = "{\"resourceType\":\"Patient\",\"id\":\"a\"}\n{\"resourceType\":\"Patient\",\"id\":\"b\"}\n";
        let summaries = inspect_ndjson(&codec(), ndjson).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[1].id.as_deref(), Some("b"));
    }
}
