//! Command line configuration.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FHIRWIRE_LOG_LEVEL` | warn | Log level |
//! | `FHIRWIRE_UNKNOWN_FIELDS` | lenient | Unknown-field policy (strict, lenient) |
//! | `FHIRWIRE_PRETTY` | false | Indent JSON and XML output |
//!
//! `RUST_LOG`, when set, replaces the log level entirely.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use fhirwire_serde::{CodecOptions, UnknownFieldPolicy};

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Convert and inspect FHIR resources in JSON and XML.
#[derive(Debug, Clone, Parser)]
#[command(name = "fhirwire")]
#[command(version, about = "Convert and inspect FHIR resources in JSON and XML")]
pub struct CliConfig {
    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "FHIRWIRE_LOG_LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    /// What to do with keys and elements the resource type does not define.
    #[arg(
        long,
        env = "FHIRWIRE_UNKNOWN_FIELDS",
        default_value = "lenient",
        global = true
    )]
    pub unknown_fields: UnknownFieldPolicy,

    /// Indent JSON and XML output.
    #[arg(long, env = "FHIRWIRE_PRETTY", global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Convert a resource between JSON and XML
    Convert {
        /// Input file (default: stdin)
        input: Option<PathBuf>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Input format; detected from the file extension or the content when omitted
        #[arg(long, value_enum)]
        from: Option<Format>,
        /// Output format (default: the other format)
        #[arg(long, value_enum)]
        to: Option<Format>,
    },
    /// Print the type, id and contained count of each resource
    Inspect {
        /// Input file (default: stdin)
        input: Option<PathBuf>,
        /// Input format; detected from the file extension or the content when omitted
        #[arg(long, value_enum)]
        from: Option<Format>,
        /// Read newline-delimited JSON, one resource per line
        #[arg(long)]
        ndjson: bool,
    },
}

/// Wire format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Xml,
}

impl Format {
    pub fn other(self) -> Self {
        match self {
            Format::Json => Format::Xml,
            Format::Xml => Format::Json,
        }
    }
}

impl CliConfig {
    /// Codec options taken from the global flags.
    pub fn codec_options(&self) -> CodecOptions {
        CodecOptions::default()
            .with_unknown_fields(self.unknown_fields)
            .with_pretty(self.pretty)
    }

    /// Validates the configuration, returning every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            errors.push(format!(
                "Invalid log level: {}. Valid values are: {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            ));
        }

        match &self.command {
            Command::Convert { input, output, .. } => {
                if let (Some(input), Some(output)) = (input, output) {
                    if input == output {
                        errors.push("Output file cannot be the input file".to_string());
                    }
                }
            }
            Command::Inspect { from, ndjson, .. } => {
                if *ndjson && *from == Some(Format::Xml) {
                    errors.push("NDJSON input cannot be XML".to_string());
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
