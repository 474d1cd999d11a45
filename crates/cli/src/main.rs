//! fhirwire
//!
//! Converts FHIR resources between JSON and XML and inspects them.

use clap::Parser;
use fhirwire_cli::{CliConfig, init_logging, run};
use tracing::debug;

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    debug!(
        unknown_fields = %config.unknown_fields,
        pretty = config.pretty,
        "Starting fhirwire"
    );

    run(&config)
}
