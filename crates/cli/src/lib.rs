//! Library side of the `fhirwire` command line tool.

pub mod commands;
pub mod config;

pub use commands::run;
pub use config::{CliConfig, Command, Format};

/// Installs the global tracing subscriber, writing to stderr so stdout
/// carries only converted documents.
///
/// `RUST_LOG`, when set, takes precedence over `level`.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "fhirwire_cli={level},fhirwire_serde={level},fhirwire_support={level}"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
