//! Entry point for the Hawkular agent.
//!
//! Loads the configuration, serves the command gateway and runs until a
//! termination signal arrives.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;
use hawkular_agent::{
    DisconnectedEndpointFactory, FileConfigLoader, LaunchPlan, StructuredHealthReporter,
    SystemShutdownSignal, run_agent,
};

/// Command-line arguments of the agent binary.
#[derive(Debug, Parser)]
#[command(name = "hawkular-agent", version, about = "Runs the Hawkular agent")]
struct Cli {
    /// Configuration file; `hawkular-agent.toml` is read when present otherwise.
    #[arg(long, value_name = "PATH")]
    config: Option<Utf8PathBuf>,
    /// Overrides the configured `tracing` filter.
    #[arg(long, value_name = "FILTER")]
    log_filter: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let loader = FileConfigLoader::new(cli.config).with_log_filter(cli.log_filter);
    let result = run_agent(LaunchPlan {
        loader: &loader,
        reporter: Arc::new(StructuredHealthReporter::new()),
        factory: &DisconnectedEndpointFactory,
        shutdown: &SystemShutdownSignal,
    });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(io::stderr(), "hawkular-agent: {error}");
            ExitCode::FAILURE
        }
    }
}
