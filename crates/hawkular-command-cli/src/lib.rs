//! Command-line client for the Hawkular agent's command gateway.
//!
//! One invocation sends one request, optionally followed by the content of a
//! binary data file, and waits for the agent's reply. The reply body is
//! stored as `<Name><millis>.json` in the output directory, next to a
//! `.binary` file when the reply carries binary data, and a short summary is
//! printed.
//!
//! The request body comes from `--request-file`, from `--request`, or is
//! assembled from `-P key=value` properties and `-M map:key=value` map
//! entries.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use hawkular_agent_config::GatewayEndpoint;
use hawkular_cmdgw_api::{Authentication, decode, response_name_for};

mod errors;
mod output;
mod request;
mod transport;

use errors::AppError;
use request::{RequestSpec, parse_map_entry, parse_property};

/// Sends one command request to a running agent and stores the response.
#[derive(Debug, Parser)]
#[command(name = "hawkular-command", version)]
struct Cli {
    /// Agent command gateway, e.g. `tcp://127.0.0.1:9779` or `unix:///run/agent.sock`.
    #[arg(long, default_value = "tcp://127.0.0.1:9779")]
    gateway: GatewayEndpoint,
    /// Request name, e.g. `EchoRequest`.
    #[arg(long)]
    command: String,
    /// Response name that ends the exchange successfully.
    #[arg(long)]
    expected_response: Option<String>,
    /// File holding the JSON request body.
    #[arg(long, conflicts_with = "request")]
    request_file: Option<Utf8PathBuf>,
    /// JSON request body.
    #[arg(long)]
    request: Option<String>,
    /// Request property `KEY=VALUE`; ignored when a body is given.
    #[arg(short = 'P', value_name = "KEY=VALUE", value_parser = parse_property)]
    properties: Vec<(String, String)>,
    /// Request map entry `MAP:KEY=VALUE`; ignored when a body is given.
    #[arg(short = 'M', value_name = "MAP:KEY=VALUE", value_parser = parse_map_entry)]
    maps: Vec<(String, String, String)>,
    /// Content sent after the JSON body.
    #[arg(long)]
    binary_data_file: Option<Utf8PathBuf>,
    /// Directory receiving the response files.
    #[arg(long, default_value = ".")]
    output_dir: Utf8PathBuf,
    /// User name placed in the request's authentication.
    #[arg(long)]
    username: Option<String>,
    /// Password placed in the request's authentication.
    #[arg(long)]
    password: Option<String>,
}

impl Cli {
    fn authentication(&self) -> Result<Option<Authentication>, AppError> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Ok(Some(Authentication::new(username, password))),
            (Some(_), None) => Err(AppError::MissingPassword),
            (None, _) => Ok(None),
        }
    }

    fn expected_response(&self) -> String {
        self.expected_response
            .clone()
            .unwrap_or_else(|| response_name_for(&self.command))
    }
}

/// Runs the CLI using the provided arguments and IO handles.
///
/// Exits with failure when the command could not be sent or the agent
/// reported an error.
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let result = Cli::try_parse_from(args)
        .map_err(AppError::CliUsage)
        .and_then(|cli| execute(&cli, stdout));
    match result {
        Ok(exit_code) => exit_code,
        Err(AppError::CliUsage(error)) if !error.use_stderr() => {
            let _ = write!(stdout, "{error}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn execute<W: Write>(cli: &Cli, stdout: &mut W) -> Result<ExitCode, AppError> {
    let frame = RequestSpec {
        command: &cli.command,
        request_file: cli.request_file.as_deref(),
        request: cli.request.as_deref(),
        properties: &cli.properties,
        maps: &cli.maps,
        authentication: cli.authentication()?,
        binary_data_file: cli.binary_data_file.as_deref(),
    }
    .into_frame()?;

    let reply = transport::exchange(&cli.gateway, &frame)?;
    let response = decode(&reply).map_err(AppError::DecodeResponse)?;
    let stored = output::store(&response, &cli.output_dir)?;
    output::write_summary(stdout, &response, &stored).map_err(AppError::Summary)?;

    if output::succeeded(&response, &cli.expected_response()) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
