//! CLI entrypoint for sending one command to a running Hawkular agent.
//!
//! The binary delegates to [`hawkular_command_cli::run`].

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    hawkular_command_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
