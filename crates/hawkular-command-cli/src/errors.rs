//! Error types for the command CLI.

use std::io;

use camino::Utf8PathBuf;
use hawkular_cmdgw_api::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("a password is required when --username is given")]
    MissingPassword,
    #[error("failed to read request file {path}: {source}")]
    ReadRequest { path: Utf8PathBuf, source: io::Error },
    #[error("request is not a JSON object: {0}")]
    InvalidRequest(String),
    #[error("failed to read binary data file {path}: {source}")]
    ReadBinary { path: Utf8PathBuf, source: io::Error },
    #[error("failed to resolve agent address {endpoint}: {source}")]
    Resolve { endpoint: String, source: io::Error },
    #[error("failed to connect to agent at {endpoint}: {source}")]
    Connect { endpoint: String, source: io::Error },
    #[cfg(not(unix))]
    #[error("platform does not support Unix sockets: {0}")]
    UnsupportedUnixTransport(String),
    #[error("failed to send request to agent: {0}")]
    SendRequest(io::Error),
    #[error("failed to read response from agent: {0}")]
    ReadResponse(io::Error),
    #[error("agent closed the connection without a response")]
    MissingResponse,
    #[error("failed to decode agent response: {0}")]
    DecodeResponse(CodecError),
    #[error("failed to store response in {path}: {source}")]
    StoreResponse { path: Utf8PathBuf, source: io::Error },
    #[error("failed to write summary: {0}")]
    Summary(io::Error),
}
