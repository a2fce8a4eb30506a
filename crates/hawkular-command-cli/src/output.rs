//! Stores the agent's response and judges whether the command succeeded.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use camino::{Utf8Path, Utf8PathBuf};
use hawkular_cmdgw_api::RawMessage;
use serde_json::Value;

use crate::errors::AppError;

const GENERIC_ERROR: &str = "GenericErrorResponse";

/// Files written for one response.
#[derive(Debug)]
pub(crate) struct StoredResponse {
    pub(crate) json: Utf8PathBuf,
    pub(crate) binary: Option<Utf8PathBuf>,
}

/// Writes `<Name><millis>.json`, plus `.binary` when binary data came back.
pub(crate) fn store(response: &RawMessage, output_dir: &Utf8Path) -> Result<StoredResponse, AppError> {
    fs::create_dir_all(output_dir).map_err(|source| AppError::StoreResponse {
        path: output_dir.to_path_buf(),
        source,
    })?;
    let stem = format!("{}{}", response.name(), now_millis());

    let json = output_dir.join(format!("{stem}.json"));
    write_new(&json, response.body().to_string().as_bytes())?;
    let binary = match response.binary_data() {
        Some(bytes) => {
            let path = output_dir.join(format!("{stem}.binary"));
            write_new(&path, bytes)?;
            Some(path)
        }
        None => None,
    };
    Ok(StoredResponse { json, binary })
}

fn write_new(path: &Utf8Path, bytes: &[u8]) -> Result<(), AppError> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .and_then(|mut file| file.write_all(bytes))
        .map_err(|source| AppError::StoreResponse {
            path: path.to_path_buf(),
            source,
        })
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}

/// Whether `response` reports success for a request expecting `expected`.
///
/// `expected` may be package qualified; only its last component is compared.
pub(crate) fn succeeded(response: &RawMessage, expected: &str) -> bool {
    let expected_name = expected.rsplit('.').next().unwrap_or(expected);
    response.name() != GENERIC_ERROR
        && response.name() == expected_name
        && text_field(response, "status") != Some("ERROR")
}

/// Prints what came back and where it was stored.
pub(crate) fn write_summary<W: Write>(
    out: &mut W,
    response: &RawMessage,
    stored: &StoredResponse,
) -> io::Result<()> {
    writeln!(out, "Response: {}", response.name())?;
    if let Some(status) = text_field(response, "status") {
        writeln!(out, "Status:   {status}")?;
    }
    if let Some(message) = text_field(response, "message").or_else(|| text_field(response, "errorMessage")) {
        writeln!(out, "Message:  {message}")?;
    }
    writeln!(out, "Stored:   {}", stored.json)?;
    if let Some(binary) = &stored.binary {
        writeln!(out, "Binary:   {binary}")?;
    }
    Ok(())
}

fn text_field<'a>(response: &'a RawMessage, field: &str) -> Option<&'a str> {
    response.body().get(field).and_then(Value::as_str)
}
