//! Builds the request frame from command-line input.

use std::fs;

use camino::Utf8Path;
use hawkular_cmdgw_api::{Authentication, RawMessage};
use serde_json::{Map, Value};

use crate::errors::AppError;

const AUTHENTICATION: &str = "authentication";

/// Parts of a request gathered from the command line.
#[derive(Debug, Default)]
pub(crate) struct RequestSpec<'a> {
    pub(crate) command: &'a str,
    pub(crate) request_file: Option<&'a Utf8Path>,
    pub(crate) request: Option<&'a str>,
    pub(crate) properties: &'a [(String, String)],
    pub(crate) maps: &'a [(String, String, String)],
    pub(crate) authentication: Option<Authentication>,
    pub(crate) binary_data_file: Option<&'a Utf8Path>,
}

impl RequestSpec<'_> {
    /// Encodes the request, appending any binary data.
    pub(crate) fn into_frame(self) -> Result<Vec<u8>, AppError> {
        let mut body = self.body()?;
        if let Some(authentication) = &self.authentication {
            let absent = body
                .get(AUTHENTICATION)
                .is_none_or(Value::is_null);
            if absent {
                body.insert(
                    AUTHENTICATION.to_owned(),
                    serde_json::to_value(authentication)
                        .map_err(|error| AppError::InvalidRequest(error.to_string()))?,
                );
            }
        }
        let binary_data = self
            .binary_data_file
            .map(|path| {
                fs::read(path).map_err(|source| AppError::ReadBinary {
                    path: path.to_path_buf(),
                    source,
                })
            })
            .transpose()?;
        Ok(RawMessage::new(self.command, Value::Object(body), binary_data).encode())
    }

    fn body(&self) -> Result<Map<String, Value>, AppError> {
        if let Some(path) = self.request_file {
            let text = fs::read_to_string(path).map_err(|source| AppError::ReadRequest {
                path: path.to_path_buf(),
                source,
            })?;
            return parse_object(trim_after_json(&text));
        }
        if let Some(text) = self.request {
            return parse_object(text);
        }

        let mut body: Map<String, Value> = self
            .properties
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();
        for (map, key, value) in self.maps {
            let entry = body
                .entry(map.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            match entry {
                Value::Object(fields) => {
                    fields.insert(key.clone(), Value::String(value.clone()));
                }
                _ => {
                    return Err(AppError::InvalidRequest(format!(
                        "[{map}] is both a property and a map"
                    )));
                }
            }
        }
        Ok(body)
    }
}

/// Drops padding after the last closing brace, such as a trailing newline.
fn trim_after_json(text: &str) -> &str {
    text.rfind('}')
        .and_then(|end| text.get(..=end))
        .unwrap_or(text)
}

fn parse_object(text: &str) -> Result<Map<String, Value>, AppError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(body)) => Ok(body),
        Ok(other) => Err(AppError::InvalidRequest(other.to_string())),
        Err(error) => Err(AppError::InvalidRequest(error.to_string())),
    }
}

/// Parses `-P key=value`.
pub(crate) fn parse_property(input: &str) -> Result<(String, String), String> {
    input
        .split_once('=')
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got [{input}]"))
}

/// Parses `-M map:key=value`.
pub(crate) fn parse_map_entry(input: &str) -> Result<(String, String, String), String> {
    let (name_key, value) = parse_property(input)?;
    name_key
        .split_once(':')
        .filter(|(map, key)| !map.is_empty() && !key.is_empty())
        .map(|(map, key)| (map.to_owned(), key.to_owned(), value))
        .ok_or_else(|| format!("expected MAP:KEY=VALUE, got [{input}]"))
}

#[cfg(test)]
mod tests {
    use hawkular_cmdgw_api::decode;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    fn properties_and_maps_build_the_body() {
        let properties = [("resourceId".to_owned(), "feed~Local~/".to_owned())];
        let maps = [
            ("parameters".to_owned(), "mode".to_owned(), "fast".to_owned()),
            ("parameters".to_owned(), "depth".to_owned(), "2".to_owned()),
        ];
        let frame = RequestSpec {
            command: "ExecuteOperationRequest",
            properties: &properties,
            maps: &maps,
            ..RequestSpec::default()
        }
        .into_frame()
        .expect("frame");

        let message = decode(&frame).expect("decodes");
        assert_eq!(message.name(), "ExecuteOperationRequest");
        assert_eq!(
            message.body(),
            &json!({
                "resourceId": "feed~Local~/",
                "parameters": {"mode": "fast", "depth": "2"},
            })
        );
    }

    #[rstest]
    fn credentials_do_not_replace_given_authentication() {
        let frame = RequestSpec {
            command: "EchoRequest",
            request: Some(r#"{"authentication":{"username":"ui"}}"#),
            authentication: Some(Authentication::new("cli", "secret")),
            ..RequestSpec::default()
        }
        .into_frame()
        .expect("frame");

        let message = decode(&frame).expect("decodes");
        assert_eq!(message.body()["authentication"], json!({"username": "ui"}));
    }

    #[rstest]
    #[case("{\"echoMessage\":\"hi\"}\n\n", "{\"echoMessage\":\"hi\"}")]
    #[case("no json", "no json")]
    fn padding_after_the_object_is_ignored(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(trim_after_json(text), expected);
    }

    #[rstest]
    #[case("[1, 2]")]
    #[case("{broken")]
    fn non_object_requests_are_rejected(#[case] text: &str) {
        let result = RequestSpec {
            command: "EchoRequest",
            request: Some(text),
            ..RequestSpec::default()
        }
        .into_frame();
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[rstest]
    #[case("parameters:mode=fast", Ok(("parameters".to_owned(), "mode".to_owned(), "fast".to_owned())))]
    #[case("mode=fast", Err(()))]
    #[case(":mode=fast", Err(()))]
    fn map_entries_need_a_map_name(
        #[case] input: &str,
        #[case] expected: Result<(String, String, String), ()>,
    ) {
        assert_eq!(parse_map_entry(input).map_err(|_| ()), expected);
    }
}
