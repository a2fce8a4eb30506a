//! Value types shared by requests and responses.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Outcome of a command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ResponseStatus {
    /// The command succeeded.
    #[serde(rename = "OK")]
    Ok,
    /// The command failed. Responses start in this state.
    #[default]
    #[serde(rename = "ERROR")]
    Error,
}

/// What the managed server needs before a change becomes active.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize, EnumString, Display,
)]
#[strum(ascii_case_insensitive)]
pub enum ServerRefreshIndicator {
    /// Nothing; the change is live.
    #[default]
    #[serde(rename = "NONE")]
    #[strum(serialize = "NONE")]
    None,
    /// A reload of the server configuration.
    #[serde(rename = "RELOAD-REQUIRED")]
    #[strum(serialize = "RELOAD-REQUIRED")]
    ReloadRequired,
    /// A full process restart.
    #[serde(rename = "RESTART-REQUIRED")]
    #[strum(serialize = "RESTART-REQUIRED")]
    RestartRequired,
}

/// Credentials carried by authenticated messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Authentication {
    /// User name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Persona the user acts as.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
}

impl Authentication {
    /// Credentials for `username`/`password` without a persona.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            persona: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("reload-required", ServerRefreshIndicator::ReloadRequired)]
    #[case("RESTART-REQUIRED", ServerRefreshIndicator::RestartRequired)]
    #[case("none", ServerRefreshIndicator::None)]
    fn refresh_indicator_parses_case_insensitively(
        #[case] input: &str,
        #[case] expected: ServerRefreshIndicator,
    ) {
        assert_eq!(input.parse::<ServerRefreshIndicator>().ok(), Some(expected));
    }

    #[rstest]
    fn wire_names_match_the_gateway() {
        let json = serde_json::to_string(&(
            ResponseStatus::Ok,
            ServerRefreshIndicator::ReloadRequired,
        ))
        .expect("serialise");
        assert_eq!(json, r#"["OK","RELOAD-REQUIRED"]"#);
        assert_eq!(ResponseStatus::default(), ResponseStatus::Error);
    }
}
