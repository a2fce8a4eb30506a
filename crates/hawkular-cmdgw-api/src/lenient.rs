//! Deserialisers accepting the loosely typed values clients send.
//!
//! Older clients quote booleans and numbers (`"xaDatasource":"true"`,
//! `"driverMajorVersion":"5"`), so both forms are accepted.

use serde::de::{Deserializer, Error};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose<T> {
    Typed(T),
    Text(String),
}

pub(crate) fn opt_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    match Option::<Loose<bool>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Loose::Typed(value)) => Ok(Some(value)),
        Some(Loose::Text(text)) => match text.trim() {
            "" => Ok(None),
            trimmed if trimmed.eq_ignore_ascii_case("true") => Ok(Some(true)),
            trimmed if trimmed.eq_ignore_ascii_case("false") => Ok(Some(false)),
            other => Err(D::Error::custom(format!("expected a boolean, got '{other}'"))),
        },
    }
}

pub(crate) fn opt_i32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
    match Option::<Loose<i32>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Loose::Typed(value)) => Ok(Some(value)),
        Some(Loose::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Loose::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected an integer, got '{text}'"))),
    }
}
