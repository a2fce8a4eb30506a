//! The moment a command was accepted.

use std::fmt;

use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Entry time of a command, rendered as `yyyy-MM-ddTHH:mmZ` in UTC.
///
/// Captured once when the command starts, so error messages report when the
/// request was accepted rather than when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryTimestamp(OffsetDateTime);

impl EntryTimestamp {
    /// The current time.
    #[must_use]
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    /// A fixed instant given in milliseconds since the Unix epoch.
    #[must_use]
    pub fn from_unix_millis(millis: i64) -> Option<Self> {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
            .ok()
            .map(Self)
    }

    /// A fixed instant in any offset.
    #[must_use]
    pub const fn at(instant: OffsetDateTime) -> Self {
        Self(instant)
    }
}

impl fmt::Display for EntryTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .0
            .to_offset(UtcOffset::UTC)
            .format(format_description!("[year]-[month]-[day]T[hour]:[minute]Z"))
            .map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use time::UtcOffset;

    use super::*;

    #[rstest]
    #[case(0, "1970-01-01T00:00Z")]
    #[case(1_456_834_440_123, "2016-03-01T12:14Z")]
    #[case(1_700_000_059_999, "2023-11-14T22:14Z")]
    fn renders_minutes_in_utc(#[case] millis: i64, #[case] expected: &str) {
        let timestamp = EntryTimestamp::from_unix_millis(millis).expect("in range");
        assert_eq!(timestamp.to_string(), expected);
    }

    #[rstest]
    fn ignores_the_source_offset() {
        let instant = OffsetDateTime::from_unix_timestamp(0)
            .expect("epoch")
            .to_offset(UtcOffset::from_hms(5, 30, 0).expect("offset"));
        assert_eq!(EntryTimestamp::at(instant).to_string(), "1970-01-01T00:00Z");
    }
}
