//! ISO-8601 timestamps as persisted in envelopes.
//!
//! Always UTC, millisecond precision, `Z` suffix: `2024-05-01T12:30:00.125Z`.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Current time truncated to milliseconds so it survives a format/parse cycle.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

pub fn format(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
}

pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(ts))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_millis_and_z() {
        let ts = parse("2024-05-01T12:30:00.125Z").expect("should parse");
        assert_eq!(format(&ts), "2024-05-01T12:30:00.125Z");
    }

    #[test]
    fn normalizes_offsets_to_utc() {
        let ts = parse("2024-05-01T14:30:00+02:00").expect("should parse");
        assert_eq!(format(&ts), "2024-05-01T12:30:00.000Z");
    }

    #[test]
    fn now_round_trips() {
        let ts = now();
        assert_eq!(parse(&format(&ts)).expect("should parse"), ts);
    }
}
