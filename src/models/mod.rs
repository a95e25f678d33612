/// Data models shared across the client
///
/// All models are deserialized at the remote data client boundary and are
/// tolerant of the backend's looser payload shapes: ids may arrive as numbers
/// or strings, optional fields may be absent, and timestamps come in several
/// textual forms.

pub mod event;
pub mod project;
pub mod task;

pub use event::{CalendarEvent, EventDraft, NewEvent};
pub use project::{Member, Project, Role};
pub use task::{NewTask, Task, TaskDraft, TaskStatus};

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parses a backend timestamp into milliseconds since the Unix epoch.
///
/// Accepts RFC 3339, the `datetime-local` shapes the backend round-trips
/// from forms, and bare dates. Unparseable or empty input maps to 0 so that
/// records with broken timestamps sort before everything else instead of
/// failing the whole pipeline.
pub fn parse_timestamp_millis(raw: &str) -> i64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.timestamp_millis();
    }

    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return parsed.and_utc().timestamp_millis();
        }
    }

    if let Ok(parsed) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = parsed.and_hms_opt(0, 0, 0) {
            return midnight.and_utc().timestamp_millis();
        }
    }

    0
}

/// Serde helpers for ids that arrive as either numbers or strings.
pub(crate) mod id {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Text(String),
    }

    fn parse_text<E: serde::de::Error>(text: &str) -> Result<i64, E> {
        text.trim()
            .parse::<i64>()
            .map_err(|_| E::custom(format!("invalid id: {text:?}")))
    }

    /// Deserializes a required id from a number or numeric string.
    pub fn required<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawId::deserialize(deserializer)? {
            RawId::Int(value) => Ok(value),
            RawId::Text(text) => parse_text(&text),
        }
    }

    /// Deserializes an optional id; null, absent, and empty string all map
    /// to `None`.
    pub fn optional<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<RawId>::deserialize(deserializer)? {
            None => Ok(None),
            Some(RawId::Int(value)) => Ok(Some(value)),
            Some(RawId::Text(text)) => {
                if text.trim().is_empty() {
                    Ok(None)
                } else {
                    parse_text(&text).map(Some)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_rfc3339() {
        assert_eq!(
            parse_timestamp_millis("1970-01-01T00:00:01Z"),
            1_000
        );
        assert!(parse_timestamp_millis("2024-02-01T12:30:00+02:00") > 0);
    }

    #[test]
    fn test_parse_timestamp_datetime_local() {
        let short = parse_timestamp_millis("2024-01-01T10:00");
        let long = parse_timestamp_millis("2024-01-01T10:00:00");
        assert_eq!(short, long);
        assert!(short > 0);
    }

    #[test]
    fn test_parse_timestamp_bare_date() {
        let date = parse_timestamp_millis("2024-01-01");
        let datetime = parse_timestamp_millis("2024-01-01T00:00:00");
        assert_eq!(date, datetime);
    }

    #[test]
    fn test_parse_timestamp_garbage_is_epoch() {
        assert_eq!(parse_timestamp_millis(""), 0);
        assert_eq!(parse_timestamp_millis("not a date"), 0);
        assert_eq!(parse_timestamp_millis("   "), 0);
    }

    #[test]
    fn test_parse_timestamp_ordering() {
        let earlier = parse_timestamp_millis("2024-01-01T00:00:00Z");
        let later = parse_timestamp_millis("2024-02-01T00:00:00Z");
        assert!(earlier < later);
    }
}
