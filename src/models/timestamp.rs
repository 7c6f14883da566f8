use chrono::{NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serializer};

use crate::error::{AppError, Result};

/// Wire and storage format for query timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const ACCEPTED_FORMATS: [&str; 3] = [TIMESTAMP_FORMAT, "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    ACCEPTED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| AppError::MalformedTimestamp(s.to_string()))
}

pub fn format_timestamp(dt: &NaiveDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Current UTC time truncated to whole seconds.
pub fn now_timestamp() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

pub(crate) fn serialize<S>(dt: &NaiveDateTime, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_timestamp(dt))
}

pub(crate) fn deserialize<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_timestamp(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parses_canonical_and_tolerated_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 7, 0)
            .unwrap();

        assert_eq!(parse_timestamp("2024-03-05T14:07:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-05T14:07").unwrap(), expected);
        assert_eq!(parse_timestamp(" 2024-03-05T14:07:00.000 ").unwrap(), expected);
    }

    #[test]
    fn rejects_other_shapes() {
        for bad in ["2024-03-05", "05/03/2024 14:07", "yesterday", "2024-13-05T00:00:00"] {
            assert!(
                matches!(parse_timestamp(bad), Err(AppError::MalformedTimestamp(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn formats_without_fraction() {
        let dt = parse_timestamp("2021-06-01T00:00:00.123").unwrap();
        assert_eq!(format_timestamp(&dt), "2021-06-01T00:00:00");
    }
}
