use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::{Date, Duration, Month, OffsetDateTime, Time, UtcOffset};

use crate::ValidationError;

/// RFC3339 timestamp guaranteed to be UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(OffsetDateTime);

impl UtcDateTime {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let parsed = OffsetDateTime::parse(input, &Rfc3339).map_err(|_| {
            ValidationError::TimestampNotUtc {
                value: input.to_owned(),
            }
        })?;

        Self::from_offset_datetime(parsed).map_err(|_| ValidationError::TimestampNotUtc {
            value: input.to_owned(),
        })
    }

    /// Parse RFC3339 with any offset, converted to UTC, falling back to the
    /// naive `YYYY-MM-DD HH:MM[:SS]` and `YYYY-MM-DDTHH:MM:SS` forms emitted by
    /// upstream feeds, read as UTC.
    pub fn parse_lenient(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
            return parsed
                .checked_to_offset(UtcOffset::UTC)
                .map(Self)
                .ok_or(ValidationError::TimestampOutOfRange);
        }

        let mut normalized = trimmed.replacen(' ', "T", 1);
        if normalized.len() == "YYYY-MM-DDTHH:MM".len() {
            normalized.push_str(":00");
        }
        normalized.push('Z');

        Self::parse(&normalized).map_err(|_| ValidationError::TimestampNotUtc {
            value: input.to_owned(),
        })
    }

    /// Parse the file-name form `YYYY-MM-DDTHH-MM-SS[.fraction]Z`.
    pub fn parse_compact(input: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::TimestampNotUtc {
            value: input.to_owned(),
        };

        let (date, clock) = input.split_once('T').ok_or_else(invalid)?;
        let clock = clock.strip_suffix('Z').ok_or_else(invalid)?;
        let (hms, fraction) = match clock.split_once('.') {
            Some((hms, fraction)) => (hms, Some(fraction)),
            None => (clock, None),
        };
        if hms.len() != "HH-MM-SS".len() {
            return Err(invalid());
        }

        let mut rfc3339 = format!("{date}T{}", hms.replace('-', ":"));
        if let Some(fraction) = fraction {
            rfc3339.push('.');
            rfc3339.push_str(fraction);
        }
        rfc3339.push('Z');

        Self::parse(&rfc3339).map_err(|_| invalid())
    }

    /// Build a timestamp from the legacy `YYYYMMDD` + `HHMM` file-name parts.
    pub fn from_compact_minute(date: &str, clock: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::TimestampNotUtc {
            value: format!("{date}_{clock}"),
        };
        if date.len() != 8 || clock.len() != 4 {
            return Err(invalid());
        }
        if !date.chars().chain(clock.chars()).all(|ch| ch.is_ascii_digit()) {
            return Err(invalid());
        }

        let number = |slice: &str| slice.parse::<u16>().map_err(|_| invalid());
        let year = i32::from(number(&date[0..4])?);
        let month = u8::try_from(number(&date[4..6])?).map_err(|_| invalid())?;
        let day = u8::try_from(number(&date[6..8])?).map_err(|_| invalid())?;
        let hour = u8::try_from(number(&clock[0..2])?).map_err(|_| invalid())?;
        let minute = u8::try_from(number(&clock[2..4])?).map_err(|_| invalid())?;

        let month = Month::try_from(month).map_err(|_| invalid())?;
        let date = Date::from_calendar_date(year, month, day).map_err(|_| invalid())?;
        let time = Time::from_hms(hour, minute, 0).map_err(|_| invalid())?;
        Ok(Self(date.with_time(time).assume_utc()))
    }

    pub fn from_offset_datetime(value: OffsetDateTime) -> Result<Self, ValidationError> {
        if value.offset() != UtcOffset::UTC {
            return Err(ValidationError::TimestampNotUtc {
                value: value
                    .format(&Rfc3339)
                    .unwrap_or_else(|_| String::from("<unformattable>")),
            });
        }

        Ok(Self(value))
    }

    pub fn from_unix_timestamp(seconds: i64) -> Result<Self, ValidationError> {
        OffsetDateTime::from_unix_timestamp(seconds)
            .map(Self)
            .map_err(|_| ValidationError::TimestampOutOfRange)
    }

    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    /// Drop sub-second precision.
    pub fn truncate_to_seconds(self) -> Self {
        self.0.replace_nanosecond(0).map(Self).unwrap_or(self)
    }

    pub fn checked_add(self, duration: Duration) -> Option<Self> {
        self.0.checked_add(duration).map(Self)
    }

    pub fn format_rfc3339(self) -> String {
        self.0
            .format(&Rfc3339)
            .expect("UtcDateTime must be RFC3339 formattable")
    }

    /// File-name safe form, `YYYY-MM-DDTHH-MM-SSZ` (second resolution).
    pub fn format_compact(self) -> String {
        format!(
            "{:04}-{:02}-{:02}T{:02}-{:02}-{:02}Z",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day(),
            self.0.hour(),
            self.0.minute(),
            self.0.second()
        )
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_rfc3339())
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_rfc3339())
    }
}

impl<'de> Deserialize<'de> for UtcDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse_lenient(&value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_utc_timestamp() {
        let parsed = UtcDateTime::parse("2024-01-01T00:00:00Z").expect("must parse");
        assert_eq!(parsed.format_rfc3339(), "2024-01-01T00:00:00Z");
    }

    #[test]
    fn rejects_non_utc_timestamp() {
        let err = UtcDateTime::parse("2024-01-01T01:00:00+01:00").expect_err("must fail");
        assert!(matches!(err, ValidationError::TimestampNotUtc { .. }));
    }

    #[test]
    fn accepts_explicit_zero_offset() {
        let parsed = UtcDateTime::parse("2025-07-15T08:30:00+00:00").expect("must parse");
        assert_eq!(parsed.format_rfc3339(), "2025-07-15T08:30:00Z");
    }

    #[test]
    fn lenient_parse_reads_naive_feed_times_as_utc() {
        let spaced = UtcDateTime::parse_lenient("2025-07-15 08:30:00").expect("must parse");
        let short = UtcDateTime::parse_lenient("2025-07-15 08:30").expect("must parse");
        let naive = UtcDateTime::parse_lenient("2025-07-15T08:30:00").expect("must parse");

        assert_eq!(spaced.format_rfc3339(), "2025-07-15T08:30:00Z");
        assert_eq!(short, spaced);
        assert_eq!(naive, spaced);
    }

    #[test]
    fn lenient_parse_converts_offsets_to_utc() {
        let shifted = UtcDateTime::parse_lenient("2025-07-15T12:30:00+02:00").expect("must parse");
        assert_eq!(shifted.format_rfc3339(), "2025-07-15T10:30:00Z");

        let err = UtcDateTime::parse("2025-07-15T12:30:00+02:00").expect_err("strict parse");
        assert!(matches!(err, ValidationError::TimestampNotUtc { .. }));
    }

    #[test]
    fn compact_form_round_trips() {
        let ts = UtcDateTime::parse("2025-07-15T08:30:05Z").expect("must parse");
        assert_eq!(ts.format_compact(), "2025-07-15T08-30-05Z");
        assert_eq!(UtcDateTime::parse_compact("2025-07-15T08-30-05Z"), Ok(ts));
    }

    #[test]
    fn compact_form_accepts_fractional_seconds() {
        let ts = UtcDateTime::parse_compact("2025-07-15T08-30-05.123456Z").expect("must parse");
        assert_eq!(ts.truncate_to_seconds().format_rfc3339(), "2025-07-15T08:30:05Z");
    }

    #[test]
    fn compact_minute_form_parses() {
        let ts = UtcDateTime::from_compact_minute("20250715", "0830").expect("must parse");
        assert_eq!(ts.format_rfc3339(), "2025-07-15T08:30:00Z");

        let err = UtcDateTime::from_compact_minute("20251315", "0830").expect_err("must fail");
        assert!(matches!(err, ValidationError::TimestampNotUtc { .. }));
    }
}
