use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Duration;

use crate::UtcDateTime;

/// Events closer than this are treated as imminent by default.
pub const DEFAULT_HORIZON_HOURS: i64 = 4;

/// Scheduled event impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// High and Medium events move the risk flag; Low never does.
    pub const fn is_material(self) -> bool {
        matches!(self, Self::High | Self::Medium)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            // calendar feeds also emit non-impacting "Holiday" rows
            "low" | "holiday" | "non-economic" | "none" => Ok(Self::Low),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// One scheduled macro event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub title: String,
    pub currency: String,
    pub severity: Severity,
    pub event_time: UtcDateTime,
}

/// Binary near-term event risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum EventRisk {
    #[default]
    Clear,
    Elevated,
}

impl EventRisk {
    pub const fn value(self) -> u8 {
        match self {
            Self::Clear => 0,
            Self::Elevated => 1,
        }
    }
}

impl From<EventRisk> for u8 {
    fn from(value: EventRisk) -> Self {
        value.value()
    }
}

impl TryFrom<u8> for EventRisk {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Clear),
            1 => Ok(Self::Elevated),
            other => Err(format!("event risk must be 0 or 1, got {other}")),
        }
    }
}

impl Display for EventRisk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// `Elevated` iff a High or Medium event falls strictly inside
/// `(now, now + horizon)`.
pub fn risk(events: &[CalendarEvent], now: UtcDateTime, horizon: Duration) -> EventRisk {
    // An unrepresentable upper bound leaves the window open-ended.
    let until = now.checked_add(horizon);
    let imminent = events.iter().any(|event| {
        event.severity.is_material()
            && event.event_time > now
            && until.map_or(true, |until| event.event_time < until)
    });

    if imminent {
        EventRisk::Elevated
    } else {
        EventRisk::Clear
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> UtcDateTime {
        UtcDateTime::parse("2025-07-15T08:00:00Z").expect("valid")
    }

    fn event(severity: Severity, at: &str) -> CalendarEvent {
        CalendarEvent {
            title: String::from("CPI y/y"),
            currency: String::from("USD"),
            severity,
            event_time: UtcDateTime::parse(at).expect("valid"),
        }
    }

    #[test]
    fn material_event_inside_window_raises_risk() {
        let events = [event(Severity::High, "2025-07-15T10:00:00Z")];
        assert_eq!(risk(&events, now(), Duration::hours(4)), EventRisk::Elevated);

        let events = [event(Severity::Medium, "2025-07-15T11:59:59Z")];
        assert_eq!(risk(&events, now(), Duration::hours(4)), EventRisk::Elevated);
    }

    #[test]
    fn window_bounds_are_exclusive() {
        let at_now = [event(Severity::High, "2025-07-15T08:00:00Z")];
        let at_horizon = [event(Severity::High, "2025-07-15T12:00:00Z")];

        assert_eq!(risk(&at_now, now(), Duration::hours(4)), EventRisk::Clear);
        assert_eq!(risk(&at_horizon, now(), Duration::hours(4)), EventRisk::Clear);
    }

    #[test]
    fn past_and_low_severity_events_are_ignored() {
        let events = [
            event(Severity::High, "2025-07-15T07:00:00Z"),
            event(Severity::Low, "2025-07-15T09:00:00Z"),
        ];
        assert_eq!(risk(&events, now(), Duration::hours(4)), EventRisk::Clear);
    }

    #[test]
    fn risk_is_a_pure_function_of_inputs() {
        let events = [
            event(Severity::Low, "2025-07-15T09:00:00Z"),
            event(Severity::High, "2025-07-15T09:30:00Z"),
        ];
        let first = risk(&events, now(), Duration::hours(4));
        for _ in 0..10 {
            assert_eq!(risk(&events, now(), Duration::hours(4)), first);
        }
    }

    #[test]
    fn empty_or_non_positive_horizon_is_clear() {
        let events = [event(Severity::High, "2025-07-15T09:00:00Z")];
        assert_eq!(risk(&[], now(), Duration::hours(4)), EventRisk::Clear);
        assert_eq!(risk(&events, now(), Duration::ZERO), EventRisk::Clear);
    }

    #[test]
    fn severity_parsing_is_case_insensitive() {
        assert_eq!("HIGH".parse::<Severity>(), Ok(Severity::High));
        assert_eq!("Holiday".parse::<Severity>(), Ok(Severity::Low));
        assert!("Extreme".parse::<Severity>().is_err());
    }
}
