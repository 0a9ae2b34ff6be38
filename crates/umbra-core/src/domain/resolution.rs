use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Candle resolution of an ingested price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "1h")]
    OneHour,
}

impl Resolution {
    pub const ALL: [Self; 2] = [Self::FifteenMinutes, Self::OneHour];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FifteenMinutes => "15m",
            Self::OneHour => "1h",
        }
    }

    pub const fn minutes(self) -> u32 {
        match self {
            Self::FifteenMinutes => 15,
            Self::OneHour => 60,
        }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::FifteenMinutes
    }
}

impl Display for Resolution {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "15m" | "15min" | "m15" => Ok(Self::FifteenMinutes),
            "1h" | "60m" | "h1" => Ok(Self::OneHour),
            other => Err(ValidationError::InvalidResolution {
                value: other.to_owned(),
            }),
        }
    }
}
