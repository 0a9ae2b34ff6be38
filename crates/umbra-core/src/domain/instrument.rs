use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_INSTRUMENT_LEN: usize = 15;

/// Normalized instrument code (e.g. `EURUSD`).
///
/// Underscores are rejected because they separate identifier fields.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Instrument(String);

impl Instrument {
    /// Parse and normalize an instrument code to uppercase.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyInstrument);
        }

        let normalized = trimmed.to_ascii_uppercase();
        let len = normalized.chars().count();
        if len > MAX_INSTRUMENT_LEN {
            return Err(ValidationError::InstrumentTooLong {
                len,
                max: MAX_INSTRUMENT_LEN,
            });
        }

        for (index, ch) in normalized.chars().enumerate() {
            let valid = ch.is_ascii_alphanumeric() || ch == '.' || ch == '-';
            if !valid {
                return Err(ValidationError::InstrumentInvalidChar { ch, index });
            }
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Instrument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Instrument {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Instrument {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Instrument> for String {
    fn from(value: Instrument) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_instrument() {
        let parsed = Instrument::parse(" eurusd ").expect("instrument should parse");
        assert_eq!(parsed.as_str(), "EURUSD");
    }

    #[test]
    fn rejects_identifier_separator() {
        let err = Instrument::parse("EUR_USD").expect_err("must fail");
        assert_eq!(err, ValidationError::InstrumentInvalidChar { ch: '_', index: 3 });
    }

    #[test]
    fn rejects_empty_instrument() {
        let err = Instrument::parse("   ").expect_err("must fail");
        assert_eq!(err, ValidationError::EmptyInstrument);
    }
}
