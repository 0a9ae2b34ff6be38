//! Price momentum from a recursive exponential moving average.
//!
//! The canonical input is the quarter-hour series produced by price ingestion,
//! smoothed over [`DEFAULT_WINDOW`] candles (ten hours of wall clock).

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{FusionError, Instrument, UtcDateTime, ValidationError};

/// Forty quarter-hour candles, the same horizon as ten hourly candles.
pub const DEFAULT_WINDOW: usize = 40;

/// One candle close. `None` marks a missing or non-numeric value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub ts: UtcDateTime,
    pub close: Option<f64>,
}

impl PricePoint {
    pub fn new(ts: UtcDateTime, close: Option<f64>) -> Self {
        Self {
            ts,
            close: close.filter(|value| value.is_finite()),
        }
    }
}

/// Price history for one instrument, ascending by timestamp, no duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    instrument: Instrument,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Sorts `points` ascending and rejects duplicate timestamps.
    pub fn new(instrument: Instrument, mut points: Vec<PricePoint>) -> Result<Self, ValidationError> {
        points.sort_by_key(|point| point.ts);
        if let Some(pair) = points.windows(2).find(|pair| pair[0].ts == pair[1].ts) {
            return Err(ValidationError::DuplicateTimestamp {
                value: pair[0].ts.format_rfc3339(),
            });
        }
        Ok(Self { instrument, points })
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Closes that are present, in time order.
    pub fn usable_closes(&self) -> Vec<f64> {
        self.points.iter().filter_map(|point| point.close).collect()
    }
}

/// Direction of price relative to its smoothed average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum MomentumSignal {
    Up,
    Down,
}

impl MomentumSignal {
    pub const fn value(self) -> i8 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

impl From<MomentumSignal> for i8 {
    fn from(value: MomentumSignal) -> Self {
        value.value()
    }
}

impl TryFrom<i8> for MomentumSignal {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Up),
            -1 => Ok(Self::Down),
            other => Err(format!("momentum must be -1 or 1, got {other}")),
        }
    }
}

impl Display for MomentumSignal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:+}", self.value())
    }
}

/// Outcome of [`estimate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Momentum {
    pub signal: MomentumSignal,
    /// Final EMA value the last close was compared with.
    pub reference: f64,
    pub last_close: f64,
    pub usable_points: usize,
}

/// Compare the last usable close with the recursive EMA of the trailing
/// `window` usable closes.
///
/// Fails with [`FusionError::InsufficientData`] below two usable closes. A
/// series shorter than `window` is smoothed over what is available. Equality
/// maps to [`MomentumSignal::Down`].
pub fn estimate(series: &PriceSeries, window: usize) -> Result<Momentum, FusionError> {
    if window == 0 {
        return Err(ValidationError::InvalidWindow.into());
    }

    let closes = series.usable_closes();
    if closes.len() < 2 {
        return Err(FusionError::InsufficientData {
            usable: closes.len(),
        });
    }

    let tail = &closes[closes.len().saturating_sub(window)..];
    let (Some(reference), Some(&last_close)) = (recursive_ema(tail, window), tail.last()) else {
        return Err(FusionError::InsufficientData {
            usable: closes.len(),
        });
    };

    let signal = if last_close > reference {
        MomentumSignal::Up
    } else {
        MomentumSignal::Down
    };

    Ok(Momentum {
        signal,
        reference,
        last_close,
        usable_points: closes.len(),
    })
}

/// Unadjusted EMA with span `window`: seeded with the first value, then
/// `ema = alpha * x + (1 - alpha) * ema` with `alpha = 2 / (window + 1)`.
pub fn recursive_ema(values: &[f64], window: usize) -> Option<f64> {
    let (&first, rest) = values.split_first()?;
    let alpha = 2.0 / (window as f64 + 1.0);
    Some(
        rest.iter()
            .fold(first, |ema, &value| alpha * value + (1.0 - alpha) * ema),
    )
}
