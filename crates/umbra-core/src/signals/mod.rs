//! The three independent inputs of the fusion score.

pub mod event_risk;
pub mod momentum;
pub mod sentiment;

pub use event_risk::{CalendarEvent, EventRisk, Severity, DEFAULT_HORIZON_HOURS};
pub use momentum::{
    estimate, recursive_ema, Momentum, MomentumSignal, PricePoint, PriceSeries, DEFAULT_WINDOW,
};
pub use sentiment::{SentimentSnapshot, NEUTRAL_SCORE};
