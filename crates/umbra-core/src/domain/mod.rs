//! Domain primitives shared by every stage of a fusion run.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Instrument`] | Validated, upper-cased instrument code |
//! | [`Resolution`] | Candle resolution of a price series |
//! | [`UtcDateTime`] | UTC timestamp with RFC3339 and file-name forms |

mod instrument;
mod resolution;
mod timestamp;

pub use instrument::Instrument;
pub use resolution::Resolution;
pub use timestamp::UtcDateTime;
