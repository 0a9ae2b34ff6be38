//! # Umbra Core
//!
//! Signal fusion over file-based artifacts.
//!
//! ## Overview
//!
//! Ingestion collaborators leave timestamped YAML artifacts in a shared pool:
//! per-instrument price series, a global economic calendar and a global news
//! sentiment snapshot. A fusion run picks the most recent artifact of each
//! kind, derives three signals and writes one write-once fusion artifact per
//! instrument:
//!
//! - **Momentum**: sign of last close against a recursive EMA, `+1` or `-1`
//! - **Event risk**: `1` if a High/Medium event falls inside the horizon
//! - **Sentiment**: average headline polarity, `0.0` when absent
//!
//! `fusion_score = momentum - event_risk + sentiment`, classified as `BUY`
//! (>= 1), `SELL` (<= -1) or `STANDBY`.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`artifact`] | Identifiers, the artifact index, payload loaders and the writer |
//! | [`config`] | Run configuration and the instruments file |
//! | [`domain`] | Instrument, resolution and timestamp primitives |
//! | [`engine`] | One fusion run with skip/degrade bookkeeping |
//! | [`error`] | Validation and run errors |
//! | [`fusion`] | Scoring and the result record |
//! | [`signals`] | Momentum, event risk and sentiment |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use umbra_core::{FusionConfig, FusionEngine, Instrument, UtcDateTime};
//!
//! let mut config = FusionConfig::default();
//! config.set_instruments([Instrument::parse("EURUSD")?]);
//!
//! let engine = FusionEngine::new(config)?;
//! let report = engine.run(UtcDateTime::now())?;
//! for record in &report.fused {
//!     println!("{} {}", record.result.instrument, record.result.verdict);
//! }
//! ```
//!
//! ## Failure Model
//!
//! A run never aborts because of one instrument. Missing or malformed price
//! data skips that instrument; a missing or malformed calendar or sentiment
//! artifact degrades the corresponding signal to its neutral value for every
//! instrument. Both are listed in the [`RunReport`].

pub mod artifact;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod fusion;
pub mod signals;

// Artifacts
pub use artifact::{
    compare_recency, ArtifactId, ArtifactIndex, ArtifactKind, ArtifactRef, ArtifactSelector,
    ArtifactWriter, FusionDocument, IdPrecision, Scope, WrittenArtifact,
};

// Configuration
pub use config::{FusionConfig, InstrumentsFile};

// Domain models
pub use domain::{Instrument, Resolution, UtcDateTime};

// Engine
pub use engine::{
    DegradeReason, DegradeRecord, FusionEngine, FusionRecord, MalformedRecord, RunReport,
    SkipReason, SkipRecord,
};

// Error types
pub use error::{FusionError, ValidationError};

// Scoring
pub use fusion::{FusionResult, Provenance, Verdict};

// Signals
pub use signals::{
    CalendarEvent, EventRisk, Momentum, MomentumSignal, PricePoint, PriceSeries,
    SentimentSnapshot, Severity,
};
