//! Loaders for the artifacts produced by the ingestion collaborators.
//!
//! Every failure to read a located artifact into its expected shape is a
//! [`FusionError::MalformedArtifact`] carrying the artifact identifier.

use std::fs;
use std::str::FromStr;

use serde::Deserialize;
use serde_yaml::Value;

use super::ArtifactRef;
use crate::signals::{CalendarEvent, PricePoint, PriceSeries, SentimentSnapshot, Severity};
use crate::{FusionError, Instrument, Resolution, UtcDateTime};

#[derive(Debug, Deserialize)]
struct PriceDocument {
    #[serde(default, alias = "pair", alias = "symbol")]
    instrument: Option<String>,
    #[serde(default, alias = "interval")]
    resolution: Option<String>,
    rows: Vec<PriceRow>,
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    #[serde(alias = "Datetime", alias = "timestamp", alias = "ts")]
    datetime: String,
    #[serde(default, alias = "Close")]
    close: Value,
}

#[derive(Debug, Deserialize)]
struct CalendarDocument {
    #[serde(default)]
    events: Vec<EventRow>,
}

#[derive(Debug, Deserialize)]
struct EventRow {
    #[serde(default)]
    title: String,
    #[serde(default, alias = "ccy", alias = "country")]
    currency: String,
    #[serde(alias = "impact")]
    severity: String,
    #[serde(alias = "timestamp_utc", alias = "timestamp")]
    event_time: String,
}

#[derive(Debug, Deserialize)]
struct SentimentDocument {
    #[serde(default, alias = "timestamp_utc", alias = "timestamp")]
    generated_at: Option<String>,
    #[serde(default)]
    headline_count: Option<usize>,
    average_score: f64,
    #[serde(default)]
    headlines: Vec<HeadlineRow>,
}

#[derive(Debug, Deserialize)]
struct HeadlineRow {
    #[serde(default)]
    score: Value,
}

fn read_document<T>(artifact: &ArtifactRef) -> Result<T, FusionError>
where
    T: for<'de> Deserialize<'de>,
{
    let raw = fs::read_to_string(&artifact.path)
        .map_err(|error| FusionError::malformed(&artifact.id, error.to_string()))?;
    serde_yaml::from_str(&raw).map_err(|error| FusionError::malformed(&artifact.id, error.to_string()))
}

/// Load the price series of `instrument`.
///
/// The payload must agree with the identifier on the instrument and, when it
/// declares one, with the configured `resolution`.
pub fn load_price_series(
    artifact: &ArtifactRef,
    instrument: &Instrument,
    resolution: Resolution,
) -> Result<PriceSeries, FusionError> {
    if artifact.id.scope().instrument() != Some(instrument) {
        return Err(FusionError::malformed(
            &artifact.id,
            format!("identifier is not scoped to {instrument}"),
        ));
    }

    let document: PriceDocument = read_document(artifact)?;

    if let Some(declared) = document.instrument.as_deref() {
        let declared = Instrument::parse(declared)
            .map_err(|error| FusionError::malformed(&artifact.id, error.to_string()))?;
        if &declared != instrument {
            return Err(FusionError::malformed(
                &artifact.id,
                format!("payload declares instrument {declared}, expected {instrument}"),
            ));
        }
    }

    if let Some(declared) = document.resolution.as_deref() {
        let declared = Resolution::from_str(declared)
            .map_err(|error| FusionError::malformed(&artifact.id, error.to_string()))?;
        if declared != resolution {
            return Err(FusionError::malformed(
                &artifact.id,
                format!("price resolution {declared} does not match configured {resolution}"),
            ));
        }
    }

    let points = document
        .rows
        .iter()
        .map(|row| {
            let ts = UtcDateTime::parse_lenient(&row.datetime)
                .map_err(|error| FusionError::malformed(&artifact.id, error.to_string()))?;
            Ok(PricePoint::new(ts, numeric_value(&row.close)))
        })
        .collect::<Result<Vec<_>, FusionError>>()?;

    PriceSeries::new(instrument.clone(), points)
        .map_err(|error| FusionError::malformed(&artifact.id, error.to_string()))
}

/// Finite numbers and numeric strings; anything else is absent.
fn numeric_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|number| number.is_finite())
}

/// Load the events of a calendar snapshot.
pub fn load_calendar(artifact: &ArtifactRef) -> Result<Vec<CalendarEvent>, FusionError> {
    let document: CalendarDocument = read_document(artifact)?;

    document
        .events
        .into_iter()
        .map(|row| {
            let severity = Severity::from_str(&row.severity)
                .map_err(|reason| FusionError::malformed(&artifact.id, reason))?;
            let event_time = UtcDateTime::parse_lenient(&row.event_time)
                .map_err(|error| FusionError::malformed(&artifact.id, error.to_string()))?;
            Ok(CalendarEvent {
                title: row.title,
                currency: row.currency,
                severity,
                event_time,
            })
        })
        .collect()
}

/// Load a sentiment snapshot. A non-finite average is malformed.
pub fn load_sentiment(artifact: &ArtifactRef) -> Result<SentimentSnapshot, FusionError> {
    let document: SentimentDocument = read_document(artifact)?;

    if !document.average_score.is_finite() {
        return Err(FusionError::malformed(
            &artifact.id,
            "average_score must be finite",
        ));
    }

    let generated_at = document
        .generated_at
        .as_deref()
        .map(UtcDateTime::parse_lenient)
        .transpose()
        .map_err(|error| FusionError::malformed(&artifact.id, error.to_string()))?;
    // unscored headlines still count towards headline_count
    let headline_scores: Vec<f64> = document
        .headlines
        .iter()
        .filter_map(|row| numeric_value(&row.score))
        .collect();

    Ok(SentimentSnapshot {
        generated_at,
        headline_count: document.headline_count.unwrap_or(document.headlines.len()),
        average_score: document.average_score,
        headline_scores,
    })
}
