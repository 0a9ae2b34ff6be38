//! One fusion run over the configured instruments.
//!
//! Calendar and sentiment are resolved once and shared read-only by every
//! instrument. A missing or malformed global input degrades to its neutral
//! default; a per-instrument failure is recorded as a skip and the run moves
//! on. Nothing escapes the instrument boundary unrecorded.

use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::artifact::{
    load_calendar, load_price_series, load_sentiment, ArtifactId, ArtifactIndex, ArtifactKind,
    ArtifactRef, ArtifactSelector, ArtifactWriter, WrittenArtifact,
};
use crate::fusion::{self, FusionResult, Provenance, Verdict};
use crate::signals::{event_risk, momentum, sentiment, EventRisk};
use crate::{FusionConfig, FusionError, Instrument, UtcDateTime, ValidationError};

/// Why an instrument produced no fusion artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum SkipReason {
    MissingPrice,
    MalformedPrice {
        identifier: ArtifactId,
        reason: String,
    },
    InsufficientData {
        usable: usize,
    },
    WriteConflict {
        identifier: ArtifactId,
    },
    Failed {
        message: String,
    },
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingPrice => f.write_str("no price artifact"),
            Self::MalformedPrice { identifier, reason } => {
                write!(f, "malformed price artifact {identifier}: {reason}")
            }
            Self::InsufficientData { usable } => {
                write!(f, "{usable} usable close(s), need at least 2")
            }
            Self::WriteConflict { identifier } => {
                write!(f, "{identifier} already exists with different content")
            }
            Self::Failed { message } => f.write_str(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkipRecord {
    pub instrument: Instrument,
    pub reason: SkipReason,
}

/// Why a global input fell back to its neutral default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum DegradeReason {
    Missing,
    Malformed { identifier: ArtifactId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegradeRecord {
    pub kind: ArtifactKind,
    pub reason: DegradeReason,
    pub default_applied: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedRecord {
    pub identifier: ArtifactId,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusionRecord {
    pub result: FusionResult,
    pub artifact: WrittenArtifact,
}

/// Observable outcome of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub generated_at: UtcDateTime,
    pub artifact_root: PathBuf,
    pub indexed_artifacts: usize,
    pub event_risk: EventRisk,
    pub sentiment_score: f64,
    pub fused: Vec<FusionRecord>,
    pub skipped: Vec<SkipRecord>,
    pub degraded: Vec<DegradeRecord>,
    pub malformed: Vec<MalformedRecord>,
}

impl RunReport {
    fn new(generated_at: UtcDateTime, index: &ArtifactIndex) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at,
            artifact_root: index.root().to_path_buf(),
            indexed_artifacts: index.len(),
            event_risk: EventRisk::Clear,
            sentiment_score: sentiment::NEUTRAL_SCORE,
            fused: Vec::new(),
            skipped: Vec::new(),
            degraded: Vec::new(),
            malformed: Vec::new(),
        }
    }

    /// No skips, degrades or malformed inputs.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.degraded.is_empty() && self.malformed.is_empty()
    }

    pub fn verdict_of(&self, instrument: &Instrument) -> Option<Verdict> {
        self.fused
            .iter()
            .find(|record| &record.result.instrument == instrument)
            .map(|record| record.result.verdict)
    }

    /// One line per skip, degrade and malformed artifact.
    pub fn warnings(&self) -> Vec<String> {
        let degraded = self.degraded.iter().map(|record| match &record.reason {
            DegradeReason::Missing => format!(
                "no {} artifact, using {}",
                record.kind, record.default_applied
            ),
            DegradeReason::Malformed { identifier } => format!(
                "{} artifact {identifier} unusable, using {}",
                record.kind, record.default_applied
            ),
        });
        let skipped = self
            .skipped
            .iter()
            .map(|record| format!("{} skipped: {}", record.instrument, record.reason));
        let malformed = self
            .malformed
            .iter()
            .map(|record| format!("malformed artifact {}: {}", record.identifier, record.reason));

        degraded.chain(skipped).chain(malformed).collect()
    }

    fn record_malformed(&mut self, identifier: &ArtifactId, reason: &str) {
        self.malformed.push(MalformedRecord {
            identifier: identifier.clone(),
            reason: reason.to_owned(),
        });
    }

    fn record_skip(&mut self, instrument: &Instrument, error: FusionError) {
        let reason = match error {
            FusionError::InsufficientData { usable } => SkipReason::InsufficientData { usable },
            FusionError::MissingArtifact { .. } => SkipReason::MissingPrice,
            FusionError::MalformedArtifact { identifier, reason } => {
                self.record_malformed(&identifier, &reason);
                SkipReason::MalformedPrice { identifier, reason }
            }
            FusionError::WriteConflict { identifier } => SkipReason::WriteConflict { identifier },
            other => SkipReason::Failed {
                message: other.to_string(),
            },
        };
        warn!(instrument = %instrument, reason = %reason, "instrument skipped");
        self.skipped.push(SkipRecord {
            instrument: instrument.clone(),
            reason,
        });
    }
}

/// Inputs shared by every instrument of a run.
#[derive(Debug, Clone)]
struct SharedInputs {
    event_risk: EventRisk,
    sentiment_score: f64,
    calendar: Option<ArtifactId>,
    sentiment: Option<ArtifactId>,
}

pub struct FusionEngine {
    config: FusionConfig,
    writer: ArtifactWriter,
}

impl FusionEngine {
    pub fn new(config: FusionConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        let writer = ArtifactWriter::new(config.output_dir.clone());
        Ok(Self { config, writer })
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Index the artifact pool and run. Only a failure to read the pool
    /// itself is an error.
    pub fn run(&self, now: UtcDateTime) -> Result<RunReport, FusionError> {
        let index = ArtifactIndex::scan(&self.config.artifact_root)?;
        Ok(self.run_with_index(&index, now))
    }

    /// Run against a prebuilt index. `now` is truncated to seconds and used
    /// both as the event-risk reference and as the artifact timestamp.
    pub fn run_with_index(&self, index: &ArtifactIndex, now: UtcDateTime) -> RunReport {
        let generated_at = now.truncate_to_seconds();
        let mut report = RunReport::new(generated_at, index);

        let calendar = resolve_global(
            index,
            &ArtifactSelector::calendar(),
            "event_risk=0",
            load_calendar,
            &mut report,
        );
        let snapshot = resolve_global(
            index,
            &ArtifactSelector::sentiment(),
            "sentiment=0",
            load_sentiment,
            &mut report,
        );

        let events = calendar
            .as_ref()
            .map_or(&[][..], |(_, events)| events.as_slice());
        let shared = SharedInputs {
            event_risk: event_risk::risk(events, generated_at, self.config.event_horizon),
            sentiment_score: sentiment::score(snapshot.as_ref().map(|(_, snapshot)| snapshot)),
            calendar: calendar.map(|(id, _)| id),
            sentiment: snapshot.map(|(id, _)| id),
        };
        report.event_risk = shared.event_risk;
        report.sentiment_score = shared.sentiment_score;

        for instrument in &self.config.instruments {
            match self.fuse_instrument(index, instrument, generated_at, &shared) {
                Ok(record) => report.fused.push(record),
                Err(error) => report.record_skip(instrument, error),
            }
        }

        info!(
            run_id = %report.run_id,
            fused = report.fused.len(),
            skipped = report.skipped.len(),
            degraded = report.degraded.len(),
            "fusion run complete"
        );
        report
    }

    fn fuse_instrument(
        &self,
        index: &ArtifactIndex,
        instrument: &Instrument,
        generated_at: UtcDateTime,
        shared: &SharedInputs,
    ) -> Result<FusionRecord, FusionError> {
        let selector = ArtifactSelector::price(instrument);
        let price = index
            .latest(&selector)
            .ok_or_else(|| FusionError::MissingArtifact {
                kind: selector.kind(),
                scope: selector.scope().clone(),
            })?;

        let series = load_price_series(price, instrument, self.config.resolution)?;
        let momentum = momentum::estimate(&series, self.config.momentum_window)?;
        let (fusion_score, verdict) =
            fusion::score(momentum.signal, shared.event_risk, shared.sentiment_score);

        let result = FusionResult {
            generated_at,
            instrument: instrument.clone(),
            last_close: momentum.last_close,
            momentum_reference: momentum.reference,
            momentum: momentum.signal,
            event_risk: shared.event_risk,
            sentiment_score: shared.sentiment_score,
            fusion_score,
            verdict,
            provenance: Provenance {
                price: price.id.clone(),
                calendar: shared.calendar.clone(),
                sentiment: shared.sentiment.clone(),
            },
        };

        let artifact = self.writer.write(&result)?;
        Ok(FusionRecord { result, artifact })
    }
}

fn resolve_global<T>(
    index: &ArtifactIndex,
    selector: &ArtifactSelector,
    default_applied: &'static str,
    load: fn(&ArtifactRef) -> Result<T, FusionError>,
    report: &mut RunReport,
) -> Option<(ArtifactId, T)> {
    let kind = selector.kind();
    let Some(artifact) = index.latest(selector) else {
        warn!(kind = %kind, default = default_applied, "no artifact found, degrading");
        report.degraded.push(DegradeRecord {
            kind,
            reason: DegradeReason::Missing,
            default_applied,
        });
        return None;
    };

    match load(artifact) {
        Ok(payload) => Some((artifact.id.clone(), payload)),
        Err(error) => {
            warn!(
                kind = %kind,
                artifact = %artifact.id,
                error = %error,
                default = default_applied,
                "artifact unusable, degrading"
            );
            let reason = match error {
                FusionError::MalformedArtifact { reason, .. } => reason,
                other => other.to_string(),
            };
            report.record_malformed(&artifact.id, &reason);
            report.degraded.push(DegradeRecord {
                kind,
                reason: DegradeReason::Malformed {
                    identifier: artifact.id.clone(),
                },
                default_applied,
            });
            None
        }
    }
}
