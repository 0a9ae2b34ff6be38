//! Fusion scoring and the result record it produces.
//!
//! `fusion_score = momentum - event_risk + sentiment`, classified with
//! inclusive thresholds at +1 and -1. Event risk only ever subtracts, so on
//! its own it can suppress a verdict but never trigger one.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactId;
use crate::signals::{EventRisk, MomentumSignal};
use crate::{Instrument, UtcDateTime};

pub const BUY_THRESHOLD: f64 = 1.0;
pub const SELL_THRESHOLD: f64 = -1.0;

/// Final categorical bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Buy,
    Sell,
    Standby,
}

impl Verdict {
    /// Total over all inputs; NaN falls through to `Standby`.
    pub fn classify(score: f64) -> Self {
        if score >= BUY_THRESHOLD {
            Self::Buy
        } else if score <= SELL_THRESHOLD {
            Self::Sell
        } else {
            Self::Standby
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Standby => "STANDBY",
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Combine the three signals into `(fusion_score, verdict)`.
pub fn score(momentum: MomentumSignal, event_risk: EventRisk, sentiment: f64) -> (f64, Verdict) {
    let fusion_score = f64::from(momentum.value()) - f64::from(event_risk.value()) + sentiment;
    (fusion_score, Verdict::classify(fusion_score))
}

/// Source artifacts that contributed to one result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub price: ArtifactId,
    pub calendar: Option<ArtifactId>,
    pub sentiment: Option<ArtifactId>,
}

impl Provenance {
    /// `[price, calendar, sentiment]`, with `""` for absent inputs.
    pub fn source_files(&self) -> Vec<String> {
        let name = |id: &Option<ArtifactId>| {
            id.as_ref()
                .map(|id| id.as_str().to_owned())
                .unwrap_or_default()
        };
        vec![
            self.price.as_str().to_owned(),
            name(&self.calendar),
            name(&self.sentiment),
        ]
    }
}

/// Outcome of fusing one instrument in one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusionResult {
    pub generated_at: UtcDateTime,
    pub instrument: Instrument,
    pub last_close: f64,
    pub momentum_reference: f64,
    pub momentum: MomentumSignal,
    pub event_risk: EventRisk,
    pub sentiment_score: f64,
    pub fusion_score: f64,
    pub verdict: Verdict,
    pub provenance: Provenance,
}
