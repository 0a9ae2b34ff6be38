use thiserror::Error;

use crate::artifact::{ArtifactId, ArtifactKind, Scope};

/// Validation and contract errors exposed by `umbra-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("instrument cannot be empty")]
    EmptyInstrument,
    #[error("instrument length {len} exceeds max {max}")]
    InstrumentTooLong { len: usize, max: usize },
    #[error("instrument contains invalid character '{ch}' at index {index}")]
    InstrumentInvalidChar { ch: char, index: usize },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("timestamp is outside the representable range")]
    TimestampOutOfRange,
    #[error("duplicate price timestamp {value}")]
    DuplicateTimestamp { value: String },

    #[error("unrecognized artifact identifier '{value}'")]
    InvalidIdentifier { value: String },
    #[error("invalid artifact kind '{value}', expected one of price, calendar, sentiment, fusion")]
    InvalidKind { value: String },
    #[error("invalid resolution '{value}', expected one of 15m, 1h")]
    InvalidResolution { value: String },

    #[error("momentum window must be at least 1")]
    InvalidWindow,
    #[error("event horizon must be positive")]
    InvalidHorizon,
    #[error("instrument list cannot be empty")]
    EmptyInstrumentList,
}

/// Failure taxonomy of a fusion run.
///
/// `InsufficientData`, `MissingArtifact` and `MalformedArtifact` are recovered
/// at the instrument boundary (skip or degrade); `WriteConflict` fails only the
/// output of the instrument that produced it.
#[derive(Debug, Error)]
pub enum FusionError {
    #[error("insufficient price data: {usable} usable close(s), need at least 2")]
    InsufficientData { usable: usize },

    #[error("no {kind} artifact found for scope {scope}")]
    MissingArtifact { kind: ArtifactKind, scope: Scope },

    #[error("malformed artifact {identifier}: {reason}")]
    MalformedArtifact {
        identifier: ArtifactId,
        reason: String,
    },

    #[error("artifact {identifier} already exists with different content")]
    WriteConflict { identifier: ArtifactId },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FusionError {
    pub(crate) fn malformed(identifier: &ArtifactId, reason: impl Into<String>) -> Self {
        Self::MalformedArtifact {
            identifier: identifier.clone(),
            reason: reason.into(),
        }
    }
}
