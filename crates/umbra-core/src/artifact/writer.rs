use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::info;

use super::{ArtifactId, ArtifactKind, ArtifactRef, Scope};
use crate::fusion::{FusionResult, Provenance, Verdict};
use crate::signals::{EventRisk, MomentumSignal};
use crate::{FusionError, Instrument, UtcDateTime};

/// On-disk shape of a fusion artifact. Field order is the document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionDocument {
    pub generated_at: UtcDateTime,
    pub instrument: Instrument,
    pub last_close: f64,
    pub momentum_reference: f64,
    pub fx_momentum: MomentumSignal,
    pub event_risk: EventRisk,
    pub news_score: f64,
    pub fusion_score: f64,
    pub verdict: Verdict,
    pub source_files: Vec<String>,
    pub content_digest: String,
}

impl FusionDocument {
    pub fn from_result(result: &FusionResult) -> Result<Self, FusionError> {
        Ok(Self {
            generated_at: result.generated_at,
            instrument: result.instrument.clone(),
            last_close: result.last_close,
            momentum_reference: result.momentum_reference,
            fx_momentum: result.momentum,
            event_risk: result.event_risk,
            news_score: result.sentiment_score,
            fusion_score: result.fusion_score,
            verdict: result.verdict,
            source_files: result.provenance.source_files(),
            content_digest: content_digest(result)?,
        })
    }

    /// Rebuild the result record. The price source must name a price artifact
    /// for this instrument; empty calendar/sentiment names mean absent.
    pub fn to_result(&self, id: &ArtifactId) -> Result<FusionResult, FusionError> {
        let [price, calendar, sentiment] = self.source_files.as_slice() else {
            return Err(FusionError::malformed(
                id,
                format!("expected 3 source_files, found {}", self.source_files.len()),
            ));
        };

        let parse = |name: &str| -> Result<Option<ArtifactId>, FusionError> {
            if name.is_empty() {
                return Ok(None);
            }
            ArtifactId::parse(name)
                .map(Some)
                .map_err(|error| FusionError::malformed(id, error.to_string()))
        };

        let price_id = parse(price.as_str())?
            .filter(|candidate| {
                candidate.kind() == ArtifactKind::Price
                    && candidate.scope().instrument() == Some(&self.instrument)
            })
            .ok_or_else(|| {
                FusionError::malformed(
                    id,
                    format!("price source '{price}' is not a price artifact for {}", self.instrument),
                )
            })?;

        Ok(FusionResult {
            generated_at: self.generated_at,
            instrument: self.instrument.clone(),
            last_close: self.last_close,
            momentum_reference: self.momentum_reference,
            momentum: self.fx_momentum,
            event_risk: self.event_risk,
            sentiment_score: self.news_score,
            fusion_score: self.fusion_score,
            verdict: self.verdict,
            provenance: Provenance {
                price: price_id,
                calendar: parse(calendar.as_str())?,
                sentiment: parse(sentiment.as_str())?,
            },
        })
    }

    /// Recompute the digest from the payload fields and compare it with the
    /// embedded one.
    pub fn verify(&self, id: &ArtifactId) -> Result<bool, FusionError> {
        let result = self.to_result(id)?;
        Ok(content_digest(&result)? == self.content_digest)
    }
}

/// Canonical serialization of the digested payload: compact JSON, fixed key
/// order, `content_digest` excluded.
pub fn canonical_payload(result: &FusionResult) -> Result<String, serde_json::Error> {
    let generated_at = serde_json::to_string(&result.generated_at)?;
    let instrument = serde_json::to_string(&result.instrument)?;
    let last_close = serde_json::to_string(&result.last_close)?;
    let momentum_reference = serde_json::to_string(&result.momentum_reference)?;
    let news_score = serde_json::to_string(&result.sentiment_score)?;
    let fusion_score = serde_json::to_string(&result.fusion_score)?;
    let verdict = serde_json::to_string(&result.verdict)?;
    let source_files = serde_json::to_string(&result.provenance.source_files())?;

    Ok(format!(
        "{{\"generated_at\":{generated_at},\"instrument\":{instrument},\"last_close\":{last_close},\"momentum_reference\":{momentum_reference},\"fx_momentum\":{},\"event_risk\":{},\"news_score\":{news_score},\"fusion_score\":{fusion_score},\"verdict\":{verdict},\"source_files\":{source_files}}}",
        result.momentum.value(),
        result.event_risk.value(),
    ))
}

/// Hex SHA-256 of [`canonical_payload`].
pub fn content_digest(result: &FusionResult) -> Result<String, serde_json::Error> {
    Ok(sha256_hex(canonical_payload(result)?.as_bytes()))
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Location and raw-file digest of a persisted fusion artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenArtifact {
    pub id: ArtifactId,
    pub path: PathBuf,
    /// SHA-256 of the file bytes, as printed by the ingestion scripts.
    pub file_sha256: String,
}

/// Write-once persistence of fusion results.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Persist `result` as `FUSION_<INSTRUMENT>_<ts>.yaml`.
    ///
    /// The file is staged next to its destination and moved into place only
    /// if no file with that name exists. An existing file with identical bytes
    /// is accepted; any other existing file is a
    /// [`FusionError::WriteConflict`] and is left untouched.
    pub fn write(&self, result: &FusionResult) -> Result<WrittenArtifact, FusionError> {
        let id = ArtifactId::new(
            ArtifactKind::Fusion,
            Scope::Instrument(result.instrument.clone()),
            result.generated_at,
        );
        let document = FusionDocument::from_result(result)?;
        let raw = serde_yaml::to_string(&document)?;
        let path = self.output_dir.join(id.file_name());

        fs::create_dir_all(&self.output_dir)?;
        let mut staged = NamedTempFile::new_in(&self.output_dir)?;
        staged.write_all(raw.as_bytes())?;
        staged.as_file().sync_all()?;

        if let Err(error) = staged.persist_noclobber(&path) {
            if error.error.kind() != ErrorKind::AlreadyExists {
                return Err(error.error.into());
            }
            let existing = fs::read(&path)?;
            if existing != raw.as_bytes() {
                return Err(FusionError::WriteConflict { identifier: id });
            }
        }

        let file_sha256 = sha256_hex(raw.as_bytes());
        info!(
            artifact = %id,
            verdict = %result.verdict,
            fusion_score = result.fusion_score,
            sha256 = %file_sha256,
            "fusion artifact written"
        );

        Ok(WrittenArtifact {
            id,
            path,
            file_sha256,
        })
    }
}

/// Read a fusion artifact back.
pub fn load_fusion(artifact: &ArtifactRef) -> Result<FusionDocument, FusionError> {
    let raw = fs::read_to_string(&artifact.path)
        .map_err(|error| FusionError::malformed(&artifact.id, error.to_string()))?;
    serde_yaml::from_str(&raw).map_err(|error| FusionError::malformed(&artifact.id, error.to_string()))
}
