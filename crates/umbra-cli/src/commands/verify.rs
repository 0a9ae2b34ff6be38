use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;
use umbra_core::artifact::load_fusion;
use umbra_core::{ArtifactId, ArtifactIndex, ArtifactKind, ArtifactRef, FusionConfig};

use crate::cli::VerifyArgs;
use crate::error::CliError;

use super::{CommandResult, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum VerifyStatus {
    Ok,
    Mismatch,
    Malformed,
}

impl VerifyStatus {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Mismatch => "mismatch",
            Self::Malformed => "malformed",
        }
    }
}

#[derive(Debug, Serialize)]
struct VerifiedArtifact {
    identifier: ArtifactId,
    path: String,
    status: VerifyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

#[derive(Debug, Serialize)]
struct VerifyResponseData {
    target: String,
    checked: usize,
    failed: usize,
    artifacts: Vec<VerifiedArtifact>,
}

pub fn run(args: &VerifyArgs) -> Result<CommandResult, CliError> {
    let target = args
        .path
        .clone()
        .unwrap_or_else(|| FusionConfig::default().output_dir);
    let artifacts = collect_fusion_artifacts(&target)?;

    let verified: Vec<VerifiedArtifact> = artifacts.iter().map(verify_one).collect();
    let failed = verified
        .iter()
        .filter(|artifact| artifact.status != VerifyStatus::Ok)
        .count();

    let warnings: Vec<String> = verified
        .iter()
        .filter(|artifact| artifact.status != VerifyStatus::Ok)
        .map(|artifact| {
            format!(
                "{} {}: {}",
                artifact.identifier,
                artifact.status.as_str(),
                artifact.detail.as_deref().unwrap_or("content digest differs")
            )
        })
        .collect();

    let table = Table {
        headers: vec!["identifier", "status", "path"],
        rows: verified
            .iter()
            .map(|artifact| {
                vec![
                    artifact.identifier.to_string(),
                    artifact.status.as_str().to_owned(),
                    artifact.path.clone(),
                ]
            })
            .collect(),
    };

    let data = VerifyResponseData {
        target: target.display().to_string(),
        checked: verified.len(),
        failed,
        artifacts: verified,
    };

    let mut result = CommandResult::ok("verify", serde_json::to_value(data)?)
        .with_warnings(warnings)
        .with_failures(failed)
        .with_table(table);
    if artifacts.is_empty() {
        result = result.with_warning(format!(
            "no fusion artifacts found under {}",
            target.display()
        ));
    }

    Ok(result)
}

fn verify_one(artifact: &ArtifactRef) -> VerifiedArtifact {
    let outcome = load_fusion(artifact).and_then(|document| document.verify(&artifact.id));
    let (status, detail) = match outcome {
        Ok(true) => (VerifyStatus::Ok, None),
        Ok(false) => (VerifyStatus::Mismatch, None),
        Err(error) => (VerifyStatus::Malformed, Some(error.to_string())),
    };
    if status != VerifyStatus::Ok {
        warn!(artifact = %artifact.id, status = status.as_str(), "fusion artifact failed verification");
    }

    VerifiedArtifact {
        identifier: artifact.id.clone(),
        path: artifact.path.display().to_string(),
        status,
        detail,
    }
}

/// A single file must be named as a fusion artifact; a directory is scanned
/// recursively.
fn collect_fusion_artifacts(target: &Path) -> Result<Vec<ArtifactRef>, CliError> {
    if target.is_file() {
        let stem = target
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| CliError::Command(format!("unreadable file name: {}", target.display())))?;
        let id = ArtifactId::parse(stem)?;
        if id.kind() != ArtifactKind::Fusion {
            return Err(CliError::Command(format!(
                "{id} is a {} artifact, expected FUSION",
                id.kind()
            )));
        }
        return Ok(vec![ArtifactRef {
            id,
            path: PathBuf::from(target),
            modified: None,
        }]);
    }

    let index = ArtifactIndex::scan(target)?;
    let mut artifacts: Vec<ArtifactRef> = index.of_kind(ArtifactKind::Fusion).cloned().collect();
    artifacts.sort_by(|left, right| left.path.cmp(&right.path));
    Ok(artifacts)
}
