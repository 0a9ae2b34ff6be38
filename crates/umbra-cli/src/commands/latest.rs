use std::str::FromStr;

use serde::Serialize;
use umbra_core::{
    ArtifactIndex, ArtifactKind, ArtifactSelector, FusionConfig, Instrument, Scope, UtcDateTime,
};

use crate::cli::LatestArgs;
use crate::error::CliError;

use super::{CommandResult, Table};

#[derive(Debug, Serialize)]
struct LatestResponseData {
    kind: ArtifactKind,
    scope: Scope,
    artifact_root: String,
    found: bool,
    identifier: Option<String>,
    created_at: Option<UtcDateTime>,
    path: Option<String>,
}

pub fn run(args: &LatestArgs) -> Result<CommandResult, CliError> {
    let kind = ArtifactKind::from_str(&args.kind)?;
    let instrument = args
        .instrument
        .as_deref()
        .map(Instrument::parse)
        .transpose()?;
    let selector = ArtifactSelector::for_kind(kind, instrument.as_ref())?;

    let root = args
        .artifacts
        .clone()
        .unwrap_or_else(|| FusionConfig::default().artifact_root);
    let index = ArtifactIndex::scan(&root)?;
    let latest = index.latest(&selector);

    let data = LatestResponseData {
        kind,
        scope: selector.scope().clone(),
        artifact_root: root.display().to_string(),
        found: latest.is_some(),
        identifier: latest.map(|artifact| artifact.id.to_string()),
        created_at: latest.map(|artifact| artifact.id.created_at()),
        path: latest.map(|artifact| artifact.path.display().to_string()),
    };

    let table = Table {
        headers: vec!["kind", "scope", "identifier", "path"],
        rows: latest
            .map(|artifact| {
                vec![
                    kind.to_string(),
                    selector.scope().to_string(),
                    artifact.id.to_string(),
                    artifact.path.display().to_string(),
                ]
            })
            .into_iter()
            .collect(),
    };

    let mut result = CommandResult::ok("latest", serde_json::to_value(data)?).with_table(table);
    if latest.is_none() {
        result = result.with_warning(format!(
            "no {kind} artifact for scope {} under {}",
            selector.scope(),
            root.display()
        ));
    }
    if index.ignored_files() > 0 {
        result = result.with_warning(format!(
            "{} yaml file(s) with unrecognized names ignored",
            index.ignored_files()
        ));
    }

    Ok(result)
}
