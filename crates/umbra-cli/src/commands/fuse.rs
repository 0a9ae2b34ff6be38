use std::path::Path;

use umbra_core::{FusionConfig, FusionEngine, Instrument, InstrumentsFile, RunReport, UtcDateTime};

use crate::cli::FuseArgs;
use crate::error::CliError;

use super::{CommandResult, Table};

const DEFAULT_INSTRUMENTS_FILE: &str = "configs/pairs.yaml";

pub fn run(args: &FuseArgs) -> Result<CommandResult, CliError> {
    let config = build_config(args)?;
    let now = match args.now.as_deref() {
        Some(value) => UtcDateTime::parse(value)?,
        None => UtcDateTime::now(),
    };

    let engine = FusionEngine::new(config)?;
    let report = engine.run(now)?;

    let table = report_table(&report);
    let warnings = report.warnings();
    let failures = report.skipped.len();

    Ok(CommandResult::ok("fuse", serde_json::to_value(&report)?)
        .with_warnings(warnings)
        .with_failures(failures)
        .with_table(table))
}

/// Defaults, then the instruments file, then flags.
fn build_config(args: &FuseArgs) -> Result<FusionConfig, CliError> {
    let mut config = FusionConfig::default();

    match &args.config {
        Some(path) => config.apply_file(InstrumentsFile::load(path)?)?,
        None if Path::new(DEFAULT_INSTRUMENTS_FILE).is_file() => {
            config.apply_file(InstrumentsFile::load(DEFAULT_INSTRUMENTS_FILE)?)?
        }
        None => {}
    }

    if !args.pairs.is_empty() {
        let instruments = args
            .pairs
            .iter()
            .map(|pair| Instrument::parse(pair))
            .collect::<Result<Vec<_>, _>>()?;
        config.set_instruments(instruments);
    }

    if let Some(dir) = &args.artifacts {
        config.artifact_root = dir.clone();
        config.output_dir = dir.clone();
    }
    if let Some(dir) = &args.out {
        config.output_dir = dir.clone();
    }
    if let Some(window) = args.window {
        config.momentum_window = window;
    }
    if let Some(hours) = args.horizon_hours {
        config.set_event_horizon_hours(hours)?;
    }

    config.validate()?;
    Ok(config)
}

fn report_table(report: &RunReport) -> Table {
    let mut rows: Vec<Vec<String>> = report
        .fused
        .iter()
        .map(|record| {
            vec![
                record.result.instrument.to_string(),
                record.result.verdict.to_string(),
                format!("{:.4}", record.result.fusion_score),
                record.result.momentum.to_string(),
                record.result.event_risk.value().to_string(),
                format!("{:.4}", record.result.sentiment_score),
                record.artifact.id.to_string(),
            ]
        })
        .collect();

    rows.extend(report.skipped.iter().map(|record| {
        vec![
            record.instrument.to_string(),
            String::from("SKIPPED"),
            String::from("-"),
            String::from("-"),
            String::from("-"),
            String::from("-"),
            record.reason.to_string(),
        ]
    }));

    Table {
        headers: vec![
            "instrument",
            "verdict",
            "score",
            "momentum",
            "event_risk",
            "sentiment",
            "artifact",
        ],
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn flags_override_instruments_file() {
        let temp = tempdir().expect("tempdir");
        let file = temp.path().join("pairs.yaml");
        std::fs::write(&file, "pairs: [EURUSD, GBPUSD]\nmomentum_window: 10\n").expect("write");

        let args = FuseArgs {
            config: Some(file),
            pairs: vec![String::from("usdjpy")],
            artifacts: Some(temp.path().join("pool")),
            window: Some(20),
            horizon_hours: Some(2),
            ..FuseArgs::default()
        };
        let config = build_config(&args).expect("config");

        let codes: Vec<&str> = config.instruments.iter().map(Instrument::as_str).collect();
        assert_eq!(codes, vec!["USDJPY"]);
        assert_eq!(config.momentum_window, 20);
        assert_eq!(config.artifact_root, temp.path().join("pool"));
        assert_eq!(config.output_dir, temp.path().join("pool"));
    }

    #[test]
    fn invalid_pair_is_a_validation_error() {
        let args = FuseArgs {
            pairs: vec![String::from("EUR_USD")],
            ..FuseArgs::default()
        };
        let err = build_config(&args).expect_err("must fail");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn non_positive_horizon_is_rejected() {
        let args = FuseArgs {
            pairs: vec![String::from("EURUSD")],
            horizon_hours: Some(0),
            ..FuseArgs::default()
        };
        let err = build_config(&args).expect_err("must fail");
        assert_eq!(err.exit_code(), 2);
    }
}
