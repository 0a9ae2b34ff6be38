//! Behavior-driven tests for a fusion run
//!
//! These tests verify HOW a run turns the artifact pool into verdicts, and
//! how it degrades or skips when inputs are missing or broken.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::{tempdir, TempDir};
use umbra_tests::{instrument, utc, write_artifact};
use umbra_core::artifact::load_fusion;
use umbra_core::{
    ArtifactIndex, ArtifactKind, DegradeReason, EventRisk, FusionConfig, FusionEngine,
    Instrument, MomentumSignal, RunReport, SkipReason, UtcDateTime, Verdict,
};

const NOW: &str = "2025-07-15T09:00:00Z";

struct Pool {
    temp: TempDir,
}

impl Pool {
    fn new() -> Self {
        Self {
            temp: tempdir().expect("tempdir"),
        }
    }

    fn root(&self) -> PathBuf {
        self.temp.path().join("pool")
    }

    fn out(&self) -> PathBuf {
        self.temp.path().join("fusion")
    }

    fn write(&self, name: &str, body: &str) {
        write_artifact(&self.root(), name, body);
    }

    /// Flat closes followed by a jump, so the last close sits above the EMA.
    fn rising(&self, pair: &str) {
        self.write(
            &format!("PRICE_{pair}_2025-07-15T08-59-00Z"),
            &price_body(pair, &["1.1000", "1.1000", "1.1000", "1.1050"]),
        );
    }

    /// Flat closes followed by a drop, so the last close sits below the EMA.
    fn falling(&self, pair: &str) {
        self.write(
            &format!("PRICE_{pair}_2025-07-15T08-59-00Z"),
            &price_body(pair, &["1.1000", "1.1000", "1.1000", "1.0950"]),
        );
    }

    fn calendar(&self, events: &[(&str, &str)]) {
        let mut body = String::from("source: ForexFactory RSS\nevents:\n");
        for (impact, at) in events {
            body.push_str(&format!(
                "  - title: CPI y/y\n    ccy: USD\n    impact: {impact}\n    timestamp_utc: \"{at}\"\n"
            ));
        }
        if events.is_empty() {
            body = String::from("events: []\n");
        }
        self.write("CALENDAR_GLOBAL_2025-07-15T08-00-00Z", &body);
    }

    fn sentiment(&self, average: f64) {
        self.write(
            "SENTIMENT_GLOBAL_2025-07-15T08-00-00Z",
            &format!("headline_count: 10\naverage_score: {average}\n"),
        );
    }

    fn engine(&self, pairs: &[&str]) -> FusionEngine {
        let mut config = FusionConfig {
            artifact_root: self.root(),
            output_dir: self.out(),
            momentum_window: 3,
            ..FusionConfig::default()
        };
        config.set_instruments(
            pairs
                .iter()
                .map(|pair| instrument(pair)),
        );
        FusionEngine::new(config).expect("valid config")
    }

    fn run(&self, pairs: &[&str]) -> RunReport {
        self.engine(pairs).run(now()).expect("run")
    }
}

fn price_body(pair: &str, closes: &[&str]) -> String {
    let mut body = format!("instrument: {pair}\nresolution: 15m\nrows:\n");
    for (offset, close) in closes.iter().enumerate() {
        body.push_str(&format!(
            "  - datetime: \"2025-07-15T08:{:02}:00Z\"\n    close: {close}\n",
            offset * 15
        ));
    }
    body
}

fn now() -> UtcDateTime {
    utc(NOW)
}

fn eurusd() -> Instrument {
    instrument("EURUSD")
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

// =============================================================================
// Fusion Run: Verdicts
// =============================================================================

#[test]
fn when_an_imminent_high_event_offsets_upward_momentum_the_verdict_is_standby() {
    // Given: Rising EURUSD, a High event in two hours and mildly positive news
    let pool = Pool::new();
    pool.rising("EURUSD");
    pool.calendar(&[("High", "2025-07-15T11:00:00+00:00")]);
    pool.sentiment(0.2);

    // When: The run fuses EURUSD
    let report = pool.run(&["EURUSD"]);

    // Then: 1 - 1 + 0.2 stays inside the neutral band
    assert!(report.is_clean(), "{:?}", report.warnings());
    let record = &report.fused[0];
    assert_eq!(record.result.momentum, MomentumSignal::Up);
    assert_eq!(record.result.event_risk, EventRisk::Elevated);
    assert_close(record.result.fusion_score, 0.2);
    assert_eq!(record.result.verdict, Verdict::Standby);
    assert_close(record.result.last_close, 1.105);
}

#[test]
fn when_momentum_is_up_and_nothing_else_moves_the_verdict_is_buy() {
    // Given: Rising EURUSD, only distant or minor events, neutral news
    let pool = Pool::new();
    pool.rising("EURUSD");
    pool.calendar(&[
        ("Low", "2025-07-15T10:00:00+00:00"),
        ("High", "2025-07-15T14:00:00+00:00"),
        ("High", "2025-07-15T08:30:00+00:00"),
    ]);
    pool.sentiment(0.0);

    // When: The run fuses EURUSD
    let report = pool.run(&["EURUSD"]);

    // Then: Momentum alone reaches the BUY threshold
    assert_eq!(report.event_risk, EventRisk::Clear);
    assert_close(report.fused[0].result.fusion_score, 1.0);
    assert_eq!(report.verdict_of(&eurusd()), Some(Verdict::Buy));
}

#[test]
fn when_momentum_is_down_and_news_is_negative_the_verdict_is_sell() {
    // Given: Falling EURUSD, an empty calendar and slightly negative news
    let pool = Pool::new();
    pool.falling("EURUSD");
    pool.calendar(&[]);
    pool.sentiment(-0.1);

    // When: The run fuses EURUSD
    let report = pool.run(&["EURUSD"]);

    // Then: -1 - 0 - 0.1 crosses the SELL threshold
    let record = &report.fused[0];
    assert_eq!(record.result.momentum, MomentumSignal::Down);
    assert_close(record.result.fusion_score, -1.1);
    assert_eq!(record.result.verdict, Verdict::Sell);
}

#[test]
fn when_calendar_and_sentiment_are_missing_the_score_is_momentum_alone() {
    // Given: Only a price artifact
    let pool = Pool::new();
    pool.falling("EURUSD");

    // When: The run fuses EURUSD
    let report = pool.run(&["EURUSD"]);

    // Then: Both global inputs degrade and provenance records their absence
    assert_eq!(report.degraded.len(), 2);
    assert!(report
        .degraded
        .iter()
        .all(|record| record.reason == DegradeReason::Missing));
    assert_eq!(report.fused.len(), 1);
    assert_close(report.fused[0].result.fusion_score, -1.0);
    assert_eq!(report.fused[0].result.verdict, Verdict::Sell);

    let index = ArtifactIndex::scan(pool.out()).expect("scan output");
    let written = index
        .of_kind(ArtifactKind::Fusion)
        .next()
        .expect("fusion artifact");
    let document = load_fusion(written).expect("load");
    assert_eq!(
        document.source_files,
        vec![
            String::from("PRICE_EURUSD_2025-07-15T08-59-00Z"),
            String::new(),
            String::new(),
        ]
    );
}

// =============================================================================
// Fusion Run: Skips and Degrades
// =============================================================================

#[test]
fn when_one_instrument_fails_the_others_are_still_fused() {
    // Given: One healthy pair, one without prices, one with a single close
    // and one with an unreadable price file
    let pool = Pool::new();
    pool.rising("EURUSD");
    pool.write(
        "PRICE_USDJPY_2025-07-15T08-59-00Z",
        &price_body("USDJPY", &["157.10", "null", "n/a"]),
    );
    pool.write("PRICE_USDCHF_2025-07-15T08-59-00Z", "rows: [unterminated\n");
    pool.calendar(&[]);
    pool.sentiment(0.0);

    // When: All four pairs are fused
    let report = pool.run(&["EURUSD", "GBPUSD", "USDJPY", "USDCHF"]);

    // Then: EURUSD is written and each failure carries its own reason
    assert_eq!(report.fused.len(), 1);
    assert_eq!(report.verdict_of(&eurusd()), Some(Verdict::Buy));

    let reasons: Vec<(&str, &SkipReason)> = report
        .skipped
        .iter()
        .map(|record| (record.instrument.as_str(), &record.reason))
        .collect();
    assert_eq!(reasons.len(), 3);
    assert_eq!(reasons[0], ("GBPUSD", &SkipReason::MissingPrice));
    assert_eq!(reasons[1], ("USDJPY", &SkipReason::InsufficientData { usable: 1 }));
    assert_eq!(reasons[2].0, "USDCHF");
    assert!(matches!(reasons[2].1, SkipReason::MalformedPrice { .. }));

    assert_eq!(report.malformed.len(), 1);
    assert_eq!(
        report.malformed[0].identifier.as_str(),
        "PRICE_USDCHF_2025-07-15T08-59-00Z"
    );
    assert_eq!(report.warnings().len(), 4);
}

#[test]
fn when_only_a_lookalike_instrument_has_prices_the_instrument_is_skipped() {
    // Given: Prices for EURUSDX but not EURUSD
    let pool = Pool::new();
    pool.rising("EURUSDX");
    pool.calendar(&[]);
    pool.sentiment(0.0);

    // When: EURUSD is fused
    let report = pool.run(&["EURUSD"]);

    // Then: No other instrument's data is used
    assert!(report.fused.is_empty());
    assert_eq!(report.skipped[0].reason, SkipReason::MissingPrice);
}

#[test]
fn when_the_latest_calendar_is_malformed_event_risk_degrades_to_zero() {
    // Given: An unparseable calendar event next to a healthy older calendar
    let pool = Pool::new();
    pool.rising("EURUSD");
    pool.write(
        "CALENDAR_GLOBAL_2025-07-14T08-00-00Z",
        "events:\n  - impact: High\n    timestamp_utc: \"2025-07-15T10:00:00Z\"\n",
    );
    pool.write(
        "CALENDAR_GLOBAL_2025-07-15T08-00-00Z",
        "events:\n  - impact: High\n    timestamp_utc: soon\n",
    );
    pool.sentiment(0.0);

    // When: The run fuses EURUSD
    let report = pool.run(&["EURUSD"]);

    // Then: The latest calendar is reported, not silently replaced by an older one
    assert_eq!(report.event_risk, EventRisk::Clear);
    assert_eq!(report.malformed.len(), 1);
    assert_eq!(
        report.degraded[0].reason,
        DegradeReason::Malformed {
            identifier: report.malformed[0].identifier.clone()
        }
    );
    assert_eq!(report.fused[0].result.provenance.calendar, None);
    assert_eq!(report.verdict_of(&eurusd()), Some(Verdict::Buy));
}

#[test]
fn when_the_same_run_is_replayed_the_artifacts_are_unchanged() {
    // Given: A completed run
    let pool = Pool::new();
    pool.rising("EURUSD");
    pool.calendar(&[]);
    pool.sentiment(0.3);
    let first = pool.run(&["EURUSD"]);
    let bytes = fs::read(&first.fused[0].artifact.path).expect("read artifact");

    // When: The run is repeated for the same instant and inputs
    let second = pool.run(&["EURUSD"]);

    // Then: The identical artifact is accepted and nothing is rewritten
    assert!(second.skipped.is_empty());
    assert_eq!(first.fused[0].artifact, second.fused[0].artifact);
    assert_eq!(fs::read(&second.fused[0].artifact.path).expect("read"), bytes);
}

#[test]
fn when_inputs_change_under_the_same_instant_the_existing_artifact_wins() {
    // Given: A completed run
    let pool = Pool::new();
    pool.rising("EURUSD");
    pool.calendar(&[]);
    pool.sentiment(0.3);
    let first = pool.run(&["EURUSD"]);
    let path = first.fused[0].artifact.path.clone();
    let bytes = fs::read(&path).expect("read artifact");

    // When: Sentiment changes and the same instant is replayed
    pool.sentiment(-0.3);
    let second = pool.run(&["EURUSD"]);

    // Then: The write conflicts and the original artifact is untouched
    assert!(second.fused.is_empty());
    assert!(matches!(
        second.skipped[0].reason,
        SkipReason::WriteConflict { .. }
    ));
    assert_eq!(fs::read(&path).expect("read"), bytes);
}

#[test]
fn when_the_pool_is_empty_every_instrument_is_skipped_without_failing_the_run() {
    // Given: No artifacts at all
    let pool = Pool::new();

    // When: Two pairs are fused
    let report = pool.run(&["EURUSD", "GBPUSD"]);

    // Then: The run completes and explains itself
    assert_eq!(report.indexed_artifacts, 0);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.degraded.len(), 2);
    assert!(!Path::new(&pool.out()).exists());
}
