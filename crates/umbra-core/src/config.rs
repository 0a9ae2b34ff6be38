//! Run configuration.
//!
//! Defaults resolve the artifact pool from `UMBRA_HOME` (falling back to
//! `./output`); an instruments file (`configs/pairs.yaml`) supplies the ordered
//! instrument list and may override the tuning knobs.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use time::Duration;

use crate::signals::{DEFAULT_HORIZON_HOURS, DEFAULT_WINDOW};
use crate::{FusionError, Instrument, Resolution, ValidationError};

const SECONDS_PER_HOUR: i64 = 3_600;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FusionConfig {
    /// Pool searched (recursively) for input artifacts.
    pub artifact_root: PathBuf,
    /// Directory receiving fusion artifacts.
    pub output_dir: PathBuf,
    /// Instruments in processing order.
    pub instruments: Vec<Instrument>,
    pub momentum_window: usize,
    /// Candle resolution price artifacts are expected to carry.
    pub resolution: Resolution,
    pub event_horizon: Duration,
}

impl Default for FusionConfig {
    fn default() -> Self {
        let home = resolve_umbra_home();
        Self {
            artifact_root: home.clone(),
            output_dir: home,
            instruments: Vec::new(),
            momentum_window: DEFAULT_WINDOW,
            resolution: Resolution::default(),
            event_horizon: Duration::hours(DEFAULT_HORIZON_HOURS),
        }
    }
}

impl FusionConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.instruments.is_empty() {
            return Err(ValidationError::EmptyInstrumentList);
        }
        if self.momentum_window == 0 {
            return Err(ValidationError::InvalidWindow);
        }
        if !self.event_horizon.is_positive() {
            return Err(ValidationError::InvalidHorizon);
        }
        Ok(())
    }

    /// Replace the instrument list, dropping repeats but keeping first-seen
    /// order.
    pub fn set_instruments(&mut self, instruments: impl IntoIterator<Item = Instrument>) {
        self.instruments.clear();
        for instrument in instruments {
            if !self.instruments.contains(&instrument) {
                self.instruments.push(instrument);
            }
        }
    }

    pub fn apply_file(&mut self, file: InstrumentsFile) -> Result<(), ValidationError> {
        self.set_instruments(file.pairs);
        if let Some(window) = file.momentum_window {
            self.momentum_window = window;
        }
        if let Some(resolution) = file.resolution {
            self.resolution = resolution;
        }
        if let Some(hours) = file.event_horizon_hours {
            self.set_event_horizon_hours(hours)?;
        }
        Ok(())
    }

    pub fn set_event_horizon_hours(&mut self, hours: i64) -> Result<(), ValidationError> {
        if hours <= 0 {
            return Err(ValidationError::InvalidHorizon);
        }
        self.event_horizon = hours
            .checked_mul(SECONDS_PER_HOUR)
            .map(Duration::seconds)
            .ok_or(ValidationError::InvalidHorizon)?;
        Ok(())
    }
}

/// Instruments file, e.g.
///
/// ```yaml
/// pairs: [EURUSD, GBPUSD]
/// momentum_window: 40
/// resolution: 15m
/// event_horizon_hours: 4
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InstrumentsFile {
    pub pairs: Vec<Instrument>,
    #[serde(default)]
    pub momentum_window: Option<usize>,
    #[serde(default)]
    pub resolution: Option<Resolution>,
    #[serde(default)]
    pub event_horizon_hours: Option<i64>,
}

impl InstrumentsFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FusionError> {
        let raw = fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, FusionError> {
        Ok(serde_yaml::from_str(raw)?)
    }
}

fn resolve_umbra_home() -> PathBuf {
    if let Some(path) = env::var_os("UMBRA_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    PathBuf::from("output")
}
