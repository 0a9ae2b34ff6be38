// Shared fixtures for the behavior tests
use std::fs;
use std::path::Path;

pub use umbra_core::{Instrument, UtcDateTime};

/// Write `<name>.yaml` under `dir`, creating the directory as needed.
pub fn write_artifact(dir: &Path, name: &str, body: &str) {
    fs::create_dir_all(dir).expect("create artifact dir");
    fs::write(dir.join(format!("{name}.yaml")), body).expect("write artifact");
}

pub fn instrument(code: &str) -> Instrument {
    Instrument::parse(code).expect("valid instrument")
}

pub fn utc(value: &str) -> UtcDateTime {
    UtcDateTime::parse(value).expect("valid timestamp")
}
