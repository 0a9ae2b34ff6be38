//! CLI argument definitions for Umbra.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `fuse` | Run one fusion pass over the configured instruments |
//! | `latest` | Show the most recent artifact of a kind |
//! | `verify` | Recompute content digests of fusion artifacts |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings as errors |
//! | `--quiet` | `false` | Log warnings and errors only |
//!
//! # Examples
//!
//! ```bash
//! # Fuse every pair listed in configs/pairs.yaml
//! umbra fuse --artifacts output
//!
//! # Replay a run at a fixed instant
//! umbra fuse --pairs EURUSD,GBPUSD --now 2025-07-15T09:00:00Z --pretty
//!
//! # Inspect the pool
//! umbra latest price --instrument EURUSD
//! umbra verify output
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Umbra - signal fusion over file-based artifacts
#[derive(Debug, Parser)]
#[command(
    name = "umbra",
    author,
    version,
    about = "Fuse momentum, event risk and sentiment into trading verdicts",
    long_about = "Umbra reads the price, calendar and sentiment artifacts left by the \
ingestion jobs, derives one signal from each and writes a write-once fusion \
artifact (BUY, SELL or STANDBY) per instrument.\n\
\n\
Use 'umbra <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat skips, degrades and malformed artifacts as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Only log warnings and errors. `RUST_LOG` still takes precedence.
    #[arg(long, short, global = true, default_value_t = false)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for terminal display.
    Table,
    /// Single JSON object output.
    Json,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one fusion pass.
    ///
    /// # Examples
    ///
    ///   umbra fuse
    ///   umbra fuse --pairs EURUSD,USDJPY --window 40
    ///   umbra fuse --artifacts output --out output/fusion --strict
    Fuse(FuseArgs),

    /// Show the most recent artifact of a kind.
    ///
    /// # Examples
    ///
    ///   umbra latest calendar
    ///   umbra latest price --instrument EURUSD
    Latest(LatestArgs),

    /// Recompute and compare the content digest of fusion artifacts.
    ///
    /// # Examples
    ///
    ///   umbra verify
    ///   umbra verify output/FUSION_EURUSD_2025-07-15T09-00-00Z.yaml
    Verify(VerifyArgs),
}

/// Arguments for the `fuse` command.
#[derive(Debug, Default, Args)]
pub struct FuseArgs {
    /// Instruments file (defaults to configs/pairs.yaml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Comma-separated instruments, overriding the instruments file.
    #[arg(long, value_delimiter = ',')]
    pub pairs: Vec<String>,

    /// Artifact pool to read from (defaults to $UMBRA_HOME or ./output).
    #[arg(long)]
    pub artifacts: Option<PathBuf>,

    /// Directory for fusion artifacts (defaults to the artifact pool).
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// EMA window in candles.
    #[arg(long)]
    pub window: Option<usize>,

    /// Event-risk look-ahead in hours.
    #[arg(long)]
    pub horizon_hours: Option<i64>,

    /// Reference instant (RFC3339 UTC); defaults to the current time.
    #[arg(long)]
    pub now: Option<String>,
}

/// Arguments for the `latest` command.
#[derive(Debug, Args)]
pub struct LatestArgs {
    /// Artifact kind: price, calendar, sentiment or fusion.
    pub kind: String,

    /// Instrument, required for price and fusion.
    #[arg(long)]
    pub instrument: Option<String>,

    /// Artifact pool to search.
    #[arg(long)]
    pub artifacts: Option<PathBuf>,
}

/// Arguments for the `verify` command.
#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// A fusion artifact, or a directory searched recursively.
    pub path: Option<PathBuf>,
}
