//! CLI definitions for tally
//!
//! Kept out of main.rs so xtask can render man pages and COMMANDS.md from
//! the same definitions.

use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;

use crate::archive::ArchiveRetention;

/// Version shown by `--version`; dev builds carry the commit hash.
#[cfg(not(feature = "release"))]
pub const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_SHA"),
    ")"
);

#[cfg(feature = "release")]
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Green headers and literals, red errors.
pub fn build_cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::White.on_default())
        .valid(AnsiColor::White.on_default())
        .invalid(AnsiColor::Red.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
}

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Aggregate test-run events into snapshots, archives and trends")]
#[command(
    long_about = "tally - test-run report aggregation.

tally reads the lifecycle events of a test run (setup, call and teardown
reports, one JSON object per line), folds reruns of flaky tests, groups
outcomes by suite and writes the run snapshot to output.json. The previous
snapshot is moved to archive/ and old archives are trimmed to the configured
retention.

QUICK START:
    tally ingest events.ndjson           Aggregate a run into ./output.json
    tally status                         Show the latest run
    tally trend                          Pass/fail/skip over recent runs
    tally history                        List current and archived builds

Configuration lives in ~/.config/tally/config.toml."
)]
#[command(version = VERSION)]
#[command(styles = build_cli_styles())]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Use this configuration file instead of ~/.config/tally/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Report location flags shared by every command that reads a report.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Report file (*.html) or directory; overrides report.output
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate a run from an event log
    #[command(long_about = "Aggregate a test run from an NDJSON event log.

Each line is one phase report:
    {\"test_id\":\"tests/test_a.py::test_x\",\"phase\":\"call\",\"outcome\":\"failed\"}

Optional fields: expected_failure, duration, longrepr. A test completes on
its teardown report. The snapshot is written to <output>/output.json after
the previous one is archived.

EXIT STATUS:
    0    the run passed
    1    the run failed (any FAIL or ERROR outcome)
    2    the events could not be aggregated

EXAMPLES:
    tally ingest events.ndjson
    pytest-events | tally ingest -
    tally ingest events.ndjson --max-rerun 2 --archive-count 10")]
    Ingest(IngestArgs),

    /// Show the latest run snapshot
    #[command(long_about = "Show the latest run snapshot and archive usage.

EXAMPLE:
    tally status

OUTPUT:
    Latest run: FAIL (October 18, 2026)
       Tests: 5 (pass 2, fail 1, skip 1, error 1, xpass 0, xfail 0)
       Reruns: 0
    Archive: 3 snapshots, 12.4 KiB")]
    Status {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show pass/fail/skip counts of recent runs
    Trend {
        #[command(flatten)]
        output: OutputArgs,

        /// Print the points as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the current and archived builds
    History {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct IngestArgs {
    /// Event log to read, or '-' for stdin
    #[arg(default_value = "-", value_name = "EVENTS")]
    pub events: String,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Runs to keep: '' keeps all, 0 disables archiving; overrides report.archive_count
    #[arg(long, value_name = "N")]
    pub archive_count: Option<ArchiveRetention>,

    /// Fold reruns of failing tests, up to N reruns each
    #[arg(long, value_name = "N", conflicts_with = "no_rerun")]
    pub max_rerun: Option<u32>,

    /// Treat every execution as its own outcome
    #[arg(long)]
    pub no_rerun: bool,

    /// Session start as Unix seconds (defaults to now)
    #[arg(long, value_name = "EPOCH")]
    pub start_time: Option<f64>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
}
