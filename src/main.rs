//! tally - CLI entry point

mod commands;

use std::process::ExitCode;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Targets, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use tally::cli::{Cli, Commands, ConfigCommands};
use tally::RunStatus;

/// Exit code for a run that failed.
const EXIT_RUN_FAILED: u8 = 1;
/// Exit code when tally itself could not do its job.
const EXIT_TOOL_ERROR: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Ingest(args) => commands::ingest::handle(&args, config_path).map(|status| {
            match status {
                Some(RunStatus::Fail) => ExitCode::from(EXIT_RUN_FAILED),
                _ => ExitCode::SUCCESS,
            }
        }),
        Commands::Status { output } => {
            commands::status::handle(&output, config_path).map(|()| ExitCode::SUCCESS)
        }
        Commands::Trend { output, json } => {
            commands::trend::handle(&output, json, config_path).map(|()| ExitCode::SUCCESS)
        }
        Commands::History { output } => {
            commands::history::handle(&output, config_path).map(|()| ExitCode::SUCCESS)
        }
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::handle_show(config_path),
            ConfigCommands::Path => commands::config::handle_path(config_path),
        }
        .map(|()| ExitCode::SUCCESS),
        Commands::Completions { shell } => {
            commands::completions::handle::<Cli>(shell).map(|()| ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_TOOL_ERROR)
        }
    }
}

/// Log to stderr. `TALLY_LOG` takes target directives and wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let targets = std::env::var("TALLY_LOG")
        .ok()
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<Targets>().ok())
        .unwrap_or_else(|| Targets::new().with_default(level));

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(targets);

    tracing_subscriber::registry().with(layer).init();
}
