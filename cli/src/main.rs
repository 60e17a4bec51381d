//! CLI entrypoint for quota-gate
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use quota_gate_infrastructure::{ConfigLoader, FileConfig};
use quota_gate_presentation::{Cli, Command, OutputConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// File name prefix of the rolling diagnostic log
const LOG_FILE_PREFIX: &str = "quota-gate.log";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };
    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
    }

    let log_dir = cli
        .log_dir
        .clone()
        .or_else(|| config.logging.log_dir.as_ref().map(PathBuf::from));
    // Flushes the file writer on drop
    let _guard = init_logging(cli.verbose, log_dir);

    info!("Starting quota-gate");
    config.validate()?;

    let no_color = std::env::var("NO_COLOR").ok();
    let output = OutputConfig::resolve(
        cli.format,
        config.output.format,
        config.output.color_enabled(no_color.as_deref()),
        cli.quiet || !config.output.progress,
    );
    output.apply();

    dispatch(cli.command, &config, &output).await
}

async fn dispatch(command: Command, config: &FileConfig, output: &OutputConfig) -> Result<ExitCode> {
    match command {
        Command::Validate { quota } => commands::validate(&quota, output),
        Command::Screening { quota, categories } => {
            commands::screening(&quota, categories.as_deref(), output)
        }
        Command::Convert {
            quota,
            dimension,
            to,
            output: target,
        } => commands::convert(&quota, dimension.into(), to.into(), target.as_deref(), output),
        Command::VendorCheck { criteria } => commands::vendor_check(&criteria, output),
        Command::Take {
            share_token,
            auto_restart,
            event_log,
        } => commands::take(config, output, share_token, auto_restart, event_log).await,
        Command::Publish {
            survey_id,
            quota,
            categories,
            vendor,
        } => {
            commands::publish(
                config,
                output,
                survey_id,
                &quota,
                categories.as_deref(),
                vendor.as_deref(),
            )
            .await
        }
        Command::LastPublished { peek } => commands::last_published(config, output, peek),
        Command::ShowConfig => commands::show_config(config),
    }
}

/// Initialize logging based on verbosity level.
///
/// Logs go to stderr; with a log directory they are also written to a
/// daily rolling file.
fn init_logging(verbose: u8, log_dir: Option<PathBuf>) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };
    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}
