//! rngate: operator tooling for the randomness coordinator.

mod commands;

use anyhow::Context;
use clap::Parser;
use rngate_coordinator::CoordinatorConfig;
use rngate_utils::LogFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rngate", about = "Randomness coordinator operator tooling")]
struct Cli {
    /// Path to a TOML configuration file. Flags and env vars override it.
    #[arg(long, global = true, env = "RNGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level or filter directive: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "RNGATE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "RNGATE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: commands::Command,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config = cli
        .config
        .as_ref()
        .map(|path| {
            CoordinatorConfig::from_toml_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))
        })
        .transpose()?;

    let level = cli
        .log_level
        .clone()
        .or_else(|| file_config.as_ref().map(|c| c.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let format = match cli.log_format {
        Some(format) => format,
        None => file_config
            .as_ref()
            .map(|c| c.log_format.parse::<LogFormat>())
            .transpose()
            .context("invalid log_format in config")?
            .unwrap_or_default(),
    };
    rngate_utils::init_logging(format, &level)?;

    if let Some(path) = &cli.config {
        tracing::info!(path = %path.display(), "loaded config");
    }

    let output = commands::run(cli.command, file_config.as_ref())?;
    println!("{output}");
    Ok(())
}
