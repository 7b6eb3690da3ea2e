#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

mod cli;
mod error_fmt;
mod replay;

use std::path::Path;

use clap::Parser;
use eyre::WrapErr;
use magcal_config::{Config, Logging};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = try_main(cli) {
        let json = JSON_MODE.get().copied().unwrap_or(false);
        if json {
            eprintln!("{}", error_fmt::format_error_json(&e));
        } else {
            eprintln!("{}", error_fmt::humanize(&e));
        }
        std::process::exit(error_fmt::exit_code_for_error(&e));
    }
}

fn try_main(cli: Cli) -> eyre::Result<()> {
    // Pretty reports for panics; ignore a second install in tests
    let _ = color_eyre::install();

    let cfg = load_config(cli.config.as_deref())?;
    init_tracing(&cli.log_level, cli.json, &cfg.logging)?;
    tracing::debug!(config = ?cfg, "configuration loaded");

    match cli.cmd {
        Commands::Replay { samples, sensor } => {
            replay::run_replay(&cfg, &samples, sensor, cli.json)?;
        }
        Commands::Simulate {
            cycles,
            static_samples,
            dynamic_samples,
            sensor,
            seed,
        } => {
            replay::run_simulate(
                &cfg,
                cycles,
                static_samples,
                dynamic_samples,
                sensor,
                seed,
                cli.json,
            )?;
        }
        Commands::SelfCheck => replay::self_check(&cfg, cli.json)?,
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> eyre::Result<Config> {
    let cfg = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .wrap_err_with(|| format!("read config {}", p.display()))?;
            magcal_config::load_toml(&text)
                .wrap_err_with(|| format!("parse config {}", p.display()))?
        }
        None => Config::default(),
    };
    cfg.validate().wrap_err("invalid configuration")?;
    Ok(cfg)
}

/// Console logs go to stderr so stdout stays reserved for measurements.
/// `logging.file` adds a non-blocking JSON file layer; its guard lives in
/// `FILE_GUARD` until exit.
fn init_tracing(level: &str, json: bool, logging: &Logging) -> eyre::Result<()> {
    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log level {level:?}"))?;

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);
    if json {
        layers.push(console.json().with_filter(console_filter).boxed());
    } else {
        layers.push(console.compact().with_filter(console_filter).boxed());
    }

    if let Some(file) = logging.file.as_deref() {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| eyre::eyre!("logging.file {file:?} has no file name"))?;
        let appender = match logging.rotation.as_deref().unwrap_or("never") {
            "daily" => tracing_appender::rolling::daily(dir, name),
            "hourly" => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);

        let file_filter = EnvFilter::try_new(logging.level.as_deref().unwrap_or("info"))
            .wrap_err("invalid logging.level")?;
        layers.push(
            fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(file_filter)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .wrap_err("install tracing subscriber")?;
    Ok(())
}
