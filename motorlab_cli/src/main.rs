//! motorlab binary entry point.

mod cli;
mod commands;
mod recorder;

use std::fs;
use std::path::Path;

use clap::Parser;
use eyre::WrapErr;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();
    let _ = JSON_MODE.set(args.json);

    let cfg = load_config(&args.config)?;
    init_tracing(&args.log_level, args.json, &cfg.logging)?;

    let shutdown = commands::shutdown_flag()?;
    match &args.cmd {
        Commands::Characterize { duties, out } => commands::run_characterize(
            &cfg,
            duties.clone(),
            out,
            args.json,
            args.port.as_deref(),
            &shutdown,
        ),
        Commands::Sweep {
            axis,
            gains,
            gains_csv,
            target,
            out,
        } => commands::run_sweep(
            &cfg,
            *axis,
            gains.clone(),
            gains_csv.as_deref(),
            *target,
            out,
            args.json,
            args.port.as_deref(),
            &shutdown,
        ),
    }
}

/// Load and validate the TOML config. A missing file at the default path is
/// fine — every section has defaults — but an explicit broken file is an
/// error.
fn load_config(path: &Path) -> eyre::Result<motorlab_config::Config> {
    if !path.exists() {
        return Ok(motorlab_config::Config::default());
    }
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = motorlab_config::load_toml(&text)
        .map_err(|e| eyre::eyre!("parse config {}: {}", path.display(), e))?;
    cfg.validate()
        .wrap_err_with(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

fn init_tracing(
    level: &str,
    json: bool,
    logging: &motorlab_config::Logging,
) -> eyre::Result<()> {
    let level = logging.level.as_deref().unwrap_or(level);
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(file) = &logging.file {
        let path = Path::new(file);
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        let name = path.file_name().map(Path::new).unwrap_or(path);
        let rotation = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::Rotation::DAILY,
            Some("hourly") => tracing_appender::rolling::Rotation::HOURLY,
            _ => tracing_appender::rolling::Rotation::NEVER,
        };
        let appender = tracing_appender::rolling::RollingFileAppender::new(
            rotation,
            dir.unwrap_or(Path::new(".")),
            name,
        );
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        if json {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .with_writer(writer)
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .init();
        }
    } else if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}
