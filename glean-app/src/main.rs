use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use glean_common::observability::{LogConfig, init_logging};
use glean_config::{GleanConfig, GleanConfigLoader};
use glean_runtime::GleanRuntime;

use cli::Cli;
mod cli;
mod session;
mod wiring;

const DEFAULT_CONFIG_FILE: &str = "glean.yaml";

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // 1) Load config (env wins)
    let loader = match &cli.config {
        Some(path) => GleanConfigLoader::new().with_file(path),
        None => GleanConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    let cfg: GleanConfig = loader.load()?;

    init_logging(LogConfig {
        app_name: "glean",
        log_dir: cfg.log.dir.clone(),
        emit_stderr: cfg.log.stderr,
        format: cfg.log.format,
        default_filter: cfg.log.filter.clone(),
    })?;

    GleanRuntime::build("glean")?.run(wiring::dispatch(cli.command, cfg))
}
