//! Gono
//!
//! Terminal manager for Markdown note vaults.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use gono::config::{default_config_path, Config};
use gono::{logging, picker, TuiApp};
use vault_core::{FilesystemGateway, Session, VaultRegistry};

/// Gono - keyboard-driven manager for Markdown note vaults.
#[derive(Parser, Debug)]
#[command(name = "gono")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let mut config = Config::load(&config_path)?;
    config.apply_env_overrides();
    config.validate().context("Invalid configuration")?;

    // Held until exit so buffered log lines are flushed.
    let _log_guard = logging::init(&config.logging, cli.verbose)?;
    tracing::info!("Configuration loaded from {:?}", config_path);
    tracing::debug!("Effective configuration: {:?}", config);

    let session = Session::new(
        VaultRegistry::new(&config.storage.registry_path),
        FilesystemGateway::new().include_hidden(config.browser.show_hidden),
        picker::detect(),
        config.storage.vault_root.clone(),
    );

    let mut tui = TuiApp::new(session).context("Failed to initialize terminal")?;
    let result = tui.run();
    tui.restore().context("Failed to restore terminal")?;
    result.context("Terminal UI failed")
}
