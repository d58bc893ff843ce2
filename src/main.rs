use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use dashmigrate::app::App;
use dashmigrate::config::Config;
use dashmigrate::logging;
use dashmigrate::steps::{Sequencer, StepId};
use dashmigrate::store::Store;
use dashmigrate::types::TARGET_PLATFORM;
use dashmigrate::Wizard;

#[derive(Parser)]
#[command(name = "dashmigrate")]
#[command(about = "Guided wizard for migrating BI dashboards to Power BI")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current step and which steps are complete
    Status,

    /// Erase all progress and saved results
    Reset,

    /// Write the default configuration as TOML
    InitConfig {
        /// Destination file
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    let is_tui_mode = cli.command.is_none();
    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    match cli.command {
        Some(Commands::Status) => cmd_status(&config)?,
        Some(Commands::Reset) => cmd_reset(&config)?,
        Some(Commands::InitConfig { path }) => cmd_init_config(&path)?,
        None => run_tui(config, logging_handle.log_file_path).await?,
    }

    Ok(())
}

async fn run_tui(config: Config, log_file_path: Option<PathBuf>) -> Result<()> {
    let mut app = App::new(config)?;
    let result = app.run().await;

    // Print log file path on exit if logs were written
    if let Some(log_path) = log_file_path {
        if let Ok(metadata) = log_path.metadata() {
            if metadata.len() > 0 {
                eprintln!("Session log: {}", log_path.display());
            }
        }
    }

    result
}

fn cmd_status(config: &Config) -> Result<()> {
    let wizard = Wizard::from_config(config)?;
    let current = wizard.current_step();
    let platform = wizard.platform().context("Failed to read platform selection")?;
    let progress = wizard.sequencer().progress();

    println!(
        "Migration: {} → {TARGET_PLATFORM}",
        platform.origin_or_default()
    );
    println!("Current step: {}. {}", current.index() + 1, current.name());
    println!("{}", "─".repeat(40));
    for step in StepId::NAMED {
        let marker = if progress.is_complete(step) { "✅" } else { "⬜" };
        println!("{marker} {}. {}", step.index() + 1, step.name());
    }
    println!(
        "{}/{} steps complete",
        progress.completed_count(),
        StepId::NAMED.len()
    );
    Ok(())
}

/// Rewrites the slots without reading them, so unreadable files are no obstacle
fn cmd_reset(config: &Config) -> Result<()> {
    let store = Store::open(config.data_path()).context("Failed to open data directory")?;
    Sequencer::reset_store(&store).context("Failed to reset wizard state")?;
    println!("All progress cleared in {}", config.data_path().display());
    Ok(())
}

fn cmd_init_config(path: &std::path::Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    Config::default().save_to(path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
