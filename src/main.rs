use anyhow::{Context, Result};
use book_harvest::config::{
    find_config_file, get_config, load_config, load_env_file, save_default_config, Config,
    API_KEY_ENV, ENV_PREFIX,
};
use book_harvest::ui::{self, Status};
use book_harvest::Harvester;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Book Harvest - Collect book metadata from the Google Books API into a CSV file
#[derive(Parser, Debug)]
#[command(name = "book-harvest")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Collect book metadata from the Google Books API into a CSV file", long_about = None)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output CSV path (overrides the configured one)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Number of rows to preview after writing (0 to disable)
    #[arg(long, default_value_t = 5)]
    preview: usize,

    /// Write a default configuration file to this path and exit
    #[arg(long, value_name = "PATH")]
    init_config: Option<PathBuf>,

    /// Show all environment variables
    #[arg(long)]
    env: bool,
}

fn print_env_vars() {
    println!("Environment Variables:");
    println!();
    println!("Required:");
    println!("  {:<40} Google Books API key", API_KEY_ENV);
    println!();
    println!("Overrides (take precedence over the config file):");
    println!("  {}_API_KEY", ENV_PREFIX);
    println!("  {}_API_BASE", ENV_PREFIX);
    println!("  {}_PAGE_SIZE                  Results per page (max 40)", ENV_PREFIX);
    println!("  {}_MAX_START_INDEX            Offsets stop below this (default: 500)", ENV_PREFIX);
    println!("  {}_REQUEST_TIMEOUT_SECS       Per-request timeout (default: 15)", ENV_PREFIX);
    println!("  {}_POLITENESS_DELAY_MS        Pause between pages (default: 500)", ENV_PREFIX);
    println!("  {}_OUTPUT_PATH                CSV destination", ENV_PREFIX);
    println!("  {}_RETRY__MAX_ATTEMPTS        Attempts per request (default: 3)", ENV_PREFIX);
    println!("  {}_RETRY__BASE_BACKOFF_SECS   Backoff unit (default: 2)", ENV_PREFIX);
    println!();
    println!("A .env file in the working directory (or a parent) is loaded first;");
    println!("variables already set in the environment take precedence.");
    println!();
    println!("Other Settings:");
    println!("  RUST_LOG                    Rust logging level (e.g., debug, info, warn, error)");
}

fn init_tracing(cli: &Cli) {
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // The progress bar replaces per-page info lines on a terminal
    let env_filter = if cli.quiet {
        "error"
    } else if cli.verbose == 0 && ui::is_terminal() {
        "warn"
    } else {
        log_level
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("book_harvest={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        load_config(config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?
    } else if let Some(config_path) = find_config_file() {
        tracing::info!("Using config file: {}", config_path.display());
        load_config(&config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?
    } else {
        get_config()?
    };

    if let Some(output) = &cli.output {
        config.output_path = output.clone();
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.env {
        print_env_vars();
        return Ok(());
    }

    init_tracing(&cli);

    if let Some(path) = load_env_file(None) {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    if let Some(path) = &cli.init_config {
        save_default_config(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        ui::print_status(
            Status::Success,
            &format!("Default configuration written to {}", path.display()),
        );
        return Ok(());
    }

    let config = resolve_config(&cli)?;

    // Missing key or bad settings stop here, before any request is made
    let harvester = Harvester::new(&config)?.with_progress(ui::page_progress(cli.quiet));

    let summary = harvester.run().await?;

    if !cli.quiet {
        ui::print_summary(&summary, cli.preview);
    }

    Ok(())
}
