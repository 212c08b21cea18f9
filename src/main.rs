use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use plateforme_ia::app::{App, Strategies};
use plateforme_ia::config::AppConfig;
use plateforme_ia::console::{run_shell, Console, ConsoleNotifier};
use plateforme_ia::logging::init_logging;
use plateforme_ia::metrics::MetricsCollector;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file layered over config/default and config/local
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also write JSON logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Seed for connection outcomes
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive console driven in real time
    Shell,
    /// Run a command script on the virtual clock
    Run {
        /// Script file, one command per line
        script: PathBuf,
    },
    /// Print the effective configuration
    Config,
}

fn build_console(config: &AppConfig, seed: Option<u64>) -> Console {
    let strategies = Strategies::from_config(config, seed);
    let app = App::with_strategies(config, Arc::new(ConsoleNotifier), strategies);
    Console::new(app, config.upload.max_file_size_bytes)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load_with(cli.config.as_deref()).context("Failed to load configuration")?;

    // Initialize logging
    let level = cli.log_level.clone().unwrap_or_else(|| config.get_log_level());
    let log_file = cli
        .log_file
        .clone()
        .or_else(|| config.logging.file_path.as_ref().map(PathBuf::from));
    let _guard = init_logging(Some(level.as_str()), log_file.as_deref(), &config.logging.format)?;

    if let Err(err) = MetricsCollector::init() {
        warn!(error = %err, "Metrics recorder unavailable");
    }

    info!("Starting plateforme-ia");

    match &cli.command {
        Commands::Shell => {
            let console = build_console(&config, cli.seed);
            run_shell(console).await?;
        }
        Commands::Run { script } => {
            let text = std::fs::read_to_string(script)
                .with_context(|| format!("Failed to read script {}", script.display()))?;
            let mut console = build_console(&config, cli.seed);
            let stdout = std::io::stdout();
            console.run_script(&text, &mut stdout.lock())?;
            info!(elapsed_ms = console.app().now().as_millis(), "Script complete");
        }
        Commands::Config => {
            print!("{}", config.to_yaml()?);
        }
    }

    Ok(())
}
