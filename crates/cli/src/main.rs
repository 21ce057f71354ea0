//! RustedGuard CLI, the upstream collaborator around the governance core.
//!
//! Commands:
//! - `onboard`  Write a default config file
//! - `assess`   Govern a single message
//! - `batch`    Govern one message per line of a file
//! - `rules`    List every rule id per phase
//! - `config`   Show, validate or locate the configuration

use clap::{Parser, Subcommand};
use rustedguard_config::{AppConfig, LogFormat, LoggingConfig};
use rustedguard_core::taxonomy::IntentFraming;
use tracing_subscriber::EnvFilter;

mod assessment;
mod commands;

#[derive(Parser)]
#[command(
    name = "rustedguard",
    about = "RustedGuard: deterministic governance for AI responses",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file
    Onboard,

    /// Govern a single message
    Assess {
        /// The message text
        #[arg(short, long)]
        message: String,

        /// Intent framing supplied by the caller (e.g. ACTING, EXITING)
        #[arg(short, long)]
        framing: Option<IntentFraming>,

        /// Trace id; a random one is generated when omitted
        #[arg(short, long, env = "RUSTEDGUARD_TRACE_ID")]
        trace_id: Option<String>,

        /// Print all three artifacts as JSON
        #[arg(long)]
        json: bool,
    },

    /// Govern one message per line of a file
    Batch {
        /// Path to the input file
        file: std::path::PathBuf,

        /// Print one JSON object per message
        #[arg(long)]
        json: bool,
    },

    /// List every invariant and override rule id, grouped by phase
    Rules {
        #[arg(long)]
        json: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Check the configuration file and environment overrides
    Validate,
    /// Print the configuration file path
    Path,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Commands::Config { action } = &cli.command {
        init_tracing(cli.verbose, &LoggingConfig::default());
        return match action {
            ConfigAction::Show => commands::config_cmd::show().await,
            ConfigAction::Validate => commands::config_cmd::validate().await,
            ConfigAction::Path => commands::config_cmd::path().await,
        };
    }

    let config = AppConfig::load()?;
    init_tracing(cli.verbose, &config.logging);

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Assess {
            message,
            framing,
            trace_id,
            json,
        } => commands::assess::run(&config, &message, framing, trace_id, json).await?,
        Commands::Batch { file, json } => commands::batch::run(config, &file, json).await?,
        Commands::Rules { json } => commands::rules::run(json).await?,
        Commands::Config { .. } => {}
    }

    Ok(())
}

/// Logs go to stderr so `--json` output on stdout stays machine-readable.
fn init_tracing(verbose: bool, logging: &LoggingConfig) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_env("RUSTEDGUARD_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
