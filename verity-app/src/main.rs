//! `verity`: check a news claim against live web search results.
//!
//! ```bash
//! verity                                  # interactive terminal UI
//! verity check "The moon is made of cheese"
//! verity config                           # resolved settings, secrets redacted
//! ```
mod check;
mod wiring;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use verity_common::observability::{LogConfig, LogFormat, init_logging};
use verity_config::{VerityConfigLoader, VeritySettings, discover_config_file, load_dotenv};

#[derive(Parser)]
#[command(
    name = "verity",
    version,
    about = "Fake news detection backed by live internet search"
)]
struct Cli {
    /// YAML configuration file. Defaults to ./verity.yaml, then the user config dir.
    #[arg(long, global = true, env = "VERITY_CONFIG")]
    config: Option<PathBuf>,

    /// Load environment variables from this file instead of ./.env.
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Log encoding (text or json); overrides logging.format.
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Debug-level logs, mirrored to stderr outside the TUI.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive terminal UI (default).
    Tui,
    /// Analyze one claim and print the result.
    Check {
        /// The news statement; multiple words are joined with spaces.
        claim: Vec<String>,
    },
    /// Print the resolved configuration with secrets redacted.
    Config,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let dotenv = load_dotenv(cli.env_file.as_deref())?;
    let config_path = discover_config_file(cli.config.as_deref());
    let mut loader = VerityConfigLoader::new();
    if let Some(path) = &config_path {
        loader = loader.with_file(path);
    }
    let settings = loader.load().with_context(|| match &config_path {
        Some(p) => format!("failed to load configuration from {}", p.display()),
        None => "failed to load configuration".to_string(),
    })?;

    let command = cli.command.unwrap_or(Commands::Tui);
    let interactive = matches!(command, Commands::Tui);
    let log_file = init_logging(LogConfig {
        log_dir: settings.logging.dir.clone(),
        emit_stderr: cli.verbose && !interactive,
        format: cli.log_format.unwrap_or(settings.logging.format),
        default_filter: if cli.verbose {
            "debug".to_string()
        } else {
            settings.logging.filter.clone()
        },
        ..LogConfig::default()
    })?;
    tracing::info!(
        log_file = %log_file.display(),
        config = ?config_path,
        dotenv = ?dotenv,
        "app.start"
    );

    match command {
        Commands::Tui => {
            let analyzer = wiring::build_analyzer(&settings)?;
            verity_tui::run(analyzer).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { claim } => check(&settings, &claim.join(" ")).await,
        Commands::Config => {
            if let Some(p) = &config_path {
                println!("# config file: {}", p.display());
            }
            println!("{}", serde_json::to_string_pretty(&settings.redacted())?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn check(settings: &VeritySettings, claim: &str) -> Result<ExitCode> {
    let analyzer = wiring::build_analyzer(settings)?;

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let mut stdout = std::io::stdout().lock();
    let outcome = check::run_check(&analyzer, claim, &cancel, &mut stdout).await;
    if let Err(e) = &outcome {
        tracing::warn!(error = %e, "check.failed");
    }
    Ok(ExitCode::from(check::exit_code(&outcome)))
}
