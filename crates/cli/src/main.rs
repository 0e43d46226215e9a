//! vrag CLI
//!
//! Populate a vector collection from a directory of PDFs and ask questions
//! answered from it.

mod commands;

use clap::{Parser, Subcommand};
use commands::{ClearCommand, PopulateCommand, QueryCommand, StatsCommand};
use std::path::PathBuf;
use std::process::ExitCode;
use vrag_core::logging::{self, LogFormat};
use vrag_core::{config::AppConfig, AppError, AppResult};

/// Printed after errors that point at the model backend.
const BACKEND_HINT: &str = "Make sure your Ollama service is running!";

/// vrag - question answering over your PDF library
#[derive(Parser, Debug)]
#[command(name = "vrag")]
#[command(about = "Retrieval-augmented question answering over PDF documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "VRAG_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file (default: <workspace>/.vrag/config.yaml)
    #[arg(short, long, global = true, env = "VRAG_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Log output format (pretty, json)
    #[arg(long, global = true, env = "VRAG_LOG_FORMAT")]
    log_format: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load PDFs and add new chunks to the collection
    Populate(PopulateCommand),

    /// Answer a question from the collection
    Query(QueryCommand),

    /// Remove every entry from the collection
    Clear(ClearCommand),

    /// Show collection statistics
    Stats(StatsCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Populate(_) => "populate",
            Commands::Query(_) => "query",
            Commands::Clear(_) => "clear",
            Commands::Stats(_) => "stats",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = AppConfig::load(cli.workspace, cli.config)?.with_overrides(
        cli.log_level,
        cli.log_format,
        cli.verbose,
        cli.no_color,
    );

    let log_format = config
        .log_format
        .as_deref()
        .and_then(LogFormat::parse)
        .unwrap_or_default();
    logging::init_logging(config.log_level.as_deref(), config.no_color, log_format)?;

    tracing::info!("vrag starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Collection: {:?}", config.collection_dir());

    config.ensure_vrag_dir()?;

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    let result = match cli.command {
        Commands::Populate(cmd) => cmd.execute(&config).await,
        Commands::Query(cmd) => cmd.execute(&config).await,
        Commands::Clear(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

fn report_error(error: &AppError) {
    eprintln!("Error: {}", error);
    if error.is_backend_failure() {
        eprintln!("{}", BACKEND_HINT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_command_parses() {
        let cli = Cli::try_parse_from(["vrag", "query", "What is MBSE?", "-k", "3"]).unwrap();
        match cli.command {
            Commands::Query(cmd) => {
                assert_eq!(cmd.text, "What is MBSE?");
                assert_eq!(cmd.k, Some(3));
            }
            other => panic!("Expected query, got {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["vrag", "populate", "--reset", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.command.name(), "populate");
    }

    #[test]
    fn test_query_requires_text() {
        assert!(Cli::try_parse_from(["vrag", "query"]).is_err());
    }
}
