//! AnswerGate CLI: run claim grounding and the answerability gate over
//! JSON inputs from disk.

mod commands;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// AnswerGate: check a draft answer against its sources before showing it
#[derive(Parser, Debug)]
#[command(name = "answergate", version, about, long_about = None)]
struct Cli {
    /// Workspace directory (for `.answergate/config.toml`)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Extract claims from an answer and ground them against chunks
    Verify {
        /// Plain-text file holding the draft answer
        #[arg(short, long)]
        answer: PathBuf,
        /// JSON file holding an array of provenance chunks
        #[arg(short, long)]
        chunks: PathBuf,
        /// Print only the coarse summary the gate consumes
        #[arg(long)]
        summary: bool,
    },
    /// Run the answerability gate on a compute request
    Gate {
        /// JSON file holding the compute request
        #[arg(short, long)]
        request: PathBuf,
        /// JSON file holding a retrieval-quality summary
        #[arg(long)]
        retrieval: Option<PathBuf>,
        /// JSON file holding a grounding summary
        #[arg(long)]
        grounding: Option<PathBuf>,
    },
    /// Full pipeline: ground the answer, summarize retrieval, then gate
    Check {
        /// Plain-text file holding the draft answer
        #[arg(short, long)]
        answer: PathBuf,
        /// JSON file holding an array of provenance chunks
        #[arg(short, long)]
        chunks: PathBuf,
        /// JSON file holding the compute request
        #[arg(short, long)]
        request: PathBuf,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum ConfigAction {
    /// Create default configuration file
    Init,
    /// Show current configuration
    Show,
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // Human-readable layer for stderr; stdout carries the JSON results.
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(filter));

    // JSON file layer for structured logging
    let log_dir = directories::ProjectDirs::from("dev", "answergate", "answergate")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "answergate.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    commands::handle_command(cli.command, &workspace)
}
