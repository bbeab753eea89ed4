//! cscout CLI: scan C sources for bugs, preview fixes, and train the classifier.

mod app;
mod commands;
mod render;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// cscout: find common C bugs and propose fixes
#[derive(Parser, Debug)]
#[command(name = "cscout", version, about, long_about = None)]
struct Cli {
    /// Workspace directory
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
enum Commands {
    /// Analyze C files or directories and report findings with proposed fixes
    Analyze {
        /// Files or directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Emit reports as JSON
        #[arg(long)]
        json: bool,
        /// Do not record results in the finding store
        #[arg(long)]
        no_store: bool,
    },
    /// Show the unified diff that all proposed fixes would produce for a file
    Fixes {
        /// C source file
        file: PathBuf,
        /// Print only the patch, without the finding list
        #[arg(long)]
        patch: bool,
    },
    /// Train the classifier and save the model
    Train {
        /// Labelled examples (JSON array or JSON lines)
        #[arg(long)]
        examples: Option<PathBuf>,
        /// Include samples recorded in the finding store
        #[arg(long)]
        from_store: bool,
        /// Include the built-in seed corpus
        #[arg(long)]
        seed: bool,
    },
    /// Query recorded findings
    Findings {
        /// Restrict to one category (e.g. memory_leak)
        #[arg(long)]
        category: Option<String>,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create a default configuration file in the workspace
    Init,
    /// Show current configuration
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // Human-readable layer for stderr, keeping stdout for reports
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    // JSON file layer for structured logging
    let log_dir = directories::ProjectDirs::from("dev", "cscout", "cscout")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "cscout.log");
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

    commands::handle_command(cli.command, &workspace).await
}
