//! arch-drift CLI tool.
//!
//! Usage:
//! ```bash
//! arch-drift check [OPTIONS] [PATH]
//! arch-drift remote --request request.json
//! arch-drift list-rules
//! arch-drift init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod rules_resolver;

/// Architecture drift detection for layered polyglot codebases
#[derive(Parser)]
#[command(name = "arch-drift")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a local directory for architecture drift
    Check {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Path to rules file (TOML, or JSON with a .json extension)
        #[arg(short, long, env = "ARCH_DRIFT_RULES")]
        rules: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Fail when the drift score exceeds this value
        #[arg(long)]
        max_drift: Option<f64>,
    },

    /// Clone a repository, check out a ref, and analyze it
    Remote {
        /// Path to an analyze request (`{git, rules, mode}` JSON)
        #[arg(short, long)]
        request: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// List rule codes
    ListRules,

    /// Initialize a rules file
    Init {
        /// Overwrite existing rules file
        #[arg(long)]
        force: bool,
    },
}

/// Output format for drift reports.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// Full JSON report.
    Json,
    /// One-line-per-violation compact format.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            path,
            rules,
            format,
            max_drift,
        } => {
            let source = rules_resolver::RulesLocator::from_env().locate(&path, rules.as_deref());
            commands::check::run(&path, &source, format, max_drift)
        }
        Commands::Remote { request, format } => commands::remote::run(&request, format),
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(force),
    }
}
