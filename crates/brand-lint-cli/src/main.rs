//! brand-lint CLI tool.
//!
//! Usage:
//! ```bash
//! brand-lint check [OPTIONS] [PATH]
//! brand-lint compile [--mode M] [--tenant T] [--path FILE]
//! brand-lint list-rules
//! brand-lint init
//! ```

use anyhow::Result;
use brand_lint::Mode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Brand-aware design-system linter for TSX/JSX projects
#[derive(Parser)]
#[command(name = "brand-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run lint checks
    Check {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Enforcement mode (overrides the config file)
        #[arg(short, long)]
        mode: Option<ModeArg>,

        /// Tenant whose brand policy applies
        #[arg(short, long)]
        tenant: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Apply safe fixes in place
        #[arg(long)]
        fix: bool,
    },

    /// Print the compiled host-linter configuration as JSON
    Compile {
        /// Project directory used for config resolution
        #[arg(default_value = ".")]
        project: PathBuf,

        /// Enforcement mode (overrides the config file)
        #[arg(short, long)]
        mode: Option<ModeArg>,

        /// Tenant whose brand policy applies
        #[arg(short, long)]
        tenant: Option<String>,

        /// File the configuration is compiled for
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// List available rules
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
    /// Annotated source snippets.
    Pretty,
}

/// Enforcement mode as accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ModeArg {
    /// Every rule warns.
    Advisory,
    /// Every rule errors.
    Required,
    /// Every rule errors and messages name the brand.
    BrandAware,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Advisory => Self::Advisory,
            ModeArg::Required => Self::Required,
            ModeArg::BrandAware => Self::BrandAware,
        }
    }
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
            mode,
            tenant,
            format,
            fix,
        } => {
            let source = config_resolver::resolve(&path, cli.config.as_deref());
            let options = commands::RunOptions {
                mode: mode.map(Mode::from),
                tenant,
            };
            commands::check::run(&path, &source, &options, format, fix)
        }
        Commands::Compile {
            project,
            mode,
            tenant,
            path,
        } => {
            let source = config_resolver::resolve(&project, cli.config.as_deref());
            let options = commands::RunOptions {
                mode: mode.map(Mode::from),
                tenant,
            };
            commands::compile::run(&project, &source, &options, path.as_deref())
        }
        Commands::ListRules => commands::list_rules::run(),
        Commands::Init { force } => commands::init::run(force),
    }
}
