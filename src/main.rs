//! sea-ts - command-line interface for the Sea tree-sitter grammar

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use tree_sitter_sea::config;

#[derive(Parser)]
#[command(name = "sea-ts")]
#[command(version)]
#[command(about = "Load, verify and parse with the Sea tree-sitter grammar")]
#[command(long_about = r#"
sea-ts works with the Sea grammar for tree-sitter:
  • Verify that the compiled grammar loads into the runtime
  • Parse Sea sources and report syntax errors
  • List the top-level definitions of a file

Example usage:
  sea-ts check
  sea-ts check --library ./libtree-sitter-sea.so
  sea-ts parse src/
  sea-ts outline src/main.sea
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (defaults to ./sea.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify that the Sea grammar loads
    Check {
        /// Load the grammar from a compiled shared library instead
        #[arg(short, long)]
        library: Option<PathBuf>,

        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse Sea files or directories and report syntax errors
    Parse {
        /// Files or directories to parse
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Print the syntax tree of every file
        #[arg(long)]
        sexp: bool,

        /// Load the grammar from a compiled shared library instead
        #[arg(short, long)]
        library: Option<PathBuf>,

        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// List the top-level definitions of a Sea file
    Outline {
        /// Sea source file
        file: PathBuf,

        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default sea.toml
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },
}

/// How command results are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn from_flag(json: bool) -> Self {
        if json { OutputMode::Json } else { OutputMode::Human }
    }

    pub fn is_human(&self) -> bool {
        *self == OutputMode::Human
    }
}

/// Print a machine-readable success envelope
pub fn emit_success(output_mode: OutputMode, command: &str, data: serde_json::Value) -> anyhow::Result<()> {
    debug_assert!(!output_mode.is_human());
    let envelope = serde_json::json!({
        "ok": true,
        "command": command,
        "data": data,
    });
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let explicit_config = cli.config.as_deref();

    match cli.command {
        Commands::Check { library, json } => {
            let sea_config = config::resolve_config(explicit_config)?;
            commands::run_check(OutputMode::from_flag(json), &sea_config, library)
        }
        Commands::Parse { paths, sexp, library, json } => {
            let sea_config = config::resolve_config(explicit_config)?;
            commands::run_parse(OutputMode::from_flag(json), &sea_config, &paths, sexp, library)
        }
        Commands::Outline { file, json } => {
            let sea_config = config::resolve_config(explicit_config)?;
            commands::run_outline(OutputMode::from_flag(json), &sea_config, &file)
        }
        Commands::Init { force } => {
            // Never parsed here: `init --force` replaces a broken file.
            let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
            commands::run_init(&config_path, force)
        }
    }
}
