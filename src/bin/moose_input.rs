//! MOOSE input command line interface
//!
//! # Usage
//!
//! ```bash
//! # Summarize a YAML schema (resolves app.syntax when present)
//! moose-input schema app.yaml
//!
//! # Dump the resolved schema tree as JSON
//! moose-input schema app.yaml --json
//!
//! # Re-read and re-write an input file in canonical form
//! moose-input normalize input.i -o normalized.i
//!
//! # List entries whose "name = value" matches a pattern
//! moose-input find input.i '.* = .*\.e'
//! ```
//!
//! Logging goes to stderr and honors `RUST_LOG` (default `warn`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use moose_input::moose_core::{InstanceSerializer, Schema};
use moose_input::{FileHandler, LoaderConfig};

#[derive(Parser)]
#[command(name = "moose-input")]
#[command(version = "0.1.0")]
#[command(about = "Load, normalize and search MOOSE schema and input files")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Loader configuration file (YAML); defaults plus MOOSE_PROJECT_DIR otherwise
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Directory whose files are offered for file-name parameters
    #[arg(long, global = true)]
    project_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a YAML schema and summarize its tree
    Schema {
        /// Schema file (.yaml)
        file: PathBuf,

        /// Print the resolved tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse an input file and write it back in canonical form
    Normalize {
        /// Input file (.i)
        file: PathBuf,

        /// Output file (writes stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Find entries whose "name = value" text matches a regex
    Find {
        /// Schema or input file
        file: PathBuf,

        /// Pattern matched against the whole "name = value" text
        pattern: String,
    },
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = load_config(&cli).and_then(|config| {
        let handler = FileHandler::new(config);
        match &cli.command {
            Commands::Schema { file, json } => cmd_schema(&handler, file, *json),
            Commands::Normalize { file, output } => cmd_normalize(&handler, file, output.as_deref()),
            Commands::Find { file, pattern } => cmd_find(&handler, file, pattern),
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<LoaderConfig> {
    let mut config = match &cli.config {
        Some(path) => LoaderConfig::from_file(path)?,
        None => LoaderConfig::from_env(),
    };
    if let Some(dir) = &cli.project_dir {
        config.project_dir = Some(dir.clone());
    }
    Ok(config)
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

fn cmd_schema(handler: &FileHandler, file: &Path, json: bool) -> Result<()> {
    let schema = handler
        .load_schema(file)
        .with_context(|| format!("Failed to load schema {}", file.display()))?;

    if json {
        let output = serde_json::to_string_pretty(schema.roots())
            .context("JSON serialization failed")?;
        println!("{}", output);
        return Ok(());
    }

    println!(
        "{} Loaded {} blocks, {} paths",
        "OK".green(),
        schema.roots().len(),
        schema.index().len()
    );
    print_type_groups(&schema);
    Ok(())
}

fn print_type_groups(schema: &Schema) {
    for path in schema.index().paths() {
        let Some(node) = schema.get(path) else {
            continue;
        };
        if node.is_adaptive() {
            println!("  {} [{}]", path.green(), node.type_names().join(", "));
        }
    }
}

fn cmd_normalize(handler: &FileHandler, file: &Path, output: Option<&Path>) -> Result<()> {
    let forest = handler
        .load_instance(file)
        .with_context(|| format!("Failed to load input file {}", file.display()))?;

    match output {
        Some(out) => {
            handler
                .write(out, &forest)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            eprintln!(
                "{} Wrote {} blocks to {}",
                "OK".green(),
                forest.len(),
                out.display()
            );
        }
        None => print!("{}", InstanceSerializer::serialize(&forest)),
    }
    Ok(())
}

fn cmd_find(handler: &FileHandler, file: &Path, pattern: &str) -> Result<()> {
    let entries = handler
        .find_all(file, pattern)
        .with_context(|| format!("Failed to search {}", file.display()))?;

    for entry in &entries {
        println!("{} = {}", entry.name.bold(), entry.value());
    }
    eprintln!("{} {} match(es)", "OK".green(), entries.len());
    Ok(())
}
