//! # lpp-cli
//!
//! Command-line interface for the offline half of least-privilege profiling.
//!
//! - `lpp generalize`: preview how rule-log lines are generalized
//! - `lpp consolidate`: write the consolidated policy file
//! - `lpp patterns`: print the effective generalization table
//!
//! Configuration lives in `.lpp/` (override with `--config-dir`):
//! `profiler.toml` names the rule log, `policy.toml` holds the header and
//! the generalization patterns.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::LppConfig;

/// Least-privilege profiler: turn observed capability checks into a policy.
#[derive(Parser)]
#[command(name = "lpp", version, about)]
struct Cli {
    /// Directory holding profiler.toml and policy.toml.
    #[arg(long, default_value = ".lpp")]
    config_dir: PathBuf,

    /// Log every parsed and generalized line to stderr.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how each rule-log line is generalized.
    Generalize {
        /// Rule log to read (defaults to the profiler's configured rule log).
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Generalize, deduplicate and sort the rule log into a policy file.
    Consolidate {
        /// Rule log to read (defaults to the profiler's configured rule log).
        #[arg(long)]
        rules: Option<PathBuf>,
        /// Policy file to write.
        #[arg(long, short, default_value = "app.policy")]
        output: PathBuf,
    },
    /// Print the effective generalization patterns as policy.toml.
    Patterns,
}

/// `RUST_LOG` plus the workspace crates at info (debug with `--verbose`).
fn log_filter(verbose: bool) -> anyhow::Result<EnvFilter> {
    let level = if verbose { "debug" } else { "info" };
    let mut filter = EnvFilter::from_default_env();
    for target in ["lpp_profiler", "lpp_policy", "lpp_cli"] {
        filter = filter.add_directive(format!("{}={}", target, level).parse()?);
    }
    Ok(filter)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they don't mix with command output on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose)?)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = LppConfig::for_dir(&cli.config_dir)?;

    match &cli.command {
        Commands::Generalize { rules } => commands::generalize::execute(&config, rules.as_deref()),
        Commands::Consolidate { rules, output } => {
            commands::consolidate::execute(&config, rules.as_deref(), output)
        }
        Commands::Patterns => commands::patterns::execute(&config),
    }
}
