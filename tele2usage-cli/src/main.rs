// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! tele2usage CLI - Tele2 mobile data usage from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Add an account (picks the first subscription)
//! tele2usage setup --username 199001011234 --password hunter2
//!
//! # Show usage for all accounts
//! tele2usage
//!
//! # JSON output
//! tele2usage usage --format json --pretty
//!
//! # Poll faster
//! tele2usage options "Tele2 Data" --interval 600
//!
//! # Live view
//! tele2usage watch --scan-interval 30
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tele2usage_store::StoreError;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{accounts, config, options, remove, setup, usage, watch};

// ============================================================================
// CLI Definition
// ============================================================================

/// tele2usage CLI - Tele2 mobile data usage.
#[derive(Parser)]
#[command(name = "tele2usage")]
#[command(about = "Tele2 mobile data usage monitoring CLI")]
#[command(long_about = r#"
tele2usage polls the Tele2 web API for mobile data usage.

Each configured account exposes six sensors: data left, data used,
data total, billing period start and end, and an unlimited-plan flag.
Polling follows the account's interval, and runs four times as often
while data left is falling.

Examples:
  tele2usage setup --username U --password P
  tele2usage                      # Usage for all accounts
  tele2usage usage "Tele2 Data"   # One account
  tele2usage --format json        # JSON output
  tele2usage watch                # Live view
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run. If none, runs 'usage' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Add an account.
    Setup(setup::SetupArgs),

    /// Change the poll interval of an account.
    Options(options::OptionsArgs),

    /// List configured accounts.
    #[command(visible_alias = "a")]
    Accounts,

    /// Remove an account.
    Remove(remove::RemoveArgs),

    /// Poll once and print all sensors (default if no command specified).
    #[command(visible_alias = "u")]
    Usage(usage::UsageArgs),

    /// Keep polling and redraw on every change.
    #[command(visible_alias = "w")]
    Watch(watch::WatchArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Credentials rejected during setup.
    AuthFailed = 2,
    /// Unknown account or invalid option.
    Config = 3,
}

impl ExitCode {
    /// Picks the exit code for a failed command.
    fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<StoreError>() {
            Some(e) if e.is_auth() => ExitCode::AuthFailed,
            Some(
                StoreError::AccountNotFound(_)
                | StoreError::DuplicateAccount(_)
                | StoreError::InvalidOption(_)
                | StoreError::Config(_)
                | StoreError::Setup(_),
            ) => ExitCode::Config,
            _ => ExitCode::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("tele2usage=debug,info")
    } else {
        EnvFilter::new("tele2usage=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result: Result<()> = match &cli.command {
        Some(Commands::Setup(args)) => setup::run(args, &cli).await,
        Some(Commands::Options(args)) => options::run(args, &cli).await,
        Some(Commands::Accounts) => accounts::run(&cli).await,
        Some(Commands::Remove(args)) => remove::run(args, &cli).await,
        Some(Commands::Usage(args)) => usage::run(args, &cli).await,
        Some(Commands::Watch(args)) => watch::run(args, &cli).await,
        Some(Commands::Config(args)) => config::run(args, &cli),
        None => usage::run(&usage::UsageArgs::default(), &cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    std::process::exit(ExitCode::Success as i32);
}
