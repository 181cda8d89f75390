//! Owner Mirror CLI
//!
//! Manages mirrors of an authoritative owner set from a registry root.

mod cli;
mod commands;
mod context;
mod error;

use std::io;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use context::Context;
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command.take() {
        Some(cmd) => execute_command(cmd, &cli),
        None => {
            println!("{} Owner Mirror CLI", "mirror".green().bold());
            println!();
            println!("Run {} for available commands.", "mirror --help".cyan());
            Ok(())
        }
    }
}

/// Debug output with `-v`, otherwise whatever `MIRROR_LOG` asks for
fn init_tracing(verbose: bool) -> Result<()> {
    let result = if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_env("MIRROR_LOG"))
            .with_writer(io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };
    result.map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {e}")))?;
    tracing::debug!("Verbose mode enabled");
    Ok(())
}

fn execute_command(cmd: Commands, cli: &Cli) -> Result<()> {
    match cmd {
        Commands::Init {
            admin,
            max_sync_owners,
        } => commands::run_init(&cli.root, admin, max_sync_owners),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "mirror", &mut io::stdout());
            Ok(())
        }
        cmd => {
            let ctx = Context::open(&cli.root, cli.caller)?;
            execute_in_root(cmd, &ctx)
        }
    }
}

fn execute_in_root(cmd: Commands, ctx: &Context) -> Result<()> {
    match cmd {
        Commands::Create { principal } => commands::run_create(ctx, principal),
        Commands::Attach => commands::run_attach(ctx),
        Commands::Rebind { principal, mirror } => commands::run_rebind(ctx, principal, mirror),
        Commands::List { json } => commands::run_list(ctx, json),
        Commands::Status { principal, json } => commands::run_status(ctx, principal, json),
        Commands::Configure { principal } => commands::run_configure(ctx, principal),
        Commands::Sync { principal, all } => commands::run_sync(ctx, principal, all),
        Commands::Check { principal, json } => commands::run_check(ctx, principal, json),
        Commands::AddOwner {
            principal,
            owner,
            threshold,
        } => commands::run_add_owner(ctx, principal, owner, threshold),
        Commands::RemoveOwner {
            principal,
            owner,
            threshold,
            prev,
        } => commands::run_remove_owner(ctx, principal, owner, threshold, prev),
        Commands::ReplaceOwner {
            principal,
            old,
            new,
            prev,
        } => commands::run_replace_owner(ctx, principal, old, new, prev),
        Commands::ChangeThreshold {
            principal,
            threshold,
        } => commands::run_change_threshold(ctx, principal, threshold),
        Commands::SetLimit { principal, limit } => commands::run_set_limit(ctx, principal, limit),
        Commands::SetAutoSync { principal, enabled } => {
            commands::run_set_auto_sync(ctx, principal, enabled)
        }
        Commands::SetRequireFullSync { principal, enabled } => {
            commands::run_set_require_full_sync(ctx, principal, enabled)
        }
        Commands::Authorize { principal } => commands::run_authorize(ctx, principal),
        Commands::Events { principal, json } => commands::run_events(ctx, principal, json),
        Commands::Init { .. } | Commands::Completions { .. } => {
            Err(CliError::user("Command does not run inside a registry root"))
        }
    }
}
