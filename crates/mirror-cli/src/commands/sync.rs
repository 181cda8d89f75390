//! Configure, sync, and check command implementations

use colored::Colorize;
use mirror_core::{Address, AuthoritativeRegistry, DriftStatus};

use crate::context::Context;
use crate::error::Result;

pub fn run_configure(ctx: &Context, principal: Address) -> Result<()> {
    let authority = ctx.authority()?;
    let mut state = ctx.load_state()?;
    let id = state.resolve(&principal)?;
    let outcome = state.configure(&id, &authority)?;
    ctx.save_state(&state)?;

    let mirror = state.mirror(&id)?;
    println!(
        "{} Configured {} with {} owner(s), threshold {}",
        "OK".green().bold(),
        id.to_string().cyan(),
        mirror.owner_count(),
        mirror.threshold_display()
    );
    print_progress(outcome.fully_synced, outcome.synced_count, authority.owners()?.len());
    Ok(())
}

/// Run one batch, or batches until complete with `all`
pub fn run_sync(ctx: &Context, principal: Address, all: bool) -> Result<()> {
    let authority = ctx.authority()?;
    let mut state = ctx.load_state()?;
    let id = state.resolve(&principal)?;
    let total = authority.owners()?.len();

    if all {
        let run = state.sync_until_complete(&id, &authority, usize::MAX)?;
        ctx.save_state(&state)?;
        println!(
            "{} {} batch(es), {} owner(s) appended",
            "=>".blue().bold(),
            run.batches,
            run.appended.len()
        );
        print_progress(run.fully_synced, run.synced_count, total);
        return Ok(());
    }

    let outcome = state.sync_batch(&id, &authority)?;
    ctx.save_state(&state)?;

    if outcome.configured {
        println!("{} Configured {}", "OK".green().bold(), id.to_string().cyan());
    }
    for owner in &outcome.appended {
        println!("   {} {}", "+".green(), owner);
    }
    for owner in &outcome.skipped {
        println!("   {} {} {}", "-".yellow(), owner, "(skipped)".dimmed());
    }
    print_progress(outcome.fully_synced, outcome.synced_count, total);
    Ok(())
}

fn print_progress(fully_synced: bool, synced_count: usize, total: usize) {
    if fully_synced {
        println!("{} Fully synced ({synced_count} owners)", "OK".green().bold());
    } else {
        println!(
            "{} Partially synced ({}/{}). Run {} to continue.",
            "PARTIAL".yellow().bold(),
            synced_count,
            total,
            "mirror sync".cyan()
        );
    }
}

/// Compare a mirror with the authoritative registry
pub fn run_check(ctx: &Context, principal: Address, json_output: bool) -> Result<()> {
    let authority = ctx.authority()?;
    let state = ctx.load_state()?;
    let id = state.resolve(&principal)?;
    let report = state.check(&id, &authority)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} Checking mirror {}...", "=>".blue().bold(), id.to_string().cyan());
    match report.status {
        DriftStatus::InSync => {
            println!("{} Mirror is in sync. No drift detected.", "OK".green().bold());
        }
        DriftStatus::Unconfigured => {
            println!("{} Mirror is not configured.", "UNCONFIGURED".yellow().bold());
            println!();
            println!("Run {} to configure.", format!("mirror sync {principal}").cyan());
        }
        DriftStatus::Partial => {
            println!("{} Sync is incomplete:", "PARTIAL".yellow().bold());
            for msg in &report.messages {
                println!("   {} {}", "-".yellow(), msg);
            }
            println!();
            println!("Run {} to continue.", format!("mirror sync {principal} --all").cyan());
        }
        DriftStatus::Drifted => {
            println!("{} Mirror has drifted:", "DRIFTED".red().bold());
            for msg in &report.messages {
                println!("   {} {}", "!".red(), msg);
            }
            for owner in &report.missing {
                println!("   {} {} {}", "-".yellow(), owner, "(missing)".dimmed());
            }
            for owner in &report.extra {
                println!("   {} {} {}", "+".yellow(), owner, "(extra)".dimmed());
            }
        }
    }
    Ok(())
}
