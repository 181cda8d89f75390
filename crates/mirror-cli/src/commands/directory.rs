//! Directory command implementations

use colored::Colorize;
use mirror_core::{Address, MirrorId};
use serde_json::json;

use crate::context::Context;
use crate::error::Result;

/// Create a mirror for `principal`, with the caller as its admin
pub fn run_create(ctx: &Context, principal: Address) -> Result<()> {
    let caller = ctx.caller()?;
    let mut state = ctx.load_state()?;
    let id = state.create_mirror(caller, principal, ctx.defaults())?;
    ctx.save_state(&state)?;

    println!("{} Created mirror {} for {}", "OK".green().bold(), id.to_string().cyan(), principal);
    println!("Run {} to copy its owners.", format!("mirror sync {principal}").cyan());
    Ok(())
}

/// Create a mirror for the caller itself
pub fn run_attach(ctx: &Context) -> Result<()> {
    let caller = ctx.caller()?;
    let mut state = ctx.load_state()?;
    let id = state.attach_self(caller, ctx.defaults())?;
    ctx.save_state(&state)?;

    println!("{} Attached mirror {} to {}", "OK".green().bold(), id.to_string().cyan(), caller);
    Ok(())
}

pub fn run_rebind(ctx: &Context, principal: Address, mirror: MirrorId) -> Result<()> {
    let caller = ctx.caller()?;
    let mut state = ctx.load_state()?;
    let previous = state.rebind(caller, principal, mirror)?;
    ctx.save_state(&state)?;

    match previous {
        Some(previous) => println!(
            "{} {} now uses {} (was {})",
            "OK".green().bold(),
            principal,
            mirror.to_string().cyan(),
            previous.as_address().abbreviated().dimmed()
        ),
        None => println!("{} {} now uses {}", "OK".green().bold(), principal, mirror.to_string().cyan()),
    }
    Ok(())
}

/// List mirrors in creation order
pub fn run_list(ctx: &Context, json_output: bool) -> Result<()> {
    let state = ctx.load_state()?;
    let directory = state.directory();

    if json_output {
        let mut rows = Vec::new();
        for entry in directory.entries() {
            let mirror = state.mirror(&entry.mirror)?;
            rows.push(json!({
                "mirror": entry.mirror,
                "principal": entry.principal,
                "created_at": entry.created_at,
                "configured": mirror.is_configured(),
                "owners": mirror.owner_count(),
                "threshold": mirror.threshold(),
                "phase": mirror.phase(),
            }));
        }
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if directory.mirror_count() == 0 {
        println!("{} (use {} to add one)", "No mirrors".dimmed(), "mirror create".cyan());
        return Ok(());
    }

    println!("{} ({})", "Mirrors".bold(), directory.mirror_count());
    for (index, entry) in directory.entries().iter().enumerate() {
        let mirror = state.mirror(&entry.mirror)?;
        println!(
            "  {:>3}. {} {} {} [{}] {}",
            index,
            entry.mirror.to_string().cyan(),
            "for".dimmed(),
            entry.principal.abbreviated(),
            mirror.threshold_display(),
            mirror.phase().to_string().dimmed()
        );
    }
    Ok(())
}
