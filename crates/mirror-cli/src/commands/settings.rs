//! Mirror settings and delegate authorization

use colored::Colorize;
use mirror_core::{Address, DelegateAuthorization};

use crate::context::Context;
use crate::error::Result;

pub fn run_set_limit(ctx: &Context, principal: Address, limit: usize) -> Result<()> {
    let mut state = ctx.load_state()?;
    let id = state.resolve(&principal)?;
    state.set_max_sync_owners(&id, limit)?;
    ctx.save_state(&state)?;

    println!("{} Sync batch size for {} is now {}", "OK".green().bold(), id.to_string().cyan(), limit);
    Ok(())
}

pub fn run_set_auto_sync(ctx: &Context, principal: Address, enabled: bool) -> Result<()> {
    let mut state = ctx.load_state()?;
    let id = state.resolve(&principal)?;
    state.set_auto_sync(&id, enabled)?;
    ctx.save_state(&state)?;

    println!("{} Auto sync {}", "OK".green().bold(), if enabled { "enabled" } else { "disabled" });
    Ok(())
}

pub fn run_set_require_full_sync(ctx: &Context, principal: Address, enabled: bool) -> Result<()> {
    let mut state = ctx.load_state()?;
    let id = state.resolve(&principal)?;
    state.set_require_full_sync(&id, enabled)?;
    ctx.save_state(&state)?;

    println!(
        "{} Full sync {}",
        "OK".green().bold(),
        if enabled { "required" } else { "not required" }
    );
    Ok(())
}

/// Record the principal's mirror as a delegate of the authoritative registry
pub fn run_authorize(ctx: &Context, principal: Address) -> Result<()> {
    let state = ctx.load_state()?;
    let id = state.resolve(&principal)?;
    let mut authority = ctx.authority()?;

    if authority.authorize_delegate(id) {
        ctx.save_authority(&authority)?;
        println!("{} Authorized {} as a delegate", "OK".green().bold(), id.to_string().cyan());
    } else {
        println!("{} {} is already a delegate", "OK".green().bold(), id.to_string().cyan());
    }
    Ok(())
}
