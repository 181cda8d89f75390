//! Owner mutation commands
//!
//! Each command loads the state, applies one mutation to the principal's
//! mirror, and saves. Mirrors with auto sync enabled are brought up to date
//! with the authoritative registry first.

use colored::Colorize;
use mirror_core::{Address, MirrorId, RegistryState, SENTINEL};

use crate::context::Context;
use crate::error::Result;

/// Batches run by auto sync before a mutation
const AUTO_SYNC_BATCHES: usize = 64;

fn load_for_mutation(ctx: &Context, principal: Address) -> Result<(RegistryState, MirrorId)> {
    let mut state = ctx.load_state()?;
    let id = state.resolve(&principal)?;
    auto_sync(ctx, &mut state, &id)?;
    Ok((state, id))
}

fn auto_sync(ctx: &Context, state: &mut RegistryState, id: &MirrorId) -> Result<()> {
    let mirror = state.mirror(id)?;
    if !mirror.is_configured() || !mirror.auto_sync_enabled() {
        return Ok(());
    }
    let Some(authority) = ctx.authority_if_present()? else {
        tracing::debug!(mirror = %id, "No authority file; skipping auto sync");
        return Ok(());
    };
    let run = state.sync_until_complete(id, &authority, AUTO_SYNC_BATCHES)?;
    if !run.appended.is_empty() {
        println!(
            "{} Auto sync: {} batch(es), {} owner(s) appended",
            "=>".blue().bold(),
            run.batches,
            run.appended.len()
        );
    }
    Ok(())
}

/// Predecessor of `owner`, or the explicit `--prev`
///
/// A non-member resolves to the sentinel so the mutation reports `UnknownOwner`.
fn resolve_prev(state: &RegistryState, id: &MirrorId, owner: Address, prev: Option<Address>) -> Result<Address> {
    if let Some(prev) = prev {
        return Ok(prev);
    }
    Ok(state
        .mirror(id)?
        .owner_set()
        .predecessor_of(&owner)
        .unwrap_or(SENTINEL))
}

pub fn run_add_owner(ctx: &Context, principal: Address, owner: Address, threshold: usize) -> Result<()> {
    let (mut state, id) = load_for_mutation(ctx, principal)?;
    state.insert_owner(&id, owner, threshold)?;
    ctx.save_state(&state)?;

    println!(
        "{} Added {} ({})",
        "OK".green().bold(),
        owner.to_string().cyan(),
        state.mirror(&id)?.threshold_display()
    );
    Ok(())
}

pub fn run_remove_owner(
    ctx: &Context,
    principal: Address,
    owner: Address,
    threshold: usize,
    prev: Option<Address>,
) -> Result<()> {
    let (mut state, id) = load_for_mutation(ctx, principal)?;
    let prev = resolve_prev(&state, &id, owner, prev)?;
    state.remove_owner(&id, prev, owner, threshold)?;
    ctx.save_state(&state)?;

    println!(
        "{} Removed {} ({})",
        "OK".green().bold(),
        owner.to_string().cyan(),
        state.mirror(&id)?.threshold_display()
    );
    Ok(())
}

pub fn run_replace_owner(
    ctx: &Context,
    principal: Address,
    old: Address,
    new: Address,
    prev: Option<Address>,
) -> Result<()> {
    let (mut state, id) = load_for_mutation(ctx, principal)?;
    let prev = resolve_prev(&state, &id, old, prev)?;
    state.replace_owner(&id, prev, old, new)?;
    ctx.save_state(&state)?;

    println!(
        "{} Replaced {} with {}",
        "OK".green().bold(),
        old.to_string().dimmed(),
        new.to_string().cyan()
    );
    Ok(())
}

pub fn run_change_threshold(ctx: &Context, principal: Address, threshold: usize) -> Result<()> {
    let (mut state, id) = load_for_mutation(ctx, principal)?;
    state.change_threshold(&id, threshold)?;
    ctx.save_state(&state)?;

    println!(
        "{} Threshold is now {}",
        "OK".green().bold(),
        state.mirror(&id)?.threshold_display()
    );
    Ok(())
}
