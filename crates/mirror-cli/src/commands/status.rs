//! Status and events command implementations

use colored::Colorize;
use mirror_core::{Address, AuthoritativeRegistry, Event, JournalEntry, MirrorPhase};
use serde_json::json;

use crate::context::Context;
use crate::error::Result;

/// Show a principal's mirror: owners, threshold, and sync progress
pub fn run_status(ctx: &Context, principal: Address, json_output: bool) -> Result<()> {
    let state = ctx.load_state()?;
    let id = state.resolve(&principal)?;
    let mirror = state.mirror(&id)?;
    let status = mirror.sync_status();
    let authoritative_total = match ctx.authority_if_present()? {
        Some(authority) => Some(authority.owners()?.len()),
        None => None,
    };

    if json_output {
        let value = json!({
            "principal": principal,
            "mirror": id,
            "admin": mirror.admin(),
            "configured": mirror.is_configured(),
            "phase": mirror.phase(),
            "owners": mirror.owners(),
            "threshold": mirror.threshold(),
            "sync": status,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "Mirror Status".bold());
    println!();
    println!("{}:  {}", "Principal".dimmed(), principal);
    println!("{}:     {}", "Mirror".dimmed(), id.to_string().cyan());
    println!("{}:      {}", "Admin".dimmed(), mirror.admin());

    let phase = match mirror.phase() {
        MirrorPhase::Unconfigured => mirror.phase().to_string().yellow(),
        MirrorPhase::PartiallySynced => status.describe(authoritative_total).yellow(),
        MirrorPhase::FullySynced => status.describe(authoritative_total).green(),
    };
    println!("{}:       {}", "Sync".dimmed(), phase);
    if !mirror.is_configured() {
        println!();
        println!("Run {} to configure.", format!("mirror sync {principal}").cyan());
        return Ok(());
    }

    println!("{}:  {}", "Threshold".dimmed(), mirror.threshold_display());
    println!(
        "{}:   limit {}, auto sync {}, require full sync {}",
        "Settings".dimmed(),
        status.current_limit,
        on_off(status.auto_sync_enabled),
        on_off(status.require_full_sync)
    );
    println!();
    println!("{}:", "Owners".bold());
    for owner in mirror.owner_set() {
        println!("  {} {}", "+".green(), owner);
    }
    Ok(())
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

/// Show journaled events, optionally for one principal's mirror
pub fn run_events(ctx: &Context, principal: Option<Address>, json_output: bool) -> Result<()> {
    let state = ctx.load_state()?;
    let entries: Vec<&JournalEntry> = match principal {
        Some(principal) => {
            let id = state.resolve(&principal)?;
            state.journal().for_mirror(id).collect()
        }
        None => state.journal().events().iter().collect(),
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "No events".dimmed());
        return Ok(());
    }
    for entry in entries {
        println!(
            "{} {:<18} {}",
            entry.at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
            entry.event.name().cyan(),
            describe(&entry.event)
        );
    }
    Ok(())
}

fn describe(event: &Event) -> String {
    match event {
        Event::MirrorCreated { principal, mirror } => {
            format!("{} for {}", mirror.as_address().abbreviated(), principal.abbreviated())
        }
        Event::MirrorRebound {
            principal,
            previous,
            mirror,
        } => match previous {
            Some(previous) => format!(
                "{} -> {} (was {})",
                principal.abbreviated(),
                mirror.as_address().abbreviated(),
                previous.as_address().abbreviated()
            ),
            None => format!("{} -> {}", principal.abbreviated(), mirror.as_address().abbreviated()),
        },
        Event::Configured {
            owners, threshold, ..
        } => format!("{threshold}/{owners}"),
        Event::OwnerAdded {
            owner, threshold, ..
        }
        | Event::OwnerRemoved {
            owner, threshold, ..
        } => format!("{} (threshold {threshold})", owner.abbreviated()),
        Event::OwnerReplaced { old, new, .. } => {
            format!("{} -> {}", old.abbreviated(), new.abbreviated())
        }
        Event::ThresholdChanged { threshold, .. } => format!("threshold {threshold}"),
        Event::OwnersSynced {
            count, complete, ..
        } => format!(
            "{count} appended, {}",
            if *complete { "complete" } else { "partial" }
        ),
        Event::SettingsChanged {
            max_sync_owners,
            auto_sync,
            require_full_sync,
            ..
        } => format!(
            "limit {max_sync_owners}, auto sync {}, require full sync {}",
            on_off(*auto_sync),
            on_off(*require_full_sync)
        ),
    }
}
