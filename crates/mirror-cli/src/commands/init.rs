//! Init command implementation

use std::fs;
use std::path::Path;

use colored::Colorize;
use mirror_core::config::{DirectorySection, SyncSection};
use mirror_core::{Address, Layout, Manifest, RegistryState, StaticAuthority};

use crate::error::{CliError, Result};

/// Create `.mirror/` with a manifest, empty state, and empty authority file
///
/// An existing authority file is kept.
pub fn run_init(root: &Path, admin: Address, max_sync_owners: Option<usize>) -> Result<()> {
    let layout = Layout::new(root);
    if layout.is_initialized() {
        return Err(CliError::user(format!(
            "Registry already initialized at {}",
            layout.config_dir().display()
        )));
    }
    if !admin.is_assignable() {
        return Err(CliError::user(format!("{admin} cannot be the directory admin")));
    }

    let mut sync = SyncSection::default();
    if let Some(limit) = max_sync_owners {
        sync.max_sync_owners = limit;
    }
    let manifest = Manifest {
        directory: DirectorySection { admin: Some(admin) },
        sync,
        ..Manifest::default()
    };
    manifest.validate()?;

    fs::create_dir_all(layout.config_dir())?;
    manifest.save(&layout.manifest_path())?;
    RegistryState::new(admin).save(&layout.state_path())?;

    let authority_path = layout.authority_path(&manifest);
    if !authority_path.exists() {
        StaticAuthority::default().save(&authority_path)?;
    }

    println!(
        "{} Initialized registry at {}",
        "OK".green().bold(),
        layout.config_dir().display()
    );
    println!("   {}: {}", "admin".dimmed(), admin);
    println!(
        "   {}: {}",
        "authority".dimmed(),
        authority_path.display().to_string().cyan()
    );
    Ok(())
}
