//! Persisted registry state
//!
//! [`RegistryState`] bundles the directory, every mirror, and the journal
//! into one TOML document. Its methods are the operations a control
//! application issues: each one runs the underlying directory, mirror, or
//! sync operation and journals the result if it succeeds.

use std::fs::{self, File, OpenOptions};
use std::io::Read;
use std::path::Path;

use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::address::{Address, MirrorId};
use crate::authority::AuthoritativeRegistry;
use crate::directory::Directory;
use crate::journal::{Event, Journal};
use crate::mirror::{MirrorArena, MirrorDefaults, MirrorState};
use crate::sync::{BatchOutcome, DriftReport, SyncEngine, SyncRun};
use crate::{Error, Result};

/// State file format version
pub const STATE_VERSION: &str = "1.0";

/// The directory, its mirrors, and the journal of applied operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryState {
    version: String,
    directory: Directory,
    #[serde(default)]
    mirrors: MirrorArena,
    #[serde(default)]
    journal: Journal,
}

impl RegistryState {
    /// Empty state for a directory administered by `admin`
    pub fn new(admin: Address) -> Self {
        Self {
            version: STATE_VERSION.to_string(),
            directory: Directory::new(admin),
            mirrors: MirrorArena::new(),
            journal: Journal::new(),
        }
    }

    /// Load state from a TOML file with a shared lock
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, locked, or parsed, and
    /// `StateCorrupt` if the parsed state breaks a structural invariant.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        file.lock_shared()?;

        // read through the locked handle
        let mut content = String::new();
        (&file).read_to_string(&mut content)?;
        let state: RegistryState = toml::from_str(&content)?;
        state.validate()?;
        Ok(state)
    }

    /// Save state atomically with an exclusive lock
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        lock_file.lock_exclusive()?;

        let temp_path = path.with_extension("toml.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Check every mirror and the directory tables against each other
    pub fn validate(&self) -> Result<()> {
        if self.version != STATE_VERSION {
            return Err(Error::corrupt(format!(
                "unsupported state version {}",
                self.version
            )));
        }
        for mirror in self.mirrors.iter() {
            mirror.check_invariants()?;
        }
        self.directory.check_consistency(&self.mirrors)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn mirrors(&self) -> &MirrorArena {
        &self.mirrors
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn mirror(&self, id: &MirrorId) -> Result<&MirrorState> {
        self.mirrors.get(id)
    }

    /// The mirror currently bound to `principal`
    ///
    /// # Errors
    ///
    /// `MirrorNotFound` if the principal has no mirror.
    pub fn resolve(&self, principal: &Address) -> Result<MirrorId> {
        self.directory
            .get_mirror_for(principal)
            .ok_or_else(|| Error::MirrorNotFound {
                key: principal.to_string(),
            })
    }

    pub fn mirror_for(&self, principal: &Address) -> Result<&MirrorState> {
        let id = self.resolve(principal)?;
        self.mirrors.get(&id)
    }

    // Directory

    pub fn create_mirror(
        &mut self,
        caller: Address,
        principal: Address,
        defaults: MirrorDefaults,
    ) -> Result<MirrorId> {
        self.directory.create_mirror(
            &mut self.mirrors,
            &mut self.journal,
            caller,
            principal,
            defaults,
        )
    }

    pub fn attach_self(&mut self, caller: Address, defaults: MirrorDefaults) -> Result<MirrorId> {
        self.directory
            .attach_self(&mut self.mirrors, &mut self.journal, caller, defaults)
    }

    pub fn rebind(&mut self, caller: Address, principal: Address, mirror: MirrorId) -> Result<Option<MirrorId>> {
        self.directory
            .rebind(&mut self.journal, caller, principal, mirror)
    }

    // Owner mutations

    pub fn insert_owner(&mut self, id: &MirrorId, owner: Address, threshold: usize) -> Result<()> {
        self.mirrors.get_mut(id)?.insert_owner(owner, threshold)?;
        self.journal.record(Event::OwnerAdded {
            mirror: *id,
            owner,
            threshold,
        });
        Ok(())
    }

    pub fn remove_owner(&mut self, id: &MirrorId, prev: Address, owner: Address, threshold: usize) -> Result<()> {
        self.mirrors
            .get_mut(id)?
            .remove_owner(prev, owner, threshold)?;
        self.journal.record(Event::OwnerRemoved {
            mirror: *id,
            owner,
            threshold,
        });
        Ok(())
    }

    pub fn replace_owner(&mut self, id: &MirrorId, prev: Address, old: Address, new: Address) -> Result<()> {
        self.mirrors.get_mut(id)?.replace_owner(prev, old, new)?;
        self.journal.record(Event::OwnerReplaced {
            mirror: *id,
            old,
            new,
        });
        Ok(())
    }

    pub fn change_threshold(&mut self, id: &MirrorId, threshold: usize) -> Result<()> {
        self.mirrors.get_mut(id)?.change_threshold(threshold)?;
        self.journal.record(Event::ThresholdChanged {
            mirror: *id,
            threshold,
        });
        Ok(())
    }

    // Settings

    pub fn set_max_sync_owners(&mut self, id: &MirrorId, limit: usize) -> Result<()> {
        self.mirrors.get_mut(id)?.set_max_sync_owners(limit)?;
        self.record_settings(id)
    }

    pub fn set_auto_sync(&mut self, id: &MirrorId, enabled: bool) -> Result<()> {
        self.mirrors.get_mut(id)?.set_auto_sync(enabled);
        self.record_settings(id)
    }

    pub fn set_require_full_sync(&mut self, id: &MirrorId, enabled: bool) -> Result<()> {
        self.mirrors.get_mut(id)?.set_require_full_sync(enabled);
        self.record_settings(id)
    }

    fn record_settings(&mut self, id: &MirrorId) -> Result<()> {
        let status = self.mirrors.get(id)?.sync_status();
        self.journal.record(Event::SettingsChanged {
            mirror: *id,
            max_sync_owners: status.current_limit,
            auto_sync: status.auto_sync_enabled,
            require_full_sync: status.require_full_sync,
        });
        Ok(())
    }

    // Sync

    pub fn configure<A>(&mut self, id: &MirrorId, authority: &A) -> Result<BatchOutcome>
    where
        A: AuthoritativeRegistry + ?Sized,
    {
        let outcome = SyncEngine::new(authority).configure(self.mirrors.get_mut(id)?)?;
        self.record_batch(id, &outcome)?;
        Ok(outcome)
    }

    pub fn sync_batch<A>(&mut self, id: &MirrorId, authority: &A) -> Result<BatchOutcome>
    where
        A: AuthoritativeRegistry + ?Sized,
    {
        let outcome = SyncEngine::new(authority).sync_batch(self.mirrors.get_mut(id)?)?;
        self.record_batch(id, &outcome)?;
        Ok(outcome)
    }

    /// Run batches until complete and journal the run as one sync event
    pub fn sync_until_complete<A>(&mut self, id: &MirrorId, authority: &A, max_batches: usize) -> Result<SyncRun>
    where
        A: AuthoritativeRegistry + ?Sized,
    {
        let mirror = self.mirrors.get_mut(id)?;
        let was_configured = mirror.is_configured();
        let run = SyncEngine::new(authority).sync_until_complete(mirror, max_batches)?;

        let outcome = BatchOutcome {
            fully_synced: run.fully_synced,
            synced_count: run.synced_count,
            appended: run.appended.clone(),
            skipped: Vec::new(),
            configured: !was_configured && self.mirrors.get(id)?.is_configured(),
        };
        if run.batches > 0 {
            self.record_batch(id, &outcome)?;
        }
        Ok(run)
    }

    pub fn check<A>(&self, id: &MirrorId, authority: &A) -> Result<DriftReport>
    where
        A: AuthoritativeRegistry + ?Sized,
    {
        SyncEngine::new(authority).check(self.mirrors.get(id)?)
    }

    fn record_batch(&mut self, id: &MirrorId, outcome: &BatchOutcome) -> Result<()> {
        if outcome.configured {
            let mirror = self.mirrors.get(id)?;
            self.journal.record(Event::Configured {
                mirror: *id,
                owners: mirror.owner_count(),
                threshold: mirror.threshold(),
            });
        }
        // a complete no-op batch leaves no trace
        let idle = outcome.appended.is_empty() && outcome.skipped.is_empty() && outcome.fully_synced;
        if !idle {
            self.journal.record(Event::OwnersSynced {
                mirror: *id,
                count: outcome.appended.len(),
                complete: outcome.fully_synced,
            });
        }
        Ok(())
    }
}
