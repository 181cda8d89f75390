//! Per-principal mirror registry
//!
//! A [`MirrorState`] holds one principal's mirrored owner list and threshold
//! together with its sync progress and settings. Owner and threshold
//! mutations are validated in full before anything changes, so a failed call
//! leaves the state exactly as it was.

mod arena;
mod status;

pub use arena::MirrorArena;
pub use status::{MirrorPhase, SyncStatus, ThresholdDisplay};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::address::{Address, MirrorId};
use crate::owners::OwnerSet;
use crate::validator::MutationValidator;
use crate::{Error, Result};

/// Default batch size for new mirrors
pub const DEFAULT_MAX_SYNC_OWNERS: usize = 10;

/// Settings applied to a freshly created mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorDefaults {
    pub max_sync_owners: usize,
    pub auto_sync: bool,
    pub require_full_sync: bool,
}

impl Default for MirrorDefaults {
    fn default() -> Self {
        Self {
            max_sync_owners: DEFAULT_MAX_SYNC_OWNERS,
            auto_sync: true,
            require_full_sync: false,
        }
    }
}

/// Mirrored owner list, threshold, and sync state for one principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorState {
    pub(crate) id: MirrorId,
    pub(crate) principal: Address,
    pub(crate) admin: Address,
    pub(crate) configured: bool,
    pub(crate) threshold: usize,
    pub(crate) synced_count: usize,
    /// Position in the authoritative owner sequence reached by sync
    #[serde(default)]
    pub(crate) sync_cursor: usize,
    pub(crate) sync_complete: bool,
    pub(crate) auto_sync: bool,
    pub(crate) require_full_sync: bool,
    pub(crate) max_sync_owners: usize,
    pub(crate) owners: OwnerSet,
}

impl MirrorState {
    /// Create an unconfigured mirror
    pub fn new(id: MirrorId, principal: Address, admin: Address, defaults: MirrorDefaults) -> Self {
        Self {
            id,
            principal,
            admin,
            configured: false,
            threshold: 0,
            synced_count: 0,
            sync_cursor: 0,
            sync_complete: false,
            auto_sync: defaults.auto_sync,
            require_full_sync: defaults.require_full_sync,
            max_sync_owners: defaults.max_sync_owners,
            owners: OwnerSet::new(),
        }
    }

    pub fn id(&self) -> MirrorId {
        self.id
    }

    /// The principal whose owners this mirror follows
    pub fn principal(&self) -> Address {
        self.principal
    }

    /// The identity that created the mirror
    pub fn admin(&self) -> Address {
        self.admin
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Owners in list order
    pub fn owners(&self) -> Vec<Address> {
        self.owners.to_vec()
    }

    pub fn owner_set(&self) -> &OwnerSet {
        &self.owners
    }

    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    pub fn is_owner(&self, address: &Address) -> bool {
        self.owners.contains(address)
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Mirrored owners accounted for by sync, never more than the list holds
    pub fn synced_count(&self) -> usize {
        self.synced_count
    }

    /// Authoritative entries processed so far
    pub fn sync_cursor(&self) -> usize {
        self.sync_cursor
    }

    pub fn is_sync_complete(&self) -> bool {
        self.sync_complete
    }

    pub fn auto_sync_enabled(&self) -> bool {
        self.auto_sync
    }

    pub fn require_full_sync(&self) -> bool {
        self.require_full_sync
    }

    pub fn max_sync_owners(&self) -> usize {
        self.max_sync_owners
    }

    /// Snapshot of sync progress and settings
    pub fn sync_status(&self) -> SyncStatus {
        SyncStatus {
            synced_count: self.synced_count,
            is_complete: self.sync_complete,
            current_limit: self.max_sync_owners,
            auto_sync_enabled: self.auto_sync,
            require_full_sync: self.require_full_sync,
        }
    }

    /// Lifecycle phase derived from the stored flags
    pub fn phase(&self) -> MirrorPhase {
        match (self.configured, self.sync_complete) {
            (false, _) => MirrorPhase::Unconfigured,
            (true, false) => MirrorPhase::PartiallySynced,
            (true, true) => MirrorPhase::FullySynced,
        }
    }

    /// Threshold as `t/n`
    pub fn threshold_display(&self) -> ThresholdDisplay {
        ThresholdDisplay {
            threshold: self.threshold,
            owners: self.owners.len(),
        }
    }

    /// Add `new_owner` at the head of the list and set the threshold
    ///
    /// # Errors
    ///
    /// `NotConfigured`, `SyncRequired`, `InvalidAddress`, `DuplicateOwner`,
    /// `LimitOutOfRange` (list full), or `InvalidThreshold`.
    pub fn insert_owner(&mut self, new_owner: Address, new_threshold: usize) -> Result<()> {
        MutationValidator::ensure_mutable(self)?;
        MutationValidator::ensure_candidate(&self.owners, self.id, &new_owner)?;
        MutationValidator::ensure_capacity(self.owners.len())?;
        MutationValidator::ensure_threshold(new_threshold, self.owners.len() + 1)?;

        self.owners.link_front(new_owner);
        self.threshold = new_threshold;
        info!(mirror = %self.id, owner = %new_owner, threshold = new_threshold, "owner added");
        Ok(())
    }

    /// Remove `target`, whose predecessor is `prev`, and set the threshold
    ///
    /// # Errors
    ///
    /// `NotConfigured`, `SyncRequired`, `InvalidAddress`, `UnknownOwner`,
    /// `InvalidPredecessor`, or `InvalidThreshold` (including removal of the
    /// last owner).
    pub fn remove_owner(&mut self, prev: Address, target: Address, new_threshold: usize) -> Result<()> {
        MutationValidator::ensure_mutable(self)?;
        MutationValidator::ensure_linked_member(&self.owners, &prev, &target)?;
        MutationValidator::ensure_threshold(new_threshold, self.owners.len() - 1)?;

        self.owners.unlink(prev, target);
        self.threshold = new_threshold;
        self.synced_count = self.synced_count.min(self.owners.len());
        info!(mirror = %self.id, owner = %target, threshold = new_threshold, "owner removed");
        Ok(())
    }

    /// Put `new_owner` in the position held by `old_owner`
    ///
    /// The threshold is unchanged.
    pub fn replace_owner(&mut self, prev: Address, old_owner: Address, new_owner: Address) -> Result<()> {
        MutationValidator::ensure_mutable(self)?;
        MutationValidator::ensure_linked_member(&self.owners, &prev, &old_owner)?;
        MutationValidator::ensure_candidate(&self.owners, self.id, &new_owner)?;

        self.owners.relink(prev, old_owner, new_owner);
        info!(mirror = %self.id, old = %old_owner, new = %new_owner, "owner replaced");
        Ok(())
    }

    pub fn change_threshold(&mut self, new_threshold: usize) -> Result<()> {
        MutationValidator::ensure_mutable(self)?;
        MutationValidator::ensure_threshold(new_threshold, self.owners.len())?;

        self.threshold = new_threshold;
        info!(mirror = %self.id, threshold = new_threshold, "threshold changed");
        Ok(())
    }

    /// Set the batch size for future syncs
    ///
    /// Already mirrored owners are not touched.
    pub fn set_max_sync_owners(&mut self, limit: usize) -> Result<()> {
        MutationValidator::ensure_sync_limit(limit)?;
        self.max_sync_owners = limit;
        debug!(mirror = %self.id, limit, "sync limit set");
        Ok(())
    }

    /// Advisory flag read by callers before mutating
    pub fn set_auto_sync(&mut self, enabled: bool) {
        self.auto_sync = enabled;
        debug!(mirror = %self.id, enabled, "auto sync set");
    }

    /// Gate mutations on a completed sync
    pub fn set_require_full_sync(&mut self, enabled: bool) {
        self.require_full_sync = enabled;
        debug!(mirror = %self.id, enabled, "require full sync set");
    }

    /// Verify the structural invariants of a loaded state
    ///
    /// The owner list itself is validated when it is deserialized.
    pub fn check_invariants(&self) -> Result<()> {
        let count = self.owners.len();
        if self.configured {
            if self.threshold < 1 || self.threshold > count {
                return Err(Error::corrupt(format!(
                    "mirror {} has threshold {} for {} owner(s)",
                    self.id, self.threshold, count
                )));
            }
        } else if count != 0 || self.threshold != 0 || self.synced_count != 0 || self.sync_cursor != 0 {
            return Err(Error::corrupt(format!(
                "unconfigured mirror {} carries owner state",
                self.id
            )));
        }
        if self.synced_count > count || self.synced_count > self.sync_cursor {
            return Err(Error::corrupt(format!(
                "mirror {} synced {} of {} owner(s)",
                self.id, self.synced_count, count
            )));
        }
        if self.owners.contains(&self.id.as_address()) {
            return Err(Error::corrupt(format!("mirror {} owns itself", self.id)));
        }
        MutationValidator::ensure_sync_limit(self.max_sync_owners)
            .map_err(|e| Error::corrupt(format!("mirror {}: {e}", self.id)))
    }
}
