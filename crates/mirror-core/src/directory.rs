//! Directory mapping principals to their mirrors
//!
//! The directory is the only way mirrors come into existence. It keeps the
//! mirrors it created in creation order and a `principal -> mirror` binding
//! table that only the directory admin can override.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::address::{ADDRESS_LEN, Address, MirrorId};
use crate::journal::{Event, Journal};
use crate::mirror::{MirrorArena, MirrorDefaults, MirrorState};
use crate::validator::MutationValidator;
use crate::{Error, Result};

/// Directory interface version
pub const VERSION: &str = "1.0.0";

/// A mirror created by the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Principal the mirror was created for
    pub principal: Address,
    pub mirror: MirrorId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    admin: Address,
    #[serde(default)]
    entries: Vec<DirectoryEntry>,
    #[serde(default)]
    bindings: BTreeMap<Address, MirrorId>,
}

impl Directory {
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            entries: Vec::new(),
            bindings: BTreeMap::new(),
        }
    }

    pub fn version(&self) -> &'static str {
        VERSION
    }

    /// The identity allowed to rebind principals
    pub fn admin(&self) -> Address {
        self.admin
    }

    /// Create and bind a fresh, unconfigured mirror for `principal`
    ///
    /// `caller` becomes the mirror's admin. A `MirrorCreated` event is
    /// journaled on success.
    ///
    /// # Errors
    ///
    /// `InvalidAddress` if `principal` is zero or the sentinel,
    /// `DirectoryConflict` if `principal` already has a mirror.
    pub fn create_mirror(
        &mut self,
        mirrors: &mut MirrorArena,
        journal: &mut Journal,
        caller: Address,
        principal: Address,
        defaults: MirrorDefaults,
    ) -> Result<MirrorId> {
        MutationValidator::ensure_well_formed(&principal)?;
        if let Some(existing) = self.bindings.get(&principal) {
            return Err(Error::DirectoryConflict {
                principal,
                mirror: *existing,
            });
        }
        MutationValidator::ensure_sync_limit(defaults.max_sync_owners)?;

        let id = self.derive_id(mirrors, principal);
        mirrors.insert(MirrorState::new(id, principal, caller, defaults));
        self.entries.push(DirectoryEntry {
            principal,
            mirror: id,
            created_at: Utc::now(),
        });
        self.bindings.insert(principal, id);
        journal.record(Event::MirrorCreated {
            principal,
            mirror: id,
        });

        info!(principal = %principal, mirror = %id, caller = %caller, "mirror created");
        Ok(id)
    }

    /// Create a mirror whose principal is the caller itself
    pub fn attach_self(
        &mut self,
        mirrors: &mut MirrorArena,
        journal: &mut Journal,
        caller: Address,
        defaults: MirrorDefaults,
    ) -> Result<MirrorId> {
        self.create_mirror(mirrors, journal, caller, caller, defaults)
    }

    /// Point `principal` at an existing mirror, returning the previous binding
    ///
    /// The mirror's own owner list is left untouched.
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` is the directory admin,
    /// `InvalidAddress` for a malformed principal, `MirrorNotFound` if the
    /// directory never created `mirror`.
    pub fn rebind(
        &mut self,
        journal: &mut Journal,
        caller: Address,
        principal: Address,
        mirror: MirrorId,
    ) -> Result<Option<MirrorId>> {
        if caller != self.admin {
            return Err(Error::Unauthorized { caller });
        }
        MutationValidator::ensure_well_formed(&principal)?;
        if !self.is_mirror(&mirror) {
            return Err(Error::MirrorNotFound {
                key: mirror.to_string(),
            });
        }

        let previous = self.bindings.insert(principal, mirror);
        journal.record(Event::MirrorRebound {
            principal,
            previous,
            mirror,
        });

        info!(principal = %principal, mirror = %mirror, ?previous, "principal rebound");
        Ok(previous)
    }

    pub fn get_mirror_for(&self, principal: &Address) -> Option<MirrorId> {
        self.bindings.get(principal).copied()
    }

    pub fn has_mirror(&self, principal: &Address) -> bool {
        self.bindings.contains_key(principal)
    }

    /// Number of mirrors created
    pub fn mirror_count(&self) -> usize {
        self.entries.len()
    }

    /// Mirror ids in creation order
    pub fn list_mirrors(&self) -> Vec<MirrorId> {
        self.entries.iter().map(|e| e.mirror).collect()
    }

    /// Whether this directory created `mirror`
    pub fn is_mirror(&self, mirror: &MirrorId) -> bool {
        self.entries.iter().any(|e| e.mirror == *mirror)
    }

    pub fn mirror_at(&self, index: usize) -> Option<MirrorId> {
        self.entries.get(index).map(|e| e.mirror)
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Current `principal -> mirror` bindings
    pub fn bindings(&self) -> impl Iterator<Item = (&Address, &MirrorId)> {
        self.bindings.iter()
    }

    /// Every mirror must be filed under its own id, and every entry and
    /// binding must refer to a mirror in `mirrors`
    pub(crate) fn check_consistency(&self, mirrors: &MirrorArena) -> Result<()> {
        for (key, mirror) in mirrors.keyed() {
            if *key != mirror.id() {
                return Err(Error::corrupt(format!(
                    "mirror {} is stored under {key}",
                    mirror.id()
                )));
            }
        }
        for entry in &self.entries {
            if !mirrors.contains(&entry.mirror) {
                return Err(Error::corrupt(format!(
                    "directory entry for {} refers to missing mirror {}",
                    entry.principal, entry.mirror
                )));
            }
        }
        for (principal, mirror) in &self.bindings {
            if !self.is_mirror(mirror) {
                return Err(Error::corrupt(format!(
                    "principal {principal} is bound to unknown mirror {mirror}"
                )));
            }
        }
        if mirrors.len() != self.entries.len() {
            return Err(Error::corrupt(format!(
                "{} mirror(s) stored but {} created",
                mirrors.len(),
                self.entries.len()
            )));
        }
        Ok(())
    }

    /// Deterministic id for the next mirror
    ///
    /// Hashes the admin, the principal, and a nonce starting at the creation
    /// index; moves to the next nonce if the result is reserved or taken.
    fn derive_id(&self, mirrors: &MirrorArena, principal: Address) -> MirrorId {
        let mut nonce = self.entries.len() as u64;
        loop {
            let mut hasher = Sha256::new();
            hasher.update(b"mirror");
            hasher.update(self.admin.as_bytes());
            hasher.update(principal.as_bytes());
            hasher.update(nonce.to_be_bytes());
            let digest = hasher.finalize();

            let mut bytes = [0u8; ADDRESS_LEN];
            bytes.copy_from_slice(&digest[..ADDRESS_LEN]);
            let id = MirrorId::new(Address::from_bytes(bytes));
            if id.as_address().is_assignable() && !mirrors.contains(&id) {
                return id;
            }
            nonce += 1;
        }
    }
}
