//! The authoritative owner registry a mirror follows
//!
//! The core only reads from it through [`AuthoritativeRegistry`]. The
//! delegate hook in [`DelegateAuthorization`] is driven by the control
//! application, never by the core.

use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::io::Read;
use std::path::Path;

use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::address::{Address, MirrorId};

/// Read access to the authoritative owner list and threshold
pub trait AuthoritativeRegistry {
    /// Owners in authoritative order
    fn owners(&self) -> Result<Vec<Address>>;

    fn threshold(&self) -> Result<usize>;
}

/// Governance hook: the authoritative registry recognizes a mirror as its delegate
pub trait DelegateAuthorization {
    /// Returns false if the mirror was already a delegate
    fn authorize_delegate(&mut self, mirror: MirrorId) -> bool;

    /// Returns false if the mirror was not a delegate
    fn revoke_delegate(&mut self, mirror: MirrorId) -> bool;

    fn is_delegate(&self, mirror: MirrorId) -> bool;
}

/// An authoritative registry held in memory, optionally backed by a TOML file
///
/// ```
/// use mirror_core::{Address, AuthoritativeRegistry, StaticAuthority};
///
/// let a: Address = "0x00000000000000000000000000000000000000aa".parse().unwrap();
/// let authority = StaticAuthority::new(vec![a], 1);
/// assert_eq!(authority.owners().unwrap(), vec![a]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticAuthority {
    threshold: usize,
    owners: Vec<Address>,
    #[serde(default)]
    delegates: BTreeSet<MirrorId>,
}

impl StaticAuthority {
    pub fn new(owners: Vec<Address>, threshold: usize) -> Self {
        Self {
            threshold,
            owners,
            delegates: BTreeSet::new(),
        }
    }

    pub fn set_owners(&mut self, owners: Vec<Address>) {
        self.owners = owners;
    }

    pub fn set_threshold(&mut self, threshold: usize) {
        self.threshold = threshold;
    }

    pub fn push_owner(&mut self, owner: Address) {
        self.owners.push(owner);
    }

    /// Drop an owner, returning whether it was present
    pub fn remove_owner(&mut self, owner: &Address) -> bool {
        let before = self.owners.len();
        self.owners.retain(|o| o != owner);
        self.owners.len() != before
    }

    pub fn delegates(&self) -> impl Iterator<Item = &MirrorId> {
        self.delegates.iter()
    }

    /// Load from a TOML file with a shared lock
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, locked, or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        file.lock_shared()?;

        let mut content = String::new();
        (&file).read_to_string(&mut content)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save to a TOML file atomically with an exclusive lock
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
}

impl AuthoritativeRegistry for StaticAuthority {
    fn owners(&self) -> Result<Vec<Address>> {
        Ok(self.owners.clone())
    }

    fn threshold(&self) -> Result<usize> {
        Ok(self.threshold)
    }
}

impl DelegateAuthorization for StaticAuthority {
    fn authorize_delegate(&mut self, mirror: MirrorId) -> bool {
        self.delegates.insert(mirror)
    }

    fn revoke_delegate(&mut self, mirror: MirrorId) -> bool {
        self.delegates.remove(&mirror)
    }

    fn is_delegate(&self, mirror: MirrorId) -> bool {
        self.delegates.contains(&mirror)
    }
}
