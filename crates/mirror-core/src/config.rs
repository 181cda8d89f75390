//! Configuration for a registry root
//!
//! A root directory holds a `.mirror/` folder with `config.toml` (the
//! [`Manifest`]), `state.toml` (the persisted registry), and the
//! authoritative registry file named by the manifest.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::mirror::{DEFAULT_MAX_SYNC_OWNERS, MirrorDefaults};
use crate::validator::MutationValidator;
use crate::Result;

/// Well-known paths below a registry root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorPath {
    /// The `.mirror` directory
    ConfigDir,
    /// `config.toml` inside the config directory
    Manifest,
    /// `state.toml` inside the config directory
    State,
}

impl MirrorPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigDir => ".mirror",
            Self::Manifest => "config.toml",
            Self::State => "state.toml",
        }
    }
}

impl AsRef<Path> for MirrorPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

/// Resolved file locations for a registry root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root.join(MirrorPath::ConfigDir)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.config_dir().join(MirrorPath::Manifest)
    }

    pub fn state_path(&self) -> PathBuf {
        self.config_dir().join(MirrorPath::State)
    }

    /// Authority file named by the manifest, relative to the config directory
    pub fn authority_path(&self, manifest: &Manifest) -> PathBuf {
        self.config_dir().join(&manifest.authority.path)
    }

    /// Whether `init` has run here
    pub fn is_initialized(&self) -> bool {
        self.manifest_path().is_file()
    }
}

fn default_max_sync_owners() -> usize {
    DEFAULT_MAX_SYNC_OWNERS
}

fn default_true() -> bool {
    true
}

fn default_authority_path() -> PathBuf {
    PathBuf::from("authority.toml")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySection {
    /// Identity allowed to rebind principals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<Address>,
}

/// Defaults applied to newly created mirrors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSection {
    #[serde(default = "default_max_sync_owners")]
    pub max_sync_owners: usize,
    #[serde(default = "default_true")]
    pub auto_sync: bool,
    #[serde(default)]
    pub require_full_sync: bool,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            max_sync_owners: default_max_sync_owners(),
            auto_sync: true,
            require_full_sync: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthoritySection {
    #[serde(default = "default_authority_path")]
    pub path: PathBuf,
}

impl Default for AuthoritySection {
    fn default() -> Self {
        Self {
            path: default_authority_path(),
        }
    }
}

/// Registry configuration parsed from `.mirror/config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub directory: DirectorySection,
    #[serde(default)]
    pub sync: SyncSection,
    #[serde(default)]
    pub authority: AuthoritySection,
}

impl Manifest {
    /// Parse and validate a manifest from TOML content
    ///
    /// # Example
    ///
    /// ```
    /// use mirror_core::config::Manifest;
    ///
    /// let manifest = Manifest::parse(r#"
    /// [sync]
    /// max_sync_owners = 2
    /// "#).unwrap();
    ///
    /// assert_eq!(manifest.sync.max_sync_owners, 2);
    /// assert!(manifest.sync.auto_sync);
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// # Errors
    ///
    /// `LimitOutOfRange` if `sync.max_sync_owners` is outside `1..=50`.
    pub fn validate(&self) -> Result<()> {
        MutationValidator::ensure_sync_limit(self.sync.max_sync_owners)
    }

    /// Settings handed to the directory for new mirrors
    pub fn mirror_defaults(&self) -> MirrorDefaults {
        MirrorDefaults {
            max_sync_owners: self.sync.max_sync_owners,
            auto_sync: self.sync.auto_sync,
            require_full_sync: self.sync.require_full_sync,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_manifest_uses_defaults() {
        let manifest = Manifest::parse("").unwrap();
        assert_eq!(manifest, Manifest::default());
        assert_eq!(manifest.mirror_defaults(), MirrorDefaults::default());
        assert_eq!(manifest.authority.path, PathBuf::from("authority.toml"));
    }

    #[test]
    fn parses_all_sections() {
        let manifest = Manifest::parse(
            r#"
[directory]
admin = "0x00000000000000000000000000000000000000ad"

[sync]
max_sync_owners = 5
auto_sync = false
require_full_sync = true

[authority]
path = "safe.toml"
"#,
        )
        .unwrap();

        assert!(manifest.directory.admin.is_some());
        assert_eq!(
            manifest.mirror_defaults(),
            MirrorDefaults {
                max_sync_owners: 5,
                auto_sync: false,
                require_full_sync: true,
            }
        );
        assert_eq!(manifest.authority.path, PathBuf::from("safe.toml"));
    }

    #[test]
    fn rejects_out_of_range_limit() {
        for content in ["[sync]\nmax_sync_owners = 0", "[sync]\nmax_sync_owners = 51"] {
            let err = Manifest::parse(content).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::LimitOutOfRange);
        }
    }

    #[test]
    fn layout_paths() {
        let layout = Layout::new("/work");
        let manifest = Manifest::default();
        assert_eq!(layout.manifest_path(), PathBuf::from("/work/.mirror/config.toml"));
        assert_eq!(layout.state_path(), PathBuf::from("/work/.mirror/state.toml"));
        assert_eq!(
            layout.authority_path(&manifest),
            PathBuf::from("/work/.mirror/authority.toml")
        );
    }
}
