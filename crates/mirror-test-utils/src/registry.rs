//! [`TestRegistry`] builder for registry roots on disk.

use std::fs;
use std::path::{Path, PathBuf};

use mirror_core::{Address, Layout, Manifest, RegistryState, StaticAuthority};
use tempfile::TempDir;

use crate::ids::ADMIN;

/// A temporary registry root with `.mirror/config.toml`, `state.toml`, and
/// an authority file.
///
/// # Example
///
/// ```rust,no_run
/// use mirror_test_utils::{addrs, TestRegistry};
///
/// let registry = TestRegistry::new().with_authority(&addrs(&[1, 2, 3]), 2);
/// registry.assert_file_exists(".mirror/state.toml");
/// ```
pub struct TestRegistry {
    temp_dir: TempDir,
    layout: Layout,
}

impl Default for TestRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRegistry {
    /// Initialise a root administered by [`ADMIN`] with a default manifest.
    pub fn new() -> Self {
        Self::with_manifest(Manifest {
            directory: mirror_core::config::DirectorySection { admin: Some(ADMIN) },
            ..Manifest::default()
        })
    }

    /// Initialise a root with the given manifest.
    pub fn with_manifest(manifest: Manifest) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let layout = Layout::new(temp_dir.path());
        fs::create_dir_all(layout.config_dir()).unwrap();

        manifest.save(&layout.manifest_path()).unwrap();
        let admin = manifest.directory.admin.unwrap_or(ADMIN);
        RegistryState::new(admin).save(&layout.state_path()).unwrap();
        StaticAuthority::default()
            .save(&layout.authority_path(&manifest))
            .unwrap();

        Self { temp_dir, layout }
    }

    /// Replace the authority file contents.
    pub fn with_authority(self, owners: &[Address], threshold: usize) -> Self {
        self.write_authority(&StaticAuthority::new(owners.to_vec(), threshold));
        self
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn manifest(&self) -> Manifest {
        Manifest::load(&self.layout.manifest_path()).unwrap()
    }

    pub fn authority_path(&self) -> PathBuf {
        self.layout.authority_path(&self.manifest())
    }

    pub fn authority(&self) -> StaticAuthority {
        StaticAuthority::load(&self.authority_path()).unwrap()
    }

    pub fn write_authority(&self, authority: &StaticAuthority) {
        authority.save(&self.authority_path()).unwrap();
    }

    pub fn state(&self) -> RegistryState {
        RegistryState::load(&self.layout.state_path()).unwrap()
    }

    pub fn write_state(&self, state: &RegistryState) {
        state.save(&self.layout.state_path()).unwrap();
    }

    /// Assert that `rel` exists relative to the root.
    pub fn assert_file_exists(&self, rel: &str) {
        let path = self.root().join(rel);
        assert!(path.exists(), "expected {} to exist", path.display());
    }
}
