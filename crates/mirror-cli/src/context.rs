//! Registry root context
//!
//! Every command except `init` and `completions` runs against an
//! initialized root. The context loads the manifest once and hands out the
//! state and authority files it names.

use std::path::Path;

use mirror_core::{Address, Layout, Manifest, MirrorDefaults, RegistryState, StaticAuthority};

use crate::error::{CliError, Result};

/// An initialized registry root
pub struct Context {
    layout: Layout,
    manifest: Manifest,
    caller: Option<Address>,
}

impl Context {
    /// Open the registry at `root`
    ///
    /// # Errors
    ///
    /// A user error if `root` has not been initialized.
    pub fn open(root: &Path, caller: Option<Address>) -> Result<Self> {
        let layout = Layout::new(root);
        if !layout.is_initialized() {
            return Err(CliError::user(format!(
                "No registry at {}. Run `mirror init --admin <address>` first.",
                root.display()
            )));
        }
        let manifest = Manifest::load(&layout.manifest_path())?;
        Ok(Self {
            layout,
            manifest,
            caller,
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Settings for mirrors created from this root
    pub fn defaults(&self) -> MirrorDefaults {
        self.manifest.mirror_defaults()
    }

    /// The `--caller` identity, falling back to the directory admin
    pub fn caller(&self) -> Result<Address> {
        self.caller
            .or(self.manifest.directory.admin)
            .ok_or_else(|| CliError::user("No caller given. Pass --caller <address>."))
    }

    pub fn load_state(&self) -> Result<RegistryState> {
        Ok(RegistryState::load(&self.layout.state_path())?)
    }

    pub fn save_state(&self, state: &RegistryState) -> Result<()> {
        Ok(state.save(&self.layout.state_path())?)
    }

    /// Load the authoritative registry named by the manifest
    pub fn authority(&self) -> Result<StaticAuthority> {
        let path = self.layout.authority_path(&self.manifest);
        if !path.is_file() {
            return Err(CliError::user(format!(
                "No authoritative registry at {}",
                path.display()
            )));
        }
        Ok(StaticAuthority::load(&path)?)
    }

    /// The authoritative registry, or `None` when its file does not exist
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn authority_if_present(&self) -> Result<Option<StaticAuthority>> {
        let path = self.layout.authority_path(&self.manifest);
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(StaticAuthority::load(&path)?))
    }

    pub fn save_authority(&self, authority: &StaticAuthority) -> Result<()> {
        Ok(authority.save(&self.layout.authority_path(&self.manifest))?)
    }
}
