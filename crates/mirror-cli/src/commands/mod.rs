//! Command implementations for mirror-cli

pub mod directory;
pub mod init;
pub mod owners;
pub mod settings;
pub mod status;
pub mod sync;

pub use directory::{run_attach, run_create, run_list, run_rebind};
pub use init::run_init;
pub use owners::{run_add_owner, run_change_threshold, run_remove_owner, run_replace_owner};
pub use settings::{run_authorize, run_set_auto_sync, run_set_limit, run_set_require_full_sync};
pub use status::{run_events, run_status};
pub use sync::{run_check, run_configure, run_sync};
