//! Core library for Owner Mirror
//!
//! Mirrors an authoritative owner set and approval threshold into per-principal
//! registries that can be changed locally and reconciled in bounded batches:
//!
//! - **Owner list**: sentinel-terminated linked set with O(1) insert at the
//!   head and O(1) removal given the predecessor
//! - **Mirror registry**: owner mutations gated on configuration and,
//!   optionally, on a completed sync
//! - **SyncEngine**: resumable batch reconciliation and drift checks
//! - **Directory**: one mirror per principal, with an admin-only rebind
//!
//! # Architecture
//!
//! ```text
//!              mirror-cli
//!                  |
//!            RegistryState  (state.toml, journal)
//!                  |
//!      +-----------+-----------+
//!      |           |           |
//!  Directory   MirrorState  SyncEngine --- AuthoritativeRegistry
//!                  |
//!        MutationValidator / OwnerSet
//! ```
//!
//! # Example
//!
//! ```
//! use mirror_core::{Address, MirrorDefaults, RegistryState, StaticAuthority};
//!
//! let a: Address = "0x000000000000000000000000000000000000000a".parse().unwrap();
//! let b: Address = "0x000000000000000000000000000000000000000b".parse().unwrap();
//! let admin: Address = "0x00000000000000000000000000000000000000ad".parse().unwrap();
//! let principal: Address = "0x00000000000000000000000000000000000000cc".parse().unwrap();
//!
//! let authority = StaticAuthority::new(vec![a, b], 2);
//! let mut state = RegistryState::new(admin);
//! let id = state.create_mirror(admin, principal, MirrorDefaults::default()).unwrap();
//!
//! let outcome = state.sync_batch(&id, &authority).unwrap();
//! assert!(outcome.fully_synced);
//! assert_eq!(state.mirror(&id).unwrap().owners(), vec![a, b]);
//! ```

pub mod address;
pub mod authority;
pub mod config;
pub mod directory;
pub mod error;
pub mod journal;
pub mod mirror;
pub mod owners;
pub mod store;
pub mod sync;
pub mod validator;

pub use address::{Address, MirrorId, SENTINEL};
pub use authority::{AuthoritativeRegistry, DelegateAuthorization, StaticAuthority};
pub use config::{Layout, Manifest};
pub use directory::{Directory, DirectoryEntry};
pub use error::{Error, ErrorKind, Result};
pub use journal::{Event, Journal, JournalEntry};
pub use mirror::{
    MirrorArena, MirrorDefaults, MirrorPhase, MirrorState, SyncStatus, ThresholdDisplay,
};
pub use owners::{MAX_OWNERS, OwnerSet};
pub use store::RegistryState;
pub use sync::{BatchOutcome, DriftReport, DriftStatus, SyncEngine, SyncRun};
pub use validator::{MAX_SYNC_LIMIT, MutationValidator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
