//! Read-only views of a mirror's sync state

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorPhase {
    /// Created but never configured
    Unconfigured,
    /// Configured, authoritative owners remain to be mirrored
    PartiallySynced,
    /// Every authoritative owner has been processed
    FullySynced,
}

impl fmt::Display for MirrorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconfigured => write!(f, "unconfigured"),
            Self::PartiallySynced => write!(f, "partially synced"),
            Self::FullySynced => write!(f, "fully synced"),
        }
    }
}

/// Sync progress and settings of a mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub synced_count: usize,
    pub is_complete: bool,
    pub current_limit: usize,
    pub auto_sync_enabled: bool,
    pub require_full_sync: bool,
}

impl SyncStatus {
    /// Human-readable progress, optionally against the authoritative total
    pub fn describe(&self, authoritative_total: Option<usize>) -> String {
        if self.is_complete {
            return format!("synced ({} owners)", self.synced_count);
        }
        match authoritative_total {
            Some(total) => format!("partially synced ({}/{})", self.synced_count, total),
            None => format!("partially synced ({} owners)", self.synced_count),
        }
    }
}

/// Threshold rendered as `t/n`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdDisplay {
    pub threshold: usize,
    pub owners: usize,
}

impl fmt::Display for ThresholdDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.threshold, self.owners)
    }
}
