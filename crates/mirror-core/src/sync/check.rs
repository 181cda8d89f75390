//! Drift report types for mirror checks
//!
//! A check compares a mirror with the authoritative registry and reports how
//! far apart they are without changing anything.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::Address;

/// Outcome of a drift check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftStatus {
    /// The mirror was never configured
    Unconfigured,
    /// Owner set and threshold match the authoritative registry
    InSync,
    /// Sync has not processed every authoritative owner yet
    Partial,
    /// Fully synced, but owners or threshold differ
    Drifted,
}

impl DriftStatus {
    /// Whether the mirror needs attention
    pub fn is_out_of_sync(&self) -> bool {
        !matches!(self, Self::InSync)
    }
}

impl fmt::Display for DriftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconfigured => write!(f, "unconfigured"),
            Self::InSync => write!(f, "in sync"),
            Self::Partial => write!(f, "partially synced"),
            Self::Drifted => write!(f, "drifted"),
        }
    }
}

/// Report from [`super::SyncEngine::check`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftReport {
    pub status: DriftStatus,
    pub mirror_threshold: usize,
    pub authoritative_threshold: usize,
    pub mirror_owners: usize,
    pub authoritative_owners: usize,
    pub synced_count: usize,
    /// Authoritative owners absent from the mirror
    pub missing: Vec<Address>,
    /// Mirrored owners the authoritative registry does not list
    pub extra: Vec<Address>,
    pub messages: Vec<String>,
}

impl DriftReport {
    pub fn is_in_sync(&self) -> bool {
        self.status == DriftStatus::InSync
    }
}
