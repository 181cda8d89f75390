//! Append-only journal of applied operations
//!
//! Only successful operations are recorded. Entries are never rewritten.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address::{Address, MirrorId};

/// An applied change to the directory or a mirror
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    MirrorCreated {
        principal: Address,
        mirror: MirrorId,
    },
    MirrorRebound {
        principal: Address,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        previous: Option<MirrorId>,
        mirror: MirrorId,
    },
    Configured {
        mirror: MirrorId,
        owners: usize,
        threshold: usize,
    },
    OwnerAdded {
        mirror: MirrorId,
        owner: Address,
        threshold: usize,
    },
    OwnerRemoved {
        mirror: MirrorId,
        owner: Address,
        threshold: usize,
    },
    OwnerReplaced {
        mirror: MirrorId,
        old: Address,
        new: Address,
    },
    ThresholdChanged {
        mirror: MirrorId,
        threshold: usize,
    },
    OwnersSynced {
        mirror: MirrorId,
        count: usize,
        complete: bool,
    },
    /// Snapshot of the settings after the change
    SettingsChanged {
        mirror: MirrorId,
        max_sync_owners: usize,
        auto_sync: bool,
        require_full_sync: bool,
    },
}

impl Event {
    /// The mirror this event concerns
    pub fn mirror(&self) -> MirrorId {
        match self {
            Self::MirrorCreated { mirror, .. }
            | Self::MirrorRebound { mirror, .. }
            | Self::Configured { mirror, .. }
            | Self::OwnerAdded { mirror, .. }
            | Self::OwnerRemoved { mirror, .. }
            | Self::OwnerReplaced { mirror, .. }
            | Self::ThresholdChanged { mirror, .. }
            | Self::OwnersSynced { mirror, .. }
            | Self::SettingsChanged { mirror, .. } => *mirror,
        }
    }

    /// Short name used in listings
    pub fn name(&self) -> &'static str {
        match self {
            Self::MirrorCreated { .. } => "mirror_created",
            Self::MirrorRebound { .. } => "mirror_rebound",
            Self::Configured { .. } => "configured",
            Self::OwnerAdded { .. } => "owner_added",
            Self::OwnerRemoved { .. } => "owner_removed",
            Self::OwnerReplaced { .. } => "owner_replaced",
            Self::ThresholdChanged { .. } => "threshold_changed",
            Self::OwnersSynced { .. } => "owners_synced",
            Self::SettingsChanged { .. } => "settings_changed",
        }
    }
}

/// A journaled event with the time it was applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub at: DateTime<Utc>,
    pub event: Event,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: Event) {
        self.entries.push(JournalEntry {
            at: Utc::now(),
            event,
        });
    }

    /// All entries, oldest first
    pub fn events(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries concerning one mirror, oldest first
    pub fn for_mirror(&self, mirror: MirrorId) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter().filter(move |e| e.event.mirror() == mirror)
    }
}
