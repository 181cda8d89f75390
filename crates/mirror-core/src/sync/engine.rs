//! SyncEngine implementation
//!
//! The SyncEngine reconciles a mirror's owner list against the authoritative
//! registry in bounded batches. Every call re-reads the authoritative owners
//! and the mirror's persisted cursor; nothing is cached between calls.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::address::Address;
use crate::authority::AuthoritativeRegistry;
use crate::mirror::MirrorState;
use crate::owners::MAX_OWNERS;
use crate::validator::MutationValidator;
use crate::{Error, Result};

use super::check::{DriftReport, DriftStatus};

/// Result of one sync step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Whether every authoritative owner has now been processed
    pub fully_synced: bool,
    /// The mirror's synced count after the step
    pub synced_count: usize,
    /// Owners appended to the mirror, in authoritative order
    pub appended: Vec<Address>,
    /// Authoritative entries passed over without being appended
    pub skipped: Vec<Address>,
    /// Set when this step configured the mirror
    pub configured: bool,
}

impl BatchOutcome {
    fn unchanged(synced_count: usize, fully_synced: bool) -> Self {
        Self {
            fully_synced,
            synced_count,
            appended: Vec::new(),
            skipped: Vec::new(),
            configured: false,
        }
    }
}

/// Report from [`SyncEngine::sync_until_complete`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRun {
    /// Number of batches executed
    pub batches: usize,
    pub fully_synced: bool,
    pub synced_count: usize,
    pub appended: Vec<Address>,
}

/// The authoritative window a batch covers, computed before any mutation
struct BatchPlan {
    append: Vec<Address>,
    skipped: Vec<Address>,
    cursor_end: usize,
}

/// Engine for reconciling mirrors against an authoritative registry
///
/// Sync steps are explicit and synchronous: the engine never schedules work
/// and never reacts to a mirror's `auto_sync` flag on its own.
pub struct SyncEngine<'a, A: AuthoritativeRegistry + ?Sized> {
    authority: &'a A,
}

impl<'a, A: AuthoritativeRegistry + ?Sized> SyncEngine<'a, A> {
    /// Create a new SyncEngine reading from `authority`
    pub fn new(authority: &'a A) -> Self {
        Self { authority }
    }

    /// Configure an unconfigured mirror from the authoritative registry
    ///
    /// Copies up to `max_sync_owners` authoritative owners in order and the
    /// authoritative threshold, clamped to the number of owners copied.
    ///
    /// # Errors
    ///
    /// `AlreadyConfigured` if the mirror is configured, `InvalidThreshold` if
    /// the authoritative registry has no owners, a zero threshold, or no
    /// owner that can be mirrored.
    pub fn configure(&self, mirror: &mut MirrorState) -> Result<BatchOutcome> {
        if mirror.is_configured() {
            return Err(Error::AlreadyConfigured);
        }

        let authoritative = self.authority.owners()?;
        let authoritative_threshold = self.authority.threshold()?;
        if authoritative_threshold == 0 || authoritative.is_empty() {
            return Err(Error::InvalidThreshold {
                threshold: authoritative_threshold,
                owners: authoritative.len(),
            });
        }

        let plan = plan_batch(mirror, &authoritative, 0);
        if plan.append.is_empty() {
            return Err(Error::InvalidThreshold {
                threshold: authoritative_threshold,
                owners: 0,
            });
        }

        let threshold = authoritative_threshold.min(plan.append.len());
        if threshold != authoritative_threshold {
            warn!(
                mirror = %mirror.id(),
                authoritative = authoritative_threshold,
                mirrored = threshold,
                "threshold clamped to the owners copied in the first batch"
            );
        }

        for owner in &plan.append {
            mirror.owners.link_back(*owner);
        }
        mirror.configured = true;
        mirror.threshold = threshold;
        let fully_synced = apply_cursor(mirror, plan.cursor_end, authoritative.len());

        info!(
            mirror = %mirror.id(),
            owners = mirror.owner_count(),
            threshold,
            fully_synced,
            "mirror configured"
        );

        Ok(BatchOutcome {
            fully_synced,
            synced_count: mirror.synced_count,
            appended: plan.append,
            skipped: plan.skipped,
            configured: true,
        })
    }

    /// Run one bounded sync step
    ///
    /// On an unconfigured mirror this is the configure step. Otherwise it
    /// appends up to `max_sync_owners` authoritative owners past the cursor.
    /// Completeness is always measured against the current authoritative
    /// count, so a registry that shrank since the last step reports a partial
    /// sync once before settling.
    pub fn sync_batch(&self, mirror: &mut MirrorState) -> Result<BatchOutcome> {
        if !mirror.is_configured() {
            return self.configure(mirror);
        }

        let authoritative = self.authority.owners()?;
        let total = authoritative.len();
        let cursor = mirror.sync_cursor;

        if cursor == total {
            if !mirror.sync_complete {
                debug!(mirror = %mirror.id(), "sync complete");
            }
            mirror.sync_complete = true;
            return Ok(BatchOutcome::unchanged(mirror.synced_count, true));
        }

        if cursor > total {
            warn!(
                mirror = %mirror.id(),
                synced = cursor,
                authoritative = total,
                "authoritative owner set shrank; mirror marked partially synced"
            );
            mirror.sync_cursor = total;
            mirror.synced_count = mirror.synced_count.min(total);
            mirror.sync_complete = false;
            return Ok(BatchOutcome::unchanged(mirror.synced_count, false));
        }

        let plan = plan_batch(mirror, &authoritative, cursor);
        for owner in &plan.append {
            mirror.owners.link_back(*owner);
        }
        let fully_synced = apply_cursor(mirror, plan.cursor_end, total);

        info!(
            mirror = %mirror.id(),
            appended = plan.append.len(),
            synced = mirror.synced_count,
            authoritative = total,
            fully_synced,
            "sync batch applied"
        );

        Ok(BatchOutcome {
            fully_synced,
            synced_count: mirror.synced_count,
            appended: plan.append,
            skipped: plan.skipped,
            configured: false,
        })
    }

    /// Repeat [`Self::sync_batch`] until complete or `max_batches` have run
    ///
    /// Stops early when a batch makes no progress.
    pub fn sync_until_complete(&self, mirror: &mut MirrorState, max_batches: usize) -> Result<SyncRun> {
        let mut run = SyncRun {
            batches: 0,
            fully_synced: mirror.is_configured() && mirror.is_sync_complete(),
            synced_count: mirror.synced_count(),
            appended: Vec::new(),
        };

        while run.batches < max_batches {
            let before = (mirror.sync_cursor(), mirror.is_sync_complete());
            let outcome = self.sync_batch(mirror)?;
            run.batches += 1;
            run.fully_synced = outcome.fully_synced;
            run.synced_count = outcome.synced_count;
            run.appended.extend(outcome.appended);

            if outcome.fully_synced {
                break;
            }
            let stalled = (mirror.sync_cursor(), mirror.is_sync_complete()) == before;
            if stalled && !outcome.configured {
                debug!(mirror = %mirror.id(), "sync made no progress");
                break;
            }
        }
        Ok(run)
    }

    /// Compare the mirror against the authoritative registry without changing it
    pub fn check(&self, mirror: &MirrorState) -> Result<DriftReport> {
        let authoritative = self.authority.owners()?;
        let authoritative_threshold = self.authority.threshold()?;
        let mirrored = mirror.owners();

        let mirrored_set: HashSet<&Address> = mirrored.iter().collect();
        let authoritative_set: HashSet<&Address> = authoritative.iter().collect();
        let missing: Vec<Address> = authoritative
            .iter()
            .filter(|a| !mirrored_set.contains(a))
            .copied()
            .collect();
        let extra: Vec<Address> = mirrored
            .iter()
            .filter(|a| !authoritative_set.contains(a))
            .copied()
            .collect();

        let mut messages = Vec::new();
        let status = if !mirror.is_configured() {
            DriftStatus::Unconfigured
        } else if !mirror.is_sync_complete() {
            messages.push(format!(
                "{} of {} authoritative owner(s) processed",
                mirror.synced_count(),
                authoritative.len()
            ));
            DriftStatus::Partial
        } else {
            if mirrored.len() != authoritative.len() {
                messages.push(format!(
                    "owner count differs: mirror {} vs authoritative {}",
                    mirrored.len(),
                    authoritative.len()
                ));
            }
            if mirror.threshold() != authoritative_threshold {
                messages.push(format!(
                    "threshold differs: mirror {} vs authoritative {}",
                    mirror.threshold(),
                    authoritative_threshold
                ));
            }
            if messages.is_empty() && missing.is_empty() && extra.is_empty() {
                DriftStatus::InSync
            } else {
                DriftStatus::Drifted
            }
        };

        Ok(DriftReport {
            status,
            mirror_threshold: mirror.threshold(),
            authoritative_threshold,
            mirror_owners: mirrored.len(),
            authoritative_owners: authoritative.len(),
            synced_count: mirror.synced_count(),
            missing,
            extra,
            messages,
        })
    }
}

/// Decide which entries of `authoritative[cursor..]` the next batch appends
///
/// Entries that are already mirrored, reserved, or equal to the mirror's own
/// id are passed over. The window stops early when the mirror is full so
/// those owners are picked up once room is made.
fn plan_batch(mirror: &MirrorState, authoritative: &[Address], cursor: usize) -> BatchPlan {
    let window_end = (cursor + mirror.max_sync_owners()).min(authoritative.len());
    let mut planned: HashSet<Address> = HashSet::new();
    let mut plan = BatchPlan {
        append: Vec::new(),
        skipped: Vec::new(),
        cursor_end: window_end,
    };

    for (index, owner) in authoritative[cursor..window_end].iter().enumerate() {
        let mirrorable =
            MutationValidator::ensure_candidate(mirror.owner_set(), mirror.id(), owner).is_ok()
                && !planned.contains(owner);
        if !mirrorable {
            debug!(mirror = %mirror.id(), owner = %owner, "authoritative entry skipped");
            plan.skipped.push(*owner);
            continue;
        }
        if mirror.owner_count() + plan.append.len() >= MAX_OWNERS {
            warn!(mirror = %mirror.id(), "mirror is full; batch stopped early");
            plan.cursor_end = cursor + index;
            break;
        }
        planned.insert(*owner);
        plan.append.push(*owner);
    }
    plan
}

/// Advance the cursor and recompute completeness against `total`
fn apply_cursor(mirror: &mut MirrorState, cursor_end: usize, total: usize) -> bool {
    let fully_synced = cursor_end == total;
    mirror.sync_cursor = cursor_end;
    mirror.synced_count = cursor_end.min(mirror.owner_count());
    mirror.sync_complete = fully_synced;
    fully_synced
}
