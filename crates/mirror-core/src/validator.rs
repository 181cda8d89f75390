//! Invariant checks run before every mutation
//!
//! Each check maps to exactly one error kind and never touches state, so
//! callers run all checks first and only then apply the change.

use tracing::debug;

use crate::address::{Address, MirrorId};
use crate::mirror::MirrorState;
use crate::owners::{MAX_OWNERS, OwnerSet};
use crate::{Error, Result};

/// Upper bound for a mirror's batch size
pub const MAX_SYNC_LIMIT: usize = 50;

/// Stateless predicate set for owner and threshold mutations
pub struct MutationValidator;

impl MutationValidator {
    /// The mirror must be configured and, if it demands it, fully synced
    ///
    /// This only reads the sync flags; it never runs a sync.
    pub fn ensure_mutable(mirror: &MirrorState) -> Result<()> {
        if !mirror.is_configured() {
            return Err(Error::NotConfigured);
        }
        if mirror.require_full_sync() && !mirror.is_sync_complete() {
            debug!(mirror = %mirror.id(), "mutation blocked until sync completes");
            return Err(Error::SyncRequired {
                synced: mirror.synced_count(),
            });
        }
        Ok(())
    }

    /// Non-zero and not the sentinel
    pub fn ensure_well_formed(address: &Address) -> Result<()> {
        if address.is_assignable() {
            Ok(())
        } else {
            Err(Error::invalid_address(address))
        }
    }

    /// A fresh owner: well-formed, not the mirror itself, not a member
    pub fn ensure_candidate(owners: &OwnerSet, mirror: MirrorId, candidate: &Address) -> Result<()> {
        Self::ensure_well_formed(candidate)?;
        if *candidate == mirror.as_address() {
            return Err(Error::invalid_address(candidate));
        }
        if owners.contains(candidate) {
            return Err(Error::DuplicateOwner {
                address: *candidate,
            });
        }
        Ok(())
    }

    pub fn ensure_member(owners: &OwnerSet, address: &Address) -> Result<()> {
        if owners.contains(address) {
            Ok(())
        } else {
            Err(Error::UnknownOwner { address: *address })
        }
    }

    /// `prev` must link to `target` (`SENTINEL` for the head)
    pub fn ensure_predecessor(owners: &OwnerSet, prev: &Address, target: &Address) -> Result<()> {
        if owners.is_predecessor(prev, target) {
            Ok(())
        } else {
            Err(Error::InvalidPredecessor {
                prev: *prev,
                target: *target,
            })
        }
    }

    /// Full check for an existing owner addressed by predecessor
    pub fn ensure_linked_member(owners: &OwnerSet, prev: &Address, target: &Address) -> Result<()> {
        Self::ensure_well_formed(target)?;
        Self::ensure_member(owners, target)?;
        Self::ensure_predecessor(owners, prev, target)
    }

    /// `1 <= threshold <= owner_count`
    pub fn ensure_threshold(threshold: usize, owner_count: usize) -> Result<()> {
        if threshold >= 1 && threshold <= owner_count {
            Ok(())
        } else {
            Err(Error::InvalidThreshold {
                threshold,
                owners: owner_count,
            })
        }
    }

    /// Room for one more owner
    pub fn ensure_capacity(owner_count: usize) -> Result<()> {
        if owner_count < MAX_OWNERS {
            Ok(())
        } else {
            Err(Error::LimitOutOfRange {
                value: owner_count + 1,
                max: MAX_OWNERS,
            })
        }
    }

    /// `1 <= limit <= MAX_SYNC_LIMIT`
    pub fn ensure_sync_limit(limit: usize) -> Result<()> {
        if (1..=MAX_SYNC_LIMIT).contains(&limit) {
            Ok(())
        } else {
            Err(Error::LimitOutOfRange {
                value: limit,
                max: MAX_SYNC_LIMIT,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::SENTINEL;
    use crate::ErrorKind;

    fn addr(n: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[0] = 0xcc;
        bytes[19] = n;
        Address::from_bytes(bytes)
    }

    fn owners(ns: &[u8]) -> OwnerSet {
        let mut set = OwnerSet::new();
        for n in ns {
            set.link_back(addr(*n));
        }
        set
    }

    #[test]
    fn candidate_rejections_map_to_one_kind_each() {
        let set = owners(&[1, 2]);
        let mirror = MirrorId::new(addr(99));

        let kind = |a: Address| {
            MutationValidator::ensure_candidate(&set, mirror, &a)
                .unwrap_err()
                .kind()
        };
        assert_eq!(kind(Address::ZERO), ErrorKind::InvalidAddress);
        assert_eq!(kind(SENTINEL), ErrorKind::InvalidAddress);
        assert_eq!(kind(addr(99)), ErrorKind::InvalidAddress);
        assert_eq!(kind(addr(2)), ErrorKind::DuplicateOwner);
        assert!(MutationValidator::ensure_candidate(&set, mirror, &addr(3)).is_ok());
    }

    #[test]
    fn linked_member_checks_in_order() {
        let set = owners(&[1, 2, 3]);

        let err = MutationValidator::ensure_linked_member(&set, &SENTINEL, &Address::ZERO);
        assert_eq!(err.unwrap_err().kind(), ErrorKind::InvalidAddress);

        let err = MutationValidator::ensure_linked_member(&set, &addr(1), &addr(7));
        assert_eq!(err.unwrap_err().kind(), ErrorKind::UnknownOwner);

        let err = MutationValidator::ensure_linked_member(&set, &addr(1), &addr(3));
        assert_eq!(err.unwrap_err().kind(), ErrorKind::InvalidPredecessor);

        assert!(MutationValidator::ensure_linked_member(&set, &addr(2), &addr(3)).is_ok());
        assert!(MutationValidator::ensure_linked_member(&set, &SENTINEL, &addr(1)).is_ok());
    }

    #[test]
    fn threshold_bounds() {
        assert!(MutationValidator::ensure_threshold(0, 3).is_err());
        assert!(MutationValidator::ensure_threshold(1, 3).is_ok());
        assert!(MutationValidator::ensure_threshold(3, 3).is_ok());
        assert!(MutationValidator::ensure_threshold(4, 3).is_err());
        assert!(MutationValidator::ensure_threshold(1, 0).is_err());
    }

    #[test]
    fn sync_limit_bounds() {
        assert!(MutationValidator::ensure_sync_limit(0).is_err());
        assert!(MutationValidator::ensure_sync_limit(1).is_ok());
        assert!(MutationValidator::ensure_sync_limit(MAX_SYNC_LIMIT).is_ok());
        assert_eq!(
            MutationValidator::ensure_sync_limit(MAX_SYNC_LIMIT + 1)
                .unwrap_err()
                .kind(),
            ErrorKind::LimitOutOfRange
        );
    }

    #[test]
    fn capacity_stops_at_max_owners() {
        assert!(MutationValidator::ensure_capacity(MAX_OWNERS - 1).is_ok());
        assert!(MutationValidator::ensure_capacity(MAX_OWNERS).is_err());
    }
}
