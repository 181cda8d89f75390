use std::collections::HashSet;

use mirror_core::{
    Address, MirrorDefaults, MirrorId, MirrorState, OwnerSet, StaticAuthority, SyncEngine,
};
use mirror_test_utils::{addr, ADMIN, PRINCIPAL};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert(u8, usize),
    Remove(u8, usize),
    Replace(u8, u8),
    Threshold(usize),
    WrongPrev(u8, u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u8..40, 0usize..8).prop_map(|(a, t)| Op::Insert(a, t)),
        (1u8..40, 0usize..8).prop_map(|(a, t)| Op::Remove(a, t)),
        (1u8..40, 1u8..40).prop_map(|(a, b)| Op::Replace(a, b)),
        (0usize..8).prop_map(Op::Threshold),
        (1u8..40, 1u8..40).prop_map(|(a, b)| Op::WrongPrev(a, b)),
    ]
}

fn assert_well_formed(set: &OwnerSet) -> Result<(), TestCaseError> {
    let owners = set.to_vec();
    let distinct: HashSet<&Address> = owners.iter().collect();
    prop_assert_eq!(distinct.len(), owners.len());
    prop_assert_eq!(owners.len(), set.len());
    prop_assert!(owners.iter().all(|a| a.is_assignable()));
    if let Some(last) = owners.last() {
        prop_assert_eq!(set.tail(), *last);
    }
    Ok(())
}

proptest! {
    #[test]
    fn mutations_preserve_list_and_threshold_invariants(
        initial in 1usize..6,
        ops in prop::collection::vec(op(), 1..60),
    ) {
        let owners: Vec<Address> = (1..=initial as u8).map(addr).collect();
        let authority = StaticAuthority::new(owners, 1);
        let mut mirror = MirrorState::new(
            MirrorId::new(addr(250)),
            PRINCIPAL,
            ADMIN,
            MirrorDefaults::default(),
        );
        SyncEngine::new(&authority).configure(&mut mirror).unwrap();

        for op in ops {
            let before = mirror.clone();
            let result = match op {
                Op::Insert(a, t) => mirror.insert_owner(addr(a), t),
                Op::Remove(a, t) => {
                    let prev = mirror.owner_set().predecessor_of(&addr(a)).unwrap_or(addr(a));
                    mirror.remove_owner(prev, addr(a), t)
                }
                Op::Replace(a, b) => {
                    let prev = mirror.owner_set().predecessor_of(&addr(a)).unwrap_or(addr(a));
                    mirror.replace_owner(prev, addr(a), addr(b))
                }
                Op::Threshold(t) => mirror.change_threshold(t),
                Op::WrongPrev(p, a) => {
                    let actual = mirror.owner_set().predecessor_of(&addr(a));
                    if actual == Some(addr(p)) {
                        continue;
                    }
                    mirror.remove_owner(addr(p), addr(a), 1)
                }
            };

            if result.is_err() {
                prop_assert_eq!(&mirror, &before);
            }
            assert_well_formed(mirror.owner_set())?;
            prop_assert!(mirror.threshold() >= 1);
            prop_assert!(mirror.threshold() <= mirror.owner_count());
            prop_assert!(mirror.synced_count() <= mirror.owner_count());
            prop_assert!(mirror.check_invariants().is_ok());
        }
    }

    #[test]
    fn batches_resume_to_the_same_result(
        count in 1usize..30,
        limit in 1usize..12,
    ) {
        let owners: Vec<Address> = (1..=count as u8).map(addr).collect();
        let authority = StaticAuthority::new(owners.clone(), 1);
        let engine = SyncEngine::new(&authority);
        let mut mirror = MirrorState::new(
            MirrorId::new(addr(250)),
            PRINCIPAL,
            ADMIN,
            MirrorDefaults { max_sync_owners: limit, ..MirrorDefaults::default() },
        );

        let mut calls = 0;
        while !engine.sync_batch(&mut mirror).unwrap().fully_synced {
            calls += 1;
            prop_assert!(mirror.synced_count() <= count);
        }
        calls += 1;

        prop_assert_eq!(calls, count.div_ceil(limit));
        prop_assert_eq!(mirror.owners(), owners);
    }
}
