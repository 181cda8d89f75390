//! Scenario tests over a registry root on disk
//!
//! Each scenario reloads `state.toml` between steps the way separate CLI
//! invocations would, and changes the authority file underneath the mirror.

use mirror_core::{
    AuthoritativeRegistry, DelegateAuthorization, DriftStatus, ErrorKind, MirrorDefaults,
    MirrorPhase, RegistryState,
};
use mirror_test_utils::{ADMIN, PRINCIPAL, TestRegistry, addr, addrs};

fn defaults(limit: usize) -> MirrorDefaults {
    MirrorDefaults {
        max_sync_owners: limit,
        ..MirrorDefaults::default()
    }
}

/// Create the principal's mirror and persist it
fn create(registry: &TestRegistry, limit: usize) -> mirror_core::MirrorId {
    let mut state = registry.state();
    let id = state.create_mirror(ADMIN, PRINCIPAL, defaults(limit)).unwrap();
    registry.write_state(&state);
    id
}

/// One sync step as its own load/save cycle
fn sync_step(registry: &TestRegistry) -> usize {
    let mut state = registry.state();
    let id = state.resolve(&PRINCIPAL).unwrap();
    let outcome = state.sync_batch(&id, &registry.authority()).unwrap();
    registry.write_state(&state);
    outcome.synced_count
}

// =============================================================================
// Lifecycle
// =============================================================================

mod lifecycle {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn create_sync_mutate_reload() {
        let registry = TestRegistry::new().with_authority(&addrs(&[1, 2, 3]), 2);
        let id = create(&registry, 10);
        assert_eq!(registry.state().mirror(&id).unwrap().phase(), MirrorPhase::Unconfigured);

        assert_eq!(sync_step(&registry), 3);

        let mut state = registry.state();
        state.remove_owner(&id, addr(1), addr(2), 1).unwrap();
        registry.write_state(&state);

        let state = registry.state();
        let mirror = state.mirror(&id).unwrap();
        assert_eq!(mirror.owners(), addrs(&[1, 3]));
        assert_eq!(mirror.threshold(), 1);
        assert_eq!(mirror.phase(), MirrorPhase::FullySynced);

        let names: Vec<&str> = state.journal().events().iter().map(|e| e.event.name()).collect();
        assert_eq!(names, ["mirror_created", "configured", "owners_synced", "owner_removed"]);
    }

    #[test]
    fn resumes_across_reloads() {
        let registry = TestRegistry::new().with_authority(&addrs(&[1, 2, 3, 4, 5]), 3);
        let id = create(&registry, 2);

        let counts: Vec<usize> = (0..3).map(|_| sync_step(&registry)).collect();
        assert_eq!(counts, vec![2, 4, 5]);

        let before = registry.state();
        assert_eq!(sync_step(&registry), 5);
        assert_eq!(registry.state().mirror(&id).unwrap(), before.mirror(&id).unwrap());
        assert_eq!(registry.state().mirror(&id).unwrap().threshold(), 2);
    }
}

// =============================================================================
// Authority changes between syncs
// =============================================================================

mod authority_changes {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn growth_is_picked_up() {
        let registry = TestRegistry::new().with_authority(&addrs(&[1, 2]), 1);
        let id = create(&registry, 10);
        sync_step(&registry);

        let mut authority = registry.authority();
        authority.push_owner(addr(3));
        registry.write_authority(&authority);

        let state = registry.state();
        let report = state.check(&id, &registry.authority()).unwrap();
        assert_eq!(report.status, DriftStatus::Drifted);
        assert_eq!(report.missing, vec![addr(3)]);

        assert_eq!(sync_step(&registry), 3);
        let state = registry.state();
        assert_eq!(state.mirror(&id).unwrap().owners(), addrs(&[1, 2, 3]));
        assert_eq!(
            state.check(&id, &registry.authority()).unwrap().status,
            DriftStatus::InSync
        );
    }

    #[test]
    fn shrink_reports_partial_once() {
        let registry = TestRegistry::new().with_authority(&addrs(&[1, 2, 3]), 1);
        let id = create(&registry, 10);
        sync_step(&registry);

        let mut authority = registry.authority();
        assert!(authority.remove_owner(&addr(3)));
        registry.write_authority(&authority);

        let mut state = registry.state();
        let first = state.sync_batch(&id, &authority).unwrap();
        assert!(!first.fully_synced);
        assert_eq!(first.synced_count, 2);

        let second = state.sync_batch(&id, &authority).unwrap();
        assert!(second.fully_synced);

        // local owners are never removed by a sync
        let report = state.check(&id, &authority).unwrap();
        assert_eq!(report.extra, vec![addr(3)]);
        assert_eq!(report.status, DriftStatus::Drifted);
    }

    #[test]
    fn empty_authority_cannot_configure() {
        let registry = TestRegistry::new();
        let id = create(&registry, 10);

        let mut state = registry.state();
        let err = state.sync_batch(&id, &registry.authority()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidThreshold);
        assert!(!state.mirror(&id).unwrap().is_configured());
    }
}

// =============================================================================
// Directory
// =============================================================================

mod directory {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rebind_shares_one_mirror() {
        let registry = TestRegistry::new().with_authority(&addrs(&[1]), 1);
        let id = create(&registry, 10);
        sync_step(&registry);

        let mut state = registry.state();
        let other = addr(40);
        assert_eq!(
            state.rebind(addr(41), other, id).unwrap_err().kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(state.rebind(ADMIN, other, id).unwrap(), None);
        registry.write_state(&state);

        let state = registry.state();
        assert_eq!(state.resolve(&other).unwrap(), id);
        assert_eq!(state.mirror_for(&other).unwrap().owners(), addrs(&[1]));
        assert_eq!(state.directory().mirror_count(), 1);
    }

    #[test]
    fn attach_and_create_are_exclusive() {
        let registry = TestRegistry::new();
        let mut state = registry.state();
        let caller = addr(50);

        let id = state.attach_self(caller, MirrorDefaults::default()).unwrap();
        assert_eq!(
            state
                .create_mirror(ADMIN, caller, MirrorDefaults::default())
                .unwrap_err()
                .kind(),
            ErrorKind::DirectoryConflict
        );
        assert_eq!(state.directory().list_mirrors(), vec![id]);
        assert_eq!(state.mirror(&id).unwrap().admin(), caller);
    }
}

// =============================================================================
// Delegates and persistence
// =============================================================================

mod persistence {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn delegate_survives_reload() {
        let registry = TestRegistry::new().with_authority(&addrs(&[1, 2]), 2);
        let id = create(&registry, 10);

        let mut authority = registry.authority();
        assert!(authority.authorize_delegate(id));
        assert!(!authority.authorize_delegate(id));
        registry.write_authority(&authority);

        let reloaded = registry.authority();
        assert!(reloaded.is_delegate(id));
        assert_eq!(reloaded.threshold().unwrap(), 2);
    }

    #[test]
    fn state_file_is_readable_toml() {
        let registry = TestRegistry::new().with_authority(&addrs(&[1]), 1);
        create(&registry, 10);
        sync_step(&registry);
        registry.assert_file_exists(".mirror/state.toml");

        let content = std::fs::read_to_string(registry.layout().state_path()).unwrap();
        assert!(content.contains("version = \"1.0\""));
        assert!(content.contains(&PRINCIPAL.to_string()));
    }

    #[test]
    fn journal_serializes_as_json() {
        let registry = TestRegistry::new().with_authority(&addrs(&[1]), 1);
        create(&registry, 10);

        let state = registry.state();
        let value = serde_json::to_value(state.journal().events()).unwrap();
        assert_eq!(value[0]["event"]["type"], "mirror_created");
    }

    #[test]
    fn fresh_state_round_trips_empty() {
        let registry = TestRegistry::new();
        let state: RegistryState = registry.state();
        assert_eq!(state.directory().mirror_count(), 0);
        assert!(state.journal().is_empty());
    }
}
