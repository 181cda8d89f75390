//! Directory creation, lookup, and rebind

use mirror_core::{ErrorKind, Event, MirrorDefaults, RegistryState, StaticAuthority};
use mirror_test_utils::{addr, addrs, ADMIN};
use pretty_assertions::assert_eq;

#[test]
fn principal_has_no_mirror_before_creation() {
    let state = RegistryState::new(ADMIN);
    assert!(!state.directory().has_mirror(&addr(10)));
    assert_eq!(state.directory().get_mirror_for(&addr(10)), None);
    assert_eq!(state.directory().mirror_count(), 0);
    assert_eq!(state.directory().version(), "1.0.0");
}

#[test]
fn one_mirror_per_principal() {
    let mut state = RegistryState::new(ADMIN);
    state
        .create_mirror(addr(1), addr(10), MirrorDefaults::default())
        .unwrap();

    let err = state
        .create_mirror(addr(2), addr(10), MirrorDefaults::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DirectoryConflict);

    let err = state.attach_self(addr(10), MirrorDefaults::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DirectoryConflict);
    assert_eq!(state.directory().mirror_count(), 1);
}

#[test]
fn creation_is_journaled_with_principal_and_mirror() {
    let mut state = RegistryState::new(ADMIN);
    let id = state.attach_self(addr(10), MirrorDefaults::default()).unwrap();

    let entry = &state.journal().events()[0];
    assert_eq!(
        entry.event,
        Event::MirrorCreated {
            principal: addr(10),
            mirror: id
        }
    );
    assert_eq!(state.directory().entries()[0].principal, addr(10));
}

#[test]
fn rebind_keeps_the_mirror_list_state() {
    let authority = StaticAuthority::new(addrs(&[1, 2]), 1);
    let mut state = RegistryState::new(ADMIN);
    let first = state
        .create_mirror(ADMIN, addr(10), MirrorDefaults::default())
        .unwrap();
    let second = state
        .create_mirror(ADMIN, addr(11), MirrorDefaults::default())
        .unwrap();
    state.sync_batch(&second, &authority).unwrap();

    let err = state.rebind(addr(10), addr(10), second).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let previous = state.rebind(ADMIN, addr(10), second).unwrap();
    assert_eq!(previous, Some(first));
    assert_eq!(state.mirror_for(&addr(10)).unwrap().owners(), addrs(&[1, 2]));
    assert!(!state.mirror(&first).unwrap().is_configured());
    assert_eq!(state.directory().list_mirrors(), vec![first, second]);
}

#[test]
fn mirror_ids_do_not_depend_on_the_caller() {
    let mut a = RegistryState::new(ADMIN);
    let mut b = RegistryState::new(ADMIN);
    let via_factory = a
        .create_mirror(addr(1), addr(10), MirrorDefaults::default())
        .unwrap();
    let via_attach = b.attach_self(addr(10), MirrorDefaults::default()).unwrap();
    assert_eq!(via_factory, via_attach);
}
