//! Sentinel-terminated owner list
//!
//! Owners are kept as an explicit `address -> next` mapping plus head and
//! tail pointers. The last owner links to [`SENTINEL`]; an empty list has
//! both pointers set to [`SENTINEL`].
//!
//! ```text
//! head -> A -> B -> C -> SENTINEL
//!                   ^
//!                  tail
//! ```
//!
//! Insertion at either end is O(1). Removal and replacement are O(1) given
//! the target's predecessor, which the caller supplies (`SENTINEL` when the
//! target is the head). The structural primitives here do not validate their
//! inputs; [`crate::validator::MutationValidator`] runs first on every path.

mod record;

pub use record::OwnerSetRecord;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::address::{Address, SENTINEL};

/// Upper bound on the number of owners a mirror holds
pub const MAX_OWNERS: usize = 50;

/// Ordered set of distinct owners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OwnerSetRecord", into = "OwnerSetRecord")]
pub struct OwnerSet {
    links: HashMap<Address, Address>,
    head: Address,
    tail: Address,
}

impl Default for OwnerSet {
    fn default() -> Self {
        Self::new()
    }
}

impl OwnerSet {
    /// Create an empty owner set
    pub fn new() -> Self {
        Self {
            links: HashMap::new(),
            head: SENTINEL,
            tail: SENTINEL,
        }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// First owner, or `SENTINEL` when empty
    pub fn head(&self) -> Address {
        self.head
    }

    /// Last owner, or `SENTINEL` when empty
    pub fn tail(&self) -> Address {
        self.tail
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.links.contains_key(address)
    }

    /// The address following `owner`, or `None` if `owner` is not a member
    pub fn next_of(&self, owner: &Address) -> Option<Address> {
        self.links.get(owner).copied()
    }

    /// True if `prev` immediately precedes `target` in the list
    ///
    /// `SENTINEL` precedes the head.
    pub fn is_predecessor(&self, prev: &Address, target: &Address) -> bool {
        if !self.contains(target) {
            return false;
        }
        if prev.is_sentinel() {
            return self.head == *target;
        }
        self.links.get(prev) == Some(target)
    }

    /// Find the predecessor of `target` by walking the list
    ///
    /// Returns `SENTINEL` for the head and `None` for non-members.
    pub fn predecessor_of(&self, target: &Address) -> Option<Address> {
        if !self.contains(target) {
            return None;
        }
        let mut prev = SENTINEL;
        for owner in self.iter() {
            if owner == *target {
                return Some(prev);
            }
            prev = owner;
        }
        None
    }

    /// Iterate owners from head to tail
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            set: self,
            cursor: self.head,
        }
    }

    /// Owners in list order
    pub fn to_vec(&self) -> Vec<Address> {
        self.iter().collect()
    }

    /// Link `owner` in as the new head
    pub(crate) fn link_front(&mut self, owner: Address) {
        debug_assert!(owner.is_assignable() && !self.contains(&owner));
        self.links.insert(owner, self.head);
        if self.tail.is_sentinel() {
            self.tail = owner;
        }
        self.head = owner;
    }

    /// Link `owner` in as the new tail
    pub(crate) fn link_back(&mut self, owner: Address) {
        debug_assert!(owner.is_assignable() && !self.contains(&owner));
        self.links.insert(owner, SENTINEL);
        if self.tail.is_sentinel() {
            self.head = owner;
        } else {
            self.links.insert(self.tail, owner);
        }
        self.tail = owner;
    }

    /// Unlink `target` given its predecessor
    pub(crate) fn unlink(&mut self, prev: Address, target: Address) {
        debug_assert!(self.is_predecessor(&prev, &target));
        let next = self.links.remove(&target).unwrap_or(SENTINEL);
        if prev.is_sentinel() {
            self.head = next;
        } else {
            self.links.insert(prev, next);
        }
        if self.tail == target {
            self.tail = prev;
        }
    }

    /// Put `new` in the position held by `old`
    pub(crate) fn relink(&mut self, prev: Address, old: Address, new: Address) {
        debug_assert!(self.is_predecessor(&prev, &old));
        debug_assert!(new.is_assignable() && !self.contains(&new));
        let next = self.links.remove(&old).unwrap_or(SENTINEL);
        self.links.insert(new, next);
        if prev.is_sentinel() {
            self.head = new;
        } else {
            self.links.insert(prev, new);
        }
        if self.tail == old {
            self.tail = new;
        }
    }
}

impl<'a> IntoIterator for &'a OwnerSet {
    type Item = Address;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over owners in list order
pub struct Iter<'a> {
    set: &'a OwnerSet,
    cursor: Address,
}

impl Iterator for Iter<'_> {
    type Item = Address;

    fn next(&mut self) -> Option<Address> {
        if self.cursor.is_sentinel() {
            return None;
        }
        let current = self.cursor;
        self.cursor = self.set.links.get(&current).copied().unwrap_or(SENTINEL);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[0] = 0xaa;
        bytes[19] = n;
        Address::from_bytes(bytes)
    }

    fn set_of(owners: &[u8]) -> OwnerSet {
        let mut set = OwnerSet::new();
        for n in owners {
            set.link_back(addr(*n));
        }
        set
    }

    #[test]
    fn empty_set_points_at_sentinel() {
        let set = OwnerSet::new();
        assert!(set.is_empty());
        assert_eq!(set.head(), SENTINEL);
        assert_eq!(set.tail(), SENTINEL);
        assert_eq!(set.iter().count(), 0);
    }

    #[test]
    fn link_back_preserves_order() {
        let set = set_of(&[1, 2, 3]);
        assert_eq!(set.to_vec(), vec![addr(1), addr(2), addr(3)]);
        assert_eq!(set.head(), addr(1));
        assert_eq!(set.tail(), addr(3));
        assert_eq!(set.next_of(&addr(3)), Some(SENTINEL));
    }

    #[test]
    fn link_front_inserts_at_head() {
        let mut set = set_of(&[1, 2]);
        set.link_front(addr(9));
        assert_eq!(set.to_vec(), vec![addr(9), addr(1), addr(2)]);
        assert_eq!(set.tail(), addr(2));
    }

    #[test]
    fn link_front_on_empty_sets_tail() {
        let mut set = OwnerSet::new();
        set.link_front(addr(1));
        assert_eq!(set.head(), addr(1));
        assert_eq!(set.tail(), addr(1));
        set.link_back(addr(2));
        assert_eq!(set.to_vec(), vec![addr(1), addr(2)]);
    }

    #[test]
    fn predecessor_of_head_is_sentinel() {
        let set = set_of(&[1, 2, 3]);
        assert_eq!(set.predecessor_of(&addr(1)), Some(SENTINEL));
        assert_eq!(set.predecessor_of(&addr(3)), Some(addr(2)));
        assert_eq!(set.predecessor_of(&addr(7)), None);
    }

    #[test]
    fn is_predecessor_checks_links() {
        let set = set_of(&[1, 2, 3]);
        assert!(set.is_predecessor(&SENTINEL, &addr(1)));
        assert!(set.is_predecessor(&addr(1), &addr(2)));
        assert!(!set.is_predecessor(&addr(1), &addr(3)));
        assert!(!set.is_predecessor(&SENTINEL, &addr(2)));
        // the tail links to SENTINEL but SENTINEL is never a target
        assert!(!set.is_predecessor(&addr(3), &SENTINEL));
    }

    #[test]
    fn unlink_head_middle_and_tail() {
        let mut set = set_of(&[1, 2, 3, 4]);

        set.unlink(SENTINEL, addr(1));
        assert_eq!(set.to_vec(), vec![addr(2), addr(3), addr(4)]);

        set.unlink(addr(2), addr(3));
        assert_eq!(set.to_vec(), vec![addr(2), addr(4)]);

        set.unlink(addr(2), addr(4));
        assert_eq!(set.to_vec(), vec![addr(2)]);
        assert_eq!(set.tail(), addr(2));

        set.unlink(SENTINEL, addr(2));
        assert!(set.is_empty());
        assert_eq!(set.head(), SENTINEL);
        assert_eq!(set.tail(), SENTINEL);
    }

    #[test]
    fn relink_keeps_position() {
        let mut set = set_of(&[1, 2, 3]);

        set.relink(addr(1), addr(2), addr(8));
        assert_eq!(set.to_vec(), vec![addr(1), addr(8), addr(3)]);

        set.relink(SENTINEL, addr(1), addr(7));
        assert_eq!(set.to_vec(), vec![addr(7), addr(8), addr(3)]);

        set.relink(addr(8), addr(3), addr(9));
        assert_eq!(set.to_vec(), vec![addr(7), addr(8), addr(9)]);
        assert_eq!(set.tail(), addr(9));
        assert!(!set.contains(&addr(3)));
    }
}
