//! Persisted form of the owner list
//!
//! Only the adjacency map and the head pointer are stored. The tail and the
//! member count are rebuilt by walking the list on load, which also rejects
//! cycles, dangling links, and reserved addresses.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::OwnerSet;
use crate::address::{Address, SENTINEL};
use crate::Error;

/// Serialized owner list: head pointer plus `address -> next` links
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerSetRecord {
    pub head: Address,
    #[serde(default)]
    pub links: BTreeMap<Address, Address>,
}

impl From<OwnerSet> for OwnerSetRecord {
    fn from(set: OwnerSet) -> Self {
        Self {
            head: set.head,
            links: set.links.into_iter().collect(),
        }
    }
}

impl TryFrom<OwnerSetRecord> for OwnerSet {
    type Error = Error;

    fn try_from(record: OwnerSetRecord) -> Result<Self, Self::Error> {
        if let Some(reserved) = record.links.keys().find(|a| !a.is_assignable()) {
            return Err(Error::corrupt(format!(
                "reserved address {reserved} stored as an owner"
            )));
        }

        let mut visited = 0usize;
        let mut tail = SENTINEL;
        let mut cursor = record.head;
        while !cursor.is_sentinel() {
            let next = record.links.get(&cursor).ok_or_else(|| {
                Error::corrupt(format!("owner list links to unknown address {cursor}"))
            })?;
            visited += 1;
            if visited > record.links.len() {
                return Err(Error::corrupt("owner list contains a cycle"));
            }
            tail = cursor;
            cursor = *next;
        }

        if visited != record.links.len() {
            return Err(Error::corrupt(format!(
                "{} owner(s) unreachable from head",
                record.links.len() - visited
            )));
        }

        Ok(OwnerSet {
            links: record.links.into_iter().collect::<HashMap<_, _>>(),
            head: record.head,
            tail,
        })
    }
}
