//! Table of mirrors keyed by id

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::MirrorState;
use crate::address::MirrorId;
use crate::{Error, Result};

/// Owns every mirror's state; passed explicitly to the operations that need it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MirrorArena {
    mirrors: BTreeMap<MirrorId, MirrorState>,
}

impl MirrorArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.mirrors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mirrors.is_empty()
    }

    pub fn contains(&self, id: &MirrorId) -> bool {
        self.mirrors.contains_key(id)
    }

    /// Look up a mirror
    ///
    /// # Errors
    ///
    /// Returns `MirrorNotFound` if no mirror has this id.
    pub fn get(&self, id: &MirrorId) -> Result<&MirrorState> {
        self.mirrors.get(id).ok_or_else(|| Error::MirrorNotFound {
            key: id.to_string(),
        })
    }

    /// Look up a mirror for mutation
    pub fn get_mut(&mut self, id: &MirrorId) -> Result<&mut MirrorState> {
        self.mirrors.get_mut(id).ok_or_else(|| Error::MirrorNotFound {
            key: id.to_string(),
        })
    }

    pub(crate) fn insert(&mut self, mirror: MirrorState) {
        self.mirrors.insert(mirror.id(), mirror);
    }

    pub fn iter(&self) -> impl Iterator<Item = &MirrorState> {
        self.mirrors.values()
    }

    /// Stored mirrors with the id each is filed under
    pub(crate) fn keyed(&self) -> impl Iterator<Item = (&MirrorId, &MirrorState)> {
        self.mirrors.iter()
    }
}
