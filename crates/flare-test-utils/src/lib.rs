//! Test utilities and mock types for Flare development.
//!
//! Provides mock implementations of the host traits
//! ([`EffectSink`](flare_core::EffectSink), [`OwnerWorld`]) so the
//! dispatch queue and beacon registry can be exercised without a game
//! engine.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::collections::HashMap;

use flare_core::{OwnerId, OwnerWorld, Vec3};

pub mod fixtures;

pub use fixtures::{tagged_call, FailingSink, RecordingSink, StrictSink};

/// Per-owner state tracked by [`MockWorld`].
#[derive(Clone, Debug)]
struct OwnerEntry {
    alive: bool,
    position: Option<Vec3>,
}

/// Mock implementation of [`OwnerWorld`].
///
/// Backed by a `HashMap<OwnerId, _>`. Spawn owners with
/// [`spawn`](MockWorld::spawn) before passing the world to code under
/// test; flip their state with [`kill`](MockWorld::kill) and
/// [`remove`](MockWorld::remove).
#[derive(Clone, Debug, Default)]
pub struct MockWorld {
    owners: HashMap<OwnerId, OwnerEntry>,
}

impl MockWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a live owner at `position`.
    pub fn spawn(&mut self, owner: OwnerId, position: Vec3) {
        self.owners.insert(
            owner,
            OwnerEntry {
                alive: true,
                position: Some(position),
            },
        );
    }

    /// Builder form of [`spawn`](MockWorld::spawn).
    pub fn with_owner(mut self, owner: OwnerId, position: Vec3) -> Self {
        self.spawn(owner, position);
        self
    }

    /// Mark an owner dead. It still exists but is removable.
    pub fn kill(&mut self, owner: OwnerId) {
        if let Some(entry) = self.owners.get_mut(&owner) {
            entry.alive = false;
        }
    }

    /// Bring a dead owner back.
    pub fn revive(&mut self, owner: OwnerId) {
        if let Some(entry) = self.owners.get_mut(&owner) {
            entry.alive = true;
        }
    }

    /// Remove an owner entirely (disconnect).
    pub fn remove(&mut self, owner: OwnerId) {
        self.owners.remove(&owner);
    }

    /// Move an owner.
    pub fn set_position(&mut self, owner: OwnerId, position: Vec3) {
        if let Some(entry) = self.owners.get_mut(&owner) {
            entry.position = Some(position);
        }
    }

    /// Make the owner's position lookup fail.
    pub fn clear_position(&mut self, owner: OwnerId) {
        if let Some(entry) = self.owners.get_mut(&owner) {
            entry.position = None;
        }
    }
}

impl OwnerWorld for MockWorld {
    fn owner_exists(&self, owner: OwnerId) -> bool {
        self.owners.contains_key(&owner)
    }

    fn owner_is_removable(&self, owner: OwnerId) -> bool {
        self.owners.get(&owner).is_none_or(|e| !e.alive)
    }

    fn current_position(&self, owner: OwnerId) -> Option<Vec3> {
        self.owners.get(&owner).and_then(|e| e.position)
    }
}
