//! Lifecycle hooks attached to a beacon.

use std::fmt;

use flare_core::{BeaconId, OwnerId};

use crate::beacon::BeaconStatus;
use crate::config::{BeaconConfig, Lifetime};

/// Read-only snapshot of a beacon handed to hooks.
#[derive(Clone, Copy, Debug)]
pub struct BeaconView<'a> {
    /// Handle of the beacon.
    pub id: BeaconId,
    /// Owner the beacon is bound to.
    pub owner: OwnerId,
    /// Lifecycle state when the hook runs.
    pub status: BeaconStatus,
    /// Time left, after this firing's countdown.
    pub remaining: Lifetime,
    /// The beacon's configuration.
    pub config: &'a BeaconConfig,
}

/// A hook invoked with the owner id and a view of the beacon.
pub type Hook = Box<dyn FnMut(OwnerId, &BeaconView<'_>)>;

/// Optional callbacks run around each firing and on destruction.
///
/// - `pre` runs before the ring is submitted.
/// - `post` runs after the ring and sound are submitted.
/// - `on_destroy` runs exactly once, when the beacon is stopped.
#[derive(Default)]
pub struct BeaconHooks {
    pre: Option<Hook>,
    post: Option<Hook>,
    on_destroy: Option<Hook>,
}

impl BeaconHooks {
    /// No hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hook run before each firing's effects.
    pub fn pre(mut self, f: impl FnMut(OwnerId, &BeaconView<'_>) + 'static) -> Self {
        self.pre = Some(Box::new(f));
        self
    }

    /// Set the hook run after each firing's effects.
    pub fn post(mut self, f: impl FnMut(OwnerId, &BeaconView<'_>) + 'static) -> Self {
        self.post = Some(Box::new(f));
        self
    }

    /// Set the hook run when the beacon is destroyed.
    pub fn on_destroy(mut self, f: impl FnMut(OwnerId, &BeaconView<'_>) + 'static) -> Self {
        self.on_destroy = Some(Box::new(f));
        self
    }

    pub(crate) fn run_pre(&mut self, view: &BeaconView<'_>) {
        if let Some(hook) = self.pre.as_mut() {
            hook(view.owner, view);
        }
    }

    pub(crate) fn run_post(&mut self, view: &BeaconView<'_>) {
        if let Some(hook) = self.post.as_mut() {
            hook(view.owner, view);
        }
    }

    /// Takes the hook so a second call cannot run it again.
    pub(crate) fn run_on_destroy(&mut self, view: &BeaconView<'_>) {
        if let Some(mut hook) = self.on_destroy.take() {
            hook(view.owner, view);
        }
    }
}

impl fmt::Debug for BeaconHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeaconHooks")
            .field("pre", &self.pre.is_some())
            .field("post", &self.post.is_some())
            .field("on_destroy", &self.on_destroy.is_some())
            .finish()
    }
}
