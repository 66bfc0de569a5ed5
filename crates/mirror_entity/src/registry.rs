//! The container registry — owner of every mirrored entity.
//!
//! All cross-references between containers resolve through here by identity
//! lookup; no container ever holds another directly. The registry also
//! carries the consumer-facing query surface (`value_at`, `latest_value`,
//! `all_of_kind`), so readers on other threads never need anything beyond a
//! registry reference.
//!
//! Retirement preserves history: a retired container's registers stay
//! queryable through [`ContainerRegistry::retired_history`], but the identity
//! leaves the active set. If the source later reuses the id, the registry
//! creates a brand-new container — id reuse is a new logical entity.

use dashmap::DashMap;
use tracing::debug;

use mirror_store::{AttributeValue, ContainerIdentity, ContainerKind, Frame};

use crate::container::ContainerHandle;

/// Owns all containers, active and retired, keyed by identity.
#[derive(Debug, Default)]
pub struct ContainerRegistry {
    active: DashMap<ContainerIdentity, ContainerHandle>,
    /// Past incarnations per identity, oldest first. Grows only on
    /// retirement; history is preserved, never deleted.
    retired: DashMap<ContainerIdentity, Vec<ContainerHandle>>,
}

impl ContainerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: DashMap::new(),
            retired: DashMap::new(),
        }
    }

    /// Resolve an identity to its active container, if any.
    ///
    /// `None` means the reference is no longer (or not yet) resolvable.
    #[must_use]
    pub fn resolve(&self, identity: ContainerIdentity) -> Option<ContainerHandle> {
        self.active.get(&identity).map(|entry| entry.value().clone())
    }

    /// Whether an active container exists for this identity.
    #[must_use]
    pub fn is_active(&self, identity: ContainerIdentity) -> bool {
        self.active.contains_key(&identity)
    }

    /// Get the active container for `identity`, creating one the first time
    /// the identity is seen. A previously retired identity gets a fresh
    /// container: the new entity shares nothing with the old one's history.
    #[must_use]
    pub fn ensure(&self, identity: ContainerIdentity) -> ContainerHandle {
        self.active
            .entry(identity)
            .or_insert_with(|| {
                debug!(container = %identity, "container created");
                ContainerHandle::new(identity)
            })
            .value()
            .clone()
    }

    /// Retire the active container for `identity`, moving it to the archive.
    ///
    /// Returns `true` if an active container was retired. Its final dynamic
    /// values remain queryable via [`ContainerRegistry::retired_history`]
    /// for any frame up to its last update.
    pub fn retire(&self, identity: ContainerIdentity) -> bool {
        let Some((_, handle)) = self.active.remove(&identity) else {
            return false;
        };
        handle.write().retire();
        debug!(container = %identity, "container retired");
        self.retired.entry(identity).or_default().push(handle);
        true
    }

    /// Past incarnations retired under this identity, oldest first.
    #[must_use]
    pub fn retired_history(&self, identity: ContainerIdentity) -> Vec<ContainerHandle> {
        self.retired
            .get(&identity)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// All active identities of one kind, sorted for deterministic iteration.
    #[must_use]
    pub fn all_of_kind(&self, kind: ContainerKind) -> Vec<ContainerIdentity> {
        let mut identities: Vec<ContainerIdentity> = self
            .active
            .iter()
            .map(|entry| *entry.key())
            .filter(|identity| identity.kind == kind)
            .collect();
        identities.sort_unstable();
        identities
    }

    /// Number of active containers.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    // -- Consumer query surface --

    /// The value of one attribute of one active entity at `frame`.
    ///
    /// Absent if the identity is unknown, retired, or the attribute had no
    /// recorded value at that frame — never a default.
    #[must_use]
    pub fn value_at(
        &self,
        identity: ContainerIdentity,
        key: &str,
        frame: Frame,
    ) -> Option<AttributeValue> {
        self.resolve(identity)?.value_at(key, frame)
    }

    /// The newest known value of one attribute of one active entity.
    #[must_use]
    pub fn latest_value(&self, identity: ContainerIdentity, key: &str) -> Option<AttributeValue> {
        self.resolve(identity)?.latest(key)
    }
}
