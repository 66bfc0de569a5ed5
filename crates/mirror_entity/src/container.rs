//! Containers — cache-side mirrors of one external entity each.
//!
//! A [`Container`] owns one register per schema attribute plus a last-updated
//! stamp. It never owns other containers: cross-references are identities
//! resolved through the registry. Concurrent access goes through
//! [`ContainerHandle`], which pairs the state with its shared/exclusive guard.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

use mirror_store::{AttributeValue, ContainerIdentity, ContainerKind, Frame, Register};

use crate::schema::{ContainerSchema, StorageKind, schema_for};
use crate::source::{SourceAdapter, SourceError};

/// What one [`Container::pull_from_source`] batch accomplished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullOutcome {
    /// Attributes whose registers accepted a value this pass.
    pub applied: usize,
    /// Attributes that failed, each with the error it hit. A failed
    /// attribute never rolls back ones already committed.
    pub errors: Vec<(&'static str, ContainerError)>,
    /// The source reported the entity gone partway through the batch. The
    /// remaining attributes were not read; the caller should retire the
    /// container.
    pub entity_gone: bool,
}

/// The mirrored state of one external entity.
#[derive(Debug)]
pub struct Container {
    identity: ContainerIdentity,
    schema: &'static ContainerSchema,
    registers: HashMap<&'static str, Register<AttributeValue>>,
    last_updated: Option<Frame>,
    retired: bool,
}

impl Container {
    /// Create an empty container for `identity`, with one register per
    /// schema attribute.
    #[must_use]
    pub fn new(identity: ContainerIdentity) -> Self {
        let schema = schema_for(identity.kind);
        let registers = schema
            .attributes
            .iter()
            .map(|def| {
                let register = match def.storage {
                    StorageKind::Static => Register::new_static(),
                    StorageKind::Dynamic => Register::new_dynamic(),
                };
                (def.key, register)
            })
            .collect();
        Self {
            identity,
            schema,
            registers,
            last_updated: None,
            retired: false,
        }
    }

    /// The `(kind, id)` identity, immutable for the container's life.
    #[must_use]
    pub const fn identity(&self) -> ContainerIdentity {
        self.identity
    }

    /// The entity kind.
    #[must_use]
    pub const fn kind(&self) -> ContainerKind {
        self.identity.kind
    }

    /// The schema this container was built from.
    #[must_use]
    pub const fn schema(&self) -> &'static ContainerSchema {
        self.schema
    }

    /// The frame of the last completed pull, if any.
    #[must_use]
    pub const fn last_updated(&self) -> Option<Frame> {
        self.last_updated
    }

    /// Frames elapsed since the last pull. A container that has never been
    /// pulled reports `u64::MAX` so it is always due.
    #[must_use]
    pub fn frames_since(&self, current: Frame) -> u64 {
        self.last_updated
            .map_or(u64::MAX, |last| current.since(last))
    }

    /// Whether the source has reported this entity gone.
    #[must_use]
    pub const fn is_retired(&self) -> bool {
        self.retired
    }

    /// Mark the entity gone. History stays queryable; the registry stops
    /// expanding traversal through it.
    pub fn retire(&mut self) {
        self.retired = true;
    }

    /// Write one freshly observed attribute value.
    ///
    /// # Errors
    ///
    /// [`ContainerError::UnknownAttribute`] for a key outside the schema, or
    /// the register's own contract error.
    pub fn apply(
        &mut self,
        key: &str,
        value: AttributeValue,
        frame: Frame,
    ) -> Result<(), ContainerError> {
        let register = self
            .registers
            .get_mut(key)
            .ok_or_else(|| ContainerError::UnknownAttribute {
                identity: self.identity,
                key: key.to_string(),
            })?;
        register.write(value, frame).map_err(ContainerError::Store)
    }

    /// The value of `key` current at `frame`, or absent.
    #[must_use]
    pub fn value_at(&self, key: &str, frame: Frame) -> Option<AttributeValue> {
        self.registers.get(key)?.value_at(frame).cloned()
    }

    /// The newest known value of `key`, or absent.
    #[must_use]
    pub fn latest(&self, key: &str) -> Option<AttributeValue> {
        self.registers.get(key)?.latest().cloned()
    }

    /// Pull every schema attribute from the adapter into the registers.
    ///
    /// Attributes are committed one by one in schema order; a failure on one
    /// attribute is logged, collected into the outcome, and skipped without
    /// touching the others — each attribute's freshness is independent.
    /// `last_updated` advances even on a partially failed batch.
    ///
    /// An [`EntityRetired`] signal from the adapter stops the batch: the
    /// entity is gone, so the remaining attributes are not read and the
    /// outcome carries `entity_gone` for the caller to retire the container.
    ///
    /// [`EntityRetired`]: SourceError::EntityRetired
    pub fn pull_from_source(&mut self, adapter: &dyn SourceAdapter, frame: Frame) -> PullOutcome {
        let mut outcome = PullOutcome::default();
        for def in self.schema.attributes {
            match adapter.read_attribute(self.identity, def.key) {
                Ok(Some(value)) => match self.apply(def.key, value, frame) {
                    Ok(()) => outcome.applied += 1,
                    Err(err) => {
                        warn!(
                            container = %self.identity,
                            attribute = def.key,
                            %frame,
                            error = %err,
                            "attribute write rejected"
                        );
                        outcome.errors.push((def.key, err));
                    }
                },
                // Unknown this tick: the register keeps its previous step.
                Ok(None) => {}
                Err(SourceError::EntityRetired(_)) => {
                    warn!(
                        container = %self.identity,
                        attribute = def.key,
                        %frame,
                        "entity vanished mid-pull"
                    );
                    outcome.entity_gone = true;
                    break;
                }
                Err(err) => {
                    warn!(
                        container = %self.identity,
                        attribute = def.key,
                        %frame,
                        error = %err,
                        "attribute read failed"
                    );
                    outcome.errors.push((def.key, ContainerError::Source(err)));
                }
            }
        }
        self.last_updated = Some(frame);
        outcome
    }

    /// The set of entities this container currently points to, read from the
    /// cached reference-bearing registers only. Never touches the adapter —
    /// discovery must stay cheap.
    #[must_use]
    pub fn referenced_containers(&self) -> Vec<ContainerIdentity> {
        let mut refs = Vec::new();
        for def in self.schema.reference_attributes() {
            if let Some(register) = self.registers.get(def.key)
                && let Some(AttributeValue::Refs(ids)) = register.latest()
            {
                for id in ids {
                    if !refs.contains(id) {
                        refs.push(*id);
                    }
                }
            }
        }
        refs
    }

    fn identity_values(&self) -> impl Iterator<Item = (&'static str, Option<&AttributeValue>)> {
        self.schema
            .identity_attributes()
            .map(|def| (def.key, self.registers.get(def.key).and_then(Register::latest)))
    }
}

/// Equality over the identity-declared static registers only, so comparison
/// is independent of frequently-changing dynamic state. Used for
/// deduplication within one traversal pass.
impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.identity_values().eq(other.identity_values())
    }
}

impl Eq for Container {}

impl Hash for Container {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        for (key, value) in self.identity_values() {
            key.hash(state);
            value.hash(state);
        }
    }
}

/// Container-layer errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContainerError {
    /// The attribute key is not declared in the container's schema.
    #[error("unknown attribute '{key}' on {identity}")]
    UnknownAttribute {
        /// The container the write targeted.
        identity: ContainerIdentity,
        /// The undeclared key.
        key: String,
    },

    /// The register rejected the write.
    #[error(transparent)]
    Store(#[from] mirror_store::StoreError),

    /// The adapter failed reading the attribute.
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// A cloneable guarded handle to one container.
///
/// The lock lives alongside the state, not in a base type: holders of a
/// handle have the capability to read (shared) or pull (exclusive), and
/// nothing else. Two different containers share no lock, so there is no
/// ordering constraint between them.
#[derive(Debug, Clone)]
pub struct ContainerHandle {
    inner: Arc<RwLock<Container>>,
}

impl ContainerHandle {
    /// Create a handle owning a fresh container for `identity`.
    #[must_use]
    pub fn new(identity: ContainerIdentity) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Container::new(identity))),
        }
    }

    /// Shared (read) access. A poisoned lock is recovered: a panicking
    /// reader cannot have torn the state.
    #[must_use]
    pub fn read(&self) -> RwLockReadGuard<'_, Container> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exclusive (write) access, for the whole attribute batch of one pull.
    #[must_use]
    pub fn write(&self) -> RwLockWriteGuard<'_, Container> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The container's identity (takes a momentary read guard).
    #[must_use]
    pub fn identity(&self) -> ContainerIdentity {
        self.read().identity()
    }

    /// The value of `key` current at `frame`, or absent.
    #[must_use]
    pub fn value_at(&self, key: &str, frame: Frame) -> Option<AttributeValue> {
        self.read().value_at(key, frame)
    }

    /// The newest known value of `key`, or absent.
    #[must_use]
    pub fn latest(&self, key: &str) -> Option<AttributeValue> {
        self.read().latest(key)
    }
}
