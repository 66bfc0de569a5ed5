//! The source-adapter contract.
//!
//! The adapter is the mirror's only window into the live game state. It is
//! assumed cheap-but-not-free per call: the whole point of the cache is that
//! the update engine decides *when* to go through this interface, and
//! consumers read the mirrored history instead.

use mirror_store::{AttributeValue, ContainerIdentity};

/// Errors the source adapter can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// The source no longer knows the entity; the container should be
    /// retired from the active graph.
    #[error("entity {0} no longer exists in the source")]
    EntityRetired(ContainerIdentity),

    /// A transient read failure. Treated as "attribute unknown this tick",
    /// never fatal to a traversal pass.
    #[error("source read failed: {0}")]
    Io(String),
}

/// Raw access to the live game state.
///
/// Implementations must be callable from the traversal thread while consumer
/// threads read the mirror concurrently, hence `Send + Sync`.
pub trait SourceAdapter: Send + Sync {
    /// Whether the source currently knows an entity with this identity.
    fn exists(&self, identity: ContainerIdentity) -> bool;

    /// Read the current raw value of one attribute.
    ///
    /// `Ok(None)` means the attribute is unknown this tick — a legitimate
    /// state, distinct from an error.
    ///
    /// # Errors
    ///
    /// [`SourceError::EntityRetired`] if the entity vanished, or
    /// [`SourceError::Io`] on a transient read failure.
    fn read_attribute(
        &self,
        identity: ContainerIdentity,
        key: &str,
    ) -> Result<Option<AttributeValue>, SourceError>;

    /// Entities related to `identity`, as currently known to the source.
    ///
    /// Used only to *seed* traversal expansion for containers that hold no
    /// cached references yet; once reference-bearing registers are populated,
    /// expansion reads the cache instead.
    fn discover_references(&self, identity: ContainerIdentity) -> Vec<ContainerIdentity>;
}
