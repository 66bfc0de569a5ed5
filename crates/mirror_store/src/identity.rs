//! Container identity types.
//!
//! A [`ContainerIdentity`] is a lightweight `(kind, id)` pair with no inherent
//! data. Identities are handed out by the external source; the registry owns
//! the containers they name and resolves identities by lookup, so entity
//! cross-references are never owned pointers and reference cycles carry no
//! lifetime hazard.

use serde::{Deserialize, Serialize};

/// The closed set of entity kinds the mirror tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContainerKind {
    /// A participant in the game (human or computer).
    Player,
    /// A mobile or building unit on the map.
    Unit,
    /// One fixed tile of the map grid.
    TilePosition,
    /// A projectile in flight.
    Bullet,
}

impl ContainerKind {
    /// A human-readable name for this kind (e.g. `"unit"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ContainerKind::Player => "player",
            ContainerKind::Unit => "unit",
            ContainerKind::TilePosition => "tile",
            ContainerKind::Bullet => "bullet",
        }
    }
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw entity identifier as reported by the source.
///
/// Stable for the entity's lifetime. The source may hand the same id to a new
/// entity after the old one is destroyed; the registry treats such reuse as a
/// distinct logical entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerId(pub u64);

impl ContainerId {
    /// Create an id from a raw `u64`.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The registry key for one mirrored entity: its kind plus its source id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerIdentity {
    /// What kind of entity this is.
    pub kind: ContainerKind,
    /// The source-assigned id, stable for the entity's lifetime.
    pub id: ContainerId,
}

impl ContainerIdentity {
    /// Create an identity from a kind and a raw id.
    #[must_use]
    pub const fn new(kind: ContainerKind, id: u64) -> Self {
        Self {
            kind,
            id: ContainerId(id),
        }
    }
}

impl std::fmt::Display for ContainerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}
