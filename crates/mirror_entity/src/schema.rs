//! Per-kind attribute schemas.
//!
//! Each [`ContainerKind`] has a fixed, builtin schema declaring which
//! attributes the mirror tracks for it, what storage shape each attribute
//! uses, which static attributes define the container's equality/hash, and
//! which attributes carry references to other entities. The update engine
//! walks these declarations instead of knowing concrete entity types.

use mirror_store::ContainerKind;

/// Which register shape backs an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// Set once, never changes after creation.
    Static,
    /// A frame-keyed timeline.
    Dynamic,
}

/// Declaration of one tracked attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeDef {
    /// The attribute key, unique within a schema.
    pub key: &'static str,
    /// Static or dynamic storage.
    pub storage: StorageKind,
    /// Whether this (static) attribute participates in container
    /// equality and hashing.
    pub identity: bool,
    /// Whether this attribute's values are [`Refs`] feeding traversal
    /// expansion.
    ///
    /// [`Refs`]: mirror_store::AttributeValue::Refs
    pub references: bool,
}

impl AttributeDef {
    const fn stat(key: &'static str) -> Self {
        Self {
            key,
            storage: StorageKind::Static,
            identity: false,
            references: false,
        }
    }

    const fn stat_id(key: &'static str) -> Self {
        Self {
            key,
            storage: StorageKind::Static,
            identity: true,
            references: false,
        }
    }

    const fn stat_refs(key: &'static str) -> Self {
        Self {
            key,
            storage: StorageKind::Static,
            identity: false,
            references: true,
        }
    }

    const fn dynamic(key: &'static str) -> Self {
        Self {
            key,
            storage: StorageKind::Dynamic,
            identity: false,
            references: false,
        }
    }

    const fn dyn_refs(key: &'static str) -> Self {
        Self {
            key,
            storage: StorageKind::Dynamic,
            identity: false,
            references: true,
        }
    }
}

/// The full attribute declaration set for one container kind.
#[derive(Debug, Clone, Copy)]
pub struct ContainerSchema {
    /// The kind this schema describes.
    pub kind: ContainerKind,
    /// Tracked attributes, in deterministic declaration order.
    pub attributes: &'static [AttributeDef],
}

impl ContainerSchema {
    /// Look up one attribute declaration by key.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&'static AttributeDef> {
        self.attributes.iter().find(|def| def.key == key)
    }

    /// The static attributes that define equality/hash for this kind.
    pub fn identity_attributes(&self) -> impl Iterator<Item = &'static AttributeDef> {
        self.attributes.iter().filter(|def| def.identity)
    }

    /// The attributes whose values reference other containers.
    pub fn reference_attributes(&self) -> impl Iterator<Item = &'static AttributeDef> {
        self.attributes.iter().filter(|def| def.references)
    }
}

const PLAYER: ContainerSchema = ContainerSchema {
    kind: ContainerKind::Player,
    attributes: &[
        AttributeDef::stat_id("id"),
        AttributeDef::stat("name"),
        AttributeDef::stat("race"),
        AttributeDef::dynamic("minerals"),
        AttributeDef::dynamic("gas"),
        AttributeDef::dynamic("gathered_minerals"),
        AttributeDef::dynamic("gathered_gas"),
        AttributeDef::dyn_refs("units"),
    ],
};

const UNIT: ContainerSchema = ContainerSchema {
    kind: ContainerKind::Unit,
    attributes: &[
        AttributeDef::stat_id("id"),
        AttributeDef::stat("unit_type"),
        AttributeDef::dynamic("position"),
        AttributeDef::dynamic("hit_points"),
        AttributeDef::dynamic("energy"),
        AttributeDef::dyn_refs("owner"),
        AttributeDef::dyn_refs("tile"),
        AttributeDef::dyn_refs("target"),
    ],
};

// Tiles are fixed map cells: position defines identity, and the neighbour
// links never change once the map is known.
const TILE_POSITION: ContainerSchema = ContainerSchema {
    kind: ContainerKind::TilePosition,
    attributes: &[
        AttributeDef::stat_id("position"),
        AttributeDef::stat("ground_height"),
        AttributeDef::stat_refs("neighbours"),
        AttributeDef::dyn_refs("units"),
    ],
};

const BULLET: ContainerSchema = ContainerSchema {
    kind: ContainerKind::Bullet,
    attributes: &[
        AttributeDef::stat_id("id"),
        AttributeDef::stat("bullet_type"),
        AttributeDef::dynamic("position"),
        AttributeDef::dyn_refs("source"),
        AttributeDef::dyn_refs("target"),
    ],
};

/// The builtin schema for a container kind.
#[must_use]
pub const fn schema_for(kind: ContainerKind) -> &'static ContainerSchema {
    match kind {
        ContainerKind::Player => &PLAYER,
        ContainerKind::Unit => &UNIT,
        ContainerKind::TilePosition => &TILE_POSITION,
        ContainerKind::Bullet => &BULLET,
    }
}
