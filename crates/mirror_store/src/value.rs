//! Raw attribute values.
//!
//! The source reports every attribute as one of a closed set of value shapes.
//! Registers store these as-is; the consumer-facing query surface hands them
//! back unchanged, so "absent" can never be confused with a real zero/false.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::identity::ContainerIdentity;

/// One raw value as reported by the source adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeValue {
    /// A boolean flag (e.g. a unit's cloaked state).
    Bool(bool),
    /// An integer quantity (e.g. a player's minerals, a unit's hit points).
    Int(i64),
    /// A short string (e.g. a player's name, a type name).
    Text(String),
    /// A 2-D map position in tile or pixel coordinates.
    Position(IVec2),
    /// Cross-references to other entities, by identity.
    Refs(Vec<ContainerIdentity>),
}

impl AttributeValue {
    /// Returns the boolean if this is a [`AttributeValue::Bool`].
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer if this is an [`AttributeValue::Int`].
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the string if this is an [`AttributeValue::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the position if this is an [`AttributeValue::Position`].
    #[must_use]
    pub const fn as_position(&self) -> Option<IVec2> {
        match self {
            AttributeValue::Position(p) => Some(*p),
            _ => None,
        }
    }

    /// Returns the referenced identities if this is an [`AttributeValue::Refs`].
    #[must_use]
    pub fn as_refs(&self) -> Option<&[ContainerIdentity]> {
        match self {
            AttributeValue::Refs(ids) => Some(ids),
            _ => None,
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        AttributeValue::Int(i)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<IVec2> for AttributeValue {
    fn from(p: IVec2) -> Self {
        AttributeValue::Position(p)
    }
}

impl From<Vec<ContainerIdentity>> for AttributeValue {
    fn from(ids: Vec<ContainerIdentity>) -> Self {
        AttributeValue::Refs(ids)
    }
}
