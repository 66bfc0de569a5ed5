//! # mirror_entity
//!
//! Cache-side mirrors of external game entities.
//!
//! This crate provides:
//!
//! - [`ContainerSchema`] — per-kind attribute declarations (shape, identity
//!   participation, reference-bearing).
//! - [`Container`] / [`ContainerHandle`] — one entity's register set behind a
//!   shared/exclusive guard.
//! - [`ContainerRegistry`] — owns all containers, resolves identities, and
//!   carries the consumer-facing query surface.
//! - [`SourceAdapter`] — the contract the external game-state source presents.

pub mod container;
pub mod registry;
pub mod schema;
pub mod source;

pub use container::{Container, ContainerError, ContainerHandle, PullOutcome};
pub use registry::ContainerRegistry;
pub use schema::{AttributeDef, ContainerSchema, StorageKind, schema_for};
pub use source::{SourceAdapter, SourceError};
