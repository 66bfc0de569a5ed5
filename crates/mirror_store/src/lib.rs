//! # mirror_store
//!
//! The leaf crate of the game-state mirror: frame-indexed value storage.
//!
//! This crate provides:
//!
//! - [`Frame`] — the discrete time unit of the mirrored simulation.
//! - [`ContainerIdentity`] — stable `(kind, id)` entity identifiers.
//! - [`AttributeValue`] — the closed set of raw values a source can report.
//! - [`Property`] — one immutable timestamped value of one attribute.
//! - [`StaticRegister`] / [`DynamicRegister`] — set-once and step-function
//!   storage for one attribute of one entity.
//! - [`StoreError`] — ordering and set-once contract violations.

pub mod error;
pub mod frame;
pub mod identity;
pub mod property;
pub mod register;
pub mod value;

pub use error::StoreError;
pub use frame::Frame;
pub use identity::{ContainerId, ContainerIdentity, ContainerKind};
pub use property::Property;
pub use register::{DynamicRegister, Register, StaticRegister};
pub use value::AttributeValue;
