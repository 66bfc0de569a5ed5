//! # mirror_update
//!
//! The incremental update engine of the game-state mirror.
//!
//! This crate provides:
//!
//! - [`UpdateStrategy`] — closed set of refresh policies (eager, throttled,
//!   depth-limited, and AND/OR compositions), consulted once per reachable
//!   container.
//! - [`UpdateManager`] — the traversal engine running one
//!   at-most-once-per-container refresh pass over the reference graph each
//!   tick.
//! - [`PassReport`] — per-pass statistics for observability and tests.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mirror_entity::ContainerRegistry;
//! use mirror_update::{UpdateManager, UpdateStrategy};
//!
//! let registry = Arc::new(ContainerRegistry::new());
//! let manager = UpdateManager::new(
//!     registry.clone(),
//!     UpdateStrategy::Throttled { min_interval: 4 }
//!         .or(UpdateStrategy::DepthLimited { max_depth: 0 }),
//! );
//! // Each tick, with `adapter` implementing `SourceAdapter`:
//! // let roots = registry.all_of_kind(ContainerKind::Player);
//! // manager.run_pass(&adapter, Frame(current), &roots);
//! ```

pub mod manager;
pub mod strategy;

pub use manager::{PassReport, UpdateManager};
pub use strategy::UpdateStrategy;
