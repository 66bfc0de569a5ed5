//! Frame counter — the discrete time unit of the mirrored simulation.
//!
//! All temporal queries are frame-indexed. The frame is always an explicit
//! parameter threaded through calls, never ambient state, so traversal passes
//! are deterministic and testable without a live clock.

use serde::{Deserialize, Serialize};

/// A simulation frame number.
///
/// Frames only move forward: the update engine never records data for a frame
/// earlier than what a register already holds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct Frame(pub u64);

impl Frame {
    /// Frame zero — the start of the mirrored simulation.
    pub const ZERO: Frame = Frame(0);

    /// Create a frame from a raw counter value.
    #[must_use]
    pub const fn from_raw(frame: u64) -> Self {
        Self(frame)
    }

    /// Returns the raw counter value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Returns the frame immediately after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Number of frames elapsed since `earlier`, saturating at zero if
    /// `earlier` is in the future.
    #[must_use]
    pub const fn since(self, earlier: Frame) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "frame {}", self.0)
    }
}

impl From<u64> for Frame {
    fn from(frame: u64) -> Self {
        Self(frame)
    }
}
