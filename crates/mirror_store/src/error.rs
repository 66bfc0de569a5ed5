//! Store-layer error types.

use crate::frame::Frame;

/// Errors raised by property registers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A write was attempted at a frame not strictly after the register's
    /// last recorded frame, with a value that differs from the stored one.
    #[error("out-of-order write: last recorded {last}, attempted {attempted}")]
    OutOfOrder {
        /// The newest frame the register already holds.
        last: Frame,
        /// The frame the rejected write carried.
        attempted: Frame,
    },

    /// A static (set-once) register was re-set with a conflicting value.
    /// This is a programming-contract violation, not a recoverable condition.
    #[error("static register already set at {previous}")]
    AlreadySet {
        /// The frame at which the register was originally set.
        previous: Frame,
    },
}
