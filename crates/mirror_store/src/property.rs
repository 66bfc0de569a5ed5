//! A single timestamped value.

use serde::{Deserialize, Serialize};

use crate::frame::Frame;

/// One immutable value of one attribute, valid from a given frame onward.
///
/// A property is created once and never mutated; a newer value for the same
/// attribute supersedes it by being appended to the owning register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property<T> {
    value: T,
    valid_from: Frame,
}

impl<T> Property<T> {
    /// Create a property valid from `valid_from` onward.
    #[must_use]
    pub const fn new(value: T, valid_from: Frame) -> Self {
        Self { value, valid_from }
    }

    /// The stored value.
    #[must_use]
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// The first frame at which this value holds.
    #[must_use]
    pub const fn valid_from(&self) -> Frame {
        self.valid_from
    }
}
