//! Property registers — versioned storage for one attribute of one entity.
//!
//! Two storage shapes exist, chosen per attribute by the container schema:
//!
//! - [`StaticRegister`] — set-once, for attributes fixed at creation (a
//!   tile's position, a unit's type).
//! - [`DynamicRegister`] — an append-only timeline of [`Property`] values
//!   keyed by strictly increasing frames, modelling a step function of
//!   frame → value.
//!
//! Registers are independent of one another; only the owning container's
//! guard serialises concurrent mutation as a batch.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::frame::Frame;
use crate::property::Property;

/// Set-once storage for an attribute that never changes after creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticRegister<T> {
    slot: Option<Property<T>>,
}

impl<T: Clone + PartialEq> StaticRegister<T> {
    /// Create an empty register.
    #[must_use]
    pub const fn new() -> Self {
        Self { slot: None }
    }

    /// Set the value, recording the frame it was first observed at.
    ///
    /// Setting the same value again is a no-op. Setting a *different* value
    /// once a value is held fails with [`StoreError::AlreadySet`].
    pub fn set(&mut self, value: T, frame: Frame) -> Result<(), StoreError> {
        match &self.slot {
            None => {
                self.slot = Some(Property::new(value, frame));
                Ok(())
            }
            Some(existing) if *existing.value() == value => Ok(()),
            Some(existing) => Err(StoreError::AlreadySet {
                previous: existing.valid_from(),
            }),
        }
    }

    /// The held value, regardless of frame. Absent if never set.
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.slot.as_ref().map(Property::value)
    }

    /// The held value if it was already known at `frame`, else absent.
    #[must_use]
    pub fn value_at(&self, frame: Frame) -> Option<&T> {
        self.slot
            .as_ref()
            .filter(|p| p.valid_from() <= frame)
            .map(Property::value)
    }

    /// Returns `true` if a value has been set.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.slot.is_some()
    }
}

/// Append-only timeline storage for a time-varying attribute.
///
/// Holds an ordered sequence of [`Property`] values with strictly increasing
/// `valid_from` frames. Querying a frame returns the newest property at or
/// before it, so the register reads as a step function of time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DynamicRegister<T> {
    timeline: Vec<Property<T>>,
}

impl<T: Clone + PartialEq> DynamicRegister<T> {
    /// Create an empty register.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeline: Vec::new(),
        }
    }

    /// Record `value` as current from `frame` onward.
    ///
    /// - `frame` earlier than the last recorded frame: [`StoreError::OutOfOrder`],
    ///   register unchanged.
    /// - `frame` equal to the last recorded frame: no-op if the value is
    ///   equal, [`StoreError::OutOfOrder`] if it differs.
    /// - `frame` later: no-op if the value equals the current tail (the step
    ///   function is unchanged), otherwise a new property is appended.
    pub fn record(&mut self, value: T, frame: Frame) -> Result<(), StoreError> {
        match self.timeline.last() {
            None => {
                self.timeline.push(Property::new(value, frame));
                Ok(())
            }
            Some(last) if frame < last.valid_from() => Err(StoreError::OutOfOrder {
                last: last.valid_from(),
                attempted: frame,
            }),
            Some(last) if frame == last.valid_from() => {
                if *last.value() == value {
                    Ok(())
                } else {
                    Err(StoreError::OutOfOrder {
                        last: last.valid_from(),
                        attempted: frame,
                    })
                }
            }
            Some(last) => {
                if *last.value() != value {
                    self.timeline.push(Property::new(value, frame));
                }
                Ok(())
            }
        }
    }

    /// The value current at `frame`: the newest property with
    /// `valid_from <= frame`. Absent if nothing was known at that frame —
    /// a legitimate unknown, not an error.
    #[must_use]
    pub fn value_at(&self, frame: Frame) -> Option<&T> {
        let idx = self.timeline.partition_point(|p| p.valid_from() <= frame);
        idx.checked_sub(1)
            .and_then(|i| self.timeline.get(i))
            .map(Property::value)
    }

    /// The newest recorded value, regardless of frame.
    #[must_use]
    pub fn latest(&self) -> Option<&T> {
        self.timeline.last().map(Property::value)
    }

    /// The frame of the newest recorded property.
    #[must_use]
    pub fn last_frame(&self) -> Option<Frame> {
        self.timeline.last().map(Property::valid_from)
    }

    /// Number of distinct steps recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    /// Returns `true` if nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }
}

/// One attribute's storage, dispatched by shape.
///
/// A closed variant set rather than a trait object: the update engine stays
/// ignorant of concrete storage shapes and dispatches by match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Register<T> {
    /// Set-once storage.
    Static(StaticRegister<T>),
    /// Timeline storage.
    Dynamic(DynamicRegister<T>),
}

impl<T: Clone + PartialEq> Register<T> {
    /// Create an empty static register.
    #[must_use]
    pub const fn new_static() -> Self {
        Register::Static(StaticRegister::new())
    }

    /// Create an empty dynamic register.
    #[must_use]
    pub const fn new_dynamic() -> Self {
        Register::Dynamic(DynamicRegister::new())
    }

    /// Write a freshly observed value, routing to the underlying shape's
    /// contract ([`StaticRegister::set`] or [`DynamicRegister::record`]).
    pub fn write(&mut self, value: T, frame: Frame) -> Result<(), StoreError> {
        match self {
            Register::Static(r) => r.set(value, frame),
            Register::Dynamic(r) => r.record(value, frame),
        }
    }

    /// The value current at `frame`, or absent.
    #[must_use]
    pub fn value_at(&self, frame: Frame) -> Option<&T> {
        match self {
            Register::Static(r) => r.value_at(frame),
            Register::Dynamic(r) => r.value_at(frame),
        }
    }

    /// The newest known value, or absent.
    #[must_use]
    pub fn latest(&self) -> Option<&T> {
        match self {
            Register::Static(r) => r.get(),
            Register::Dynamic(r) => r.latest(),
        }
    }
}
