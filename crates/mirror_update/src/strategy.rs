//! Update strategies — the refresh policy of a traversal pass.
//!
//! A strategy is a pure decision over (frames since the container's last
//! refresh, recursion depth). Policies are a closed variant set dispatched by
//! match; the traversal engine calls exactly one composite strategy per pass
//! and stays ignorant of the concrete policy.

/// A refresh policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStrategy {
    /// Refresh every reachable container, every pass.
    Eager,
    /// Refresh only containers whose data is at least `min_interval` frames
    /// stale.
    Throttled {
        /// Minimum frames between refreshes of the same container.
        min_interval: u64,
    },
    /// Refresh roots and near neighbours; containers deeper than `max_depth`
    /// age out.
    DepthLimited {
        /// Maximum recursion depth that still refreshes. Roots are depth 0,
        /// so any `max_depth` keeps roots refreshing.
        max_depth: u32,
    },
    /// Refresh only if *all* inner strategies agree. Empty is always true.
    AllOf(Vec<UpdateStrategy>),
    /// Refresh if *any* inner strategy agrees. Empty is always false.
    AnyOf(Vec<UpdateStrategy>),
}

impl UpdateStrategy {
    /// Decide whether a container should be refreshed this pass.
    ///
    /// `frames_since_update` is `u64::MAX` for a container never refreshed;
    /// `depth` is 0 for roots.
    #[must_use]
    pub fn should_update(&self, frames_since_update: u64, depth: u32) -> bool {
        match self {
            UpdateStrategy::Eager => true,
            UpdateStrategy::Throttled { min_interval } => frames_since_update >= *min_interval,
            UpdateStrategy::DepthLimited { max_depth } => depth <= *max_depth,
            UpdateStrategy::AllOf(inner) => inner
                .iter()
                .all(|s| s.should_update(frames_since_update, depth)),
            UpdateStrategy::AnyOf(inner) => inner
                .iter()
                .any(|s| s.should_update(frames_since_update, depth)),
        }
    }

    /// Combine with `other`: both must agree.
    #[must_use]
    pub fn and(self, other: UpdateStrategy) -> UpdateStrategy {
        match self {
            UpdateStrategy::AllOf(mut inner) => {
                inner.push(other);
                UpdateStrategy::AllOf(inner)
            }
            first => UpdateStrategy::AllOf(vec![first, other]),
        }
    }

    /// Combine with `other`: either may agree.
    #[must_use]
    pub fn or(self, other: UpdateStrategy) -> UpdateStrategy {
        match self {
            UpdateStrategy::AnyOf(mut inner) => {
                inner.push(other);
                UpdateStrategy::AnyOf(inner)
            }
            first => UpdateStrategy::AnyOf(vec![first, other]),
        }
    }
}
