/*
 * This source code is licensed under the Business Source License 1.1.
 */

//! Runtime configuration shared by the three caches.

/// How much invariant checking the caches perform.
///
/// Contract violations (zero-count updates, bad group ids, removing more
/// items than a group holds) panic at every level.  The level only decides
/// whether the expensive whole-structure walks run as well.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CheckLevel {
    /// Constant-time checks only.  Suitable for long sampler runs.
    #[default]
    Standard,
    /// Also cross-validate the empty-group set against every count after
    /// each structural change, check score buffer lengths, and verify the
    /// tracker's maps are exact inverses.  O(groups) per structural change.
    Exhaustive,
}

impl CheckLevel {
    /// Returns `true` if the O(groups) consistency walks are enabled.
    #[inline]
    pub fn is_exhaustive(self) -> bool {
        self >= CheckLevel::Exhaustive
    }
}

/// Configuration for [`crate::driver::GroupCountCache`],
/// [`crate::slave::GroupStateCache`] and [`crate::tracker::StableIdTracker`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheConfig {
    /// Invariant checking level.  Default: [`CheckLevel::Standard`].
    pub check_level: CheckLevel,
}

impl CacheConfig {
    /// Configuration with every consistency check enabled.
    ///
    /// Used by tests and by samplers under development.
    pub fn exhaustive() -> Self {
        Self {
            check_level: CheckLevel::Exhaustive,
        }
    }
}
