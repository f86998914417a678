/*
 * This source code is licensed under the Business Source License 1.1.
 */

//! Stable global ids for packed groups.
//!
//! Packed ids are recycled whenever a group is removed, so they cannot be
//! held across structural changes.  [`StableIdTracker`] hands out a global
//! id per group that never changes and is never reused, and keeps the two
//! numberings as inverse maps over the live groups.
//!
//! ```rust
//! use mixture_cache::tracker::StableIdTracker;
//!
//! let mut ids = StableIdTracker::default();
//! ids.init(3);
//! ids.remove_group(1);
//! // Global 2 moved into packed slot 1; global 1 is gone for good.
//! assert_eq!(ids.packed_to_global(1), 2);
//! assert_eq!(ids.global_to_packed(2), 1);
//! assert!(!ids.is_live(1));
//! ```
//!
//! With the `serde` feature, a deserialised tracker must hold exact inverse
//! maps, with every removed global id set to [`UNRESOLVED`], or it is
//! rejected.

use alloc::vec::Vec;

use crate::config::{CacheConfig, CheckLevel};
use crate::error::InvariantError;

/// Packed or global group id.
pub type Id = u32;

/// Value stored in the global → packed map for removed groups.
pub const UNRESOLVED: Id = Id::MAX;

// ─── StableIdTracker ─────────────────────────────────────────────────────────

/// Bidirectional map between packed ids and permanent global ids.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StableIdTracker {
    packed_to_global: Vec<Id>,
    global_to_packed: Vec<Id>,
    config: CacheConfig,
}

impl StableIdTracker {
    /// Create a tracker with no groups.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            packed_to_global: Vec::new(),
            global_to_packed: Vec::new(),
            config,
        }
    }

    /// Forget every id and pair packed `0..group_count` with global
    /// `0..group_count`.
    pub fn init(&mut self, group_count: usize) {
        self.packed_to_global.clear();
        self.global_to_packed.clear();
        for _ in 0..group_count {
            self.add_group();
        }
        log::debug!("id tracker initialised: {} groups", group_count);
    }

    /// Number of live groups.
    #[inline]
    pub fn packed_size(&self) -> usize {
        self.packed_to_global.len()
    }

    /// Number of global ids ever issued, removed groups included.
    #[inline]
    pub fn global_size(&self) -> usize {
        self.global_to_packed.len()
    }

    /// Current check level.
    #[inline]
    pub fn check_level(&self) -> CheckLevel {
        self.config.check_level
    }

    /// Change the check level.
    pub fn set_check_level(&mut self, level: CheckLevel) {
        self.config.check_level = level;
    }

    /// Track a new group appended at packed id `packed_size()`.
    ///
    /// Returns its global id, which is `global_size()` before the call.
    ///
    /// # Panics
    /// If the id space is exhausted.
    pub fn add_group(&mut self) -> Id {
        let packed = to_id(self.packed_to_global.len());
        let global = to_id(self.global_to_packed.len());
        self.packed_to_global.push(global);
        self.global_to_packed.push(packed);
        log::trace!("id tracker paired packed {} with global {}", packed, global);
        global
    }

    /// Stop tracking the group at `packed`.
    ///
    /// Its global id becomes permanently unresolvable.  The last packed
    /// group moves into `packed`, mirroring the caches' swap-with-last.
    ///
    /// # Panics
    /// If `packed` is out of range or the maps disagree.
    pub fn remove_group(&mut self, packed: Id) {
        assert!(
            (packed as usize) < self.packed_size(),
            "bad packed id: {} (packed size {})",
            packed,
            self.packed_size()
        );
        let removed = self.packed_to_global[packed as usize];
        assert!(
            (removed as usize) < self.global_size(),
            "bad global id: {} (global size {})",
            removed,
            self.global_size()
        );
        self.global_to_packed[removed as usize] = UNRESOLVED;

        let last = self.packed_size() - 1;
        if packed as usize != last {
            let moved = self.packed_to_global[last];
            assert!(
                (moved as usize) < self.global_size(),
                "bad global id: {} (global size {})",
                moved,
                self.global_size()
            );
            self.packed_to_global[packed as usize] = moved;
            self.global_to_packed[moved as usize] = packed;
            log::trace!(
                "id tracker retired global {}; global {} moved to packed {}",
                removed,
                moved,
                packed
            );
        } else {
            log::trace!("id tracker retired global {}", removed);
        }
        self.packed_to_global.truncate(last);
        self.validate();
    }

    /// Global id of the group at `packed`.
    ///
    /// # Panics
    /// If `packed` is out of range.
    pub fn packed_to_global(&self, packed: Id) -> Id {
        assert!(
            (packed as usize) < self.packed_size(),
            "bad packed id: {} (packed size {})",
            packed,
            self.packed_size()
        );
        let global = self.packed_to_global[packed as usize];
        assert!(
            (global as usize) < self.global_size(),
            "bad global id: {} (global size {})",
            global,
            self.global_size()
        );
        global
    }

    /// Packed id of the group named by `global`.
    ///
    /// # Panics
    /// If `global` was never issued or its group has been removed.
    pub fn global_to_packed(&self, global: Id) -> Id {
        assert!(
            (global as usize) < self.global_size(),
            "bad global id: {} (global size {})",
            global,
            self.global_size()
        );
        let packed = self.global_to_packed[global as usize];
        assert!(
            (packed as usize) < self.packed_size(),
            "bad packed id: {} for global {} (group removed?)",
            packed,
            global
        );
        packed
    }

    /// Packed id of the group named by `global`, or `None` if that group
    /// was removed or the id was never issued.
    pub fn resolve(&self, global: Id) -> Option<Id> {
        let packed = *self.global_to_packed.get(global as usize)?;
        if (packed as usize) < self.packed_size() {
            Some(packed)
        } else {
            None
        }
    }

    /// Returns `true` if `global` still names a live group.
    #[inline]
    pub fn is_live(&self, global: Id) -> bool {
        self.resolve(global).is_some()
    }

    /// At [`CheckLevel::Exhaustive`], assert that the two maps are exact
    /// inverses over the live groups and that exactly `packed_size()`
    /// global ids resolve.
    ///
    /// # Panics
    /// On any mismatch.
    pub fn validate(&self) {
        if !self.config.check_level.is_exhaustive() {
            return;
        }
        if let Err(e) = self.check_consistency() {
            panic!("{}", e);
        }
    }

    /// Walk both maps and report the first broken invariant.
    fn check_consistency(&self) -> Result<(), InvariantError> {
        for (packed, &global) in self.packed_to_global.iter().enumerate() {
            if global as usize >= self.global_size() {
                return Err(InvariantError::BadGlobalId { global, packed });
            }
            if self.global_to_packed[global as usize] as usize != packed {
                return Err(InvariantError::MapsNotInverse { packed });
            }
        }
        for (global, &packed) in self.global_to_packed.iter().enumerate() {
            if packed == UNRESOLVED {
                continue;
            }
            let named = self.packed_to_global.get(packed as usize).copied();
            if named.map(|g| g as usize) != Some(global) {
                return Err(InvariantError::StaleGlobalId { global });
            }
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for StableIdTracker {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        struct Snapshot {
            packed_to_global: Vec<Id>,
            global_to_packed: Vec<Id>,
            config: CacheConfig,
        }

        let snapshot = <Snapshot as serde::Deserialize>::deserialize(deserializer)?;
        let tracker = Self {
            packed_to_global: snapshot.packed_to_global,
            global_to_packed: snapshot.global_to_packed,
            config: snapshot.config,
        };
        tracker
            .check_consistency()
            .map_err(<D::Error as serde::de::Error>::custom)?;
        log::debug!(
            "id tracker restored: {} live of {} issued",
            tracker.packed_size(),
            tracker.global_size()
        );
        Ok(tracker)
    }
}

fn to_id(n: usize) -> Id {
    assert!(n < UNRESOLVED as usize, "group id space exhausted");
    n as Id
}
